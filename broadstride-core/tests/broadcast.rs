use broadstride_core::{
    broadcast_size, broadcast_size_many, broadcast_tensors, expand_inplace, expand_outplace,
    expand_outplace3, Device, Error, Shape, Tensor,
};

#[test]
fn numpy_example() {
    let shape = broadcast_size(&[8, 1, 6, 1], &[7, 1, 5]).unwrap();
    assert_eq!(shape.dims(), &[8, 7, 6, 5]);
}

#[test]
fn symmetric() {
    let shapes: [&[usize]; 7] = [&[], &[1], &[3], &[2, 1], &[1, 3], &[4, 1, 3], &[0, 1]];
    for a in shapes {
        for b in shapes {
            let ab = broadcast_size(a, b);
            let ba = broadcast_size(b, a);
            match (ab, ba) {
                (Ok(ab), Ok(ba)) => assert_eq!(ab, ba, "{a:?} {b:?}"),
                (Err(_), Err(_)) => (),
                _ => panic!("asymmetric result for {a:?} and {b:?}"),
            }
        }
    }
}

#[test]
fn scalars_and_zero_sizes() {
    assert!(broadcast_size(&[], &[]).unwrap().is_scalar());
    assert_eq!(broadcast_size(&[], &[2, 3]).unwrap().dims(), &[2, 3]);
    assert_eq!(broadcast_size(&[0], &[0]).unwrap().dims(), &[0]);
    assert_eq!(broadcast_size(&[1], &[0]).unwrap().dims(), &[1]);
}

#[test]
fn mismatch_names_axis_and_sizes() {
    let err = broadcast_size(&[2, 3], &[4, 3]).unwrap_err();
    assert!(matches!(
        err.inner(),
        Error::SizeMismatch {
            dim: 0,
            lhs: 2,
            rhs: 4,
            ..
        }
    ));
    let msg = err.inner().to_string();
    assert!(msg.contains("(2)") && msg.contains("(4)") && msg.contains("dimension 0"));

    let err = broadcast_size(&[0], &[2]).unwrap_err();
    assert!(matches!(err.inner(), Error::SizeMismatch { .. }));
}

#[test]
fn fold_many() {
    let shape = broadcast_size_many(&[vec![3usize, 1], vec![1, 4], vec![2, 1, 1]]).unwrap();
    assert_eq!(shape, Shape::from((2, 3, 4)));
    assert!(broadcast_size_many::<Vec<usize>>(&[]).unwrap().is_scalar());
    assert!(broadcast_size_many(&[vec![3usize], vec![4]]).is_err());
}

#[test]
fn shape_broadcast_with() {
    let a = Shape::from((5, 1));
    let b = Shape::from(4);
    assert_eq!(a.broadcast_with(&b).unwrap(), Shape::from((5, 4)));
}

#[test]
fn expand_outplace_pair() {
    let a = Tensor::<f32>::arange(0., 3., &Device::Cpu).unwrap();
    let b = Tensor::<f32>::ones((2, 1), &Device::Cpu).unwrap();
    let (ea, eb) = expand_outplace(&a, &b).unwrap();
    assert_eq!(ea.dims(), &[2, 3]);
    assert_eq!(ea.stride(), &[0, 1]);
    assert_eq!(eb.dims(), &[2, 3]);
    assert_eq!(eb.stride(), &[1, 0]);
    assert!(ea.same_storage(&a));
    assert_eq!(ea.to_vec2().unwrap(), vec![vec![0., 1., 2.]; 2]);
}

#[test]
fn expand_outplace_skips_equal_shapes() {
    let a = Tensor::<f32>::zeros((2, 3), &Device::Cpu).unwrap();
    let b = Tensor::<f32>::ones((2, 3), &Device::Cpu).unwrap();
    let (ea, eb) = expand_outplace(&a, &b).unwrap();
    assert_eq!(ea.stride(), a.stride());
    assert_eq!(eb.stride(), b.stride());
}

#[test]
fn expand_outplace_triple() {
    let a = Tensor::<i64>::zeros(3, &Device::Cpu).unwrap();
    let b = Tensor::<i64>::zeros((4, 1), &Device::Cpu).unwrap();
    let c = Tensor::<i64>::zeros((2, 1, 1), &Device::Cpu).unwrap();
    let (ea, eb, ec) = expand_outplace3(&a, &b, &c).unwrap();
    for t in [&ea, &eb, &ec] {
        assert_eq!(t.dims(), &[2, 4, 3]);
    }
    assert_eq!(ea.stride(), &[0, 0, 1]);
    assert_eq!(ec.stride(), &[1, 0, 0]);
}

#[test]
fn expand_inplace_to_reference() {
    let target = Tensor::<f64>::zeros((4, 2), &Device::Cpu).unwrap();
    let v = Tensor::<f64>::from_vec(vec![1., 2.], 2, &Device::Cpu).unwrap();
    let e = expand_inplace(&target, &v).unwrap();
    assert_eq!(e.dims(), &[4, 2]);
    assert_eq!(e.to_vec2().unwrap(), vec![vec![1., 2.]; 4]);

    let bad = Tensor::<f64>::zeros(3, &Device::Cpu).unwrap();
    assert!(expand_inplace(&target, &bad).is_err());
}

#[test]
fn broadcast_many_tensors() {
    let ts = [
        Tensor::<u8>::zeros((), &Device::Cpu).unwrap(),
        Tensor::<u8>::zeros((1, 5), &Device::Cpu).unwrap(),
        Tensor::<u8>::zeros((3, 1), &Device::Cpu).unwrap(),
    ];
    let out = broadcast_tensors(&ts).unwrap();
    assert_eq!(out.len(), 3);
    for t in &out {
        assert_eq!(t.dims(), &[3, 5]);
    }
    assert_eq!(out[0].stride(), &[0, 0]);
}
