use broadstride_core::{Device, Error, Tensor};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn seq(dims: &[usize]) -> Tensor<f64> {
    let n = dims.iter().product::<usize>();
    let data = (0..n).map(|i| i as f64).collect::<Vec<_>>();
    Tensor::from_vec(data, dims, &Device::Cpu).unwrap()
}

/// Reference product of row-major `(m, k)` and `(k, n)` matrices.
fn naive(lhs: &[f64], rhs: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
    let mut out = vec![0.; m * n];
    for i in 0..m {
        for j in 0..n {
            out[i * n + j] = (0..k).map(|p| lhs[i * k + p] * rhs[p * n + j]).sum();
        }
    }
    out
}

#[test]
fn dot_product() {
    init_logger();
    let a = seq(&[4]);
    let out = a.matmul(&a).unwrap();
    assert_eq!(out.rank(), 0);
    assert_eq!(out.to_scalar().unwrap(), 14.);

    let b = seq(&[3]);
    let err = a.matmul(&b).unwrap_err();
    assert!(matches!(err.inner(), Error::SizeMismatch { lhs: 4, rhs: 3, .. }));
}

#[test]
fn matrix_vector() {
    let m = seq(&[2, 3]);
    let v = Tensor::<f64>::ones(3, &Device::Cpu).unwrap();
    let out = m.matmul(&v).unwrap();
    assert_eq!(out.to_vec1().unwrap(), vec![3., 12.]);
}

#[test]
fn vector_matrix() {
    let v = Tensor::<f64>::ones(2, &Device::Cpu).unwrap();
    let m = seq(&[2, 3]);
    let out = v.matmul(&m).unwrap();
    assert_eq!(out.to_vec1().unwrap(), vec![3., 5., 7.]);
}

#[test]
fn matrix_matrix() {
    let a = seq(&[2, 3]);
    let b = seq(&[3, 4]);
    let out = a.matmul(&b).unwrap();
    assert_eq!(out.dims(), &[2, 4]);
    let expected = naive(&a.to_vec().unwrap(), &b.to_vec().unwrap(), 2, 3, 4);
    assert_eq!(out.to_vec().unwrap(), expected);

    let err = a.matmul(&a).unwrap_err();
    assert!(matches!(err.inner(), Error::SizeMismatch { lhs: 3, rhs: 2, .. }));
}

#[test]
fn strided_operands_are_materialized() {
    let a = seq(&[3, 2]).t().unwrap();
    let b = seq(&[4, 3]).t().unwrap();
    let out = a.matmul(&b).unwrap();
    let expected = naive(
        &a.contiguous().unwrap().to_vec().unwrap(),
        &b.contiguous().unwrap().to_vec().unwrap(),
        2,
        3,
        4,
    );
    assert_eq!(out.to_vec().unwrap(), expected);
}

#[test]
fn batched_lhs_with_vector() {
    init_logger();
    let a = seq(&[10, 3, 4]);
    let v = Tensor::<f64>::ones(4, &Device::Cpu).unwrap();
    let out = a.matmul(&v).unwrap();
    assert_eq!(out.dims(), &[10, 3]);
    let rows = out.to_vec2().unwrap();
    // Row r of batch b sums 4 consecutive values starting at 4 * (3 * b + r).
    for (b, batch) in rows.iter().enumerate() {
        for (r, &x) in batch.iter().enumerate() {
            let start = (4 * (3 * b + r)) as f64;
            assert_eq!(x, 4. * start + 6.);
        }
    }
}

#[test]
fn batched_lhs_with_matrix() {
    let a = seq(&[2, 3, 4]);
    let b = seq(&[4, 5]);
    let out = a.matmul(&b).unwrap();
    assert_eq!(out.dims(), &[2, 3, 5]);
    let flat = out.to_vec().unwrap();
    let expected = naive(&a.to_vec().unwrap(), &b.to_vec().unwrap(), 6, 4, 5);
    assert_eq!(flat, expected);
}

#[test]
fn broadcast_batches() {
    init_logger();
    let a = seq(&[3, 1, 7, 4]);
    let b = seq(&[6, 4, 5]);
    let out = a.matmul(&b).unwrap();
    assert_eq!(out.dims(), &[3, 6, 7, 5]);

    let a_data = a.to_vec().unwrap();
    let b_data = b.to_vec().unwrap();
    let out_data = out.to_vec().unwrap();
    for i in 0..3 {
        for j in 0..6 {
            let lhs = &a_data[i * 28..(i + 1) * 28];
            let rhs = &b_data[j * 20..(j + 1) * 20];
            let got = &out_data[(i * 6 + j) * 35..(i * 6 + j + 1) * 35];
            assert_eq!(got, naive(lhs, rhs, 7, 4, 5).as_slice());
        }
    }
}

#[test]
fn vector_against_batch() {
    let v = Tensor::<f64>::ones(3, &Device::Cpu).unwrap();
    let b = seq(&[2, 3, 2]);
    let out = v.matmul(&b).unwrap();
    assert_eq!(out.dims(), &[2, 2]);
    assert_eq!(out.to_vec2().unwrap(), vec![vec![6., 9.], vec![24., 27.]]);
}

#[test]
fn matrix_against_batch() {
    let a = seq(&[2, 3]);
    let b = seq(&[4, 3, 5]);
    let out = a.matmul(&b).unwrap();
    assert_eq!(out.dims(), &[4, 2, 5]);

    let a_data = a.to_vec().unwrap();
    let b_data = b.to_vec().unwrap();
    let out_data = out.to_vec().unwrap();
    for i in 0..4 {
        let rhs = &b_data[i * 15..(i + 1) * 15];
        let got = &out_data[i * 10..(i + 1) * 10];
        assert_eq!(got, naive(&a_data, rhs, 2, 3, 5).as_slice());
    }
}

#[test]
fn batch_against_batched_vector_mismatch() {
    let a = seq(&[2, 3, 4]);
    let b = seq(&[2, 5, 6]);
    let err = a.matmul(&b).unwrap_err();
    assert!(matches!(err.inner(), Error::SizeMismatch { lhs: 4, rhs: 5, .. }));

    let c = seq(&[3, 4, 2]);
    let err = a.matmul(&c).unwrap_err();
    assert!(matches!(err.inner(), Error::SizeMismatch { lhs: 2, rhs: 3, .. }));
}

#[test]
fn scalar_operands_are_rejected() {
    let s = Tensor::<f64>::new_scalar(1., &Device::Cpu).unwrap();
    let v = seq(&[3]);
    let err = s.matmul(&v).unwrap_err();
    assert!(matches!(err.inner(), Error::MatMulRank { lhs: 0, rhs: 1 }));
    let err = v.matmul(&s).unwrap_err();
    assert!(matches!(err.inner(), Error::MatMulRank { lhs: 1, rhs: 0 }));
}

#[test]
fn empty_contraction_gives_zeros() {
    let a = Tensor::<f32>::zeros((2, 0), &Device::Cpu).unwrap();
    let b = Tensor::<f32>::zeros((0, 3), &Device::Cpu).unwrap();
    let out = a.matmul(&b).unwrap();
    assert_eq!(out.to_vec2().unwrap(), vec![vec![0.; 3]; 2]);

    let e = Tensor::<f32>::zeros(0, &Device::Cpu).unwrap();
    assert_eq!(e.matmul(&e).unwrap().to_scalar().unwrap(), 0.);
}

#[test]
fn integral_matmul() {
    let a = Tensor::<i64>::arange(0, 6, &Device::Cpu)
        .unwrap()
        .reshape(&[2, 3])
        .unwrap();
    let b = Tensor::<i64>::ones((3, 2), &Device::Cpu).unwrap();
    let out = a.matmul(&b).unwrap();
    assert_eq!(out.to_vec2().unwrap(), vec![vec![3, 3], vec![12, 12]]);
}

#[test]
fn named_products() {
    let a = seq(&[2, 3]);
    let v = seq(&[3]);
    assert_eq!(a.mv(&v).unwrap().to_vec1().unwrap(), vec![5., 14.]);
    assert_eq!(v.dot(&v).unwrap().to_scalar().unwrap(), 5.);
    assert!(a.mm(&v).is_err());

    let x = seq(&[2, 2, 3]);
    let y = seq(&[2, 3, 1]);
    let out = x.bmm(&y).unwrap();
    assert_eq!(out.dims(), &[2, 2, 1]);
    assert_eq!(out.to_vec().unwrap(), vec![5., 14., 86., 122.]);
    let err = x.bmm(&seq(&[3, 3, 1])).unwrap_err();
    assert!(matches!(err.inner(), Error::SizeMismatch { dim: 0, .. }));
}
