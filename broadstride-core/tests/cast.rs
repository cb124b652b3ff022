use broadstride_core::{Device, Tensor};

#[test]
fn cast_f32_to_f64_1d() {
    let x = Tensor::<f32>::full(1.5, 4, &Device::Cpu).unwrap();
    let casted = x.cast::<f64>().unwrap();
    assert_eq!(casted.to_vec1().unwrap(), vec![1.5_f64; 4]);
}

#[test]
fn cast_f64_to_f32_2d() {
    let x = Tensor::<f64>::full(2.75, (2, 3), &Device::Cpu).unwrap();
    let casted = x.cast::<f32>().unwrap();
    assert_eq!(casted.to_vec2().unwrap(), vec![vec![2.75_f32; 3]; 2]);
}

#[test]
fn cast_i32_to_f32_3d() {
    let x = Tensor::<i32>::full(7, (1, 2, 3), &Device::Cpu).unwrap();
    let casted = x.cast::<f32>().unwrap();
    assert_eq!(casted.to_vec3().unwrap(), vec![vec![vec![7.0_f32; 3]; 2]; 1]);
}

#[test]
fn cast_truncates_floats() {
    let x = Tensor::<f64>::from_vec(vec![1.9, -2.5, 3.0], 3, &Device::Cpu).unwrap();
    let casted = x.cast::<i64>().unwrap();
    assert_eq!(casted.to_vec1().unwrap(), vec![1, -2, 3]);
}

#[test]
fn cast_materializes_broadcast_views() {
    let x = Tensor::<u8>::from_vec(vec![1, 2], (2, 1), &Device::Cpu).unwrap();
    let e = x.expand(&[2, 3]).unwrap();
    let casted = e.cast::<u32>().unwrap();
    assert!(casted.is_contiguous());
    assert_eq!(casted.stride(), &[3, 1]);
    assert_eq!(casted.to_vec2().unwrap(), vec![vec![1, 1, 1], vec![2, 2, 2]]);
}

#[test]
fn cast_scalar() {
    let x = Tensor::<i32>::new_scalar(-4, &Device::Cpu).unwrap();
    let casted = x.cast::<f32>().unwrap();
    assert_eq!(casted.rank(), 0);
    assert_eq!(casted.to_scalar().unwrap(), -4.0);
}
