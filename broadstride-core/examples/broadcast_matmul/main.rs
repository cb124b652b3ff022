use broadstride_core::{broadcast_size, Device, Result, Tensor};

fn main() -> Result<()> {
    let lhs = Tensor::<f32>::arange(0., 28., &Device::Cpu)?.reshape(&[1, 7, 4])?;
    let lhs = lhs.expand(&[3, 7, 4])?.unsqueeze(1)?;
    let rhs = Tensor::<f32>::ones((6, 4, 5), &Device::Cpu)?;

    let batch = broadcast_size(&lhs.dims()[..2], &rhs.dims()[..1])?;
    println!("lhs {:?} stride {:?}", lhs.dims(), lhs.stride());
    println!("rhs {:?} stride {:?}", rhs.dims(), rhs.stride());
    println!("batch dims broadcast to {batch}");

    let out = lhs.matmul(&rhs)?;
    println!("out {:?}", out.dims());
    let block = out.narrow(0, 2, 1)?.narrow(1, 5, 1)?.squeeze()?;
    println!("out[2][5][0] = {:?}", block.to_vec2()?[0]);
    Ok(())
}
