//! Smoke demo: forward a random batch through a binarized bottleneck block.

use binn::models::fan::bottleneck::{Bottleneck, BottleneckConfig, BottleneckMeta};
use burn::backend::NdArray;
use burn::prelude::Tensor;
use burn::tensor::Distribution;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Batch size.
    #[arg(short, long, default_value_t = 1)]
    batch_size: usize,

    /// Input feature planes; must be divisible by 4.
    #[arg(long, default_value_t = 192)]
    planes: usize,

    /// Input spatial resolution.
    #[arg(long, default_value_t = 64)]
    resolution: usize,
}

fn main() {
    type B = NdArray<f32>;
    let device = Default::default();

    let args = Args::parse();

    let block: Bottleneck<B> = BottleneckConfig::new()
        .with_in_planes(args.planes)
        .init(&device);

    let input = Tensor::random(
        [args.batch_size, block.in_planes(), args.resolution, args.resolution],
        Distribution::Default,
        &device,
    );
    println!("input shape: {:?}", input.shape().dims);

    let output = block.forward(input);
    println!("output shape: {:?}", output.shape().dims);
}
