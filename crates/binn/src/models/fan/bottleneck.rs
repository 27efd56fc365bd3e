//! # [`Bottleneck`] Block
//!
//! [`Bottleneck`] is the binarized residual unit: three chained
//! [`BinConv2d`] layers whose outputs are concatenated along the channel
//! axis and added back to the input.
//!
//! [`BottleneckMeta`] defines a common meta API for [`Bottleneck`]
//! and [`BottleneckConfig`].
//!
//! [`BottleneckConfig`] implements [`Config`], and provides
//! [`BottleneckConfig::init`] to initialize a [`Bottleneck`].
//!
//! [`Bottleneck`] implements [`Module`], and provides
//! [`Bottleneck::forward`].

use crate::layers::blocks::bin_conv::{BinConv2d, BinConv2dConfig, BinConv2dMeta};
use burn::nn::PaddingConfig2d;
use burn::nn::conv::Conv2dConfig;
use burn::prelude::{Backend, Config, Module, Tensor};

/// [`Bottleneck`] Meta trait.
pub trait BottleneckMeta {
    /// The number of input feature planes.
    fn in_planes(&self) -> usize;

    /// First binarized conv output channels.
    ///
    /// ``half_planes = in_planes / 2``
    fn half_planes(&self) -> usize {
        self.in_planes() / 2
    }

    /// Second and third binarized conv output channels.
    ///
    /// ``quarter_planes = in_planes / 4``
    fn quarter_planes(&self) -> usize {
        self.in_planes() / 4
    }

    /// The number of output feature planes.
    ///
    /// Equals `in_planes`: the concatenated channels
    /// (``in/2 + in/4 + in/4``) match the input by construction.
    fn out_planes(&self) -> usize {
        self.in_planes()
    }
}

/// [`Bottleneck`] Config.
///
/// Implements [`BottleneckMeta`].
#[derive(Config, Debug)]
pub struct BottleneckConfig {
    /// The size of the in channels dimension; must be divisible by 4.
    #[config(default = "192")]
    pub in_planes: usize,

    /// Dropout probability for the binarized conv layers.
    #[config(default = "0.0")]
    pub dropout: f64,
}

impl BottleneckMeta for BottleneckConfig {
    fn in_planes(&self) -> usize {
        self.in_planes
    }
}

impl BottleneckConfig {
    /// Initialize a [`Bottleneck`].
    ///
    /// # Panics
    ///
    /// If `in_planes` is not divisible by 4.
    pub fn init<B: Backend>(
        self,
        device: &B::Device,
    ) -> Bottleneck<B> {
        assert_eq!(
            self.in_planes % 4,
            0,
            "in_planes must be divisible by 4: {}",
            self.in_planes
        );

        let bin_conv = |channels: [usize; 2]| -> BinConv2dConfig {
            BinConv2dConfig::from(
                Conv2dConfig::new(channels, [3, 3])
                    .with_stride([1, 1])
                    .with_padding(PaddingConfig2d::Explicit(1, 1)),
            )
            .with_dropout(self.dropout)
        };

        let half = self.half_planes();
        let quarter = self.quarter_planes();

        Bottleneck {
            bin_conv1: bin_conv([self.in_planes, half]).init(device),
            bin_conv2: bin_conv([half, quarter]).init(device),
            bin_conv3: bin_conv([quarter, quarter]).init(device),
        }
    }
}

/// Binarized bottleneck block with a residual connection.
///
/// Implements [`BottleneckMeta`].
#[derive(Module, Debug)]
pub struct Bottleneck<B: Backend> {
    /// First binarized conv layer; ``in -> in/2``.
    pub bin_conv1: BinConv2d<B>,

    /// Second binarized conv layer; ``in/2 -> in/4``.
    pub bin_conv2: BinConv2d<B>,

    /// Third binarized conv layer; ``in/4 -> in/4``.
    pub bin_conv3: BinConv2d<B>,
}

impl<B: Backend> BottleneckMeta for Bottleneck<B> {
    fn in_planes(&self) -> usize {
        self.bin_conv1.in_channels()
    }
}

impl<B: Backend> Bottleneck<B> {
    /// Forward Pass.
    ///
    /// Chains the three binarized conv layers, concatenates the three
    /// intermediate outputs along the channel axis, and adds the input
    /// residual.
    ///
    /// # Arguments
    ///
    /// - `input`: ``[batch, in_planes, height, width]``.
    ///
    /// # Returns
    ///
    /// A tensor with exactly the input's shape.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        #[cfg(debug_assertions)]
        let [batch, height, width] = bimm_contracts::unpack_shape_contract!(
            ["batch", "in_planes", "height", "width"],
            &input,
            &["batch", "height", "width"],
            &[("in_planes", self.in_planes())],
        );

        let residual = input.clone();

        let out1 = self.bin_conv1.forward(input);
        let out2 = self.bin_conv2.forward(out1.clone());
        let out3 = self.bin_conv3.forward(out2.clone());

        let out = Tensor::cat(vec![out1, out2, out3], 1) + residual;

        #[cfg(debug_assertions)]
        bimm_contracts::assert_shape_contract_periodically!(
            ["batch", "out_planes", "height", "width"],
            &out,
            &[
                ("batch", batch),
                ("out_planes", self.out_planes()),
                ("height", height),
                ("width", width)
            ]
        );

        out
    }
}
