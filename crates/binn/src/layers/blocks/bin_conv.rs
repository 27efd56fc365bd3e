//! # `BinConv2d` - binarized convolution block.
//!
//! A [`BinConv2d`] module is, in fixed order:
//! * a [`BatchNorm`] layer over the input channels,
//! * a [`BinActive`] binarization,
//! * an optional [`Dropout`] layer,
//! * a [`Conv2d`] layer,
//! * a [`Relu`] activation.
//!
//! The binarization mean output is computed and discarded in the forward
//! path; only the sign output feeds the convolution.

use crate::compat::conv_shape::expect_conv2d_output_size;
use crate::layers::activation::bin_active::{BinActive, BinActiveConfig};
use crate::utility::probability::expect_probability;
use bimm_contracts::{assert_shape_contract_periodically, unpack_shape_contract};
use burn::config::Config;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Dropout, DropoutConfig, PaddingConfig2d, Relu};
use burn::prelude::{Backend, Tensor};

/// [`BinConv2d`] Meta.
pub trait BinConv2dMeta {
    /// Number of input channels.
    fn in_channels(&self) -> usize;

    /// Number of output channels.
    fn out_channels(&self) -> usize;

    /// Get the kernel size.
    fn kernel_size(&self) -> [usize; 2];

    /// Get the stride.
    fn stride(&self) -> [usize; 2];

    /// Get the dilation.
    fn dilation(&self) -> [usize; 2];

    /// Get the padding config.
    fn padding(&self) -> PaddingConfig2d;

    /// Get the output resolution for a given input resolution.
    ///
    /// # Arguments
    ///
    /// - `input_resolution`: ``[in_height, in_width]``.
    ///
    /// # Returns
    ///
    /// ``[out_height, out_width]``, per convolution arithmetic.
    ///
    /// # Panics
    ///
    /// If the convolution has no legal output size for the input.
    fn output_resolution(
        &self,
        input_resolution: [usize; 2],
    ) -> [usize; 2] {
        expect_conv2d_output_size(
            input_resolution,
            self.kernel_size(),
            self.stride(),
            &self.padding(),
            self.dilation(),
        )
    }
}

/// [`BinConv2d`] Config.
///
/// Implements [`BinConv2dMeta`].
#[derive(Config, Debug)]
pub struct BinConv2dConfig {
    /// The [`Conv2d`] config.
    pub conv: Conv2dConfig,

    /// Dropout probability, applied after binarization; disabled at 0.
    #[config(default = "0.0")]
    pub dropout: f64,

    /// The [`BinActive`] config.
    #[config(default = "BinActiveConfig::new()")]
    pub bin: BinActiveConfig,
}

impl BinConv2dMeta for BinConv2dConfig {
    fn in_channels(&self) -> usize {
        self.conv.channels[0]
    }

    fn out_channels(&self) -> usize {
        self.conv.channels[1]
    }

    fn kernel_size(&self) -> [usize; 2] {
        self.conv.kernel_size
    }

    fn stride(&self) -> [usize; 2] {
        self.conv.stride
    }

    fn dilation(&self) -> [usize; 2] {
        self.conv.dilation
    }

    fn padding(&self) -> PaddingConfig2d {
        self.conv.padding.clone()
    }
}

impl From<Conv2dConfig> for BinConv2dConfig {
    fn from(conv: Conv2dConfig) -> Self {
        Self::new(conv)
    }
}

impl BinConv2dConfig {
    /// Initialize a [`BinConv2d`].
    ///
    /// The norm layer covers the conv layer's input channels, with epsilon
    /// ``1e-4`` and momentum ``0.1``; its scale parameters start at 1.0
    /// under the default init.
    ///
    /// # Panics
    ///
    /// If `dropout` is not a probability.
    pub fn init<B: Backend>(
        self,
        device: &B::Device,
    ) -> BinConv2d<B> {
        let dropout = expect_probability(self.dropout);

        BinConv2d {
            norm: BatchNormConfig::new(self.in_channels())
                .with_epsilon(1e-4)
                .with_momentum(0.1)
                .init(device),
            bin: self.bin.init(),
            dropout: (dropout != 0.0).then(|| DropoutConfig::new(dropout).init()),
            conv: self.conv.init(device),
            act: Relu::new(),
        }
    }
}

/// Binarized convolution block.
///
/// Implements [`BinConv2dMeta`].
#[derive(Module, Debug)]
pub struct BinConv2d<B: Backend> {
    /// Input norm layer.
    pub norm: BatchNorm<B, 2>,

    /// Binarization layer.
    pub bin: BinActive,

    /// Optional dropout layer, applied after binarization.
    pub dropout: Option<Dropout>,

    /// Internal Conv2d layer.
    pub conv: Conv2d<B>,

    /// Output activation layer.
    pub act: Relu,
}

impl<B: Backend> BinConv2dMeta for BinConv2d<B> {
    fn in_channels(&self) -> usize {
        self.conv.weight.shape().dims[1] * self.conv.groups
    }

    fn out_channels(&self) -> usize {
        self.conv.weight.shape().dims[0]
    }

    fn kernel_size(&self) -> [usize; 2] {
        self.conv.kernel_size
    }

    fn stride(&self) -> [usize; 2] {
        self.conv.stride
    }

    fn dilation(&self) -> [usize; 2] {
        self.conv.dilation
    }

    fn padding(&self) -> PaddingConfig2d {
        (*self.conv.padding).clone()
    }
}

impl<B: Backend> BinConv2d<B> {
    /// Forward Pass.
    ///
    /// Applies, in order:
    ///
    /// ```rust,ignore
    /// let x = self.norm.forward(input);
    /// let (x, _mean) = self.bin.forward(x);
    /// let x = dropout(x); // when configured
    /// let x = self.conv.forward(x);
    /// let x = self.act.forward(x);
    /// return x
    /// ```
    ///
    /// # Arguments
    ///
    /// - `input`: ``[batch, in_channels, in_height, in_width]``.
    ///
    /// # Returns
    ///
    /// ``[batch, out_channels, out_height, out_width]``; spatial dims per
    /// convolution arithmetic.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        let [batch, in_height, in_width] = unpack_shape_contract!(
            ["batch", "in_channels", "in_height", "in_width"],
            &input,
            &["batch", "in_height", "in_width"],
            &[("in_channels", self.in_channels())],
        );
        let [out_height, out_width] = self.output_resolution([in_height, in_width]);

        let x = self.norm.forward(input);

        let (x, _mean) = self.bin.forward(x);

        let x = match &self.dropout {
            Some(dropout) => dropout.forward(x),
            None => x,
        };

        let x = self.conv.forward(x);

        let x = self.act.forward(x);

        assert_shape_contract_periodically!(
            ["batch", "out_channels", "out_height", "out_width"],
            &x,
            &[
                ("batch", batch),
                ("out_channels", self.out_channels()),
                ("out_height", out_height),
                ("out_width", out_width)
            ]
        );

        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_bin_conv_config() {
        let config: BinConv2dConfig = Conv2dConfig::new([96, 48], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .into();

        assert_eq!(config.in_channels(), 96);
        assert_eq!(config.out_channels(), 48);
        assert_eq!(config.kernel_size(), [3, 3]);
        assert_eq!(config.stride(), [1, 1]);
        assert_eq!(config.dilation(), [1, 1]);
        assert_eq!(config.dropout, 0.0);
        assert_eq!(config.output_resolution([32, 32]), [32, 32]);
    }

    #[test]
    #[should_panic(expected = "Not a probability: 1.5")]
    fn test_bin_conv_config_bad_dropout() {
        let device = Default::default();
        let _layer: BinConv2d<TestBackend> =
            BinConv2dConfig::from(Conv2dConfig::new([4, 4], [3, 3]))
                .with_dropout(1.5)
                .init(&device);
    }

    #[test]
    fn test_dropout_presence() {
        let device = Default::default();

        let layer: BinConv2d<TestBackend> =
            BinConv2dConfig::from(Conv2dConfig::new([4, 4], [3, 3]))
                .with_dropout(0.3)
                .init(&device);
        assert!(layer.dropout.is_some());

        let layer: BinConv2d<TestBackend> =
            BinConv2dConfig::from(Conv2dConfig::new([4, 4], [3, 3])).init(&device);
        assert!(layer.dropout.is_none());
    }

    #[test]
    fn test_forward_shape_autodiff() {
        type B = Autodiff<NdArray<f32>>;
        let device = Default::default();

        let layer: BinConv2d<B> = BinConv2dConfig::from(
            Conv2dConfig::new([96, 48], [3, 3]).with_padding(PaddingConfig2d::Explicit(1, 1)),
        )
        .init(&device);

        assert_eq!(layer.in_channels(), 96);
        assert_eq!(layer.out_channels(), 48);
        assert_eq!(layer.kernel_size(), [3, 3]);

        let input = Tensor::random([1, 96, 32, 32], Distribution::Default, &device);
        let output = layer.forward(input);

        assert_eq!(&output.shape().dims, &[1, 48, 32, 32]);
    }

    #[test]
    fn test_forward_matches_stages() {
        let device = Default::default();

        let layer: BinConv2d<TestBackend> = BinConv2dConfig::from(
            Conv2dConfig::new([4, 8], [3, 3]).with_padding(PaddingConfig2d::Explicit(1, 1)),
        )
        .init(&device);

        let input = Tensor::random([2, 4, 8, 8], Distribution::Default, &device);

        let output = layer.forward(input.clone());

        let expected = {
            let x = layer.norm.forward(input);
            let (x, _mean) = layer.bin.forward(x);
            let x = layer.conv.forward(x);
            layer.act.forward(x)
        };
        output.to_data().assert_eq(&expected.to_data(), true);
    }

    #[test]
    fn test_forward_shrinking_kernel() {
        // Unpadded kernels shrink the output; the contract must track it.
        let device = Default::default();

        let layer: BinConv2d<TestBackend> =
            BinConv2dConfig::from(Conv2dConfig::new([10, 20], [5, 5])).init(&device);

        assert_eq!(layer.output_resolution([12, 12]), [8, 8]);

        let input = Tensor::random([1, 10, 12, 12], Distribution::Default, &device);
        let output = layer.forward(input);

        assert_eq!(&output.shape().dims, &[1, 20, 8, 8]);
    }
}
