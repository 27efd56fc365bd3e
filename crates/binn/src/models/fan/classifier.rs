//! # [`Classifier`] Model
//!
//! A small digit classifier, reproduced exactly as declared — including its
//! structural defects. The declared stem (`hg`) is constructed but never
//! used by the forward path, and two of its layers are missing required
//! shape parameters; the forward path references a first convolution the
//! constructor never creates.
//!
//! Each missing piece is an explicit `Option` config field defaulting to
//! `None`: as written, [`ClassifierConfig::init`] fails fast naming the
//! first missing stem parameter, and [`Classifier::forward`] fails naming
//! the missing convolution. Supplying all three yields a working model.

use crate::layers::drop::dropout_2d::{Dropout2d, Dropout2dConfig};
use anyhow::bail;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::{
    BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
};
use burn::prelude::{Backend, Config, Tensor};
use burn::tensor::activation::{log_softmax, relu};
use burn::tensor::module::max_pool2d;

/// Flattened feature count entering the fully-connected head.
const HEAD_FEATURES: usize = 320;

/// [`Classifier`] Config.
#[derive(Config, Debug)]
pub struct ClassifierConfig {
    /// The number of output classes.
    #[config(default = "10")]
    pub num_classes: usize,

    /// Feature count for the stem norm layer.
    ///
    /// The architecture as declared never supplies this;
    /// [`Self::init`] fails until it is set.
    #[config(default = "None")]
    pub stem_norm_features: Option<usize>,

    /// Kernel size for the stem pool layer.
    ///
    /// The architecture as declared never supplies this;
    /// [`Self::init`] fails until it is set.
    #[config(default = "None")]
    pub stem_pool_kernel: Option<[usize; 2]>,

    /// The first convolution of the forward path.
    ///
    /// The architecture as declared references it but never constructs it;
    /// [`Classifier::forward`] fails until it is set.
    #[config(default = "None")]
    pub conv1: Option<Conv2dConfig>,
}

impl ClassifierConfig {
    /// Initialize a [`Classifier`].
    ///
    /// # Errors
    ///
    /// If the stem norm feature count or the stem pool kernel size is not
    /// configured. Both are required; neither has a legal default.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> anyhow::Result<Classifier<B>> {
        let Some(stem_norm_features) = self.stem_norm_features else {
            bail!(
                "stem norm layer requires a feature count; `stem_norm_features` is not configured"
            );
        };
        let Some(stem_pool_kernel) = self.stem_pool_kernel else {
            bail!("stem pool layer requires a kernel size; `stem_pool_kernel` is not configured");
        };

        Ok(Classifier {
            stem_conv: Conv2dConfig::new([1, 10], [7, 7])
                .with_stride([2, 2])
                .with_padding(PaddingConfig2d::Explicit(3, 3))
                .with_bias(false)
                .init(device),
            stem_norm: BatchNormConfig::new(stem_norm_features).init(device),
            stem_pool: MaxPool2dConfig::new(stem_pool_kernel).init(),

            conv1: self.conv1.as_ref().map(|config| config.init(device)),
            conv2: Conv2dConfig::new([10, 20], [5, 5]).init(device),
            conv2_drop: Dropout2dConfig::new().init(),

            fc1: LinearConfig::new(HEAD_FEATURES, 50).init(device),
            fc2: LinearConfig::new(50, self.num_classes).init(device),
            drop: DropoutConfig::new(0.5).init(),
        })
    }
}

/// Digit classifier model.
#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    /// Stem convolution; constructed but not referenced by [`Self::forward`].
    pub stem_conv: Conv2d<B>,

    /// Stem norm layer; constructed but not referenced by [`Self::forward`].
    pub stem_norm: BatchNorm<B, 2>,

    /// Stem pool layer; constructed but not referenced by [`Self::forward`].
    pub stem_pool: MaxPool2d,

    /// First convolution of the forward path; `None` as declared.
    pub conv1: Option<Conv2d<B>>,

    /// Second convolution of the forward path.
    pub conv2: Conv2d<B>,

    /// Spatial dropout over the second convolution's feature maps.
    pub conv2_drop: Dropout2d,

    /// First fully-connected layer.
    pub fc1: Linear<B>,

    /// Output fully-connected layer.
    pub fc2: Linear<B>,

    /// Element-wise dropout between the fully-connected layers.
    pub drop: Dropout,
}

impl<B: Backend> Classifier<B> {
    /// Forward Pass.
    ///
    /// # Arguments
    ///
    /// - `input`: ``[batch, 1, in_height, in_width]``. The head requires the
    ///   flattened conv features to equal 320; with a kernel-5 `conv1` that
    ///   means 28x28 inputs.
    ///
    /// # Returns
    ///
    /// ``[batch, num_classes]`` log-probabilities.
    ///
    /// # Errors
    ///
    /// If `conv1` was never constructed.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
    ) -> anyhow::Result<Tensor<B, 2>> {
        let Some(conv1) = &self.conv1 else {
            bail!("classifier forward references `conv1`, which is never constructed");
        };

        let x = relu(max_pool2d(
            conv1.forward(input),
            [2, 2],
            [2, 2],
            [0, 0],
            [1, 1],
        ));

        let x = self.conv2_drop.forward(self.conv2.forward(x));
        let x = relu(max_pool2d(x, [2, 2], [2, 2], [0, 0], [1, 1]));

        let x = x.reshape([-1, HEAD_FEATURES as i32]);

        let x = relu(self.fc1.forward(x));
        let x = self.drop.forward(x);
        let x = self.fc2.forward(x);

        Ok(log_softmax(x, 1))
    }
}
