//! # `Dropout2d` - channel-wise / spatial dropout.
//!
//! Zeroes whole channel feature maps of a ``[batch, channels, height, width]``
//! tensor with probability `prob`, and rescales the survivors by
//! ``1 / (1 - prob)``. Adjacent pixels within a feature map are strongly
//! correlated, so element-wise dropout under-regularizes conv activations;
//! dropping whole maps does not.
//!
//! The layer is the identity when `prob` is zero, or when the backend does
//! not carry autodiff (inference mode).

use crate::utility::probability::expect_probability;
use burn::config::Config;
use burn::module::Module;
use burn::prelude::{Backend, Tensor};
use burn::tensor::Distribution;

/// [`Dropout2d`] Configuration.
#[derive(Config, Debug)]
pub struct Dropout2dConfig {
    /// The probability of dropping a channel feature map.
    #[config(default = "0.5")]
    pub prob: f64,
}

impl Dropout2dConfig {
    /// Initialize a [`Dropout2d`] layer.
    ///
    /// # Panics
    ///
    /// If `prob` is not a probability.
    pub fn init(&self) -> Dropout2d {
        Dropout2d {
            prob: expect_probability(self.prob),
        }
    }
}

/// Channel-wise dropout layer.
#[derive(Module, Clone, Debug)]
pub struct Dropout2d {
    /// The probability of dropping a channel feature map.
    pub prob: f64,
}

impl Dropout2d {
    /// Forward Pass.
    ///
    /// # Arguments
    ///
    /// - `input`: ``[batch, channels, height, width]``.
    ///
    /// # Returns
    ///
    /// A tensor of the same shape; in training mode, each ``[height, width]``
    /// map is either zeroed or rescaled by ``1 / (1 - prob)``.
    pub fn forward<B: Backend>(
        &self,
        input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        if !B::ad_enabled() || self.prob == 0.0 {
            return input;
        }

        let prob_keep = 1.0 - self.prob;

        let [batch, channels, height, width] = input.dims();
        let mask = Tensor::<B, 2>::random(
            [batch, channels],
            Distribution::Bernoulli(prob_keep),
            &input.device(),
        );
        let mask = mask
            .reshape([batch, channels, 1, 1])
            .expand([batch, channels, height, width]);

        input * mask * (1.0 / prob_keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_dropout_2d_config() {
        let config = Dropout2dConfig::new();
        assert_eq!(config.prob, 0.5);

        let layer = config.with_prob(0.2).init();
        assert_eq!(layer.prob, 0.2);
    }

    #[test]
    #[should_panic(expected = "Not a probability: -0.1")]
    fn test_dropout_2d_config_panic() {
        Dropout2dConfig::new().with_prob(-0.1).init();
    }

    #[test]
    fn test_inference_identity() {
        let device = Default::default();
        let layer = Dropout2dConfig::new().init();

        let input: Tensor<TestBackend, 4> = Tensor::ones([2, 3, 4, 4], &device);
        let output = layer.forward(input.clone());

        output.to_data().assert_eq(&input.to_data(), true);
    }

    #[test]
    fn test_training_drops_whole_channels() {
        type B = Autodiff<NdArray<f32>>;
        let device = Default::default();

        let prob = 0.4;
        let layer = Dropout2dConfig::new().with_prob(prob).init();

        let input: Tensor<B, 4> = Tensor::ones([4, 8, 3, 3], &device);
        let output = layer.forward(input);

        let scale = 1.0 / (1.0 - prob) as f32;
        let values = output.into_data().to_vec::<f32>().unwrap();
        for map in values.chunks(3 * 3) {
            let first = map[0];
            assert!(
                first == 0.0 || (first - scale).abs() < 1e-6,
                "unexpected map value: {first}"
            );
            assert!(map.iter().all(|&v| v == first));
        }
    }
}
