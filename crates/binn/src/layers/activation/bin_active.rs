//! # [`BinActive`] - sign binarization activation.
//!
//! [`BinActive`] binarizes input activations to their element-wise sign, and
//! computes the mean of absolute values across the channel axis.
//!
//! The reverse pass uses a straight-through estimator with saturation
//! clipping: the sign-output gradient passes through unchanged wherever the
//! input was strictly inside ``(-1, 1)``, and is zero at and beyond the
//! bounds. The mean output carries no gradient.

use burn::prelude::{Backend, Config, Module, Tensor};

/// [`BinActive`] Configuration.
#[derive(Config, Debug)]
pub struct BinActiveConfig {
    /// Emit the pre-binarization tensor as a [`tracing`] event during forward.
    #[config(default = false)]
    pub trace: bool,
}

impl BinActiveConfig {
    /// Initialize a [`BinActive`] layer.
    pub fn init(&self) -> BinActive {
        BinActive { trace: self.trace }
    }
}

/// Sign binarization with a saturating straight-through estimator.
#[derive(Module, Clone, Debug, Default)]
pub struct BinActive {
    /// Opt-in diagnostic dump of forward inputs.
    pub trace: bool,
}

impl BinActive {
    /// Forward Pass.
    ///
    /// # Arguments
    ///
    /// - `input`: ``[batch, channels, ...]``; rank >= 2.
    ///
    /// # Returns
    ///
    /// ``(sign, mean)``:
    /// - `sign`: the element-wise sign of the input; same shape as the input.
    /// - `mean`: the mean of ``|input|`` over the channel axis (axis 1);
    ///   the input shape with that axis retained at size 1.
    #[tracing::instrument]
    pub fn forward<B: Backend, const D: usize>(
        &self,
        input: Tensor<B, D>,
    ) -> (Tensor<B, D>, Tensor<B, D>) {
        if self.trace {
            tracing::trace!("binarizing: {}", input);
        }

        let detached = input.clone().detach();

        let mean = detached.clone().abs().mean_dim(1);

        // Pass-through mask for the straight-through estimator;
        // zero at and beyond the saturation bounds.
        let mask = detached.clone().abs().lower_elem(1.0).float();
        let sign = (input - detached.clone()) * mask + detached.sign();

        (sign, mean)
    }
}
