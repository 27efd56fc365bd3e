//! # [`HourGlass`] Stub
//!
//! Configuration-only placeholder for the hourglass down/up-sampling
//! recursion. The forward computation is not implemented; the stub exists so
//! the stored configuration survives module records.

use burn::prelude::{Backend, Config, Module, Tensor};

/// [`HourGlass`] Configuration.
#[derive(Config, Debug)]
pub struct HourGlassConfig {
    /// Number of residual modules per stage.
    pub num_modules: usize,

    /// Recursion depth of the down/up-sampling stages.
    pub depth: usize,

    /// Feature planes carried through the stages.
    pub num_features: usize,
}

impl HourGlassConfig {
    /// Initialize an [`HourGlass`] stub.
    pub fn init(&self) -> HourGlass {
        HourGlass {
            num_modules: self.num_modules,
            depth: self.depth,
            num_features: self.num_features,
        }
    }
}

/// Hourglass container stub.
///
/// Stores its configuration; has no forward behavior yet.
#[derive(Module, Clone, Debug)]
pub struct HourGlass {
    /// Number of residual modules per stage.
    pub num_modules: usize,

    /// Recursion depth of the down/up-sampling stages.
    pub depth: usize,

    /// Feature planes carried through the stages.
    pub num_features: usize,
}

impl HourGlass {
    /// Forward Pass.
    ///
    /// # Panics
    ///
    /// Always; the hourglass recursion is not implemented.
    pub fn forward<B: Backend>(
        &self,
        _input: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        unimplemented!("hourglass forward is not implemented")
    }
}
