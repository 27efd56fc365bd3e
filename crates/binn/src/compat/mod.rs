//! Shape arithmetic helpers for convolution layers.

pub mod conv_shape;
