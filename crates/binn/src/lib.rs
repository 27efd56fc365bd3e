#![warn(missing_docs)]
//!# binn - Burn Binarized Networks
//!
//! Building blocks for binary-activation convolutional networks.
//!
//! ## Notable Components
//!
//! * [`compat`] - shape arithmetic for convolution layers.
//! * [`layers`] - reusable neural network modules.
//!   * [`layers::activation`] - activation layers.
//!     * [`layers::activation::bin_active`] - sign binarization with a
//!       saturating straight-through estimator.
//!   * [`layers::blocks`] - miscellaneous blocks.
//!     * [`layers::blocks::bin_conv`] - ``BatchNorm + BinActive + Conv2d`` block.
//!   * [`layers::drop`] - dropout layers.
//!     * [`layers::drop::dropout_2d`] - channel-wise / spatial dropout.
//! * [`models`] - complete model families.
//!   * [`models::fan`] - binarized FAN-style blocks and the digit classifier.

extern crate core;
/// Test-only macro import.
#[cfg(test)]
#[allow(unused_imports)]
#[macro_use]
extern crate hamcrest;

pub mod compat;

pub mod layers;

pub mod models;
pub mod utility;
