//! # Binarized FAN-style blocks.
//!
//! The bottleneck and hourglass units of a binarized face-alignment
//! network, plus the accompanying digit classifier.

pub mod bottleneck;
pub mod classifier;
pub mod hour_glass;
