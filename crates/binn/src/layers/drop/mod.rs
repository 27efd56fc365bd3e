//! Dropout layers.

pub mod dropout_2d;
