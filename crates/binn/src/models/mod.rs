//! Complete model families.

pub mod fan;
