//! Concrete rules engines.

pub mod sueca;

pub use sueca::Sueca;
