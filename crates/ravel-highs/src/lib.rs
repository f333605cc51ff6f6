//! HiGHS backend for Ravel.
//!
//! [`HighsEngine`] implements the `ravel-core` engine boundary over the
//! `highs` crate.

mod engine;

pub use engine::{HighsEngine, highs_version};
