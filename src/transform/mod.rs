// src/transform/mod.rs

//! Pure content transformations used by the build actions.
//!
//! Nothing in here decides *which* files to process or where to write them;
//! see [`crate::actions`] for that.

pub mod css;
pub mod image;
pub mod include;
pub mod lint;
pub mod rtl;
mod scan;
