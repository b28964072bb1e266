//! Terminal input helpers.

pub mod input;

pub use input::{LineSource, prompt};
