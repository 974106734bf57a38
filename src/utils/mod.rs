// Utility functions
pub mod error;
pub mod features;
pub mod polyline;
pub mod validation;

pub use error::*;
