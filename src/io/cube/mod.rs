//! Gaussian cube files: grid input for several backends and the diagnostic
//! output format.

pub mod reader;
pub mod writer;

pub use reader::{CubeData, parse};
pub use writer::{INPUT_TITLE, OUTPUT_TITLE, write};
