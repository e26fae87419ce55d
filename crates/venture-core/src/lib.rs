pub mod error;
pub mod inputs;
pub mod report;
pub mod rubric;
pub mod scoring;
pub mod verdict;

pub use error::*;
pub use inputs::*;
pub use report::*;
pub use rubric::*;
pub use scoring::*;
pub use verdict::*;
