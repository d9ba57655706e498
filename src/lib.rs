pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod report;
pub mod util;

pub use convert::{derive_output_path, ConversionJob, Converter};
pub use error::ConvertError;
