pub mod config;
pub mod dataset;
pub mod image;
pub mod utils;

// 重新导出主要类型
pub use crate::config::Config;
pub use crate::dataset::{Dataset, SimpleDatasetLoader};
pub use crate::image::{
    AspectAwarePreprocessor, ColorMode, ImageToArrayPreprocessor, Interpolation, Preprocessor,
};
pub use crate::utils::error::DatasetError;

pub type Result<T> = std::result::Result<T, DatasetError>;
