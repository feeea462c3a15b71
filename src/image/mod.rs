pub mod loader;
pub mod preprocessing;
pub mod transforms;

pub use loader::{ColorMode, ImageLoader};
pub use preprocessing::{
    AspectAwarePreprocessor, DataFormat, ImageToArrayPreprocessor, Preprocessor,
};
pub use transforms::{ImageAxis, ImageTransforms, Interpolation};
