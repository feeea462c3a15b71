pub mod loader;
pub mod types;

pub use loader::{derive_label, list_images, SimpleDatasetLoader};
pub use types::Dataset;
