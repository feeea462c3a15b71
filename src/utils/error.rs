use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Shape mismatch at index {index}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        index: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatasetError {
    pub fn decode(path: impl Into<String>, source: image::ImageError) -> Self {
        DatasetError::Decode {
            path: path.into(),
            source,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            DatasetError::Decode { .. } => "IMAGE_DECODE_ERROR",
            DatasetError::Config(_) => "CONFIG_ERROR",
            DatasetError::InvalidInput(_) => "INVALID_INPUT",
            DatasetError::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            DatasetError::Io(_) => "IO_ERROR",
            DatasetError::Json(_) => "JSON_ERROR",
        }
    }

    /// 是否为解码失败（文件缺失或不是有效图像）
    pub fn is_decode(&self) -> bool {
        matches!(self, DatasetError::Decode { .. })
    }
}
