use crate::utils::error::DatasetError;
use crate::Result;
use image::{DynamicImage, GenericImageView};
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 支持的图像扩展名（不区分大小写）
pub const IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

/// 解码后的通道处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// 统一转换为3通道RGB
    #[default]
    Rgb,
    /// 保留文件自身的通道数（灰度1、灰度+alpha 2、RGB 3、RGBA 4）
    Native,
}

pub struct ImageLoader;

impl ImageLoader {
    /// 从文件路径加载图像
    pub fn from_path(path: &Path) -> Result<DynamicImage> {
        image::open(path).map_err(|e| DatasetError::decode(path.display().to_string(), e))
    }

    /// 从内存字节加载图像
    pub fn from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| DatasetError::decode("<memory>", e))
    }

    /// 从文件加载并转换为HWC数组
    pub fn load_array(path: &Path, color_mode: ColorMode) -> Result<Array3<f32>> {
        let image = Self::from_path(path)?;
        let (width, height) = image.dimensions();
        tracing::debug!("Decoded {} ({}x{})", path.display(), width, height);

        Self::to_array3(&image, color_mode)
    }

    /// 根据扩展名判断是否为图像文件
    pub fn is_supported_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// 转换DynamicImage为ndarray::Array3<f32> (HWC格式)
    ///
    /// 像素值保持在 [0, 255]，16位和浮点图像先转换为8位。
    pub fn to_array3(image: &DynamicImage, color_mode: ColorMode) -> Result<Array3<f32>> {
        let (width, height) = image.dimensions();

        let (raw_data, channels) = match color_mode {
            ColorMode::Rgb => (image.to_rgb8().into_raw(), 3),
            ColorMode::Native => match image.color().channel_count() {
                1 => (image.to_luma8().into_raw(), 1),
                2 => (image.to_luma_alpha8().into_raw(), 2),
                3 => (image.to_rgb8().into_raw(), 3),
                _ => (image.to_rgba8().into_raw(), 4),
            },
        };

        let pixels: Vec<f32> = raw_data.into_iter().map(f32::from).collect();
        Array3::from_shape_vec((height as usize, width as usize, channels), pixels).map_err(|e| {
            DatasetError::InvalidInput(format!(
                "Pixel buffer does not match {}x{}x{}: {}",
                width, height, channels, e
            ))
        })
    }
}
