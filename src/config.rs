use crate::dataset::SimpleDatasetLoader;
use crate::image::{
    AspectAwarePreprocessor, ColorMode, DataFormat, ImageToArrayPreprocessor, Interpolation,
    Preprocessor,
};
use crate::utils::error::DatasetError;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 目标宽度
    pub width: usize,

    /// 目标高度
    pub height: usize,

    /// 缩放插值方式
    pub interpolation: Interpolation,

    /// 输出数组布局
    pub data_format: DataFormat,

    /// 解码通道方式，默认统一为RGB；`native` 保留文件自身通道数
    pub color_mode: ColorMode,

    /// 每处理多少张图像记录一次进度，0 表示不记录
    pub progress_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            interpolation: Interpolation::Area,
            data_format: DataFormat::ChannelsLast,
            color_mode: ColorMode::Rgb,
            progress_interval: 500,
        }
    }
}

impl Config {
    pub fn new(
        width: usize,
        height: usize,
        interpolation: Option<Interpolation>,
        progress_interval: Option<usize>,
    ) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            width,
            height,
            interpolation: interpolation.unwrap_or(defaults.interpolation),
            progress_interval: progress_interval.unwrap_or(defaults.progress_interval),
            ..defaults
        };
        config.validate()?;

        Ok(config)
    }

    pub fn with_data_format(mut self, data_format: DataFormat) -> Self {
        self.data_format = data_format;
        self
    }

    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DatasetError::Config(format!(
                "Target size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// 从JSON字符串解析，缺省字段取默认值
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从JSON文件加载
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        Self::from_json_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// 构建加载器：先保持宽高比缩放裁剪，再整理数组布局
    pub fn build_loader(&self) -> Result<SimpleDatasetLoader> {
        let aap = AspectAwarePreprocessor::with_interpolation(
            self.width,
            self.height,
            self.interpolation,
        )?;
        let iap = ImageToArrayPreprocessor::new(self.data_format);

        tracing::debug!(
            "Building loader: {}x{} {:?} {:?} {:?}",
            aap.width(),
            aap.height(),
            aap.interpolation(),
            iap.data_format(),
            self.color_mode
        );

        let stages: Vec<Box<dyn Preprocessor>> = vec![Box::new(aap), Box::new(iap)];
        Ok(SimpleDatasetLoader::new(stages).with_color_mode(self.color_mode))
    }
}
