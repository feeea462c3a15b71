use crate::image::transforms::{ImageAxis, ImageTransforms, Interpolation};
use crate::utils::error::DatasetError;
use crate::Result;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

/// 单个预处理阶段
///
/// 每个阶段在构造时配置一次，之后对每张图像独立调用，调用之间不保留状态。
pub trait Preprocessor: Send + Sync {
    fn preprocess(&self, image: Array3<f32>) -> Result<Array3<f32>>;
}

impl<F> Preprocessor for F
where
    F: Fn(Array3<f32>) -> Result<Array3<f32>> + Send + Sync,
{
    fn preprocess(&self, image: Array3<f32>) -> Result<Array3<f32>> {
        self(image)
    }
}

/// 保持宽高比的缩放 + 中心裁剪
///
/// 先沿短边缩放到目标尺寸，再从长边两侧对称裁掉多余部分，
/// 最后缩放到精确的 (width, height)。
#[derive(Debug, Clone)]
pub struct AspectAwarePreprocessor {
    width: usize,
    height: usize,
    interpolation: Interpolation,
}

impl AspectAwarePreprocessor {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::with_interpolation(width, height, Interpolation::default())
    }

    pub fn with_interpolation(
        width: usize,
        height: usize,
        interpolation: Interpolation,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DatasetError::Config(format!(
                "Target size must be positive, got {}x{}",
                width, height
            )));
        }

        Ok(Self {
            width,
            height,
            interpolation,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

impl Preprocessor for AspectAwarePreprocessor {
    fn preprocess(&self, image: Array3<f32>) -> Result<Array3<f32>> {
        let (h, w, _) = image.dim();

        // 沿短边缩放；宽高相等时按高度缩放
        let (resized, crop_axis, resized_len, target_len) = if w < h {
            let resized = ImageTransforms::resize_to_width(&image, self.width, self.interpolation)?;
            let len = resized.dim().0;
            (resized, ImageAxis::Height, len, self.height)
        } else {
            let resized =
                ImageTransforms::resize_to_height(&image, self.height, self.interpolation)?;
            let len = resized.dim().1;
            (resized, ImageAxis::Width, len, self.width)
        };

        if resized_len < target_len {
            tracing::warn!(
                "{:?} axis is {} after resize, shorter than target {}; skipping crop",
                crop_axis,
                resized_len,
                target_len
            );
        }
        let delta = resized_len.saturating_sub(target_len) / 2;

        let cropped = ImageTransforms::center_crop_axis(&resized, crop_axis, delta)?;

        // 最终缩放消除取整带来的一像素误差
        ImageTransforms::resize(&cropped, self.width, self.height, self.interpolation)
    }
}

/// 数组通道布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    /// HxWxC
    #[default]
    ChannelsLast,
    /// CxHxW
    ChannelsFirst,
}

/// 将图像整理为训练代码期望的数组布局
#[derive(Debug, Clone, Default)]
pub struct ImageToArrayPreprocessor {
    data_format: DataFormat,
}

impl ImageToArrayPreprocessor {
    pub fn new(data_format: DataFormat) -> Self {
        Self { data_format }
    }

    pub fn data_format(&self) -> DataFormat {
        self.data_format
    }
}

impl Preprocessor for ImageToArrayPreprocessor {
    fn preprocess(&self, image: Array3<f32>) -> Result<Array3<f32>> {
        match self.data_format {
            DataFormat::ChannelsLast => Ok(image.as_standard_layout().into_owned()),
            DataFormat::ChannelsFirst => Ok(image
                .permuted_axes([2, 0, 1])
                .as_standard_layout()
                .into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logging::capture;

    fn gradient(height: usize, width: usize, channels: usize) -> Array3<f32> {
        Array3::from_shape_fn((height, width, channels), |(h, w, c)| {
            ((h * 5 + w * 13 + c * 29) % 256) as f32
        })
    }

    #[test]
    fn test_zero_size_is_config_error() {
        assert_eq!(
            AspectAwarePreprocessor::new(0, 64).unwrap_err().error_code(),
            "CONFIG_ERROR"
        );
        assert!(AspectAwarePreprocessor::new(64, 0).is_err());
    }

    #[test]
    fn test_default_interpolation_is_area() {
        let aap = AspectAwarePreprocessor::new(32, 32).unwrap();
        assert_eq!(aap.interpolation(), Interpolation::Area);
    }

    #[test]
    fn test_output_size_for_any_aspect() {
        let targets = [(64, 64), (32, 48), (48, 20), (1, 1), (7, 3)];
        let inputs = [(100, 50), (50, 100), (64, 64), (1, 1), (3, 200), (200, 3), (17, 23)];

        for &(tw, th) in &targets {
            let aap = AspectAwarePreprocessor::new(tw, th).unwrap();
            for &(ih, iw) in &inputs {
                let out = aap.preprocess(gradient(ih, iw, 3)).unwrap();
                assert_eq!(out.dim(), (th, tw, 3), "input {}x{} target {}x{}", iw, ih, tw, th);
            }
        }
    }

    #[test]
    fn test_channel_depth_preserved() {
        let aap = AspectAwarePreprocessor::new(16, 16).unwrap();
        assert_eq!(aap.preprocess(gradient(40, 30, 1)).unwrap().dim(), (16, 16, 1));
        assert_eq!(aap.preprocess(gradient(40, 30, 4)).unwrap().dim(), (16, 16, 4));
    }

    #[test]
    fn test_portrait_crops_height_symmetrically() {
        // 宽 4 高 8，目标 4x4：宽度不变，从上下各裁掉 2 行
        let image = gradient(8, 4, 1);
        let aap = AspectAwarePreprocessor::new(4, 4).unwrap();
        let out = aap.preprocess(image.clone()).unwrap();

        assert_eq!(out, image.slice(ndarray::s![2..6, .., ..]).to_owned());
    }

    #[test]
    fn test_landscape_crops_width_symmetrically() {
        let image = gradient(4, 10, 2);
        let aap = AspectAwarePreprocessor::new(4, 4).unwrap();
        let out = aap.preprocess(image.clone()).unwrap();

        assert_eq!(out, image.slice(ndarray::s![.., 3..7, ..]).to_owned());
    }

    #[test]
    fn test_square_input_resizes_by_height() {
        // 宽高相等走按高度缩放的分支：16x16 -> 高 8 宽 8，再裁剪宽度到目标宽 4
        let image = gradient(16, 16, 3);
        let aap =
            AspectAwarePreprocessor::with_interpolation(4, 8, Interpolation::Nearest).unwrap();
        let out = aap.preprocess(image.clone()).unwrap();

        let expected =
            ImageTransforms::resize_to_height(&image, 8, Interpolation::Nearest).unwrap();
        let expected = expected.slice(ndarray::s![.., 2..6, ..]).to_owned();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_already_target_size_is_unchanged() {
        let image = gradient(48, 32, 3);
        let aap = AspectAwarePreprocessor::new(32, 48).unwrap();
        assert_eq!(aap.preprocess(image.clone()).unwrap(), image);
    }

    #[test]
    fn test_idempotent() {
        for interpolation in [Interpolation::Area, Interpolation::Linear, Interpolation::Cubic] {
            let aap = AspectAwarePreprocessor::with_interpolation(24, 24, interpolation).unwrap();
            let once = aap.preprocess(gradient(90, 61, 3)).unwrap();
            let twice = aap.preprocess(once.clone()).unwrap();
            assert_eq!(once, twice, "{:?}", interpolation);
        }
    }

    #[test]
    fn test_narrow_resize_is_stretched_not_cropped() {
        // 按宽度缩放后高度 (12) 小于目标高度 (20)，不裁剪，由最终缩放拉伸
        let (buffer, _guard) = capture::capture();
        let aap = AspectAwarePreprocessor::new(10, 20).unwrap();
        let out = aap.preprocess(gradient(12, 10, 3)).unwrap();
        assert_eq!(out.dim(), (20, 10, 3));

        let warnings = buffer.lines_containing("skipping crop");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("WARN"));
        assert!(warnings[0].contains("Height axis is 12 after resize, shorter than target 20"));
    }

    #[test]
    fn test_regular_crop_does_not_warn() {
        let (buffer, _guard) = capture::capture();
        let aap = AspectAwarePreprocessor::new(16, 16).unwrap();
        aap.preprocess(gradient(40, 30, 3)).unwrap();
        assert!(buffer.lines_containing("skipping crop").is_empty());
    }

    #[test]
    fn test_image_to_array_channels_first() {
        let image = gradient(2, 3, 4);
        let iap = ImageToArrayPreprocessor::new(DataFormat::ChannelsFirst);
        let out = iap.preprocess(image.clone()).unwrap();

        assert_eq!(out.dim(), (4, 2, 3));
        assert_eq!(out[[3, 1, 2]], image[[1, 2, 3]]);
        assert!(out.is_standard_layout());
    }

    #[test]
    fn test_image_to_array_channels_last_passthrough() {
        let image = gradient(5, 6, 3);
        let iap = ImageToArrayPreprocessor::default();
        assert_eq!(iap.data_format(), DataFormat::ChannelsLast);
        assert_eq!(iap.preprocess(image.clone()).unwrap(), image);
    }

    #[test]
    fn test_closure_as_preprocessor() {
        let halve = |image: Array3<f32>| -> Result<Array3<f32>> { Ok(image.mapv(|v| v / 2.0)) };
        let out = halve.preprocess(Array3::from_elem((1, 1, 1), 8.0)).unwrap();
        assert_eq!(out[[0, 0, 0]], 4.0);
    }
}
