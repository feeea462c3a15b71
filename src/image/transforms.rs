use crate::utils::error::DatasetError;
use crate::Result;
use ndarray::{s, Array3, Axis};
use serde::{Deserialize, Serialize};

/// 缩放插值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// 最近邻
    Nearest,
    /// 双线性
    Linear,
    /// 区域平均（缩小时按像素覆盖面积加权，放大时退化为双线性）
    #[default]
    Area,
    /// 双三次（Keys, a = -0.75）
    Cubic,
}

/// HWC图像的空间轴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAxis {
    Height,
    Width,
}

impl ImageAxis {
    fn index(self) -> usize {
        match self {
            ImageAxis::Height => 0,
            ImageAxis::Width => 1,
        }
    }
}

/// 每个目标像素对应的源像素及权重
type Taps = Vec<Vec<(usize, f32)>>;

const CUBIC_A: f32 = -0.75;

/// 图像变换工具集（HWC布局，f32像素）
pub struct ImageTransforms;

impl ImageTransforms {
    /// 缩放到精确尺寸，不保持宽高比
    pub fn resize(
        image: &Array3<f32>,
        target_width: usize,
        target_height: usize,
        interpolation: Interpolation,
    ) -> Result<Array3<f32>> {
        if target_width == 0 || target_height == 0 {
            return Err(DatasetError::InvalidInput(format!(
                "Invalid resize target: {}x{}",
                target_width, target_height
            )));
        }

        let (orig_h, orig_w, _) = image.dim();
        if orig_h == 0 || orig_w == 0 {
            return Err(DatasetError::InvalidInput(format!(
                "Cannot resize empty image: {}x{}",
                orig_w, orig_h
            )));
        }

        if orig_h == target_height && orig_w == target_width {
            return Ok(image.clone());
        }

        // 可分离：先缩放高度，再缩放宽度
        let rows = Self::resample_axis(image, 0, target_height, interpolation);
        let mut resized = Self::resample_axis(&rows, 1, target_width, interpolation);

        if interpolation == Interpolation::Cubic {
            resized.mapv_inplace(|v| v.clamp(0.0, 255.0));
        }

        Ok(resized)
    }

    /// 按目标宽度等比缩放
    pub fn resize_to_width(
        image: &Array3<f32>,
        target_width: usize,
        interpolation: Interpolation,
    ) -> Result<Array3<f32>> {
        let (h, w, _) = image.dim();
        if w == 0 {
            return Err(DatasetError::InvalidInput("Image has zero width".to_string()));
        }
        let new_h = (h * target_width / w).max(1);
        Self::resize(image, target_width, new_h, interpolation)
    }

    /// 按目标高度等比缩放
    pub fn resize_to_height(
        image: &Array3<f32>,
        target_height: usize,
        interpolation: Interpolation,
    ) -> Result<Array3<f32>> {
        let (h, w, _) = image.dim();
        if h == 0 {
            return Err(DatasetError::InvalidInput("Image has zero height".to_string()));
        }
        let new_w = (w * target_height / h).max(1);
        Self::resize(image, new_w, target_height, interpolation)
    }

    /// 沿指定轴从两侧各裁掉 `delta` 个像素
    pub fn center_crop_axis(
        image: &Array3<f32>,
        axis: ImageAxis,
        delta: usize,
    ) -> Result<Array3<f32>> {
        let len = image.len_of(Axis(axis.index()));
        if delta * 2 >= len {
            return Err(DatasetError::InvalidInput(format!(
                "Crop delta {} removes the whole {:?} axis of length {}",
                delta, axis, len
            )));
        }
        if delta == 0 {
            return Ok(image.clone());
        }

        let cropped = match axis {
            ImageAxis::Height => image.slice(s![delta..len - delta, .., ..]),
            ImageAxis::Width => image.slice(s![.., delta..len - delta, ..]),
        };

        Ok(cropped.to_owned())
    }

    fn resample_axis(
        image: &Array3<f32>,
        axis: usize,
        dst_len: usize,
        interpolation: Interpolation,
    ) -> Array3<f32> {
        let src_len = image.len_of(Axis(axis));
        let mut shape = image.raw_dim();
        shape[axis] = dst_len;
        let mut resampled = Array3::<f32>::zeros(shape);

        let taps = Self::axis_taps(src_len, dst_len, interpolation);
        for (dst, weights) in taps.iter().enumerate() {
            let mut lane = resampled.index_axis_mut(Axis(axis), dst);
            for &(src, weight) in weights {
                lane.scaled_add(weight, &image.index_axis(Axis(axis), src));
            }
        }

        resampled
    }

    fn axis_taps(src_len: usize, dst_len: usize, interpolation: Interpolation) -> Taps {
        if src_len == dst_len {
            return (0..src_len).map(|i| vec![(i, 1.0)]).collect();
        }

        let scale = src_len as f32 / dst_len as f32;
        match interpolation {
            Interpolation::Nearest => (0..dst_len)
                .map(|d| {
                    let src = ((d as f32 * scale).floor() as usize).min(src_len - 1);
                    vec![(src, 1.0)]
                })
                .collect(),
            Interpolation::Linear => Self::linear_taps(src_len, dst_len, scale),
            Interpolation::Cubic => Self::cubic_taps(src_len, dst_len, scale),
            Interpolation::Area if scale > 1.0 => Self::area_taps(src_len, dst_len, scale),
            Interpolation::Area => Self::linear_taps(src_len, dst_len, scale),
        }
    }

    fn linear_taps(src_len: usize, dst_len: usize, scale: f32) -> Taps {
        (0..dst_len)
            .map(|d| {
                let x = (d as f32 + 0.5) * scale - 0.5;
                let x0 = x.floor();
                let t = x - x0;
                let x0 = x0 as isize;
                vec![
                    (clamp_index(x0, src_len), 1.0 - t),
                    (clamp_index(x0 + 1, src_len), t),
                ]
            })
            .collect()
    }

    fn cubic_taps(src_len: usize, dst_len: usize, scale: f32) -> Taps {
        (0..dst_len)
            .map(|d| {
                let x = (d as f32 + 0.5) * scale - 0.5;
                let x0 = x.floor();
                let t = x - x0;
                let x0 = x0 as isize;
                (-1..=2)
                    .map(|k| (clamp_index(x0 + k, src_len), cubic_weight(k as f32 - t)))
                    .collect()
            })
            .collect()
    }

    fn area_taps(src_len: usize, dst_len: usize, scale: f32) -> Taps {
        (0..dst_len)
            .map(|d| {
                let start = d as f32 * scale;
                let end = ((d + 1) as f32 * scale).min(src_len as f32);
                let first = start.floor() as usize;
                let last = (end.ceil() as usize).min(src_len);

                (first..last)
                    .filter_map(|s| {
                        let overlap = end.min((s + 1) as f32) - start.max(s as f32);
                        (overlap > 0.0).then(|| (s, overlap / scale))
                    })
                    .collect()
            })
            .collect()
    }
}

fn clamp_index(index: isize, len: usize) -> usize {
    index.clamp(0, len as isize - 1) as usize
}

fn cubic_weight(distance: f32) -> f32 {
    let x = distance.abs();
    if x <= 1.0 {
        ((CUBIC_A + 2.0) * x - (CUBIC_A + 3.0)) * x * x + 1.0
    } else if x < 2.0 {
        ((CUBIC_A * x - 5.0 * CUBIC_A) * x + 8.0 * CUBIC_A) * x - 4.0 * CUBIC_A
    } else {
        0.0
    }
}
