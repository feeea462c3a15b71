use crate::dataset::Dataset;
use crate::image::{ColorMode, ImageLoader, Preprocessor};
use crate::utils::error::DatasetError;
use crate::Result;
use ndarray::Array3;
use std::path::{Path, PathBuf};

/// 顺序数据集加载器
///
/// 对每个路径：解码图像、从父目录名得到标签、依次应用预处理阶段，
/// 结果按输入顺序追加到 [`Dataset`]。
/// 任何一个文件解码失败都会中止整个加载。
///
/// 默认把所有图像解码为3通道RGB，因此缩放后的图像形状一致。
#[derive(Default)]
pub struct SimpleDatasetLoader {
    preprocessors: Vec<Box<dyn Preprocessor>>,
    color_mode: ColorMode,
}

impl SimpleDatasetLoader {
    pub fn new(preprocessors: Vec<Box<dyn Preprocessor>>) -> Self {
        Self {
            preprocessors,
            color_mode: ColorMode::default(),
        }
    }

    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// 预处理阶段数量
    pub fn stages(&self) -> usize {
        self.preprocessors.len()
    }

    /// 加载数据集，`progress_interval > 0` 时每处理该数量的图像记录一次进度
    ///
    /// 进度以 `processed X/Y` 的 `info` 日志输出，调用方需要先安装 `tracing`
    /// 订阅者（例如 [`utils::logging::init`](crate::utils::logging::init)），
    /// 否则不会打印。需要自行处理进度时使用
    /// [`load_with_progress`](Self::load_with_progress)。
    pub fn load<P: AsRef<Path>>(&self, paths: &[P], progress_interval: usize) -> Result<Dataset> {
        let dataset = self.load_with_progress(paths, progress_interval, |processed, total| {
            tracing::info!("processed {}/{}", processed, total);
        })?;

        tracing::info!(
            "Loaded {} images across {} classes",
            dataset.len(),
            dataset.class_names().len()
        );
        Ok(dataset)
    }

    /// 与 [`load`](Self::load) 相同，但进度通知交给调用方处理
    pub fn load_with_progress<P, F>(
        &self,
        paths: &[P],
        progress_interval: usize,
        mut on_progress: F,
    ) -> Result<Dataset>
    where
        P: AsRef<Path>,
        F: FnMut(usize, usize),
    {
        let total = paths.len();
        let mut dataset = Dataset::with_capacity(total);

        for (i, path) in paths.iter().enumerate() {
            let path = path.as_ref();

            let image = ImageLoader::load_array(path, self.color_mode)?;
            let label = derive_label(path)?;
            let image = self.preprocess(image)?;

            dataset.push(image, label);

            let processed = i + 1;
            if progress_interval > 0 && processed % progress_interval == 0 {
                on_progress(processed, total);
            }
        }

        Ok(dataset)
    }

    /// 按顺序应用所有预处理阶段
    pub fn preprocess(&self, image: Array3<f32>) -> Result<Array3<f32>> {
        self.preprocessors
            .iter()
            .try_fold(image, |image, stage| stage.preprocess(image))
    }
}

/// 从路径得到标签：`.../<label>/<filename>` 中的 `<label>`
pub fn derive_label(path: &Path) -> Result<String> {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            DatasetError::InvalidInput(format!(
                "Cannot derive label, no parent directory: {}",
                path.display()
            ))
        })
}

/// 递归收集目录下的图像文件，按路径排序
pub fn list_images(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(DatasetError::InvalidInput(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let mut images = Vec::new();
    collect_images(root, &mut images)?;
    images.sort();

    tracing::debug!("Found {} images under {}", images.len(), root.display());
    Ok(images)
}

fn collect_images(dir: &Path, images: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_images(&path, images)?;
        } else if ImageLoader::is_supported_extension(&path) {
            images.push(path);
        }
    }

    Ok(())
}
