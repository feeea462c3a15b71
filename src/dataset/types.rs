use crate::utils::error::DatasetError;
use crate::Result;
use ndarray::{Array3, Array4, Axis};
use std::collections::BTreeSet;

/// 加载结果：按输入顺序排列、下标对齐的图像与标签
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    images: Vec<Array3<f32>>,
    labels: Vec<String>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            images: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    /// 追加一个样本，图像与标签写入同一下标
    pub fn push(&mut self, image: Array3<f32>, label: String) {
        self.images.push(image);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[Array3<f32>] {
        &self.images
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Array3<f32>, &str)> {
        self.images
            .iter()
            .zip(self.labels.iter().map(String::as_str))
    }

    /// 去重并排序后的类别名
    pub fn class_names(&self) -> Vec<String> {
        self.labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 堆叠为 (N, d0, d1, d2) 的四维数组，要求所有图像形状一致
    pub fn to_array4(&self) -> Result<Array4<f32>> {
        let first = match self.images.first() {
            Some(image) => image.shape().to_vec(),
            None => return Ok(Array4::zeros((0, 0, 0, 0))),
        };

        if let Some((index, image)) = self
            .images
            .iter()
            .enumerate()
            .find(|(_, image)| image.shape() != first.as_slice())
        {
            return Err(DatasetError::ShapeMismatch {
                index,
                expected: first,
                found: image.shape().to_vec(),
            });
        }

        let views: Vec<_> = self.images.iter().map(|image| image.view()).collect();
        ndarray::stack(Axis(0), &views)
            .map_err(|e| DatasetError::InvalidInput(format!("Failed to stack images: {}", e)))
    }

    pub fn into_parts(self) -> (Vec<Array3<f32>>, Vec<String>) {
        (self.images, self.labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(dataset: &mut Dataset, shape: (usize, usize, usize), value: f32, label: &str) {
        dataset.push(Array3::from_elem(shape, value), label.to_string());
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::new();
        assert!(dataset.is_empty());
        assert_eq!(dataset.len(), 0);
        assert!(dataset.class_names().is_empty());
        assert_eq!(dataset.to_array4().unwrap().dim(), (0, 0, 0, 0));
    }

    #[test]
    fn test_push_keeps_alignment() {
        let mut dataset = Dataset::with_capacity(2);
        sample(&mut dataset, (2, 2, 3), 1.0, "tulip");
        sample(&mut dataset, (2, 2, 3), 2.0, "daisy");

        let pairs: Vec<_> = dataset.iter().map(|(img, label)| (img[[0, 0, 0]], label)).collect();
        assert_eq!(pairs, vec![(1.0, "tulip"), (2.0, "daisy")]);
    }

    #[test]
    fn test_class_names_sorted_unique() {
        let mut dataset = Dataset::new();
        for label in ["tulip", "daisy", "tulip", "bluebell"] {
            sample(&mut dataset, (1, 1, 1), 0.0, label);
        }
        assert_eq!(dataset.class_names(), vec!["bluebell", "daisy", "tulip"]);
        assert_eq!(dataset.labels().len(), 4);
    }

    #[test]
    fn test_to_array4_stacks_in_order() {
        let mut dataset = Dataset::new();
        sample(&mut dataset, (4, 5, 3), 10.0, "a");
        sample(&mut dataset, (4, 5, 3), 20.0, "b");

        let stacked = dataset.to_array4().unwrap();
        assert_eq!(stacked.dim(), (2, 4, 5, 3));
        assert_eq!(stacked[[0, 3, 4, 2]], 10.0);
        assert_eq!(stacked[[1, 0, 0, 0]], 20.0);
    }

    #[test]
    fn test_to_array4_shape_mismatch() {
        let mut dataset = Dataset::new();
        sample(&mut dataset, (4, 4, 3), 0.0, "a");
        sample(&mut dataset, (4, 4, 3), 0.0, "a");
        sample(&mut dataset, (4, 5, 3), 0.0, "b");

        match dataset.to_array4() {
            Err(DatasetError::ShapeMismatch { index, expected, found }) => {
                assert_eq!(index, 2);
                assert_eq!(expected, vec![4, 4, 3]);
                assert_eq!(found, vec![4, 5, 3]);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_into_parts() {
        let mut dataset = Dataset::new();
        sample(&mut dataset, (1, 1, 1), 0.0, "rose");
        let (images, labels) = dataset.into_parts();
        assert_eq!(images.len(), 1);
        assert_eq!(labels, vec!["rose".to_string()]);
    }
}
