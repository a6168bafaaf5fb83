//! Data loading: the raw-to-labeled dataset pipeline and the batch
//! abstraction consumed by the trainer.

pub mod clean;
pub mod labeled;
pub mod memory;
pub mod pipeline;
pub mod raw;

pub use self::labeled::{LabeledDataset, LabeledRow};
pub use self::memory::InMemoryDataset;
pub use self::pipeline::{DatasetPipeline, DatasetSummary, Stage};
pub use self::raw::RawTable;

use ndarray::{Array1, Array2};
use std::{fmt::Debug, ops::Range};

/// Source of `(features, targets)` mini-batches.
pub trait Dataset {
    type Error: Debug;

    /// Total number of samples, if known.
    fn len(&self) -> Option<usize>;

    fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Iterate over consecutive batches of at most `batch_size` rows.
    fn batches(&self, batch_size: usize) -> DatasetBatchIter<'_, Self>
    where
        Self: Sized,
    {
        DatasetBatchIter {
            dataset: self,
            batch_size: batch_size.max(1),
            current: 0,
        }
    }

    fn get_batch(&self, range: Range<usize>) -> Result<(Array2<f64>, Array1<f64>), Self::Error>;
}

pub struct DatasetBatchIter<'a, D: ?Sized> {
    dataset: &'a D,
    batch_size: usize,
    current: usize,
}

impl<D: Dataset> Iterator for DatasetBatchIter<'_, D> {
    type Item = Result<(Array2<f64>, Array1<f64>), D::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.dataset.len()?;
        if self.current >= total {
            return None;
        }

        let end = (self.current + self.batch_size).min(total);
        let range = self.current..end;
        self.current = end;

        Some(self.dataset.get_batch(range))
    }
}
