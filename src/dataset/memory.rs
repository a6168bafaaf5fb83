use crate::dataset::Dataset;
use crate::preprocessing::PreprocessingError;
use ndarray::{s, Array1, Array2};
use std::ops::Range;

/// Dense design matrix with one target per row.
pub struct InMemoryDataset {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl InMemoryDataset {
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self, PreprocessingError> {
        if x.nrows() != y.len() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} targets", x.nrows()),
                got: format!("{} targets", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(PreprocessingError::EmptyData("Dataset is empty".into()));
        }
        Ok(Self { x, y })
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

impl Dataset for InMemoryDataset {
    type Error = std::convert::Infallible;

    fn len(&self) -> Option<usize> {
        Some(self.x.nrows())
    }

    fn get_batch(&self, range: Range<usize>) -> Result<(Array2<f64>, Array1<f64>), Self::Error> {
        let x = self.x.slice(s![range.clone(), ..]).to_owned();
        let y = self.y.slice(s![range]).to_owned();
        Ok((x, y))
    }
}
