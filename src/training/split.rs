//! Seeded row selection: train/test splits and subsampling.
//!
//! All functions work on row indices so the same selection can be applied
//! to features and labels alike. The same seed always yields the same rows.

use crate::error::{AdvisorError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of a train/test split.
///
/// `train` is in shuffled order (it feeds mini-batch SGD directly); `test`
/// is ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn test_count(n: usize, test_size: f64) -> usize {
    ((n as f64 * test_size).ceil() as usize).clamp(1, n - 1)
}

fn check_split_args(n: usize, test_size: f64) -> Result<()> {
    if n < 2 {
        return Err(AdvisorError::EmptyDataset(format!(
            "need at least 2 rows to split, got {n}"
        )));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(AdvisorError::Config(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }
    Ok(())
}

fn finish(mut train: Vec<usize>, mut test: Vec<usize>, rng: &mut StdRng) -> Split {
    train.sort_unstable();
    train.shuffle(rng);
    test.sort_unstable();
    Split { train, test }
}

/// Uniform random split; at least one row lands on each side.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<Split> {
    check_split_args(n, test_size)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);

    let train = indices.split_off(test_count(n, test_size));
    Ok(finish(train, indices, &mut rng))
}

/// Split that keeps the class ratio of `labels` on both sides.
///
/// Each class contributes `round(count * test_size)` rows to the test side,
/// and at least one row to each side when it has two or more members. Falls
/// back to [`train_test_split`] when that leaves a side empty.
pub fn stratified_split(labels: &[bool], test_size: f64, seed: u64) -> Result<Split> {
    let n = labels.len();
    check_split_args(n, test_size)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut train = Vec::with_capacity(n);
    let mut test = Vec::new();
    for class in [false, true] {
        let mut members: Vec<usize> = (0..n).filter(|&i| labels[i] == class).collect();
        members.shuffle(&mut rng);
        let count = members.len();
        let mut k = (count as f64 * test_size).round() as usize;
        if count >= 2 {
            k = k.clamp(1, count - 1);
        }
        let rest = members.split_off(k.min(count));
        test.extend(members);
        train.extend(rest);
    }

    if train.is_empty() || test.is_empty() {
        return train_test_split(n, test_size, seed);
    }
    Ok(finish(train, test, &mut rng))
}

/// Ascending indices of a seeded random subset of at most `max_rows` rows.
pub fn subsample(n: usize, max_rows: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    if max_rows >= n {
        return indices;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices.truncate(max_rows);
    indices.sort_unstable();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn assert_partition(split: &Split, n: usize) {
        let all: BTreeSet<usize> = split.train.iter().chain(&split.test).copied().collect();
        assert_eq!(all.len(), n);
        assert_eq!(split.train.len() + split.test.len(), n);
    }

    #[test]
    fn test_split_sizes_and_partition() {
        let split = train_test_split(100, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);
        assert_partition(&split, 100);
        assert!(split.test.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_split_is_deterministic() {
        assert_eq!(
            train_test_split(50, 0.3, 7).unwrap(),
            train_test_split(50, 0.3, 7).unwrap()
        );
        assert_ne!(
            train_test_split(50, 0.3, 7).unwrap().test,
            train_test_split(50, 0.3, 8).unwrap().test
        );
    }

    #[test]
    fn test_tiny_split_keeps_both_sides() {
        let split = train_test_split(2, 0.2, 1).unwrap();
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.train.len(), 1);
        assert!(train_test_split(1, 0.2, 1).is_err());
        assert!(train_test_split(10, 1.0, 1).is_err());
    }

    #[test]
    fn test_stratified_preserves_ratio() {
        let labels: Vec<bool> = (0..100).map(|i| i % 4 == 0).collect();
        let split = stratified_split(&labels, 0.2, 42).unwrap();
        assert_partition(&split, 100);

        let test_pos = split.test.iter().filter(|&&i| labels[i]).count();
        let train_pos = split.train.iter().filter(|&&i| labels[i]).count();
        assert_eq!(test_pos, 5);
        assert_eq!(train_pos, 20);
        assert_eq!(split.test.len(), 20);
    }

    #[test]
    fn test_stratified_single_class() {
        let labels = vec![true; 10];
        let split = stratified_split(&labels, 0.2, 3).unwrap();
        assert_partition(&split, 10);
        assert_eq!(split.test.len(), 2);
    }

    #[test]
    fn test_stratified_degenerate_classes() {
        let split = stratified_split(&[true, false], 0.2, 3).unwrap();
        assert_partition(&split, 2);
        assert_eq!(split.test.len(), 1);
    }

    #[test]
    fn test_subsample() {
        assert_eq!(subsample(5, 10, 1), vec![0, 1, 2, 3, 4]);

        let picked = subsample(1000, 100, 9);
        assert_eq!(picked.len(), 100);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(picked, subsample(1000, 100, 9));
    }
}
