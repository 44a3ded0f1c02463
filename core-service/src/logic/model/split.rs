//! Train/Test Split
//!
//! Seeded shuffle, optionally stratified by label so both partitions keep
//! the class ratio.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::tree::N_CLASSES;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplitError {
    #[error("test_size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),

    #[error("the least populated class ({class}) has only {count} member(s); stratification needs at least 2")]
    ClassTooSmall { class: u8, count: usize },

    #[error("split of {0} rows leaves no training rows")]
    EmptyTrainSet(usize),
}

/// Row indices of each partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

pub fn train_test_split(
    labels: &[u8],
    test_size: f64,
    stratify: bool,
    seed: u64,
) -> Result<SplitIndices, SplitError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SplitError::InvalidTestSize(test_size));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    if stratify {
        for class in 0..N_CLASSES as u8 {
            let mut members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|&(_, &l)| l == class)
                .map(|(i, _)| i)
                .collect();

            if members.is_empty() {
                continue;
            }
            if members.len() < 2 {
                return Err(SplitError::ClassTooSmall { class, count: members.len() });
            }

            members.shuffle(&mut rng);
            let n_test = ((members.len() as f64 * test_size).round() as usize).min(members.len() - 1);
            test.extend_from_slice(&members[..n_test]);
            train.extend_from_slice(&members[n_test..]);
        }
    } else {
        let mut all: Vec<usize> = (0..labels.len()).collect();
        all.shuffle(&mut rng);
        let n_test = (labels.len() as f64 * test_size).ceil() as usize;
        let n_test = n_test.min(labels.len().saturating_sub(1));
        test.extend_from_slice(&all[..n_test]);
        train.extend_from_slice(&all[n_test..]);
    }

    if train.is_empty() {
        return Err(SplitError::EmptyTrainSet(labels.len()));
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let labels: Vec<u8> = (0..100).map(|i| if i < 80 { 0 } else { 1 }).collect();
        let split = train_test_split(&labels, 0.2, false, 42).unwrap();
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);
    }

    #[test]
    fn test_stratified_keeps_ratio() {
        let labels: Vec<u8> = (0..100).map(|i| if i < 90 { 0 } else { 1 }).collect();
        let split = train_test_split(&labels, 0.2, true, 42).unwrap();

        let test_theft = split.test.iter().filter(|&&i| labels[i] == 1).count();
        let train_theft = split.train.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(test_theft, 2);
        assert_eq!(train_theft, 8);
        assert_eq!(split.test.len() + split.train.len(), 100);
    }

    #[test]
    fn test_partitions_disjoint_and_deterministic() {
        let labels: Vec<u8> = (0..50).map(|i| (i % 3 == 0) as u8).collect();
        let a = train_test_split(&labels, 0.2, true, 7).unwrap();
        let b = train_test_split(&labels, 0.2, true, 7).unwrap();
        assert_eq!(a, b);

        for i in &a.test {
            assert!(!a.train.contains(i));
        }
    }

    #[test]
    fn test_stratify_rejects_singleton_class() {
        let labels = vec![0, 0, 0, 0, 1];
        assert_eq!(
            train_test_split(&labels, 0.2, true, 1),
            Err(SplitError::ClassTooSmall { class: 1, count: 1 })
        );
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(train_test_split(&[0, 1], 0.0, false, 1).is_err());
        assert!(train_test_split(&[0, 1], 1.0, false, 1).is_err());
    }

    #[test]
    fn test_single_row_trains_without_test() {
        let split = train_test_split(&[0], 0.2, false, 1).unwrap();
        assert_eq!(split.train, vec![0]);
        assert!(split.test.is_empty());
    }
}
