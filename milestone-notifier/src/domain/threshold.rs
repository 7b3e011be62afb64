//! Validated milestone threshold lists.

use crate::{Error, Result};

/// Strictly increasing, positive milestone values.
///
/// Ordering is validated at construction instead of sorted silently: a
/// misordered list in the configuration is reported as a configuration error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdSet {
    values: Vec<u64>,
}

impl ThresholdSet {
    /// Validate `values` as a threshold list. `name` is used in error messages.
    pub fn new(name: &str, values: Vec<u64>) -> Result<Self> {
        if let Some(pos) = values.iter().position(|v| *v == 0) {
            return Err(Error::config(format!(
                "{name}[{pos}] must be a positive integer"
            )));
        }

        for (i, pair) in values.windows(2).enumerate() {
            if pair[0] == pair[1] {
                return Err(Error::config(format!(
                    "{name} contains duplicate threshold {}",
                    pair[0]
                )));
            }
            if pair[0] > pair[1] {
                return Err(Error::config(format!(
                    "{name} must be in ascending order: {name}[{}]={} is followed by {}",
                    i,
                    pair[0],
                    pair[1]
                )));
            }
        }

        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Thresholds `t` with `lower < t <= upper`, ascending.
    pub fn between(&self, lower: u64, upper: u64) -> &[u64] {
        if upper <= lower {
            return &[];
        }
        let start = self.values.partition_point(|t| *t <= lower);
        let end = self.values.partition_point(|t| *t <= upper);
        &self.values[start..end]
    }

    /// Smallest threshold strictly above `value`.
    pub fn next_above(&self, value: u64) -> Option<u64> {
        let idx = self.values.partition_point(|t| *t <= value);
        self.values.get(idx).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_set() {
        let set = ThresholdSet::new("view_thresholds", vec![100, 1000, 5000]).unwrap();
        assert_eq!(set.as_slice(), &[100, 1000, 5000]);
    }

    #[test]
    fn test_empty_set_is_valid() {
        let set = ThresholdSet::new("view_thresholds", vec![]).unwrap();
        assert!(set.is_empty());
        assert!(set.between(0, u64::MAX).is_empty());
    }

    #[test]
    fn test_rejects_zero() {
        let err = ThresholdSet::new("subscriber_thresholds", vec![0, 10]).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("subscriber_thresholds[0]")));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = ThresholdSet::new("view_thresholds", vec![10, 10, 20]).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_rejects_descending() {
        let err = ThresholdSet::new("view_thresholds", vec![10, 30, 20]).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("ascending")));
    }

    #[test]
    fn test_between_bounds() {
        let set = ThresholdSet::new("t", vec![1000, 5000, 10000]).unwrap();
        assert_eq!(set.between(999, 1000), &[1000]);
        assert!(set.between(1000, 4999).is_empty());
        assert_eq!(set.between(900, 6000), &[1000, 5000]);
        assert!(set.between(6000, 900).is_empty());
    }

    #[test]
    fn test_next_above() {
        let set = ThresholdSet::new("t", vec![1000, 5000]).unwrap();
        assert_eq!(set.next_above(0), Some(1000));
        assert_eq!(set.next_above(1000), Some(5000));
        assert_eq!(set.next_above(5000), None);
    }
}
