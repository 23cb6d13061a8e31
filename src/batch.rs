//! Fixed-size batching of identifiers.
//!
//! Every group has exactly `size` slots; the final group is padded with `None`.
//! Padding never reaches the API: callers go through [`batch_ids`].

use crate::error::{Result, WosError};

/// Maximum number of identifiers the API accepts per request
pub const MAX_BATCH_SIZE: usize = 100;

/// Default batch size
pub const DEFAULT_BATCH_SIZE: usize = MAX_BATCH_SIZE;

/// Lazy iterator over padded, fixed-size groups
#[derive(Debug)]
pub struct Batches<I> {
    inner: I,
    size: usize,
    done: bool,
}

impl<I> Batches<I>
where
    I: Iterator<Item = String>,
{
    /// Wrap an identifier iterator.
    ///
    /// # Errors
    ///
    /// Returns `WosError::Config` if `size` is zero.
    pub fn new<T>(ids: T, size: usize) -> Result<Self>
    where
        T: IntoIterator<IntoIter = I>,
    {
        if size == 0 {
            return Err(WosError::Config("batch size must be at least 1".to_string()));
        }
        Ok(Self {
            inner: ids.into_iter(),
            size,
            done: false,
        })
    }
}

impl<I> Iterator for Batches<I>
where
    I: Iterator<Item = String>,
{
    type Item = Vec<Option<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut group: Vec<Option<String>> = self.inner.by_ref().take(self.size).map(Some).collect();
        if group.is_empty() {
            self.done = true;
            return None;
        }
        if group.len() < self.size {
            self.done = true;
            group.resize(self.size, None);
        }
        Some(group)
    }
}

/// Drop padding from a group, keeping the real identifiers in order.
pub fn batch_ids(group: Vec<Option<String>>) -> Vec<String> {
    group.into_iter().flatten().collect()
}

/// Number of groups `count` identifiers produce at `size` per group.
pub fn batch_count(count: usize, size: usize) -> usize {
    if size == 0 {
        0
    } else {
        count.div_ceil(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("ID{}", i)).collect()
    }

    #[test]
    fn test_groups_are_uniform_and_lossless() {
        for (count, size) in [(1, 1), (5, 2), (6, 3), (7, 100), (250, 100), (13, 4)] {
            let input = ids(count);
            let groups: Vec<_> = Batches::new(input.clone(), size).unwrap().collect();

            assert_eq!(groups.len(), batch_count(count, size));
            assert!(groups.iter().all(|g| g.len() == size));

            let rebuilt: Vec<String> = groups.into_iter().flat_map(batch_ids).collect();
            assert_eq!(rebuilt, input);
        }
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        let mut batches = Batches::new(Vec::<String>::new(), 100).unwrap();
        assert!(batches.next().is_none());
        assert!(batches.next().is_none());
    }

    #[test]
    fn test_exact_multiple_has_no_padding_group() {
        let groups: Vec<_> = Batches::new(ids(4), 2).unwrap().collect();
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().flatten().all(Option::is_some));
    }

    #[test]
    fn test_last_group_padded() {
        let input = vec!["A1".to_string(), "A2".to_string(), "A3".to_string()];
        let groups: Vec<_> = Batches::new(input, 2).unwrap().collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1], vec![Some("A3".to_string()), None]);
        assert_eq!(batch_ids(groups[1].clone()), vec!["A3"]);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(Batches::new(ids(3), 0), Err(WosError::Config(_))));
    }
}
