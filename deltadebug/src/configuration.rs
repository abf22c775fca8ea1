// PY_SOURCE: src/delta_debugging/configuration.py:Configuration

use std::fmt;
use std::ops::Range;

use crate::{Error, Result};

/// Subset of an input, stored as strictly increasing element indices.
///
/// Every constructor keeps the indices sorted and unique, so equality and
/// hashing on the index list identify the subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Configuration {
    indices: Vec<usize>,
}

impl Configuration {
    /// Every element of an input of length `len`.
    pub fn full(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_indices(indices: Vec<usize>) -> Result<Self> {
        if let Some(pair) = indices.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidConfiguration(format!(
                "indices must be sorted and unique, found {} before {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { indices })
    }

    pub(crate) fn from_sorted(indices: Vec<usize>) -> Self {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn first(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Positions `range` of this configuration; out-of-range bounds clamp.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.indices.len());
        let start = range.start.min(end);
        Self::from_sorted(self.indices[start..end].to_vec())
    }

    /// Drops the last `n` positions.
    pub fn truncate_back(&self, n: usize) -> Self {
        self.slice(0..self.len().saturating_sub(n))
    }

    pub fn union(&self, other: &Configuration) -> Self {
        let (a, b) = (&self.indices, &other.indices);
        let mut merged = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => {
                    merged.push(a[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push(b[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    merged.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&a[i..]);
        merged.extend_from_slice(&b[j..]);
        Self::from_sorted(merged)
    }

    /// Union of many configurations at once.
    pub fn concat<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a Configuration>,
    {
        parts.into_iter().flat_map(|c| c.iter()).collect()
    }

    pub fn difference(&self, other: &Configuration) -> Self {
        Self::from_sorted(
            self.indices
                .iter()
                .copied()
                .filter(|&i| !other.contains(i))
                .collect(),
        )
    }

    /// Elements of `input` picked by this configuration, in index order.
    /// Indices past the end of `input` are skipped.
    pub fn select<T: Clone>(&self, input: &[T]) -> Vec<T> {
        self.indices
            .iter()
            .filter_map(|&i| input.get(i).cloned())
            .collect()
    }
}

impl FromIterator<usize> for Configuration {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut indices: Vec<usize> = iter.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }
}

impl<'a> IntoIterator for &'a Configuration {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter().copied()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (n, index) in self.indices.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(indices: &[usize]) -> Configuration {
        Configuration::from_indices(indices.to_vec()).expect("sorted indices")
    }

    #[test]
    fn rejects_unsorted_or_duplicate_indices() {
        assert!(Configuration::from_indices(vec![0, 2, 1]).is_err());
        assert!(Configuration::from_indices(vec![1, 1]).is_err());
        assert!(Configuration::from_indices(vec![]).is_ok());
    }

    #[test]
    fn set_operations() {
        let a = cfg(&[0, 1]);
        let b = cfg(&[1, 2]);
        assert_eq!(a.union(&b), cfg(&[0, 1, 2]));
        assert_eq!(a.difference(&b), cfg(&[0]));
        assert_eq!(Configuration::concat([&a, &b, &cfg(&[3])]), cfg(&[0, 1, 2, 3]));
    }

    #[test]
    fn slice_clamps_and_displays_like_a_tuple() {
        let c = Configuration::full(5);
        assert_eq!(c.slice(1..3).to_string(), "(1, 2)");
        assert_eq!(c.slice(4..10).to_string(), "(4)");
        assert_eq!(c.slice(7..9), Configuration::empty());
        assert_eq!(c.truncate_back(2), cfg(&[0, 1, 2]));
        assert_eq!(Configuration::empty().to_string(), "()");
    }

    #[test]
    fn select_picks_elements_in_order() {
        let data = [10, 20, 30, 40];
        assert_eq!(cfg(&[0, 2]).select(&data), vec![10, 30]);
        assert_eq!(cfg(&[3, 9]).select(&data), vec![40]);
    }
}
