//! Ordered sequence container.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::glob;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// An ordered list of values with contiguous indices `[0, len)`.
///
/// Serializes as `{"data": [...]}`; the field is left out when the sequence
/// is empty.
///
/// # Examples
///
/// ```
/// use dynrec_util::Sequence;
///
/// let mut seq = Sequence::from(vec![5, 3, 1, 4]);
/// seq.sort("asc");
/// assert_eq!(seq.as_slice(), &[1, 3, 4, 5]);
/// assert_eq!(seq.push(9), 4);
/// assert_eq!(seq.to_string(), "1,3,4,5,9");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence<T> {
    #[serde(rename = "data", default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<T>,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T> Sequence<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Calls `f(index, value, all_values)` for every element in order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(usize, &T, &[T]),
    {
        for (x, v) in self.values.iter().enumerate() {
            f(x, v, &self.values);
        }
    }

    /// A new sequence of `f(index, value)` for every element.
    pub fn map<U, F>(&self, mut f: F) -> Sequence<U>
    where
        F: FnMut(usize, &T) -> U,
    {
        self.values.iter().enumerate().map(|(x, v)| f(x, v)).collect()
    }

    pub fn get(&self, index: usize) -> Result<&T, SequenceError> {
        self.values.get(index).ok_or(SequenceError::IndexOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    pub fn first(&self) -> Result<&T, SequenceError> {
        self.get(0)
    }

    pub fn last(&self) -> Result<&T, SequenceError> {
        match self.values.len() {
            0 => Err(SequenceError::IndexOutOfRange { index: 0, len: 0 }),
            len => self.get(len - 1),
        }
    }

    /// Inserts `value` before position `index`, shifting later elements
    /// right. `0` prepends and anything at or past the end appends. A
    /// negative index leaves the sequence unchanged.
    pub fn insert(&mut self, value: T, index: isize) -> &mut Self {
        if let Ok(index) = usize::try_from(index) {
            let at = index.min(self.values.len());
            self.values.insert(at, value);
        }
        self
    }

    /// Removes `count` elements starting at `index` and returns them. When
    /// the range does not fit, nothing is removed and the result is empty.
    pub fn remove(&mut self, index: usize, count: usize) -> Vec<T> {
        match index.checked_add(count) {
            Some(end) if end <= self.values.len() => self.values.drain(index..end).collect(),
            _ => Vec::new(),
        }
    }

    /// Appends `value` and returns its index.
    pub fn push(&mut self, value: T) -> usize {
        self.values.push(value);
        self.values.len() - 1
    }

    /// Removes and returns the first element.
    pub fn shift(&mut self) -> Option<T> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.remove(0))
        }
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<T> {
        self.values.pop()
    }

    /// Shuffles with the thread-local generator.
    pub fn randomise(&mut self) -> &mut Self {
        self.randomise_with(&mut rand::thread_rng())
    }

    /// Shuffles deterministically from `seed`.
    pub fn randomise_seeded(&mut self, seed: u64) -> &mut Self {
        self.randomise_with(&mut Xoshiro256StarStar::seed_from_u64(seed))
    }

    /// Shuffles by repeatedly drawing a uniformly chosen element out of the
    /// remaining pool. Not suitable for anything security related.
    pub fn randomise_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &mut Self {
        let mut pool = std::mem::take(&mut self.values);
        let mut shuffled = Vec::with_capacity(pool.len());
        while !pool.is_empty() {
            let x = rng.gen_range(0..pool.len());
            shuffled.push(pool.remove(x));
        }
        self.values = shuffled;
        self
    }
}

impl<T: Clone> Sequence<T> {
    /// A new sequence with the elements for which `f(index, value)` holds.
    pub fn filter<F>(&self, mut f: F) -> Sequence<T>
    where
        F: FnMut(usize, &T) -> bool,
    {
        self.values
            .iter()
            .enumerate()
            .filter(|(x, v)| f(*x, *v))
            .map(|(_, v)| v.clone())
            .collect()
    }
}

impl<T: PartialEq> Sequence<T> {
    /// Whether any element equals any of `candidates`.
    pub fn contains(&self, candidates: &[T]) -> bool {
        self.values.iter().any(|v| candidates.contains(v))
    }

    pub fn index_of(&self, candidate: &T) -> Option<usize> {
        self.values.iter().position(|v| v == candidate)
    }
}

impl<T: fmt::Display> Sequence<T> {
    /// Calls `f(index, value)` for every element whose text form matches the
    /// glob `pattern`. Returns whether anything matched.
    pub fn match_pattern<F>(&self, pattern: &str, mut f: F) -> bool
    where
        F: FnMut(usize, &T),
    {
        let mut matched = false;
        for (x, v) in self.values.iter().enumerate() {
            if glob::matches(&v.to_string(), pattern) {
                f(x, v);
                matched = true;
            }
        }
        matched
    }

    /// Sorts by the byte order of each element's text form: ascending for
    /// `"asc"`, descending for anything else. Equal keys keep their order.
    pub fn sort(&mut self, order: &str) -> &mut Self {
        let mut keyed: Vec<(String, T)> = self
            .values
            .drain(..)
            .map(|v| (v.to_string(), v))
            .collect();
        if order == "asc" {
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
        } else {
            keyed.sort_by(|a, b| b.0.cmp(&a.0));
        }
        self.values = keyed.into_iter().map(|(_, v)| v).collect();
        self
    }
}

impl Sequence<usize> {
    /// `0, 1, .., count - 1`.
    pub fn populate(count: usize) -> Self {
        (0..count).collect()
    }
}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<T: fmt::Display> fmt::Display for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (x, v) in self.values.iter().enumerate() {
            if x > 0 {
                f.write_str(",")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
