use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

/// Storage policy of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageKind {
    /// Every position is materialized.
    #[default]
    Dense,
    /// Only explicitly written non-zero positions are materialized.
    Sparse,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Dense => write!(f, "dense"),
            StorageKind::Sparse => write!(f, "sparse"),
        }
    }
}

/// Backing buffer of a `Tensor`.
///
/// Sparse storage drops an entry when zero is written to it, so its key set is
/// always exactly the set of non-zero positions.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Storage {
    Dense(Vec<f64>),
    Sparse(BTreeMap<usize, f64>),
}

impl Storage {
    pub(crate) fn zeros(kind: StorageKind, size: usize) -> Self {
        match kind {
            StorageKind::Dense => Storage::Dense(vec![0.0; size]),
            StorageKind::Sparse => Storage::Sparse(BTreeMap::new()),
        }
    }

    pub(crate) fn get(&self, pos: usize) -> f64 {
        match self {
            Storage::Dense(values) => values[pos],
            Storage::Sparse(values) => values.get(&pos).copied().unwrap_or(0.0),
        }
    }

    pub(crate) fn put(&mut self, pos: usize, value: f64) {
        match self {
            Storage::Dense(values) => values[pos] = value,
            Storage::Sparse(values) => {
                if value == 0.0 {
                    values.remove(&pos);
                } else {
                    values.insert(pos, value);
                }
            }
        }
    }

    pub(crate) fn positions(&self, size: usize) -> Positions {
        match self {
            Storage::Dense(_) => Positions::All(0..size),
            Storage::Sparse(values) => Positions::listed(values.keys().copied().collect()),
        }
    }
}

/// Positions visited by a tensor traversal.
///
/// A traversal visits every position holding a non-zero value and may also
/// visit positions holding zero: dense storage yields the full index range,
/// sparse storage and views yield only the entries they actually hold.
/// Consumers must treat a visited zero as a valid value.
#[derive(Debug, Clone)]
pub enum Positions {
    /// The whole index range.
    All(Range<usize>),
    /// An explicit snapshot of positions.
    Listed(std::vec::IntoIter<usize>),
}

impl Positions {
    pub(crate) fn listed(positions: Vec<usize>) -> Self {
        Positions::Listed(positions.into_iter())
    }
}

impl Iterator for Positions {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self {
            Positions::All(range) => range.next(),
            Positions::Listed(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Positions::All(range) => range.size_hint(),
            Positions::Listed(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for Positions {}
