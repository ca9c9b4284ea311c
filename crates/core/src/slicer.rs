//! Partitioning of a family's codepoints into dynamic-subset slices.

use std::{num::NonZeroUsize, sync::Arc};

use crate::{codepoints::CodepointSet, unicode_range};

/// One chunk of a family's codepoint partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    pub index: usize,
    /// Shared by the jobs of every weight.
    pub codepoints: Arc<[u32]>,
    pub unicode_range: String,
}

impl Slice {
    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
    }
}

/// Splits `codepoints` into consecutive slices of `size`, in order.
///
/// Every slice is full except possibly the last. Empty input yields no slices.
pub fn make_slices(codepoints: &CodepointSet, size: NonZeroUsize) -> Vec<Slice> {
    codepoints
        .as_slice()
        .chunks(size.get())
        .enumerate()
        .map(|(index, chunk)| Slice {
            index,
            codepoints: Arc::from(chunk),
            unicode_range: unicode_range::compress(chunk),
        })
        .collect()
}
