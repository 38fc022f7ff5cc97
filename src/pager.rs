//! Forward-only pagination over a working dataset.

use crate::dataset::{Dataset, TripRecord};

/// Records shown per page of raw data.
pub const PAGE_SIZE: usize = 5;

/// A single-use, sequential cursor over a dataset's records.
///
/// Each [`next_page`](RawDataPager::next_page) returns up to [`PAGE_SIZE`]
/// records and advances the cursor. Once the offset reaches the dataset
/// length the pager is exhausted: a terminal state in which every further
/// call returns `None`. There is no random seek and no backward paging.
#[derive(Debug)]
pub struct RawDataPager<'a> {
    dataset: &'a Dataset,
    page: usize,
    page_size: usize,
    exhausted: bool,
}

impl<'a> RawDataPager<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            page: 0,
            page_size: PAGE_SIZE,
            exhausted: false,
        }
    }

    /// The next page of records, or `None` once the dataset is exhausted.
    pub fn next_page(&mut self) -> Option<&'a [TripRecord]> {
        if self.exhausted {
            return None;
        }

        let records = self.dataset.records();
        let start = self.page * self.page_size;
        if start >= records.len() {
            self.exhausted = true;
            return None;
        }

        let end = (start + self.page_size).min(records.len());
        self.page += 1;
        Some(&records[start..end])
    }

    /// Whether another call to [`next_page`](RawDataPager::next_page) would
    /// yield records.
    pub fn has_more(&self) -> bool {
        !self.exhausted && self.page * self.page_size < self.dataset.len()
    }
}
