//! # Pagination
//! Fixed-size pages over a filtered/sorted sequence. Page numbers are 1-based;
//! an empty sequence is "page 1 of 1".

use serde::{Deserialize, Serialize};

/// Allowed page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    #[default]
    Twenty,
    Fifty,
    Eighty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::Twenty,
        PageSize::Fifty,
        PageSize::Eighty,
        PageSize::Hundred,
    ];

    pub fn get(self) -> usize {
        u32::from(self) as usize
    }
}

impl From<PageSize> for u32 {
    fn from(p: PageSize) -> u32 {
        match p {
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
            PageSize::Eighty => 80,
            PageSize::Hundred => 100,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = String;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            20 => Ok(PageSize::Twenty),
            50 => Ok(PageSize::Fifty),
            80 => Ok(PageSize::Eighty),
            100 => Ok(PageSize::Hundred),
            other => Err(format!("page size must be one of 20, 50, 80, 100 (got {other})")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub current_page: usize,
    pub page_size: PageSize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::first(PageSize::default())
    }
}

impl PageState {
    pub fn first(page_size: PageSize) -> Self {
        Self {
            current_page: 1,
            page_size,
        }
    }

    /// Keep `current_page` within `[1, total_pages]`.
    pub fn clamped(self, total_pages: usize) -> Self {
        Self {
            current_page: self.current_page.clamp(1, total_pages.max(1)),
            ..self
        }
    }

    /// No-op on the last page.
    pub fn next(self, total_pages: usize) -> Self {
        Self {
            current_page: self.current_page.saturating_add(1),
            ..self
        }
        .clamped(total_pages)
    }

    /// No-op on page 1.
    pub fn prev(self, total_pages: usize) -> Self {
        Self {
            current_page: self.current_page.saturating_sub(1),
            ..self
        }
        .clamped(total_pages)
    }

    pub fn go_to(self, page: usize, total_pages: usize) -> Self {
        Self {
            current_page: page,
            ..self
        }
        .clamped(total_pages)
    }
}

/// `ceil(len / size)`, never below 1.
pub fn total_pages(len: usize, size: PageSize) -> usize {
    len.div_ceil(size.get()).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a, T> {
    pub slice: &'a [T],
    pub total_pages: usize,
}

/// Slice `items` for the requested page, clipped to the sequence bounds.
pub fn page<'a, T>(items: &'a [T], state: &PageState) -> Page<'a, T> {
    let size = state.page_size.get();
    let start = state
        .current_page
        .saturating_sub(1)
        .saturating_mul(size)
        .min(items.len());
    let end = start.saturating_add(size).min(items.len());
    Page {
        slice: &items[start..end],
        total_pages: total_pages(items.len(), state.page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_five_items_in_pages_of_twenty() {
        let items: Vec<u32> = (0..45).collect();
        let st = PageState {
            current_page: 3,
            page_size: PageSize::Twenty,
        };
        let p = page(&items, &st);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.slice, &[40, 41, 42, 43, 44]);
    }

    #[test]
    fn empty_is_page_one_of_one() {
        let items: Vec<u32> = Vec::new();
        let p = page(&items, &PageState::default());
        assert_eq!(p.total_pages, 1);
        assert!(p.slice.is_empty());
    }

    #[test]
    fn pages_concatenate_to_whole_sequence() {
        for size in PageSize::ALL {
            for len in [0usize, 1, 19, 20, 21, 99, 100, 101, 257] {
                let items: Vec<usize> = (0..len).collect();
                let total = total_pages(len, size);
                let mut joined = Vec::new();
                for n in 1..=total {
                    let st = PageState {
                        current_page: n,
                        page_size: size,
                    };
                    joined.extend_from_slice(page(&items, &st).slice);
                }
                assert_eq!(joined, items, "size {size:?} len {len}");
            }
        }
    }

    #[test]
    fn navigation_stops_at_boundaries() {
        let st = PageState::default();
        assert_eq!(st.prev(3).current_page, 1);
        let last = st.go_to(3, 3);
        assert_eq!(last.next(3).current_page, 3);
        assert_eq!(st.next(3).current_page, 2);
        assert_eq!(st.go_to(0, 3).current_page, 1);
        assert_eq!(st.go_to(99, 3).current_page, 3);
    }

    #[test]
    fn page_size_serde_rejects_unlisted_values() {
        assert_eq!(serde_json::from_str::<PageSize>("50").unwrap(), PageSize::Fifty);
        assert!(serde_json::from_str::<PageSize>("30").is_err());
        assert_eq!(serde_json::to_string(&PageSize::Eighty).unwrap(), "80");
    }
}
