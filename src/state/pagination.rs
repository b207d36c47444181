//! Pagination state for the discovery phase
//!
//! The loop scans index pages `0..=last_page` in order. The upper bound is
//! either supplied by the caller or discovered from the first index page, and
//! is pulled in to the current page as soon as the checkpoint is seen.

/// Upper bound of the page loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBound {
    /// Not known until the first index page has been parsed
    Unknown,

    /// Last page (inclusive) that will be scanned
    Last(u32),
}

/// Transient `(current_page, last_page)` pair driving the page loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    current_page: u32,
    bound: PageBound,
}

impl PaginationState {
    /// Creates the initial state from the caller's page limit
    ///
    /// A limit of `0` means the bound is discovered from the site.
    pub fn new(max_pages: u32) -> Self {
        let bound = if max_pages == 0 {
            PageBound::Unknown
        } else {
            PageBound::Last(max_pages)
        };

        Self {
            current_page: 0,
            bound,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn bound(&self) -> PageBound {
        self.bound
    }

    /// Returns true while the last page has not been learned yet
    pub fn needs_last_page(&self) -> bool {
        self.bound == PageBound::Unknown
    }

    /// Adopts the last page parsed from the site's pager
    ///
    /// Has no effect once a bound is set.
    pub fn adopt_last_page(&mut self, last_page: u32) {
        if self.bound == PageBound::Unknown {
            self.bound = PageBound::Last(last_page);
        }
    }

    /// Records that the checkpoint was found on the current page
    ///
    /// Pagination ends after this page regardless of the site's real last page.
    pub fn hit_checkpoint(&mut self) {
        self.bound = PageBound::Last(self.current_page);
    }

    /// Returns true once the current page is the last one to scan
    pub fn is_last_page(&self) -> bool {
        match self.bound {
            PageBound::Last(last) => self.current_page >= last,
            PageBound::Unknown => false,
        }
    }

    /// Moves to the next page, or returns false if pagination is finished
    pub fn advance(&mut self) -> bool {
        if self.is_last_page() {
            return false;
        }
        self.current_page += 1;
        true
    }
}
