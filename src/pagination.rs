use thiserror::Error;

/// Posts per page on the full listings (home, author, tag, search, private)
pub const POSTS_PER_PAGE: i64 = 7;

/// Rows per page on the compact table listings
pub const COMPACT_PER_PAGE: i64 = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("That page number is not an integer")]
    InvalidPage,
    #[error("That page number is less than 1")]
    LessThanOne,
    #[error("That page contains no results")]
    EmptyPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

impl Paginator {
    /// `per_page` values below 1 are treated as 1
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Number of pages; an empty result still has one (empty) page
    pub fn num_pages(&self) -> i64 {
        if self.count == 0 {
            1
        } else {
            (self.count + self.per_page - 1) / self.per_page
        }
    }

    /// Resolves the raw `page` query value
    pub fn page(&self, raw: Option<&str>) -> Result<Page, PageError> {
        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some("last") => self.num_pages(),
            Some(value) => value.parse::<i64>().map_err(|_| PageError::InvalidPage)?,
        };
        self.page_number(number)
    }

    pub fn page_number(&self, number: i64) -> Result<Page, PageError> {
        if number < 1 {
            return Err(PageError::LessThanOne);
        }
        if number > self.num_pages() {
            return Err(PageError::EmptyPage);
        }
        Ok(Page {
            number,
            paginator: *self,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: i64,
    paginator: Paginator,
}

impl Page {
    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn num_pages(&self) -> i64 {
        self.paginator.num_pages()
    }

    /// Total number of rows across all pages
    pub fn count(&self) -> i64 {
        self.paginator.count()
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.paginator.per_page()
    }

    pub fn limit(&self) -> i64 {
        self.paginator.per_page()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    pub fn next_page_number(&self) -> Option<i64> {
        self.has_next().then_some(self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<i64> {
        self.has_previous().then_some(self.number - 1)
    }

    /// 1-based index of the first row on this page (0 when empty)
    pub fn start_index(&self) -> i64 {
        if self.count() == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    /// 1-based index of the last row on this page
    pub fn end_index(&self) -> i64 {
        (self.offset() + self.limit()).min(self.count())
    }
}

#[cfg(test)]
mod prop_tests;
