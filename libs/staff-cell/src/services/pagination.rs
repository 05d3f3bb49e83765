use thiserror::Error;

pub const LAST_PAGE: &str = "last";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("That page number is not an integer")]
    NotAnInteger,
    #[error("That page number is less than 1")]
    TooSmall,
    #[error("That page contains no results")]
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub total_count: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_number(&self) -> usize {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_number(&self) -> usize {
        (self.number + 1).min(self.num_pages)
    }

    pub fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }
}

/// Splits an already filtered and ordered list into fixed size pages. An
/// empty list still has one (empty) first page.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: usize,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self { per_page: per_page.max(1) }
    }

    pub fn num_pages(&self, count: usize) -> usize {
        count.div_ceil(self.per_page).max(1)
    }

    /// `page` is the raw query value: missing means 1, `last` the final page.
    pub fn paginate<T>(&self, items: Vec<T>, page: Option<&str>) -> Result<Page<T>, PageError> {
        let total_count = items.len();
        let num_pages = self.num_pages(total_count);
        let number = self.validate(page, num_pages)?;

        let items = items
            .into_iter()
            .skip((number - 1) * self.per_page)
            .take(self.per_page)
            .collect();

        Ok(Page { items, number, num_pages, total_count })
    }

    fn validate(&self, page: Option<&str>, num_pages: usize) -> Result<usize, PageError> {
        let raw = match page.map(str::trim) {
            None | Some("") => return Ok(1),
            Some(LAST_PAGE) => return Ok(num_pages),
            Some(raw) => raw,
        };

        let number: i64 = raw.parse().map_err(|_| PageError::NotAnInteger)?;
        if number < 1 {
            return Err(PageError::TooSmall);
        }
        let number = number as usize;
        if number > num_pages {
            return Err(PageError::Empty);
        }
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn first_page_by_default() {
        let page = Paginator::new(3).paginate((1..=7).collect(), None).unwrap();
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.total_count, 7);
        assert!(!page.has_previous());
        assert!(page.has_next());
        assert_eq!(page.next_number(), 2);
    }

    #[test]
    fn last_page_is_partial() {
        let page = Paginator::new(3).paginate((1..=7).collect(), Some(LAST_PAGE)).unwrap();
        assert_eq!(page.items, vec![7]);
        assert_eq!(page.number, 3);
        assert!(page.has_previous());
        assert!(!page.has_next());
        assert_eq!(page.previous_number(), 2);
    }

    #[test]
    fn empty_list_has_one_page() {
        let page = Paginator::new(10).paginate(Vec::<i32>::new(), Some("1")).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.num_pages, 1);
        assert!(!page.has_other_pages());
    }

    #[test]
    fn invalid_pages_are_rejected() {
        let paginator = Paginator::new(10);
        assert_matches!(paginator.paginate(vec![1, 2], Some("abc")), Err(PageError::NotAnInteger));
        assert_matches!(paginator.paginate(vec![1, 2], Some("0")), Err(PageError::TooSmall));
        assert_matches!(paginator.paginate(vec![1, 2], Some("-3")), Err(PageError::TooSmall));
        assert_matches!(paginator.paginate(vec![1, 2], Some("2")), Err(PageError::Empty));
    }

    #[test]
    fn exact_multiple_does_not_add_a_page() {
        assert_eq!(Paginator::new(10).num_pages(20), 2);
        assert_eq!(Paginator::new(10).num_pages(21), 3);
        assert_eq!(Paginator::new(10).num_pages(0), 1);
    }
}
