//! Page-number pagination for paged listing endpoints.
//!
//! [`paginate`] turns a base route, a requested page number, a page size, and
//! a total item count into a [`PageWindow`]: the skip/limit pair a caller
//! applies to an externally ordered query, plus ready-to-render navigation
//! links of the form `{base_route}page/{n}`.
//!
//! The calculator is pure: no I/O, deterministic, idempotent for identical
//! inputs. Requested pages outside `[1, total_pages]` are clamped to the
//! nearest valid page rather than producing empty result sets.

use std::num::NonZeroU64;

use serde::Serialize;

/// Navigation window over a paged listing.
///
/// `skip` and `limit` slice the backing query; `next` and `prev` are relative
/// links for the surrounding navigation, absent at the corresponding edge of
/// the listing.
///
/// # Examples
/// ```
/// use std::num::NonZeroU64;
///
/// let window = pagination::paginate("/feed/", Some(2), NonZeroU64::new(10).unwrap(), 25);
/// assert_eq!(window.skip, 10);
/// assert_eq!(window.next.as_deref(), Some("/feed/page/3"));
/// assert_eq!(window.prev.as_deref(), Some("/feed/page/1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    /// Link to the following page, absent on the last page.
    pub next: Option<String>,
    /// Link to the preceding page, absent on the first page.
    pub prev: Option<String>,
    /// Total number of pages; zero when the listing is empty.
    pub total_pages: u64,
    /// The page this window describes, always at least 1.
    pub current_page: u64,
    /// Number of items to skip in the backing query.
    pub skip: u64,
    /// Maximum number of items on the page.
    pub limit: u64,
}

impl PageWindow {
    /// True when the listing has more than one page.
    #[must_use]
    pub const fn is_paged(&self) -> bool {
        self.total_pages > 1
    }
}

/// Compute the [`PageWindow`] for one page of a listing.
///
/// `base_route` must end with `/` so the produced links read
/// `{base_route}page/{n}`. A missing `requested_page` selects page 1;
/// out-of-range requests (including non-positive pages) are clamped into
/// `[1, max(total_pages, 1)]`.
#[must_use]
pub fn paginate(
    base_route: &str,
    requested_page: Option<i64>,
    page_size: NonZeroU64,
    total_count: u64,
) -> PageWindow {
    let size = page_size.get();
    let total_pages = total_count.div_ceil(size);
    let last_page = total_pages.max(1);

    let requested = requested_page.unwrap_or(1);
    let current_page = if requested < 1 {
        1
    } else {
        u64::try_from(requested).map_or(last_page, |page| page.min(last_page))
    };

    let skip = size.saturating_mul(current_page - 1);
    let next = (total_count > current_page.saturating_mul(size))
        .then(|| format!("{base_route}page/{}", current_page + 1));
    let prev = (current_page > 1).then(|| format!("{base_route}page/{}", current_page - 1));

    PageWindow {
        next,
        prev,
        total_pages,
        current_page,
        skip,
        limit: size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn size(value: u64) -> NonZeroU64 {
        NonZeroU64::new(value).expect("page size must be non-zero")
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(25, 10, 3)]
    #[case(25, 18, 2)]
    #[case(100, 20, 5)]
    fn total_pages_is_ceiling_of_count_over_size(
        #[case] total: u64,
        #[case] page_size: u64,
        #[case] expected: u64,
    ) {
        let window = paginate("/x/", None, size(page_size), total);
        assert_eq!(window.total_pages, expected);
    }

    #[rstest]
    fn first_page_of_three(#[values(None, Some(1))] requested: Option<i64>) {
        let window = paginate("/x/", requested, size(10), 25);
        assert_eq!(window.skip, 0);
        assert_eq!(window.limit, 10);
        assert_eq!(window.next.as_deref(), Some("/x/page/2"));
        assert_eq!(window.prev, None);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.current_page, 1);
    }

    #[rstest]
    fn last_page_of_three() {
        let window = paginate("/x/", Some(3), size(10), 25);
        assert_eq!(window.skip, 20);
        assert_eq!(window.next, None);
        assert_eq!(window.prev.as_deref(), Some("/x/page/2"));
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.current_page, 3);
    }

    #[rstest]
    fn single_page_has_no_links() {
        let window = paginate("/x/", Some(1), size(10), 5);
        assert_eq!(window.next, None);
        assert_eq!(window.prev, None);
        assert_eq!(window.total_pages, 1);
        assert!(!window.is_paged());
    }

    #[rstest]
    fn empty_listing_stays_on_page_one() {
        let window = paginate("/x/", Some(4), size(10), 0);
        assert_eq!(window.total_pages, 0);
        assert_eq!(window.current_page, 1);
        assert_eq!(window.skip, 0);
        assert_eq!(window.next, None);
        assert_eq!(window.prev, None);
    }

    #[rstest]
    #[case(Some(99), 3)]
    #[case(Some(4), 3)]
    #[case(Some(0), 1)]
    #[case(Some(-2), 1)]
    #[case(Some(i64::MIN), 1)]
    fn out_of_range_pages_are_clamped(#[case] requested: Option<i64>, #[case] expected: u64) {
        let window = paginate("/x/", requested, size(10), 25);
        assert_eq!(window.current_page, expected);
    }

    #[rstest]
    fn clamped_overflow_page_lands_on_last_page() {
        let window = paginate("/x/", Some(i64::MAX), size(10), 25);
        assert_eq!(window.current_page, 3);
        assert_eq!(window.skip, 20);
        assert_eq!(window.next, None);
    }

    #[rstest]
    fn serialises_with_camel_case_keys() {
        let window = paginate("/feed/", Some(2), size(18), 40);
        let value = serde_json::to_value(&window).expect("window serialises");
        assert_eq!(value["currentPage"], 2);
        assert_eq!(value["totalPages"], 3);
        assert_eq!(value["skip"], 18);
        assert_eq!(value["next"], "/feed/page/3");
        assert_eq!(value["prev"], "/feed/page/1");
    }
}
