//! Page links shown under a paginated table.

use serde::Serialize;

/// One entry of the page strip.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "page", rename_all = "lowercase")]
pub enum PageLink {
    Page(usize),
    /// Elided run of pages.
    Gap,
}

/// Pages kept visible around the edges and the current page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripShape {
    pub edge: usize,
    pub before_current: usize,
    pub after_current: usize,
}

impl Default for StripShape {
    fn default() -> Self {
        Self {
            edge: 2,
            before_current: 2,
            after_current: 2,
        }
    }
}

/// Builds the strip for a 1-based `current` page out of `total_pages`.
pub fn page_strip(total_pages: usize, current: usize, shape: StripShape) -> Vec<PageLink> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);

    let left_end = (1 + shape.edge).min(total_pages + 1);
    let mid_start = left_end.max(current.saturating_sub(shape.before_current));
    let mid_end = (current + shape.after_current + 1).min(total_pages + 1);
    let right_start = mid_end.max(total_pages.saturating_sub(shape.edge) + 1);

    let mut links: Vec<PageLink> = (1..left_end).map(PageLink::Page).collect();
    if mid_start > left_end {
        links.push(PageLink::Gap);
    }
    links.extend((mid_start..mid_end).map(PageLink::Page));
    if right_start > mid_end {
        links.push(PageLink::Gap);
    }
    links.extend((right_start..=total_pages).map(PageLink::Page));
    links
}

/// Current page of items together with its page strip.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub links: Vec<PageLink>,
    pub page: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: usize, page_size: usize, total: usize) -> Self {
        let total_pages = total.div_ceil(page_size.max(1));
        Self {
            links: page_strip(total_pages, page, StripShape::default()),
            page: page.max(1),
            items,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageLink::{Gap, Page};

    #[test]
    fn short_strip_has_no_gaps() {
        assert_eq!(
            page_strip(4, 2, StripShape::default()),
            vec![Page(1), Page(2), Page(3), Page(4)]
        );
        assert!(page_strip(0, 1, StripShape::default()).is_empty());
    }

    #[test]
    fn long_strip_elides_both_sides() {
        assert_eq!(
            page_strip(20, 10, StripShape::default()),
            vec![
                Page(1),
                Page(2),
                Gap,
                Page(8),
                Page(9),
                Page(10),
                Page(11),
                Page(12),
                Gap,
                Page(19),
                Page(20)
            ]
        );
    }

    #[test]
    fn paginated_counts_pages_from_total() {
        let page = Paginated::new(vec!["a"], 3, 10, 25);

        assert_eq!(page.links.last(), Some(&Page(3)));
        assert_eq!(page.total, 25);
    }
}
