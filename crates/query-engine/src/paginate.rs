use core_types::{Page, Record};
use serde::Serialize;

/// One page of an ordered result.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<'a> {
    pub items: Vec<&'a Record>,
    pub total_count: usize,
    pub total_pages: usize,
}

/// Cuts `page` out of `records`. A page past the end yields no items.
pub fn paginate<'a>(records: &[&'a Record], page: Page) -> PageSlice<'a> {
    let total_count = records.len();
    let start = (page.number() - 1).saturating_mul(page.size());
    let end = start.saturating_add(page.size()).min(total_count);

    let items = if start < total_count {
        records[start..end].to_vec()
    } else {
        Vec::new()
    };

    PageSlice {
        items,
        total_count,
        total_pages: page.total_pages(total_count),
    }
}

/// An entry in the page-number strip under a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

const MAX_WINDOW: usize = 7;

/// The page numbers to show for `current` out of `total` pages.
///
/// At most seven entries: every page when there are few enough, otherwise the
/// first and last page around a three-page neighbourhood of `current`.
pub fn page_window(current: usize, total: usize) -> Vec<PageItem> {
    let total = total.max(1);
    let current = current.clamp(1, total);

    if total <= MAX_WINDOW {
        return (1..=total).map(PageItem::Page).collect();
    }

    let mut window = Vec::with_capacity(MAX_WINDOW);
    if current <= 3 {
        window.extend((1..=4).map(PageItem::Page));
        window.push(PageItem::Ellipsis);
        window.push(PageItem::Page(total));
    } else if current >= total - 2 {
        window.push(PageItem::Page(1));
        window.push(PageItem::Ellipsis);
        window.extend((total - 3..=total).map(PageItem::Page));
    } else {
        window.push(PageItem::Page(1));
        window.push(PageItem::Ellipsis);
        window.extend((current - 1..=current + 1).map(PageItem::Page));
        window.push(PageItem::Ellipsis);
        window.push(PageItem::Page(total));
    }
    window
}
