use crate::facets::{self, FacetCount};
use crate::filter::{self, DateFilter};
use crate::paginate::{self, PageSlice};
use crate::search::{self, SearchQuery};
use crate::sort;
use core_types::{Collation, FilterGroup, FilterSelection, Page, Record, SortKey, SortSpec};
use serde::Serialize;

/// Everything a view asks of the engine in one call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub search: SearchQuery,
    pub filter_groups: Vec<FilterGroup>,
    pub selection: FilterSelection,
    pub date_filter: Option<DateFilter>,
    pub sort: SortSpec,
    pub page: Page,
    /// Caps the ordered result before it is paged.
    pub limit: Option<usize>,
}

/// One page of results plus the counts a view needs to render its pager.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub items: Vec<Record>,
    /// Matching records after filtering and `limit`, before paging.
    pub total_count: usize,
    pub total_pages: usize,
    pub page_number: usize,
    pub page_size: usize,
}

/// The query pipeline. Holds only settings; datasets are passed to every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryEngine {
    collation: Collation,
}

impl QueryEngine {
    pub fn new(collation: Collation) -> Self {
        Self { collation }
    }

    pub fn collation(&self) -> Collation {
        self.collation
    }

    pub fn search<'a>(&self, records: &'a [Record], query: &SearchQuery) -> Vec<&'a Record> {
        search::search(records, query)
    }

    pub fn apply_filters<'a>(
        &self,
        records: Vec<&'a Record>,
        groups: &[FilterGroup],
        selection: &FilterSelection,
    ) -> Vec<&'a Record> {
        filter::apply_filters(records, groups, selection)
    }

    pub fn sort<'a>(&self, records: Vec<&'a Record>, spec: &SortSpec) -> Vec<&'a Record> {
        sort::sort(records, spec, self.collation)
    }

    pub fn paginate<'a>(&self, records: &[&'a Record], page: Page) -> PageSlice<'a> {
        paginate::paginate(records, page)
    }

    /// Option counts over the records matching `search`, ignoring any selection.
    pub fn facet_counts(
        &self,
        records: &[Record],
        search: &SearchQuery,
        groups: &[FilterGroup],
    ) -> Vec<FacetCount> {
        let matched = self.search(records, search);
        facets::facet_counts(&matched, groups)
    }

    /// Runs search, filters, ordering, limit and paging in that order.
    pub fn query(&self, records: &[Record], query: &Query) -> QueryResult {
        // 1. Search
        let matched = self.search(records, &query.search);
        tracing::debug!(input = records.len(), matched = matched.len(), "Search stage complete.");

        // 2. Filter
        let mut filtered = self.apply_filters(matched, &query.filter_groups, &query.selection);
        if let Some(date_filter) = &query.date_filter {
            filtered = filter::apply_date_filter(filtered, date_filter);
        }
        tracing::debug!(remaining = filtered.len(), "Filter stage complete.");

        // 3. Order
        let ordered = match query.sort.key {
            SortKey::Relevance => {
                search::promote_primary_matches(&mut filtered, &query.search);
                filtered
            }
            SortKey::Field(_) => self.sort(filtered, &query.sort),
        };

        // 4. Limit
        let limited = match query.limit {
            Some(limit) => &ordered[..limit.min(ordered.len())],
            None => &ordered[..],
        };

        // 5. Page
        let slice = self.paginate(limited, query.page);
        tracing::debug!(
            total = slice.total_count,
            page = query.page.number(),
            returned = slice.items.len(),
            "Query complete."
        );

        QueryResult {
            items: slice.items.into_iter().cloned().collect(),
            total_count: slice.total_count,
            total_pages: slice.total_pages,
            page_number: query.page.number(),
            page_size: query.page.size(),
        }
    }
}
