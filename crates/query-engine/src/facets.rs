use crate::filter::matches_any_value;
use core_types::{FilterGroup, Record};
use serde::Serialize;

/// How many records one filter option would keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetCount {
    pub group_id: String,
    pub option_id: String,
    pub label: String,
    pub count: usize,
}

/// Counts, for every option of every group, the records it matches.
///
/// The current selection is ignored, so the counts describe what selecting each
/// option on its own would leave.
pub fn facet_counts(records: &[&Record], groups: &[FilterGroup]) -> Vec<FacetCount> {
    groups
        .iter()
        .flat_map(|group| {
            group.options.iter().map(move |option| {
                let values: Vec<&str> = option.values.iter().map(String::as_str).collect();
                let count = records
                    .iter()
                    .filter(|record| matches_any_value(record, &group.fields, &values))
                    .count();
                FacetCount {
                    group_id: group.id.clone(),
                    option_id: option.id.clone(),
                    label: option.label.clone(),
                    count,
                }
            })
        })
        .collect()
}
