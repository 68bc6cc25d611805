use crate::dates::parse_date;
use chrono::NaiveDate;
use core_types::{FilterGroup, FilterSelection, Record, TimeRange};

/// Applies the selected facet options.
///
/// Options within a group are OR'd, groups are AND'd, and groups absent from the
/// selection impose nothing. A record passes an option when one of the group's
/// fields equals (exactly) one of the option's mapped values; list fields pass
/// when any element does. Unknown group or option ids match nothing.
pub fn apply_filters<'a>(
    records: Vec<&'a Record>,
    groups: &[FilterGroup],
    selection: &FilterSelection,
) -> Vec<&'a Record> {
    let mut remaining = records;

    for (group_id, option_ids) in selection.groups() {
        if remaining.is_empty() {
            break;
        }

        let Some(group) = groups.iter().find(|g| g.id == group_id) else {
            tracing::warn!(group = group_id, "Selected filter group is not declared; nothing matches.");
            return Vec::new();
        };

        let values: Vec<&str> = option_ids
            .iter()
            .filter_map(|option_id| {
                let option = group.option(option_id);
                if option.is_none() {
                    tracing::warn!(group = group_id, option = %option_id, "Unknown filter option ignored.");
                }
                option
            })
            .flat_map(|option| option.values.iter().map(String::as_str))
            .collect();

        remaining.retain(|record| matches_any_value(record, &group.fields, &values));
        tracing::trace!(group = group_id, remaining = remaining.len(), "Filter group applied.");
    }

    remaining
}

/// True when any of `fields` holds one of `values` exactly.
pub fn matches_any_value(record: &Record, fields: &[String], values: &[&str]) -> bool {
    !values.is_empty()
        && fields.iter().any(|field| {
            record
                .get(field)
                .is_some_and(|value| value.any_text(&mut |text| values.contains(&text)))
        })
}

/// Keeps records published within `range` of `today`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    pub field: String,
    pub range: TimeRange,
    /// Reference day. Passed in rather than read from the clock so queries stay
    /// reproducible.
    pub today: NaiveDate,
}

impl DateFilter {
    pub fn new(field: impl Into<String>, range: TimeRange, today: NaiveDate) -> Self {
        Self {
            field: field.into(),
            range,
            today,
        }
    }

    /// With a bounded range, records without a readable date are rejected.
    pub fn accepts(&self, record: &Record) -> bool {
        let Some(max_age) = self.range.days() else {
            return true;
        };
        record
            .get(&self.field)
            .and_then(parse_date)
            .is_some_and(|date| self.today.signed_duration_since(date).num_days() <= max_age)
    }
}

pub fn apply_date_filter<'a>(records: Vec<&'a Record>, filter: &DateFilter) -> Vec<&'a Record> {
    if filter.range == TimeRange::All {
        return records;
    }
    records.into_iter().filter(|r| filter.accepts(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{company_groups, ids};
    use core_types::FilterOption;

    fn companies() -> Vec<Record> {
        vec![
            Record::new("1").with("industry", "科技").with("location", "北京"),
            Record::new("2").with("industry", "金融").with("location", "上海"),
            Record::new("3").with("industry", "科技").with("location", "上海"),
            Record::new("4").with("location", "北京"),
        ]
    }

    #[test]
    fn single_option_maps_to_display_value() {
        let records = companies();
        let selection = FilterSelection::from_pairs([("industry", "tech")]);
        let kept = apply_filters(records.iter().collect(), &company_groups(), &selection);
        assert_eq!(ids(&kept), ["1", "3"]);
    }

    #[test]
    fn options_or_within_group_and_across_groups() {
        let records = companies();
        let selection = FilterSelection::from_pairs([
            ("industry", "tech"),
            ("industry", "finance"),
            ("location", "shanghai"),
        ]);
        let kept = apply_filters(records.iter().collect(), &company_groups(), &selection);
        assert_eq!(ids(&kept), ["2", "3"]);
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let records = companies();
        let kept = apply_filters(records.iter().collect(), &company_groups(), &FilterSelection::new());
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn unknown_option_matches_nothing() {
        let records = companies();
        let selection = FilterSelection::from_pairs([("industry", "quantum")]);
        assert!(apply_filters(records.iter().collect(), &company_groups(), &selection).is_empty());

        // An unknown option next to a known one contributes nothing.
        let selection = FilterSelection::from_pairs([("industry", "quantum"), ("industry", "finance")]);
        let kept = apply_filters(records.iter().collect(), &company_groups(), &selection);
        assert_eq!(ids(&kept), ["2"]);
    }

    #[test]
    fn unknown_group_matches_nothing() {
        let records = companies();
        let selection = FilterSelection::from_pairs([("planet", "mars")]);
        assert!(apply_filters(records.iter().collect(), &company_groups(), &selection).is_empty());
    }

    #[test]
    fn exact_match_not_substring() {
        let records = vec![Record::new("1").with("industry", "科技服务")];
        let selection = FilterSelection::from_pairs([("industry", "tech")]);
        assert!(apply_filters(records.iter().collect(), &company_groups(), &selection).is_empty());
    }

    #[test]
    fn multi_field_group_matches_category_or_tags() {
        let groups = vec![FilterGroup {
            id: "category".into(),
            name: "Category".into(),
            fields: vec!["category".into(), "tags".into()],
            options: vec![FilterOption {
                id: "earnings".into(),
                label: "财务报告".into(),
                values: vec!["财报".into(), "业绩".into()],
            }],
        }];
        let records = vec![
            Record::new("1").with("tags", vec!["财报", "业绩"]),
            Record::new("2").with("tags", vec!["公司公告"]),
            Record::new("3").with("category", "业绩").with("tags", Vec::<String>::new()),
        ];
        let selection = FilterSelection::from_pairs([("category", "earnings")]);
        let kept = apply_filters(records.iter().collect(), &groups, &selection);
        assert_eq!(ids(&kept), ["1", "3"]);
    }

    #[test]
    fn option_without_values_matches_nothing() {
        let mut groups = company_groups();
        groups[0].options[0].values.clear();
        let records = companies();
        let selection = FilterSelection::from_pairs([("industry", "tech")]);
        assert!(apply_filters(records.iter().collect(), &groups, &selection).is_empty());
    }

    #[test]
    fn date_window_is_inclusive_and_drops_undated_records() {
        let today = NaiveDate::from_ymd_opt(2023, 4, 15).unwrap();
        let records = vec![
            Record::new("today").with("date", "2023-04-15"),
            Record::new("week-edge").with("date", "2023-04-08"),
            Record::new("too-old").with("date", "2023-04-07"),
            Record::new("rfc3339").with("date", "2023-04-12T09:30:00+08:00"),
            Record::new("garbled").with("date", "last tuesday"),
            Record::new("undated"),
        ];
        let week = DateFilter::new("date", TimeRange::Week, today);
        let kept = apply_date_filter(records.iter().collect(), &week);
        assert_eq!(ids(&kept), ["today", "week-edge", "rfc3339"]);

        let day = DateFilter::new("date", TimeRange::Day, today);
        assert_eq!(ids(&apply_date_filter(records.iter().collect(), &day)), ["today"]);

        let all = DateFilter::new("date", TimeRange::All, today);
        assert_eq!(apply_date_filter(records.iter().collect(), &all).len(), 6);
    }
}
