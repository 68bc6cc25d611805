//! Shared fixtures for the unit tests, plus the property suite.

use crate::QueryResult;
use core_types::{FilterGroup, FilterOption, Record, Value};
use rust_decimal_macros::dec;


/// Three priced records; Gamma has an explicit null price.
pub fn alpha_beta_gamma() -> Vec<Record> {
    vec![
        Record::new("1").with("name", "Alpha").with("price", dec!(10)),
        Record::new("2").with("name", "Beta").with("price", dec!(5)),
        Record::new("3").with("name", "Gamma").with("price", Value::Null),
    ]
}

/// Industry and location facets as the company search page declares them.
pub fn company_groups() -> Vec<FilterGroup> {
    let option = |id: &str, label: &str| FilterOption {
        id: id.into(),
        label: label.into(),
        values: vec![label.into()],
    };
    vec![
        FilterGroup {
            id: "industry".into(),
            name: "行业".into(),
            fields: vec!["industry".into()],
            options: vec![option("tech", "科技"), option("finance", "金融")],
        },
        FilterGroup {
            id: "location".into(),
            name: "地区".into(),
            fields: vec!["location".into()],
            options: vec![option("beijing", "北京"), option("shanghai", "上海")],
        },
    ]
}

pub fn ids<'a>(records: &[&'a Record]) -> Vec<&'a str> {
    records.iter().map(|r| r.id()).collect()
}

pub fn result_ids(result: &QueryResult) -> Vec<&str> {
    result.items.iter().map(Record::id).collect()
}
