use core_types::{Record, Value};

/// Which fields a free-text term is tested against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Only the named fields, in order.
    Fields(Vec<String>),
    /// Every text-valued field of the record.
    #[default]
    AllText,
}

/// A case-insensitive substring search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    pub term: String,
    pub scope: SearchScope,
    /// The display field that ranks first under relevance ordering.
    /// Defaults to the first searchable field.
    pub primary_field: Option<String>,
}

impl SearchQuery {
    pub fn new<F: Into<String>>(term: impl Into<String>, fields: impl IntoIterator<Item = F>) -> Self {
        Self {
            term: term.into(),
            scope: SearchScope::Fields(fields.into_iter().map(Into::into).collect()),
            primary_field: None,
        }
    }

    pub fn all_text(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            scope: SearchScope::AllText,
            primary_field: None,
        }
    }

    pub fn with_primary_field(mut self, field: impl Into<String>) -> Self {
        self.primary_field = Some(field.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    pub fn primary_field(&self) -> Option<&str> {
        self.primary_field.as_deref().or(match &self.scope {
            SearchScope::Fields(fields) => fields.first().map(String::as_str),
            SearchScope::AllText => None,
        })
    }
}

/// Keeps the records that match `query`, preserving input order.
///
/// An empty term matches everything. Otherwise a record matches when any
/// searchable field, coerced to text, contains the term ignoring case. A missing
/// field simply does not match.
pub fn search<'a, I>(records: I, query: &SearchQuery) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    if query.is_empty() {
        return records.into_iter().collect();
    }

    let needle = query.term.to_lowercase();
    records
        .into_iter()
        .filter(|record| matches_term(record, &needle, &query.scope))
        .collect()
}

fn matches_term(record: &Record, needle: &str, scope: &SearchScope) -> bool {
    match scope {
        SearchScope::Fields(fields) => fields
            .iter()
            .any(|field| record.get(field).is_some_and(|value| contains(value, needle))),
        SearchScope::AllText => record.fields().any(|(_, value)| {
            matches!(value, Value::Text(_) | Value::List(_)) && contains(value, needle)
        }),
    }
}

fn contains(value: &Value, needle: &str) -> bool {
    value.any_text(&mut |text| text.to_lowercase().contains(needle))
}

/// How well a record's primary field matches: 0 prefix or full match,
/// 1 match elsewhere in the field, 2 matched through another field only.
pub fn relevance_tier(record: &Record, primary_field: &str, needle: &str) -> u8 {
    let Some(value) = record.get(primary_field) else {
        return 2;
    };

    let mut tier = 2;
    value.any_text(&mut |text| {
        let lower = text.to_lowercase();
        if lower.starts_with(needle) {
            tier = 0;
            true
        } else {
            if lower.contains(needle) {
                tier = 1;
            }
            false
        }
    });
    tier
}

/// Moves primary-field matches ahead of secondary matches.
///
/// Only meaningful for relevance ordering with a non-empty term. The pass is a
/// stable sort on the tier, so records within a tier keep their search order.
pub fn promote_primary_matches(records: &mut [&Record], query: &SearchQuery) {
    if query.is_empty() {
        return;
    }
    let Some(primary) = query.primary_field() else {
        return;
    };

    let needle = query.term.to_lowercase();
    records.sort_by_key(|record| relevance_tier(record, primary, &needle));
}
