use crate::enums::SortOrder;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// One selectable option of a facet.
///
/// `values` are the field values the option stands for. The company industry
/// option `tech` maps to `["科技"]`; a news category may map to several tags.
/// An option without values matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A facet: a named set of OR'd options evaluated against one or more fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub id: String,
    pub name: String,
    /// A record passes an option when any of these fields equals one of its values.
    pub fields: Vec<String>,
    pub options: Vec<FilterOption>,
}

impl FilterGroup {
    pub fn option(&self, option_id: &str) -> Option<&FilterOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// The options a user has ticked, keyed by group id.
///
/// A group never maps to an empty set: removing its last option removes the group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<G, O>(pairs: impl IntoIterator<Item = (G, O)>) -> Self
    where
        G: Into<String>,
        O: Into<String>,
    {
        let mut selection = Self::new();
        for (group, option) in pairs {
            selection.select(group, option);
        }
        selection
    }

    pub fn select(&mut self, group: impl Into<String>, option: impl Into<String>) {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(option.into());
    }

    pub fn deselect(&mut self, group: &str, option: &str) {
        if let Some(options) = self.groups.get_mut(group) {
            options.remove(option);
            if options.is_empty() {
                self.groups.remove(group);
            }
        }
    }

    /// Flips an option and returns whether it is selected afterwards.
    pub fn toggle(&mut self, group: &str, option: &str) -> bool {
        if self.is_selected(group, option) {
            self.deselect(group, option);
            false
        } else {
            self.select(group, option);
            true
        }
    }

    pub fn clear_group(&mut self, group: &str) {
        self.groups.remove(group);
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn is_selected(&self, group: &str, option: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|options| options.contains(option))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates `(group id, selected option ids)`; every set is non-empty.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.groups.iter().map(|(group, options)| (group.as_str(), options))
    }
}

/// What to order by. `Relevance` keeps the order produced by searching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Relevance,
    Field(String),
}

impl FromStr for SortKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "relevance" => SortKey::Relevance,
            field => SortKey::Field(field.to_string()),
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Relevance => f.write_str("relevance"),
            SortKey::Field(field) => f.write_str(field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    pub fn field(field: impl Into<String>, order: SortOrder) -> Self {
        Self::new(SortKey::Field(field.into()), order)
    }

    /// The sort after the user clicks the sort control for `key`.
    ///
    /// Clicking the active key flips its direction; clicking another key switches
    /// to it with `initial` as the starting direction.
    pub fn toggle(&self, key: SortKey, initial: SortOrder) -> Self {
        if self.key == key {
            Self::new(key, self.order.reversed())
        } else {
            Self::new(key, initial)
        }
    }
}

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    number: usize,
    size: usize,
}

impl Page {
    pub const DEFAULT_SIZE: usize = 10;

    pub fn new(number: usize, size: usize) -> Result<Self, CoreError> {
        if number == 0 {
            return Err(CoreError::InvalidInput(
                "page number".to_string(),
                "pages are numbered from 1".to_string(),
            ));
        }
        if size == 0 {
            return Err(CoreError::InvalidInput(
                "page size".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        Ok(Self { number, size })
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// `max(1, ceil(total / size))`.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.size).max(1)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: Self::DEFAULT_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_last_option_removes_group() {
        let mut selection = FilterSelection::new();
        selection.select("industry", "tech");
        selection.select("industry", "finance");
        selection.deselect("industry", "tech");
        assert!(selection.is_selected("industry", "finance"));

        selection.deselect("industry", "finance");
        assert!(selection.is_empty());
        assert_eq!(selection.groups().count(), 0);
    }

    #[test]
    fn toggle_round_trips() {
        let mut selection = FilterSelection::new();
        assert!(selection.toggle("location", "beijing"));
        assert!(!selection.toggle("location", "beijing"));
        assert!(selection.is_empty());
    }

    #[test]
    fn selection_ignores_insertion_order() {
        let a = FilterSelection::from_pairs([("industry", "tech"), ("location", "beijing")]);
        let b = FilterSelection::from_pairs([("location", "beijing"), ("industry", "tech")]);
        assert_eq!(a, b);
    }

    #[test]
    fn sort_toggle_flips_active_key_and_resets_new_key() {
        let spec = SortSpec::field("price", SortOrder::Desc);
        assert_eq!(
            spec.toggle(SortKey::Field("price".into()), SortOrder::Desc),
            SortSpec::field("price", SortOrder::Asc)
        );
        assert_eq!(
            spec.toggle(SortKey::Field("name".into()), SortOrder::Asc),
            SortSpec::field("name", SortOrder::Asc)
        );
    }

    #[test]
    fn sort_key_parses_relevance() {
        assert_eq!("relevance".parse::<SortKey>().unwrap(), SortKey::Relevance);
        assert_eq!("price".parse::<SortKey>().unwrap(), SortKey::Field("price".into()));
    }

    #[test]
    fn page_validation_and_total_pages() {
        assert!(Page::new(0, 10).is_err());
        assert!(Page::new(1, 0).is_err());

        let page = Page::new(1, 10).unwrap();
        assert_eq!(page.total_pages(0), 1);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
    }
}
