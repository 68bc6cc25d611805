use crate::dates::parse_instant;
use core_types::{Collation, Record, SortKey, SortSpec, Value};
use std::cmp::Ordering;

/// Orders two present values in ascending order.
///
/// Numbers compare numerically, booleans `false < true`. Text that reads as a
/// date or timestamp compares by the instant it names and sorts before other
/// text, which compares by `collation`. Any other pairing falls back to
/// comparing the values' text forms.
pub fn compare_values(a: &Value, b: &Value, collation: Collation) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => match (parse_instant(x), parse_instant(y)) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => collation.compare(x, y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => {
            let left = a.as_text().unwrap_or_default();
            let right = b.as_text().unwrap_or_default();
            collation.compare(&left, &right)
        }
    }
}

/// Compares two records on `field`. Records missing the field always come last,
/// whichever direction `spec` asks for.
fn compare_records(a: &Record, b: &Record, field: &str, spec: &SortSpec, collation: Collation) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => spec.order.apply(compare_values(x, y, collation)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by `spec`. `SortKey::Relevance` leaves the order untouched.
pub fn sort<'a>(mut records: Vec<&'a Record>, spec: &SortSpec, collation: Collation) -> Vec<&'a Record> {
    if let SortKey::Field(field) = &spec.key {
        records.sort_by(|a, b| compare_records(a, b, field, spec, collation));
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{alpha_beta_gamma, ids};
    use core_types::SortOrder;
    use rust_decimal_macros::dec;

    #[test]
    fn numeric_ascending_puts_missing_last() {
        let records = alpha_beta_gamma();
        let sorted = sort(records.iter().collect(), &SortSpec::field("price", SortOrder::Asc), Collation::CodePoint);
        assert_eq!(ids(&sorted), ["2", "1", "3"]);
    }

    #[test]
    fn descending_keeps_missing_last() {
        let records = alpha_beta_gamma();
        let sorted = sort(records.iter().collect(), &SortSpec::field("price", SortOrder::Desc), Collation::CodePoint);
        assert_eq!(ids(&sorted), ["1", "2", "3"]);
    }

    #[test]
    fn text_respects_collation() {
        let records = vec![
            Record::new("1").with("name", "beta"),
            Record::new("2").with("name", "Alpha"),
            Record::new("3").with("name", "alpha"),
        ];
        let spec = SortSpec::field("name", SortOrder::Asc);
        assert_eq!(ids(&sort(records.iter().collect(), &spec, Collation::CodePoint)), ["2", "3", "1"]);
        assert_eq!(ids(&sort(records.iter().collect(), &spec, Collation::CaseInsensitive)), ["2", "3", "1"]);

        let records = vec![Record::new("1").with("name", "beta"), Record::new("2").with("name", "Gamma")];
        assert_eq!(ids(&sort(records.iter().collect(), &spec, Collation::CodePoint)), ["2", "1"]);
        assert_eq!(ids(&sort(records.iter().collect(), &spec, Collation::CaseInsensitive)), ["1", "2"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let records = vec![
            Record::new("a").with("sector", "科技"),
            Record::new("b").with("sector", "金融"),
            Record::new("c").with("sector", "科技"),
            Record::new("d").with("sector", "金融"),
        ];
        let asc = sort(records.iter().collect(), &SortSpec::field("sector", SortOrder::Asc), Collation::CodePoint);
        assert_eq!(ids(&asc), ["a", "c", "b", "d"]);
        let desc = sort(records.iter().collect(), &SortSpec::field("sector", SortOrder::Desc), Collation::CodePoint);
        assert_eq!(ids(&desc), ["b", "d", "a", "c"]);
    }

    #[test]
    fn mixed_types_fall_back_to_text() {
        assert_eq!(
            compare_values(&Value::Number(dec!(10)), &Value::from("9"), Collation::CodePoint),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Number(dec!(10)), &Value::Number(dec!(9)), Collation::CodePoint),
            Ordering::Greater
        );
    }

    #[test]
    fn timestamps_sort_by_instant_across_offsets() {
        let records = vec![
            Record::new("early").with("publishedAt", "2024-05-20T01:00:00+08:00"),
            Record::new("late").with("publishedAt", "2024-05-19T20:00:00Z"),
            Record::new("day").with("publishedAt", "2024-05-19"),
            Record::new("undated"),
        ];
        let latest = SortSpec::field("publishedAt", SortOrder::Desc);
        let sorted = sort(records.iter().collect(), &latest, Collation::CodePoint);
        assert_eq!(ids(&sorted), ["late", "early", "day", "undated"]);
    }

    #[test]
    fn dates_sort_before_plain_text() {
        let dated = Value::from("2024-05-19T20:00:00Z");
        let plain = Value::from("2024-05-19x");
        assert_eq!(compare_values(&dated, &plain, Collation::CodePoint), Ordering::Less);
        assert_eq!(compare_values(&plain, &dated, Collation::CodePoint), Ordering::Greater);
    }

    #[test]
    fn relevance_is_a_no_op() {
        let records = alpha_beta_gamma();
        let spec = SortSpec::new(SortKey::Relevance, SortOrder::Asc);
        let sorted = sort(records.iter().rev().collect(), &spec, Collation::CodePoint);
        assert_eq!(ids(&sorted), ["3", "2", "1"]);
    }
}
