//! Dashboard aggregation
//!
//! Pure functions over an in-memory record set. Everything is recomputed
//! from the current snapshot on each display; there is no incremental
//! state. Numeric columns tolerate currency formatting ("$1,200.00");
//! values that still fail to parse count as zero.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::store::RecordSet;

fn money_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[$,\s]").expect("static regex"))
}

/// Parse a numeric cell, stripping currency symbols and separators.
/// Non-parseable values are 0.
pub fn parse_numeric(raw: &str) -> f64 {
    money_chars()
        .replace_all(raw, "")
        .parse::<f64>()
        .unwrap_or(0.0)
}

/// Parse a date cell. Forms submit ISO dates; hand-edited sheet rows
/// sometimes carry US-style dates, so both are accepted.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

/// Sum a numeric column.
pub fn sum_numeric(records: &RecordSet, column: &str) -> f64 {
    records.column(column).map(parse_numeric).sum()
}

/// Count rows where `column` equals `value` exactly.
pub fn count_matching(records: &RecordSet, column: &str, value: &str) -> usize {
    records.column(column).filter(|v| *v == value).count()
}

/// Count rows whose date column falls strictly after `today`.
pub fn count_after(records: &RecordSet, column: &str, today: NaiveDate) -> usize {
    records
        .column(column)
        .filter_map(parse_date)
        .filter(|d| *d > today)
        .count()
}

/// Earliest date in `column` strictly after `today`.
pub fn min_date_after(records: &RecordSet, column: &str, today: NaiveDate) -> Option<NaiveDate> {
    records
        .column(column)
        .filter_map(parse_date)
        .filter(|d| *d > today)
        .min()
}

/// Group-by sum: total of `value_column` per distinct `key_column` value.
/// Rows with an empty key are skipped.
pub fn sum_by(records: &RecordSet, key_column: &str, value_column: &str) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for row in &records.rows {
        let key = row.get(key_column).map(String::as_str).unwrap_or("");
        if key.is_empty() {
            continue;
        }
        let value = row
            .get(value_column)
            .map(|v| parse_numeric(v))
            .unwrap_or(0.0);
        *totals.entry(key.to_string()).or_insert(0.0) += value;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expenses() -> RecordSet {
        RecordSet::from_values(vec![
            vec!["Category".into(), "Amount".into(), "Date".into()],
            vec!["Travel".into(), "$10.00".into(), "2026-03-01".into()],
            vec!["Supplies".into(), "20".into(), "2026-03-02".into()],
            vec!["Travel".into(), "$5.50".into(), "2026-03-03".into()],
        ])
    }

    #[test]
    fn test_sum_strips_currency_formatting() {
        assert_eq!(sum_numeric(&expenses(), "Amount"), 35.50);
    }

    #[test]
    fn test_sum_treats_garbage_as_zero() {
        let rs = RecordSet::from_values(vec![
            vec!["Amount".into()],
            vec!["$1,200.00".into()],
            vec!["pending".into()],
            vec!["".into()],
        ]);
        assert_eq!(sum_numeric(&rs, "Amount"), 1200.0);
    }

    #[test]
    fn test_sum_missing_column_is_zero() {
        assert_eq!(sum_numeric(&expenses(), "Total"), 0.0);
    }

    #[test]
    fn test_count_matching() {
        assert_eq!(count_matching(&expenses(), "Category", "Travel"), 2);
        assert_eq!(count_matching(&expenses(), "Category", "travel"), 0);
    }

    #[test]
    fn test_count_after_is_strict() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(count_after(&expenses(), "Date", today), 1);
    }

    #[test]
    fn test_min_date_after() {
        let rs = RecordSet::from_values(vec![
            vec!["Due Date".into()],
            vec!["2026-04-15".into()],
            vec!["2026-04-01".into()],
            vec!["2026-01-01".into()],
            vec!["TBD".into()],
        ]);
        let today = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        assert_eq!(
            min_date_after(&rs, "Due Date", today),
            NaiveDate::from_ymd_opt(2026, 4, 1)
        );

        let far_future = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert_eq!(min_date_after(&rs, "Due Date", far_future), None);
    }

    #[test]
    fn test_parse_date_us_format() {
        assert_eq!(
            parse_date("3/1/2026"),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_sum_by_groups_hours_per_employee() {
        let rs = RecordSet::from_values(vec![
            vec!["Employee".into(), "Hours".into()],
            vec!["Ada".into(), "8".into(), ],
            vec!["Grace".into(), "6.5".into()],
            vec!["Ada".into(), "4".into()],
            vec!["".into(), "99".into()],
        ]);
        let totals = sum_by(&rs, "Employee", "Hours");
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Ada"], 12.0);
        assert_eq!(totals["Grace"], 6.5);
    }
}
