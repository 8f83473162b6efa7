use crate::domain::model::{Period, PeriodGrouping, Transaction};
use crate::utils::error::{ReportError, Result};
use chrono::Datelike;
use std::collections::BTreeMap;

impl Period {
    /// Period a transaction falls into. Date-derived groupings skip undated rows.
    pub fn of(transaction: &Transaction, grouping: PeriodGrouping) -> Option<Period> {
        match grouping {
            PeriodGrouping::Source => Some(Period::Source(transaction.label.clone())),
            PeriodGrouping::Month => transaction.date.map(|d| Period::Month {
                year: d.year(),
                month: d.month(),
            }),
            PeriodGrouping::Quarter => transaction.date.map(|d| Period::Quarter {
                year: d.year(),
                quarter: (d.month() - 1) / 3 + 1,
            }),
            PeriodGrouping::Year => transaction.date.map(|d| Period::Year(d.year())),
        }
    }
}

pub fn group_by_period(
    transactions: Vec<Transaction>,
    grouping: PeriodGrouping,
) -> BTreeMap<Period, Vec<Transaction>> {
    let mut groups: BTreeMap<Period, Vec<Transaction>> = BTreeMap::new();
    let mut undated = 0usize;

    for transaction in transactions {
        match Period::of(&transaction, grouping) {
            Some(period) => groups.entry(period).or_default().push(transaction),
            None => undated += 1,
        }
    }

    if undated > 0 {
        tracing::warn!(
            "⚠️ {} records without a valid date excluded from {:?} grouping",
            undated,
            grouping
        );
    }

    groups
}

/// Keeps only the period whose key matches `key` (case-insensitive).
pub fn select_period(
    groups: BTreeMap<Period, Vec<Transaction>>,
    key: &str,
) -> Result<BTreeMap<Period, Vec<Transaction>>> {
    let wanted = key.trim().to_lowercase();
    let available: Vec<String> = groups.keys().map(Period::key).collect();

    let selected: BTreeMap<_, _> = groups
        .into_iter()
        .filter(|(period, _)| period.key().to_lowercase() == wanted)
        .collect();

    if selected.is_empty() {
        return Err(ReportError::UnknownPeriod {
            key: key.to_string(),
            available: if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            },
        });
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Flow;
    use chrono::NaiveDate;

    fn tx(label: &str, date: Option<(i32, u32, u32)>) -> Transaction {
        let date = date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        Transaction {
            label: label.to_string(),
            date,
            day: date.map(|d| d.day()),
            client: "ANA".to_string(),
            amount: Some(10.0),
            modality: None,
            kind: None,
            teacher: None,
            location: None,
            active: true,
            loss: false,
            flow: Flow::Revenue,
        }
    }

    #[test]
    fn test_group_by_source_keeps_undated() {
        let groups = group_by_period(
            vec![tx("Janeiro", None), tx("Fevereiro", Some((2024, 2, 1))), tx("Janeiro", None)],
            PeriodGrouping::Source,
        );
        let keys: Vec<String> = groups.keys().map(Period::key).collect();
        assert_eq!(keys, vec!["Fevereiro", "Janeiro"]);
        assert_eq!(groups[&Period::Source("Janeiro".into())].len(), 2);
    }

    #[test]
    fn test_group_by_quarter() {
        let groups = group_by_period(
            vec![
                tx("a", Some((2024, 1, 10))),
                tx("a", Some((2024, 3, 31))),
                tx("b", Some((2024, 4, 1))),
                tx("b", None),
            ],
            PeriodGrouping::Quarter,
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&Period::Quarter { year: 2024, quarter: 1 }].len(), 2);
        assert_eq!(groups[&Period::Quarter { year: 2024, quarter: 2 }].len(), 1);
    }

    #[test]
    fn test_group_by_month_and_year() {
        let data = vec![tx("a", Some((2023, 12, 31))), tx("a", Some((2024, 1, 1)))];
        let months = group_by_period(data.clone(), PeriodGrouping::Month);
        let keys: Vec<String> = months.keys().map(Period::key).collect();
        assert_eq!(keys, vec!["2023-12", "2024-01"]);

        let years = group_by_period(data, PeriodGrouping::Year);
        assert_eq!(years.len(), 2);
    }

    #[test]
    fn test_select_period() {
        let groups = group_by_period(
            vec![tx("Janeiro", None), tx("Fevereiro", None)],
            PeriodGrouping::Source,
        );
        let selected = select_period(groups.clone(), "janeiro").unwrap();
        assert_eq!(selected.len(), 1);

        match select_period(groups, "Março").unwrap_err() {
            ReportError::UnknownPeriod { available, .. } => {
                assert_eq!(available, "Fevereiro, Janeiro");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
