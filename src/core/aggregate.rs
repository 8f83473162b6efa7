use crate::core::allocation::allocate_shared_expenses;
use crate::domain::model::{Breakdown, BreakdownRow, Period, PeriodSummary, Transaction};
use crate::domain::settings::BusinessRules;
use std::collections::{BTreeMap, HashSet};

/// Computes the KPIs and breakdowns of one period.
pub fn summarize(period: &Period, records: &[Transaction], rules: &BusinessRules) -> PeriodSummary {
    let revenue: Vec<&Transaction> = records.iter().filter(|r| r.is_revenue()).collect();

    let revenue_total = sum_amounts(revenue.iter().copied());
    let expense_total = sum_amounts(records.iter().filter(|r| r.is_expense()));
    let active_clients = count_active_clients(records);
    let losses = records.iter().filter(|r| r.loss).count();

    let average_ticket = if active_clients > 0 {
        revenue_total / active_clients as f64
    } else {
        0.0
    };

    PeriodSummary {
        period: period.key(),
        record_count: records.len(),
        revenue_total,
        expense_total,
        net_result: revenue_total - expense_total,
        active_clients,
        losses,
        average_ticket,
        by_modality: breakdown(&revenue, |r| r.modality.as_deref()),
        by_type: breakdown(&revenue, |r| r.kind.as_deref()),
        by_teacher: breakdown(&revenue, |r| r.teacher.as_deref()),
        by_location: breakdown(&revenue, |r| r.location.as_deref()),
        expenses_by_location: allocate_shared_expenses(records, rules),
    }
}

fn sum_amounts<'a>(records: impl Iterator<Item = &'a Transaction>) -> f64 {
    records.filter_map(|r| r.amount).sum()
}

/// Distinct non-empty client names among active records.
pub fn count_active_clients(records: &[Transaction]) -> usize {
    records
        .iter()
        .filter(|r| r.active && !r.client.is_empty())
        .map(|r| r.client.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Sums amounts per key, sorted by key. Records without a key are left out.
pub fn breakdown<F>(records: &[&Transaction], key: F) -> Breakdown
where
    F: Fn(&Transaction) -> Option<&str>,
{
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for &record in records {
        if let Some(k) = key(record) {
            *sums.entry(k.to_string()).or_insert(0.0) += record.amount.unwrap_or(0.0);
        }
    }

    let total: f64 = sums.values().sum();
    let rows = sums
        .into_iter()
        .map(|(key, value)| BreakdownRow {
            key,
            value,
            share: if total != 0.0 { value / total * 100.0 } else { 0.0 },
        })
        .collect();

    Breakdown { rows }
}
