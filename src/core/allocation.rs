use crate::domain::model::{AllocationRow, Transaction};
use crate::domain::settings::BusinessRules;
use std::collections::{BTreeMap, BTreeSet};

/// Spreads expenses booked on the shared location across the real locations.
///
/// Each location receives a slice of the shared pool proportional to its
/// distinct active clients. With no active clients anywhere the pool is split
/// evenly; with no other location it stays on the shared row. The sum of
/// `total` always equals the sum of expense amounts. A period without any
/// expense amount has no rows.
pub fn allocate_shared_expenses(
    records: &[Transaction],
    rules: &BusinessRules,
) -> Vec<AllocationRow> {
    if !records.iter().any(|r| r.is_expense() && r.amount.is_some()) {
        return Vec::new();
    }

    let mut direct: BTreeMap<String, f64> = BTreeMap::new();
    let mut clients: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    let mut pool = 0.0;

    for record in records {
        let location = match record.location.as_deref() {
            Some(loc) if rules.is_shared_location(loc) => {
                if record.is_expense() {
                    pool += record.amount.unwrap_or(0.0);
                }
                continue;
            }
            Some(loc) => loc.to_string(),
            None => {
                if record.is_expense() {
                    tracing::debug!("Expense without location kept out of allocation");
                }
                continue;
            }
        };

        let entry = direct.entry(location.clone()).or_insert(0.0);
        if record.is_expense() {
            *entry += record.amount.unwrap_or(0.0);
        }

        let set = clients.entry(location).or_default();
        if record.active && !record.client.is_empty() {
            set.insert(record.client.as_str());
        }
    }

    let unlocated: f64 = records
        .iter()
        .filter(|r| r.is_expense() && r.location.is_none())
        .filter_map(|r| r.amount)
        .sum();

    let mut rows: Vec<AllocationRow> = direct
        .iter()
        .map(|(location, value)| AllocationRow {
            location: location.clone(),
            direct: *value,
            allocated: 0.0,
            total: *value,
            active_clients: clients.get(location).map(BTreeSet::len).unwrap_or(0),
        })
        .collect();

    if pool != 0.0 {
        if rows.is_empty() {
            rows.push(AllocationRow {
                location: rules.shared_location.clone(),
                direct: pool,
                allocated: 0.0,
                total: pool,
                active_clients: 0,
            });
        } else {
            let weight_total: usize = rows.iter().map(|r| r.active_clients).sum();
            let count = rows.len() as f64;
            for row in &mut rows {
                row.allocated = if weight_total > 0 {
                    pool * row.active_clients as f64 / weight_total as f64
                } else {
                    pool / count
                };
                row.total = row.direct + row.allocated;
            }
        }
    }

    if unlocated != 0.0 {
        rows.push(AllocationRow {
            location: String::new(),
            direct: unlocated,
            allocated: 0.0,
            total: unlocated,
            active_clients: 0,
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Flow;

    fn record(location: Option<&str>, client: &str, active: bool, amount: f64, flow: Flow) -> Transaction {
        Transaction {
            label: "Janeiro".to_string(),
            date: None,
            day: None,
            client: client.to_string(),
            amount: Some(amount),
            modality: None,
            kind: None,
            teacher: None,
            location: location.map(str::to_string),
            active,
            loss: false,
            flow,
        }
    }

    fn total(rows: &[AllocationRow]) -> f64 {
        rows.iter().map(|r| r.total).sum()
    }

    #[test]
    fn test_proportional_to_active_clients() {
        let records = vec![
            record(Some("Porto"), "ANA", true, 100.0, Flow::Revenue),
            record(Some("Porto"), "RUI", true, 100.0, Flow::Revenue),
            record(Some("Porto"), "RUI", true, 50.0, Flow::Revenue),
            record(Some("Braga"), "EVA", true, 80.0, Flow::Revenue),
            record(Some("Braga"), "ZE", false, 80.0, Flow::Revenue),
            record(Some("Porto"), "", false, 30.0, Flow::Expense),
            record(Some("geral"), "", false, 300.0, Flow::Expense),
        ];

        let rows = allocate_shared_expenses(&records, &BusinessRules::default());
        assert_eq!(rows.len(), 2);

        let braga = &rows[0];
        assert_eq!(braga.location, "Braga");
        assert_eq!(braga.active_clients, 1);
        assert!((braga.allocated - 100.0).abs() < 1e-9);

        let porto = &rows[1];
        assert_eq!(porto.active_clients, 2);
        assert!((porto.direct - 30.0).abs() < 1e-9);
        assert!((porto.allocated - 200.0).abs() < 1e-9);
        assert!((porto.total - 230.0).abs() < 1e-9);

        assert!((total(&rows) - 330.0).abs() < 1e-9);
    }

    #[test]
    fn test_even_split_without_active_clients() {
        let records = vec![
            record(Some("Porto"), "ANA", false, 10.0, Flow::Revenue),
            record(Some("Braga"), "RUI", false, 10.0, Flow::Revenue),
            record(Some("Lisboa"), "EVA", false, 10.0, Flow::Revenue),
            record(Some("GERAL"), "", false, 90.0, Flow::Expense),
        ];

        let rows = allocate_shared_expenses(&records, &BusinessRules::default());
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert!((row.allocated - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_pool_stays_shared_without_locations() {
        let records = vec![record(Some("GERAL"), "", false, 75.0, Flow::Expense)];

        let rows = allocate_shared_expenses(&records, &BusinessRules::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].location, "GERAL");
        assert!((rows[0].total - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_is_preserved_with_unlocated_expenses() {
        let records = vec![
            record(Some("Porto"), "ANA", true, 10.0, Flow::Revenue),
            record(None, "", false, 12.5, Flow::Expense),
            record(Some("GERAL"), "", false, 40.0, Flow::Expense),
        ];

        let rows = allocate_shared_expenses(&records, &BusinessRules::default());
        assert!((total(&rows) - 52.5).abs() < 1e-9);
        assert_eq!(rows.last().unwrap().location, "");
    }

    #[test]
    fn test_revenue_only_period_has_no_rows() {
        let records = vec![
            record(Some("Porto"), "ANA", true, 10.0, Flow::Revenue),
            record(Some("Braga"), "RUI", true, 20.0, Flow::Revenue),
        ];
        let rows = allocate_shared_expenses(&records, &BusinessRules::default());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_locations_without_expenses_keep_zero_rows() {
        let records = vec![
            record(Some("Porto"), "ANA", true, 10.0, Flow::Revenue),
            record(Some("Braga"), "", false, 15.0, Flow::Expense),
        ];
        let rows = allocate_shared_expenses(&records, &BusinessRules::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].location, "Porto");
        assert_eq!(rows[1].total, 0.0);
    }
}
