use crate::domain::model::{CellValue, Flow, SourceTable, Transaction};
use crate::domain::settings::{BusinessRules, ColumnMapping, StatusColumn};
use crate::utils::error::{ReportError, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

struct ColumnIndices {
    date: usize,
    client: usize,
    amount: usize,
    status: Option<usize>,
    modality: Option<usize>,
    kind: Option<usize>,
    teacher: Option<usize>,
    location: Option<usize>,
    loss: Option<usize>,
    flow: Option<usize>,
}

impl ColumnIndices {
    fn resolve(table: &SourceTable, columns: &ColumnMapping) -> Result<Self> {
        let required = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| ReportError::MissingColumn {
                    file: table.source.clone(),
                    column: name.to_string(),
                })
        };

        let status = match &columns.status {
            StatusColumn::Position(idx) if *idx < table.headers.len() => Some(*idx),
            StatusColumn::Position(_) => None,
            StatusColumn::Named(name) => table.column_index(name),
        };
        if status.is_none() {
            tracing::warn!(
                "⚠️ Status column {:?} not present in '{}', no client will count as active",
                columns.status,
                table.source
            );
        }

        Ok(Self {
            date: required(&columns.date)?,
            client: required(&columns.client)?,
            amount: required(&columns.amount)?,
            status,
            modality: table.column_index(&columns.modality),
            kind: table.column_index(&columns.kind),
            teacher: table.column_index(&columns.teacher),
            location: table.column_index(&columns.location),
            loss: table.column_index(&columns.loss),
            flow: table.column_index(&columns.flow),
        })
    }
}

/// Turns the rows of one sheet into transactions.
///
/// Unparseable dates and amounts are coerced to `None` rather than rejected,
/// so a single bad cell never drops the rest of the row.
pub fn normalize_table(
    table: &SourceTable,
    columns: &ColumnMapping,
    rules: &BusinessRules,
) -> Result<Vec<Transaction>> {
    let idx = ColumnIndices::resolve(table, columns)?;
    let active_value = rules.active_value.trim().to_uppercase();
    let markers: Vec<String> = rules
        .expense_markers
        .iter()
        .map(|m| m.trim().to_uppercase())
        .filter(|m| !m.is_empty())
        .collect();

    let empty = CellValue::Empty;
    let mut transactions = Vec::with_capacity(table.rows.len());
    let mut bad_amounts = 0usize;
    let mut bad_dates = 0usize;

    for row in &table.rows {
        let cell = |i: usize| row.get(i).unwrap_or(&empty);
        let optional = |i: Option<usize>| i.map(cell).and_then(CellValue::as_text);

        let date = parse_date(cell(idx.date));
        if date.is_none() && !cell(idx.date).is_empty() {
            bad_dates += 1;
        }

        let amount = parse_amount(cell(idx.amount));
        if amount.is_none() && !cell(idx.amount).is_empty() {
            bad_amounts += 1;
        }

        let active = optional(idx.status)
            .map(|s| s.to_uppercase() == active_value)
            .unwrap_or(false);

        let flow = match optional(idx.flow) {
            Some(marker) => {
                let marker = marker.to_uppercase();
                if markers.iter().any(|m| marker.contains(m.as_str())) {
                    Flow::Expense
                } else {
                    Flow::Revenue
                }
            }
            None => Flow::Revenue,
        };

        transactions.push(Transaction {
            label: table.label.clone(),
            date,
            day: date.map(|d| d.day()),
            client: cell(idx.client)
                .as_text()
                .map(|c| c.to_uppercase())
                .unwrap_or_default(),
            amount,
            modality: optional(idx.modality),
            kind: optional(idx.kind),
            teacher: optional(idx.teacher),
            location: optional(idx.location),
            active,
            loss: optional(idx.loss).is_some(),
            flow,
        });
    }

    if bad_dates > 0 {
        tracing::warn!("⚠️ {}: {} unparseable dates ignored", table.source, bad_dates);
    }
    if bad_amounts > 0 {
        tracing::warn!("⚠️ {}: {} unparseable amounts ignored", table.source, bad_amounts);
    }
    tracing::debug!(
        "Normalized {} rows from {} (label '{}')",
        transactions.len(),
        table.source,
        table.label
    );

    Ok(transactions)
}

pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Text(text) => parse_date_text(text.trim()),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        })
}

/// 1900 date system, using the 1899-12-30 epoch that absorbs the 1900 leap-year bug.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

pub fn parse_amount(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(text) => parse_amount_text(text),
        _ => None,
    }
}

/// Accepts `1234.5`, `1.234,56`, `1,234.56`, `€ 12,5` and `-30`.
/// A lone comma is read as the decimal separator. A lone dot followed by
/// exactly three digits is a thousands separator (`1.234` is 1234), as in
/// the Portuguese sheets; `0.125` and `12.50` stay decimal.
pub fn parse_amount_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("EUR")
        .trim_end_matches("EUR")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();

    let canonical = match (commas, dots) {
        (0, 0) => cleaned,
        (0, 1) if is_thousands_group(&cleaned) => cleaned.replace('.', ""),
        (0, 1) => cleaned,
        (0, _) => cleaned.replace('.', ""),
        (1, 0) => cleaned.replace(',', "."),
        (_, 0) => cleaned.replace(',', ""),
        _ => {
            let last_comma = cleaned.rfind(',')?;
            let last_dot = cleaned.rfind('.')?;
            if last_comma > last_dot {
                cleaned.replace('.', "").replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
    };

    canonical.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_thousands_group(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let Some((int_part, frac_part)) = unsigned.split_once('.') else {
        return false;
    };
    (1..=3).contains(&int_part.len())
        && !int_part.starts_with('0')
        && int_part.chars().all(|c| c.is_ascii_digit())
        && frac_part.len() == 3
        && frac_part.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn table(headers: &[&str], rows: Vec<Vec<CellValue>>) -> SourceTable {
        SourceTable {
            source: "Janeiro.xlsx".to_string(),
            label: "Janeiro".to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount_text("1234.5"), Some(1234.5));
        assert_eq!(parse_amount_text("1.234,56"), Some(1234.56));
        assert_eq!(parse_amount_text("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount_text("€ 12,5"), Some(12.5));
        assert_eq!(parse_amount_text("-30"), Some(-30.0));
        assert_eq!(parse_amount_text("1.000.000"), Some(1_000_000.0));
        assert_eq!(parse_amount_text("1.234"), Some(1234.0));
        assert_eq!(parse_amount_text("€ -2.500"), Some(-2500.0));
        assert_eq!(parse_amount_text("0.125"), Some(0.125));
        assert_eq!(parse_amount_text("12.50"), Some(12.5));
        assert_eq!(parse_amount_text("1234.567"), Some(1234.567));
        assert_eq!(parse_amount_text("abc"), None);
        assert_eq!(parse_amount_text("  "), None);
    }

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date(&text("2024-01-15")), Some(expected));
        assert_eq!(parse_date(&text("15/01/2024")), Some(expected));
        assert_eq!(parse_date(&text("2024-01-15 10:30:00")), Some(expected));
        assert_eq!(parse_date(&CellValue::Number(45306.0)), Some(expected));
        assert_eq!(parse_date(&text("15-01-2024")), Some(expected));
        assert_eq!(parse_date(&text(" 15.01.2024 ")), Some(expected));
        assert_eq!(parse_date(&text("15/01/2024 08:05")), Some(expected));
        assert_eq!(parse_date(&text("not a date")), None);
        assert_eq!(parse_date(&CellValue::Empty), None);
        assert_eq!(parse_date(&CellValue::Bool(true)), None);

        let stamp = expected.and_hms_opt(18, 45, 0).unwrap();
        assert_eq!(parse_date(&CellValue::DateTime(stamp)), Some(expected));
    }

    #[test]
    fn test_excel_serial_limits() {
        assert_eq!(
            excel_serial_to_date(45306.75),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(excel_serial_to_date(1.0), NaiveDate::from_ymd_opt(1899, 12, 31));
        assert_eq!(
            excel_serial_to_date(MAX_EXCEL_SERIAL),
            NaiveDate::from_ymd_opt(9999, 12, 31)
        );
        assert_eq!(excel_serial_to_date(0.5), None);
        assert_eq!(excel_serial_to_date(-3.0), None);
        assert_eq!(excel_serial_to_date(MAX_EXCEL_SERIAL + 1.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(parse_date(&CellValue::Number(0.0)), None);
    }

    #[test]
    fn test_normalize_rows() {
        let t = table(
            &["Data", "Nome do cliente", "Estado", "Valor", "Modalidade", "Local", "Perdas"],
            vec![
                vec![
                    text("2024-01-15"),
                    text("  ana silva "),
                    text(" ativo"),
                    CellValue::Number(50.0),
                    text("Pilates"),
                    text("Porto"),
                    CellValue::Empty,
                ],
                vec![
                    text("bad"),
                    text("Rui"),
                    text("INATIVO"),
                    text("abc"),
                    CellValue::Empty,
                    text(" "),
                    text("cancelou"),
                ],
            ],
        );

        let rows =
            normalize_table(&t, &ColumnMapping::default(), &BusinessRules::default()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].client, "ANA SILVA");
        assert!(rows[0].active);
        assert!(!rows[0].loss);
        assert_eq!(rows[0].day, Some(15));
        assert_eq!(rows[0].amount, Some(50.0));
        assert_eq!(rows[0].modality.as_deref(), Some("Pilates"));
        assert_eq!(rows[0].kind, None);
        assert_eq!(rows[0].flow, Flow::Revenue);

        assert!(!rows[1].active);
        assert!(rows[1].loss);
        assert_eq!(rows[1].date, None);
        assert_eq!(rows[1].amount, None);
        assert_eq!(rows[1].location, None);
    }

    #[test]
    fn test_flow_column_marks_expenses() {
        let t = table(
            &["Data", "Nome do cliente", "Estado", "Valor", "Natureza"],
            vec![
                vec![text("2024-01-02"), text(""), text(""), CellValue::Number(80.0), text("Despesa fixa")],
                vec![text("2024-01-02"), text("Ana"), text("Ativo"), CellValue::Number(40.0), text("Receita")],
            ],
        );

        let rows =
            normalize_table(&t, &ColumnMapping::default(), &BusinessRules::default()).unwrap();
        assert_eq!(rows[0].flow, Flow::Expense);
        assert_eq!(rows[0].client, "");
        assert_eq!(rows[1].flow, Flow::Revenue);
    }

    #[test]
    fn test_missing_required_column() {
        let t = table(&["Data", "Nome do cliente", "Estado"], vec![]);
        let err = normalize_table(&t, &ColumnMapping::default(), &BusinessRules::default())
            .unwrap_err();
        match err {
            ReportError::MissingColumn { file, column } => {
                assert_eq!(file, "Janeiro.xlsx");
                assert_eq!(column, "Valor");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_named_status_column() {
        let mut columns = ColumnMapping::default();
        columns.status = StatusColumn::Named("Situação".to_string());
        let t = table(
            &["Nome do cliente", "Data", "Valor", "Situação"],
            vec![vec![text("Ana"), text("2024-02-01"), CellValue::Number(10.0), text("ATIVO")]],
        );

        let rows = normalize_table(&t, &columns, &BusinessRules::default()).unwrap();
        assert!(rows[0].active);
    }
}
