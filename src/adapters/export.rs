use crate::domain::model::{PeriodSummary, RenderedDocument};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const JSON_FILE_NAME: &str = "resumo.json";
pub const CSV_FILE_NAME: &str = "detalhe.csv";

pub fn summaries_to_json(summaries: &[PeriodSummary]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(summaries)?)
}

/// Long format: one line per (period, dimension, key), allocation rows included
/// under the `despesas_local` dimension.
pub fn breakdowns_to_csv(summaries: &[PeriodSummary]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["period", "dimension", "key", "value", "share"])?;

    for summary in summaries {
        let dimensions = [
            ("modalidade", &summary.by_modality),
            ("tipo", &summary.by_type),
            ("professor", &summary.by_teacher),
            ("local", &summary.by_location),
        ];
        for (dimension, breakdown) in dimensions {
            for row in &breakdown.rows {
                let value = format!("{:.2}", row.value);
                let share = format!("{:.2}", row.share);
                writer.write_record([
                    summary.period.as_str(),
                    dimension,
                    row.key.as_str(),
                    value.as_str(),
                    share.as_str(),
                ])?;
            }
        }

        let expense_total = summary.expense_total;
        for row in &summary.expenses_by_location {
            let share = if expense_total != 0.0 {
                row.total / expense_total * 100.0
            } else {
                0.0
            };
            let total = format!("{:.2}", row.total);
            let share = format!("{:.2}", share);
            writer.write_record([
                summary.period.as_str(),
                "despesas_local",
                row.location.as_str(),
                total.as_str(),
                share.as_str(),
            ])?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}

pub fn build_archive(documents: &[RenderedDocument]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for document in documents {
        zip.start_file::<_, ()>(document.file_name.as_str(), FileOptions::default())?;
        zip.write_all(&document.contents)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AllocationRow, Breakdown, BreakdownRow};

    fn summary() -> PeriodSummary {
        PeriodSummary {
            period: "Janeiro".to_string(),
            record_count: 2,
            revenue_total: 100.0,
            expense_total: 40.0,
            net_result: 60.0,
            active_clients: 2,
            losses: 0,
            average_ticket: 50.0,
            by_modality: Breakdown {
                rows: vec![
                    BreakdownRow { key: "Pilates".into(), value: 75.0, share: 75.0 },
                    BreakdownRow { key: "Yoga".into(), value: 25.0, share: 25.0 },
                ],
            },
            by_type: Breakdown::default(),
            by_teacher: Breakdown::default(),
            by_location: Breakdown::default(),
            expenses_by_location: vec![AllocationRow {
                location: "Porto".into(),
                direct: 10.0,
                allocated: 30.0,
                total: 40.0,
                active_clients: 2,
            }],
        }
    }

    #[test]
    fn test_csv_long_format() {
        let bytes = breakdowns_to_csv(&[summary()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "period,dimension,key,value,share");
        assert_eq!(lines[1], "Janeiro,modalidade,Pilates,75.00,75.00");
        assert_eq!(lines[2], "Janeiro,modalidade,Yoga,25.00,25.00");
        assert_eq!(lines[3], "Janeiro,despesas_local,Porto,40.00,100.00");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_json_summary() {
        let bytes = summaries_to_json(&[summary()]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value[0]["period"], "Janeiro");
        assert_eq!(value[0]["active_clients"], 2);
        assert_eq!(value[0]["by_modality"]["rows"][1]["key"], "Yoga");
    }

    #[test]
    fn test_archive_contains_documents() {
        let documents = vec![
            RenderedDocument { file_name: "a.html".into(), contents: b"<html></html>".to_vec() },
            RenderedDocument { file_name: "resumo.json".into(), contents: b"[]".to_vec() },
        ];
        let bytes = build_archive(&documents).unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut json = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("resumo.json").unwrap(), &mut json)
            .unwrap();
        assert_eq!(json, "[]");
    }
}
