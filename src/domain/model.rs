use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single spreadsheet cell after decoding, independent of the file format.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Text as it would appear in the sheet, trimmed. `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            CellValue::Empty => return None,
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string().to_uppercase(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().is_none()
    }
}

/// First worksheet of one input file.
#[derive(Debug, Clone)]
pub struct SourceTable {
    /// File name, e.g. `Janeiro.xlsx`.
    pub source: String,
    /// File stem, used as the file-derived period.
    pub label: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SourceTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Revenue,
    Expense,
}

/// One normalized transaction row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub label: String,
    pub date: Option<NaiveDate>,
    pub day: Option<u32>,
    pub client: String,
    pub amount: Option<f64>,
    pub modality: Option<String>,
    pub kind: Option<String>,
    pub teacher: Option<String>,
    pub location: Option<String>,
    pub active: bool,
    pub loss: bool,
    pub flow: Flow,
}

impl Transaction {
    pub fn is_revenue(&self) -> bool {
        self.flow == Flow::Revenue
    }

    pub fn is_expense(&self) -> bool {
        self.flow == Flow::Expense
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PeriodGrouping {
    /// One period per input file (the file stem, usually a month name).
    #[default]
    Source,
    Month,
    Quarter,
    Year,
}

impl FromStr for PeriodGrouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "source" | "file" => Ok(PeriodGrouping::Source),
            "month" => Ok(PeriodGrouping::Month),
            "quarter" => Ok(PeriodGrouping::Quarter),
            "year" => Ok(PeriodGrouping::Year),
            other => Err(format!(
                "unknown grouping '{}', expected one of: source, month, quarter, year",
                other
            )),
        }
    }
}

impl TryFrom<String> for PeriodGrouping {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Source(String),
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
    Year(i32),
}

impl Period {
    pub fn key(&self) -> String {
        match self {
            Period::Source(label) => label.clone(),
            Period::Month { year, month } => format!("{:04}-{:02}", year, month),
            Period::Quarter { year, quarter } => format!("{:04}-Q{}", year, quarter),
            Period::Year(year) => format!("{:04}", year),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub key: String,
    pub value: f64,
    /// Percentage of the breakdown total, 0..=100.
    pub share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub rows: Vec<BreakdownRow>,
}

impl Breakdown {
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }

    pub fn get(&self, key: &str) -> Option<&BreakdownRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Expenses of one location after the shared pool has been spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRow {
    pub location: String,
    pub direct: f64,
    pub allocated: f64,
    pub total: f64,
    pub active_clients: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: String,
    pub record_count: usize,
    pub revenue_total: f64,
    pub expense_total: f64,
    pub net_result: f64,
    pub active_clients: usize,
    pub losses: usize,
    pub average_ticket: f64,
    pub by_modality: Breakdown,
    pub by_type: Breakdown,
    pub by_teacher: Breakdown,
    pub by_location: Breakdown,
    pub expenses_by_location: Vec<AllocationRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Json,
    Csv,
}

impl OutputFormat {
    pub const ALL: [&'static str; 3] = ["html", "json", "csv"];
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "unsupported format '{}', expected one of: {}",
                other,
                OutputFormat::ALL.join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub summaries: Vec<PeriodSummary>,
    pub documents: Vec<RenderedDocument>,
}
