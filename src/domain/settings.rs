use serde::{Deserialize, Serialize};

/// Which sheet column holds the active/inactive status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusColumn {
    /// Zero-based column position.
    Position(usize),
    Named(String),
}

impl Default for StatusColumn {
    fn default() -> Self {
        StatusColumn::Position(2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub date: String,
    pub client: String,
    pub amount: String,
    pub modality: String,
    pub kind: String,
    pub teacher: String,
    pub location: String,
    pub loss: String,
    /// Revenue/expense marker column. Missing from the sheet means every row is revenue.
    pub flow: String,
    pub status: StatusColumn,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: "Data".to_string(),
            client: "Nome do cliente".to_string(),
            amount: "Valor".to_string(),
            modality: "Modalidade".to_string(),
            kind: "Tipo".to_string(),
            teacher: "Professor".to_string(),
            location: "Local".to_string(),
            loss: "Perdas".to_string(),
            flow: "Natureza".to_string(),
            status: StatusColumn::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessRules {
    pub active_value: String,
    pub shared_location: String,
    pub expense_markers: Vec<String>,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            active_value: "ATIVO".to_string(),
            shared_location: "GERAL".to_string(),
            expense_markers: vec!["DESPESA".to_string(), "GASTO".to_string()],
        }
    }
}

impl BusinessRules {
    pub fn is_shared_location(&self, location: &str) -> bool {
        location.trim().eq_ignore_ascii_case(self.shared_location.trim())
    }
}
