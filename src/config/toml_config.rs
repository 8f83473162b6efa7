use crate::adapters::workbook::SUPPORTED_EXTENSIONS;
use crate::core::ConfigProvider;
use crate::domain::model::{OutputFormat, PeriodGrouping};
use crate::domain::ports::ArchiveSettings;
use crate::domain::settings::{BusinessRules, ColumnMapping};
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Report configuration. Every section is optional; missing keys take the
/// defaults of the source workbooks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub input: InputConfig,
    pub columns: ColumnMapping,
    pub rules: BusinessRules,
    pub report: ReportSection,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub dir: String,
    pub extensions: Vec<String>,
    pub skip_unreadable: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            extensions: vec!["xlsx".to_string()],
            skip_unreadable: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub group_by: PeriodGrouping,
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub archive: Option<ArchiveConfig>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: "relatorios".to_string(),
            output_formats: vec!["html".to_string()],
            archive: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub enabled: bool,
    #[serde(default = "default_archive_filename")]
    pub filename: String,
}

pub fn default_archive_filename() -> String {
    "relatorios.zip".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Loads the configuration from a TOML file, expanding `${VAR}` references.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReportError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("input.dir", &self.input.dir)?;
        validation::validate_extensions(
            "input.extensions",
            &self.input.extensions,
            &SUPPORTED_EXTENSIONS,
        )?;

        validation::validate_non_empty_string("columns.date", &self.columns.date)?;
        validation::validate_non_empty_string("columns.client", &self.columns.client)?;
        validation::validate_non_empty_string("columns.amount", &self.columns.amount)?;
        validation::validate_non_empty_string("rules.active_value", &self.rules.active_value)?;
        validation::validate_non_empty_string(
            "rules.shared_location",
            &self.rules.shared_location,
        )?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(level) = self.log_level() {
            validation::validate_log_level("monitoring.log_level", level)?;
        }

        if let Some(archive) = self.load.archive.as_ref().filter(|a| a.enabled) {
            validation::validate_non_empty_string("load.archive.filename", &archive.filename)?;
            if !archive.filename.to_lowercase().ends_with(".zip") {
                return Err(ReportError::InvalidConfigValueError {
                    field: "load.archive.filename".to_string(),
                    value: archive.filename.clone(),
                    reason: "Archive name must end with .zip".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn input_dir(&self) -> &str {
        &self.input.dir
    }

    pub fn output_path(&self) -> &str {
        &self.load.output_path
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// Default log level for the crate's own events; `RUST_LOG` and `--verbose` take precedence.
    pub fn log_level(&self) -> Option<&str> {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_level.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_extensions(&self) -> &[String] {
        &self.input.extensions
    }

    fn skip_unreadable(&self) -> bool {
        self.input.skip_unreadable
    }

    fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    fn rules(&self) -> &BusinessRules {
        &self.rules
    }

    fn grouping(&self) -> PeriodGrouping {
        self.report.group_by
    }

    fn period_filter(&self) -> Option<&str> {
        self.report
            .period
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        let mut formats: Vec<OutputFormat> = Vec::new();
        for format in self.load.output_formats.iter().filter_map(|f| f.parse().ok()) {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }

    fn archive(&self) -> Option<ArchiveSettings> {
        self.load
            .archive
            .as_ref()
            .filter(|a| a.enabled)
            .map(|a| ArchiveSettings {
                filename: a.filename.clone(),
            })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
