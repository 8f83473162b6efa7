use crate::config::toml_config::{default_archive_filename, ArchiveConfig, MonitoringConfig, TomlConfig};
use crate::domain::model::PeriodGrouping;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "fin-report")]
#[command(about = "Builds financial reports from monthly transaction workbooks")]
pub struct CliConfig {
    /// TOML configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory holding the workbooks (one file per period)
    #[arg(long)]
    pub input_dir: Option<String>,

    /// Directory the reports are written to
    #[arg(long)]
    pub output_path: Option<String>,

    /// Input file extensions to pick up
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Period grouping: source, month, quarter or year
    #[arg(long, value_parser = clap::value_parser!(PeriodGrouping))]
    pub group_by: Option<PeriodGrouping>,

    /// Only report the period with this key (e.g. Janeiro, 2024-03, 2024-Q1)
    #[arg(long)]
    pub period: Option<String>,

    /// Output formats: html, json, csv
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Also bundle every document into a zip archive
    #[arg(long)]
    pub archive: bool,

    /// Skip workbooks that cannot be read instead of failing
    #[arg(long)]
    pub skip_unreadable: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    /// List what would be processed without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    /// Loads the configuration file (if any) and applies the command line overrides.
    pub fn into_config(self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        if let Some(dir) = self.input_dir {
            config.input.dir = dir;
        }
        if let Some(path) = self.output_path {
            config.load.output_path = path;
        }
        if !self.extensions.is_empty() {
            config.input.extensions = self.extensions;
        }
        if let Some(grouping) = self.group_by {
            config.report.group_by = grouping;
        }
        if self.period.is_some() {
            config.report.period = self.period;
        }
        if !self.formats.is_empty() {
            config.load.output_formats = self.formats;
        }
        if self.archive {
            let filename = config
                .load
                .archive
                .take()
                .map(|a| a.filename)
                .unwrap_or_else(default_archive_filename);
            config.load.archive = Some(ArchiveConfig {
                enabled: true,
                filename,
            });
        }
        if self.skip_unreadable {
            config.input.skip_unreadable = true;
        }
        if self.monitor {
            let mut monitoring = config.monitoring.take().unwrap_or_default();
            monitoring.enabled = true;
            config.monitoring = Some(monitoring);
        }

        Ok(config)
    }
}
