use crate::adapters::export::{self, CSV_FILE_NAME, JSON_FILE_NAME};
use crate::adapters::html;
use crate::adapters::workbook::read_table;
use crate::core::aggregate::summarize;
use crate::core::normalize::normalize_table;
use crate::core::period::{group_by_period, select_period};
use crate::core::{ConfigProvider, Pipeline, PeriodSummary, Storage, Transaction, TransformResult};
use crate::domain::model::{OutputFormat, RenderedDocument};
use crate::utils::error::{ReportError, Result};

/// Reads workbooks from `input` and writes the rendered reports to `output`.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) input: S,
    pub(crate) output: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(input: S, output: S, config: C) -> Self {
        Self {
            input,
            output,
            config,
        }
    }

    /// Input files the pipeline would read, in processing order.
    pub async fn input_files(&self) -> Result<Vec<String>> {
        let extensions = self.config.input_extensions();
        let files = self.input.list_files(extensions).await?;
        if files.is_empty() {
            return Err(ReportError::EmptyInput {
                path: self.input.location(),
                extensions: extensions.join(", "),
            });
        }
        Ok(files)
    }

    async fn read_transactions(&self, file: &str) -> Result<Vec<Transaction>> {
        let bytes = self.input.read_file(file).await?;
        let table = read_table(file, bytes).map_err(|e| match e {
            ReportError::WorkbookError(_) | ReportError::CsvError(_) | ReportError::IoError(_) => {
                ReportError::SourceFileError {
                    file: file.to_string(),
                    message: e.to_string(),
                }
            }
            other => other,
        })?;
        normalize_table(&table, self.config.columns(), self.config.rules())
    }

    fn render(&self, summaries: &[PeriodSummary]) -> Result<Vec<RenderedDocument>> {
        let mut documents = Vec::new();

        for format in self.config.output_formats() {
            match format {
                OutputFormat::Html => {
                    for summary in summaries {
                        documents.push(RenderedDocument {
                            file_name: html::report_file_name(&summary.period),
                            contents: html::render_period_report(summary).into_bytes(),
                        });
                    }
                    documents.push(RenderedDocument {
                        file_name: "index.html".to_string(),
                        contents: html::render_index(summaries).into_bytes(),
                    });
                }
                OutputFormat::Json => documents.push(RenderedDocument {
                    file_name: JSON_FILE_NAME.to_string(),
                    contents: export::summaries_to_json(summaries)?,
                }),
                OutputFormat::Csv => documents.push(RenderedDocument {
                    file_name: CSV_FILE_NAME.to_string(),
                    contents: export::breakdowns_to_csv(summaries)?,
                }),
            }
        }

        Ok(documents)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Transaction>> {
        let files = self.input_files().await?;
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for file in &files {
            match self.read_transactions(file).await {
                Ok(mut rows) => {
                    tracing::info!("📄 {}: {} records", file, rows.len());
                    records.append(&mut rows);
                }
                Err(e) if self.config.skip_unreadable() => {
                    tracing::warn!("⚠️ Skipping {}: {}", file, e);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if skipped == files.len() {
            return Err(ReportError::ProcessingError {
                message: format!("none of the {} input files could be read", files.len()),
            });
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<Transaction>) -> Result<TransformResult> {
        let grouping = self.config.grouping();
        let mut groups = group_by_period(data, grouping);
        tracing::debug!("Grouped records into {} periods ({:?})", groups.len(), grouping);

        if let Some(key) = self.config.period_filter() {
            groups = select_period(groups, key)?;
            tracing::info!("🔍 Restricted report to period {}", key);
        }

        let rules = self.config.rules();
        let summaries: Vec<PeriodSummary> = groups
            .iter()
            .map(|(period, records)| summarize(period, records, rules))
            .collect();

        for summary in &summaries {
            tracing::debug!(
                "{}: revenue {:.2}, expenses {:.2}, {} active clients, {} losses",
                summary.period,
                summary.revenue_total,
                summary.expense_total,
                summary.active_clients,
                summary.losses
            );
        }

        let documents = self.render(&summaries)?;
        Ok(TransformResult {
            summaries,
            documents,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        for document in &result.documents {
            self.output
                .write_file(&document.file_name, &document.contents)
                .await?;
            tracing::info!("✔ Report written: {}", document.file_name);
        }

        if let Some(archive) = self.config.archive() {
            let data = export::build_archive(&result.documents)?;
            tracing::debug!("Writing archive ({} bytes)", data.len());
            self.output.write_file(&archive.filename, &data).await?;
            tracing::info!("📦 Archive written: {}", archive.filename);
        }

        Ok(self.output.location())
    }
}
