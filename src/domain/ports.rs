use crate::domain::model::{OutputFormat, PeriodGrouping, TransformResult, Transaction};
use crate::domain::settings::{BusinessRules, ColumnMapping};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// File names (not paths) directly under the storage root whose extension
    /// matches one of `extensions`, sorted.
    fn list_files(
        &self,
        extensions: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    fn location(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSettings {
    pub filename: String,
}

pub trait ConfigProvider: Send + Sync {
    fn input_extensions(&self) -> &[String];
    fn skip_unreadable(&self) -> bool;
    fn columns(&self) -> &ColumnMapping;
    fn rules(&self) -> &BusinessRules;
    fn grouping(&self) -> PeriodGrouping;
    fn period_filter(&self) -> Option<&str>;
    fn output_formats(&self) -> Vec<OutputFormat>;
    fn archive(&self) -> Option<ArchiveSettings>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Transaction>>;
    async fn transform(&self, data: Vec<Transaction>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
