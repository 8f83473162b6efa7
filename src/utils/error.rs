use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("No input files with extensions [{extensions}] found in '{path}'")]
    EmptyInput { path: String, extensions: String },

    #[error("Unsupported input file '{file}'")]
    UnsupportedFile { file: String },

    #[error("Failed to read '{file}': {message}")]
    SourceFileError { file: String, message: String },

    #[error("Column '{column}' not found in '{file}'")]
    MissingColumn { file: String, column: String },

    #[error("Period '{key}' not found (available: {available})")]
    UnknownPeriod { key: String, available: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Data,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReportError::EmptyInput { .. }
            | ReportError::UnsupportedFile { .. }
            | ReportError::SourceFileError { .. }
            | ReportError::WorkbookError(_)
            | ReportError::CsvError(_) => ErrorCategory::Input,
            ReportError::MissingColumn { .. }
            | ReportError::UnknownPeriod { .. }
            | ReportError::ProcessingError { .. } => ErrorCategory::Data,
            ReportError::ZipError(_) | ReportError::SerializationError(_) => {
                ErrorCategory::Output
            }
            ReportError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReportError::EmptyInput { .. } => {
                "Check --input-dir and the [input] extensions setting".to_string()
            }
            ReportError::UnsupportedFile { .. } => {
                "Convert the file to .xlsx, .ods or .csv".to_string()
            }
            ReportError::SourceFileError { .. }
            | ReportError::WorkbookError(_)
            | ReportError::CsvError(_) => {
                "Make sure the workbook is not open in another program, or set input.skip_unreadable = true".to_string()
            }
            ReportError::MissingColumn { column, .. } => format!(
                "Rename the header to '{}' or map it in the [columns] section",
                column
            ),
            ReportError::UnknownPeriod { available, .. } => {
                format!("Pick one of: {}", available)
            }
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            ReportError::ZipError(_) | ReportError::SerializationError(_) => {
                "Retry the run; disable the archive if the problem persists".to_string()
            }
            ReportError::IoError(_) => {
                "Check that the output directory is writable and the disk is not full".to_string()
            }
            ReportError::ProcessingError { .. } => {
                "Inspect the input data with --verbose".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read the input files: {}", self),
            ErrorCategory::Data => format!("The input data could not be processed: {}", self),
            ErrorCategory::Output => format!("Failed to produce the reports: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
