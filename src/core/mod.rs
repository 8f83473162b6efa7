pub mod aggregate;
pub mod allocation;
pub mod etl;
pub mod normalize;
pub mod period;

pub use crate::domain::model::{PeriodSummary, TransformResult, Transaction};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
