use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting report generation...");
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("📥 Reading workbooks...");
        let records = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", records.len());
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🔄 Aggregating periods...");
        let result = self.pipeline.transform(records).await?;
        tracing::info!(
            "Summarized {} periods into {} documents",
            result.summaries.len(),
            result.documents.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Writing reports...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Transaction, TransformResult};
    use crate::domain::model::Flow;
    use crate::utils::error::ReportError;
    use std::sync::Mutex;

    struct StubPipeline {
        phases: Mutex<Vec<&'static str>>,
        fail_transform: bool,
    }

    impl StubPipeline {
        fn new(fail_transform: bool) -> Self {
            Self {
                phases: Mutex::new(Vec::new()),
                fail_transform,
            }
        }

        fn record(&self, phase: &'static str) {
            self.phases.lock().unwrap().push(phase);
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<Vec<Transaction>> {
            self.record("extract");
            Ok(vec![Transaction {
                label: "Janeiro".to_string(),
                date: None,
                day: None,
                client: "ANA".to_string(),
                amount: Some(10.0),
                modality: None,
                kind: None,
                teacher: None,
                location: None,
                active: true,
                loss: false,
                flow: Flow::Revenue,
            }])
        }

        async fn transform(&self, data: Vec<Transaction>) -> Result<TransformResult> {
            self.record("transform");
            if self.fail_transform {
                return Err(ReportError::ProcessingError {
                    message: format!("{} records rejected", data.len()),
                });
            }
            Ok(TransformResult {
                summaries: vec![],
                documents: vec![],
            })
        }

        async fn load(&self, _result: TransformResult) -> Result<String> {
            self.record("load");
            Ok("out".to_string())
        }
    }

    #[test]
    fn test_runs_phases_in_order() {
        let engine = ReportEngine::new(StubPipeline::new(false));
        let output = tokio_test::block_on(engine.run()).unwrap();

        assert_eq!(output, "out");
        assert_eq!(
            *engine.pipeline.phases.lock().unwrap(),
            vec!["extract", "transform", "load"]
        );
    }

    #[test]
    fn test_stops_at_failing_phase() {
        let engine = ReportEngine::new(StubPipeline::new(true));
        let err = tokio_test::block_on(engine.run()).unwrap_err();

        assert!(err.to_string().contains("1 records rejected"));
        assert_eq!(*engine.pipeline.phases.lock().unwrap(), vec!["extract", "transform"]);
    }
}
