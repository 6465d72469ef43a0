use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting ETL process...");
        if self.monitor.is_enabled() {
            self.monitor.log_stats("start");
        }

        // Extract
        tracing::info!("📥 Extracting backup...");
        let backup = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", backup.record_count());
        self.monitor.log_stats("extract");

        // Transform
        tracing::info!("🔄 Flattening records...");
        let result = self.pipeline.transform(backup).await?;
        let rows: usize = result.tables.iter().map(|t| t.rows.len()).sum();
        tracing::info!(
            "Flattened {} rows into {} tables",
            rows,
            result.tables.len()
        );
        self.monitor.log_stats("transform");

        // Load
        tracing::info!("💾 Writing output...");
        let summary = self.pipeline.load(result).await?;
        self.monitor.log_stats("load");

        tracing::info!(
            "Completed {} in {:.2} seconds",
            summary.source,
            self.monitor.elapsed().as_secs_f64()
        );
        self.monitor.log_final_stats();

        Ok(summary)
    }
}
