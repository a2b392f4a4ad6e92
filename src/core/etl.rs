use crate::core::Pipeline;
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

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting stack build");

        let records = self.pipeline.extract().await?;
        tracing::info!("Extracted {} assessment records", records.len());
        self.monitor.log_stats("extract");

        let scene = self.pipeline.transform(records).await?;
        tracing::info!(
            "Laid out {} blocks, {} labels, {} stack centers",
            scene.placements.len(),
            scene.labels.len(),
            scene.centers.len()
        );
        self.monitor.log_stats("transform");

        let output_path = self.pipeline.load(scene).await?;
        tracing::info!("Scene written to: {}", output_path);
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
