use crate::domain::model::FilterSummary;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::ScoutMonitor;

pub struct ScoutEngine<P: Pipeline> {
    pipeline: P,
    monitor: ScoutMonitor,
}

impl<P: Pipeline> ScoutEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: ScoutMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: ScoutMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        println!("Starting OLX scout run...");

        // Discovery
        println!("Discovering listings...");
        let listings = self.pipeline.extract().await?;
        println!("Discovered {} listings", listings.len());
        self.monitor.log_phase("Discovery");

        // Filtering
        println!("Filtering listings...");
        let outcome = self.pipeline.transform(listings).await?;
        print_summary(&outcome.summary);
        self.monitor.log_phase("Filtering");

        // Export
        println!("Saving results...");
        let output_path = self.pipeline.load(outcome).await?;
        println!("Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

fn print_summary(summary: &FilterSummary) {
    println!();
    println!("📊 Filtering Summary:");
    println!("   Total listings: {}", summary.total);
    println!("   Excluded: {}", summary.excluded_total());
    for (reason, count) in &summary.excluded_by_reason {
        println!("     {}: {}", reason, count);
    }
    if summary.fetch_failed > 0 {
        println!("   Kept on fetch failure (fail-open): {}", summary.fetch_failed);
    }
    println!("   Kept (with defects): {}", summary.kept);
}
