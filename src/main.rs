use clap::Parser;
use jenga_stacks::utils::{logger, validation::Validate};
use jenga_stacks::{CliConfig, EtlEngine, LocalStorage, StackPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting jenga-stacks CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = StackPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("Stack build completed successfully");
            println!("✅ Stack scene written to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("Stack build failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
