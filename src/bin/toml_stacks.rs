use clap::Parser;
use jenga_stacks::config::toml_config::TomlConfig;
use jenga_stacks::domain::ports::ConfigProvider;
use jenga_stacks::utils::{logger, validation::Validate};
use jenga_stacks::{EtlEngine, LocalStorage, StackPipeline};

#[derive(Parser)]
#[command(name = "toml-stacks")]
#[command(about = "Stack scene builder driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "stacks-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting TOML-based stack build");
    tracing::info!("Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        "Pipeline '{}' -> {}",
        config.pipeline.name,
        config.output_path()
    );

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
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
