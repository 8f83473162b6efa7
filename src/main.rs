use clap::Parser;
use fin_report::core::ConfigProvider;
use fin_report::utils::error::{ErrorSeverity, ReportError};
use fin_report::utils::{logger, validation::Validate};
use fin_report::{CliConfig, LocalStorage, ReportEngine, ReportPipeline, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();
    let verbose = cli.verbose;
    let dry_run = cli.dry_run;
    let log_json = cli.log_json;
    let cli_debug = format!("{:?}", cli);

    let loaded = cli.into_config();
    let log_level = loaded.as_ref().ok().and_then(|config| config.log_level());
    if log_json {
        logger::init_json_logger(verbose, log_level);
    } else {
        logger::init_cli_logger(verbose, log_level);
    }

    tracing::info!("🚀 Starting fin-report");
    if verbose {
        tracing::debug!("CLI config: {}", cli_debug);
    }

    let config = match loaded.and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    display_config_summary(&config);

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let input = LocalStorage::new(config.input_dir());
    let output = LocalStorage::new(config.output_path());
    let pipeline = ReportPipeline::new(input, output, config);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - No reports will be written");
        match pipeline.input_files().await {
            Ok(files) => {
                println!("Would process {} files:", files.len());
                for file in files {
                    println!("  - {}", file);
                }
            }
            Err(e) => exit_with(e),
        }
        return Ok(());
    }

    let engine = ReportEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Reports generated successfully!");
            println!("✅ Reports generated successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📂 Input: {} ({})", config.input_dir(), config.input_extensions().join(", "));
    tracing::info!("📁 Output: {}", config.output_path());
    tracing::info!("🗓️ Grouping: {:?}", config.grouping());
    if let Some(period) = config.period_filter() {
        tracing::info!("🔍 Period filter: {}", period);
    }
    tracing::info!("📄 Formats: {:?}", config.output_formats());
    if let Some(archive) = config.archive() {
        tracing::info!("📦 Archive: {}", archive.filename);
    }
}

fn exit_with(e: ReportError) -> ! {
    tracing::error!(
        "❌ Report generation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
