use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use stock_scope::config::load_config;
use stock_scope::pipeline;
use stock_scope::presenter::{ChartSurface, SvgCharts, console, json};
use tracing::{error, info, warn};

/// Price history analysis over a configured set of instruments.
#[derive(Debug, Parser)]
#[command(name = "stock-scope", version)]
struct Cli {
    /// Run configuration (JSON).
    #[arg(default_value = "config.json")]
    config: PathBuf,
}

fn main() -> ExitCode {
    // Initialize logging; stdout is reserved for the report
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    // Load configuration from file
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Instruments to process: {}", config.instruments.len());

    let charts = SvgCharts::new(&config.output_dir);
    let surface: Option<&dyn ChartSurface> = if config.render_charts {
        Some(&charts)
    } else {
        None
    };

    let report = pipeline::run(&config, surface);
    print!("{}", console::render_report(&report));

    if let Some(path) = &config.report_path {
        if let Err(e) = json::write_report(&report, path) {
            warn!("Report write failed: {}", e);
        }
    }

    let failures = report.failures();
    if failures.is_empty() {
        info!("✅ Run finished cleanly");
    } else {
        info!("Run finished with {} failure(s)", failures.len());
    }
    ExitCode::SUCCESS
}
