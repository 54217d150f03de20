use clap::Parser;
use lazy_image_harvester::{ScrapeOrchestrator, ScrapeReport};
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Missing URL prints usage and exits non-zero
    let args = Args::parse();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Note: rendering requires a WebDriver server (e.g., ChromeDriver).");
    println!("Set WEBDRIVER_URL or --webdriver-url if not using {}", config.webdriver_url);

    let destination = config.destination_dir.clone();
    let start_time = std::time::Instant::now();

    let report = match ScrapeOrchestrator::with_webdriver(config)
        .scrape(&args.url)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            ::log::error!("Scrape failed: {}", e);
            eprintln!("Scrape failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    print_report(&report);
    ::log::info!(
        "Done in {:.2} seconds. Images saved in {}",
        start_time.elapsed().as_secs_f64(),
        destination.display()
    );
    ExitCode::SUCCESS
}

fn print_report(report: &ScrapeReport) {
    let saved = report.saved().count();
    let failed = report.failures().count();

    println!("Page:       {}", report.page_url);
    println!("Discovered: {}", report.discovered);
    println!("Saved:      {}", saved);
    println!("Failed:     {}", failed);

    for download in report.failures() {
        println!("  {} - {}", download.url, download.outcome);
    }
}
