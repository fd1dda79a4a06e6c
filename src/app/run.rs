use crate::cli::app_config::Cli;
use crate::http::handler::{traced_request, TracedResponse};
use crate::response::report::StatReport;
use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

pub async fn main_with_error() -> Result<StatReport, anyhow::Error> {
    let cli: Cli = Cli::parse();

    do_request(cli).await
}

fn init_logging(verbosity: u8) -> Result<(), anyhow::Error> {
    let log_level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy()
        .add_directive("hyper=off".parse()?);
    let subscriber = tracing_subscriber::fmt()
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(())
}

async fn do_request(cli: Cli) -> Result<StatReport, anyhow::Error> {
    init_logging(cli.verbosity)?;

    let response = traced_request(&cli).await?;
    if cli.verbosity >= 1 {
        debug!("< {:?} {}", response.parts.version, response.parts.status);
        for (key, value) in response.parts.headers.iter() {
            debug!("< {}: {}", key, value.to_str()?);
        }
        debug!("<");
    }
    save_body(&cli, &response)?;

    let report = StatReport::new(&cli.url, &response);
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{:?} {}", response.parts.version, response.parts.status);
        println!("{}", report);
    }
    Ok(report)
}

fn save_body(cli: &Cli, response: &TracedResponse) -> Result<(), anyhow::Error> {
    match cli.file_path_option.as_ref() {
        Some(file_path) => {
            std::fs::write(file_path, &response.body)
                .context(format!("Failed to write body to file: {}", file_path))?;
            info!("Body stored in: {}", file_path);
        }
        None => debug!("Discarded {} body bytes", response.body.len()),
    }
    Ok(())
}
