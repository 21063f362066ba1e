use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use polyphase::analysis::{ResponseAnalysis, analyze_filter, sine_rms_error};
use polyphase::filter_file;

#[derive(Parser, Debug)]
#[command(name = "analyze_filter")]
#[command(about = "Report response and resampling accuracy of saved filters", long_about = None)]
struct Args {
    /// Filter JSON files to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Nominal cutoff in original-rate cycles/sample
    #[arg(long, default_value = "0.5")]
    cutoff: f64,

    /// Test tone frequency in original-rate cycles/sample
    #[arg(long, default_value = "0.0078125")]
    tone: f64,

    /// Fractional positions evaluated per input sample
    #[arg(long, default_value = "16")]
    sub_positions: usize,

    /// Input samples resampled for the accuracy measurement
    #[arg(long, default_value = "4096")]
    samples: usize,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct FilterReport {
    filename: String,
    upsample_factor: usize,
    taps_per_phase: usize,
    latency: usize,
    response: ResponseAnalysis,
    sine_rms_error: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut reports = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let filter = filter_file::load(path)
            .with_context(|| format!("Failed to load filter {}", path.display()))?;
        log::info!("Analyzing {}", path.display());

        reports.push(FilterReport {
            filename: path.display().to_string(),
            upsample_factor: filter.upsample_factor(),
            taps_per_phase: filter.taps_per_phase(),
            latency: filter.latency(),
            response: analyze_filter(&filter, args.cutoff),
            sine_rms_error: sine_rms_error(&filter, args.tone, args.samples, args.sub_positions),
        });
    }

    match args.format {
        OutputFormat::Text => print_text(&reports),
        OutputFormat::Json => print_json(&reports)?,
    }

    Ok(())
}

fn print_text(reports: &[FilterReport]) {
    for report in reports {
        println!("=== {} ===", report.filename);
        println!(
            "Phases: {}, taps per phase: {}, latency: {} samples",
            report.upsample_factor, report.taps_per_phase, report.latency
        );
        match report.response.transition_start {
            Some(start) => println!("Transition start (-1 dB): {:.4}", start),
            None => println!("Transition start (-1 dB): none"),
        }
        if let Some(bandwidth) = report.response.transition_bandwidth {
            println!("Transition bandwidth: {:.4}", bandwidth);
        }
        println!("Passband ripple: {:.4} dB", report.response.max_ripple_db);
        println!(
            "Stopband attenuation: {:.1} dB",
            report.response.stopband_attenuation_db
        );
        println!("Sine RMS error: {:.3e}", report.sine_rms_error);
        println!();
    }
}

fn print_json(reports: &[FilterReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    println!("{}", json);
    Ok(())
}
