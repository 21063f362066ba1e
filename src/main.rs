use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use polyphase::analysis::{analyze_response, db, magnitude_at};
use polyphase::config::{FilterParams, ResamplerQuality, WindowType};
use polyphase::design::{decompose, synthesize};
use polyphase::filter_file;

#[derive(Parser, Debug)]
#[command(name = "polyphase")]
#[command(about = "Design a polyphase fractional-resampling FIR filter", long_about = None)]
struct Args {
    /// TOML file with a [filter] table
    #[arg(short = 'c', long, conflicts_with = "quality")]
    config: Option<PathBuf>,

    /// Start from an engine preset: low, high
    #[arg(short = 'q', long, default_value = "high")]
    quality: ResamplerQuality,

    /// Number of phases (power of two)
    #[arg(short = 'u', long)]
    upsample_factor: Option<usize>,

    /// Taps per phase (multiple of 8)
    #[arg(short = 't', long)]
    taps_per_phase: Option<usize>,

    /// Passband edge in original-rate cycles/sample
    #[arg(long)]
    cutoff: Option<f64>,

    /// Window: rectangular, hann, hamming, blackman, kaiser
    #[arg(short = 'w', long)]
    window: Option<WindowType>,

    /// Kaiser shape parameter
    #[arg(long)]
    kaiser_beta: Option<f64>,

    /// Notch frequency in original-rate cycles/sample (repeatable)
    #[arg(long = "notch")]
    notches: Vec<f64>,

    /// Write the filter as JSON to this file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn filter_params(&self) -> Result<FilterParams> {
        let mut params = match &self.config {
            Some(path) => FilterParams::from_toml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => self.quality.params(),
        };

        if let Some(u) = self.upsample_factor {
            params.upsample_factor = u;
        }
        if let Some(t) = self.taps_per_phase {
            params.taps_per_phase = t;
        }
        if let Some(cutoff) = self.cutoff {
            params.cutoff_frequency = cutoff;
        }
        if let Some(window) = self.window {
            params.window_type = window;
        }
        if let Some(beta) = self.kaiser_beta {
            params.kaiser_beta = beta;
        }
        if !self.notches.is_empty() {
            params.notch_frequencies = self.notches.clone();
        }
        Ok(params)
    }
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

    let params = args.filter_params()?;
    params.validate().context("Invalid filter parameters")?;

    println!("=== Polyphase Filter Designer ===");
    println!(
        "Phases: {}, taps per phase: {}, order: {}",
        params.upsample_factor,
        params.taps_per_phase,
        params.filter_order()
    );
    println!(
        "Window: {} (beta {}), cutoff: {}",
        params.window_type, params.kaiser_beta, params.cutoff_frequency
    );
    if !params.notch_frequencies.is_empty() {
        println!("Notches: {:?}", params.notch_frequencies);
    }

    let coefficients = synthesize(&params).context("Filter synthesis failed")?;
    let filter = decompose(&coefficients, &params).context("Polyphase decomposition failed")?;
    println!("Latency: {} samples", filter.latency());

    let analysis = analyze_response(
        &coefficients,
        params.cutoff_frequency,
        params.upsample_factor,
    );
    match analysis.transition_start {
        Some(start) => println!("Transition start (-1 dB): {:.4}", start),
        None => println!("Transition start (-1 dB): none"),
    }
    println!("Passband ripple: {:.4} dB", analysis.max_ripple_db);
    println!(
        "Stopband above {}: {:.1} dB",
        params.cutoff_frequency, analysis.stopband_attenuation_db
    );

    let gain = params.upsample_factor as f64;
    for &notch in &params.notch_frequencies {
        println!(
            "Response at notch {}: {:.1} dB",
            notch,
            db(magnitude_at(&coefficients, notch, params.upsample_factor) / gain)
        );
    }

    if let Some(path) = &args.output {
        filter_file::save(&filter, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
