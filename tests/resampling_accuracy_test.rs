mod test_signals;

use polyphase::analysis::sine_rms_error;
use polyphase::config::ResamplerQuality;
use polyphase::{PolyphaseFilter, Resampler, design_polyphase_filter};

const TONE: f64 = 16.0 / 2048.0;

fn preset(quality: ResamplerQuality) -> PolyphaseFilter {
    design_polyphase_filter(&quality.params()).unwrap()
}

#[test]
fn test_high_quality_sine_accuracy() {
    let filter = preset(ResamplerQuality::High);
    assert_eq!(filter.phase_count(), 513);
    assert_eq!(filter.latency(), 128);

    let error = sine_rms_error(&filter, TONE, 2048, 16);
    assert!(error < 1e-4, "high quality RMS error {:.3e}", error);
}

#[test]
fn test_low_quality_sine_accuracy() {
    let filter = preset(ResamplerQuality::Low);
    assert_eq!(filter.latency(), 8);

    let error = sine_rms_error(&filter, TONE, 4096, 64);
    assert!(error < 1e-3, "low quality RMS error {:.3e}", error);
}

#[test]
fn test_output_tracks_delayed_input() {
    let filter = preset(ResamplerQuality::Low);
    let resampler = Resampler::new(&filter);
    let history = test_signals::sine(TONE, 512);

    for sample_index in [100, 257, 400] {
        for fraction in [0.0f32, 0.25, 0.6, 0.99] {
            let expected = test_signals::sine_at(
                TONE,
                (sample_index - resampler.latency()) as f64 + fraction as f64,
            );
            let actual = resampler.resample(&history, sample_index, fraction) as f64;
            assert!(
                (actual - expected).abs() < 2e-3,
                "sample {} + {}: {} vs {}",
                sample_index,
                fraction,
                actual,
                expected
            );
        }
    }
}

#[test]
fn test_continuous_across_sample_boundary() {
    let filter = preset(ResamplerQuality::Low);
    let history = test_signals::sine(TONE, 256);

    // The extra phase over one window is phase 0 over the next
    for sample_index in 64..128 {
        let before = polyphase::resample(&filter, &history, sample_index, 1.0 - 1.0 / 1024.0);
        let after = polyphase::resample(&filter, &history, sample_index + 1, 0.0);
        assert!(
            (before - after).abs() < 1e-3,
            "jump at sample {}: {} -> {}",
            sample_index,
            before,
            after
        );
    }
}

#[test]
fn test_upsample_aligns_with_input() {
    let filter = preset(ResamplerQuality::Low);
    let input = test_signals::sine(TONE, 256);
    let output = Resampler::new(&filter).upsample(&input, 4);
    assert_eq!(output.len(), 1024);

    // Skip the zero-padded edges
    for n in 32..224 {
        for k in 0..4 {
            let expected = test_signals::sine_at(TONE, n as f64 + k as f64 / 4.0);
            let actual = output[n * 4 + k] as f64;
            assert!(
                (actual - expected).abs() < 2e-3,
                "output {}: {} vs {}",
                n * 4 + k,
                actual,
                expected
            );
        }
    }
}
