use polyphase::config::{FilterParams, WindowType};
use polyphase::filter_file::{load, save};
use polyphase::{ResamplerError, design_polyphase_filter};
use std::fs;

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filter.json");

    let params = FilterParams::new(16, 16, 0.45, WindowType::Kaiser).with_kaiser_beta(8.0);
    let filter = design_polyphase_filter(&params).unwrap();
    save(&filter, &path).unwrap();

    let loaded = load(&path).unwrap();
    assert_eq!(loaded, filter);
    assert_eq!(loaded.latency(), 8);
    for (a, b) in loaded.phases().zip(filter.phases()) {
        assert_eq!(a, b);
    }
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, ResamplerError::Io(_)));
}

#[test]
fn test_load_rejects_ragged_phases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ragged.json");
    fs::write(
        &path,
        r#"{"upsample_factor":1,"taps_per_phase":8,"latency":4,"phases":[[0,0,0,0,0,0,0,1],[0,0,0]]}"#,
    )
    .unwrap();

    let err = load(&path).unwrap_err();
    assert!(matches!(err, ResamplerError::Serialization(_)));
}

#[test]
fn test_load_hand_written_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("identity.json");
    fs::write(
        &path,
        r#"{"upsample_factor":1,"taps_per_phase":8,"latency":4,
            "phases":[[0,0,0,1,0,0,0,0],[0,0,0,0,1,0,0,0]]}"#,
    )
    .unwrap();

    let filter = load(&path).unwrap();
    assert_eq!(filter.phase_count(), 2);
    assert_eq!(filter.phase(1)[4], 1.0);
}

#[test]
fn test_load_rejects_non_power_of_two_phases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("three.json");
    let phase = "[0,0,0,0,0,0,0,0]";
    fs::write(
        &path,
        format!(
            r#"{{"upsample_factor":3,"taps_per_phase":8,"latency":4,"phases":[{p},{p},{p},{p}]}}"#,
            p = phase
        ),
    )
    .unwrap();

    let err = load(&path).unwrap_err();
    assert!(matches!(err, ResamplerError::Serialization(_)));
    assert!(err.to_string().contains("unsupported filter geometry"));
}
