//! End-to-end core pipeline: sample CSV → ingestion → processed store →
//! registry-built indicator pair → simulation.

use chrono::NaiveDate;
use pairlab_core::data::{dataset_hash, ingest_dir, write_sample_csv, ProcessedStore};
use pairlab_core::domain::{Bar, ParameterSet};
use pairlab_core::engine::{run_simulation, SimulationConfig, SimulationReport};
use pairlab_core::registry::IndicatorRegistry;
use pairlab_core::strategy::DualIndicatorStrategy;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn simulate(bars: &[Bar], a: &str, b: &str) -> SimulationReport {
    let registry = IndicatorRegistry::standard();
    let mut strategy = DualIndicatorStrategy::new(
        registry.build_leg(a, &ParameterSet::new()).unwrap(),
        registry.build_leg(b, &ParameterSet::new()).unwrap(),
    );
    run_simulation(bars, &mut strategy, &SimulationConfig::default()).unwrap()
}

#[test]
fn sample_data_flows_through_ingest_store_and_simulation() {
    let raw = tempfile::tempdir().unwrap();
    let processed = tempfile::tempdir().unwrap();
    write_sample_csv(raw.path(), "SAMPLE", start(), 400).unwrap();

    let store = ProcessedStore::new(processed.path());
    let summary = ingest_dir(raw.path(), &store).unwrap();
    assert_eq!(summary.written, vec![("SAMPLE".to_string(), 400)]);
    assert_eq!(store.list_symbols().unwrap(), vec!["SAMPLE"]);

    let bars = store.load("SAMPLE").unwrap();
    assert_eq!(bars.len(), 400);
    assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

    let report = simulate(&bars, "EMA", "RSI");
    assert_eq!(report.bars, 400);
    assert!((report.pnl - (report.final_value - report.initial_cash)).abs() < 1e-9);
    assert!(report.max_drawdown_pct >= 0.0);
}

#[test]
fn simulation_is_deterministic_for_every_pair_with_vwap() {
    let bars = pairlab_core::data::generate_sample_bars("DET", start(), 300);
    let registry = IndicatorRegistry::standard();
    for name in registry.names() {
        let first = simulate(&bars, name, "VWAP");
        let second = simulate(&bars, name, "VWAP");
        assert_eq!(first, second, "{name}/VWAP not deterministic");
    }
}

#[test]
fn reingesting_the_same_file_keeps_the_same_fingerprint() {
    let raw = tempfile::tempdir().unwrap();
    let processed = tempfile::tempdir().unwrap();
    write_sample_csv(raw.path(), "FP", start(), 50).unwrap();
    let store = ProcessedStore::new(processed.path());

    ingest_dir(raw.path(), &store).unwrap();
    let first = dataset_hash(&store.load("FP").unwrap());
    ingest_dir(raw.path(), &store).unwrap();
    let second = dataset_hash(&store.load("FP").unwrap());
    assert_eq!(first, second);
}
