//! PairLab Core: bars, streaming indicators, signal rules, the dual-indicator
//! strategy, parameter grids, the simulator and the data layer.
//!
//! This crate contains everything one backtest task needs:
//! - Domain types (bars, signals, orders, parameter sets, tasks)
//! - Causal streaming indicators behind one `Indicator` trait
//! - The indicator registry: names, parameter validation, signal rules
//! - Parameter grids and their lazy Cartesian products
//! - A single-instrument simulator with a minimal broker
//! - Raw CSV ingestion and the processed Parquet store

pub mod data;
pub mod domain;
pub mod engine;
pub mod grid;
pub mod indicators;
pub mod registry;
pub mod strategy;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a worker thread touches is Send, and the
    /// read-only pieces shared between workers are Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Shared read-only across tasks
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Task>();
        require_sync::<domain::Task>();
        require_send::<domain::ParameterSet>();
        require_sync::<domain::ParameterSet>();
        require_send::<registry::IndicatorRegistry>();
        require_sync::<registry::IndicatorRegistry>();
        require_send::<grid::GridConfig>();
        require_sync::<grid::GridConfig>();
        require_send::<engine::SimulationConfig>();
        require_sync::<engine::SimulationConfig>();
        require_send::<data::ProcessedStore>();
        require_sync::<data::ProcessedStore>();

        // Owned by one task, moved onto a worker
        require_send::<strategy::DualIndicatorStrategy>();
        require_send::<strategy::SignalLeg>();
        require_send::<Box<dyn indicators::Indicator>>();
        require_send::<engine::Broker>();

        // Results travel back to the controlling thread
        require_send::<engine::SimulationReport>();
        require_send::<engine::SimulationError>();
        require_send::<registry::FactoryError>();
        require_send::<data::DataError>();
    }

    /// Architecture contract: a strategy sees one bar and a position view,
    /// never the bar history. Indicators are the only state that spans bars.
    #[test]
    fn strategy_trait_sees_only_the_current_bar() {
        fn _check_trait_object_builds(
            strategy: &mut dyn engine::Strategy,
            bar: &domain::Bar,
            position: domain::PositionView,
        ) -> Option<domain::OrderSide> {
            strategy.next(bar, position)
        }
    }

    /// Every registered indicator builds with its defaults and yields a signal leg.
    #[test]
    fn every_registered_indicator_builds_a_leg() {
        let registry = registry::IndicatorRegistry::standard();
        for name in registry.names() {
            let spec = registry.get(name).unwrap();
            let leg = registry.build_leg(name, &spec.defaults());
            assert!(leg.is_ok(), "{name}: {:?}", leg.err());
        }
    }
}
