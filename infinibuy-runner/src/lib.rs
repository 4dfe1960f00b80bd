//! Infinibuy Runner: configuration, ledger import, export, and what-if sweeps.
//!
//! This crate builds on `infinibuy-core` to provide:
//! - TOML configuration with validation
//! - Position import from ledger CSV exports
//! - Plan fingerprinting
//! - Parallel what-if price sweeps
//! - JSON / CSV / Markdown artifacts

pub mod config;
pub mod export;
pub mod fingerprint;
pub mod format;
pub mod ingest;
pub mod sweep;

pub use config::{ConfigError, ExitsConfig, ImportColumns, LadderConfig, PlanConfig, StepConfig};
pub use export::{
    export_exits_csv, export_json, export_ladder_csv, export_sweep_csv, generate_report,
    import_json, load_artifacts, save_artifacts, PlanReport, SCHEMA_VERSION,
};
pub use fingerprint::{plan_id, PlanId};
pub use ingest::{
    import_or_default, import_position, import_position_from_reader, ImportStatus, IngestError,
    PositionImport,
};
pub use sweep::{price_grid, sweep_prices, SweepRow};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PlanConfig>();
        assert_sync::<PlanConfig>();
        assert_send::<ImportColumns>();
        assert_sync::<ImportColumns>();
    }

    #[test]
    fn report_is_send_sync() {
        assert_send::<PlanReport>();
        assert_sync::<PlanReport>();
        assert_send::<PositionImport>();
        assert_sync::<PositionImport>();
    }

    #[test]
    fn sweep_row_is_send_sync() {
        assert_send::<SweepRow>();
        assert_sync::<SweepRow>();
    }
}
