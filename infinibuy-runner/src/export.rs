//! Reporting and export: JSON, CSV, and Markdown artifacts for an order plan.
//!
//! - **JSON**: full-precision round-trip of a [`PlanReport`] with schema versioning
//! - **CSV**: ladder and exit tiers for spreadsheets, money rounded to cents
//! - **Markdown**: a human-readable daily plan
//!
//! Persisted reports carry a `schema_version`; newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use infinibuy_core::domain::{ExitTier, OrderLine};
use infinibuy_core::OrderPlan;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PlanConfig;
use crate::fingerprint::{plan_id, PlanId};
use crate::format::{dollars, fraction_pct, money, percent};
use crate::ingest::PositionImport;
use crate::sweep::SweepRow;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// A plan together with the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub plan_id: PlanId,
    pub generated_at: NaiveDateTime,
    pub config: PlanConfig,
    pub plan: OrderPlan,
    /// Present when the snapshot came from a ledger import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<PositionImport>,
}

impl PlanReport {
    pub fn new(config: PlanConfig, plan: OrderPlan, import: Option<PositionImport>) -> Result<Self> {
        let plan_id = plan_id(&config, &plan.snapshot).context("failed to fingerprint plan")?;
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            plan_id,
            generated_at: chrono::Local::now().naive_local(),
            config,
            plan,
            import,
        })
    }
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `PlanReport` to pretty JSON.
pub fn export_json(report: &PlanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize PlanReport to JSON")
}

/// Deserialize a `PlanReport` from JSON, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<PlanReport> {
    let report: PlanReport =
        serde_json::from_str(json).context("failed to deserialize PlanReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export ladder lines as CSV.
///
/// Columns: label, drop_pct, price, planned_quantity, quantity, est_cost, note,
/// required_change_pct
pub fn export_ladder_csv(lines: &[OrderLine]) -> Result<String> {
    use infinibuy_core::domain::DropRequirement;

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "label",
        "drop_pct",
        "price",
        "planned_quantity",
        "quantity",
        "est_cost",
        "note",
        "required_change_pct",
    ])?;

    for l in lines {
        let required = match l.requirement {
            Some(DropRequirement::FallBy { pct }) => money(pct),
            Some(DropRequirement::AlreadyBuyable) => "0.00".to_string(),
            None => String::new(),
        };
        wtr.write_record([
            l.label.as_str(),
            &format!("{:.4}", l.drop_pct),
            &money(l.price),
            &l.planned_quantity.to_string(),
            &l.quantity.to_string(),
            &money(l.est_cost),
            &l.note.to_string(),
            &required,
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export exit tiers as CSV.
pub fn export_exits_csv(tiers: &[ExitTier]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "threshold_pct",
        "fraction",
        "target_price",
        "sell_quantity",
        "est_proceeds",
        "est_profit",
    ])?;
    for t in tiers {
        wtr.write_record([
            &money(t.threshold_pct),
            &format!("{:.4}", t.fraction),
            &money(t.target_price),
            &t.sell_quantity.to_string(),
            &money(t.est_proceeds),
            &money(t.est_profit),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export sweep rows as CSV.
pub fn export_sweep_csv(rows: &[SweepRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "price",
        "base_quantity",
        "ladder_quantity",
        "ladder_cost",
        "capped",
        "insufficient",
        "defensive_quantity",
        "aggressive_quantity",
        "aggressive_price",
        "aggressive_capped",
    ])?;
    for r in rows {
        wtr.write_record([
            &money(r.price),
            &r.base_quantity.to_string(),
            &r.ladder_quantity.to_string(),
            &money(r.ladder_cost),
            &r.capped.to_string(),
            &r.insufficient.to_string(),
            &r.defensive_quantity.to_string(),
            &r.aggressive_quantity.to_string(),
            &money(r.aggressive_price),
            &r.aggressive_capped.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one plan.
///
/// Creates `{plan_id_short}_{timestamp}/` under `output_dir` containing
/// `plan.json`, `ladder.csv`, `exits.csv` and `report.md`.
/// Returns the path to the created directory.
pub fn save_artifacts(report: &PlanReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.plan_id.short(),
        report.generated_at.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("plan.json", export_json(report)?),
        ("ladder.csv", export_ladder_csv(&report.plan.ladder)?),
        ("exits.csv", export_exits_csv(&report.plan.exits)?),
        ("report.md", generate_report(report)),
    ];
    for (name, contents) in files {
        let path = run_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    info!(dir = %run_dir.display(), plan_id = %report.plan_id, "artifacts saved");
    Ok(run_dir)
}

/// Load a `PlanReport` from an artifact directory's plan.json.
pub fn load_artifacts(dir: &Path) -> Result<PlanReport> {
    let path = dir.join("plan.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report of the daily plan.
pub fn generate_report(report: &PlanReport) -> String {
    let plan = &report.plan;
    let strategy = &report.config.strategy;
    let snap = &plan.snapshot;
    let mut md = String::with_capacity(2048);

    md.push_str("# Order Plan\n\n");

    md.push_str("## Inputs\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Plan ID | `{}` |\n", report.plan_id.short()));
    md.push_str(&format!("| Generated | {} |\n", report.generated_at.format("%Y-%m-%d %H:%M:%S")));
    md.push_str(&format!("| Total Capital | {} |\n", dollars(strategy.total_capital)));
    md.push_str(&format!("| Split Count | {} |\n", strategy.split_count));
    md.push_str(&format!("| Current Price | {} |\n", dollars(snap.current_price)));
    md.push_str(&format!("| Average Cost | {} |\n", dollars(snap.average_cost)));
    md.push_str(&format!("| Holdings | {} |\n", snap.holdings));
    if let Some(warning) = report.import.as_ref().and_then(|i| i.warning()) {
        md.push_str(&format!("| Import | **{warning}** |\n"));
    }
    md.push('\n');

    let p = &plan.progress;
    md.push_str("## Progress\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Per-Round Budget | {} |\n", dollars(plan.per_round_budget)));
    md.push_str(&format!("| Invested | {} |\n", dollars(p.invested)));
    md.push_str(&format!("| Remaining | {} |\n", dollars(p.remaining_budget)));
    md.push_str(&format!(
        "| Round (T) | {:.2} / {} |\n",
        p.round_index, strategy.split_count
    ));
    md.push_str(&format!("| Burn Rate | {} |\n", percent(p.burn_rate_pct)));
    md.push_str(&format!(
        "| Unrealized P&L | {} ({}) |\n",
        dollars(plan.valuation.unrealized_pnl),
        percent(plan.valuation.return_pct)
    ));
    md.push('\n');

    let a = &plan.aggression;
    md.push_str("## Daily Buys\n\n");
    md.push_str(&format!(
        "Phase: {}, aggressive premium {}{}\n\n",
        a.phase,
        percent(a.aggressive_pct),
        if a.capped { " (safety cap applied)" } else { "" }
    ));
    md.push_str("| Leg | Price | Qty | Est. Cost | |\n");
    md.push_str("| --- | --- | --- | --- | --- |\n");
    for leg in plan.legs.iter() {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            leg.kind,
            dollars(leg.price),
            leg.quantity,
            dollars(leg.est_cost),
            if leg.over_budget { "over budget" } else { "" }
        ));
    }
    md.push('\n');

    md.push_str("## Contingency Ladder\n\n");
    md.push_str(&format!("Base quantity: {}\n\n", plan.base_quantity));
    md.push_str("| Scenario | Price | Qty | Est. Cost | Note |\n");
    md.push_str("| --- | --- | --- | --- | --- |\n");
    for l in &plan.ladder {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            l.label,
            dollars(l.price),
            l.quantity_text(),
            dollars(l.est_cost),
            l.note
        ));
    }
    md.push('\n');

    md.push_str("## Exit Tiers\n\n");
    if snap.holdings == 0 {
        md.push_str("No holdings.\n");
    } else {
        md.push_str("| Gain | Target | Sell | Proceeds | Profit |\n");
        md.push_str("| --- | --- | --- | --- | --- |\n");
        for t in &plan.exits {
            md.push_str(&format!(
                "| +{} ({}) | {} | {} | {} | {} |\n",
                percent(t.threshold_pct),
                fraction_pct(t.fraction),
                dollars(t.target_price),
                t.sell_quantity,
                dollars(t.est_proceeds),
                dollars(t.est_profit)
            ));
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use infinibuy_core::{MarketSnapshot, OrderPlanEngine};

    fn sample_report() -> PlanReport {
        let config = PlanConfig::default();
        let engine = OrderPlanEngine::new(config.to_engine_settings().unwrap());
        let plan = engine.evaluate(&MarketSnapshot::new(50.0, 50.0, 10));
        PlanReport::new(config, plan, None).unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let report = sample_report();
        let json = export_json(&report).unwrap();
        let back = import_json(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let mut report = sample_report();
        report.schema_version = SCHEMA_VERSION + 1;
        let json = export_json(&report).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn ladder_csv_rounds_money() {
        let report = sample_report();
        let csv = export_ladder_csv(&report.plan.ladder).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("label,drop_pct,price"));
        let third = csv.lines().nth(3).unwrap();
        assert!(third.starts_with("-20%,0.2000,40.00,4,2,80.00,CAPPED"), "{third}");
    }

    #[test]
    fn exits_csv_has_one_row_per_tier() {
        let report = sample_report();
        let csv = export_exits_csv(&report.plan.exits).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.contains("15.00,1.0000,57.50,10,575.00,75.00"));
    }

    #[test]
    fn report_mentions_every_section() {
        let md = generate_report(&sample_report());
        for heading in ["## Inputs", "## Progress", "## Daily Buys", "## Contingency Ladder", "## Exit Tiers"] {
            assert!(md.contains(heading), "missing {heading}");
        }
        assert!(md.contains("| -20% | $40.00 | 4 → 2 | $80.00 | CAPPED |"));
        assert!(md.contains("Phase: accumulation, aggressive premium 10.00%"));
    }
}
