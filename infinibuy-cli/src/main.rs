//! Infinibuy CLI: daily order plans for the split-buying strategy.
//!
//! Commands:
//! - `plan`: evaluate the plan for one snapshot and print or save it
//! - `sweep`: evaluate the plan over a grid of hypothetical prices
//! - `import`: show what a ledger CSV import extracts
//! - `init-config`: write the default configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use infinibuy_core::domain::LineNote;
use infinibuy_core::{MarketSnapshot, OrderPlanEngine};
use infinibuy_runner::format::{dollars, fraction_pct, percent};
use infinibuy_runner::{
    export_json, export_sweep_csv, generate_report, import_or_default, price_grid, save_artifacts,
    sweep_prices, LadderConfig, PlanConfig, PlanReport, PositionImport, StepConfig, SweepRow,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "infinibuy",
    version,
    about = "Infinibuy: split-buying order planner"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build today's order plan.
    Plan {
        #[command(flatten)]
        inputs: PlanInputs,

        /// Current market price.
        #[arg(long)]
        price: f64,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Save plan.json, ladder.csv, exits.csv and report.md under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Evaluate the plan over a grid of hypothetical prices.
    Sweep {
        #[command(flatten)]
        inputs: PlanInputs,

        /// Lowest price in the grid.
        #[arg(long)]
        from: f64,

        /// Highest price in the grid (inclusive).
        #[arg(long)]
        to: f64,

        /// Grid increment.
        #[arg(long, default_value_t = 1.0)]
        step: f64,

        /// Print CSV instead of a table.
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
    /// Show the average cost and holdings a ledger CSV yields.
    Import {
        /// Ledger CSV file.
        path: PathBuf,

        /// Path to a TOML config file (for column names).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration as TOML.
    InitConfig {
        /// Destination file.
        #[arg(long, default_value = "infinibuy.toml")]
        output: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

/// Inputs shared by `plan` and `sweep`.
#[derive(clap::Args)]
struct PlanInputs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override total capital.
    #[arg(long)]
    capital: Option<f64>,

    /// Override split count.
    #[arg(long)]
    splits: Option<u32>,

    /// Size the drop ladder with the panic formula at this strength (1-3).
    #[arg(long)]
    panic_strength: Option<u8>,

    /// Ledger CSV to import average cost and holdings from.
    #[arg(long)]
    import: Option<PathBuf>,

    /// Average cost (overrides the import).
    #[arg(long)]
    avg: Option<f64>,

    /// Holdings (overrides the import).
    #[arg(long)]
    holdings: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Markdown,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Plan {
            inputs,
            price,
            format,
            output_dir,
        } => run_plan(&inputs, price, format, output_dir.as_deref()),
        Commands::Sweep {
            inputs,
            from,
            to,
            step,
            csv,
        } => run_sweep(&inputs, from, to, step, csv),
        Commands::Import { path, config } => run_import(&path, config.as_deref()),
        Commands::InitConfig { output, force } => run_init_config(&output, force),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PlanConfig> {
    match path {
        Some(path) => PlanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PlanConfig::default()),
    }
}

/// Config with CLI overrides applied, plus the position it should be evaluated for.
fn resolve_inputs(
    inputs: &PlanInputs,
    price: f64,
) -> Result<(PlanConfig, MarketSnapshot, Option<PositionImport>)> {
    let mut config = load_config(inputs.config.as_deref())?;
    if let Some(capital) = inputs.capital {
        config.strategy.total_capital = capital;
    }
    if let Some(splits) = inputs.splits {
        config.strategy.split_count = splits;
    }
    if let Some(strength) = inputs.panic_strength {
        apply_panic_strength(&mut config, strength);
    }
    config.validate().context("invalid configuration")?;

    let import = inputs
        .import
        .as_deref()
        .map(|path| import_or_default(path, &config.import));
    if let Some(warning) = import.as_ref().and_then(PositionImport::warning) {
        eprintln!("WARNING: {warning}");
    }

    let average_cost = inputs
        .avg
        .or(import.as_ref().map(|i| i.average_cost))
        .unwrap_or(0.0);
    let holdings = inputs
        .holdings
        .or(import.as_ref().map(|i| i.holdings))
        .unwrap_or(0);

    if !price.is_finite() {
        bail!("price must be a finite number");
    }
    let snapshot = MarketSnapshot::new(price, average_cost, holdings);
    debug!(?snapshot, "inputs resolved");
    Ok((config, snapshot, import))
}

/// Size the drop ladder with the panic formula at `strength`.
///
/// A target-quantity ladder has no step function, so the flag is reported and
/// otherwise ignored there.
fn apply_panic_strength(config: &mut PlanConfig, strength: u8) {
    config.strategy.panic_strength = Some(strength);
    match &mut config.ladder {
        LadderConfig::Drops { step, .. } => {
            *step = StepConfig::Panic {
                strength: Some(strength),
            };
        }
        LadderConfig::Targets { .. } => {
            warn!("--panic-strength has no effect on a TARGETS ladder");
            eprintln!("WARNING: --panic-strength ignored: the ladder uses target quantities");
        }
    }
}

fn run_plan(
    inputs: &PlanInputs,
    price: f64,
    format: OutputFormat,
    output_dir: Option<&Path>,
) -> Result<()> {
    let (config, snapshot, import) = resolve_inputs(inputs, price)?;
    let engine = OrderPlanEngine::new(config.to_engine_settings()?);
    let plan = engine.evaluate(&snapshot);
    let report = PlanReport::new(config, plan, import)?;

    match format {
        OutputFormat::Table => print_plan(&report),
        OutputFormat::Json => println!("{}", export_json(&report)?),
        OutputFormat::Markdown => print!("{}", generate_report(&report)),
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, dir)?;
        info!(dir = %run_dir.display(), "plan saved");
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_sweep(inputs: &PlanInputs, from: f64, to: f64, step: f64, csv: bool) -> Result<()> {
    let prices = price_grid(from, to, step);
    if prices.is_empty() {
        bail!("empty price grid: need step > 0 and --to >= --from");
    }
    let (config, snapshot, _) = resolve_inputs(inputs, prices[0])?;
    let engine = OrderPlanEngine::new(config.to_engine_settings()?);
    let rows = sweep_prices(&engine, &snapshot, &prices);
    info!(points = rows.len(), "sweep complete");

    if csv {
        print!("{}", export_sweep_csv(&rows)?);
    } else {
        print_sweep(&rows);
    }
    Ok(())
}

fn run_import(path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let import = import_or_default(path, &config.import);
    println!("{}", serde_json::to_string_pretty(&import)?);
    if let Some(warning) = import.warning() {
        bail!("import of {} incomplete: {warning}", path.display());
    }
    Ok(())
}

fn run_init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", output.display());
    }
    let toml = PlanConfig::default().to_toml_string()?;
    std::fs::write(output, toml).with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote default config to {}", output.display());
    Ok(())
}

fn print_plan(report: &PlanReport) {
    let plan = &report.plan;
    let strategy = &report.config.strategy;
    let snap = &plan.snapshot;
    let p = &plan.progress;

    println!();
    println!("=== Order Plan {} ===", report.plan_id.short());
    println!("Capital:        {} / {} splits", dollars(strategy.total_capital), strategy.split_count);
    println!("Round Budget:   {}", dollars(plan.per_round_budget));
    println!("Price:          {}", dollars(snap.current_price));
    println!("Average Cost:   {}", dollars(snap.average_cost));
    println!("Holdings:       {}", snap.holdings);
    println!();
    println!("--- Progress ---");
    println!("Invested:       {}", dollars(p.invested));
    println!("Remaining:      {}", dollars(p.remaining_budget));
    println!("Round (T):      {:.2} / {}", p.round_index, strategy.split_count);
    println!("Burn Rate:      {}", percent(p.burn_rate_pct));
    println!(
        "Unrealized:     {} ({})",
        dollars(plan.valuation.unrealized_pnl),
        percent(plan.valuation.return_pct)
    );
    println!();

    let a = &plan.aggression;
    println!("--- Daily Buys ({}, premium {}) ---", a.phase, percent(a.aggressive_pct));
    println!("{:<12} {:>10} {:>6} {:>10}", "Leg", "Price", "Qty", "Cost");
    println!("{}", "-".repeat(41));
    for leg in plan.legs.iter() {
        let flag = if leg.over_budget { "  over budget" } else { "" };
        println!(
            "{:<12} {:>10} {:>6} {:>10}{flag}",
            leg.kind.to_string(),
            dollars(leg.price),
            leg.quantity,
            dollars(leg.est_cost)
        );
    }
    if a.capped {
        println!("(aggressive price held to the safety cap)");
    }
    println!();

    println!("--- Contingency Ladder (base {}) ---", plan.base_quantity);
    println!("{:<12} {:>10} {:>8} {:>10}  Note", "Scenario", "Price", "Qty", "Cost");
    println!("{}", "-".repeat(56));
    for l in &plan.ladder {
        println!(
            "{:<12} {:>10} {:>8} {:>10}  {}",
            l.label,
            dollars(l.price),
            l.quantity_text(),
            dollars(l.est_cost),
            l.note
        );
    }
    let capped = plan.count_notes(LineNote::Capped);
    if capped > 0 {
        println!("{capped} line(s) reduced to fit the round budget");
    }
    println!();

    println!("--- Exit Tiers ---");
    if snap.holdings == 0 {
        println!("No holdings.");
    } else {
        println!("{:<14} {:>10} {:>6} {:>12} {:>10}", "Gain", "Target", "Sell", "Proceeds", "Profit");
        println!("{}", "-".repeat(56));
        for t in &plan.exits {
            println!(
                "{:<14} {:>10} {:>6} {:>12} {:>10}",
                format!("+{} ({})", percent(t.threshold_pct), fraction_pct(t.fraction)),
                dollars(t.target_price),
                t.sell_quantity,
                dollars(t.est_proceeds),
                dollars(t.est_profit)
            );
        }
    }
    println!();
}

fn print_sweep(rows: &[SweepRow]) {
    println!(
        "{:>10} {:>6} {:>8} {:>10} {:>7} {:>6} {:>10}",
        "Price", "Base", "Ladder", "Cost", "Capped", "Insuf", "Aggr."
    );
    println!("{}", "-".repeat(63));
    for r in rows {
        println!(
            "{:>10} {:>6} {:>8} {:>10} {:>7} {:>6} {:>10}",
            dollars(r.price),
            r.base_quantity,
            r.ladder_quantity,
            dollars(r.ladder_cost),
            r.capped,
            r.insufficient,
            dollars(r.aggressive_price)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plan_flags_parse() {
        let cli = Cli::try_parse_from([
            "infinibuy", "-vv", "plan", "--price", "50", "--avg", "48", "--holdings", "10",
            "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Plan { inputs, price, format, .. } => {
                assert_eq!(price, 50.0);
                assert_eq!(inputs.avg, Some(48.0));
                assert_eq!(inputs.holdings, Some(10));
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn overrides_apply_to_config_and_snapshot() {
        let inputs = PlanInputs {
            config: None,
            capital: Some(8000.0),
            splits: Some(20),
            panic_strength: None,
            import: None,
            avg: Some(45.0),
            holdings: Some(4),
        };
        let (config, snapshot, import) = resolve_inputs(&inputs, 50.0).unwrap();
        assert_eq!(config.strategy.total_capital, 8000.0);
        assert_eq!(config.strategy.split_count, 20);
        assert_eq!(snapshot, MarketSnapshot::new(50.0, 45.0, 4));
        assert!(import.is_none());
    }

    #[test]
    fn panic_strength_flag_switches_drop_ladder_to_panic_step() {
        let inputs = PlanInputs {
            config: None,
            capital: None,
            splits: None,
            panic_strength: Some(3),
            import: None,
            avg: None,
            holdings: None,
        };
        let (config, _, _) = resolve_inputs(&inputs, 50.0).unwrap();
        assert_eq!(config.strategy.panic_strength, Some(3));
        assert!(matches!(
            config.ladder,
            LadderConfig::Drops {
                step: StepConfig::Panic { strength: Some(3) },
                ..
            }
        ));

        // $100 round, $10 price: base 10, -20% adds floor(0.2 / 0.1) * 3 = 6
        let engine = OrderPlanEngine::new(config.to_engine_settings().unwrap());
        let plan = engine.evaluate(&MarketSnapshot::flat(10.0));
        assert_eq!(plan.ladder[2].planned_quantity, 16);
    }

    #[test]
    fn panic_strength_leaves_target_ladder_alone() {
        let mut config = PlanConfig {
            ladder: LadderConfig::Targets { quantities: vec![2, 4] },
            ..PlanConfig::default()
        };
        apply_panic_strength(&mut config, 2);
        assert_eq!(config.ladder, LadderConfig::Targets { quantities: vec![2, 4] });
    }

    #[test]
    fn import_with_missing_file_is_an_error() {
        let err = run_import(Path::new("/nonexistent/ledger.csv"), None).unwrap_err();
        assert!(err.to_string().contains("incomplete"));
    }

    #[test]
    fn zero_splits_override_is_rejected() {
        let inputs = PlanInputs {
            config: None,
            capital: None,
            splits: Some(0),
            panic_strength: None,
            import: None,
            avg: None,
            holdings: None,
        };
        assert!(resolve_inputs(&inputs, 50.0).is_err());
    }
}
