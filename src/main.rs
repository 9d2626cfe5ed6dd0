//! Corpus Engine CLI
//!
//! Command-line interface for running corpus simulations

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use corpus_engine::allocation::PERIODS_PER_YEAR;
use corpus_engine::annuity::{required_corpus, GoalSizing};
use corpus_engine::inputs::load_goals;
use corpus_engine::projection::{LedgerSummary, PeriodRow, YearRow};
use corpus_engine::report::{write_period_csv, write_yearly_csv};
use corpus_engine::{
    simulate_accumulation, simulate_decumulation, solve_required_contribution, AccumulationConfig,
    ConfigError, DecumulationConfig, SimulationConfig,
};

#[derive(Parser)]
#[command(
    name = "corpus",
    version,
    about = "Deterministic corpus simulation for financial planning"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Project contributions forward from a JSON accumulation config
    Accumulate {
        config: PathBuf,
        /// Replace the config's goals with goals read from CSV
        #[arg(long)]
        goals: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Draw a corpus down from a JSON decumulation config
    Decumulate {
        config: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Level start-of-period payment needed to reach a target value
    Solve {
        #[arg(long)]
        target: f64,
        /// Annual rate, compounded monthly
        #[arg(long)]
        annual_rate: f64,
        #[arg(long)]
        years: u32,
    },
    /// Monthly saving needed for a goal priced in today's money
    Goal {
        #[arg(long)]
        current_cost: f64,
        #[arg(long)]
        years: u32,
        #[arg(long, default_value_t = 0.06)]
        inflation: f64,
        #[arg(long, default_value_t = 0.0)]
        existing_savings: f64,
        #[arg(long)]
        annual_return: f64,
    },
    /// Corpus needed to fund monthly withdrawals for a number of years
    CorpusNeeded {
        #[arg(long)]
        monthly_withdrawal: f64,
        #[arg(long)]
        years: u32,
        #[arg(long)]
        annual_rate: f64,
        #[arg(long, default_value_t = 0.0)]
        inflation: f64,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Write the period ledger to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write the yearly ledger to this CSV file
    #[arg(long)]
    yearly_csv: Option<PathBuf>,
    /// Decimal places at the reporting boundary
    #[arg(long, default_value_t = 2)]
    decimals: u32,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Accumulate { config, goals, output } => {
            run_accumulate(&config, goals.as_deref(), &output)
        }
        Command::Decumulate { config, output } => run_decumulate(&config, &output),
        Command::Solve { target, annual_rate, years } => {
            let months = years.checked_mul(PERIODS_PER_YEAR).ok_or_else(|| {
                ConfigError::invalid("years", "too many months to count")
            })?;
            let monthly_rate = annual_rate / PERIODS_PER_YEAR as f64;
            let payment = solve_required_contribution(target, monthly_rate, months)?;
            println!("Monthly contribution needed: {:.2}", payment);
            Ok(())
        }
        Command::Goal { current_cost, years, inflation, existing_savings, annual_return } => {
            let plan = GoalSizing {
                current_cost,
                years_to_goal: years,
                inflation_rate: inflation,
                existing_savings,
                expected_annual_return: annual_return,
            }
            .plan()?;
            println!("Future cost:               {:.2}", plan.future_cost);
            println!("Existing savings grown to: {:.2}", plan.future_value_of_savings);
            println!("Shortfall:                 {:.2}", plan.shortfall);
            println!("Monthly contribution:      {:.2}", plan.monthly_contribution);
            Ok(())
        }
        Command::CorpusNeeded { monthly_withdrawal, years, annual_rate, inflation } => {
            let corpus = required_corpus(monthly_withdrawal, years, annual_rate, inflation)?;
            println!("Corpus needed: {:.2}", corpus);
            Ok(())
        }
    }
}

fn read_config(path: &Path) -> Result<SimulationConfig> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("parsing {}", path.display()))
}

fn run_accumulate(path: &Path, goals: Option<&Path>, output: &OutputArgs) -> Result<()> {
    let mut config: AccumulationConfig = match read_config(path)? {
        SimulationConfig::Accumulation(config) => config,
        SimulationConfig::Decumulation(_) => bail!("{} is a decumulation config", path.display()),
    };
    if let Some(goals_path) = goals {
        config.goals = load_goals(goals_path)
            .with_context(|| format!("loading goals from {}", goals_path.display()))?;
    }

    let result = simulate_accumulation(&config)?;

    println!("Accumulation: ages {} to {}", config.start_age, config.end_age);
    print_years(&result.yearly_ledger, output.decimals);
    print_summary(&result.ledger);
    println!("  Terminal balance:            {:.2}", result.terminal_balance);
    if result.future_goal_cost > 0.0 {
        println!("  Goals due after horizon:     {:.2}", result.future_goal_cost);
        println!("  Balance net of future goals: {:.2}", result.balance_net_of_future_goals);
    }

    write_outputs(output, &result.ledger, &result.yearly_ledger)
}

fn run_decumulate(path: &Path, output: &OutputArgs) -> Result<()> {
    let config: DecumulationConfig = match read_config(path)? {
        SimulationConfig::Decumulation(config) => config,
        SimulationConfig::Accumulation(_) => bail!("{} is an accumulation config", path.display()),
    };

    let result = simulate_decumulation(&config)?;

    println!("Decumulation: {:?}", config.termination);
    print_years(&result.yearly_ledger, output.decimals);
    print_summary(&result.ledger);
    let (years, months) = result.duration();
    println!("  Outcome: {:?} after {} years {} months", result.outcome.state, years, months);
    println!("  Final balance: {:.2}", result.outcome.final_balance);

    write_outputs(output, &result.ledger, &result.yearly_ledger)
}

fn print_years(years: &[YearRow], decimals: u32) {
    println!(
        "{:>5} {:>7} {:>16} {:>16} {:>18}",
        "Year", "Periods", "Amount", "Return", "End Balance"
    );
    println!("{}", "-".repeat(66));
    for row in years.iter().map(|r| r.rounded(decimals)) {
        println!(
            "{:>5} {:>7} {:>16.*} {:>16.*} {:>18.*}",
            row.year,
            row.periods,
            decimals as usize,
            row.total_amount,
            decimals as usize,
            row.total_return,
            decimals as usize,
            row.ending_balance,
        );
    }
}

fn print_summary(ledger: &[PeriodRow]) {
    let summary = LedgerSummary::from_rows(ledger);
    println!("\nSummary:");
    println!("  Total periods: {}", summary.total_periods);
    println!("  Total amount:  {:.2}", summary.total_amount);
    println!("  Total return:  {:.2}", summary.total_return);
}

fn write_outputs(output: &OutputArgs, ledger: &[PeriodRow], yearly: &[YearRow]) -> Result<()> {
    if let Some(path) = &output.csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_period_csv(file, ledger, output.decimals)?;
        println!("\nPeriod ledger written to: {}", path.display());
    }
    if let Some(path) = &output.yearly_csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_yearly_csv(file, yearly, output.decimals)?;
        println!("Yearly ledger written to: {}", path.display());
    }
    Ok(())
}
