//! Simulation configuration, validation and builders

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::allocation::{BucketBalances, BucketRates, GlidePath, PERIODS_PER_YEAR};
use crate::error::{ensure_finite, ensure_rate, ConfigError};
use crate::inputs::{FinancialInputsProvider, GoalObligation};

/// Default bound on decumulation length (100 years of months)
pub const DEFAULT_SAFETY_CAP: u32 = 1200;

/// Longest accumulation run accepted, in monthly periods
pub const MAX_ACCUMULATION_PERIODS: u32 = DEFAULT_SAFETY_CAP;

/// Inputs for an accumulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationConfig {
    pub start_age: u32,

    /// Last simulated age (inclusive)
    pub end_age: u32,

    #[serde(default)]
    pub starting_balances: BucketBalances,

    /// Net savings in the first year
    pub annual_net_savings: f64,

    /// Growth of the savings amount, applied from year 2
    #[serde(default)]
    pub savings_growth_rate: f64,

    pub rates: BucketRates,

    #[serde(default)]
    pub glide_path: GlidePath,

    #[serde(default)]
    pub goals: Vec<GoalObligation>,
}

impl AccumulationConfig {
    /// Number of simulated years; zero when `end_age < start_age`
    pub fn years(&self) -> u32 {
        self.end_age
            .checked_sub(self.start_age)
            .map_or(0, |span| span.saturating_add(1))
    }

    /// Monthly periods the run will produce, if the count fits in a `u32`
    pub fn period_count(&self) -> Option<u32> {
        self.years().checked_mul(PERIODS_PER_YEAR)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.period_count() {
            Some(periods) if periods <= MAX_ACCUMULATION_PERIODS => {}
            _ => {
                return Err(ConfigError::invalid(
                    "end_age",
                    format!(
                        "span from age {} to {} exceeds {} periods",
                        self.start_age, self.end_age, MAX_ACCUMULATION_PERIODS
                    ),
                ))
            }
        }
        self.starting_balances.validate("starting_balances")?;
        ensure_finite("annual_net_savings", self.annual_net_savings)?;
        ensure_rate("savings_growth_rate", self.savings_growth_rate)?;
        self.rates.validate("rates")?;
        self.glide_path.validate()?;
        for (index, goal) in self.goals.iter().enumerate() {
            goal.validate(index)?;
        }
        Ok(())
    }

    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    fn hash_into<H: Hasher>(&self, state: &mut H) {
        "accumulation".hash(state);
        self.start_age.hash(state);
        self.end_age.hash(state);
        hash_f64(self.starting_balances.equity, state);
        hash_f64(self.starting_balances.debt, state);
        hash_f64(self.annual_net_savings, state);
        hash_f64(self.savings_growth_rate, state);
        hash_f64(self.rates.equity, state);
        hash_f64(self.rates.debt, state);
        match self.glide_path {
            GlidePath::BinarySwitch { equity_fraction, switch_age } => {
                0u8.hash(state);
                hash_f64(equity_fraction, state);
                switch_age.hash(state);
            }
            GlidePath::LinearGlide { equity_fraction, start_age, end_age } => {
                1u8.hash(state);
                hash_f64(equity_fraction, state);
                start_age.hash(state);
                end_age.hash(state);
            }
        }
        self.goals.len().hash(state);
        for goal in &self.goals {
            goal.due_year.hash(state);
            hash_f64(goal.amount_at_due, state);
        }
    }
}

/// When a decumulation run stops
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Termination {
    /// Run exactly `years * 12` periods unless depleted first
    FixedDuration { years: u32 },
    /// Stop once the balance falls to `target_corpus`; zero means run to depletion
    UntilTarget { target_corpus: f64 },
}

/// Inputs for a decumulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecumulationConfig {
    pub starting_balance: f64,

    /// Withdrawal in the first year, per month
    pub monthly_withdrawal: f64,

    /// Annual rate, compounded monthly
    pub annual_rate: f64,

    pub termination: Termination,

    /// Annual step-up applied to the withdrawal from period 13
    #[serde(default)]
    pub inflation_rate: Option<f64>,

    #[serde(default = "default_safety_cap")]
    pub safety_cap: u32,

    /// Age at the first period, used only to label ledger rows
    #[serde(default)]
    pub start_age: u32,
}

fn default_safety_cap() -> u32 {
    DEFAULT_SAFETY_CAP
}

impl DecumulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("starting_balance", self.starting_balance)?;
        ensure_finite("monthly_withdrawal", self.monthly_withdrawal)?;
        ensure_rate("annual_rate", self.annual_rate)?;
        if let Some(inflation) = self.inflation_rate {
            ensure_rate("inflation_rate", inflation)?;
        }
        if let Termination::UntilTarget { target_corpus } = self.termination {
            ensure_finite("termination.target_corpus", target_corpus)?;
            if target_corpus < 0.0 {
                return Err(ConfigError::invalid(
                    "termination.target_corpus",
                    "must not be negative",
                ));
            }
        }
        if self.safety_cap == 0 {
            return Err(ConfigError::invalid("safety_cap", "must allow at least one period"));
        }
        Ok(())
    }

    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    fn hash_into<H: Hasher>(&self, state: &mut H) {
        "decumulation".hash(state);
        hash_f64(self.starting_balance, state);
        hash_f64(self.monthly_withdrawal, state);
        hash_f64(self.annual_rate, state);
        match self.termination {
            Termination::FixedDuration { years } => {
                0u8.hash(state);
                years.hash(state);
            }
            Termination::UntilTarget { target_corpus } => {
                1u8.hash(state);
                hash_f64(target_corpus, state);
            }
        }
        self.inflation_rate.map(f64::to_bits).hash(state);
        self.safety_cap.hash(state);
        self.start_age.hash(state);
    }
}

/// Either kind of run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationConfig {
    Accumulation(AccumulationConfig),
    Decumulation(DecumulationConfig),
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            SimulationConfig::Accumulation(config) => config.validate(),
            SimulationConfig::Decumulation(config) => config.validate(),
        }
    }

    /// Stable key for memoization; equal configs always share a key
    pub fn fingerprint(&self) -> u64 {
        match self {
            SimulationConfig::Accumulation(config) => config.fingerprint(),
            SimulationConfig::Decumulation(config) => config.fingerprint(),
        }
    }
}

/// Hash by bit pattern, normalizing -0.0 to 0.0 so equal values share a key
fn hash_f64<H: Hasher>(value: f64, state: &mut H) {
    let normalized = if value == 0.0 { 0.0 } else { value };
    normalized.to_bits().hash(state);
}

/// Builds an [`AccumulationConfig`] from a provider plus run-specific settings
#[derive(Debug, Clone)]
pub struct AccumulationConfigBuilder {
    config: AccumulationConfig,
}

impl AccumulationConfigBuilder {
    /// Seed from provider: current age to the year before retirement
    pub fn from_inputs(inputs: &dyn FinancialInputsProvider) -> Self {
        let start_age = inputs.current_age();
        let end_age = inputs.retirement_age().saturating_sub(1);
        Self {
            config: AccumulationConfig {
                start_age,
                end_age,
                starting_balances: BucketBalances::zero(),
                annual_net_savings: inputs.annual_net_savings(),
                savings_growth_rate: inputs.savings_growth_rate(),
                rates: inputs.bucket_rates(),
                glide_path: GlidePath::default(),
                goals: inputs.goal_obligations(),
            },
        }
    }

    pub fn ages(mut self, start_age: u32, end_age: u32) -> Self {
        self.config.start_age = start_age;
        self.config.end_age = end_age;
        self
    }

    pub fn starting_balances(mut self, balances: BucketBalances) -> Self {
        self.config.starting_balances = balances;
        self
    }

    pub fn glide_path(mut self, glide_path: GlidePath) -> Self {
        self.config.glide_path = glide_path;
        self
    }

    pub fn goals(mut self, goals: Vec<GoalObligation>) -> Self {
        self.config.goals = goals;
        self
    }

    pub fn build(self) -> Result<AccumulationConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Builds a [`DecumulationConfig`] from a provider plus run-specific settings
#[derive(Debug, Clone)]
pub struct DecumulationConfigBuilder {
    config: DecumulationConfig,
}

impl DecumulationConfigBuilder {
    /// Seed from provider: monthly expenses drawn from retirement age,
    /// stepped up by inflation, until depletion
    pub fn from_inputs(inputs: &dyn FinancialInputsProvider, starting_balance: f64) -> Self {
        let inflation = inputs.inflation_rate();
        Self {
            config: DecumulationConfig {
                starting_balance,
                monthly_withdrawal: inputs.monthly_expenses(),
                annual_rate: inputs.retirement_rate(),
                termination: Termination::UntilTarget { target_corpus: 0.0 },
                inflation_rate: if inflation == 0.0 { None } else { Some(inflation) },
                safety_cap: DEFAULT_SAFETY_CAP,
                start_age: inputs.retirement_age(),
            },
        }
    }

    pub fn monthly_withdrawal(mut self, amount: f64) -> Self {
        self.config.monthly_withdrawal = amount;
        self
    }

    pub fn termination(mut self, termination: Termination) -> Self {
        self.config.termination = termination;
        self
    }

    pub fn inflation(mut self, inflation_rate: Option<f64>) -> Self {
        self.config.inflation_rate = inflation_rate;
        self
    }

    pub fn safety_cap(mut self, periods: u32) -> Self {
        self.config.safety_cap = periods;
        self
    }

    pub fn build(self) -> Result<DecumulationConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
