//! Closed-form annuity math and goal sizing
//!
//! Payments are made at the start of each period (annuity due), so every
//! payment earns its own period's growth. This matches how the accumulation
//! simulator applies contributions.

use serde::{Deserialize, Serialize};

use crate::allocation::PERIODS_PER_YEAR;
use crate::config::DEFAULT_SAFETY_CAP;
use crate::error::{ensure_finite, ensure_rate, ConfigError};

/// Rates closer to zero than this are treated as zero
pub const RATE_EPSILON: f64 = 1e-12;

/// Level-payment annuity calculations
pub struct AnnuitySolver;

impl AnnuitySolver {
    /// Level payment per period needed to reach `target_future_value` after
    /// `periods` start-of-period payments at `rate` per period.
    ///
    /// Zero periods means there is nothing to pay into; returns 0.
    pub fn solve(target_future_value: f64, rate: f64, periods: u32) -> f64 {
        if periods == 0 {
            return 0.0;
        }
        if rate.abs() < RATE_EPSILON {
            return target_future_value / periods as f64;
        }

        let growth = (1.0 + rate).powf(periods as f64);
        target_future_value * rate / (growth - 1.0) / (1.0 + rate)
    }

    /// Future value of `periods` start-of-period payments
    pub fn future_value_annuity_due(payment: f64, rate: f64, periods: u32) -> f64 {
        if rate.abs() < RATE_EPSILON {
            return payment * periods as f64;
        }
        let growth = (1.0 + rate).powf(periods as f64);
        payment * (growth - 1.0) * (1.0 + rate) / rate
    }

    /// Future value of a single amount compounded for `periods`
    pub fn future_value_lump_sum(present_value: f64, rate: f64, periods: u32) -> f64 {
        present_value * (1.0 + rate).powf(periods as f64)
    }

    /// Present value of `periods` start-of-period payments
    pub fn present_value_annuity_due(payment: f64, rate: f64, periods: u32) -> f64 {
        if rate.abs() < RATE_EPSILON {
            return payment * periods as f64;
        }
        let v = 1.0 / (1.0 + rate);
        payment * (1.0 - v.powf(periods as f64)) / (1.0 - v)
    }
}

/// Validated entry point for [`AnnuitySolver::solve`]
pub fn solve_required_contribution(
    target_future_value: f64,
    periodic_rate: f64,
    period_count: u32,
) -> Result<f64, ConfigError> {
    ensure_finite("target_future_value", target_future_value)?;
    ensure_finite("periodic_rate", periodic_rate)?;
    if periodic_rate <= -1.0 {
        return Err(ConfigError::invalid("periodic_rate", "must be above -100% per period"));
    }
    Ok(AnnuitySolver::solve(target_future_value, periodic_rate, period_count))
}

/// A goal priced in today's money
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSizing {
    pub current_cost: f64,
    pub years_to_goal: u32,
    /// Annual inflation of the goal's cost
    pub inflation_rate: f64,
    /// Money already set aside for the goal
    #[serde(default)]
    pub existing_savings: f64,
    /// Annual return on savings, compounded monthly
    pub expected_annual_return: f64,
}

/// Monthly saving required to close a goal's funding gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPlan {
    /// Cost at the due date
    pub future_cost: f64,
    /// Existing savings grown to the due date
    pub future_value_of_savings: f64,
    /// Gap left to fund, never negative
    pub shortfall: f64,
    pub monthly_contribution: f64,
}

impl GoalSizing {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("current_cost", self.current_cost)?;
        ensure_finite("existing_savings", self.existing_savings)?;
        ensure_rate("inflation_rate", self.inflation_rate)?;
        ensure_rate("expected_annual_return", self.expected_annual_return)
    }

    pub fn plan(&self) -> Result<GoalPlan, ConfigError> {
        self.validate()?;

        let months = self
            .years_to_goal
            .checked_mul(PERIODS_PER_YEAR)
            .ok_or_else(|| ConfigError::invalid("years_to_goal", "too many months to count"))?;
        let future_cost =
            self.current_cost * (1.0 + self.inflation_rate).powf(self.years_to_goal as f64);
        let monthly_rate = self.expected_annual_return / PERIODS_PER_YEAR as f64;
        let future_value_of_savings = AnnuitySolver::future_value_lump_sum(
            self.existing_savings.max(0.0),
            monthly_rate,
            months,
        );
        let shortfall = (future_cost - future_value_of_savings).max(0.0);

        Ok(GoalPlan {
            future_cost,
            future_value_of_savings,
            shortfall,
            monthly_contribution: AnnuitySolver::solve(shortfall, monthly_rate, months),
        })
    }
}

/// Corpus needed at retirement to fund `monthly_withdrawal` (stepped up by
/// `inflation_rate` every 12 months) for `years`, with growth credited
/// before each withdrawal. A fixed-duration decumulation from this corpus
/// ends at zero.
pub fn required_corpus(
    monthly_withdrawal: f64,
    years: u32,
    annual_rate: f64,
    inflation_rate: f64,
) -> Result<f64, ConfigError> {
    ensure_finite("monthly_withdrawal", monthly_withdrawal)?;
    ensure_rate("annual_rate", annual_rate)?;
    ensure_rate("inflation_rate", inflation_rate)?;
    let months = years
        .checked_mul(PERIODS_PER_YEAR)
        .filter(|&months| months <= DEFAULT_SAFETY_CAP)
        .ok_or_else(|| {
            ConfigError::invalid("years", format!("exceeds {} monthly periods", DEFAULT_SAFETY_CAP))
        })?;

    let monthly_rate = annual_rate / PERIODS_PER_YEAR as f64;
    let mut withdrawal = monthly_withdrawal.max(0.0);
    let mut discount = 1.0;
    let mut corpus = 0.0;

    for period in 1..=months {
        if period > 1 && (period - 1) % PERIODS_PER_YEAR == 0 {
            withdrawal *= 1.0 + inflation_rate;
        }
        discount /= 1.0 + monthly_rate;
        corpus += withdrawal * discount;
    }

    Ok(corpus)
}
