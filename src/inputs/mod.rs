//! Financial inputs supplied by the surrounding application
//!
//! The engine never reads shared application state. Everything a config
//! builder needs comes through [`FinancialInputsProvider`].

mod goals;

pub use goals::{load_goals, load_goals_from_reader, total_due_in, GoalObligation};

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::allocation::BucketRates;
use crate::error::ConfigError;

/// Source of cash-flow, goal and rate assumptions for a plan
pub trait FinancialInputsProvider {
    fn current_age(&self) -> u32;

    fn retirement_age(&self) -> u32;

    /// Net amount saved per year (income minus expenses)
    fn annual_net_savings(&self) -> f64;

    /// Annual growth rate of the savings amount
    fn savings_growth_rate(&self) -> f64;

    /// Goal obligations in due-year order
    fn goal_obligations(&self) -> Vec<GoalObligation>;

    /// Expected annual returns while accumulating
    fn bucket_rates(&self) -> BucketRates;

    fn inflation_rate(&self) -> f64;

    /// Expected annual return on the corpus after retirement
    fn retirement_rate(&self) -> f64;

    /// Monthly spending to be drawn from the corpus in retirement
    fn monthly_expenses(&self) -> f64;
}

/// Plain-data provider, typically deserialized from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub annual_net_savings: f64,
    #[serde(default)]
    pub savings_growth_rate: f64,
    #[serde(default)]
    pub goals: Vec<GoalObligation>,
    pub bucket_rates: BucketRates,
    #[serde(default)]
    pub inflation_rate: f64,
    pub retirement_rate: f64,
    #[serde(default)]
    pub monthly_expenses: f64,
}

impl StaticInputs {
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(file)?)
    }
}

impl FinancialInputsProvider for StaticInputs {
    fn current_age(&self) -> u32 {
        self.current_age
    }

    fn retirement_age(&self) -> u32 {
        self.retirement_age
    }

    fn annual_net_savings(&self) -> f64 {
        self.annual_net_savings
    }

    fn savings_growth_rate(&self) -> f64 {
        self.savings_growth_rate
    }

    fn goal_obligations(&self) -> Vec<GoalObligation> {
        let mut goals = self.goals.clone();
        goals.sort_by_key(|g| g.due_year);
        goals
    }

    fn bucket_rates(&self) -> BucketRates {
        self.bucket_rates
    }

    fn inflation_rate(&self) -> f64 {
        self.inflation_rate
    }

    fn retirement_rate(&self) -> f64 {
        self.retirement_rate
    }

    fn monthly_expenses(&self) -> f64 {
        self.monthly_expenses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_inputs_from_json() {
        let json = r#"{
            "current_age": 30,
            "retirement_age": 60,
            "annual_net_savings": 600000,
            "goals": [
                {"due_year": 12, "amount_at_due": 2500000, "label": "House"},
                {"due_year": 4, "amount_at_due": 900000}
            ],
            "bucket_rates": {"equity": 0.12, "debt": 0.07},
            "inflation_rate": 0.06,
            "retirement_rate": 0.08
        }"#;

        let inputs: StaticInputs = serde_json::from_str(json).unwrap();

        assert_eq!(inputs.savings_growth_rate(), 0.0);
        assert_eq!(inputs.monthly_expenses(), 0.0);
        let goals = inputs.goal_obligations();
        assert_eq!(goals[0].due_year, 4);
        assert_eq!(goals[1].label, "House");
        assert_eq!(inputs.bucket_rates().debt, 0.07);
    }
}
