//! Goal obligations and their CSV loader

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ConfigError};

/// A future lump-sum cost falling due in a given simulation year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalObligation {
    /// 1-indexed simulation year the cost is due in (year 1 = start age)
    pub due_year: u32,

    /// Cost at the due date, already inflated
    pub amount_at_due: f64,

    #[serde(default)]
    pub label: String,
}

impl GoalObligation {
    pub fn new(due_year: u32, amount_at_due: f64) -> Self {
        Self {
            due_year,
            amount_at_due,
            label: String::new(),
        }
    }

    /// Goal priced in today's money, inflated annually until it falls due
    pub fn from_current_cost(due_year: u32, current_cost: f64, inflation_rate: f64) -> Self {
        let years = due_year.saturating_sub(1) as f64;
        Self::new(due_year, current_cost * (1.0 + inflation_rate).powf(years))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub(crate) fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let field = format!("goals[{}].amount_at_due", index);
        ensure_finite(&field, self.amount_at_due)?;
        if self.amount_at_due < 0.0 {
            return Err(ConfigError::invalid(field, "must not be negative"));
        }
        if self.due_year == 0 {
            return Err(ConfigError::invalid(
                format!("goals[{}].due_year", index),
                "must be 1 or later",
            ));
        }
        Ok(())
    }
}

/// Sum of goal costs due in `year`
pub fn total_due_in(goals: &[GoalObligation], year: u32) -> f64 {
    goals
        .iter()
        .filter(|g| g.due_year == year)
        .map(|g| g.amount_at_due)
        .sum()
}

/// Raw CSV row: `label,due_year,amount_at_due`
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Label", default)]
    label: String,
    #[serde(rename = "DueYear")]
    due_year: u32,
    #[serde(rename = "AmountAtDue")]
    amount_at_due: f64,
}

/// Load goal obligations from a CSV file, ordered by due year
pub fn load_goals<P: AsRef<Path>>(path: P) -> Result<Vec<GoalObligation>, ConfigError> {
    let file = File::open(path.as_ref())?;
    load_goals_from_reader(file)
}

/// Load goal obligations from any reader
pub fn load_goals_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<GoalObligation>, ConfigError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut goals = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        goals.push(GoalObligation {
            due_year: row.due_year,
            amount_at_due: row.amount_at_due,
            label: row.label,
        });
    }

    for (index, goal) in goals.iter().enumerate() {
        goal.validate(index)?;
    }

    goals.sort_by_key(|g| g.due_year);
    Ok(goals)
}
