//! Bucket allocation: balances, rates, and the age-driven glide path

mod buckets;
mod glide_path;

pub use buckets::{
    AllocationSplit, Bucket, BucketBalances, BucketRates, PeriodRates, PERIODS_PER_YEAR,
};
pub use glide_path::GlidePath;
