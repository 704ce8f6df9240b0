use std::fmt;
use std::str::FromStr;

use super::error::DataError;

// ---------------------------------------------------------------------------
// RetentionStatus – the categorical outcome column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RetentionStatus {
    Retained,
    Churned,
}

impl RetentionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionStatus::Retained => "Retained",
            RetentionStatus::Churned => "Churned",
        }
    }
}

impl FromStr for RetentionStatus {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Retained" => Ok(RetentionStatus::Retained),
            "Churned" => Ok(RetentionStatus::Churned),
            other => Err(DataError::UnknownRetentionStatus(other.to_string())),
        }
    }
}

impl fmt::Display for RetentionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CustomerRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single customer (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub age: u32,
    pub location: String,
    pub satisfaction_score: f64,
    pub feedback_score: f64,
    pub time_spent_on_site: f64,
    pub products_purchased: u32,
    pub products_viewed: u32,
    pub retention_status: RetentionStatus,
}

// ---------------------------------------------------------------------------
// ScoreKey – satisfaction scores used as grouping keys
// ---------------------------------------------------------------------------

/// A satisfaction score usable as a map / grouping key.
///
/// Scores are ordinal in practice but stored as `f64`, so equality and
/// ordering go through `total_cmp`.
#[derive(Debug, Clone, Copy)]
pub struct ScoreKey(pub f64);

impl PartialEq for ScoreKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

impl Eq for ScoreKey {}

impl PartialOrd for ScoreKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoreKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for ScoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{:.2}", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// CustomerDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with the indices the filter controls need.
///
/// Never mutated after construction.
#[derive(Debug, Clone)]
pub struct CustomerDataset {
    /// All customers, in file order.
    pub records: Vec<CustomerRecord>,
    /// Distinct locations in order of first appearance.
    pub locations: Vec<String>,
    /// Observed `(min, max)` age.
    pub age_bounds: (u32, u32),
}

impl CustomerDataset {
    /// Build the location index and age bounds from the loaded records.
    pub fn from_records(records: Vec<CustomerRecord>) -> Result<Self, DataError> {
        let mut locations: Vec<String> = Vec::new();
        let mut bounds: Option<(u32, u32)> = None;

        for rec in &records {
            if !locations.iter().any(|l| *l == rec.location) {
                locations.push(rec.location.clone());
            }
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(rec.age), hi.max(rec.age)),
                None => (rec.age, rec.age),
            });
        }

        let age_bounds = bounds.ok_or(DataError::Empty)?;
        Ok(CustomerDataset {
            records,
            locations,
            age_bounds,
        })
    }

    /// Number of customers.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
