use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(CandidateId);
id_newtype!(ResumeId);
id_newtype!(JobId);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct ParseKeyError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseKeyError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Categorical suitability label attached to every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitVerdict {
    High,
    Medium,
    Low,
}

impl FitVerdict {
    pub fn as_str(self) -> &'static str {
        match self {
            FitVerdict::High => "High",
            FitVerdict::Medium => "Medium",
            FitVerdict::Low => "Low",
        }
    }
}

impl fmt::Display for FitVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FitVerdict {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "high" => Ok(FitVerdict::High),
            "medium" => Ok(FitVerdict::Medium),
            "low" => Ok(FitVerdict::Low),
            _ => Err(ParseKeyError::new("fit verdict", s)),
        }
    }
}

/// Colour band the dashboards use for a relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn for_score(score: u8) -> Self {
        if score >= 80 {
            ScoreBand::Strong
        } else if score >= 60 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: CandidateId,
    pub name: String,
    pub job_title: String,
    /// Percentage in `0..=100`.
    pub relevance_score: u8,
    pub fit_verdict: FitVerdict,
    pub missing_skills: Vec<String>,
    pub submitted_on: NaiveDate,
    pub university: String,
    pub gpa: String,
}

impl CandidateRecord {
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::for_score(self.relevance_score)
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
