//! Candidate filtering and ordering for the recruiter dashboard.
//!
//! Every query is a full, synchronous recomputation over the repository's
//! records. Records are cloned into the derived view and never modified.

use std::{cmp::Ordering, fmt, str::FromStr};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use shared::domain::{CandidateId, CandidateRecord, FitVerdict, ParseKeyError};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Source of candidate records.
pub trait CandidateRepository: Send + Sync {
    fn candidates(&self) -> Vec<CandidateRecord>;
}

/// In-memory repository, used for the bundled sample data and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCandidateRepository {
    records: Vec<CandidateRecord>,
}

impl StaticCandidateRepository {
    pub fn new(records: Vec<CandidateRecord>) -> Self {
        Self { records }
    }

    /// The five applicants for the "Senior Software Engineer" posting.
    pub fn sample() -> Result<Self> {
        let records = [
            sample_candidate(
                1,
                "Alex Johnson",
                92,
                FitVerdict::High,
                &["Kubernetes", "GraphQL"],
                (2024, 1, 22),
                "MIT",
                "3.8",
            ),
            sample_candidate(
                2,
                "Sarah Chen",
                87,
                FitVerdict::High,
                &["Docker", "AWS Lambda"],
                (2024, 1, 21),
                "Stanford",
                "3.9",
            ),
            sample_candidate(
                3,
                "Michael Rodriguez",
                73,
                FitVerdict::Medium,
                &["React Native", "TypeScript", "MongoDB"],
                (2024, 1, 20),
                "UC Berkeley",
                "3.6",
            ),
            sample_candidate(
                4,
                "Emily Wang",
                68,
                FitVerdict::Medium,
                &["Node.js", "PostgreSQL", "Redis"],
                (2024, 1, 19),
                "Carnegie Mellon",
                "3.7",
            ),
            sample_candidate(
                5,
                "David Kim",
                58,
                FitVerdict::Low,
                &["Python", "Machine Learning", "AWS", "Jenkins"],
                (2024, 1, 18),
                "Georgia Tech",
                "3.4",
            ),
        ]
        .into_iter()
        .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(records))
    }
}

impl CandidateRepository for StaticCandidateRepository {
    fn candidates(&self) -> Vec<CandidateRecord> {
        self.records.clone()
    }
}

#[allow(clippy::too_many_arguments)]
fn sample_candidate(
    id: i64,
    name: &str,
    relevance_score: u8,
    fit_verdict: FitVerdict,
    missing_skills: &[&str],
    (year, month, day): (i32, u32, u32),
    university: &str,
    gpa: &str,
) -> Result<CandidateRecord> {
    let submitted_on = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("invalid submission date {year}-{month}-{day} for {name}"))?;
    Ok(CandidateRecord {
        id: CandidateId(id),
        name: name.to_string(),
        job_title: "Senior Software Engineer".to_string(),
        relevance_score,
        fit_verdict,
        missing_skills: missing_skills.iter().map(|s| s.to_string()).collect(),
        submitted_on,
        university: university.to_string(),
        gpa: gpa.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitFilter {
    #[default]
    All,
    Only(FitVerdict),
}

impl FitFilter {
    pub fn admits(self, verdict: FitVerdict) -> bool {
        match self {
            FitFilter::All => true,
            FitFilter::Only(wanted) => wanted == verdict,
        }
    }
}

impl FromStr for FitFilter {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(FitFilter::All);
        }
        s.parse::<FitVerdict>()
            .map(FitFilter::Only)
            .map_err(|_| ParseKeyError::new("fit filter", s))
    }
}

impl fmt::Display for FitFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitFilter::All => f.write_str("all"),
            FitFilter::Only(verdict) => f.write_str(&verdict.as_str().to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Highest score first.
    #[default]
    Relevance,
    /// Alphabetical by name.
    Name,
    /// Most recent submission first.
    Date,
}

impl FromStr for SortKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortKey::Relevance),
            "name" => Ok(SortKey::Name),
            "date" => Ok(SortKey::Date),
            _ => Err(ParseKeyError::new("sort key", s)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Relevance => "relevance",
            SortKey::Name => "name",
            SortKey::Date => "date",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Table,
    Cards,
}

impl FromStr for ViewMode {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(ViewMode::Table),
            "cards" => Ok(ViewMode::Cards),
            _ => Err(ParseKeyError::new("view mode", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateQuery {
    pub search: String,
    pub filter: FitFilter,
    pub sort: SortKey,
}

impl CandidateQuery {
    pub fn new(search: impl Into<String>, filter: FitFilter, sort: SortKey) -> Self {
        Self {
            search: search.into(),
            filter,
            sort,
        }
    }

    pub fn matches(&self, candidate: &CandidateRecord) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || candidate.name.to_lowercase().contains(&needle)
            || candidate.university.to_lowercase().contains(&needle);
        matches_search && self.filter.admits(candidate.fit_verdict)
    }

    /// Filters then orders `candidates` into a fresh view.
    pub fn apply(&self, candidates: &[CandidateRecord]) -> Vec<CandidateRecord> {
        let mut view: Vec<CandidateRecord> = candidates
            .iter()
            .filter(|candidate| self.matches(candidate))
            .cloned()
            .collect();
        view.sort_by(|a, b| compare(self.sort, a, b));
        view
    }
}

fn compare(sort: SortKey, a: &CandidateRecord, b: &CandidateRecord) -> Ordering {
    match sort {
        SortKey::Relevance => b
            .relevance_score
            .cmp(&a.relevance_score)
            .then_with(|| a.id.cmp(&b.id)),
        SortKey::Name => compare_names(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)),
        SortKey::Date => b
            .submitted_on
            .cmp(&a.submitted_on)
            .then_with(|| a.id.cmp(&b.id)),
    }
}

// Base letters first, ignoring accents and case, so "Émile" sorts with the
// other E names. Accents then case then raw text break the remaining ties.
fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
#[path = "tests/candidates_tests.rs"]
mod tests;
