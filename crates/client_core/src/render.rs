//! Text renderers for a derived candidate view.
//!
//! Both renderers take the same slice; neither filters nor reorders it.

use std::fmt::Write as _;

use shared::domain::{CandidateRecord, ScoreBand};

use crate::candidates::ViewMode;

pub const NO_RESULTS: &str = "No candidates match the current search and filter.";

/// Missing skills shown per row before collapsing into `+N more`.
const TABLE_SKILL_PREVIEW: usize = 2;

pub fn render(mode: ViewMode, candidates: &[CandidateRecord]) -> String {
    match mode {
        ViewMode::Table => render_table(candidates),
        ViewMode::Cards => render_cards(candidates),
    }
}

pub fn render_table(candidates: &[CandidateRecord]) -> String {
    if candidates.is_empty() {
        return format!("{NO_RESULTS}\n");
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<20} {:<16} {:>6} {:<7} {:<32} {:<10}",
        "ID", "Candidate", "University", "Score", "Fit", "Missing Skills", "Submitted"
    );
    for candidate in candidates {
        let _ = writeln!(
            out,
            "{:<4} {:<20} {:<16} {:>6} {:<7} {:<32} {:<10}",
            candidate.id,
            candidate.name,
            candidate.university,
            format!("{}%", candidate.relevance_score),
            candidate.fit_verdict,
            skill_preview(&candidate.missing_skills),
            candidate.submitted_on.to_string(),
        );
    }
    out
}

pub fn render_cards(candidates: &[CandidateRecord]) -> String {
    if candidates.is_empty() {
        return format!("{NO_RESULTS}\n");
    }

    let mut out = String::new();
    for candidate in candidates {
        let _ = writeln!(out, "[{}] {}", candidate.id, candidate.name);
        let _ = writeln!(out, "    {} | GPA: {}", candidate.university, candidate.gpa);
        let _ = writeln!(
            out,
            "    Relevance: {}% ({}) | Fit: {}",
            candidate.relevance_score,
            band_label(candidate.score_band()),
            candidate.fit_verdict
        );
        if candidate.missing_skills.is_empty() {
            let _ = writeln!(out, "    Missing skills: none");
        } else {
            let _ = writeln!(
                out,
                "    Missing skills: {}",
                candidate.missing_skills.join(", ")
            );
        }
        let _ = writeln!(out, "    Submitted: {}", candidate.submitted_on);
    }
    out
}

fn skill_preview(skills: &[String]) -> String {
    let mut preview = skills
        .iter()
        .take(TABLE_SKILL_PREVIEW)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if skills.len() > TABLE_SKILL_PREVIEW {
        let _ = write!(preview, " +{} more", skills.len() - TABLE_SKILL_PREVIEW);
    }
    preview
}

fn band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Strong => "strong",
        ScoreBand::Moderate => "moderate",
        ScoreBand::Weak => "weak",
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
