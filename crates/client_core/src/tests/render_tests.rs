use super::*;
use crate::candidates::{
    CandidateQuery, CandidateRepository, FitFilter, SortKey, StaticCandidateRepository,
};
use shared::domain::FitVerdict;

fn fixture() -> Vec<CandidateRecord> {
    StaticCandidateRepository::sample()
        .expect("sample candidates")
        .candidates()
}

fn row_order(rendered: &str, names: &[&str]) -> Vec<usize> {
    names
        .iter()
        .map(|name| rendered.find(name).unwrap_or(usize::MAX))
        .collect()
}

#[test]
fn both_views_show_the_same_candidates_in_the_same_order() {
    let view = CandidateQuery::new("", FitFilter::Only(FitVerdict::Medium), SortKey::Name)
        .apply(&fixture());
    assert_eq!(view.len(), 2);
    let table = render(ViewMode::Table, &view);
    let cards = render(ViewMode::Cards, &view);

    let expected: Vec<&str> = view.iter().map(|c| c.name.as_str()).collect();
    for rendered in [&table, &cards] {
        let positions = row_order(rendered, &expected);
        assert!(positions.iter().all(|p| *p != usize::MAX));
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
    for excluded in fixture().iter().filter(|c| !view.contains(c)) {
        assert!(!table.contains(&excluded.name));
        assert!(!cards.contains(&excluded.name));
    }
}

#[test]
fn empty_view_renders_no_results_line() {
    assert_eq!(render_table(&[]), format!("{NO_RESULTS}\n"));
    assert_eq!(render_cards(&[]), format!("{NO_RESULTS}\n"));
}

#[test]
fn table_collapses_long_skill_lists() {
    let view = fixture();
    let table = render_table(&view);
    assert!(table.contains("Python, Machine Learning +2 more"));
    assert!(table.contains("Kubernetes, GraphQL"));
    assert!(!table.contains("Jenkins"));
}

#[test]
fn cards_list_every_skill_and_score_band() {
    let cards = render_cards(&fixture());
    assert!(cards.contains("Missing skills: Python, Machine Learning, AWS, Jenkins"));
    assert!(cards.contains("Relevance: 92% (strong)"));
    assert!(cards.contains("Relevance: 73% (moderate)"));
    assert!(cards.contains("Relevance: 58% (weak)"));
}
