use docseek_core::load::load_records;
use docseek_core::{Category, ExcerptSource, Searcher};
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/search_index.js")
}

fn searcher() -> Searcher {
    Searcher::new(load_records(fixture()).unwrap()).unwrap()
}

fn locations(s: &Searcher, q: &str) -> Vec<String> {
    s.search(q, 0).unwrap().into_iter().map(|h| h.location).collect()
}

#[test]
fn loads_documenter_search_index() {
    let recs = load_records(fixture()).unwrap();
    let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Readme", "DiffEqBiological.jl", "The Reaction DSL", "Docstrings"]);
    assert_eq!(recs[0].location, "#");
    assert_eq!(recs[0].category, Category::Page);
    assert!(recs[0].text.is_empty());
    assert!(recs[3].text.starts_with("Package doesn't contain Documenter docs."));
}

#[test]
fn section_title_match_comes_first() {
    let s = searcher();
    assert_eq!(locations(&s, "reaction"), vec!["#The-Reaction-DSL-1"]);
}

#[test]
fn page_name_reaches_every_section_of_the_page() {
    let s = searcher();
    assert_eq!(locations(&s, "readme"), vec!["#", "#DiffEqBiological.jl-1", "#The-Reaction-DSL-1"]);
}

#[test]
fn partial_word_reaches_title() {
    let s = searcher();
    let hits = s.search("reac", 0).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "The Reaction DSL");
    assert_eq!(hits[0].excerpt.source, ExcerptSource::Text);
    assert!(hits[0].excerpt.text.chars().count() <= 160);
    assert!(hits[0].excerpt.marked().all(|m| m.to_lowercase().starts_with("reac")));
}

#[test]
fn unknown_words_find_nothing() {
    let s = searcher();
    assert!(locations(&s, "zzz qqq").is_empty());
}
