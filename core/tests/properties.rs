//! Ranking and build invariants over generated record sets.

use docseek_core::tokenizer::tokenize;
use docseek_core::{Category, Index, Record, SearchConfig, Searcher};
use proptest::prelude::*;

const VOCAB: &[&str] = &[
    "reaction", "network", "rate", "solver", "jump", "diffusion", "species", "parameter", "model", "problem",
    "ode", "sde", "mass", "action", "hill",
];

fn words(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCAB), 0..max).prop_map(|w| w.join(" "))
}

fn category() -> impl Strategy<Value = Category> {
    prop_oneof![Just(Category::Page), Just(Category::Section)]
}

fn records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((words(4), words(3), category(), words(12)), 1..12).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (title, page, category, text))| Record::new(&format!("#r{i}"), &page, &title, category, &text))
            .collect()
    })
}

fn searcher(recs: Vec<Record>) -> Searcher {
    Searcher::with_config(recs, SearchConfig::default().with_page_size(usize::MAX / 2)).unwrap()
}

fn position(s: &Searcher, query: &str, location: &str) -> Option<usize> {
    s.search(query, 0).unwrap().iter().position(|h| h.location == location)
}

proptest! {
    #[test]
    fn builds_are_deterministic(recs in records()) {
        let a = Index::build(recs.clone()).unwrap();
        let b = Index::build(recs).unwrap();
        prop_assert_eq!(a.terms(), b.terms());
    }

    #[test]
    fn every_title_token_finds_its_record(recs in records()) {
        let s = searcher(recs.clone());
        for r in &recs {
            for tok in tokenize(&r.title) {
                prop_assert!(position(&s, &tok.term, &r.location).is_some());
            }
        }
    }

    #[test]
    fn scores_are_sorted_and_ties_follow_category_then_order(recs in records(), q in words(3)) {
        let s = searcher(recs.clone());
        let list = s.ranked(&q).unwrap();
        for w in list.entries().windows(2) {
            prop_assert!(w[0].score >= w[1].score);
            let (a, b) = (&w[0].relevance, &w[1].relevance);
            if a.coverage == b.coverage && a.exact == b.exact && a.weight == b.weight {
                prop_assert!(a.page_category >= b.page_category);
                if a.page_category == b.page_category {
                    prop_assert!(w[0].record < w[1].record);
                }
            }
        }
    }

    #[test]
    fn title_match_never_below_text_only_match(word in prop::sample::select(VOCAB), text_cat in category(), title_cat in category(), reps in 1usize..6) {
        let body = vec![word; reps].join(" ");
        let recs = vec![
            Record::new("#text", "Page One", "Unrelated Heading", text_cat, &body),
            Record::new("#title", "Page Two", &format!("About {word}"), title_cat, ""),
        ];
        let s = searcher(recs);
        prop_assert_eq!(position(&s, word, "#title"), Some(0));
        prop_assert_eq!(position(&s, word, "#text"), Some(1));
    }

    #[test]
    fn more_coverage_never_ranks_lower(a in prop::sample::select(VOCAB), b in prop::sample::select(VOCAB), reps in 1usize..8) {
        prop_assume!(a != b);
        let recs = vec![
            Record::new("#one", "Manual", &format!("{a} overview"), Category::Page, &vec![a; reps].join(" ")),
            Record::new("#both", "Manual", "Notes", Category::Section, &format!("{a} {b}")),
        ];
        let s = searcher(recs);
        let q = format!("{a} {b}");
        prop_assert_eq!(position(&s, &q, "#both"), Some(0));
    }

    #[test]
    fn junk_queries_return_nothing(recs in records(), q in r"[ _.,;:!?()<>/+*=#@-]{0,6}|[a-z]") {
        let s = searcher(recs);
        prop_assert!(s.search(&q, 0).unwrap().is_empty());
    }

    #[test]
    fn pages_beyond_the_end_are_empty(recs in records(), q in words(2), extra in 0usize..5) {
        let s = Searcher::with_config(recs, SearchConfig::default().with_page_size(3)).unwrap();
        let list = s.ranked(&q).unwrap();
        prop_assert!(list.page(list.page_count() + extra).is_empty());
    }
}
