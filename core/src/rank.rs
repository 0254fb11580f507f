use crate::config::SearchConfig;
use crate::index::{Index, Posting};
use crate::record::{Category, RecordId};
use serde::Serialize;
use std::collections::HashMap;

/// Match statistics of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Relevance {
    /// Distinct query tokens matched, exactly or by prefix.
    pub coverage: u32,
    /// Query tokens matched exactly in some field.
    pub exact: u32,
    /// Sum of per-token field weights.
    pub weight: f64,
    pub page_category: bool,
}

/// Score units for a query of a given length.
///
/// One unit of `exact` outweighs any possible weight sum, and one unit of
/// `coverage` outweighs any possible exact count, so sorting by score orders
/// candidates by coverage, then exact matches, then weight.
#[derive(Debug, Clone, Copy)]
struct Scale {
    exact_unit: f64,
    coverage_unit: f64,
    page_category_bonus: f64,
}

impl Scale {
    fn new(config: &SearchConfig, n_terms: usize) -> Self {
        let n = n_terms as f64;
        let max_weight = n * (config.title_weight + config.frequency_bonus) + config.page_category_bonus;
        let exact_unit = max_weight.floor() + 1.0;
        Self { exact_unit, coverage_unit: (n + 1.0) * exact_unit, page_category_bonus: config.page_category_bonus }
    }

    fn score(&self, r: &Relevance) -> f64 {
        let bonus = if r.page_category { self.page_category_bonus } else { 0.0 };
        f64::from(r.coverage) * self.coverage_unit + f64::from(r.exact) * self.exact_unit + r.weight + bonus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranked {
    pub record: RecordId,
    pub score: f64,
    pub relevance: Relevance,
}

#[derive(Clone, Copy)]
struct TermMatch {
    exact: bool,
    weight: f64,
}

/// Weight of an exact hit: strongest field sets the tier, repeats add a
/// bonus that stays strictly below `frequency_bonus`.
fn exact_weight(p: &Posting, config: &SearchConfig) -> f64 {
    let Some(field) = p.strongest_field() else { return 0.0 };
    let total = f64::from(p.total());
    config.field_weight(field) + config.frequency_bonus * (1.0 - 1.0 / total)
}

/// Matches of a single query token, keyed by record. `None` if `cancelled`
/// fires during the prefix scan.
fn match_term(
    index: &Index,
    config: &SearchConfig,
    term: &str,
    cancelled: &impl Fn() -> bool,
) -> Option<HashMap<RecordId, TermMatch>> {
    let mut matches: HashMap<RecordId, TermMatch> = HashMap::new();
    for p in index.postings(term) {
        matches.insert(p.record, TermMatch { exact: true, weight: exact_weight(p, config) });
    }
    let prefix_weight = config.title_weight * config.prefix_factor;
    for (_, plist) in index.extensions(term) {
        if cancelled() {
            return None;
        }
        for p in plist.iter().filter(|p| p.title_tf > 0) {
            matches
                .entry(p.record)
                .and_modify(|m| m.weight = m.weight.max(prefix_weight))
                .or_insert(TermMatch { exact: false, weight: prefix_weight });
        }
    }
    Some(matches)
}

/// Score and order every record matching at least one of `terms`.
///
/// `cancelled` is polled between terms and between prefix extensions;
/// returns `None` if it fires.
pub fn rank(index: &Index, config: &SearchConfig, terms: &[String], cancelled: impl Fn() -> bool) -> Option<Vec<Ranked>> {
    let mut acc: HashMap<RecordId, Relevance> = HashMap::new();
    for term in terms {
        if cancelled() {
            return None;
        }
        for (record, m) in match_term(index, config, term, &cancelled)? {
            let rel = acc.entry(record).or_default();
            rel.coverage += 1;
            rel.exact += u32::from(m.exact);
            rel.weight += m.weight;
        }
    }
    if cancelled() {
        return None;
    }

    let scale = Scale::new(config, terms.len());
    let mut ranked: Vec<Ranked> = acc
        .into_iter()
        .filter_map(|(record, mut relevance)| {
            let rec = index.record(record)?;
            relevance.page_category = rec.category == Category::Page;
            Some(Ranked { record, score: scale.score(&relevance), relevance })
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.record.cmp(&b.record)));
    Some(ranked)
}
