//! Query engine: tokenizes a query, ranks candidates once per query and
//! serves result pages from the cached ranking.

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::excerpt::{anchored_excerpt, title_excerpt, Excerpt};
use crate::index::Index;
use crate::rank::{rank, Ranked};
use crate::record::Record;
use crate::tokenizer::query_terms;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub location: String,
    pub page: String,
    pub title: String,
    pub excerpt: Excerpt,
    pub score: f64,
}

/// Full ranking for one query against one index generation.
#[derive(Debug)]
pub struct RankedList {
    index: Arc<Index>,
    config: Arc<SearchConfig>,
    generation: u64,
    terms: Vec<String>,
    entries: Vec<Ranked>,
}

impl RankedList {
    fn empty(index: Arc<Index>, config: Arc<SearchConfig>, generation: u64) -> Self {
        Self { index, config, generation, terms: Vec::new(), entries: Vec::new() }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn entries(&self) -> &[Ranked] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    pub fn page_count(&self) -> usize {
        self.entries.len().div_ceil(self.config.page_size)
    }

    /// Hits on page `n` (0-based). Out-of-range pages are empty.
    pub fn page(&self, n: usize) -> Vec<SearchHit> {
        let size = self.config.page_size;
        let Some(start) = n.checked_mul(size) else { return Vec::new() };
        if start >= self.entries.len() {
            return Vec::new();
        }
        let end = start.saturating_add(size).min(self.entries.len());
        self.entries[start..end]
            .iter()
            .filter_map(|r| self.index.record(r.record).map(|rec| self.hit(rec, r.score)))
            .collect()
    }

    fn hit(&self, rec: &Record, score: f64) -> SearchHit {
        let is_exact = |t: &str| self.terms.iter().any(|q| q == t);
        let is_match = |t: &str| self.terms.iter().any(|q| t.starts_with(q.as_str()));
        let excerpt = anchored_excerpt(&rec.text, is_exact, is_match, self.config.excerpt_chars)
            .unwrap_or_else(|| title_excerpt(&rec.title, is_match));
        SearchHit {
            location: rec.location.clone(),
            page: rec.page.clone(),
            title: rec.title.clone(),
            excerpt,
            score,
        }
    }
}

/// Handle for an interruptible query. Superseded once a newer interruptible
/// query starts on the same searcher.
#[derive(Debug, Clone)]
pub struct QueryToken {
    epoch: u64,
    latest: Option<Arc<AtomicU64>>,
}

impl QueryToken {
    /// A token that is never superseded.
    pub fn detached() -> Self {
        Self { epoch: 0, latest: None }
    }

    pub fn is_superseded(&self) -> bool {
        self.latest.as_ref().is_some_and(|l| l.load(Ordering::Acquire) != self.epoch)
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    index: Arc<Index>,
    generation: u64,
}

/// Owns the current index and answers queries against it.
///
/// Queries run against an `Arc` snapshot, so `rebuild` may swap the index
/// while earlier queries are still ranking.
#[derive(Debug, Default)]
pub struct Searcher {
    config: Arc<SearchConfig>,
    current: RwLock<Option<Snapshot>>,
    cache: Mutex<Option<Arc<RankedList>>>,
    generation: AtomicU64,
    epoch: Arc<AtomicU64>,
}

impl Searcher {
    pub fn new(records: Vec<Record>) -> Result<Self> {
        Self::with_config(records, SearchConfig::default())
    }

    pub fn with_config(records: Vec<Record>, config: SearchConfig) -> Result<Self> {
        Self::from_index(Index::build(records)?, config)
    }

    pub fn from_index(index: Index, config: SearchConfig) -> Result<Self> {
        let searcher = Self::unbuilt(config)?;
        searcher.install(index);
        Ok(searcher)
    }

    /// A searcher with no index; queries fail with `InvalidQueryState`
    /// until the first successful `rebuild`.
    pub fn unbuilt(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config: Arc::new(config), ..Default::default() })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn index(&self) -> Result<Arc<Index>> {
        Ok(self.snapshot()?.index)
    }

    /// Increments on every successful build.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replace the index with one built from `records` and return its
    /// generation. On error the current index stays in place.
    pub fn rebuild(&self, records: Vec<Record>) -> Result<u64> {
        let index = Index::build(records)?;
        Ok(self.install(index))
    }

    fn install(&self, index: Index) -> u64 {
        let stats = index.stats();
        let index = Arc::new(index);
        let generation = {
            let mut current = self.current.write();
            let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            *current = Some(Snapshot { index, generation });
            self.cache.lock().take();
            generation
        };
        tracing::info!(generation, records = stats.records, terms = stats.terms, "index installed");
        generation
    }

    fn snapshot(&self) -> Result<Snapshot> {
        self.current.read().clone().ok_or(Error::InvalidQueryState)
    }

    /// Page `page` (0-based) of hits for `query`.
    pub fn search(&self, query: &str, page: usize) -> Result<Vec<SearchHit>> {
        Ok(self.ranked(query)?.page(page))
    }

    /// The full ranking for `query`, reused across page requests.
    ///
    /// Only the most recent ranking is cached. Callers paging through
    /// several queries at once should keep the returned list and call
    /// [`RankedList::page`] on it directly.
    pub fn ranked(&self, query: &str) -> Result<Arc<RankedList>> {
        match self.ranked_with(query, &QueryToken::detached())? {
            Some(list) => Ok(list),
            None => unreachable!("detached tokens are never superseded"),
        }
    }

    /// Start an interruptible query, superseding any in flight.
    pub fn begin_query(&self) -> QueryToken {
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        QueryToken { epoch, latest: Some(Arc::clone(&self.epoch)) }
    }

    /// Like `search`, but returns `Ok(None)` if a newer interruptible query
    /// started before ranking finished.
    pub fn search_interruptible(&self, query: &str, page: usize) -> Result<Option<Vec<SearchHit>>> {
        let token = self.begin_query();
        Ok(self.ranked_with(query, &token)?.map(|list| list.page(page)))
    }

    pub fn ranked_with(&self, query: &str, token: &QueryToken) -> Result<Option<Arc<RankedList>>> {
        let snap = self.snapshot()?;
        let terms = query_terms(query);
        if terms.is_empty() {
            return Ok(Some(Arc::new(RankedList::empty(snap.index, Arc::clone(&self.config), snap.generation))));
        }
        if let Some(cached) = self.cache.lock().as_ref() {
            if cached.generation == snap.generation && cached.terms == terms {
                return Ok(Some(Arc::clone(cached)));
            }
        }

        let start = Instant::now();
        let Some(entries) = rank(&snap.index, &self.config, &terms, || token.is_superseded()) else {
            tracing::debug!(query, "query superseded");
            return Ok(None);
        };
        tracing::debug!(query, hits = entries.len(), took_us = start.elapsed().as_micros() as u64, "ranked query");

        let list = Arc::new(RankedList {
            index: snap.index,
            config: Arc::clone(&self.config),
            generation: snap.generation,
            terms,
            entries,
        });
        *self.cache.lock() = Some(Arc::clone(&list));
        Ok(Some(list))
    }
}
