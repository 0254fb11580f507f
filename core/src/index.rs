use crate::error::{Error, Result};
use crate::record::{check_locations, validate_all, RawRecord, Record, RecordId};
use crate::tokenizer::tokenize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Which part of a record a token occurrence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Page,
    Text,
}

impl Field {
    /// Strongest first.
    pub const ALL: [Field; 3] = [Field::Title, Field::Page, Field::Text];
}

/// Occurrences of one term in one record, counted per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Posting {
    pub record: RecordId,
    pub title_tf: u32,
    pub page_tf: u32,
    pub text_tf: u32,
}

impl Posting {
    fn new(record: RecordId) -> Self {
        Self { record, ..Default::default() }
    }

    pub fn count(&self, field: Field) -> u32 {
        match field {
            Field::Title => self.title_tf,
            Field::Page => self.page_tf,
            Field::Text => self.text_tf,
        }
    }

    fn bump(&mut self, field: Field) {
        match field {
            Field::Title => self.title_tf += 1,
            Field::Page => self.page_tf += 1,
            Field::Text => self.text_tf += 1,
        }
    }

    /// The highest-weighted field the term occurs in.
    pub fn strongest_field(&self) -> Option<Field> {
        Field::ALL.into_iter().find(|f| self.count(*f) > 0)
    }

    pub fn total(&self) -> u32 {
        self.title_tf + self.page_tf + self.text_tf
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub records: usize,
    pub terms: usize,
    pub postings: usize,
}

/// Immutable inverted index over a record sequence.
///
/// Terms live in a sorted map so prefix lookups are a range scan and two
/// builds from the same records compare equal. Postings per term are in
/// record order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Index {
    terms: BTreeMap<String, Vec<Posting>>,
    records: Vec<Record>,
}

impl Index {
    /// Build from validated records. Fails on the first empty or duplicate
    /// location; no partial index is returned.
    pub fn build(records: Vec<Record>) -> Result<Self> {
        check_locations(&records)?;
        let mut terms: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
        for (i, rec) in records.iter().enumerate() {
            let id = RecordId::try_from(i)
                .map_err(|_| Error::malformed(i, "record count exceeds u32 range"))?;
            for (field, source) in [(Field::Title, &rec.title), (Field::Page, &rec.page), (Field::Text, &rec.text)] {
                for tok in tokenize(source) {
                    let plist = terms.entry(tok.term).or_default();
                    match plist.last_mut() {
                        Some(p) if p.record == id => p.bump(field),
                        _ => {
                            let mut p = Posting::new(id);
                            p.bump(field);
                            plist.push(p);
                        }
                    }
                }
            }
        }
        let index = Self { terms, records };
        let stats = index.stats();
        tracing::debug!(records = stats.records, terms = stats.terms, postings = stats.postings, "built index");
        Ok(index)
    }

    /// Validate wire records and build.
    pub fn from_raw(raw: Vec<RawRecord>) -> Result<Self> {
        Self::build(validate_all(raw)?)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn terms(&self) -> &BTreeMap<String, Vec<Posting>> {
        &self.terms
    }

    pub fn postings(&self, term: &str) -> &[Posting] {
        self.terms.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Terms that strictly extend `prefix` (the exact term is excluded).
    pub fn extensions<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a [Posting])> + 'a {
        self.terms
            .range::<str, _>((Bound::Excluded(prefix), Bound::Unbounded))
            .take_while(move |(term, _)| term.starts_with(prefix))
            .map(|(term, plist)| (term.as_str(), plist.as_slice()))
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records: self.records.len(),
            terms: self.terms.len(),
            postings: self.terms.values().map(Vec::len).sum(),
        }
    }
}
