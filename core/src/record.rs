use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Index of a record in the loaded sequence.
pub type RecordId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Root record of a page.
    Page,
    Section,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Page => "page",
            Category::Section => "section",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "page" => Ok(Category::Page),
            "section" => Ok(Category::Section),
            other => Err(format!("invalid category {other:?}, expected \"page\" or \"section\"")),
        }
    }
}

/// One page or section entry of a documentation search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub location: String,
    pub page: String,
    pub title: String,
    pub category: Category,
    pub text: String,
}

impl Record {
    pub fn new(location: &str, page: &str, title: &str, category: Category, text: &str) -> Self {
        Self {
            location: location.to_string(),
            page: page.to_string(),
            title: title.to_string(),
            category,
            text: text.to_string(),
        }
    }
}

/// A record as it appears on the wire, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub location: Option<String>,
    pub page: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub text: Option<String>,
}

impl RawRecord {
    /// Check presence of every field and the category value.
    pub fn validate(self, index: usize) -> Result<Record> {
        let field = |value: Option<String>, name: &str| {
            value.ok_or_else(|| Error::malformed(index, format!("missing field `{name}`")))
        };
        let location = field(self.location, "location")?;
        let page = field(self.page, "page")?;
        let title = field(self.title, "title")?;
        let category = field(self.category, "category")?
            .parse::<Category>()
            .map_err(|reason| Error::malformed(index, reason))?;
        let text = field(self.text, "text")?;
        Ok(Record { location, page, title, category, text })
    }
}

impl From<Record> for RawRecord {
    fn from(r: Record) -> Self {
        Self {
            location: Some(r.location),
            page: Some(r.page),
            title: Some(r.title),
            category: Some(r.category.as_str().to_string()),
            text: Some(r.text),
        }
    }
}

/// Validate a raw sequence, stopping at the first bad record.
pub fn validate_all(raw: Vec<RawRecord>) -> Result<Vec<Record>> {
    raw.into_iter().enumerate().map(|(i, r)| r.validate(i)).collect()
}

/// Sequence-level checks: non-empty and unique locations.
pub(crate) fn check_locations(records: &[Record]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        if r.location.is_empty() {
            return Err(Error::malformed(i, "empty `location`"));
        }
        if !seen.insert(r.location.as_str()) {
            return Err(Error::malformed(i, format!("duplicate location {:?}", r.location)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(category: &str) -> RawRecord {
        RawRecord {
            location: Some("#intro".into()),
            page: Some("Guide".into()),
            title: Some("Intro".into()),
            category: Some(category.into()),
            text: Some(String::new()),
        }
    }

    #[test]
    fn validates_complete_record() {
        let r = raw("section").validate(0).unwrap();
        assert_eq!(r.category, Category::Section);
        assert_eq!(r.text, "");
    }

    #[test]
    fn rejects_unknown_category() {
        let err = raw("chapter").validate(3).unwrap_err();
        match err {
            Error::MalformedRecord { index, reason } => {
                assert_eq!(index, 3);
                assert!(reason.contains("chapter"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_missing_field() {
        let mut r = raw("page");
        r.text = None;
        let err = r.validate(1).unwrap_err();
        assert!(err.to_string().contains("`text`"));
    }

    #[test]
    fn duplicate_location_is_malformed() {
        let a = Record::new("#a", "P", "A", Category::Page, "");
        let b = Record::new("#a", "P", "B", Category::Section, "");
        let err = check_locations(&[a, b]).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { index: 1, .. }));
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Page).unwrap();
        assert_eq!(json, "\"page\"");
    }
}
