use crate::error::{Error, Result};
use crate::index::Field;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_EXCERPT_CHARS: usize = 160;

/// Ranking weights and result shaping.
///
/// Per matched query token the strongest field sets the base weight and
/// repeated occurrences add at most `frequency_bonus`. `validate` rejects
/// combinations where that bonus could lift a text hit over a page hit, or a
/// page hit over a title hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub title_weight: f64,
    pub page_weight: f64,
    pub text_weight: f64,
    /// Multiplier applied to `title_weight` for prefix-only title matches.
    pub prefix_factor: f64,
    pub frequency_bonus: f64,
    /// Tie-break for `page` category records; smaller than any tier gap.
    pub page_category_bonus: f64,
    pub page_size: usize,
    pub excerpt_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            title_weight: 5.0,
            page_weight: 2.0,
            text_weight: 1.0,
            prefix_factor: 0.5,
            frequency_bonus: 0.5,
            page_category_bonus: 0.01,
            page_size: DEFAULT_PAGE_SIZE,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

impl SearchConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }

    pub fn field_weight(&self, field: Field) -> f64 {
        match field {
            Field::Title => self.title_weight,
            Field::Page => self.page_weight,
            Field::Text => self.text_weight,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(Error::InvalidConfig(msg.to_string()));
        if self.page_size == 0 {
            return invalid("page_size must be at least 1");
        }
        if self.excerpt_chars == 0 {
            return invalid("excerpt_chars must be at least 1");
        }
        let weights = [
            self.title_weight,
            self.page_weight,
            self.text_weight,
            self.prefix_factor,
            self.frequency_bonus,
            self.page_category_bonus,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return invalid("weights must be finite and non-negative");
        }
        if self.text_weight <= 0.0 {
            return invalid("text_weight must be positive");
        }
        if self.text_weight + self.frequency_bonus >= self.page_weight
            || self.page_weight + self.frequency_bonus >= self.title_weight
        {
            return invalid("field weights must satisfy text + bonus < page and page + bonus < title");
        }
        let min_gap = (self.page_weight - self.text_weight - self.frequency_bonus)
            .min(self.title_weight - self.page_weight - self.frequency_bonus);
        if self.page_category_bonus >= min_gap {
            return invalid("page_category_bonus must be smaller than the gap between field tiers");
        }
        if self.prefix_factor > 1.0 {
            return invalid("prefix_factor must not exceed 1.0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        SearchConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_overlapping_tiers() {
        let cfg = SearchConfig { frequency_bonus: 1.5, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
        let cfg = SearchConfig { page_weight: 5.0, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = SearchConfig { page_category_bonus: 0.6, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_page_size() {
        assert!(SearchConfig::default().with_page_size(0).validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: SearchConfig = serde_json::from_str(r#"{"page_size": 25}"#).unwrap();
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.title_weight, 5.0);
    }
}
