//! In-memory full-text search over documentation search-index records.
//!
//! Records (`location`, `page`, `title`, `category`, `text`) are validated and
//! tokenized into an immutable [`Index`]; a [`Searcher`] answers free-text
//! queries against it with ranked, paginated, highlighted hits.
//!
//! ```
//! use docseek_core::{Category, Record, Searcher};
//!
//! let searcher = Searcher::new(vec![
//!     Record::new("#intro", "Guide", "Intro", Category::Page, "getting started guide"),
//!     Record::new("#api", "Guide", "API Reference", Category::Section, "functions and types reference"),
//! ])
//! .unwrap();
//! let hits = searcher.search("reference", 0).unwrap();
//! assert_eq!(hits[0].title, "API Reference");
//! ```

pub mod config;
pub mod error;
pub mod excerpt;
pub mod index;
pub mod load;
pub mod query;
pub mod rank;
pub mod record;
pub mod tokenizer;

pub use config::SearchConfig;
pub use error::{Error, Result};
pub use excerpt::{Excerpt, ExcerptSource};
pub use index::{Field, Index, IndexStats, Posting};
pub use query::{QueryToken, RankedList, SearchHit, Searcher};
pub use rank::{Ranked, Relevance};
pub use record::{Category, RawRecord, Record, RecordId};
