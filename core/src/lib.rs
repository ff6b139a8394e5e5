//! In-memory TF-IDF inverted index with single-term, AND, OR and advanced
//! keyword search.
//!
//! Build an [`InvertedIndex`] with [`InvertedIndex::ingest`], freeze it with
//! [`InvertedIndex::finalize`], then query it through a [`Searcher`].

pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod query;
pub mod tokenizer;

pub use config::EngineConfig;
pub use corpus::{build_index, document_id, load_documents, Corpus};
pub use error::{CoreError, Result};
pub use index::{DocId, IdfVariant, IndexSnapshot, InvertedIndex, Posting, TermEntry};
pub use query::{by_coverage, by_score, split_query, SearchHit, SearchMode, SearchResults, Searcher};
pub use tokenizer::{Analyzer, Normalize};
