use crate::corpus::{build_index, load_documents, Corpus};
use crate::index::{IdfVariant, InvertedIndex};
use crate::tokenizer::{default_stopwords, load_stopwords, Analyzer};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Engine settings, read from a JSON file. Missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory whose files form the corpus.
    pub documents_path: PathBuf,
    /// Stop-word list, one word per line. The built-in English list is used when unset.
    pub stopwords_path: Option<PathBuf>,
    /// Snowball stemmer language, or "none".
    pub language: String,
    pub smoothed_idf: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            documents_path: PathBuf::from("./documents"),
            stopwords_path: None,
            language: "english".to_string(),
            smoothed_idf: false,
        }
    }
}

impl EngineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        tracing::info!(path = %path.as_ref().display(), "loaded configuration");
        Ok(config)
    }

    pub fn idf(&self) -> IdfVariant {
        if self.smoothed_idf { IdfVariant::Smoothed } else { IdfVariant::Standard }
    }

    pub fn analyzer(&self) -> Result<Analyzer> {
        let stopwords = match &self.stopwords_path {
            Some(path) => load_stopwords(path)?,
            None => default_stopwords(),
        };
        Analyzer::new(&self.language, stopwords)
    }

    /// Load the corpus, analyze it and return the finalized index with its inputs.
    pub fn build(&self) -> Result<(Corpus, Analyzer, InvertedIndex)> {
        let analyzer = self.analyzer()?;
        let corpus = load_documents(&self.documents_path)?;
        let index = build_index(&corpus, &analyzer, self.idf())?;
        Ok((corpus, analyzer, index))
    }
}
