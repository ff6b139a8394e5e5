use crate::{CoreError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref DEFAULT_ANALYZER: Analyzer = Analyzer::default();
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Maps a raw query term onto the vocabulary of the index.
pub trait Normalize {
    fn normalize(&self, term: &str) -> String;
}

impl<F> Normalize for F
where
    F: Fn(&str) -> String,
{
    fn normalize(&self, term: &str) -> String {
        self(term)
    }
}

/// Built-in English stop list.
pub fn default_stopwords() -> HashSet<String> {
    STOPWORDS.iter().map(|w| w.to_string()).collect()
}

/// Read a stop-word list, one word per line.
pub fn load_stopwords<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let text = fs::read_to_string(path.as_ref())?;
    let words: HashSet<String> = text
        .lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect();
    tracing::info!(path = %path.as_ref().display(), count = words.len(), "loaded stopwords");
    Ok(words)
}

fn stemmer_algorithm(language: &str) -> Result<Option<Algorithm>> {
    let algo = match language.trim().to_lowercase().as_str() {
        "none" | "" => return Ok(None),
        "arabic" => Algorithm::Arabic,
        "danish" => Algorithm::Danish,
        "dutch" => Algorithm::Dutch,
        "english" => Algorithm::English,
        "finnish" => Algorithm::Finnish,
        "french" => Algorithm::French,
        "german" => Algorithm::German,
        "greek" => Algorithm::Greek,
        "hungarian" => Algorithm::Hungarian,
        "italian" => Algorithm::Italian,
        "norwegian" => Algorithm::Norwegian,
        "portuguese" => Algorithm::Portuguese,
        "romanian" => Algorithm::Romanian,
        "russian" => Algorithm::Russian,
        "spanish" => Algorithm::Spanish,
        "swedish" => Algorithm::Swedish,
        "tamil" => Algorithm::Tamil,
        "turkish" => Algorithm::Turkish,
        other => return Err(CoreError::Config(format!("unsupported stemmer language: {other}"))),
    };
    Ok(Some(algo))
}

/// Text pipeline shared by document ingestion and query normalization:
/// NFKC normalization, lowercase, stopword removal and stemming.
pub struct Analyzer {
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self { stemmer: Some(Stemmer::create(Algorithm::English)), stopwords: default_stopwords() }
    }
}

impl Analyzer {
    /// `language` names a Snowball stemmer, or `"none"` to keep words unstemmed.
    pub fn new(language: &str, stopwords: HashSet<String>) -> Result<Self> {
        let stemmer = stemmer_algorithm(language)?.map(Stemmer::create);
        Ok(Self { stemmer, stopwords })
    }

    pub fn is_stopword(&self, token: &str) -> bool { self.stopwords.contains(token) }

    fn stem(&self, word: &str) -> String {
        match &self.stemmer {
            Some(stemmer) => stemmer.stem(word).into_owned(),
            None => word.to_string(),
        }
    }

    /// Tokenize text into (term, position); positions count stopwords too.
    pub fn tokenize(&self, text: &str) -> Vec<(String, usize)> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();
        for (pos, mat) in RE.find_iter(&normalized).enumerate() {
            let token = mat.as_str();
            if self.is_stopword(token) { continue; }
            tokens.push((self.stem(token), pos));
        }
        tokens
    }

    /// Normalized terms of `text` in document order.
    pub fn terms(&self, text: &str) -> Vec<String> {
        self.tokenize(text).into_iter().map(|(term, _)| term).collect()
    }
}

impl Normalize for Analyzer {
    // Query terms are not stopword-filtered; a stopword simply misses the catalog.
    fn normalize(&self, term: &str) -> String {
        let lowered = term.trim().nfkc().collect::<String>().to_lowercase();
        self.stem(&lowered)
    }
}

/// Tokenize with the default English analyzer.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    DEFAULT_ANALYZER.tokenize(text)
}
