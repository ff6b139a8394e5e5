//! Query evaluation over a finalized [`InvertedIndex`].
//!
//! Four modes are supported: a single term, AND (intersection), OR (union) and
//! advanced, which is the OR union ranked by how many query terms each document
//! covers. Every ranking ends in an ascending document id tie-break so results
//! are deterministic.

use crate::index::{DocId, InvertedIndex};
use crate::tokenizer::Normalize;
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Single,
    And,
    Or,
    #[default]
    Advanced,
}

impl FromStr for SearchMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(SearchMode::Single),
            "and" => Ok(SearchMode::And),
            "or" => Ok(SearchMode::Or),
            "advanced" => Ok(SearchMode::Advanced),
            _ => Err(CoreError::UnknownSearchMode(s.to_string())),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::Single => "single",
            SearchMode::And => "and",
            SearchMode::Or => "or",
            SearchMode::Advanced => "advanced",
        };
        f.write_str(name)
    }
}

/// Split a raw query on commas and whitespace.
pub fn split_query(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    /// Sum of the tf-idf weights of every matching query term.
    pub score: f64,
    pub matched_terms: BTreeSet<String>,
}

impl SearchHit {
    pub fn matched_terms_count(&self) -> usize { self.matched_terms.len() }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    /// Ranked hits, best first.
    pub hits: Vec<SearchHit>,
    /// Normalized query terms that matched no document. Only advanced search fills this.
    pub missing_terms: Vec<String>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool { self.hits.is_empty() }
    pub fn len(&self) -> usize { self.hits.len() }

    pub fn doc_ids(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.doc_id.as_str()).collect()
    }
}

/// Per-document accumulator used while a query runs.
#[derive(Debug, Default)]
struct Aggregate {
    score: f64,
    matched: BTreeSet<String>,
}

impl Aggregate {
    fn update(&mut self, tfidf: f64, term: &str) {
        self.score += tfidf;
        self.matched.insert(term.to_string());
    }
}

/// Higher score first; equal scores fall back to ascending document id.
pub fn by_score(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id))
}

/// More matched terms first, then [`by_score`].
pub fn by_coverage(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.matched_terms_count()
        .cmp(&a.matched_terms_count())
        .then_with(|| by_score(a, b))
}

fn rank<F>(acc: BTreeMap<&str, Aggregate>, compare: F) -> Vec<SearchHit>
where
    F: Fn(&SearchHit, &SearchHit) -> Ordering,
{
    let mut hits: Vec<SearchHit> = acc
        .into_iter()
        .map(|(doc_id, agg)| SearchHit { doc_id: doc_id.to_string(), score: agg.score, matched_terms: agg.matched })
        .collect();
    hits.sort_by(compare);
    hits
}

/// Read-only evaluator bound to a finalized index and a query-term normalizer.
pub struct Searcher<'a, N: ?Sized> {
    index: &'a InvertedIndex,
    normalizer: &'a N,
}

impl<'a, N: Normalize + ?Sized> Searcher<'a, N> {
    /// Fails with [`CoreError::NotFinalized`] if the index is still being built.
    pub fn new(index: &'a InvertedIndex, normalizer: &'a N) -> Result<Self> {
        if !index.is_finalized() {
            return Err(CoreError::NotFinalized);
        }
        Ok(Self { index, normalizer })
    }

    fn normalize_all<S: AsRef<str>>(&self, terms: &[S]) -> Vec<String> {
        terms.iter().map(|t| self.normalizer.normalize(t.as_ref())).collect()
    }

    /// Run `terms` in the given mode. In [`SearchMode::Single`] the terms are
    /// joined with single spaces and looked up as one term.
    pub fn search<S: AsRef<str>>(&self, mode: SearchMode, terms: &[S]) -> SearchResults {
        match mode {
            SearchMode::Single => {
                if terms.is_empty() {
                    return SearchResults::default();
                }
                let joined: Vec<&str> = terms.iter().map(AsRef::as_ref).collect();
                self.search_single_term(&joined.join(" "))
            }
            SearchMode::And => self.search_and(terms),
            SearchMode::Or => self.search_or(terms),
            SearchMode::Advanced => self.search_advanced(terms),
        }
    }

    pub fn search_single_term(&self, term: &str) -> SearchResults {
        let term = self.normalizer.normalize(term);
        let Some(postings) = self.index.postings(&term) else {
            tracing::info!(term = %term, "term not found");
            return SearchResults::default();
        };
        let mut acc: BTreeMap<&str, Aggregate> = BTreeMap::new();
        for (doc_id, posting) in postings {
            acc.entry(doc_id.as_str()).or_default().update(posting.tfidf, &term);
        }
        SearchResults { hits: rank(acc, by_score), missing_terms: Vec::new() }
    }

    /// Documents containing every term. A missing term or an empty running
    /// intersection ends the query with no results.
    pub fn search_and<S: AsRef<str>>(&self, terms: &[S]) -> SearchResults {
        let terms = self.normalize_all(terms);
        let mut candidates: Option<BTreeSet<&str>> = None;
        for term in &terms {
            let Some(postings) = self.index.postings(term) else {
                tracing::info!(term = %term, "term not found; AND query has no results");
                return SearchResults::default();
            };
            let docs: BTreeSet<&str> = match candidates.take() {
                None => postings.keys().map(String::as_str).collect(),
                Some(mut docs) => {
                    docs.retain(|d| postings.contains_key(*d));
                    docs
                }
            };
            if docs.is_empty() {
                return SearchResults::default();
            }
            candidates = Some(docs);
        }
        let Some(candidates) = candidates else {
            return SearchResults::default();
        };

        let mut acc: BTreeMap<&str, Aggregate> = BTreeMap::new();
        for doc_id in candidates {
            let agg = acc.entry(doc_id).or_default();
            for term in &terms {
                if let Some(posting) = self.index.postings(term).and_then(|p| p.get(doc_id)) {
                    agg.update(posting.tfidf, term);
                }
            }
        }
        SearchResults { hits: rank(acc, by_score), missing_terms: Vec::new() }
    }

    pub fn search_or<S: AsRef<str>>(&self, terms: &[S]) -> SearchResults {
        let terms = self.normalize_all(terms);
        let (acc, _) = self.union(&terms);
        SearchResults { hits: rank(acc, by_score), missing_terms: Vec::new() }
    }

    /// OR union ranked by number of matched terms, reporting terms that hit nothing.
    pub fn search_advanced<S: AsRef<str>>(&self, terms: &[S]) -> SearchResults {
        let terms = self.normalize_all(terms);
        let (acc, missing_terms) = self.union(&terms);
        if !missing_terms.is_empty() {
            tracing::info!(?missing_terms, "terms not found");
        }
        SearchResults { hits: rank(acc, by_coverage), missing_terms }
    }

    fn union<'t>(&'t self, terms: &'t [String]) -> (BTreeMap<&'t str, Aggregate>, Vec<String>) {
        let mut acc: BTreeMap<&str, Aggregate> = BTreeMap::new();
        let mut missing: Vec<String> = Vec::new();
        for term in terms {
            match self.index.postings(term) {
                Some(postings) => {
                    for (doc_id, posting) in postings {
                        acc.entry(doc_id.as_str()).or_default().update(posting.tfidf, term);
                    }
                }
                None => {
                    tracing::debug!(term = %term, "skipping term not in index");
                    if !missing.contains(term) {
                        missing.push(term.clone());
                    }
                }
            }
        }
        (acc, missing)
    }
}
