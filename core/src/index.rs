use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

pub type DocId = String;

/// Owned copy of the index contents, ordered by term then document id.
pub type IndexSnapshot = BTreeMap<String, BTreeMap<DocId, Posting>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub term_frequency: u32,
    /// Zero until the owning index is finalized.
    pub tfidf: f64,
}

impl Posting {
    fn new() -> Self { Self { term_frequency: 1, tfidf: 0.0 } }
}

/// Catalog entry for one term: its document frequency and posting list.
#[derive(Debug, Clone, Default)]
pub struct TermEntry {
    document_frequency: u32,
    postings: BTreeMap<DocId, Posting>, // keyed and ordered by doc id
}

impl TermEntry {
    pub fn document_frequency(&self) -> u32 { self.document_frequency }
    pub fn postings(&self) -> &BTreeMap<DocId, Posting> { &self.postings }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdfVariant {
    /// log10(N / df)
    #[default]
    Standard,
    /// log10(1 + N / df)
    Smoothed,
}

impl IdfVariant {
    pub fn idf(self, total_documents: u32, document_frequency: u32) -> f64 {
        let ratio = total_documents as f64 / document_frequency as f64;
        match self {
            IdfVariant::Standard => ratio.log10(),
            IdfVariant::Smoothed => (1.0 + ratio).log10(),
        }
    }
}

/// Term -> document -> posting map built once, finalized once, then read-only.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    terms: BTreeMap<String, TermEntry>,
    documents: BTreeSet<DocId>,
    total_documents: u32,
    idf: IdfVariant,
    finalized: bool,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn with_idf(idf: IdfVariant) -> Self {
        Self { idf, ..Self::default() }
    }

    /// Add one document's normalized tokens.
    ///
    /// The document counts towards the corpus size even when `tokens` is empty.
    /// Empty token strings are skipped.
    pub fn ingest<I, S>(&mut self, doc_id: &str, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.finalized {
            return Err(CoreError::AlreadyFinalized(doc_id.to_string()));
        }
        if doc_id.trim().is_empty() {
            return Err(CoreError::InvalidDocumentId(doc_id.to_string()));
        }
        if !self.documents.insert(doc_id.to_string()) {
            return Err(CoreError::DuplicateDocument(doc_id.to_string()));
        }
        self.total_documents += 1;

        let mut token_count = 0usize;
        for token in tokens {
            let token = token.as_ref();
            if token.is_empty() { continue; }
            token_count += 1;
            let entry = self.terms.entry(token.to_string()).or_default();
            match entry.postings.entry(doc_id.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(Posting::new());
                    entry.document_frequency += 1;
                }
                Entry::Occupied(mut slot) => slot.get_mut().term_frequency += 1,
            }
        }
        tracing::debug!(doc_id, tokens = token_count, "ingested document");
        Ok(())
    }

    /// Compute tf-idf for every posting and freeze the index. Re-running recomputes
    /// the same weights.
    pub fn finalize(&mut self) {
        self.finalized = true;
        if self.total_documents == 0 {
            return;
        }
        let n = self.total_documents;
        for entry in self.terms.values_mut() {
            if entry.document_frequency == 0 { continue; }
            let idf = self.idf.idf(n, entry.document_frequency);
            for posting in entry.postings.values_mut() {
                posting.tfidf = posting.term_frequency as f64 * idf;
            }
        }
        tracing::info!(num_docs = n, num_terms = self.terms.len(), idf = ?self.idf, "computed tf-idf weights");
    }

    pub fn is_finalized(&self) -> bool { self.finalized }
    pub fn total_documents(&self) -> u32 { self.total_documents }
    pub fn term_count(&self) -> usize { self.terms.len() }
    pub fn idf_variant(&self) -> IdfVariant { self.idf }

    /// Ids of every ingested document, including ones that produced no terms.
    pub fn documents(&self) -> &BTreeSet<DocId> { &self.documents }

    pub fn term(&self, term: &str) -> Option<&TermEntry> { self.terms.get(term) }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &TermEntry)> + '_ {
        self.terms.iter().map(|(t, e)| (t.as_str(), e))
    }

    pub fn document_frequency(&self, term: &str) -> Option<u32> {
        self.terms.get(term).map(|e| e.document_frequency)
    }

    pub fn postings(&self, term: &str) -> Option<&BTreeMap<DocId, Posting>> {
        self.terms.get(term).map(|e| &e.postings)
    }

    /// Deep copy of the term -> document -> posting mapping.
    pub fn snapshot(&self) -> IndexSnapshot {
        self.terms
            .iter()
            .map(|(term, entry)| (term.clone(), entry.postings.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(docs: &[(&str, &str)]) -> InvertedIndex {
        let mut idx = InvertedIndex::new();
        for (id, text) in docs {
            idx.ingest(id, text.split_whitespace()).unwrap();
        }
        idx
    }

    #[test]
    fn counts_term_and_document_frequency() {
        let idx = build(&[("d1", "hujan hujan cuaca"), ("d2", "hujan")]);
        assert_eq!(idx.total_documents(), 2);
        assert_eq!(idx.document_frequency("hujan"), Some(2));
        assert_eq!(idx.document_frequency("cuaca"), Some(1));
        assert_eq!(idx.postings("hujan").unwrap()["d1"].term_frequency, 2);
        assert_eq!(idx.postings("hujan").unwrap()["d2"].term_frequency, 1);
        assert_eq!(idx.document_frequency("panas"), None);
    }

    #[test]
    fn tfidf_is_zero_before_finalize() {
        let idx = build(&[("d1", "a b"), ("d2", "a")]);
        assert!(!idx.is_finalized());
        for (_, entry) in idx.terms() {
            assert!(entry.postings().values().all(|p| p.tfidf == 0.0));
        }
    }

    #[test]
    fn finalize_computes_log10_tfidf() {
        let mut idx = build(&[("d1", "a a b"), ("d2", "b"), ("d3", "c"), ("d4", "c")]);
        idx.finalize();
        let a = idx.postings("a").unwrap()["d1"].tfidf;
        assert!((a - 2.0 * 4f64.log10()).abs() < 1e-12);
        let b = idx.postings("b").unwrap()["d2"].tfidf;
        assert!((b - 2f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn smoothed_idf() {
        let mut idx = InvertedIndex::with_idf(IdfVariant::Smoothed);
        idx.ingest("only", ["x"]).unwrap();
        idx.finalize();
        assert!((idx.postings("x").unwrap()["only"].tfidf - 2f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn empty_documents_count_towards_corpus() {
        let mut idx = InvertedIndex::new();
        idx.ingest("empty", Vec::<String>::new()).unwrap();
        idx.ingest("full", ["x"]).unwrap();
        idx.finalize();
        assert_eq!(idx.total_documents(), 2);
        assert!(idx.documents().contains("empty"));
        assert!((idx.postings("x").unwrap()["full"].tfidf - 2f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn empty_tokens_are_skipped() {
        let idx = build(&[]);
        assert_eq!(idx.term_count(), 0);
        let mut idx = InvertedIndex::new();
        idx.ingest("d", ["", "x", ""]).unwrap();
        assert_eq!(idx.term_count(), 1);
    }

    #[test]
    fn rejects_invalid_and_duplicate_ids() {
        let mut idx = InvertedIndex::new();
        assert!(matches!(idx.ingest("", ["x"]), Err(CoreError::InvalidDocumentId(_))));
        assert!(matches!(idx.ingest("  ", ["x"]), Err(CoreError::InvalidDocumentId(_))));
        idx.ingest("d", ["x"]).unwrap();
        assert!(matches!(idx.ingest("d", ["y"]), Err(CoreError::DuplicateDocument(_))));
        assert_eq!(idx.total_documents(), 1);
        assert_eq!(idx.term_count(), 1);
    }

    #[test]
    fn ingest_after_finalize_is_rejected() {
        let mut idx = build(&[("d1", "a")]);
        idx.finalize();
        let err = idx.ingest("d2", ["b"]).unwrap_err();
        assert!(err.is_state());
        assert_eq!(idx.total_documents(), 1);
    }

    #[test]
    fn finalize_empty_index_is_noop() {
        let mut idx = InvertedIndex::new();
        idx.finalize();
        assert!(idx.is_finalized());
        assert!(idx.snapshot().is_empty());
    }

    #[test]
    fn snapshot_is_ordered_copy() {
        let mut idx = build(&[("d2", "zeta alpha"), ("d1", "alpha")]);
        idx.finalize();
        let snap = idx.snapshot();
        let terms: Vec<&String> = snap.keys().collect();
        assert_eq!(terms, vec!["alpha", "zeta"]);
        let docs: Vec<&String> = snap["alpha"].keys().collect();
        assert_eq!(docs, vec!["d1", "d2"]);
        assert_eq!(snap["zeta"]["d2"], idx.postings("zeta").unwrap()["d2"]);
    }
}
