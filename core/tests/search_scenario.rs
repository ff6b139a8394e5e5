use search_core::{InvertedIndex, SearchMode, Searcher};
use std::collections::BTreeSet;

fn identity(term: &str) -> String {
    term.to_lowercase()
}

fn weather_index() -> InvertedIndex {
    let mut idx = InvertedIndex::new();
    idx.ingest("doc1", ["cuaca", "hujan"]).unwrap();
    idx.ingest("doc2", ["cuaca", "panas"]).unwrap();
    idx.ingest("doc3", ["hujan", "saja"]).unwrap();
    idx.finalize();
    idx
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn weather_corpus_weights() {
    let idx = weather_index();
    assert_eq!(idx.total_documents(), 3);
    assert_eq!(idx.document_frequency("cuaca"), Some(2));
    let cuaca = idx.postings("cuaca").unwrap();
    assert!(approx(cuaca["doc1"].tfidf, 0.1761));
    assert!(approx(cuaca["doc2"].tfidf, 0.1761));
    assert!(approx(idx.postings("saja").unwrap()["doc3"].tfidf, 0.4771));
}

#[test]
fn weather_single_term() {
    let idx = weather_index();
    let s = Searcher::new(&idx, &identity).unwrap();
    let res = s.search_single_term("cuaca");
    assert_eq!(res.doc_ids(), vec!["doc1", "doc2"]);
    assert!(res.hits.iter().all(|h| approx(h.score, 0.1761)));
    assert_eq!(res.hits[0].matched_terms, BTreeSet::from(["cuaca".to_string()]));
}

#[test]
fn weather_and() {
    let idx = weather_index();
    let s = Searcher::new(&idx, &identity).unwrap();
    let res = s.search_and(&["cuaca", "hujan"]);
    assert_eq!(res.doc_ids(), vec!["doc1"]);
    assert!(approx(res.hits[0].score, 0.3522));
    assert_eq!(res.hits[0].matched_terms_count(), 2);
}

#[test]
fn weather_or() {
    let idx = weather_index();
    let s = Searcher::new(&idx, &identity).unwrap();
    let res = s.search_or(&["cuaca", "hujan"]);
    assert_eq!(res.doc_ids(), vec!["doc1", "doc2", "doc3"]);
    let counts: Vec<usize> = res.hits.iter().map(|h| h.matched_terms_count()).collect();
    assert_eq!(counts, vec![2, 1, 1]);
    assert!(approx(res.hits[0].score, 0.3522));
    assert!(approx(res.hits[1].score, 0.1761));
    assert!(approx(res.hits[2].score, 0.1761));
}

#[test]
fn weather_advanced() {
    let idx = weather_index();
    let s = Searcher::new(&idx, &identity).unwrap();
    let res = s.search(SearchMode::Advanced, &["cuaca", "hujan", "salju"]);
    assert_eq!(res.doc_ids(), vec!["doc1", "doc2", "doc3"]);
    assert_eq!(res.missing_terms, vec!["salju"]);
}

#[test]
fn missing_term_behaviour_per_mode() {
    let idx = weather_index();
    let s = Searcher::new(&idx, &identity).unwrap();
    assert!(s.search_single_term("salju").is_empty());
    assert!(s.search_and(&["cuaca", "salju"]).is_empty());
    assert_eq!(s.search_or(&["cuaca", "salju"]), s.search_or(&["cuaca"]));
    assert_eq!(s.search_advanced(&["salju", "cuaca"]).doc_ids(), vec!["doc1", "doc2"]);
}

#[test]
fn document_frequency_matches_posting_count() {
    let idx = weather_index();
    for (_, entry) in idx.terms() {
        assert_eq!(entry.document_frequency() as usize, entry.postings().len());
    }
}

#[test]
fn finalize_is_idempotent() {
    let mut idx = weather_index();
    let before = idx.snapshot();
    idx.finalize();
    assert_eq!(before, idx.snapshot());
}

#[test]
fn single_document_weights_are_zero() {
    let mut idx = InvertedIndex::new();
    idx.ingest("only", ["kata"]).unwrap();
    idx.finalize();
    assert_eq!(idx.postings("kata").unwrap()["only"].tfidf, 0.0);
}

#[test]
fn and_results_are_subset_of_or() {
    let mut idx = InvertedIndex::new();
    idx.ingest("a", ["x", "y", "z"]).unwrap();
    idx.ingest("b", ["x", "y"]).unwrap();
    idx.ingest("c", ["y", "z", "z"]).unwrap();
    idx.ingest("d", ["w"]).unwrap();
    idx.finalize();
    let s = Searcher::new(&idx, &identity).unwrap();

    let queries: [&[&str]; 4] = [&["x", "y"], &["y", "z"], &["x", "z", "w"], &["y"]];
    for q in queries {
        let and: BTreeSet<String> = s.search_and(q).hits.into_iter().map(|h| h.doc_id).collect();
        let or: BTreeSet<String> = s.search_or(q).hits.into_iter().map(|h| h.doc_id).collect();
        assert!(and.is_subset(&or), "{q:?}");
    }
}

#[test]
fn advanced_never_ranks_fewer_matches_higher() {
    let mut idx = InvertedIndex::new();
    idx.ingest("heavy", ["langka"; 8]).unwrap();
    idx.ingest("both", ["umum", "biasa"]).unwrap();
    idx.ingest("u", ["umum"]).unwrap();
    idx.ingest("b", ["biasa"]).unwrap();
    idx.finalize();
    let s = Searcher::new(&idx, &identity).unwrap();
    let res = s.search_advanced(&["langka", "umum", "biasa"]);
    for pair in res.hits.windows(2) {
        assert!(pair[0].matched_terms_count() >= pair[1].matched_terms_count());
    }
    assert_eq!(res.hits[0].doc_id, "both");
}
