use crate::index::{DocId, IdfVariant, InvertedIndex};
use crate::tokenizer::Analyzer;
use crate::{CoreError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Raw document text keyed by document id.
pub type Corpus = BTreeMap<DocId, String>;

/// Document id for a corpus file name: the name without a trailing `.txt`.
pub fn document_id(file_name: &str) -> &str {
    file_name.strip_suffix(".txt").unwrap_or(file_name)
}

/// Read every regular file directly inside `dir`.
///
/// Symbolic links are followed; links resolving outside `dir`, broken links and
/// files whose name yields a blank document id are skipped with a warning.
pub fn load_documents<P: AsRef<Path>>(dir: P) -> Result<Corpus> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(CoreError::Corpus(format!("not a directory: {}", dir.display())));
    }
    let root = dir.canonicalize()?;

    let mut corpus = Corpus::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable corpus entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !path.canonicalize()?.starts_with(&root) {
            tracing::warn!(path = %path.display(), "skipping file outside corpus directory");
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        let id = document_id(&file_name);
        if id.trim().is_empty() {
            tracing::warn!(path = %path.display(), "skipping file with blank document id");
            continue;
        }
        if corpus.contains_key(id) {
            tracing::warn!(path = %path.display(), doc_id = id, "duplicate document id; keeping first file");
            continue;
        }
        let bytes = fs::read(path)?;
        corpus.insert(id.to_string(), String::from_utf8_lossy(&bytes).into_owned());
    }
    if corpus.is_empty() {
        tracing::info!(dir = %dir.display(), "no files found in corpus directory");
    }
    Ok(corpus)
}

/// Analyze and ingest every document in id order, then finalize.
pub fn build_index(corpus: &Corpus, analyzer: &Analyzer, idf: IdfVariant) -> Result<InvertedIndex> {
    let mut index = InvertedIndex::with_idf(idf);
    for (doc_id, text) in corpus {
        index.ingest(doc_id, analyzer.terms(text))?;
    }
    index.finalize();
    tracing::info!(num_docs = index.total_documents(), num_terms = index.term_count(), "index build complete");
    Ok(index)
}
