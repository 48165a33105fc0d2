// src/corpus.rs
//! Question/answer corpus: loading from a directory of documents and an
//! in-memory index with per-question precomputed keys.
//!
//! Accepted documents (scanned recursively, file-name order):
//! - `.yml` / `.yaml` with a `conversations:` list; each conversation is a list
//!   of ≥2 scalars, first = question, rest joined with spaces = answer.
//! - `.json` with a `general_queries:` list of `{ "query", "response" }` objects.
//!
//! Malformed documents or items are skipped with a warning.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::text::{extract_keywords, normalize, sorted_tokens};

/// One corpus fact. Identity is its position in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
}

impl QaEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Keys derived from a question once, at index build time.
#[derive(Debug, Clone)]
pub struct IndexedQuestion {
    pub normalized: String,
    pub keywords: BTreeSet<String>,
    pub sorted_tokens: String,
}

/// Ordered, read-only corpus. `entries.len() == keys.len()` always holds.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    entries: Vec<QaEntry>,
    keys: Vec<IndexedQuestion>,
}

impl CorpusIndex {
    pub fn new(entries: Vec<QaEntry>) -> Self {
        let keys = entries
            .iter()
            .map(|e| {
                let normalized = normalize(&e.question);
                IndexedQuestion {
                    keywords: extract_keywords(&normalized),
                    sorted_tokens: sorted_tokens(&normalized),
                    normalized,
                }
            })
            .collect();
        Self { entries, keys }
    }

    /// Scan `dir` recursively. A missing directory yields an empty index.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        if !dir.exists() {
            warn!(path = %dir.display(), "corpus directory not found, corpus is empty");
            return Self::default();
        }

        let mut entries = Vec::new();
        let mut docs = 0usize;
        for item in WalkDir::new(dir).sort_by_file_name() {
            let item = match item {
                Ok(i) => i,
                Err(e) => {
                    warn!(error = %e, "corpus: unreadable directory entry skipped");
                    continue;
                }
            };
            if !item.file_type().is_file() {
                continue;
            }
            let path = item.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase());
            let parsed = match ext.as_deref() {
                Some("yml") | Some("yaml") => read_doc(path, parse_yaml_doc),
                Some("json") => read_doc(path, parse_json_doc),
                _ => continue,
            };
            match parsed {
                Ok(mut found) => {
                    docs += 1;
                    entries.append(&mut found);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "corpus: document skipped"),
            }
        }

        info!(documents = docs, entries = entries.len(), "corpus loaded");
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, idx: usize) -> Option<&QaEntry> {
        self.entries.get(idx)
    }

    pub fn entries(&self) -> &[QaEntry] {
        &self.entries
    }

    pub fn key(&self, idx: usize) -> Option<&IndexedQuestion> {
        self.keys.get(idx)
    }

    /// `(index, entry, keys)` in load order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &QaEntry, &IndexedQuestion)> + '_ {
        self.entries
            .iter()
            .zip(self.keys.iter())
            .enumerate()
            .map(|(i, (e, k))| (i, e, k))
    }

    /// Distinct normalized tokens of all questions and answers.
    pub fn vocabulary(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for e in &self.entries {
            for text in [&e.question, &e.answer] {
                for tok in normalize(text).split(' ').filter(|t| !t.is_empty()) {
                    out.insert(tok.to_string());
                }
            }
        }
        out
    }
}

fn read_doc(path: &Path, parse: fn(&str) -> Result<Vec<QaEntry>>) -> Result<Vec<QaEntry>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse(&content)
}

/// Parse a YAML document with a `conversations` list.
pub fn parse_yaml_doc(content: &str) -> Result<Vec<QaEntry>> {
    let doc: serde_yaml::Value = serde_yaml::from_str(content).context("invalid YAML")?;
    let convs = doc
        .get("conversations")
        .and_then(|c| c.as_sequence())
        .context("missing `conversations` list")?;

    let mut out = Vec::with_capacity(convs.len());
    for (i, conv) in convs.iter().enumerate() {
        let Some(items) = conv.as_sequence() else {
            warn!(item = i, "corpus: conversation is not a list, skipped");
            continue;
        };
        let parts: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
        if parts.len() < 2 {
            warn!(item = i, "corpus: conversation needs a question and an answer, skipped");
            continue;
        }
        let question = parts[0].trim().to_string();
        let answer = parts[1..].join(" ").trim().to_string();
        if question.is_empty() || answer.is_empty() {
            continue;
        }
        out.push(QaEntry { question, answer });
    }
    Ok(out)
}

fn scalar_to_string(v: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Deserialize)]
struct JsonDoc {
    general_queries: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct JsonQuery {
    query: String,
    response: String,
}

/// Parse a JSON document with a `general_queries` list.
pub fn parse_json_doc(content: &str) -> Result<Vec<QaEntry>> {
    let doc: JsonDoc = serde_json::from_str(content).context("invalid JSON corpus document")?;
    let mut out = Vec::with_capacity(doc.general_queries.len());
    for (i, raw) in doc.general_queries.into_iter().enumerate() {
        match serde_json::from_value::<JsonQuery>(raw) {
            Ok(q) if !q.query.trim().is_empty() && !q.response.trim().is_empty() => {
                out.push(QaEntry::new(q.query.trim(), q.response.trim()));
            }
            Ok(_) => {}
            Err(e) => warn!(item = i, error = %e, "corpus: query skipped"),
        }
    }
    Ok(out)
}
