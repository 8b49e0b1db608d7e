//! File-backed shortcut catalog.
//!
//! A single JSON document maps namespace names to shortcut tables:
//!
//! ```json
//! {
//!   "de": {
//!     "w 1": { "title": "Wikipedia (de)", "url": "https://de.wikipedia.org/wiki/<query>" }
//!   },
//!   "o": { "cheat 0": { "title": "Cheat sheet" } }
//! }
//! ```
//!
//! Match-keys are `"{keyword} {argc}"` so the same keyword can dispatch on
//! argument count. URL templates carry `<name>` placeholders substituted with
//! percent-encoded arguments at resolution time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{QueryEngine, Resolution, SearchEntry, SearchResults};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z0-9_-]+)>").expect("placeholder pattern is valid"));

/// Errors loading the catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse catalog at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct Shortcut {
    title: String,
    #[serde(default)]
    url: Option<String>,
}

/// Namespace name to match-key to shortcut.
type CatalogDoc = BTreeMap<String, BTreeMap<String, Shortcut>>;

#[derive(Debug)]
pub struct CatalogEngine {
    doc: CatalogDoc,
    /// Namespace precedence used by `process` (search receives its own list
    /// per call).
    precedence: Vec<String>,
}

impl CatalogEngine {
    pub fn from_file(path: &Path, precedence: Vec<String>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: CatalogDoc =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(
            path = %path.display(),
            namespaces = doc.len(),
            "catalog_loaded"
        );
        Ok(Self { doc, precedence })
    }
}

impl QueryEngine for CatalogEngine {
    async fn process(&self, query: &str) -> Result<Resolution> {
        let Some((keyword, args)) = split_query(query) else {
            return Ok(Resolution::NotFound {
                reason: "empty query".to_string(),
            });
        };

        let key = format!("{keyword} {}", args.len());
        for namespace in &self.precedence {
            let Some(shortcuts) = self.doc.get(namespace) else {
                continue;
            };
            if let Some(shortcut) = shortcuts.get(&key) {
                debug!(
                    namespace = namespace.as_str(),
                    key = key.as_str(),
                    "shortcut_hit"
                );
                let url = shortcut.url.as_deref().map(|t| substitute(t, &args));
                return Ok(Resolution::Resolved { url });
            }
        }

        Ok(Resolution::NotFound {
            reason: format!("no shortcut matches `{key}`"),
        })
    }

    async fn search(
        &self,
        query: &str,
        _language: &str,
        namespaces: &[String],
    ) -> Result<SearchResults> {
        let needle = query.trim().to_lowercase();
        let mut results = SearchResults::new();
        if needle.is_empty() {
            return Ok(results);
        }

        // Earlier namespaces win for duplicate match-keys.
        for namespace in namespaces {
            let Some(shortcuts) = self.doc.get(namespace) else {
                continue;
            };
            for (key, shortcut) in shortcuts {
                if key.starts_with(&needle) || shortcut.title.to_lowercase().contains(&needle) {
                    results.entry(key.clone()).or_insert_with(|| SearchEntry {
                        title: shortcut.title.clone(),
                        url: shortcut.url.clone(),
                    });
                }
            }
        }

        Ok(results)
    }

    fn placeholder_names(&self, url_template: &str) -> Vec<String> {
        let mut names = Vec::new();
        for caps in PLACEHOLDER.captures_iter(url_template) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Split a raw query into a lowercased keyword and its comma-separated
/// arguments. `"gd Berlin, Hamburg"` yields `("gd", ["Berlin", "Hamburg"])`.
fn split_query(query: &str) -> Option<(String, Vec<String>)> {
    let trimmed = query.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let keyword = parts.next().filter(|k| !k.is_empty())?.to_lowercase();
    let args = match parts.next() {
        Some(rest) => rest
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };
    Some((keyword, args))
}

/// Replace `<name>` placeholders in template order with percent-encoded
/// arguments. Surplus placeholders are dropped; lookup by argument count
/// means the counts normally match.
fn substitute(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for (i, caps) in PLACEHOLDER.captures_iter(template).enumerate() {
        let matched = caps.get(0).expect("capture 0 always present");
        out.push_str(&template[last..matched.start()]);
        if let Some(arg) = args.get(i) {
            out.push_str(&urlencoding::encode(arg));
        }
        last = matched.end();
    }
    out.push_str(&template[last..]);
    out
}
