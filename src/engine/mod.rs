//! Query engine contract.
//!
//! The controller talks to shortcut resolution through this narrow seam: two
//! asynchronous operations and one pure function. Tests substitute a
//! scripted fake; the binary wires up the file-backed [`CatalogEngine`].

pub mod catalog;

use std::collections::BTreeMap;
use std::future::Future;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use catalog::CatalogEngine;

/// Outcome of fully resolving a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The engine recognized the query. `url` is absent for informational
    /// shortcuts with no navigable target.
    Resolved { url: Option<String> },
    /// The engine could not resolve the query.
    NotFound { reason: String },
}

/// One candidate match in a search result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Match-key (keyword plus disambiguating suffix) to entry. The map is
/// ordered so the result list renders in lexicographic key order.
pub type SearchResults = BTreeMap<String, SearchEntry>;

pub trait QueryEngine: Send + Sync + 'static {
    /// Resolve `query` to a navigable target.
    fn process(&self, query: &str) -> impl Future<Output = Result<Resolution>> + Send;

    /// Partial matches for incremental input, searched across `namespaces`
    /// in precedence order.
    fn search(
        &self,
        query: &str,
        language: &str,
        namespaces: &[String],
    ) -> impl Future<Output = Result<SearchResults>> + Send;

    /// Names of the argument placeholders embedded in a URL template, in
    /// template order.
    fn placeholder_names(&self, url_template: &str) -> Vec<String>;
}
