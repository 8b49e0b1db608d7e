//! Shared test helpers: a scripted fake engine, recording surface and
//! navigator, env guards, and catalog fixtures.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc::UnboundedReceiver;

use shortcut_search::controller::{ControllerMsg, SuggestionRow, Surface};
use shortcut_search::engine::{QueryEngine, Resolution, SearchEntry, SearchResults};
use shortcut_search::env::Locale;
use shortcut_search::navigate::Navigator;

/// Scripted resolution outcome for [`FakeEngine::with_resolution`].
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Scripted {
    Resolved(Option<String>),
    NotFound,
    Error,
}

/// Engine double with per-query scripted delays and outcomes. Delays are
/// virtual time, driven by the paused tokio clock.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct FakeEngine {
    search_script: HashMap<String, (Duration, SearchResults)>,
    process_script: HashMap<String, (Duration, Scripted)>,
    pub search_calls: Mutex<Vec<String>>,
    pub process_calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, delay: Duration, results: SearchResults) -> Self {
        self.search_script
            .insert(query.to_string(), (delay, results));
        self
    }

    pub fn with_resolution(mut self, query: &str, delay: Duration, outcome: Scripted) -> Self {
        self.process_script
            .insert(query.to_string(), (delay, outcome));
        self
    }
}

impl QueryEngine for FakeEngine {
    async fn process(&self, query: &str) -> Result<Resolution> {
        self.process_calls.lock().unwrap().push(query.to_string());
        let (delay, outcome) = self
            .process_script
            .get(query)
            .cloned()
            .unwrap_or((Duration::ZERO, Scripted::NotFound));
        tokio::time::sleep(delay).await;
        match outcome {
            Scripted::Resolved(url) => Ok(Resolution::Resolved { url }),
            Scripted::NotFound => Ok(Resolution::NotFound {
                reason: "scripted miss".to_string(),
            }),
            Scripted::Error => Err(anyhow!("scripted engine failure")),
        }
    }

    async fn search(
        &self,
        query: &str,
        _language: &str,
        _namespaces: &[String],
    ) -> Result<SearchResults> {
        self.search_calls.lock().unwrap().push(query.to_string());
        let (delay, results) = self.search_script.get(query).cloned().unwrap_or_default();
        tokio::time::sleep(delay).await;
        Ok(results)
    }

    fn placeholder_names(&self, url_template: &str) -> Vec<String> {
        url_template
            .split('<')
            .skip(1)
            .filter_map(|chunk| chunk.split_once('>').map(|(name, _)| name.to_string()))
            .collect()
    }
}

/// Records every surface update the controller makes.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct RecordingSurface {
    pub rows: Vec<SuggestionRow>,
    pub statuses: Vec<String>,
    pub clear_results_calls: usize,
    pub clear_input_calls: usize,
}

#[allow(dead_code)]
impl RecordingSurface {
    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(String::as_str)
    }

    pub fn keywords(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.keyword.as_str()).collect()
    }
}

impl Surface for RecordingSurface {
    fn show_results(&mut self, rows: Vec<SuggestionRow>) {
        self.rows = rows;
    }

    fn clear_results(&mut self) {
        self.rows.clear();
        self.clear_results_calls += 1;
    }

    fn set_status(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }

    fn clear_input(&mut self) {
        self.clear_input_calls += 1;
    }
}

#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct RecordingNavigator {
    pub replaced: Vec<String>,
    pub opened: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn replace(&mut self, url: &str) {
        self.replaced.push(url.to_string());
    }

    fn open_new(&mut self, url: &str) {
        self.opened.push(url.to_string());
    }
}

/// Deterministic locale for controller tests, independent of the ambient
/// environment.
#[allow(dead_code)]
pub fn test_locale() -> Locale {
    let overrides = HashMap::from([
        ("country".to_string(), "de".to_string()),
        ("language".to_string(), "de".to_string()),
    ]);
    Locale::resolve(&overrides)
}

#[allow(dead_code)]
pub fn entry(title: &str, url: Option<&str>) -> SearchEntry {
    SearchEntry {
        title: title.to_string(),
        url: url.map(str::to_string),
    }
}

#[allow(dead_code)]
pub fn results(entries: &[(&str, &str, Option<&str>)]) -> SearchResults {
    entries
        .iter()
        .map(|(key, title, url)| (key.to_string(), entry(title, *url)))
        .collect()
}

/// Let spawned tasks settle, then assert the controller channel is drained.
#[allow(dead_code)]
pub async fn assert_idle(rx: &mut UnboundedReceiver<ControllerMsg>) {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert!(
        rx.try_recv().is_err(),
        "expected no pending controller messages"
    );
}

/// RAII guard restoring an environment variable on drop.
#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    prev: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn set(key: &str, val: impl AsRef<str>) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::set_var(key, val.as_ref()) };
        Self {
            key: key.to_string(),
            prev,
        }
    }

    pub fn unset(key: &str) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::remove_var(key) };
        Self {
            key: key.to_string(),
            prev,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => unsafe { std::env::set_var(&self.key, v) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}

/// Write the standard catalog fixture and return its path.
#[allow(dead_code)]
pub fn write_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("shortcuts.json");
    let doc = serde_json::json!({
        ".de": {
            "w 1": {
                "title": "Wikipedia (de, country)",
                "url": "https://de.wikipedia.org/wiki/<query>"
            }
        },
        "de": {
            "w 1": {
                "title": "Wikipedia (de, language)",
                "url": "https://de.m.wikipedia.org/wiki/<query>"
            },
            "gd 2": {
                "title": "Google Directions",
                "url": "https://www.google.com/maps/dir/<from>/<to>"
            }
        },
        "o": {
            "w 1": {
                "title": "Wikipedia (en)",
                "url": "https://en.wikipedia.org/wiki/<query>"
            },
            "g 1": {
                "title": "Google",
                "url": "https://www.google.com/search?q=<query>"
            },
            "cheat 0": {
                "title": "Cheat sheet"
            }
        }
    });
    std::fs::write(&path, doc.to_string()).unwrap();
    path
}
