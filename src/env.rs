//! Locale and namespace resolution.
//!
//! The locale is derived once at startup: explicit parameter overrides win,
//! then the ambient POSIX locale (`LC_ALL`, then `LANG`), then a hardcoded
//! fallback. There are no failure modes; a usable locale always comes out.

use std::collections::HashMap;

use tracing::info;

use crate::params::{PARAM_COUNTRY, PARAM_LANGUAGE};

pub const FALLBACK_LANGUAGE: &str = "de";
pub const FALLBACK_COUNTRY: &str = "de";

/// The catch-all namespace searched after the country- and language-specific
/// ones.
pub const CATCHALL_NAMESPACE: &str = "o";

/// Language and country codes, lowercased, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    language: String,
    country: String,
}

impl Locale {
    /// Resolve from explicit overrides, the ambient locale, or the fallback,
    /// in that order per field.
    pub fn resolve(overrides: &HashMap<String, String>) -> Self {
        Self::from_parts(overrides, ambient_locale().as_deref())
    }

    fn from_parts(overrides: &HashMap<String, String>, ambient: Option<&str>) -> Self {
        let (ambient_language, ambient_country) =
            ambient.map(split_ambient).unwrap_or((None, None));
        let language = overrides
            .get(PARAM_LANGUAGE)
            .map(|v| v.to_lowercase())
            .or(ambient_language)
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string());
        let country = overrides
            .get(PARAM_COUNTRY)
            .map(|v| v.to_lowercase())
            .or(ambient_country)
            .unwrap_or_else(|| FALLBACK_COUNTRY.to_string());
        info!(
            language = language.as_str(),
            country = country.as_str(),
            "environment_initialized"
        );
        Self { language, country }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Namespace precedence: country-specific, then language-specific, then
    /// the catch-all. First entry has highest priority.
    pub fn namespaces(&self) -> Vec<String> {
        vec![
            format!(".{}", self.country),
            self.language.clone(),
            CATCHALL_NAMESPACE.to_string(),
        ]
    }
}

/// First non-empty of `LC_ALL` and `LANG`. The `C`/`POSIX` locales carry no
/// language information and count as absent.
fn ambient_locale() -> Option<String> {
    ["LC_ALL", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| {
            let base = value.split('.').next().unwrap_or(value);
            !base.is_empty() && base != "C" && base != "POSIX"
        })
}

/// Split `de_DE.UTF-8` / `pt-BR` into lowercased language and country parts.
fn split_ambient(raw: &str) -> (Option<String>, Option<String>) {
    let base = raw.split('.').next().unwrap_or(raw);
    let mut parts = base.splitn(2, ['_', '-']);
    let language = parts
        .next()
        .filter(|p| !p.is_empty())
        .map(str::to_lowercase);
    let country = parts
        .next()
        .filter(|p| !p.is_empty())
        .map(str::to_lowercase);
    (language, country)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::Locale;

    fn overrides(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn overrides_win_and_are_lowercased() {
        let locale = Locale::from_parts(
            &overrides(&[("country", "AT"), ("language", "EN")]),
            Some("pt_BR.UTF-8"),
        );
        assert_eq!(locale.language(), "en");
        assert_eq!(locale.country(), "at");
    }

    #[test]
    fn ambient_locale_fills_missing_fields() {
        let locale = Locale::from_parts(&HashMap::new(), Some("pt_BR.UTF-8"));
        assert_eq!(locale.language(), "pt");
        assert_eq!(locale.country(), "br");

        let partial = Locale::from_parts(&overrides(&[("country", "ch")]), Some("fr-FR"));
        assert_eq!(partial.language(), "fr");
        assert_eq!(partial.country(), "ch");
    }

    #[test]
    fn malformed_ambient_falls_back() {
        let locale = Locale::from_parts(&HashMap::new(), None);
        assert_eq!(locale.language(), "de");
        assert_eq!(locale.country(), "de");

        let bare = Locale::from_parts(&HashMap::new(), Some("pt"));
        assert_eq!(bare.language(), "pt");
        assert_eq!(bare.country(), "de");
    }

    #[test]
    fn namespace_precedence_is_country_language_catchall() {
        let locale = Locale::from_parts(&HashMap::new(), Some("pt_BR"));
        assert_eq!(locale.namespaces(), vec![".br", "pt", "o"]);
    }
}
