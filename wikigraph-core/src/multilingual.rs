//! Multilingual and monolingual text values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

/// A locale code such as `ko`, `en_GB` or `zh_Hant`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    /// Wrap a code verbatim, without normalization.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Parse and normalize a language tag (`zh-hant` becomes `zh_Hant`,
    /// `en-gb` becomes `en_GB`).
    ///
    /// The language subtag must be two or three letters (`ko`, `fil`, `yue`).
    /// Codes with an unrecognized subtag (e.g. `cbk-zam`) yield `None`.
    pub fn parse(code: &str) -> Option<Self> {
        let normalized = code.replace('-', "_");
        let mut parts = normalized.split('_');
        let language = parts.next()?;
        let alphabetic = language.chars().all(|c| c.is_ascii_alphabetic());
        if !(2..=3).contains(&language.len()) || !alphabetic {
            return None;
        }
        let mut out = language.to_ascii_lowercase();
        for subtag in parts {
            let alpha = subtag.chars().all(|c| c.is_ascii_alphabetic());
            let normalized_subtag = match subtag.len() {
                2 if alpha => subtag.to_ascii_uppercase(),
                3 if subtag.chars().all(|c| c.is_ascii_digit()) => subtag.to_string(),
                4 if alpha => {
                    let lower = subtag.to_ascii_lowercase();
                    let mut chars = lower.chars();
                    let first = chars.next()?.to_ascii_uppercase();
                    std::iter::once(first).chain(chars).collect()
                }
                5..=8 if subtag.chars().all(|c| c.is_ascii_alphanumeric()) => {
                    subtag.to_ascii_uppercase()
                }
                _ => return None,
            };
            out.push('_');
            out.push_str(&normalized_subtag);
        }
        Some(Self(out))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

// ============================================================================
// MONOLINGUAL TEXT
// ============================================================================

/// Text tagged with the language it is written in. Derefs to `str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonolingualText {
    pub text: String,
    pub locale: Locale,
}

impl MonolingualText {
    pub fn new(text: impl Into<String>, locale: impl Into<Locale>) -> Self {
        Self {
            text: text.into(),
            locale: locale.into(),
        }
    }
}

impl Deref for MonolingualText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for MonolingualText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:) {}", self.locale, self.text)
    }
}

// ============================================================================
// MULTILINGUAL TEXT
// ============================================================================

/// The same text in several locales, e.g. an entity's labels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultilingualText {
    texts: BTreeMap<Locale, String>,
}

impl MultilingualText {
    pub fn new<L, T>(texts: impl IntoIterator<Item = (L, T)>) -> Self
    where
        L: Into<Locale>,
        T: Into<String>,
    {
        Self {
            texts: texts
                .into_iter()
                .map(|(l, t)| (l.into(), t.into()))
                .collect(),
        }
    }

    /// Build from a raw `{code: {language, value}}` record, normalizing each
    /// `language` and silently dropping entries whose code does not parse.
    pub fn from_terms(raw: Option<&Value>) -> Self {
        let Some(terms) = raw.and_then(Value::as_object) else {
            return Self::default();
        };
        let texts = terms
            .values()
            .filter_map(|term| {
                let language = term.get("language")?.as_str()?;
                let value = term.get("value")?.as_str()?;
                Some((Locale::parse(language)?, value.to_string()))
            })
            .collect();
        Self { texts }
    }

    pub fn get(&self, locale: impl AsRef<str>) -> Option<&str> {
        self.texts
            .get(&Locale::new(locale.as_ref()))
            .map(String::as_str)
    }

    pub fn contains(&self, locale: impl AsRef<str>) -> bool {
        self.get(locale).is_some()
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Locale, &str)> {
        self.texts.iter().map(|(l, t)| (l, t.as_str()))
    }
}

impl fmt::Display for MultilingualText {
    /// English if present, then any English variant, else the last text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.get("en") {
            return f.write_str(text);
        }
        if let Some((_, text)) = self
            .texts
            .iter()
            .find(|(locale, _)| locale.as_str().starts_with("en_"))
        {
            return f.write_str(text);
        }
        match self.texts.values().next_back() {
            Some(text) => f.write_str(text),
            None => Ok(()),
        }
    }
}
