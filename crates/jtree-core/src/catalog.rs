//! Translation catalogs: `locale -> key -> text` lookups with fallback.
//!
//! A catalog is a tree or compact form whose paths look like
//! `<prefix>/<locale>/<escaped-key>`. A [`Translation`] binds a catalog to a
//! locale and resolves keys in this order:
//!
//! 1. the locale exactly as given,
//! 2. `language_COUNTRY`,
//! 3. the bare `language`,
//! 4. any section whose name starts with the language.
//!
//! Unresolved keys come back unchanged. The pseudo-locale `back` runs the
//! other way, from translated text back to its key.
//!
//! # Key design decisions
//!
//! - **Search window**: when exactly one section name starts with the locale's
//!   language and the catalog is a sorted compact form, that section's entry
//!   range is computed once in [`Translation::set_locale`] and every lookup is
//!   a binary search inside it. More than one matching section disables the
//!   window and the full fallback chain runs with linear scans.
//! - **Bounded reverse memo**: reverse lookups are cached, and the cache is
//!   dropped wholesale once it holds [`REVERSE_CACHE_LIMIT`] entries.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use crate::compact::{CompactForm, Scalar};
use crate::enumerate::PathFilter;
use crate::path::{escape_key, last_segment, path_match, unescape_key, MatchMode};
use crate::value::Value;

/// Section prefix used when none is given.
pub const DEFAULT_PREFIX: &str = "translations";
/// Pseudo-locale selecting reverse translation.
pub const REVERSE_LOCALE: &str = "back";
/// Reverse-memo size at which the memo is cleared.
pub const REVERSE_CACHE_LIMIT: usize = 256;

/// A POSIX-style locale name reduced to language and country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    /// Parse `ll`, `ll_CC`, `ll-CC`, with optional `.charset` and `@modifier`.
    ///
    /// The untranslated locales `""`, `C` and `POSIX` yield `None`.
    ///
    /// ```
    /// use jtree_core::Locale;
    ///
    /// let loc = Locale::parse("de_AT.UTF-8@euro").unwrap();
    /// assert_eq!(loc.language(), "de");
    /// assert_eq!(loc.country(), Some("AT"));
    /// assert_eq!(loc.to_string(), "de_AT");
    /// assert!(Locale::parse("C").is_none());
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        let base = name.split(['.', '@']).next().unwrap_or_default();
        if base.is_empty() || base == "C" || base == "POSIX" {
            return None;
        }
        let (language, country) = match base.split_once(['_', '-']) {
            Some((language, country)) => (language, Some(country)),
            None => (base, None),
        };
        if language.is_empty() {
            return None;
        }
        Some(Self {
            language: language.to_string(),
            country: country.filter(|c| !c.is_empty()).map(str::to_string),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{}", self.language, country),
            None => f.write_str(&self.language),
        }
    }
}

/// Catalog storage: a live tree or a compact form.
#[derive(Debug, Clone)]
pub enum Catalog {
    Tree(Value),
    Compact(CompactForm),
}

impl Catalog {
    /// Names of the sections below `prefix`, in storage order.
    pub fn sections(&self, prefix: &str) -> Vec<String> {
        match self {
            Catalog::Tree(root) => match root.get(prefix) {
                Some(Value::Object(members)) => members
                    .iter()
                    .map(|(key, _)| escape_key(key).into_owned())
                    .collect(),
                _ => Vec::new(),
            },
            Catalog::Compact(form) => {
                let mut sections: Vec<String> = Vec::new();
                for (section, _, _) in compact_entries(form, prefix) {
                    if !sections.iter().any(|s| s == section) {
                        sections.push(section.to_string());
                    }
                }
                sections
            }
        }
    }

    /// String stored at `path`; numbers and other kinds do not count.
    fn text(&self, path: &str, window: Option<Range<usize>>) -> Option<&str> {
        match self {
            Catalog::Tree(root) => root.get(path).and_then(Value::as_str),
            Catalog::Compact(form) => match form.lookup(path, window) {
                Ok(Some(Scalar::String(text))) => Some(text),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(path, error = %e, "catalog read failed");
                    None
                }
            },
        }
    }

    /// Walk every `(section, escaped key, text)` triple below `prefix`.
    fn for_each_text<'a>(
        &'a self,
        prefix: &str,
        mut f: impl FnMut(&str, &str, &'a str) -> bool,
    ) -> bool {
        match self {
            Catalog::Tree(root) => {
                let Some(Value::Object(sections)) = root.get(prefix) else {
                    return false;
                };
                for (section, entries) in sections {
                    let Value::Object(entries) = entries else {
                        continue;
                    };
                    for (key, value) in entries {
                        if let Some(text) = value.as_str() {
                            if f(&escape_key(section), &escape_key(key), text) {
                                return true;
                            }
                        }
                    }
                }
                false
            }
            Catalog::Compact(form) => {
                for (section, key, scalar) in compact_entries(form, prefix) {
                    if let Scalar::String(text) = scalar {
                        if f(section, key, text) {
                            return true;
                        }
                    }
                }
                false
            }
        }
    }
}

impl From<Value> for Catalog {
    fn from(root: Value) -> Self {
        Catalog::Tree(root)
    }
}

impl From<CompactForm> for Catalog {
    fn from(form: CompactForm) -> Self {
        Catalog::Compact(form)
    }
}

/// `(section, escaped key, scalar)` for each compact entry below `prefix`;
/// unreadable entries are logged and skipped.
fn compact_entries<'a>(
    form: &'a CompactForm,
    prefix: &str,
) -> impl Iterator<Item = (&'a str, &'a str, Scalar<'a>)> + 'a {
    let below = format!("{prefix}/");
    form.entries().filter_map(move |entry| {
        let entry = entry
            .map_err(|e| tracing::warn!(error = %e, "skipping unreadable catalog entry"))
            .ok()?;
        let rest = entry.path.strip_prefix(below.as_str())?;
        let (section, key) = rest.split_once('/')?;
        Some((section, key, entry.scalar))
    })
}

/// Behaviour switches for a [`Translation`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateFlags {
    /// Log every resolved and unresolved key at info level.
    pub observe: bool,
    /// Never compute a search window; always use the fallback chain.
    pub no_optimise: bool,
}

/// Where lookups for the current locale are allowed to look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Window {
    /// Run the whole fallback chain.
    Full,
    /// Binary search inside one section's entry range.
    Range { section: String, entries: Range<usize> },
    /// No section serves this language; every key passes through.
    Unsupported,
}

/// A catalog bound to a locale and an optional text domain.
#[derive(Debug)]
pub struct Translation {
    loc: String,
    locale: Option<Locale>,
    domain: Option<String>,
    catalog: Catalog,
    prefix: String,
    window: Window,
    flags: TranslateFlags,
    reverse: RefCell<HashMap<String, String>>,
}

impl Translation {
    pub fn new(
        loc: &str,
        domain: Option<&str>,
        catalog: impl Into<Catalog>,
        flags: TranslateFlags,
    ) -> Self {
        let mut translation = Self {
            loc: String::new(),
            locale: None,
            domain: domain.map(str::to_string),
            catalog: catalog.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            window: Window::Full,
            flags,
            reverse: RefCell::new(HashMap::new()),
        };
        translation.set_locale(loc);
        translation
    }

    /// Use a different section prefix, such as `org/freedesktop/oyjl/translations`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_end_matches('/').to_string();
        let loc = std::mem::take(&mut self.loc);
        self.set_locale(&loc);
        self
    }

    /// Switch locale and recompute the search window.
    pub fn set_locale(&mut self, loc: &str) {
        self.loc = loc.to_string();
        self.locale = Locale::parse(loc);
        self.reverse.borrow_mut().clear();
        self.window = self.compute_window();
        tracing::debug!(
            loc,
            domain = self.domain.as_deref().unwrap_or(""),
            window = ?self.window,
            "translation locale set"
        );
    }

    pub fn loc(&self) -> &str {
        &self.loc
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn flags(&self) -> TranslateFlags {
        self.flags
    }

    fn compute_window(&self) -> Window {
        let Some(locale) = self.locale.as_ref().filter(|_| self.loc != REVERSE_LOCALE) else {
            return Window::Full;
        };
        let matching: Vec<String> = self
            .catalog
            .sections(&self.prefix)
            .into_iter()
            .filter(|section| serves_language(section, locale.language()))
            .collect();
        match (matching.as_slice(), &self.catalog) {
            ([], _) => Window::Unsupported,
            ([section], Catalog::Compact(form)) if !self.flags.no_optimise => {
                match form.prefix_range(&format!("{}/{}/", self.prefix, section)) {
                    Ok(Some(entries)) => Window::Range {
                        section: section.clone(),
                        entries,
                    },
                    Ok(None) => Window::Full,
                    Err(e) => {
                        tracing::warn!(error = %e, "search window unavailable");
                        Window::Full
                    }
                }
            }
            _ => Window::Full,
        }
    }

    /// Translate `text`, returning it unchanged when no entry resolves.
    ///
    /// ```
    /// use jtree_core::{Translation, TranslateFlags, Value};
    ///
    /// let catalog = Value::from_json(
    ///     r#"{"translations":{"de":{"Hello":"Hallo"},"de_DE":{"Hello":"Guten Tag"}}}"#,
    /// ).unwrap();
    /// let tr = Translation::new("de_AT", None, catalog, TranslateFlags::default());
    /// assert_eq!(tr.translate("Hello"), "Hallo");
    /// assert_eq!(tr.translate("Bye"), "Bye");
    /// ```
    pub fn translate(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let found = if self.loc == REVERSE_LOCALE {
            self.reverse_lookup(text)
        } else {
            self.forward_lookup(text).map(str::to_string)
        };
        if self.flags.observe {
            tracing::info!(loc = %self.loc, text, found = found.as_deref(), "translate");
        }
        found.unwrap_or_else(|| text.to_string())
    }

    fn forward_lookup(&self, text: &str) -> Option<&str> {
        let locale = self.locale.as_ref()?;
        let key = escape_key(text);
        match &self.window {
            Window::Unsupported => None,
            Window::Range { section, entries } => self.catalog.text(
                &format!("{}/{}/{}", self.prefix, section, key),
                Some(entries.clone()),
            ),
            Window::Full => {
                let mut candidates = vec![self.loc.clone(), locale.to_string()];
                candidates.push(locale.language().to_string());
                candidates.dedup();
                for section in &candidates {
                    let path = format!("{}/{}/{}", self.prefix, escape_key(section), key);
                    if let Some(found) = self.catalog.text(&path, None) {
                        return Some(found);
                    }
                }
                let mut found = None;
                self.catalog.for_each_text(&self.prefix, |section, entry_key, value| {
                    if serves_language(section, locale.language()) && unescape_key(entry_key) == text {
                        found = Some(value);
                        return true;
                    }
                    false
                });
                found
            }
        }
    }

    fn reverse_lookup(&self, text: &str) -> Option<String> {
        if let Some(key) = self.reverse.borrow().get(text) {
            return Some(key.clone());
        }
        let mut found = None;
        self.catalog.for_each_text(&self.prefix, |_, entry_key, value| {
            if value == text {
                found = Some(unescape_key(entry_key).into_owned());
                return true;
            }
            false
        });
        let key = found?;
        let mut memo = self.reverse.borrow_mut();
        if memo.len() >= REVERSE_CACHE_LIMIT {
            memo.clear();
        }
        memo.insert(text.to_string(), key.clone());
        Some(key)
    }
}

/// Whether a catalog section can hold texts for `language`. The search window
/// and the section scan both go through this.
fn serves_language(section: &str, language: &str) -> bool {
    section.starts_with(language)
}

/// Translate string leaves of `root` whose final path term names one of
/// `keys`. Returns how many leaves changed.
pub fn translate_json(root: &mut Value, translation: &Translation, keys: &[&str]) -> usize {
    let mut changed = 0;
    for path in root.to_paths(0, PathFilter::Leaves) {
        let wanted = keys
            .iter()
            .any(|key| path_match(&path, &escape_key(key), MatchMode::LastSegment));
        if !wanted {
            continue;
        }
        let Some(node) = root.get_mut(&path) else {
            continue;
        };
        let Some(text) = node.as_str() else {
            continue;
        };
        let translated = translation.translate(text);
        if translated != text {
            tracing::trace!(path = %path, key = last_segment(&path), "translated leaf");
            node.set_string(translated);
            changed += 1;
        }
    }
    changed
}
