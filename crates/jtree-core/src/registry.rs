//! A registry of [`Translation`] contexts keyed by text domain.
//!
//! Most callers own a [`TranslationRegistry`] and pass it where needed. A
//! process-wide instance is available through [`global`] for code that cannot
//! thread one through.

use std::sync::{Mutex, OnceLock};

use crate::catalog::Translation;

/// Outcome of [`TranslationRegistry::register`].
#[derive(Debug)]
pub enum Registration {
    /// The domain was new.
    Added,
    /// An existing context for the domain was replaced and is returned.
    Replaced(Translation),
    /// The context had no domain; it is handed back unchanged.
    Rejected(Translation),
}

/// Translation contexts, at most one per domain.
#[derive(Debug, Default)]
pub struct TranslationRegistry {
    contexts: Vec<Translation>,
}

impl TranslationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `translation` under its domain, replacing any previous context for
    /// the same domain.
    pub fn register(&mut self, translation: Translation) -> Registration {
        let Some(domain) = translation.domain() else {
            tracing::warn!("translation context without domain not registered");
            return Registration::Rejected(translation);
        };
        match self.position(domain) {
            Some(pos) => {
                tracing::debug!(domain, "replacing translation context");
                Registration::Replaced(std::mem::replace(&mut self.contexts[pos], translation))
            }
            None => {
                tracing::debug!(domain, "registering translation context");
                self.contexts.push(translation);
                Registration::Added
            }
        }
    }

    pub fn get(&self, domain: &str) -> Option<&Translation> {
        self.position(domain).map(|pos| &self.contexts[pos])
    }

    pub fn get_mut(&mut self, domain: &str) -> Option<&mut Translation> {
        self.position(domain).map(|pos| &mut self.contexts[pos])
    }

    /// Remove and return the context for `domain`.
    pub fn unregister(&mut self, domain: &str) -> Option<Translation> {
        let pos = self.position(domain)?;
        Some(self.contexts.remove(pos))
    }

    /// Switch every registered context to `loc`, returning the locale that
    /// was active on the first one.
    pub fn set_locale_all(&mut self, loc: &str) -> Option<String> {
        let previous = self.contexts.first().map(|t| t.loc().to_string());
        for translation in &mut self.contexts {
            translation.set_locale(loc);
        }
        previous
    }

    /// Drop every registered context.
    pub fn release_all(&mut self) {
        tracing::debug!(count = self.contexts.len(), "releasing translation contexts");
        self.contexts.clear();
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.contexts.iter().filter_map(Translation::domain)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    fn position(&self, domain: &str) -> Option<usize> {
        self.contexts.iter().position(|t| t.domain() == Some(domain))
    }
}

/// The opt-in process-wide registry.
pub fn global() -> &'static Mutex<TranslationRegistry> {
    static GLOBAL: OnceLock<Mutex<TranslationRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| Mutex::new(TranslationRegistry::new()))
}
