//! Indexed lookup: read one scalar out of a [`CompactForm`] by path.
//!
//! With a search window over a sorted form the lookup is a binary search over
//! entry paths; otherwise it scans every entry. Neither path deserializes the
//! buffer.

use std::cmp::Ordering;
use std::ops::Range;

use crate::compact::{CompactForm, Scalar};
use crate::error::Result;

impl CompactForm {
    /// Find the scalar stored under `path`.
    ///
    /// `window` is a half-open entry index range known to contain every entry
    /// that could match. A window of fewer than two entries, or an unsorted
    /// form, is scanned linearly instead.
    ///
    /// ```
    /// use jtree_core::Value;
    ///
    /// let form = Value::from_json(r#"{"a":{"b":1,"c":"x"}}"#).unwrap().to_compact().unwrap();
    /// assert_eq!(form.lookup_text("a/b", Some(0..form.len())).unwrap(), Some("1"));
    /// assert_eq!(form.lookup_text("a/d", None).unwrap(), None);
    /// ```
    pub fn lookup(&self, path: &str, window: Option<Range<usize>>) -> Result<Option<Scalar<'_>>> {
        match window {
            Some(window) => {
                let window = window.start.min(self.len())..window.end.min(self.len());
                if self.is_sorted() && window.len() > 1 {
                    self.binary_search(path, window)
                } else {
                    self.linear_scan(path, window)
                }
            }
            None => self.linear_scan(path, 0..self.len()),
        }
    }

    /// [`CompactForm::lookup`], returning the scalar's text.
    pub fn lookup_text(&self, path: &str, window: Option<Range<usize>>) -> Result<Option<&str>> {
        Ok(self.lookup(path, window)?.map(|scalar| scalar.text()))
    }

    /// Index range of all entries whose path starts with `prefix`.
    ///
    /// Requires a sorted form; an unsorted one yields `None`.
    pub fn prefix_range(&self, prefix: &str) -> Result<Option<Range<usize>>> {
        if !self.is_sorted() {
            return Ok(None);
        }
        let mut start = None;
        for index in 0..self.len() {
            let path = self.path_at(index)?;
            match (start, path.starts_with(prefix)) {
                (None, true) => start = Some(index),
                (Some(start), false) => return Ok(Some(start..index)),
                _ => {}
            }
        }
        Ok(start.map(|start| start..self.len()))
    }

    fn binary_search(&self, path: &str, window: Range<usize>) -> Result<Option<Scalar<'_>>> {
        let (mut low, mut high) = (window.start, window.end);
        while low < high {
            let mid = low + (high - low) / 2;
            let entry = self.entry(mid)?;
            match entry.path.cmp(path) {
                Ordering::Equal => return Ok(Some(entry.scalar)),
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid,
            }
        }
        Ok(None)
    }

    fn linear_scan(&self, path: &str, window: Range<usize>) -> Result<Option<Scalar<'_>>> {
        for index in window {
            if self.path_at(index)? == path {
                return Ok(Some(self.entry(index)?.scalar));
            }
        }
        Ok(None)
    }
}
