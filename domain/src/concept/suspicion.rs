//! Keyword heuristics flagging concept selections for supervisor review.

use crate::core::text::normalize_label;
use serde::{Deserialize, Serialize};

/// Deterministic keyword filter over selected row label paths.
///
/// A selection is suspicious when any selected row
/// - has a last label containing a `denylist` term,
/// - lacks every `required` term along its whole path (when `required` is
///   non-empty), or
/// - contains a `gray_list` term without any `redeemers` term.
///
/// Labels are compared lower-cased with hyphens replaced by spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspicionFilter {
    pub denylist: Vec<String>,
    pub required: Vec<String>,
    pub gray_list: Vec<String>,
    pub redeemers: Vec<String>,
}

impl SuspicionFilter {
    pub fn current_cash_position() -> Self {
        Self {
            denylist: terms(&["escrow", "inventor", "receivable", "tax", "total"]),
            required: terms(&["current"]),
            ..Default::default()
        }
    }

    pub fn long_term_debt() -> Self {
        Self {
            denylist: terms(&["tax", "total"]),
            gray_list: terms(&["current", "short term"]),
            redeemers: terms(&["non current", "long term", "term debt"]),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.denylist.is_empty() && self.required.is_empty() && self.gray_list.is_empty()
    }

    /// Whether a single label path trips the filter.
    pub fn is_suspicious_path(&self, path: &[String]) -> bool {
        let labels: Vec<String> = path.iter().map(|label| normalize_label(label)).collect();
        let Some(last) = labels.last() else {
            return false;
        };
        let contains_any = |text: &str, list: &[String]| {
            list.iter().any(|term| text.contains(&normalize_label(term)))
        };

        if contains_any(last, &self.denylist) {
            return true;
        }
        if !self.required.is_empty()
            && !labels.iter().any(|label| contains_any(label, &self.required))
        {
            return true;
        }
        labels.iter().any(|label| contains_any(label, &self.gray_list))
            && !labels.iter().any(|label| contains_any(label, &self.redeemers))
    }

    /// Selected indices whose label paths trip the filter.
    ///
    /// `paths` is indexed by row index; unknown indices are ignored.
    pub fn suspicious_items<'a, I>(&self, items: I, paths: &[Vec<String>]) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a usize>,
    {
        items
            .into_iter()
            .copied()
            .filter(|&index| {
                paths
                    .get(index)
                    .is_some_and(|path| self.is_suspicious_path(path))
            })
            .collect()
    }

    /// Whether any selected row trips the filter. An empty selection never does.
    pub fn is_suspicious<'a, I>(&self, items: I, paths: &[Vec<String>]) -> bool
    where
        I: IntoIterator<Item = &'a usize>,
    {
        !self.suspicious_items(items, paths).is_empty()
    }
}

fn terms(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| word.to_string()).collect()
}
