//! Line-prefix rules for paragraph reflow ("clean right margin").
//!
//! A rule pairs a pattern recognizing the prefix of a paragraph's first line
//! (a quote marker, a comment leader, a list bullet) with a pattern for the
//! prefix of its continuation lines and a template that turns the former
//! into the latter. The buffer only stores the rules; consumers that reflow
//! paragraphs query them through the methods here.

use std::ops::Deref;
use std::sync::Arc;

use regex::Regex;

use crate::error::Result;

/// One prefix rule.
#[derive(Clone, Debug)]
pub struct CrmRule {
    first: Regex,
    rest: Regex,
    replace: String,
}

impl CrmRule {
    /// Compile a rule.
    ///
    /// `replace` may refer to groups captured by `first` (`$1`, `${name}`).
    pub fn new(first: &str, rest: &str, replace: &str) -> Result<Self> {
        Ok(Self {
            first: Regex::new(first)?,
            rest: Regex::new(rest)?,
            replace: replace.to_string(),
        })
    }

    #[must_use]
    pub fn first(&self) -> &Regex {
        &self.first
    }

    #[must_use]
    pub fn rest(&self) -> &Regex {
        &self.rest
    }

    #[must_use]
    pub fn replace(&self) -> &str {
        &self.replace
    }
}

/// Prefix found at the start of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixMatch {
    /// Length of the prefix in bytes.
    pub len: usize,
    /// Rule whose first-line pattern matched; `None` for plain whitespace.
    pub rule: Option<usize>,
}

/// Ordered list of prefix rules.
#[derive(Clone, Debug, Default)]
pub struct CrmRuleList {
    rules: Vec<CrmRule>,
}

impl CrmRuleList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: CrmRule) {
        self.rules.push(rule);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CrmRule> {
        self.rules.get(index)
    }

    /// Find the prefix of `line`.
    ///
    /// If `hint` names a rule whose continuation pattern matches, that wins.
    /// Otherwise the longest first-line match is used, unless leading
    /// whitespace alone is at least as long.
    #[must_use]
    pub fn match_prefix(&self, line: &str, hint: Option<usize>) -> PrefixMatch {
        if let Some(rule) = hint.and_then(|i| self.rules.get(i)) {
            if let Some(m) = rule.rest.find(line).filter(|m| m.start() == 0) {
                return PrefixMatch {
                    len: m.end(),
                    rule: hint,
                };
            }
        }

        let mut best = PrefixMatch { len: 0, rule: None };
        for (i, rule) in self.rules.iter().enumerate() {
            if let Some(m) = rule.first.find(line) {
                if m.start() == 0 && m.end() > best.len {
                    best = PrefixMatch {
                        len: m.end(),
                        rule: Some(i),
                    };
                }
            }
        }

        let whitespace = whitespace_prefix_len(line);
        if whitespace >= best.len {
            best = PrefixMatch {
                len: whitespace,
                rule: None,
            };
        }
        best
    }

    /// Whether some continuation pattern matches all of `line`.
    #[must_use]
    pub fn line_matches_rest(&self, line: &str) -> bool {
        self.rules.iter().any(|rule| {
            rule.rest
                .find(line)
                .is_some_and(|m| m.start() == 0 && m.end() == line.len())
        })
    }

    /// Prefix for the lines after the first, given the first line's prefix.
    #[must_use]
    pub fn build_rest_prefix(&self, first_prefix: &str, rule: Option<usize>) -> String {
        match rule.and_then(|i| self.rules.get(i)) {
            Some(rule) => rule
                .first
                .replacen(first_prefix, 1, rule.replace.as_str())
                .into_owned(),
            None => first_prefix.to_string(),
        }
    }
}

impl FromIterator<CrmRule> for CrmRuleList {
    fn from_iter<I: IntoIterator<Item = CrmRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// A rule list either owned by one buffer or shared between several.
#[derive(Clone, Debug)]
pub enum CrmRules {
    Owned(CrmRuleList),
    Shared(Arc<CrmRuleList>),
}

impl CrmRules {
    /// Whether the buffer owns its rule list.
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl Deref for CrmRules {
    type Target = CrmRuleList;

    fn deref(&self) -> &CrmRuleList {
        match self {
            Self::Owned(list) => list,
            Self::Shared(list) => list,
        }
    }
}

impl From<CrmRuleList> for CrmRules {
    fn from(list: CrmRuleList) -> Self {
        Self::Owned(list)
    }
}

impl From<Arc<CrmRuleList>> for CrmRules {
    fn from(list: Arc<CrmRuleList>) -> Self {
        Self::Shared(list)
    }
}

fn whitespace_prefix_len(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_rules() -> CrmRuleList {
        [
            CrmRule::new(r"[ \t]*(>+[ \t]*)+", r"[ \t]*(>+[ \t]*)+", "$0").unwrap(),
            CrmRule::new(r"([ \t]*)[-*][ \t]+", r"[ \t]*", "$1  ").unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_match_prefix_longest_rule() {
        let rules = quote_rules();
        let m = rules.match_prefix("> > quoted", None);
        assert_eq!(m, PrefixMatch { len: 4, rule: Some(0) });

        let m = rules.match_prefix("  - item", None);
        assert_eq!(m, PrefixMatch { len: 4, rule: Some(1) });
    }

    #[test]
    fn test_match_prefix_whitespace_default() {
        let rules = quote_rules();
        assert_eq!(
            rules.match_prefix("\t plain", None),
            PrefixMatch { len: 2, rule: None }
        );
        assert_eq!(
            CrmRuleList::new().match_prefix("  x", None),
            PrefixMatch { len: 2, rule: None }
        );
    }

    #[test]
    fn test_match_prefix_hint_uses_rest() {
        let rules = quote_rules();
        let m = rules.match_prefix("    continued", Some(1));
        assert_eq!(m, PrefixMatch { len: 4, rule: Some(1) });
    }

    #[test]
    fn test_build_rest_prefix() {
        let rules = quote_rules();
        assert_eq!(rules.build_rest_prefix("  - ", Some(1)), "    ");
        assert_eq!(rules.build_rest_prefix("> ", Some(0)), "> ");
        assert_eq!(rules.build_rest_prefix("\t", None), "\t");
    }

    #[test]
    fn test_line_matches_rest() {
        let rules = quote_rules();
        assert!(rules.line_matches_rest(">> "));
        assert!(rules.line_matches_rest("   "));
        assert!(!rules.line_matches_rest("> text"));
    }

    #[test]
    fn test_shared_rules() {
        let shared = Arc::new(quote_rules());
        let a = CrmRules::from(Arc::clone(&shared));
        let b = CrmRules::from(quote_rules());
        assert!(!a.is_owned());
        assert!(b.is_owned());
        assert_eq!(a.len(), b.len());
        assert_eq!(Arc::strong_count(&shared), 2);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(CrmRule::new("(", "x", "").is_err());
    }
}
