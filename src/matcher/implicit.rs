//! Hierarchical node matching
//!
//! A query for `foo.bar.baz` (delimiter `.`, terminator `*`) is satisfied by
//! any of:
//!
//! ```text
//! foo*  foo.bar*  foo.bar.baz*  foo.bar.baz  [*]
//! ```
//!
//! The bare terminator is only a candidate when `include_terminator` is set.
//! A grant without the terminator covers exactly that node. With an empty
//! terminator every grant covers its descendants.

use crate::model::List;

/// Wildcard-aware matcher over delimited node names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitMatcher {
    delimiter: String,
    terminator: String,
    include_terminator: bool,
}

impl ImplicitMatcher {
    /// Create a matcher; an empty delimiter treats every node as one segment
    pub fn new(delimiter: impl Into<String>, terminator: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            terminator: terminator.into(),
            include_terminator: false,
        }
    }

    /// Accept the bare terminator as a universal grant
    pub fn include_terminator(mut self, include: bool) -> Self {
        self.include_terminator = include;
        self
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    pub fn includes_terminator(&self) -> bool {
        self.include_terminator
    }

    /// Every granted node that would authorize `node`
    pub fn candidates(&self, node: &str) -> Vec<String> {
        let mut out = Vec::new();

        if !self.delimiter.is_empty() {
            for (pos, _) in node.match_indices(self.delimiter.as_str()) {
                out.push(format!("{}{}", &node[..pos], self.terminator));
            }
        }
        // the whole node plus terminator; identical to the node itself when
        // there is no terminator, and to the bare terminator for an empty node
        if !self.terminator.is_empty() && !node.is_empty() {
            out.push(format!("{}{}", node, self.terminator));
        }
        out.push(node.to_string());

        if self.include_terminator && !self.terminator.is_empty() {
            out.push(self.terminator.clone());
        }

        out
    }

    /// First granted node in `list` that authorizes `node`
    pub fn find_match<'a>(&self, list: &'a List, node: &str) -> Option<&'a str> {
        let candidates = self.candidates(node);
        list.permission
            .iter()
            .find(|granted| candidates.iter().any(|c| c == *granted))
            .map(String::as_str)
    }

    pub fn has_permission(&self, list: &List, node: &str) -> bool {
        self.find_match(list, node).is_some()
    }
}

impl Default for ImplicitMatcher {
    fn default() -> Self {
        Self::new(".", "*")
    }
}
