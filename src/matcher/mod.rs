//! Permission matching
//!
//! Answers queries against a resolved [`List`]. Two strategies exist:
//! - [`Matcher::Explicit`] - the node must be granted verbatim
//! - [`Matcher::Implicit`] - ancestors granted with a terminator also count
//!
//! Level checks are shared by both: a list meets a required level when
//! `list.level >= level`, and one list outranks another only when its level
//! is strictly greater.

pub mod implicit;

pub use implicit::ImplicitMatcher;

use crate::config::{MatcherConfig, MatcherStrategy};
use crate::model::List;

/// Matching strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exact, byte-for-byte node membership
    Explicit,
    /// Hierarchical matching with a delimiter and terminator
    Implicit(ImplicitMatcher),
}

impl Matcher {
    pub fn explicit() -> Self {
        Matcher::Explicit
    }

    pub fn implicit(delimiter: impl Into<String>, terminator: impl Into<String>) -> Self {
        Matcher::Implicit(ImplicitMatcher::new(delimiter, terminator))
    }

    /// Granted node in `list` that authorizes `node`, if any
    pub fn find_match<'a>(&self, list: &'a List, node: &str) -> Option<&'a str> {
        match self {
            Matcher::Explicit => list
                .permission
                .iter()
                .find(|granted| granted.as_str() == node)
                .map(String::as_str),
            Matcher::Implicit(matcher) => matcher.find_match(list, node),
        }
    }

    pub fn has_permission(&self, list: &List, node: &str) -> bool {
        self.find_match(list, node).is_some()
    }

    /// Permission check gated by a minimum level
    pub fn has_permission_with_level(&self, list: &List, node: &str, level: i64) -> bool {
        meets_level(list, level) && self.has_permission(list, node)
    }

    pub fn is_higher_level(&self, source: &List, subject: &List) -> bool {
        is_higher_level(source, subject)
    }

    /// Bind a resolved list to this matcher
    pub fn bind(&self, list: List) -> Permissible {
        Permissible::new(list, self.clone())
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::Implicit(ImplicitMatcher::default())
    }
}

impl From<&MatcherConfig> for Matcher {
    fn from(config: &MatcherConfig) -> Self {
        match config.strategy {
            MatcherStrategy::Explicit => Matcher::Explicit,
            MatcherStrategy::Implicit => Matcher::Implicit(
                ImplicitMatcher::new(config.delimiter.as_str(), config.terminator.as_str())
                    .include_terminator(config.include_terminator),
            ),
        }
    }
}

/// Inclusive level requirement
pub fn meets_level(list: &List, level: i64) -> bool {
    list.level >= level
}

/// Strict level comparison; equal levels never outrank each other
pub fn is_higher_level(source: &List, subject: &List) -> bool {
    source.level > subject.level
}

/// A resolved list together with the matcher that judges it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permissible {
    list: List,
    matcher: Matcher,
}

impl Permissible {
    pub fn new(list: List, matcher: Matcher) -> Self {
        Self { list, matcher }
    }

    pub fn list(&self) -> &List {
        &self.list
    }

    pub fn level(&self) -> i64 {
        self.list.level
    }

    pub fn into_list(self) -> List {
        self.list
    }

    pub fn has_permission(&self, node: &str) -> bool {
        self.matcher.has_permission(&self.list, node)
    }

    pub fn has_permission_with_level(&self, node: &str, level: i64) -> bool {
        self.matcher.has_permission_with_level(&self.list, node, level)
    }

    pub fn is_higher_level(&self, subject: &List) -> bool {
        is_higher_level(&self.list, subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_exact_only() {
        let list = List::new(0, ["foo.bar"]);
        assert!(Matcher::Explicit.has_permission(&list, "foo.bar"));
        assert!(!Matcher::Explicit.has_permission(&list, "foo.bar.baz"));
        assert!(!Matcher::Explicit.has_permission(&list, "foo"));
    }

    #[test]
    fn test_strategies_diverge_on_terminated_ancestor() {
        let list = List::new(0, ["foo.bar*"]);
        assert!(!Matcher::Explicit.has_permission(&list, "foo.bar.baz"));
        assert!(Matcher::default().has_permission(&list, "foo.bar.baz"));
    }

    #[test]
    fn test_level_gate_inclusive() {
        let list = List::new(10, ["x"]);
        let matcher = Matcher::Explicit;
        assert!(matcher.has_permission_with_level(&list, "x", 10));
        assert!(matcher.has_permission_with_level(&list, "x", 9));
        assert!(!matcher.has_permission_with_level(&list, "x", 11));
        assert!(!matcher.has_permission_with_level(&list, "y", 0));
    }

    #[test]
    fn test_is_higher_level_strict() {
        let a = List::new(5, Vec::<String>::new());
        let b = List::new(5, Vec::<String>::new());
        let c = List::new(4, Vec::<String>::new());
        assert!(!is_higher_level(&a, &b));
        assert!(!is_higher_level(&b, &a));
        assert!(is_higher_level(&a, &c));
        assert!(!is_higher_level(&c, &a));
    }

    #[test]
    fn test_from_config() {
        let config = MatcherConfig {
            strategy: MatcherStrategy::Implicit,
            delimiter: ":".to_string(),
            terminator: "#".to_string(),
            include_terminator: true,
        };
        let matcher = Matcher::from(&config);
        let list = List::new(0, ["#"]);
        assert!(matcher.has_permission(&list, "any:node"));

        let config = MatcherConfig {
            strategy: MatcherStrategy::Explicit,
            ..config
        };
        assert_eq!(Matcher::from(&config), Matcher::Explicit);
    }

    #[test]
    fn test_permissible() {
        let permissible = Matcher::default().bind(List::new(3, ["admin*"]));
        assert!(permissible.has_permission("admin.kick"));
        assert!(permissible.has_permission_with_level("admin.kick", 3));
        assert!(!permissible.has_permission_with_level("admin.kick", 4));
        assert!(permissible.is_higher_level(&List::new(2, Vec::<String>::new())));
        assert_eq!(permissible.level(), 3);
    }
}
