//! Subject-level permission queries
//!
//! [`Ranker`] ties a [`CachedProcessor`] to a [`Matcher`] so callers can ask
//! questions by subject id instead of handling resolved lists themselves.

use crate::cache::CachedProcessor;
use crate::config::AppConfig;
use crate::error::ResolveResult;
use crate::matcher::{Matcher, Permissible};
use crate::provider::Provider;
use crate::resolver::{Processor, WeightOrder};

/// Cached resolver plus matching strategy
#[derive(Debug)]
pub struct Ranker<P> {
    cache: CachedProcessor<P>,
    matcher: Matcher,
}

impl<P: Provider> Ranker<P> {
    pub fn new(provider: P, order: WeightOrder, matcher: Matcher) -> Self {
        Self {
            cache: CachedProcessor::from_processor(Processor::with_order(provider, order)),
            matcher,
        }
    }

    /// Build a ranker from the resolver and matcher sections of a config
    pub fn from_config(provider: P, config: &AppConfig) -> Self {
        Self::new(
            provider,
            config.resolver.weight_order,
            Matcher::from(&config.matcher),
        )
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn cache(&self) -> &CachedProcessor<P> {
        &self.cache
    }

    /// Resolved permissions of a subject, bound to this ranker's matcher
    pub fn permissible(&self, subject_id: &str) -> ResolveResult<Permissible> {
        let list = self.cache.process(subject_id)?;
        Ok(self.matcher.bind(list))
    }

    pub fn has_permission(&self, subject_id: &str, node: &str) -> ResolveResult<bool> {
        Ok(self.permissible(subject_id)?.has_permission(node))
    }

    pub fn has_permission_with_level(
        &self,
        subject_id: &str,
        node: &str,
        level: i64,
    ) -> ResolveResult<bool> {
        Ok(self
            .permissible(subject_id)?
            .has_permission_with_level(node, level))
    }

    /// Whether `source_id` strictly outranks `target_id`
    pub fn is_higher_level(&self, source_id: &str, target_id: &str) -> ResolveResult<bool> {
        let source = self.permissible(source_id)?;
        let target = self.cache.process(target_id)?;
        Ok(source.is_higher_level(&target))
    }

    pub fn clear_cache(&self) {
        self.cache.clear_cache();
    }
}
