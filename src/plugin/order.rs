//! Mount order policy.
//!
//! Mount order is route precedence: the router takes the first matching
//! route, so plugins with narrow control-plane routes must be mounted
//! before the catch-all that proxies everything else to the search engine.
//!
//! The policy is a `less` strategy handed to a generic stable sort, so the
//! catch-all rule can be swapped without touching the mount pipeline.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::plugin::PluginUnit;

/// Name of the plugin that fronts the search engine.
pub const DEFAULT_CATCH_ALL: &str = "es";

type Less = dyn Fn(&dyn PluginUnit, &dyn PluginUnit) -> bool + Send + Sync;

pub struct OrderPolicy {
    less: Box<Less>,
}

impl OrderPolicy {
    /// Build a policy from a strict "is `a` placed before `b`" predicate.
    ///
    /// `less` must be a strict weak order (irreflexive, asymmetric,
    /// transitive); otherwise `sort` may panic or produce an arbitrary order.
    pub fn by<F>(less: F) -> Self
    where
        F: Fn(&dyn PluginUnit, &dyn PluginUnit) -> bool + Send + Sync + 'static,
    {
        Self {
            less: Box::new(less),
        }
    }

    /// The catch-all plugin sorts last, every other plugin by name.
    pub fn catch_all_last(catch_all: impl Into<String>) -> Self {
        let catch_all = catch_all.into();
        Self::by(move |a, b| {
            if a.name() == catch_all {
                false
            } else if b.name() == catch_all {
                true
            } else {
                a.name() < b.name()
            }
        })
    }

    pub fn less(&self, a: &dyn PluginUnit, b: &dyn PluginUnit) -> bool {
        (self.less)(a, b)
    }

    /// Sort plugins in place. The sort is stable.
    pub fn sort(&self, plugins: &mut [Arc<dyn PluginUnit>]) {
        plugins.sort_by(|a, b| {
            if self.less(a.as_ref(), b.as_ref()) {
                Ordering::Less
            } else if self.less(b.as_ref(), a.as_ref()) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });
    }
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self::catch_all_last(DEFAULT_CATCH_ALL)
    }
}

impl std::fmt::Debug for OrderPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderPolicy").finish_non_exhaustive()
    }
}
