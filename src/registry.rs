//! Live, thread-safe set of rule builders and evaluators.
//!
//! Hosts register and deregister providers from any thread at any time.
//! Engines take a fresh snapshot at the start of every build or evaluate
//! pass, so a change is visible to the next pass and never to half of one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::RwLock;

use crate::builders::{env::EnvRuleBuilder, muppet::MuppetRuleBuilder, sys::SysRuleBuilder};
use crate::config::Config;
use crate::evaluators::{
    default::DefaultEvaluator, numeric::NumericEvaluator, regex::RegexEvaluator,
};
use crate::rules::{Evaluator, RuleBuilder};

/// Handle returned by a registration, used to deregister the provider later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider#{}", self.0)
    }
}

struct Entry<T: ?Sized> {
    id: ProviderId,
    provider: Arc<T>,
}

/// Registry of active providers, in registration order.
///
/// The string-equality [`DefaultEvaluator`] is not stored with the other
/// evaluators: it is appended to every evaluator snapshot and cannot be
/// deregistered, so every rule always finds an evaluator.
pub struct ProviderRegistry {
    builders: RwLock<Vec<Entry<dyn RuleBuilder>>>,
    evaluators: RwLock<Vec<Entry<dyn Evaluator>>>,
    default_evaluator: Arc<dyn Evaluator>,
    next_id: AtomicU64,
}

impl ProviderRegistry {
    /// An empty registry holding only the default evaluator.
    pub fn new() -> Self {
        Self {
            builders: RwLock::new(Vec::new()),
            evaluators: RwLock::new(Vec::new()),
            default_evaluator: Arc::new(DefaultEvaluator),
            next_id: AtomicU64::new(1),
        }
    }

    /// Build a shared registry with the builtin providers enabled in `config`.
    pub fn with_builtins(config: &Config) -> Arc<Self> {
        let registry = Arc::new(Self::new());

        for name in &config.builtins.builders {
            match name.as_str() {
                "muppet" => {
                    let builder = MuppetRuleBuilder::new(Arc::downgrade(&registry));
                    registry.register_builder(Arc::new(builder));
                }
                "env" => {
                    registry.register_builder(Arc::new(EnvRuleBuilder::from_config(&config.env)));
                }
                "sys" => {
                    registry.register_builder(Arc::new(SysRuleBuilder));
                }
                other => warn!("unknown builtin rule builder '{other}' ignored"),
            }
        }

        for name in &config.builtins.evaluators {
            match name.as_str() {
                "numeric" => {
                    registry.register_evaluator(Arc::new(NumericEvaluator));
                }
                "regex" => {
                    registry.register_evaluator(Arc::new(RegexEvaluator::new()));
                }
                other => warn!("unknown builtin evaluator '{other}' ignored"),
            }
        }

        registry
    }

    fn next_id(&self) -> ProviderId {
        ProviderId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Add a rule builder after all currently registered ones.
    pub fn register_builder(&self, builder: Arc<dyn RuleBuilder>) -> ProviderId {
        let id = self.next_id();
        debug!("registering rule builder '{}' as {id}", builder.name());
        self.builders.write().push(Entry {
            id,
            provider: builder,
        });
        id
    }

    /// Add an evaluator after all currently registered ones (still ahead of the default).
    pub fn register_evaluator(&self, evaluator: Arc<dyn Evaluator>) -> ProviderId {
        let id = self.next_id();
        debug!("registering evaluator '{}' as {id}", evaluator.name());
        self.evaluators.write().push(Entry {
            id,
            provider: evaluator,
        });
        id
    }

    /// Remove a builder or evaluator. Returns `false` if `id` is not registered.
    pub fn deregister(&self, id: ProviderId) -> bool {
        if remove_entry(&self.builders, id) || remove_entry(&self.evaluators, id) {
            debug!("deregistered {id}");
            return true;
        }
        false
    }

    /// Snapshot of the current builders, in registration order.
    pub fn builders(&self) -> Vec<Arc<dyn RuleBuilder>> {
        self.builders
            .read()
            .iter()
            .map(|e| Arc::clone(&e.provider))
            .collect()
    }

    /// Snapshot of the current evaluators, default evaluator last.
    pub fn evaluators(&self) -> Vec<Arc<dyn Evaluator>> {
        let guard = self.evaluators.read();
        let mut snapshot: Vec<Arc<dyn Evaluator>> = Vec::with_capacity(guard.len() + 1);
        snapshot.extend(guard.iter().map(|e| Arc::clone(&e.provider)));
        drop(guard);
        snapshot.push(Arc::clone(&self.default_evaluator));
        snapshot
    }

    pub fn builder_count(&self) -> usize {
        self.builders.read().len()
    }

    /// Number of evaluators, including the default.
    pub fn evaluator_count(&self) -> usize {
        self.evaluators.read().len() + 1
    }
}

fn remove_entry<T: ?Sized>(list: &RwLock<Vec<Entry<T>>>, id: ProviderId) -> bool {
    let mut guard = list.write();
    let before = guard.len();
    guard.retain(|e| e.id != id);
    guard.len() != before
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let builders: Vec<String> = self.builders().iter().map(|b| b.name().to_string()).collect();
        let evaluators: Vec<String> = self
            .evaluators()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        f.debug_struct("ProviderRegistry")
            .field("builders", &builders)
            .field("evaluators", &evaluators)
            .finish()
    }
}
