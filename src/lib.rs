//! muppet: a rules engine for runtime health checks.
//!
//! Rules are short text lines such as `muppet:RuleBuilderCount:> 0`. Each is
//! bound to a named system attribute by a pluggable [`RuleBuilder`] and
//! decided by a pluggable [`Evaluator`], yielding one [`eval::Status`] per rule.
//! Builders and evaluators live in a [`ProviderRegistry`] that can change
//! while the process runs; every build and evaluate pass sees the providers
//! registered at that moment.
//!
//! # Architecture
//!
//! - **[`parse`]** — Rule text parser: one `namespace:ruleName[:qualifier]:expression` per line.
//! - **[`rules`]** — Rule model: attributes, rules, builder and evaluator traits.
//! - **[`registry`]** — Thread-safe provider registry with register/deregister/snapshot.
//! - **[`eval`]** — Rules engine, statuses and evaluation results.
//! - **[`builders`]** / **[`evaluators`]** — Builtin providers.
//! - **[`config`]** — Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]** — stderr logger setup and evaluation history file.

/// Builtin rule builders (`muppet`, `env`, `sys`).
pub mod builders;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Error types for parsing, building and evaluating rules.
pub mod error;
/// Rules engine, status and result types.
pub mod eval;
/// Builtin evaluators (default equality, numeric, regex).
pub mod evaluators;
/// Logger setup and file-based evaluation history.
pub mod logging;
/// Line-oriented rule text parser.
pub mod parse;
/// Live registry of rule builders and evaluators.
pub mod registry;
/// Attributes, rules and the provider traits.
pub mod rules;

pub use error::{AttributeError, BuildError, EvaluationError, MuppetError, ParseError};
pub use eval::{EvaluationResult, RulesEngine, Status};
pub use parse::{ParsedRules, RuleDefinition};
pub use registry::{ProviderId, ProviderRegistry};
pub use rules::{
    AttributeValue, ConstantAttribute, Evaluator, FnAttribute, Rule, RuleBuilder, SystemAttribute,
};

use std::io::BufRead;
use std::sync::Arc;

/// Entry point for hosts: hands out engines bound to one shared registry.
#[derive(Debug, Clone)]
pub struct Muppet {
    registry: Arc<ProviderRegistry>,
    unavailable_is_error: bool,
}

impl Muppet {
    /// Facade over an existing registry.
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            unavailable_is_error: false,
        }
    }

    /// Facade over a fresh registry holding the builtins enabled in `config`.
    pub fn from_config(config: &config::Config) -> Self {
        Self {
            registry: ProviderRegistry::with_builtins(config),
            unavailable_is_error: config.settings.unavailable_is_error,
        }
    }

    /// The registry hosts register their providers in.
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// A new, empty engine using this facade's registry.
    pub fn new_rules_engine(&self) -> RulesEngine {
        let mut engine = RulesEngine::new(Arc::clone(&self.registry));
        engine.set_unavailable_is_error(self.unavailable_is_error);
        engine
    }

    /// Parse rule text. Only a failure to read `reader` is an error.
    pub fn parse_simple_text_rules<R: BufRead>(&self, reader: R) -> Result<ParsedRules, ParseError> {
        parse::parse_reader(reader)
    }
}

/// Parse and evaluate `text` against the default builtins.
///
/// This is the main entry point for tests and simple usage. Lines that fail
/// to parse or build are skipped.
pub fn evaluate(text: &str) -> Vec<EvaluationResult> {
    let muppet = Muppet::from_config(&config::Config::default_config());
    let mut engine = muppet.new_rules_engine();
    engine.add_rules(parse::parse_str(text));
    engine.evaluate_rules()
}
