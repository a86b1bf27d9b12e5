pub mod result;
pub mod status;

pub use result::{EvaluationResult, worst_status};
pub use status::Status;

use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{BuildError, EvaluationError};
use crate::parse::RuleDefinition;
use crate::registry::ProviderRegistry;
use crate::rules::{Evaluator, Rule, RuleBuilder};

/// Working set of rules for one evaluation session.
///
/// Rules are built and evaluated against whatever providers the registry
/// holds at the moment of each call. The engine can be evaluated any
/// number of times; its rule list only grows through `add_rules`/`add_rule`.
pub struct RulesEngine {
    registry: Arc<ProviderRegistry>,
    rules: Vec<Rule>,
    unavailable_is_error: bool,
}

impl RulesEngine {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            rules: Vec::new(),
            unavailable_is_error: false,
        }
    }

    /// Report unreadable attributes as ERROR instead of WARN.
    pub fn set_unavailable_is_error(&mut self, strict: bool) {
        self.unavailable_is_error = strict;
    }

    /// Build each definition with the first builder that accepts it.
    ///
    /// Built rules are appended in input order. Definitions no builder
    /// accepts are returned as errors; they never stop the rest of the batch.
    pub fn add_rules<I>(&mut self, definitions: I) -> Vec<BuildError>
    where
        I: IntoIterator<Item = RuleDefinition>,
    {
        let builders = self.registry.builders();
        let mut failures = Vec::new();
        let before = self.rules.len();

        for definition in definitions {
            match build_rule(&builders, &definition) {
                Some(rule) => self.rules.push(rule),
                None => {
                    warn!("no rule builder accepts '{definition}'");
                    failures.push(BuildError::NoBuilder {
                        line: definition.line,
                        definition: definition.to_string(),
                    });
                }
            }
        }

        debug!(
            "built {} rule(s) with {} builder(s), {} failure(s)",
            self.rules.len() - before,
            builders.len(),
            failures.len()
        );
        failures
    }

    /// Append an already-built rule.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule, in insertion order, with the current evaluators.
    ///
    /// Always returns exactly one result per rule.
    pub fn evaluate_rules(&self) -> Vec<EvaluationResult> {
        let evaluators = self.registry.evaluators();
        let results: Vec<EvaluationResult> = self
            .rules
            .iter()
            .map(|rule| self.evaluate_rule(&evaluators, rule))
            .collect();
        info!(
            "evaluated {} rule(s): worst status {}",
            results.len(),
            worst_status(&results).label()
        );
        results
    }

    fn evaluate_rule(&self, evaluators: &[Arc<dyn Evaluator>], rule: &Rule) -> EvaluationResult {
        let attribute = rule.attribute();
        let expression = rule.expression();

        // The registry always ends the snapshot with the accept-all default.
        let Some(evaluator) = evaluators.iter().find(|e| e.accepts(attribute, expression)) else {
            return EvaluationResult {
                rule: rule.clone(),
                status: Status::Error,
                message: "no evaluator accepts the expression".into(),
            };
        };
        debug!("{rule}: dispatched to evaluator '{}'", evaluator.name());

        let (status, message) = match evaluator.evaluate(attribute, expression) {
            Ok(status) => (status, format!("{} evaluator", evaluator.name())),
            Err(EvaluationError::Attribute(e)) => {
                let status = if self.unavailable_is_error {
                    Status::Error
                } else {
                    Status::Warn
                };
                (status, e.to_string())
            }
            Err(e) => (Status::Error, e.to_string()),
        };

        EvaluationResult {
            rule: rule.clone(),
            status,
            message,
        }
    }
}

fn build_rule(builders: &[Arc<dyn RuleBuilder>], definition: &RuleDefinition) -> Option<Rule> {
    builders.iter().find_map(|builder| {
        let rule = builder.build_rule(definition)?;
        debug!("'{definition}' built by '{}'", builder.name());
        Some(rule)
    })
}

impl std::fmt::Debug for RulesEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesEngine")
            .field("rules", &self.rules)
            .field("unavailable_is_error", &self.unavailable_is_error)
            .finish()
    }
}
