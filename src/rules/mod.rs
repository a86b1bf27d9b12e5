//! Core rule model and the provider traits.
//!
//! A [`RuleBuilder`] turns a [`RuleDefinition`] into a [`Rule`] or declines.
//! An [`Evaluator`] decides the [`Status`] of a rule's attribute against its
//! expression. Both are plugged into a
//! [`ProviderRegistry`](crate::registry::ProviderRegistry) at runtime.

/// Attribute values and ready-made attribute implementations.
pub mod attribute;

pub use attribute::{AttributeValue, ConstantAttribute, FnAttribute, SystemAttribute};

use std::fmt;
use std::sync::Arc;

use crate::error::EvaluationError;
use crate::eval::Status;
use crate::parse::RuleDefinition;

/// An attribute bound to an expression, awaiting evaluation.
///
/// Immutable once built: only the attribute's value may change between passes.
#[derive(Clone)]
pub struct Rule {
    attribute: Arc<dyn SystemAttribute>,
    expression: String,
}

impl Rule {
    pub fn new(attribute: Arc<dyn SystemAttribute>, expression: impl Into<String>) -> Self {
        Self {
            attribute,
            expression: expression.into(),
        }
    }

    pub fn attribute(&self) -> &dyn SystemAttribute {
        self.attribute.as_ref()
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule: {} {}", self.attribute, self.expression)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("attribute", &self.attribute.to_string())
            .field("expression", &self.expression)
            .finish()
    }
}

/// Translates a parsed definition into a [`Rule`].
///
/// Returning `None` declines the definition so the next builder can try.
/// Implementations must not touch global state.
pub trait RuleBuilder: Send + Sync {
    /// Short name used in logs (e.g. `"env"`).
    fn name(&self) -> &str;

    fn build_rule(&self, definition: &RuleDefinition) -> Option<Rule>;
}

/// Decides whether an attribute's current value satisfies an expression.
pub trait Evaluator: Send + Sync {
    /// Short name used in logs (e.g. `"numeric"`).
    fn name(&self) -> &str;

    /// Whether this evaluator understands `expression` for `attribute`.
    /// The first registered evaluator that accepts wins.
    fn accepts(&self, attribute: &dyn SystemAttribute, expression: &str) -> bool;

    /// Evaluate an accepted expression. Errors are reported for this rule only.
    fn evaluate(
        &self,
        attribute: &dyn SystemAttribute,
        expression: &str,
    ) -> Result<Status, EvaluationError>;
}
