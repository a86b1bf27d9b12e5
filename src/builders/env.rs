use std::fmt;
use std::sync::Arc;

use crate::config::EnvConfig;
use crate::error::AttributeError;
use crate::parse::RuleDefinition;
use crate::rules::{AttributeValue, Rule, RuleBuilder, SystemAttribute};

/// Binds `env:NAME:expression` to the environment variable `NAME`.
///
/// With a non-empty allow list, only listed variables can be referenced.
pub struct EnvRuleBuilder {
    allow: Vec<String>,
}

impl EnvRuleBuilder {
    pub const NAMESPACE: &'static str = "env";

    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            allow: config.allow.clone(),
        }
    }

    fn permits(&self, var: &str) -> bool {
        self.allow.is_empty() || self.allow.iter().any(|a| a == var)
    }
}

impl RuleBuilder for EnvRuleBuilder {
    fn name(&self) -> &str {
        Self::NAMESPACE
    }

    fn build_rule(&self, definition: &RuleDefinition) -> Option<Rule> {
        if !super::claims(definition, Self::NAMESPACE) || !self.permits(&definition.rule_name) {
            return None;
        }
        let attribute = EnvAttribute {
            var: definition.rule_name.clone(),
        };
        Some(Rule::new(Arc::new(attribute), definition.expression.clone()))
    }
}

/// Reads an environment variable on every evaluation.
#[derive(Debug)]
pub struct EnvAttribute {
    var: String,
}

impl fmt::Display for EnvAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.var)
    }
}

impl SystemAttribute for EnvAttribute {
    fn value(&self) -> Result<AttributeValue, AttributeError> {
        std::env::var(&self.var)
            .map(AttributeValue::Text)
            .map_err(|e| AttributeError::Unavailable {
                name: self.var.clone(),
                reason: e.to_string(),
            })
    }
}
