//! Types produced by the rule text parser and consumed by the engine.

use std::fmt;

use crate::error::ParseError;

/// One parsed rule line, not yet bound to an attribute.
///
/// `qualifier` is only present for the four-field form
/// `namespace:ruleName:qualifier:expression`. The engine never interprets it;
/// builders decide what it means for their namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    pub namespace: String,
    pub rule_name: String,
    pub qualifier: Option<String>,
    pub expression: String,
    /// 1-based input line the definition came from (0 when built by hand).
    pub line: usize,
}

impl RuleDefinition {
    /// Build a three-field definition directly, without going through text.
    pub fn new(namespace: &str, rule_name: &str, expression: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            rule_name: rule_name.to_string(),
            qualifier: None,
            expression: expression.to_string(),
            line: 0,
        }
    }

    /// Attach a qualifier, turning this into the four-field form.
    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        self.qualifier = Some(qualifier.to_string());
        self
    }
}

impl fmt::Display for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(
                f,
                "{}:{}:{}:{}",
                self.namespace, self.rule_name, q, self.expression
            ),
            None => write!(f, "{}:{}:{}", self.namespace, self.rule_name, self.expression),
        }
    }
}

/// Outcome of parsing a batch of lines.
///
/// Line-level failures sit next to the definitions that did parse; neither
/// list affects the other.
#[derive(Debug, Default)]
pub struct ParsedRules {
    /// Definitions in input order.
    pub definitions: Vec<RuleDefinition>,
    /// One entry per rejected line, in input order.
    pub errors: Vec<ParseError>,
}

impl ParsedRules {
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }
}

impl IntoIterator for ParsedRules {
    type Item = RuleDefinition;
    type IntoIter = std::vec::IntoIter<RuleDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_three_fields() {
        let d = RuleDefinition::new("muppet", "RuleBuilderCount", "> 0");
        assert_eq!(d.to_string(), "muppet:RuleBuilderCount:> 0");
    }

    #[test]
    fn display_four_fields() {
        let d = RuleDefinition::new("jmx", "Memory", "< 100").with_qualifier("HeapUsed");
        assert_eq!(d.to_string(), "jmx:Memory:HeapUsed:< 100");
    }
}
