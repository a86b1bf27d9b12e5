use std::sync::{Arc, Weak};

use crate::error::AttributeError;
use crate::parse::RuleDefinition;
use crate::registry::ProviderRegistry;
use crate::rules::{AttributeValue, FnAttribute, Rule, RuleBuilder};

/// Exposes live provider counts of the registry it is registered in.
///
/// Holds the registry weakly: the registry owns this builder.
pub struct MuppetRuleBuilder {
    registry: Weak<ProviderRegistry>,
}

impl MuppetRuleBuilder {
    pub const NAMESPACE: &'static str = "muppet";

    pub fn new(registry: Weak<ProviderRegistry>) -> Self {
        Self { registry }
    }

    fn counter(&self, name: &str, count: fn(&ProviderRegistry) -> usize) -> FnAttribute {
        let registry = self.registry.clone();
        let attr_name = name.to_string();
        FnAttribute::new(name, move || {
            let registry = registry.upgrade().ok_or_else(|| AttributeError::Unavailable {
                name: attr_name.clone(),
                reason: "provider registry has been dropped".into(),
            })?;
            Ok(AttributeValue::from(count(&registry)))
        })
    }
}

impl RuleBuilder for MuppetRuleBuilder {
    fn name(&self) -> &str {
        Self::NAMESPACE
    }

    fn build_rule(&self, definition: &RuleDefinition) -> Option<Rule> {
        if !super::claims(definition, Self::NAMESPACE) {
            return None;
        }
        let attribute = match definition.rule_name.as_str() {
            "RuleBuilderCount" => self.counter("RuleBuilderCount", ProviderRegistry::builder_count),
            "EvaluatorCount" => self.counter("EvaluatorCount", ProviderRegistry::evaluator_count),
            _ => return None,
        };
        Some(Rule::new(Arc::new(attribute), definition.expression.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_builder() -> Arc<ProviderRegistry> {
        let registry = Arc::new(ProviderRegistry::new());
        let builder = MuppetRuleBuilder::new(Arc::downgrade(&registry));
        registry.register_builder(Arc::new(builder));
        registry
    }

    fn build(registry: &ProviderRegistry, line: &str) -> Option<Rule> {
        let def = crate::parse::parse_line(1, line).unwrap().unwrap();
        registry.builders()[0].build_rule(&def)
    }

    #[test]
    fn counts_itself() {
        let registry = registry_with_builder();
        let rule = build(&registry, "muppet:RuleBuilderCount:> 0").unwrap();
        assert_eq!(rule.to_string(), "Rule: RuleBuilderCount > 0");
        assert_eq!(rule.attribute().value().unwrap(), AttributeValue::Int(1));
    }

    #[test]
    fn evaluator_count_includes_default() {
        let registry = registry_with_builder();
        let rule = build(&registry, "muppet:EvaluatorCount:1").unwrap();
        assert_eq!(rule.attribute().value().unwrap(), AttributeValue::Int(1));
    }

    #[test]
    fn declines_other_names() {
        let registry = registry_with_builder();
        assert!(build(&registry, "muppet:Unknown:1").is_none());
        assert!(build(&registry, "other:RuleBuilderCount:1").is_none());
        assert!(build(&registry, "muppet:RuleBuilderCount:q:1").is_none());
    }

    #[test]
    fn dropped_registry_is_unavailable() {
        let registry = registry_with_builder();
        let rule = build(&registry, "muppet:RuleBuilderCount:> 0").unwrap();
        drop(registry);
        assert!(rule.attribute().value().is_err());
    }
}
