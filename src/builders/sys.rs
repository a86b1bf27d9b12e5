use std::sync::Arc;

use crate::error::AttributeError;
use crate::parse::RuleDefinition;
use crate::rules::{AttributeValue, ConstantAttribute, FnAttribute, Rule, RuleBuilder, SystemAttribute};

/// Process and platform facts: `cpus`, `os`, `arch`, `family`, `pid`.
pub struct SysRuleBuilder;

impl SysRuleBuilder {
    pub const NAMESPACE: &'static str = "sys";
}

fn available_cpus() -> Result<AttributeValue, AttributeError> {
    std::thread::available_parallelism()
        .map(|n| AttributeValue::from(n.get()))
        .map_err(|e| AttributeError::Unavailable {
            name: "cpus".into(),
            reason: e.to_string(),
        })
}

impl RuleBuilder for SysRuleBuilder {
    fn name(&self) -> &str {
        Self::NAMESPACE
    }

    fn build_rule(&self, definition: &RuleDefinition) -> Option<Rule> {
        if !super::claims(definition, Self::NAMESPACE) {
            return None;
        }
        let name = definition.rule_name.as_str();
        let attribute: Arc<dyn SystemAttribute> = match name {
            "cpus" => Arc::new(FnAttribute::new(name, available_cpus)),
            "os" => Arc::new(ConstantAttribute::new(name, std::env::consts::OS)),
            "arch" => Arc::new(ConstantAttribute::new(name, std::env::consts::ARCH)),
            "family" => Arc::new(ConstantAttribute::new(name, std::env::consts::FAMILY)),
            "pid" => Arc::new(ConstantAttribute::new(name, std::process::id())),
            _ => return None,
        };
        Some(Rule::new(attribute, definition.expression.clone()))
    }
}
