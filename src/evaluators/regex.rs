use std::collections::HashMap;

use log::debug;
use parking_lot::Mutex;
use regex::Regex;

use crate::error::EvaluationError;
use crate::eval::Status;
use crate::rules::{Evaluator, SystemAttribute};

/// Distinct patterns kept compiled at once; the cache is emptied when full.
const MAX_CACHED_PATTERNS: usize = 256;

/// `~ PATTERN` is OK when the value matches, `!~ PATTERN` when it does not.
///
/// Compiled patterns are cached per expression text, up to
/// `MAX_CACHED_PATTERNS` distinct patterns.
pub struct RegexEvaluator {
    cache: Mutex<HashMap<String, Regex>>,
}

impl RegexEvaluator {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Split into (negated, pattern).
    fn split(expression: &str) -> Option<(bool, &str)> {
        let expr = expression.trim_start();
        if let Some(p) = expr.strip_prefix("!~") {
            return Some((true, p.trim()));
        }
        expr.strip_prefix('~').map(|p| (false, p.trim()))
    }

    fn compiled(&self, pattern: &str) -> Result<Regex, EvaluationError> {
        let mut cache = self.cache.lock();
        if let Some(re) = cache.get(pattern) {
            return Ok(re.clone());
        }
        let re = Regex::new(pattern).map_err(|e| EvaluationError::InvalidExpression {
            expression: pattern.to_string(),
            reason: e.to_string(),
        })?;
        if cache.len() >= MAX_CACHED_PATTERNS {
            debug!("regex cache full ({} patterns), clearing", cache.len());
            cache.clear();
        }
        cache.insert(pattern.to_string(), re.clone());
        Ok(re)
    }
}

impl Default for RegexEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for RegexEvaluator {
    fn name(&self) -> &str {
        "regex"
    }

    fn accepts(&self, _attribute: &dyn SystemAttribute, expression: &str) -> bool {
        Self::split(expression).is_some()
    }

    fn evaluate(
        &self,
        attribute: &dyn SystemAttribute,
        expression: &str,
    ) -> Result<Status, EvaluationError> {
        let Some((negated, pattern)) = Self::split(expression) else {
            return Err(EvaluationError::InvalidExpression {
                expression: expression.to_string(),
                reason: "expected '~ PATTERN' or '!~ PATTERN'".into(),
            });
        };
        let re = self.compiled(pattern)?;
        let value = attribute.value()?.to_string();
        Ok(if re.is_match(&value) != negated {
            Status::Ok
        } else {
            Status::Error
        })
    }
}
