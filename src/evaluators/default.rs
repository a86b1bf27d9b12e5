use crate::error::EvaluationError;
use crate::eval::Status;
use crate::rules::{Evaluator, SystemAttribute};

/// `OK` iff the expression equals the value's canonical string form.
pub struct DefaultEvaluator;

impl Evaluator for DefaultEvaluator {
    fn name(&self) -> &str {
        "default"
    }

    fn accepts(&self, _attribute: &dyn SystemAttribute, _expression: &str) -> bool {
        true
    }

    fn evaluate(
        &self,
        attribute: &dyn SystemAttribute,
        expression: &str,
    ) -> Result<Status, EvaluationError> {
        let value = attribute.value()?;
        Ok(if expression == value.to_string() {
            Status::Ok
        } else {
            Status::Error
        })
    }
}
