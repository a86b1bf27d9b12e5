use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::Status;
use crate::rules::Rule;

/// Result of evaluating one [`Rule`] in one pass.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub rule: Rule,
    pub status: Status,
    /// Human-readable explanation: which evaluator decided, or why it could not.
    pub message: String,
}

impl EvaluationResult {
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn status(&self) -> Status {
        self.status
    }
}

/// The rule is serialized by its display form.
impl Serialize for EvaluationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("EvaluationResult", 3)?;
        s.serialize_field("rule", &self.rule.to_string())?;
        s.serialize_field("status", &self.status)?;
        s.serialize_field("message", &self.message)?;
        s.end()
    }
}

/// Most severe status among `results`; `Ok` for an empty slice.
pub fn worst_status(results: &[EvaluationResult]) -> Status {
    results
        .iter()
        .map(|r| r.status)
        .max()
        .unwrap_or(Status::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ConstantAttribute;
    use std::sync::Arc;

    fn result(status: Status) -> EvaluationResult {
        EvaluationResult {
            rule: Rule::new(Arc::new(ConstantAttribute::new("five", 5)), "5"),
            status,
            message: "test".into(),
        }
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(result(Status::Ok)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"rule": "Rule: five 5", "status": "OK", "message": "test"})
        );
    }

    #[test]
    fn worst_of_mixed() {
        let rs = vec![result(Status::Ok), result(Status::Error), result(Status::Warn)];
        assert_eq!(worst_status(&rs), Status::Error);
        assert_eq!(worst_status(&[]), Status::Ok);
    }
}
