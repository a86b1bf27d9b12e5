use crate::error::EvaluationError;
use crate::eval::Status;
use crate::rules::{Evaluator, SystemAttribute};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Comparison {
    Gt(f64),
    Ge(f64),
    Lt(f64),
    Le(f64),
    Eq(f64),
    Ne(f64),
    Between(f64, f64),
}

impl Comparison {
    fn holds(self, v: f64) -> bool {
        match self {
            Comparison::Gt(n) => v > n,
            Comparison::Ge(n) => v >= n,
            Comparison::Lt(n) => v < n,
            Comparison::Le(n) => v <= n,
            Comparison::Eq(n) => v == n,
            Comparison::Ne(n) => v != n,
            Comparison::Between(lo, hi) => lo <= v && v <= hi,
        }
    }
}

// Two-character operators first so ">=" is not read as ">" followed by "=".
const OPERATORS: &[(&str, fn(f64) -> Comparison)] = &[
    (">=", Comparison::Ge),
    ("<=", Comparison::Le),
    ("==", Comparison::Eq),
    ("!=", Comparison::Ne),
    (">", Comparison::Gt),
    ("<", Comparison::Lt),
];

const BETWEEN: &str = "between";

fn invalid(expression: &str, reason: impl Into<String>) -> EvaluationError {
    EvaluationError::InvalidExpression {
        expression: expression.to_string(),
        reason: reason.into(),
    }
}

fn operand(expression: &str, text: &str) -> Result<f64, EvaluationError> {
    let text = text.trim();
    let n: f64 = text
        .parse()
        .map_err(|_| invalid(expression, format!("'{text}' is not a number")))?;
    if !n.is_finite() {
        return Err(invalid(expression, format!("'{text}' is not a finite number")));
    }
    Ok(n)
}

/// Syntax only: bound order of `between` is checked at evaluation so a
/// reversed range is still claimed and reported.
fn parse(expression: &str) -> Result<Comparison, EvaluationError> {
    let expr = expression.trim();

    if let Some(rest) = expr.strip_prefix(BETWEEN)
        && rest.starts_with(char::is_whitespace)
    {
        let bounds: Vec<&str> = rest.split_whitespace().collect();
        let [lo, hi] = bounds.as_slice() else {
            return Err(invalid(expression, "between needs exactly two bounds"));
        };
        return Ok(Comparison::Between(
            operand(expression, lo)?,
            operand(expression, hi)?,
        ));
    }

    for (op, make) in OPERATORS {
        if let Some(rest) = expr.strip_prefix(op) {
            return Ok(make(operand(expression, rest)?));
        }
    }
    Err(invalid(expression, "no comparison operator"))
}

/// Compares numeric attribute values against `>`, `>=`, `<`, `<=`, `==`,
/// `!=` or `between LOW HIGH` (inclusive).
///
/// Operands must be finite numbers. Text values are compared if they parse
/// as numbers; anything else is an evaluation error for that rule.
pub struct NumericEvaluator;

impl Evaluator for NumericEvaluator {
    fn name(&self) -> &str {
        "numeric"
    }

    /// Only well-formed comparisons are claimed; anything else (`<none>`,
    /// `> lots`) is left to the evaluators after this one.
    fn accepts(&self, _attribute: &dyn SystemAttribute, expression: &str) -> bool {
        parse(expression).is_ok()
    }

    fn evaluate(
        &self,
        attribute: &dyn SystemAttribute,
        expression: &str,
    ) -> Result<Status, EvaluationError> {
        let comparison = parse(expression)?;
        if let Comparison::Between(lo, hi) = comparison
            && lo > hi
        {
            return Err(invalid(expression, "lower bound exceeds upper bound"));
        }
        let value = attribute.value()?;
        let number = value.as_f64().ok_or_else(|| EvaluationError::NotNumeric {
            attribute: attribute.to_string(),
            value: value.to_string(),
        })?;
        Ok(if comparison.holds(number) {
            Status::Ok
        } else {
            Status::Error
        })
    }
}
