//! Builtin evaluators.
//!
//! The registry tries evaluators in registration order and uses the first
//! one whose `accepts` returns true. [`default::DefaultEvaluator`] accepts
//! everything and always runs last.

/// Exact string equality against the value's canonical form.
pub mod default;
/// Relational operators (`> 0`, `<= 2.5`, `between 1 10`) on numeric values.
pub mod numeric;
/// Pattern matching (`~ ^up`, `!~ fail`) on the value's canonical form.
pub mod regex;
