//! Builtin rule builders.
//!
//! Each builder owns one namespace and declines every definition outside
//! it. None of them assign a meaning to the qualifier field, so qualified
//! definitions are declined too and left to host-registered builders.

/// Environment variables (`env:NAME:expression`).
pub mod env;
/// Registry introspection (`muppet:RuleBuilderCount:> 0`).
pub mod muppet;
/// Process and platform facts (`sys:cpus:>= 2`).
pub mod sys;

use crate::parse::RuleDefinition;

/// Whether `definition` is an unqualified definition in `namespace`.
fn claims(definition: &RuleDefinition, namespace: &str) -> bool {
    definition.namespace == namespace && definition.qualifier.is_none()
}
