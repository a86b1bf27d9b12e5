pub mod text;
pub mod types;

pub use text::{parse_line, parse_reader, parse_str};
pub use types::{ParsedRules, RuleDefinition};
