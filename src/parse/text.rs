//! Line-oriented rule text parser.
//!
//! Format, one rule per line:
//!
//! ```text
//! # comment
//! namespace:ruleName:expression
//! namespace:ruleName:qualifier:expression
//! ```
//!
//! Lines are split on at most three `:` so an expression may itself contain
//! colons. Each line is parsed independently; a bad line never stops the
//! lines after it.

use std::io::BufRead;

use log::{debug, warn};

use super::types::{ParsedRules, RuleDefinition};
use crate::error::ParseError;

const MAX_FIELDS: usize = 4;
const MIN_FIELDS: usize = 3;

/// Parse a single line.
///
/// Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<RuleDefinition>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = trimmed.splitn(MAX_FIELDS, ':').map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        return Err(ParseError::TooFewFields {
            line: line_no,
            found: fields.len(),
        });
    }

    let (namespace, rule_name) = (fields[0], fields[1]);
    if namespace.is_empty() {
        return Err(ParseError::EmptyField {
            line: line_no,
            field: "namespace",
        });
    }
    if rule_name.is_empty() {
        return Err(ParseError::EmptyField {
            line: line_no,
            field: "rule name",
        });
    }

    // Expression is always the last field; a qualifier only exists in the 4-field form.
    let expression = fields[fields.len() - 1];
    let qualifier = (fields.len() == MAX_FIELDS).then(|| fields[2].to_string());

    Ok(Some(RuleDefinition {
        namespace: namespace.to_string(),
        rule_name: rule_name.to_string(),
        qualifier,
        expression: expression.to_string(),
        line: line_no,
    }))
}

/// Parse every line of `reader`.
///
/// A read failure aborts the batch; malformed lines, including lines that
/// are not valid UTF-8, are collected in [`ParsedRules::errors`].
pub fn parse_reader<R: BufRead>(reader: R) -> Result<ParsedRules, ParseError> {
    let mut parsed = ParsedRules::default();
    for (idx, raw) in reader.split(b'\n').enumerate() {
        let raw = raw?;
        let line_no = idx + 1;
        let bytes = raw.strip_suffix(b"\r").unwrap_or(&raw[..]);
        match std::str::from_utf8(bytes) {
            Ok(line) => push_line(&mut parsed, line_no, line),
            Err(_) => {
                let e = ParseError::InvalidUtf8 { line: line_no };
                warn!("skipping rule line: {e}");
                parsed.errors.push(e);
            }
        }
    }
    debug!(
        "parsed {} rule definition(s), {} rejected line(s)",
        parsed.definitions.len(),
        parsed.errors.len()
    );
    Ok(parsed)
}

/// Parse rule text already held in memory. Cannot fail as a whole.
pub fn parse_str(text: &str) -> ParsedRules {
    let mut parsed = ParsedRules::default();
    for (idx, line) in text.lines().enumerate() {
        push_line(&mut parsed, idx + 1, line);
    }
    parsed
}

fn push_line(parsed: &mut ParsedRules, line_no: usize, line: &str) {
    match parse_line(line_no, line) {
        Ok(Some(def)) => parsed.definitions.push(def),
        Ok(None) => {}
        Err(e) => {
            warn!("skipping rule line: {e}");
            parsed.errors.push(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Read};

    fn one(line: &str) -> RuleDefinition {
        parse_line(1, line).unwrap().unwrap()
    }

    #[test]
    fn three_fields() {
        let d = one("muppet:RuleBuilderCount:> 0");
        assert_eq!(d.namespace, "muppet");
        assert_eq!(d.rule_name, "RuleBuilderCount");
        assert_eq!(d.qualifier, None);
        assert_eq!(d.expression, "> 0");
    }

    #[test]
    fn four_fields() {
        let d = one("jmx:Memory:HeapUsed:< 100");
        assert_eq!(d.qualifier.as_deref(), Some("HeapUsed"));
        assert_eq!(d.expression, "< 100");
    }

    #[test]
    fn extra_colons_stay_in_expression() {
        let d = one("env:START:at:12:30:00");
        assert_eq!(d.qualifier.as_deref(), Some("at"));
        assert_eq!(d.expression, "12:30:00");
    }

    #[test]
    fn fields_are_trimmed() {
        let d = one("  test : constant :  5  ");
        assert_eq!(d.namespace, "test");
        assert_eq!(d.rule_name, "constant");
        assert_eq!(d.expression, "5");
    }

    #[test]
    fn blank_and_comment_lines_skipped() {
        assert!(parse_line(1, "").unwrap().is_none());
        assert!(parse_line(1, "   \t").unwrap().is_none());
        assert!(parse_line(1, "# a:b:c").unwrap().is_none());
        assert!(parse_line(1, "   # indented").unwrap().is_none());
    }

    #[test]
    fn too_few_fields() {
        let err = parse_line(4, "muppet:RuleBuilderCount").unwrap_err();
        assert!(matches!(err, ParseError::TooFewFields { line: 4, found: 2 }));
        let err = parse_line(5, "nothing here").unwrap_err();
        assert!(matches!(err, ParseError::TooFewFields { line: 5, found: 1 }));
    }

    #[test]
    fn empty_namespace_rejected() {
        let err = parse_line(2, ":name:5").unwrap_err();
        assert!(matches!(
            err,
            ParseError::EmptyField {
                field: "namespace",
                ..
            }
        ));
    }

    #[test]
    fn empty_expression_allowed() {
        let d = one("test:constant:");
        assert_eq!(d.expression, "");
    }

    #[test]
    fn bad_line_does_not_stop_batch() {
        let parsed = parse_str("a:b:1\nbroken\n\n# c\nc:d:2\n");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.definitions[0].line, 1);
        assert_eq!(parsed.definitions[1].line, 5);
        assert_eq!(parsed.definitions[1].namespace, "c");
    }

    #[test]
    fn reader_matches_str() {
        let text = "a:b:1\nc:d:e:2\n";
        let from_reader = parse_reader(BufReader::new(text.as_bytes())).unwrap();
        let from_str = parse_str(text);
        assert_eq!(from_reader.definitions, from_str.definitions);
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let input: &[u8] = b"sys:cpus:> 0\nsys:os:\xff\xfe\nsys:cpus:>= 1\n";
        let parsed = parse_reader(BufReader::new(input)).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.definitions[0].expression, "> 0");
        assert_eq!(parsed.definitions[1].expression, ">= 1");
        assert_eq!(parsed.definitions[1].line, 3);
        assert!(matches!(parsed.errors[..], [ParseError::InvalidUtf8 { line: 2 }]));
    }

    #[test]
    fn crlf_line_endings() {
        let input: &[u8] = b"a:b:1\r\nc:d:2\r\n";
        let parsed = parse_reader(BufReader::new(input)).unwrap();
        assert_eq!(parsed.definitions[0].expression, "1");
        assert_eq!(parsed.definitions[1].expression, "2");
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn read_failure_is_fatal() {
        let err = parse_reader(BufReader::new(FailingReader)).unwrap_err();
        assert!(err.is_fatal());
    }
}
