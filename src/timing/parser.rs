//! @ai:module:intent Parse `<stage>: <number>ms` lines from tool output
//! @ai:module:layer domain
//! @ai:module:public_api StageLineParser, TimingSample
//! @ai:module:stateless true

use regex::Regex;
use serde::{Deserialize, Serialize};

const STAGE_LINE_PATTERN: &str =
    r"^\s*(?P<stage>[^:]+?)\s*:\s*(?P<value>[-+]?(?:\d+(?:[.,]\d*)?|[.,]\d+)(?:[eE][-+]?\d+)?)\s*ms\s*$";

/// @ai:intent Whether a stage name can be recovered from a timing line
/// @ai:effects pure
///
/// The stage ends at the first `:` and is trimmed, so a usable name is
/// non-empty, has no `:` and no surrounding whitespace.
pub fn is_parseable_stage_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(':') && name.trim() == name
}

/// @ai:intent One duration reported by one run for one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSample {
    pub stage: String,
    pub millis: f64,
}

/// @ai:intent Extracts timing samples from captured stdout
#[derive(Debug, Clone)]
pub struct StageLineParser {
    pattern: Regex,
}

impl StageLineParser {
    /// @ai:intent Create a parser with the stage line pattern compiled
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(STAGE_LINE_PATTERN).expect("Invalid regex"),
        }
    }

    /// @ai:intent Parse a single line, returning None when it is not a timing line
    /// @ai:effects pure
    pub fn parse_line(&self, line: &str) -> Option<TimingSample> {
        let captures = self.pattern.captures(line)?;
        let stage = captures.name("stage")?.as_str().trim();

        if stage.is_empty() {
            return None;
        }

        // Some locales print a comma as the decimal separator.
        let millis = captures
            .name("value")?
            .as_str()
            .replace(',', ".")
            .parse::<f64>()
            .ok()?;

        Some(TimingSample {
            stage: stage.to_string(),
            millis,
        })
    }

    /// @ai:intent Parse every timing line in a block of output, in order
    /// @ai:effects pure
    pub fn parse_output(&self, output: &str) -> Vec<TimingSample> {
        output
            .lines()
            .filter_map(|line| self.parse_line(line))
            .collect()
    }
}

impl Default for StageLineParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(stage: &str, millis: f64) -> Option<TimingSample> {
        Some(TimingSample {
            stage: stage.to_string(),
            millis,
        })
    }

    #[test]
    fn test_parse_simple_line() {
        let parser = StageLineParser::new();
        assert_eq!(parser.parse_line("initialization: 12.5ms"), sample("initialization", 12.5));
    }

    #[test]
    fn test_parse_hyphenated_stage_and_integer() {
        let parser = StageLineParser::new();
        assert_eq!(
            parser.parse_line("regular-ts-compilation: 840ms"),
            sample("regular-ts-compilation", 840.0)
        );
    }

    #[test]
    fn test_parse_number_forms() {
        let parser = StageLineParser::new();
        assert_eq!(parser.parse_line("a: 1.5e3ms"), sample("a", 1500.0));
        assert_eq!(parser.parse_line("a: 2E-1ms"), sample("a", 0.2));
        assert_eq!(parser.parse_line("a: .25ms"), sample("a", 0.25));
        assert_eq!(parser.parse_line("a: 3.ms"), sample("a", 3.0));
        assert_eq!(parser.parse_line("a: 4,5ms"), sample("a", 4.5));
        assert_eq!(parser.parse_line("a: +7ms"), sample("a", 7.0));
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_crlf() {
        let parser = StageLineParser::new();
        assert_eq!(parser.parse_line("  annotate-ast : 3.25 ms\r"), sample("annotate-ast", 3.25));
    }

    #[test]
    fn test_non_matching_lines_are_ignored() {
        let parser = StageLineParser::new();
        assert_eq!(parser.parse_line(""), None);
        assert_eq!(parser.parse_line("compiled 3 files"), None);
        assert_eq!(parser.parse_line("a: 5s"), None);
        assert_eq!(parser.parse_line("a: fast ms"), None);
        assert_eq!(parser.parse_line(": 5ms"), None);
        assert_eq!(parser.parse_line("   : 5ms"), None);
        assert_eq!(parser.parse_line("a: 5ms and more"), None);
    }

    #[test]
    fn test_parseable_stage_names() {
        assert!(is_parseable_stage_name("gather-type-info"));
        assert!(is_parseable_stage_name("type check"));
        assert!(!is_parseable_stage_name(""));
        assert!(!is_parseable_stage_name("phase:init"));
        assert!(!is_parseable_stage_name(" padded"));
        assert!(!is_parseable_stage_name("padded "));
    }

    #[test]
    fn test_declared_names_round_trip_through_parser() {
        let parser = StageLineParser::new();
        for name in ["initialization", "type check", "annotate-ast"] {
            assert!(is_parseable_stage_name(name));
            assert_eq!(parser.parse_line(&format!("{name}: 5ms")), sample(name, 5.0));
        }
    }

    #[test]
    fn test_parse_output_keeps_order_and_skips_noise() {
        let parser = StageLineParser::new();
        let output = "starting\nb: 20ms\nwarning: something\na: 10ms\n";

        let samples = parser.parse_output(output);
        assert_eq!(
            samples,
            vec![
                TimingSample {
                    stage: "b".to_string(),
                    millis: 20.0
                },
                TimingSample {
                    stage: "a".to_string(),
                    millis: 10.0
                },
            ]
        );
    }
}
