//! # Variable Extraction
//!
//! Finds the `{{name}}` placeholders in prompt content. A placeholder is the shortest run of
//! text between `{{` and `}}` on a single line; the captured name is trimmed of surrounding
//! whitespace. Placeholders whose name is empty after trimming are ignored.

use nom::IResult;
use nom::Parser;
use nom::bytes::complete::{tag, take_until};
use nom::combinator::verify;
use nom::sequence::delimited;

const LINE_TERMINATORS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

/// Returns the distinct placeholder names in `text`, in order of first appearance.
///
/// ```rust
/// use promptmanager_core::parser::extract_variables;
///
/// let variables = extract_variables("Hello {{name}}, your {{name}} is {{ status }}");
/// assert_eq!(variables, vec!["name", "status"]);
/// ```
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();
    let mut remaining = text;
    let mut line_end = 0;

    while let Ok((candidate, _)) = until_open_delimiter(remaining) {
        let start = text.len() - candidate.len();
        if start >= line_end {
            line_end = candidate
                .find(LINE_TERMINATORS)
                .map_or(text.len(), |end| start + end);
        }
        match parse_placeholder(&text[start..line_end]) {
            Ok((rest, name)) => {
                let name = name.trim();
                if !name.is_empty() && !variables.iter().any(|v| v == name) {
                    variables.push(name.to_string());
                }
                remaining = &text[line_end - rest.len()..];
            }
            // No `}}` follows on this line, so no later `{{` on it can close either.
            Err(_) => remaining = &text[line_end..],
        }
    }

    variables
}

pub fn parse_placeholder(input: &str) -> IResult<&str, &str> {
    delimited(
        tag("{{"),
        verify(take_until("}}"), |s: &&str| !s.contains(LINE_TERMINATORS)),
        tag("}}"),
    )
    .parse(input)
}

fn until_open_delimiter(input: &str) -> IResult<&str, &str> {
    take_until("{{").parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_placeholder() {
        let result = parse_placeholder("{{topic}} is the subject");
        assert_eq!(result, Ok((" is the subject", "topic")));
    }

    #[test]
    fn test_parse_placeholder_keeps_inner_whitespace() {
        let result = parse_placeholder("{{ status }}");
        assert_eq!(result, Ok(("", " status ")));
    }

    #[test]
    fn test_parse_placeholder_is_non_greedy() {
        let result = parse_placeholder("{{a}} and {{b}}");
        assert_eq!(result, Ok((" and {{b}}", "a")));
    }

    #[test]
    fn test_parse_placeholder_unclosed() {
        assert!(parse_placeholder("Hello {{name").is_err());
        assert!(parse_placeholder("{{name").is_err());
    }

    #[test]
    fn test_parse_placeholder_across_lines() {
        assert!(parse_placeholder("{{na\nme}}").is_err());
        assert!(parse_placeholder("{{na\r\nme}}").is_err());
    }

    #[test]
    fn test_extract_variables() {
        let variables = extract_variables("Hello {{name}}, your {{name}} is {{ status }}");
        assert_eq!(variables, vec!["name".to_string(), "status".to_string()]);
    }

    #[test]
    fn test_extract_variables_without_placeholders() {
        assert!(extract_variables("no variables here").is_empty());
        assert!(extract_variables("").is_empty());
        assert!(extract_variables("single {braces} only").is_empty());
    }

    #[test]
    fn test_extract_variables_preserves_first_seen_order() {
        let variables = extract_variables("{{b}} {{a}} {{b}} {{c}} {{a}}");
        assert_eq!(variables, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_extract_variables_trims_before_deduplicating() {
        let variables = extract_variables("{{name}} {{ name }} {{\tname\t}}");
        assert_eq!(variables, vec!["name"]);
    }

    #[test]
    fn test_extract_variables_drops_empty_names() {
        let variables = extract_variables("{{}} {{   }} {{real}}");
        assert_eq!(variables, vec!["real"]);
    }

    #[test]
    fn test_extract_variables_consecutive() {
        let variables = extract_variables("{{a}}{{b}}{{c}}");
        assert_eq!(variables, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_extract_variables_extra_braces() {
        // The inner text starts right after the first two braces.
        let variables = extract_variables("{{{name}}}");
        assert_eq!(variables, vec!["{name"]);
    }

    #[test]
    fn test_extract_variables_unclosed_is_ignored() {
        let variables = extract_variables("Hello {{name, welcome to {{place}}");
        assert_eq!(variables, vec!["name, welcome to {{place"]);

        let variables = extract_variables("Hello {{name");
        assert!(variables.is_empty());
    }

    #[test]
    fn test_extract_variables_retries_after_line_break() {
        let variables = extract_variables("{{broken\nline}} then {{ok}}");
        assert_eq!(variables, vec!["ok"]);
    }

    #[test]
    fn test_extract_variables_multibyte_text() {
        let variables = extract_variables("¿{{nombre}}? ünïcödé {{ 名前 }}");
        assert_eq!(variables, vec!["nombre", "名前"]);
    }

    #[test]
    fn test_extract_variables_long_unclosed_runs() {
        assert!(extract_variables(&"{{".repeat(200_000)).is_empty());

        let mut text = "{{\n".repeat(100_000);
        text.push_str("{{last}}");
        assert_eq!(extract_variables(&text), vec!["last"]);
    }

    #[test]
    fn test_extract_variables_many_placeholders_on_one_line() {
        let text = "{{a}} {{b}} ".repeat(100_000);
        assert_eq!(extract_variables(&text), vec!["a", "b"]);
    }
}
