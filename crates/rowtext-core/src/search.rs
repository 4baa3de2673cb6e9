//! Pattern search over reconstructed lines.

use std::fmt;

use regex::Regex;

use crate::lines::LineSequence;

/// Options controlling line search behavior.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOptions {
    /// Whether to interpret the pattern as a regex (default: `true`).
    /// When `false`, the pattern is treated as a literal string.
    pub regex: bool,
    /// Whether the search is case-sensitive (default: `true`).
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            regex: true,
            case_sensitive: true,
        }
    }
}

/// One match inside a reconstructed line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineMatch {
    /// Page number (0-indexed).
    pub page_number: usize,
    /// Index of the line within its page.
    pub line_index: usize,
    /// The full line the match was found in.
    pub line: String,
    /// The matched text.
    pub text: String,
}

/// The search pattern could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchError(pub String);

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid search pattern: {}", self.0)
    }
}

impl std::error::Error for SearchError {}

fn build_regex(pattern: &str, options: &SearchOptions) -> Result<Regex, SearchError> {
    let body = if options.regex {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };
    let source = if options.case_sensitive {
        body
    } else {
        format!("(?i){body}")
    };
    Regex::new(&source).map_err(|e| SearchError(e.to_string()))
}

/// Find every occurrence of `pattern` in `lines`, page by page.
///
/// Matches never span two lines. An empty pattern matches nothing.
///
/// # Errors
///
/// Returns [`SearchError`] if `pattern` is not a valid regex.
pub fn search_lines(
    lines: &LineSequence,
    pattern: &str,
    options: &SearchOptions,
) -> Result<Vec<LineMatch>, SearchError> {
    let re = build_regex(pattern, options)?;
    if pattern.is_empty() {
        return Ok(Vec::new());
    }

    let mut results = Vec::new();
    for (page_number, page) in lines.pages().into_iter().enumerate() {
        for (line_index, line) in page.iter().enumerate() {
            for m in re.find_iter(line) {
                if m.is_empty() {
                    continue;
                }
                results.push(LineMatch {
                    page_number,
                    line_index,
                    line: line.clone(),
                    text: m.as_str().to_string(),
                });
            }
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LineSequence {
        LineSequence::from(vec![
            "Date : 01/01/2024".to_string(),
            "Amount : MUR 100.00".to_string(),
            String::new(),
            "Reference : TRX-42".to_string(),
            "amount due : none".to_string(),
            String::new(),
        ])
    }

    #[test]
    fn search_options_defaults() {
        let opts = SearchOptions::default();
        assert!(opts.regex);
        assert!(opts.case_sensitive);
    }

    #[test]
    fn regex_search_reports_page_and_line() {
        let matches = search_lines(&sample(), r"TRX-\d+", &SearchOptions::default()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].page_number, 1);
        assert_eq!(matches[0].line_index, 0);
        assert_eq!(matches[0].text, "TRX-42");
        assert_eq!(matches[0].line, "Reference : TRX-42");
    }

    #[test]
    fn literal_search_escapes_metacharacters() {
        let opts = SearchOptions {
            regex: false,
            ..Default::default()
        };
        let matches = search_lines(&sample(), "100.00", &opts).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line_index, 1);

        let none = search_lines(&sample(), "100x00", &opts).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn case_insensitive_search() {
        let opts = SearchOptions {
            case_sensitive: false,
            ..Default::default()
        };
        let matches = search_lines(&sample(), "amount", &opts).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].page_number, 0);
        assert_eq!(matches[1].page_number, 1);
    }

    #[test]
    fn case_sensitive_by_default() {
        let matches = search_lines(&sample(), "amount", &SearchOptions::default()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line, "amount due : none");
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let err = search_lines(&sample(), "(unclosed", &SearchOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("invalid search pattern"));
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        let matches = search_lines(&sample(), "", &SearchOptions::default()).unwrap();
        assert!(matches.is_empty());
    }
}
