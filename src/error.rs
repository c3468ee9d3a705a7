//! Syntax error taxonomy and source-span diagnostic rendering.

use crate::intern::Interner;
use crate::style::Style;
use crate::suggest::{find_similar, KNOWN_WORDS};
use crate::token::{Span, TokenType};

#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn display_with_source(&self, source: &str) -> String {
        let (line_num, line_start, line_content) = self.find_context(source);
        let col = self.span.start.saturating_sub(line_start);
        let len = (self.span.end - self.span.start).max(1);
        let underline = format!("{}{}", " ".repeat(col), "^".repeat(len));

        let error_label = Style::bold(&Style::red("error"));
        let kind_str = self.kind.message();
        let line_num_str = Style::blue(&format!("{:4}", line_num));
        let pipe = Style::blue("|");
        let underline_colored = Style::red(&underline);

        let mut result = format!(
            "{}: {}\n\n{} {} {}\n     {} {}",
            error_label, kind_str, line_num_str, pipe, line_content, pipe, underline_colored
        );

        if let Some(word) = self.extract_word(source) {
            if let Some(suggestion) = find_similar(&word, KNOWN_WORDS, 2) {
                let hint = Style::cyan("help");
                result.push_str(&format!("\n     {} {}: did you mean '{}'?", pipe, hint, Style::green(suggestion)));
            }
        }

        result
    }

    fn extract_word<'a>(&self, source: &'a str) -> Option<&'a str> {
        if self.span.start < source.len() && self.span.end <= source.len() {
            let word = &source[self.span.start..self.span.end];
            if !word.is_empty() && word.chars().all(|c| c.is_alphabetic()) {
                return Some(word);
            }
        }
        None
    }

    fn find_context<'a>(&self, source: &'a str) -> (usize, usize, &'a str) {
        let mut line_num = 1;
        let mut line_start = 0;

        for (i, c) in source.char_indices() {
            if i >= self.span.start {
                break;
            }
            if c == '\n' {
                line_num += 1;
                line_start = i + 1;
            }
        }

        let line_end = source[line_start..]
            .find('\n')
            .map(|off| line_start + off)
            .unwrap_or(source.len());

        (line_num, line_start, &source[line_start..line_end])
    }
}

/// One-to-one with the `raviX_syntaxerror` call sites in the reference
/// parser, plus the capacity/budget errors named for locals and user-type
/// names.
#[derive(Debug, Clone)]
pub enum ParseErrorKind {
    UnexpectedToken { expected: TokenType, found: TokenType },
    UnexpectedSymbol { found: TokenType },
    NameExpected { found: TokenType },
    ExpectedOneOf { options: Vec<TokenType>, found: TokenType },
    ExpectedEqualsOrIn { found: TokenType },
    TooManyLocals { limit: u16 },
    OvergrownUserTypeName { limit: usize },
    MismatchedCloser { expected: TokenType, opened_at_line: u32, found: TokenType },
}

impl ParseErrorKind {
    pub fn message(&self) -> String {
        match self {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                format!("'{}' expected near '{}'", expected.text(), found.text())
            }
            ParseErrorKind::UnexpectedSymbol { found } => {
                format!("unexpected symbol near '{}'", found.text())
            }
            ParseErrorKind::NameExpected { found } => {
                format!("<name> expected near '{}'", found.text())
            }
            ParseErrorKind::ExpectedOneOf { options, found } => {
                let joined: Vec<&str> = options.iter().map(TokenType::text).collect();
                format!("{} expected near '{}'", joined.join(" or "), found.text())
            }
            ParseErrorKind::ExpectedEqualsOrIn { found } => {
                format!("'=' or 'in' expected near '{}'", found.text())
            }
            ParseErrorKind::TooManyLocals { limit } => {
                format!("too many local variables (limit is {})", limit)
            }
            ParseErrorKind::OvergrownUserTypeName { limit } => {
                format!("type name too long (limit is {} bytes)", limit)
            }
            ParseErrorKind::MismatchedCloser { expected, opened_at_line, found } => {
                format!(
                    "'{}' expected (to close block opened on line {}) near '{}'",
                    expected.text(), opened_at_line, found.text()
                )
            }
        }
    }
}

/// Placeholder for a richer, interner-aware rendering; currently the
/// plain message already carries enough context and doesn't need symbol
/// lookups, but callers that hold an `Interner` at the error site use
/// this entry point rather than `ParseErrorKind::message` directly so a
/// future variant needing name resolution has somewhere to plug in.
pub fn describe(error: &ParseError, _interner: &Interner) -> String {
    error.kind.message()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Span;

    #[test]
    fn parse_error_has_span() {
        let error = ParseError {
            kind: ParseErrorKind::NameExpected { found: TokenType::End },
            span: Span::new(5, 10, 1),
        };
        assert_eq!(error.span.start, 5);
        assert_eq!(error.span.end, 10);
    }

    #[test]
    fn display_with_source_shows_line_and_underline() {
        let error = ParseError {
            kind: ParseErrorKind::UnexpectedToken { expected: TokenType::Then, found: TokenType::Do },
            span: Span::new(8, 12, 1),
        };
        let source = "if cond do end";
        let display = error.display_with_source(source);
        assert!(display.contains("cond"), "Should contain source word: {}", display);
        assert!(display.contains("^^^^"), "Should contain underline: {}", display);
    }

    #[test]
    fn display_with_source_suggests_typo_fix() {
        let error = ParseError {
            kind: ParseErrorKind::UnexpectedSymbol { found: TokenType::Name },
            span: Span::new(0, 8, 1),
        };
        let source = "fucntion foo() end";
        let display = error.display_with_source(source);
        assert!(display.contains("did you mean"), "Should suggest fix: {}", display);
        assert!(display.contains("function"), "Should suggest 'function': {}", display);
    }

    #[test]
    fn display_with_source_has_color_codes() {
        let error = ParseError {
            kind: ParseErrorKind::NameExpected { found: TokenType::End },
            span: Span::new(0, 3, 1),
        };
        let source = "end while true do end";
        let display = error.display_with_source(source);
        assert!(display.contains("\x1b["), "Should contain ANSI escape codes: {}", display);
    }

    #[test]
    fn too_many_locals_reports_limit() {
        let kind = ParseErrorKind::TooManyLocals { limit: 200 };
        assert!(kind.message().contains("200"));
    }

    #[test]
    fn mismatched_closer_reports_opening_line() {
        let kind = ParseErrorKind::MismatchedCloser { expected: TokenType::End, opened_at_line: 3, found: TokenType::Eos };
        let msg = kind.message();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("end"));
    }
}
