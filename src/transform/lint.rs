// src/transform/lint.rs

//! Line-based JavaScript lint checks.
//!
//! String literals and comments are blanked out before the token checks run,
//! so `"a == b"` inside a string or a commented-out `debugger` is not
//! reported. Whitespace and length checks look at the raw line.

use std::fmt;

pub const MAX_LINE_LENGTH: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LintRule {
    Eqeqeq,
    Debugger,
    TrailingWhitespace,
    MixedIndentation,
    MaxLineLength,
}

impl LintRule {
    pub fn as_str(self) -> &'static str {
        match self {
            LintRule::Eqeqeq => "eqeqeq",
            LintRule::Debugger => "debugger",
            LintRule::TrailingWhitespace => "trailing-whitespace",
            LintRule::MixedIndentation => "mixed-indentation",
            LintRule::MaxLineLength => "max-line-length",
        }
    }
}

impl fmt::Display for LintRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem. `line` and `column` are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintViolation {
    pub line: usize,
    pub column: usize,
    pub rule: LintRule,
    pub message: String,
}

impl LintViolation {
    fn new(line: usize, column: usize, rule: LintRule, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            rule,
            message: message.into(),
        }
    }
}

/// Lint a whole source file. Violations come back ordered by line, then column.
pub fn lint(source: &str) -> Vec<LintViolation> {
    let masked = mask_strings_and_comments(source);
    let mut violations = Vec::new();

    for (idx, (raw, code)) in source.lines().zip(masked.lines()).enumerate() {
        let line_no = idx + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let code: Vec<char> = code.chars().collect();

        check_equality(&code, line_no, &mut violations);
        check_debugger(&code, line_no, &mut violations);
        check_whitespace(raw, line_no, &mut violations);

        let width = raw.chars().count();
        if width > MAX_LINE_LENGTH {
            violations.push(LintViolation::new(
                line_no,
                MAX_LINE_LENGTH + 1,
                LintRule::MaxLineLength,
                format!("Line is too long ({width} > {MAX_LINE_LENGTH})."),
            ));
        }
    }

    violations.sort_by_key(|v| (v.line, v.column));
    violations
}

/// Render violations for one file in the compact "stylish" layout.
pub fn format_stylish(file: &str, violations: &[LintViolation]) -> String {
    let mut out = String::new();
    out.push_str(file);
    out.push('\n');
    for v in violations {
        out.push_str(&format!(
            "  line {:<4} col {:<4} {}  ({})\n",
            v.line, v.column, v.message, v.rule
        ));
    }
    let noun = if violations.len() == 1 { "warning" } else { "warnings" };
    out.push_str(&format!("\n  {} {noun}\n", violations.len()));
    out
}

fn check_equality(code: &[char], line: usize, out: &mut Vec<LintViolation>) {
    let mut i = 0;
    while i + 1 < code.len() {
        let (c, next) = (code[i], code[i + 1]);
        let third = code.get(i + 2).copied();
        let loose = match (c, next) {
            ('=', '=') | ('!', '=') => third != Some('='),
            _ => {
                i += 1;
                continue;
            }
        };
        // `<==`, `>==` and `===` runs are not loose comparisons either.
        let prev_is_op = i > 0 && matches!(code[i - 1], '=' | '<' | '>' | '!');
        if loose && !prev_is_op {
            let (expected, saw) = if c == '!' { ("!==", "!=") } else { ("===", "==") };
            out.push(LintViolation::new(
                line,
                i + 1,
                LintRule::Eqeqeq,
                format!("Expected '{expected}' and instead saw '{saw}'."),
            ));
        }
        i += if loose { 2 } else { 3 };
    }
}

fn check_debugger(code: &[char], line: usize, out: &mut Vec<LintViolation>) {
    const WORD: &[char] = &['d', 'e', 'b', 'u', 'g', 'g', 'e', 'r'];
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';

    for start in 0..code.len().saturating_sub(WORD.len() - 1) {
        if &code[start..start + WORD.len()] != WORD {
            continue;
        }
        let before_ok = start == 0 || !is_ident(code[start - 1]);
        let after_ok = code.get(start + WORD.len()).is_none_or(|c| !is_ident(*c));
        if before_ok && after_ok {
            out.push(LintViolation::new(
                line,
                start + 1,
                LintRule::Debugger,
                "Forgotten 'debugger' statement?",
            ));
        }
    }
}

fn check_whitespace(raw: &str, line: usize, out: &mut Vec<LintViolation>) {
    let trimmed = raw.trim_end_matches([' ', '\t']);
    if trimmed.len() != raw.len() && !trimmed.is_empty() {
        out.push(LintViolation::new(
            line,
            trimmed.chars().count() + 1,
            LintRule::TrailingWhitespace,
            "Trailing whitespace.",
        ));
    }

    let indent: String = raw.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
    if indent.contains(' ') && indent.contains('\t') {
        out.push(LintViolation::new(
            line,
            1,
            LintRule::MixedIndentation,
            "Mixed spaces and tabs.",
        ));
    }
}

/// Replace the contents of string literals and comments with spaces,
/// keeping newlines so line/column positions stay valid.
fn mask_strings_and_comments(source: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Str(char),
        LineComment,
        BlockComment,
    }

    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut i = 0;

    let blank = |c: char| if c == '\n' || c == '\r' { c } else { ' ' };

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match state {
            State::Code => match (c, next) {
                ('/', Some('/')) => {
                    state = State::LineComment;
                    out.push_str("  ");
                    i += 2;
                    continue;
                }
                ('/', Some('*')) => {
                    state = State::BlockComment;
                    out.push_str("  ");
                    i += 2;
                    continue;
                }
                ('"' | '\'' | '`', _) => {
                    state = State::Str(c);
                    out.push(c);
                }
                _ => out.push(c),
            },
            State::Str(quote) => {
                if c == '\\' {
                    out.push(' ');
                    if let Some(n) = next {
                        out.push(blank(n));
                    }
                    i += 2;
                    continue;
                }
                if c == quote {
                    state = State::Code;
                    out.push(c);
                } else if c == '\n' && quote != '`' {
                    // Unterminated literal; resume scanning on the next line.
                    state = State::Code;
                    out.push(c);
                } else {
                    out.push(blank(c));
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                }
                out.push(blank(c));
            }
            State::BlockComment => {
                if c == '*' && next == Some('/') {
                    state = State::Code;
                    out.push_str("  ");
                    i += 2;
                    continue;
                }
                out.push(blank(c));
            }
        }
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(source: &str) -> Vec<(usize, usize, LintRule)> {
        lint(source)
            .into_iter()
            .map(|v| (v.line, v.column, v.rule))
            .collect()
    }

    #[test]
    fn clean_source_has_no_violations() {
        let src = "var a = 1;\nif (a === 1 && a !== 2) {\n  run(a => a);\n}\n";
        assert!(lint(src).is_empty());
    }

    #[test]
    fn loose_equality_is_reported_with_position() {
        let v = lint("if (a == b || c != d) {}\n");
        assert_eq!(v.len(), 2);
        assert_eq!((v[0].line, v[0].column, v[0].rule), (1, 7, LintRule::Eqeqeq));
        assert_eq!(v[0].message, "Expected '===' and instead saw '=='.");
        assert_eq!((v[1].column, v[1].rule), (17, LintRule::Eqeqeq));
        assert_eq!(v[1].message, "Expected '!==' and instead saw '!='.");
    }

    #[test]
    fn comparisons_inside_strings_and_comments_are_ignored() {
        let src = "var s = \"a == b\"; // x == y\n/* debugger */ var t = 'debugger';\n";
        assert!(lint(src).is_empty(), "{:?}", lint(src));
    }

    #[test]
    fn debugger_statement_is_reported_as_a_whole_word() {
        assert_eq!(rules("  debugger;\n"), vec![(1, 3, LintRule::Debugger)]);
        assert!(lint("var debuggerEnabled = true;\n").is_empty());
    }

    #[test]
    fn whitespace_problems_are_reported() {
        let src = "var a = 1;  \n\t  var b = 2;\n";
        assert_eq!(
            rules(src),
            vec![
                (1, 11, LintRule::TrailingWhitespace),
                (2, 1, LintRule::MixedIndentation),
            ]
        );
    }

    #[test]
    fn long_lines_are_reported() {
        let src = format!("var a = '{}';\n", "x".repeat(130));
        assert_eq!(rules(&src), vec![(1, 121, LintRule::MaxLineLength)]);
    }

    #[test]
    fn stylish_report_lists_each_violation() {
        let v = lint("a == b\n");
        let report = format_stylish("src/assets/js/main.js", &v);
        assert!(report.starts_with("src/assets/js/main.js\n"));
        assert!(report.contains("line 1    col 3    Expected '===' and instead saw '=='.  (eqeqeq)"));
        assert!(report.contains("1 warning"));
    }
}
