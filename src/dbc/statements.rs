//! Reassembly of physical lines into logical DBC statements.
//!
//! A statement ends at its first `;` outside quotes. Text after that `;`
//! starts a new statement only when it begins with a known keyword, so
//! comments embedding `;` or quotes spanning several lines survive intact.
//! A statement that is not terminated absorbs the following lines (joined
//! with `\n`) until a keyword-prefixed line shows up.

use std::iter::Peekable;
use std::str::Lines;

use crate::dbc::core::strings::{count_unescaped_quotes, top_level_semicolons};

/// Keywords that open a statement handled by a recognizer.
const STATEMENT_KEYWORDS: [&str; 14] = [
    "BU_:",
    "BO_ ",
    "SG_ ",
    "CM_ ",
    "VAL_TABLE_ ",
    "VAL_ ",
    "BA_DEF_ ",
    "BA_DEF_DEF_ ",
    "BA_ ",
    "EV_ ",
    "ENVVAR_DATA_ ",
    "SG_MUL_VAL_ ",
    "SIG_VALTYPE_ ",
    "BO_TX_BU_ ",
];

/// Keywords of statements that are recognized but carry nothing we model.
pub(crate) const IGNORED_KEYWORDS: [&str; 20] = [
    "VERSION",
    "NS_",
    "BS_",
    "CAT_DEF_",
    "CAT_",
    "FILTER",
    "EV_DATA_",
    "SGTYPE_",
    "SGTYPE_VAL_",
    "BA_DEF_SGTYPE_",
    "BA_SGTYPE_",
    "SIG_TYPE_REF_",
    "SIG_GROUP_",
    "SIGTYPE_VALTYPE_",
    "BA_DEF_REL_",
    "BA_REL_",
    "BA_DEF_DEF_REL_",
    "BU_SG_REL_",
    "BU_EV_REL_",
    "BU_BO_REL_",
];

/// First token of a statement with any trailing `:` removed.
pub(crate) fn leading_keyword(line: &str) -> &str {
    line.split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches(':')
}

pub(crate) fn is_ignored(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("//") || IGNORED_KEYWORDS.contains(&leading_keyword(line))
}

/// True when `line` opens a new statement.
pub(crate) fn is_keyword_line(line: &str) -> bool {
    let line = line.trim();
    STATEMENT_KEYWORDS.iter().any(|k| line.starts_with(k)) || is_ignored(line)
}

/// Sequential source of physical lines with one line of lookahead.
pub(crate) trait LineSource {
    fn next_line(&mut self) -> Option<String>;
    fn peek_line(&mut self) -> Option<&str>;
}

/// [`LineSource`] over text already held in memory.
pub(crate) struct TextLines<'a> {
    lines: Peekable<Lines<'a>>,
}

impl<'a> TextLines<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().peekable(),
        }
    }
}

impl LineSource for TextLines<'_> {
    fn next_line(&mut self) -> Option<String> {
        self.lines.next().map(str::to_string)
    }

    fn peek_line(&mut self) -> Option<&str> {
        self.lines.peek().copied()
    }
}

/// One logical statement and the physical line it starts on (1-based).
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Statement {
    pub(crate) line: usize,
    pub(crate) text: String,
}

pub(crate) struct StatementReader<'a> {
    source: Box<dyn LineSource + 'a>,
    line: usize,
    pending: Option<Statement>,
    returned: Vec<Statement>,
}

impl<'a> StatementReader<'a> {
    pub(crate) fn new(source: Box<dyn LineSource + 'a>) -> Self {
        Self {
            source,
            line: 0,
            pending: None,
            returned: Vec::new(),
        }
    }

    pub(crate) fn from_text(text: &'a str) -> Self {
        Self::new(Box::new(TextLines::new(text)))
    }

    /// Number of physical lines consumed so far.
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// Hands a statement back; it is returned as is by the next call to
    /// [`next_statement`](Self::next_statement). Last in, first out.
    pub(crate) fn push_back(&mut self, statement: Statement) {
        self.returned.push(statement);
    }

    pub(crate) fn next_statement(&mut self) -> Option<Statement> {
        if let Some(returned) = self.returned.pop() {
            return Some(returned);
        }
        if let Some(pending) = self.pending.take() {
            return Some(self.complete(pending));
        }

        let raw: String = self.source.next_line()?;
        self.line += 1;
        let first: &str = raw.trim();
        if first.is_empty() {
            return Some(Statement {
                line: self.line,
                text: String::new(),
            });
        }
        let statement = Statement {
            line: self.line,
            text: first.to_string(),
        };
        Some(self.complete(statement))
    }

    fn complete(&mut self, mut statement: Statement) -> Statement {
        loop {
            if let Some(split) = keyword_remainder(&statement.text) {
                let rest: String = statement.text[split..].trim().to_string();
                statement.text.truncate(split);
                self.pending = Some(Statement {
                    line: self.line,
                    text: rest,
                });
                break;
            }
            // `//` comments never span lines
            if looks_terminated(&statement.text) || statement.text.starts_with("//") {
                break;
            }
            match self.source.peek_line() {
                Some(next) if !is_keyword_line(next) => {}
                _ => break,
            }
            let Some(next) = self.source.next_line() else {
                break;
            };
            self.line += 1;
            statement.text.push('\n');
            statement.text.push_str(&next);
        }

        drop_trailing_empty_lines(&mut statement.text);
        statement
    }
}

/// Byte offset just past the first top-level `;` followed by a keyword.
fn keyword_remainder(text: &str) -> Option<usize> {
    top_level_semicolons(text).into_iter().find_map(|i| {
        let rest = text[i + 1..].trim_start();
        (!rest.is_empty() && is_keyword_line(rest)).then_some(i + 1)
    })
}

fn looks_terminated(text: &str) -> bool {
    text.trim_end().ends_with(';') && count_unescaped_quotes(text) % 2 == 0
}

fn drop_trailing_empty_lines(text: &mut String) {
    while let Some(pos) = text.rfind('\n') {
        if !text[pos + 1..].trim().is_empty() {
            break;
        }
        text.truncate(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements(text: &str) -> Vec<Statement> {
        let mut reader = StatementReader::from_text(text);
        std::iter::from_fn(|| reader.next_statement()).collect()
    }

    fn texts(text: &str) -> Vec<String> {
        statements(text).into_iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_keyword_detection() {
        assert!(is_keyword_line("BU_: A B"));
        assert!(is_keyword_line(" SG_ S : 0|8@1+ (1,0) [0|0] \"\" X"));
        assert!(is_keyword_line("VAL_ 1 S 0 \"a\";"));
        assert!(is_keyword_line("BS_:"));
        assert!(is_keyword_line("// free text"));
        assert!(is_keyword_line("SIG_GROUP_ 1 G 1 : S;"));
        assert!(!is_keyword_line("VAL_TABLE_"));
        assert!(!is_keyword_line("continued text"));
        assert!(!is_keyword_line(""));
    }

    #[test]
    fn test_multiline_comment_with_semicolons() {
        let text = "CM_ SG_ 1043 Speed \"first; line\nsecond line;\nthird\";\nBO_ 1 M: 8 X";
        let got = statements(text);
        assert_eq!(
            got[0],
            Statement {
                line: 1,
                text: "CM_ SG_ 1043 Speed \"first; line\nsecond line;\nthird\";".into()
            }
        );
        assert_eq!(got[1].line, 4);
        assert_eq!(got[1].text, "BO_ 1 M: 8 X");
    }

    #[test]
    fn test_several_statements_on_one_line() {
        assert_eq!(
            texts("BA_ \"A\" 1; BA_ \"B\" 2;  BA_ \"C\" 3;"),
            vec!["BA_ \"A\" 1;", "BA_ \"B\" 2;", "BA_ \"C\" 3;"]
        );
        // non-keyword remainder stays with its statement
        assert_eq!(texts("BA_ \"A\" 1; trailing"), vec!["BA_ \"A\" 1; trailing"]);
    }

    #[test]
    fn test_unterminated_statement_absorbs_lines() {
        let text = "VAL_TABLE_ T 1 \"one\"\n 0 \"zero\" ;\n\nBO_ 2 N: 8 X";
        assert_eq!(
            texts(text),
            vec!["VAL_TABLE_ T 1 \"one\"\n 0 \"zero\" ;", "", "BO_ 2 N: 8 X"]
        );
    }

    #[test]
    fn test_trailing_empty_lines_dropped() {
        let got = statements("BU_: A B\n\n   \nBO_ 1 M: 8 A\n");
        assert_eq!(got[0].text, "BU_: A B");
        assert_eq!(got[1].line, 4);
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn test_push_back_precedes_split_remainder() {
        let mut reader = StatementReader::from_text("CM_ \"a\nBA_ \"A\" 1; BA_ \"B\" 2;\nBU_: X");
        let first = reader.next_statement().unwrap();
        assert_eq!(first.text, "CM_ \"a");
        let second = reader.next_statement().unwrap();
        assert_eq!(second.text, "BA_ \"A\" 1;");

        reader.push_back(second.clone());
        reader.push_back(first.clone());
        assert_eq!(reader.next_statement(), Some(first));
        assert_eq!(reader.next_statement(), Some(second));
        assert_eq!(reader.next_statement().unwrap().text, "BA_ \"B\" 2;");
        assert_eq!(reader.next_statement().unwrap().line, 3);
        assert_eq!(reader.next_statement(), None);
    }

    #[test]
    fn test_empty_first_line() {
        let got = statements("\nBU_:");
        assert_eq!(got[0], Statement { line: 1, text: String::new() });
        assert_eq!(got[1], Statement { line: 2, text: "BU_:".into() });
    }
}
