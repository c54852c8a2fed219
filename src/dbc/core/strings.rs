// Lexical helpers shared by the statement recognizers.
//
// Quoted segments in DBC text may contain escaped quotes (\") and span
// several physical lines, which is common in CM_ comments.

/// Regex fragment for a numeric literal (integer, decimal or scientific).
pub(crate) const NUM: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";

/// Regex fragment for a DBC identifier.
pub(crate) const IDENT: &str = r"[A-Za-z_][A-Za-z0-9_]*";

// Count unescaped double quotes in a string.
// A quote is considered escaped if immediately preceded by an odd number of backslashes.
pub(crate) fn count_unescaped_quotes(s: &str) -> usize {
    let mut count = 0usize;
    let mut backslashes = 0usize;
    for ch in s.chars() {
        if ch == '\\' {
            backslashes += 1;
            continue;
        }
        if ch == '"' && backslashes % 2 == 0 {
            count += 1;
        }
        backslashes = 0;
    }
    count
}

/// Byte indices of every `;` outside double quotes.
pub(crate) fn top_level_semicolons(s: &str) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::new();
    let mut in_quotes = false;
    let mut backslashes = 0usize;
    for (i, ch) in s.char_indices() {
        match ch {
            '\\' => {
                backslashes += 1;
                continue;
            }
            '"' if backslashes % 2 == 0 => in_quotes = !in_quotes,
            ';' if !in_quotes => out.push(i),
            _ => {}
        }
        backslashes = 0;
    }
    out
}

// Collect the content of every "..." segment, in order.
pub(crate) fn collect_all_quoted(s: &str) -> Vec<String> {
    let bytes: &[u8] = s.as_bytes();
    let mut out: Vec<String> = Vec::new();
    let mut i: usize = 0usize;

    while i < bytes.len() {
        if bytes[i] == b'"' {
            i += 1; // skip opening quote
            let start = i;
            while i < bytes.len() && !(bytes[i] == b'"' && bytes[i - 1] != b'\\') {
                i += 1;
            }
            if i >= bytes.len() {
                break; // unclosed quote
            }
            out.push(unescape(&s[start..i]));
        }
        i += 1;
    }

    out
}

/// Replaces `\"` and `\\` escapes with the character they stand for.
pub(crate) fn unescape(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Parses an integer literal. Scientific and decimal notations are accepted
/// as long as the value is integral and fits in an `i64` (`1e3` -> 1000).
pub(crate) fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f: f64 = parse_float(s)?;
    if f.fract() != 0.0 || f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return None;
    }
    Some(f as i64)
}

/// Parses a float literal (`1`, `-0.5`, `.5`, `7e-2`). Rejects `inf`/`NaN`.
pub(crate) fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Splits a comma and/or whitespace separated name list.
pub(crate) fn split_names(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_unescaped_quotes() {
        assert_eq!(count_unescaped_quotes("\"a\""), 2);
        assert_eq!(count_unescaped_quotes("\\\"a\\\""), 0);
        assert_eq!(count_unescaped_quotes("\"a\\\\\""), 2);
    }

    #[test]
    fn test_top_level_semicolon() {
        assert_eq!(top_level_semicolons("CM_ \"a;b\";"), vec![9]);
        assert_eq!(top_level_semicolons("CM_ \"a\\\";b\""), Vec::<usize>::new());
        assert_eq!(top_level_semicolons("BO_ 1 A: 8 X; BO_ 2 B: 8 X;"), vec![12, 26]);
    }

    #[test]
    fn test_collect_all_quoted() {
        assert_eq!(
            collect_all_quoted(r#"ENUM "A","B c", "say \"hi\"""#),
            vec!["A".to_string(), "B c".to_string(), "say \"hi\"".to_string()]
        );
        assert!(collect_all_quoted("\"never closed").is_empty());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("-7"), Some(-7));
        assert_eq!(parse_integer("1e3"), Some(1000));
        assert_eq!(parse_integer("2.5"), None);
        assert_eq!(parse_integer("x"), None);
        assert_eq!(parse_float("7e-2"), Some(0.07));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("NaN"), None);
    }

    #[test]
    fn test_split_names() {
        let names: Vec<&str> = split_names("ECU1,ECU2  ECU3 ,").collect();
        assert_eq!(names, vec!["ECU1", "ECU2", "ECU3"]);
    }
}
