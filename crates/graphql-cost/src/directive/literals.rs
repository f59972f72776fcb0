//! String literals of GraphQL source text.

const BLOCK_QUOTE: &str = r#"""""#;

/// Values of the string literals in `source`, in order. Comments are skipped.
///
/// Returns `None` when a string is not terminated or holds an invalid escape.
pub(super) fn strings(source: &str) -> Option<Vec<String>> {
    let mut strings = Vec::new();
    let mut rest = source;

    while let Some(offset) = rest.find(['"', '#']) {
        rest = &rest[offset..];

        if rest.starts_with('#') {
            rest = rest.find('\n').map_or("", |end| &rest[end..]);
        } else if let Some(block) = rest.strip_prefix(BLOCK_QUOTE) {
            let end = block_end(block)?;
            strings.push(block_string(&block[..end]));
            rest = &block[end + BLOCK_QUOTE.len()..];
        } else {
            let (value, len) = string(&rest[1..])?;
            strings.push(value);
            rest = &rest[1 + len..];
        }
    }

    Some(strings)
}

fn block_end(block: &str) -> Option<usize> {
    let mut from = 0;

    loop {
        let end = from + block[from..].find(BLOCK_QUOTE)?;

        if !block[..end].ends_with('\\') {
            return Some(end);
        }

        from = end + BLOCK_QUOTE.len();
    }
}

/// Common indentation removed from every line but the first, blank leading
/// and trailing lines dropped.
fn block_string(raw: &str) -> String {
    let raw = raw.replace(r#"\""""#, BLOCK_QUOTE);
    let lines = raw.lines().collect::<Vec<_>>();

    let indent = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start_matches([' ', '\t']);
            (!content.is_empty()).then_some(line.len() - content.len())
        })
        .min()
        .unwrap_or(0);

    let lines = lines
        .iter()
        .enumerate()
        .map(|(i, &line)| if i == 0 { line } else { line.get(indent..).unwrap_or_default() })
        .collect::<Vec<_>>();

    let is_blank = |line: &&str| line.trim_start_matches([' ', '\t']).is_empty();
    let first = lines.iter().position(|line| !is_blank(line)).unwrap_or(lines.len());
    let last = lines.iter().rposition(|line| !is_blank(line)).map_or(first, |last| last + 1);

    lines[first..last].join("\n")
}

/// Value of the string starting after its opening quote, and the length
/// consumed up to and including the closing quote.
fn string(source: &str) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = source.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, i + 1)),
            '\n' | '\r' => return None,
            '\\' => {
                let (_, escaped) = chars.next()?;

                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    'u' => {
                        let hex = chars.by_ref().take(4).map(|(_, c)| c).collect::<String>();
                        char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?
                    }
                    '"' | '\\' | '/' => escaped,
                    _ => return None,
                });
            }
            c => value.push(c),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_strings() {
        assert_eq!(
            strings(r#"["id", "a\"b", "A\n", ""]"#),
            Some(vec!["id".to_owned(), "a\"b".to_owned(), "A\n".to_owned(), String::new()])
        );
    }

    #[test]
    fn block_strings() {
        let source = "[\"\"\"id\"\"\", \"\"\"\n    first\n      second\n\n  \"\"\", \"\"\"say \\\"\"\" \"\"\"]";

        assert_eq!(
            strings(source),
            Some(vec![
                "id".to_owned(),
                "first\n  second".to_owned(),
                "say \"\"\" ".to_owned()
            ])
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            strings("[\n  \"a\" # \"not\" a string\n  2\n  \"b\"\n]"),
            Some(vec!["a".to_owned(), "b".to_owned()])
        );
    }

    #[test]
    fn unterminated() {
        assert_eq!(strings(r#"["open]"#), None);
        assert_eq!(strings(r#"["""open]"#), None);
        assert_eq!(strings(r#"["\q"]"#), None);
    }
}
