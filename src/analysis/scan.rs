//! Text helpers shared by the analyzers: line lookup and brace scanning.
//!
//! Everything here works on raw text. Braces inside strings and comments are
//! counted like any other brace.

/// 1-based line number of the first occurrence of `needle` in `content`.
///
/// This is an approximation: when the same text appears more than once, the
/// first occurrence wins even if the match came from a later one. Returns 1
/// when `needle` is not found.
pub fn line_of(content: &str, needle: &str) -> usize {
    match content.find(needle) {
        Some(idx) => content[..idx].matches('\n').count() + 1,
        None => 1,
    }
}

/// Number of `\n`-separated lines in `text`. An empty string is one line.
pub fn line_count(text: &str) -> usize {
    text.matches('\n').count() + 1
}

/// `{` count minus `}` count.
pub fn brace_delta(text: &str) -> isize {
    text.bytes().fold(0, |depth, b| match b {
        b'{' => depth + 1,
        b'}' => depth - 1,
        _ => depth,
    })
}

/// Deepest brace nesting reached while scanning `content` front to back.
/// Unmatched closing braces drive the running depth below zero.
pub fn max_depth(content: &str) -> isize {
    let mut depth = 0isize;
    let mut max = 0isize;
    for b in content.bytes() {
        match b {
            b'{' => {
                depth += 1;
                max = max.max(depth);
            }
            b'}' => depth -= 1,
            _ => {}
        }
    }
    max
}

/// Byte offset just past the `}` that closes the first block opened at or
/// after `from`. `None` if the block never closes.
pub fn block_end(content: &str, from: usize) -> Option<usize> {
    let mut depth = 0isize;
    let mut opened = false;
    for (offset, b) in content.as_bytes().get(from..)?.iter().enumerate() {
        match b {
            b'{' => {
                opened = true;
                depth += 1;
            }
            b'}' => {
                depth -= 1;
                if opened && depth == 0 {
                    return Some(from + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Text from the first `{` to the last `}` (inclusive) when at least
/// `min_inner` characters sit between them.
pub fn outermost_block(content: &str, min_inner: usize) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    let inner = &content[start + 1..end];
    if inner.chars().count() < min_inner {
        return None;
    }
    Some(&content[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of_first_occurrence() {
        let content = "a\nb\nc\nb";
        assert_eq!(line_of(content, "a"), 1);
        assert_eq!(line_of(content, "b"), 2);
        assert_eq!(line_of(content, "c"), 3);
    }

    #[test]
    fn test_line_of_missing_defaults_to_one() {
        assert_eq!(line_of("a\nb", "zzz"), 1);
        assert_eq!(line_of("", "x"), 1);
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a\nb\n"), 3);
    }

    #[test]
    fn test_brace_delta() {
        assert_eq!(brace_delta("const a = {"), 1);
        assert_eq!(brace_delta("{ { } }"), 0);
        assert_eq!(brace_delta("};"), -1);
    }

    #[test]
    fn test_max_depth() {
        assert_eq!(max_depth("{{}{{{}}}}"), 4);
        assert_eq!(max_depth("no braces"), 0);
        assert_eq!(max_depth("}}{{{"), 1);
    }

    #[test]
    fn test_block_end_matches_nested_braces() {
        let content = "function f() { if (x) { y(); } return 1; } tail";
        let end = block_end(content, 0).unwrap();
        assert_eq!(&content[..end], "function f() { if (x) { y(); } return 1; }");
    }

    #[test]
    fn test_block_end_unclosed() {
        assert_eq!(block_end("function f() { if (x) {", 0), None);
        assert_eq!(block_end("abc", 10), None);
    }

    #[test]
    fn test_outermost_block() {
        let content = format!("x {{{}}} y", "a".repeat(20));
        assert!(outermost_block(&content, 20).is_some());
        assert!(outermost_block(&content, 21).is_none());
        assert!(outermost_block("} {", 0).is_none());
    }
}
