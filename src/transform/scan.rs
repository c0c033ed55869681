// src/transform/scan.rs

//! Structural CSS scanning shared by the prefixer and the RTL mirror.

/// A run of text and the structural byte (`{`, `}` or `;`) that ended it.
/// The last segment of the input has no terminator.
pub(crate) struct Segment<'a> {
    pub text: &'a str,
    pub terminator: Option<u8>,
}

/// Split `css` on `{`, `}` and `;` outside comments, strings and parentheses.
pub(crate) fn split_segments(css: &str) -> Vec<Segment<'_>> {
    let bytes = css.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;
    let mut parens = 0usize;
    let mut quote: Option<u8> = None;
    let mut in_comment = false;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        if in_comment {
            if b == b'*' && next == Some(b'/') {
                in_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'/' if next == Some(b'*') => {
                in_comment = true;
                i += 2;
                continue;
            }
            b'"' | b'\'' => quote = Some(b),
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b'{' | b'}' | b';' if parens == 0 => {
                segments.push(Segment {
                    text: &css[start..i],
                    terminator: Some(b),
                });
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < css.len() {
        segments.push(Segment {
            text: &css[start..],
            terminator: None,
        });
    }
    segments
}

/// Split leading whitespace and comments off a segment.
pub(crate) fn split_trivia(text: &str) -> (&str, &str) {
    let mut idx = 0;
    loop {
        let rest = &text[idx..];
        let trimmed = rest.trim_start();
        idx += rest.len() - trimmed.len();
        if trimmed.starts_with("/*") {
            match trimmed.find("*/") {
                Some(end) => idx += end + 2,
                None => return (text, ""),
            }
        } else {
            return (&text[..idx], &text[idx..]);
        }
    }
}
