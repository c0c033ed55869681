// src/transform/rtl.rs

//! Left-to-right to right-to-left stylesheet mirroring.
//!
//! The input is split into segments on `{`, `}` and `;` (outside comments,
//! strings and parentheses). Segments that end a declaration inside a block
//! are mirrored; selectors, at-rules and everything else pass through as-is.
//!
//! A `/*rtl:ignore*/` comment directly before a declaration keeps it
//! unchanged. The `sourceMappingURL` comment of the input is dropped, since
//! the mirrored file has no map of its own.

use super::scan::{split_segments, split_trivia};

const SOURCE_MAP_MARKER: &str = "/*# sourceMappingURL=";

/// Mirror a whole stylesheet.
pub fn mirror(css: &str) -> String {
    let css = strip_source_map_comments(css);
    let mut out = String::with_capacity(css.len());
    let mut depth = 0usize;

    for segment in split_segments(&css) {
        let in_block = depth > 0;
        match segment.terminator {
            Some(b'{') => {
                out.push_str(segment.text);
                out.push('{');
                depth += 1;
            }
            Some(b'}') => {
                push_declaration(&mut out, segment.text, in_block);
                out.push('}');
                depth = depth.saturating_sub(1);
            }
            Some(b';') => {
                push_declaration(&mut out, segment.text, in_block);
                out.push(';');
            }
            _ => out.push_str(segment.text),
        }
    }

    out
}

fn strip_source_map_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find(SOURCE_MAP_MARKER) {
        out.push_str(&rest[..start]);
        rest = match rest[start..].find("*/") {
            Some(end) => &rest[start + end + 2..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}

fn has_ignore_directive(trivia: &str) -> bool {
    let mut rest = trivia;
    while let Some(start) = rest.find("/*") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("*/") else { break };
        let body: String = after[..end].chars().filter(|c| !c.is_whitespace()).collect();
        if body == "rtl:ignore" {
            return true;
        }
        rest = &after[end + 2..];
    }
    false
}

fn push_declaration(out: &mut String, text: &str, in_block: bool) {
    if !in_block {
        out.push_str(text);
        return;
    }

    let (trivia, body) = split_trivia(text);
    out.push_str(trivia);

    let Some(colon) = body.find(':') else {
        out.push_str(body);
        return;
    };
    if body.starts_with('@') || has_ignore_directive(trivia) {
        out.push_str(body);
        return;
    }

    let (prop_raw, value_raw) = (&body[..colon], &body[colon + 1..]);
    let property = prop_raw.trim().to_ascii_lowercase();
    if property.starts_with("--") {
        out.push_str(body);
        return;
    }

    out.push_str(&mirror_property(&property));
    out.push_str(&prop_raw[prop_raw.trim_end().len()..]);
    out.push(':');
    out.push_str(&mirror_value_preserving_space(&property, value_raw));
}

/// Swap `left` and `right` parts of a property name.
pub fn mirror_property(property: &str) -> String {
    property
        .split('-')
        .map(|part| match part {
            "left" => "right",
            "right" => "left",
            other => other,
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn mirror_value_preserving_space(property: &str, raw: &str) -> String {
    let core = raw.trim();
    if core.is_empty() {
        return raw.to_string();
    }
    let lead = &raw[..raw.len() - raw.trim_start().len()];
    let trail = &raw[raw.trim_end().len()..];

    let (value, important) = match core.to_ascii_lowercase().rfind("!important") {
        Some(pos) => (core[..pos].trim_end(), &core[pos..]),
        None => (core, ""),
    };

    let mut mirrored = mirror_value(property, value);
    if !important.is_empty() {
        mirrored.push(' ');
        mirrored.push_str(important);
    }
    format!("{lead}{mirrored}{trail}")
}

/// Mirror a declaration value given its (lower-case, unmirrored) property.
pub fn mirror_value(property: &str, value: &str) -> String {
    match property {
        "float" | "clear" | "text-align" | "background-position" | "background-position-x" => {
            swap_words(value, &[("left", "right")])
        }
        "direction" => swap_words(value, &[("ltr", "rtl")]),
        "cursor" => swap_words(
            value,
            &[
                ("e-resize", "w-resize"),
                ("ne-resize", "nw-resize"),
                ("se-resize", "sw-resize"),
            ],
        ),
        "margin" | "padding" | "border-width" | "border-color" | "border-style" => {
            swap_four(value, |[a, b, c, d]| [a, d, c, b])
        }
        "border-radius" => value
            .split('/')
            .map(|half| {
                let mirrored = swap_four(half.trim(), |[a, b, c, d]| [b, a, d, c]);
                let lead = &half[..half.len() - half.trim_start().len()];
                let trail = &half[half.trim_end().len()..];
                format!("{lead}{mirrored}{trail}")
            })
            .collect::<Vec<_>>()
            .join("/"),
        _ => value.to_string(),
    }
}

/// Reorder a four-value shorthand. Anything other than four values is unchanged.
fn swap_four<'a>(value: &'a str, reorder: impl Fn([&'a str; 4]) -> [&'a str; 4]) -> String {
    let parts = split_top_level(value);
    match <[&str; 4]>::try_from(parts.as_slice()) {
        Ok(four) => reorder(four).join(" "),
        Err(_) => value.to_string(),
    }
}

/// Split on whitespace outside parentheses and quotes.
fn split_top_level(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start: Option<usize> = None;
    let mut parens = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in value.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                start.get_or_insert(i);
            }
            '(' => {
                parens += 1;
                start.get_or_insert(i);
            }
            ')' => parens = parens.saturating_sub(1),
            c if c.is_whitespace() && parens == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&value[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        parts.push(&value[s..]);
    }
    parts
}

/// Swap whole identifier words, skipping text inside parentheses and quotes.
fn swap_words(value: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(value.len());
    let mut word = String::new();
    let mut parens = 0usize;
    let mut quote: Option<char> = None;

    let flush = |word: &mut String, out: &mut String| {
        let replacement = pairs.iter().find_map(|(a, b)| {
            if word.eq_ignore_ascii_case(a) {
                Some(*b)
            } else if word.eq_ignore_ascii_case(b) {
                Some(*a)
            } else {
                None
            }
        });
        out.push_str(replacement.unwrap_or(word.as_str()));
        word.clear();
    };

    for c in value.chars() {
        if quote.is_none() && parens == 0 && (c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            word.push(c);
            continue;
        }
        flush(&mut word, &mut out);
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => parens += 1,
            (None, ')') => parens = parens.saturating_sub(1),
            _ => {}
        }
        out.push(c);
    }
    flush(&mut word, &mut out);
    out
}
