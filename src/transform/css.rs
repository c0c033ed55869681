// src/transform/css.rs

//! Sass compilation, autoprefixing and development source maps.
//!
//! `grass` emits no position information, so the development source map
//! names the Sass entry file and embeds its text but carries no mappings.
//! Browser dev tools show the original source next to the compiled CSS;
//! they cannot jump from a rule to its Sass line.

use std::io;
use std::path::{Path, PathBuf};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use serde::Serialize;
use thiserror::Error;

use crate::fs::FileSystem;

use super::scan::{split_segments, split_trivia};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("sass compilation failed for {path:?}: {message}")]
    Sass { path: PathBuf, message: String },
}

/// Browser versions the prefixer targets. Encoded as `major << 16 | minor << 8`.
pub fn browser_targets() -> Targets {
    Targets::from(Browsers {
        android: Some(4 << 16 | 4 << 8),
        chrome: Some(49 << 16),
        edge: Some(14 << 16),
        firefox: Some(52 << 16),
        ie: Some(11 << 16),
        ios_saf: Some(9 << 16),
        opera: Some(36 << 16),
        safari: Some(9 << 16),
        samsung: Some(5 << 16),
    })
}

/// Partials (`_name.scss`) are only ever imported, never compiled on their own.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

/// Adapter so `grass` resolves `@import`/`@use` through our filesystem.
#[derive(Debug)]
struct SassFs<'a>(&'a dyn FileSystem);

impl grass::Fs for SassFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        self.0.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.0.is_file(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.0.read(path).map_err(|e| io::Error::other(format!("{e:#}")))
    }
}

/// Compile one `.scss` file to expanded CSS.
pub fn compile_scss(
    fs: &dyn FileSystem,
    path: &Path,
    load_paths: &[PathBuf],
) -> Result<String, CompileError> {
    let sass_fs = SassFs(fs);
    let mut options = grass::Options::default()
        .style(grass::OutputStyle::Expanded)
        .fs(&sass_fs);
    for dir in load_paths {
        options = options.load_path(dir);
    }

    grass::from_path(path, &options).map_err(|e| CompileError::Sass {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Add vendor prefixes for [`browser_targets`], one declaration at a time.
///
/// Only declarations that gain prefixed variants are rewritten. Everything
/// else is kept byte for byte: rule structure, fallbacks, and comments such
/// as `/*rtl:ignore*/` that later steps read. Selectors and at-rule names are
/// not prefixed.
pub fn autoprefix(css: &str) -> String {
    let targets = browser_targets();
    let mut out = String::with_capacity(css.len());
    let mut depth = 0usize;

    for segment in split_segments(css) {
        let in_block = depth > 0;
        match segment.terminator {
            Some(b'{') => {
                out.push_str(segment.text);
                out.push('{');
                depth += 1;
            }
            Some(b'}') => {
                push_prefixed(&mut out, segment.text, in_block, targets);
                out.push('}');
                depth = depth.saturating_sub(1);
            }
            Some(b';') => {
                push_prefixed(&mut out, segment.text, in_block, targets);
                out.push(';');
            }
            _ => out.push_str(segment.text),
        }
    }

    out
}

fn push_prefixed(out: &mut String, text: &str, in_block: bool, targets: Targets) {
    let (trivia, body) = split_trivia(text);
    out.push_str(trivia);

    let is_declaration = in_block
        && body.contains(':')
        && !body.starts_with('@')
        && !body.starts_with("--");
    let Some(declarations) = is_declaration
        .then(|| prefixed_declarations(body.trim_end(), targets))
        .flatten()
    else {
        out.push_str(body);
        return;
    };

    let separator = match trivia.rfind('\n') {
        Some(pos) => format!(";\n{}", &trivia[pos + 1..]),
        None => "; ".to_string(),
    };
    out.push_str(&declarations.join(&separator));
    out.push_str(&body[body.trim_end().len()..]);
}

/// Run a single declaration through lightningcss.
///
/// Returns `None` unless the declaration expands into several (prefixed
/// variants plus the original).
fn prefixed_declarations(declaration: &str, targets: Targets) -> Option<Vec<String>> {
    let wrapped = format!("a{{{declaration}}}");
    let mut sheet = StyleSheet::parse(&wrapped, ParserOptions::default()).ok()?;
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .ok()?;
    let printed = sheet
        .to_css(PrinterOptions {
            targets,
            ..PrinterOptions::default()
        })
        .ok()?;

    let code = printed.code;
    let inner = &code[code.find('{')? + 1..code.rfind('}')?];
    let declarations: Vec<String> = split_segments(inner)
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    (declarations.len() > 1).then_some(declarations)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMapV3<'a> {
    version: u8,
    file: &'a str,
    sources: [&'a str; 1],
    sources_content: [&'a str; 1],
    names: [&'a str; 0],
    mappings: &'a str,
}

/// v3 source map that names the Sass source and embeds its text.
///
/// `mappings` is always empty; see the module docs.
pub fn source_map(css_name: &str, source_name: &str, source: &str) -> serde_json::Result<String> {
    serde_json::to_string(&SourceMapV3 {
        version: 3,
        file: css_name,
        sources: [source_name],
        sources_content: [source],
        names: [],
        mappings: "",
    })
}

/// Append the `sourceMappingURL` comment that points browsers at `map_name`.
pub fn append_source_map_comment(css: &mut String, map_name: &str) {
    if !css.ends_with('\n') {
        css.push('\n');
    }
    css.push_str("/*# sourceMappingURL=");
    css.push_str(map_name);
    css.push_str(" */\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn compiles_nested_rules_and_imports_partials() {
        let fs = MockFileSystem::new();
        fs.add_file("site/scss/_vars.scss", "$brand: #ff6600;");
        fs.add_file(
            "site/scss/main.scss",
            "@import 'vars';\n.nav { a { color: $brand; } }\n",
        );

        let css = compile_scss(
            &fs,
            Path::new("site/scss/main.scss"),
            &[PathBuf::from("site/scss")],
        )
        .unwrap();

        assert!(css.contains(".nav a"), "got: {css}");
        assert!(css.contains("#ff6600"), "got: {css}");
    }

    #[test]
    fn syntax_error_is_reported_per_file() {
        let fs = MockFileSystem::new();
        fs.add_file("site/scss/broken.scss", ".a { color: $undefined; }");

        let err = compile_scss(&fs, Path::new("site/scss/broken.scss"), &[]).unwrap_err();
        assert!(matches!(err, CompileError::Sass { .. }));
    }

    #[test]
    fn autoprefix_adds_vendor_prefixes() {
        let css = autoprefix(".a {\n  user-select: none;\n}\n");
        assert!(css.contains("  -webkit-user-select: none;\n"), "got: {css}");
        assert!(css.contains("  user-select: none;\n}"), "got: {css}");
    }

    #[test]
    fn autoprefix_keeps_comments_fallbacks_and_rule_structure() {
        let css = ".logo {\n  /*rtl:ignore*/\n  float: left;\n  margin: 0;\n  margin-left: 4px;\n}\n\
                   .logo {\n  display: block;\n  display: flex;\n}\n";
        let out = autoprefix(css);
        assert!(out.starts_with(".logo {\n  /*rtl:ignore*/\n  float: left;\n  margin: 0;\n  margin-left: 4px;\n}\n"), "got: {out}");
        assert!(out.contains("display: block;"), "got: {out}");
        assert_eq!(out.matches(".logo {").count(), 2, "got: {out}");
    }

    #[test]
    fn autoprefix_leaves_at_rules_and_custom_properties_alone() {
        let css = "@import url(\"a.css\");\n:root {\n  --gap: 4px;\n}\n@media (min-width: 10px) {\n  .a {\n    color: red;\n  }\n}\n";
        assert_eq!(autoprefix(css), css);
    }

    #[test]
    fn partials_are_detected_by_leading_underscore() {
        assert!(is_partial(Path::new("scss/_vars.scss")));
        assert!(!is_partial(Path::new("scss/listty.scss")));
    }

    #[test]
    fn source_map_embeds_the_source_without_mappings() {
        let map = source_map("listty.css", "listty.scss", ".a{}").unwrap();
        let value: serde_json::Value = serde_json::from_str(&map).unwrap();
        assert_eq!(value["version"], 3);
        assert_eq!(value["file"], "listty.css");
        assert_eq!(value["sources"][0], "listty.scss");
        assert_eq!(value["sourcesContent"][0], ".a{}");
        assert_eq!(value["names"], serde_json::json!([]));
        assert_eq!(value["mappings"], "");
    }

    #[test]
    fn source_map_comment_is_appended_on_its_own_line() {
        let mut css = String::from(".a {}");
        append_source_map_comment(&mut css, "a.css.map");
        assert_eq!(css, ".a {}\n/*# sourceMappingURL=a.css.map */\n");
    }
}
