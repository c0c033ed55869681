// src/transform/include.rs

//! `@@include` expansion for HTML pages.
//!
//! ```text
//! @@include('header.htm')
//! @@include('card.htm', {"title": "Latest"})
//! ```
//!
//! Include paths resolve against a single include directory, nested includes
//! too. Parameters are a JSON object; inside the included text every
//! `@@name` with a matching key is replaced by its value. Nested includes
//! inherit the parameters of the including file.

use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::fs::FileSystem;

#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("include file {path:?} not found")]
    Missing { path: PathBuf },

    #[error("failed to read include {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("include cycle: {chain}")]
    Cycle { chain: String },

    #[error("invalid parameters for include '{file}': {reason}")]
    Params { file: String, reason: String },
}

/// Expands `@@include` directives against one include directory.
#[derive(Debug, Clone)]
pub struct FileIncluder {
    include_dir: PathBuf,
    include_re: Regex,
    var_re: Regex,
}

impl FileIncluder {
    pub fn new(include_dir: impl Into<PathBuf>) -> Result<Self, regex::Error> {
        Ok(Self {
            include_dir: include_dir.into(),
            include_re: Regex::new(
                r#"(?s)@@include\(\s*['"]([^'"]+)['"]\s*(?:,\s*(\{.*?\})\s*)?\)"#,
            )?,
            var_re: Regex::new(r"@@([A-Za-z_][A-Za-z0-9_]*)")?,
        })
    }

    /// Expand every include in `page`.
    pub fn expand(&self, fs: &dyn FileSystem, page: &str) -> Result<String, IncludeError> {
        let mut stack = Vec::new();
        self.expand_with(fs, page, &Map::new(), &mut stack)
    }

    fn expand_with(
        &self,
        fs: &dyn FileSystem,
        text: &str,
        scope: &Map<String, Value>,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String, IncludeError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in self.include_re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&text[last..whole.start()]);
            last = whole.end();

            let name = &caps[1];
            let mut inner_scope = scope.clone();
            if let Some(raw) = caps.get(2) {
                inner_scope.extend(parse_params(name, raw.as_str())?);
            }

            let path = self.include_dir.join(name);
            if stack.contains(&path) {
                let mut chain: Vec<String> =
                    stack.iter().map(|p| p.display().to_string()).collect();
                chain.push(path.display().to_string());
                return Err(IncludeError::Cycle {
                    chain: chain.join(" -> "),
                });
            }
            if !fs.is_file(&path) {
                return Err(IncludeError::Missing { path });
            }

            let body = fs
                .read_to_string(&path)
                .map_err(|source| IncludeError::Read {
                    path: path.clone(),
                    source,
                })?;
            let body = self.substitute(&body, &inner_scope);

            stack.push(path);
            let expanded = self.expand_with(fs, &body, &inner_scope, stack);
            stack.pop();
            out.push_str(&expanded?);
        }

        out.push_str(&text[last..]);
        Ok(out)
    }

    /// Replace `@@name` with the matching parameter; unknown names stay as-is.
    fn substitute(&self, text: &str, scope: &Map<String, Value>) -> String {
        if scope.is_empty() {
            return text.to_string();
        }
        self.var_re
            .replace_all(text, |caps: &Captures<'_>| match scope.get(&caps[1]) {
                Some(value) if &caps[1] != "include" => render_value(value),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}

fn parse_params(file: &str, raw: &str) -> Result<Map<String, Value>, IncludeError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(IncludeError::Params {
            file: file.to_string(),
            reason: "expected a JSON object".to_string(),
        }),
        Err(e) => Err(IncludeError::Params {
            file: file.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
