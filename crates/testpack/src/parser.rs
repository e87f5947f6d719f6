//! Module parsing.
//!
//! Reads a module through the runtime, rejects invalid source and extracts the
//! specifiers of its `require` calls.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{Argument, CallExpression, Expression};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{ParseOptions, Parser};
use oxc_span::SourceType;

use crate::runtime::{Runtime, RuntimeError};
use crate::{Error, Result};

/// Maximum module size accepted (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// A module ready to be packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedModule {
    /// Source emitted into the bundle
    pub source: String,
    /// `require` specifiers in source order, without duplicates
    pub requires: Vec<String>,
}

/// Module parser that reads and parses files.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModuleParser;

impl ModuleParser {
    /// Read and parse the module at `path`.
    pub async fn process_module(&self, path: &Path, runtime: &dyn Runtime) -> Result<ParsedModule> {
        let code = self.read_file(path, runtime).await?;

        if is_json(path) {
            return json_module(path, &code);
        }

        let requires = parse_requires(path, &code)?;
        Ok(ParsedModule {
            source: strip_shebang(&code).to_string(),
            requires,
        })
    }

    /// Read a file with size validation.
    async fn read_file(&self, path: &Path, runtime: &dyn Runtime) -> Result<String> {
        if let Ok(metadata) = runtime.metadata(path).await {
            if metadata.size > MAX_FILE_SIZE {
                return Err(Error::FileTooLarge {
                    path: path.to_path_buf(),
                    size: metadata.size,
                    max: MAX_FILE_SIZE,
                });
            }
        }

        let bytes = runtime.read_file(path).await.map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        String::from_utf8(bytes).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: RuntimeError::Other(format!("Invalid UTF-8: {}", e)),
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn json_module(path: &Path, code: &str) -> Result<ParsedModule> {
    serde_json::from_str::<serde_json::Value>(code).map_err(|e| Error::InvalidJson {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(ParsedModule {
        source: format!("module.exports={}", code.trim()),
        requires: Vec::new(),
    })
}

fn strip_shebang(code: &str) -> &str {
    if !code.starts_with("#!") {
        return code;
    }
    match code.find('\n') {
        Some(idx) => &code[idx..],
        None => "",
    }
}

/// Parse `code` as a CommonJS script and collect its `require` specifiers.
///
/// The source ends up inside a module factory function, so a top-level
/// `return` is accepted.
///
/// # Errors
///
/// Returns [`Error::Parse`] with every syntax error message joined by `; `.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use testpack::parser::parse_requires;
///
/// let requires = parse_requires(
///     Path::new("test.js"),
///     "var tape = require('tape'); var lib = require('./../lib');",
/// )
/// .unwrap();
/// assert_eq!(requires, vec!["tape", "./../lib"]);
/// ```
pub fn parse_requires(path: &Path, code: &str) -> Result<Vec<String>> {
    let allocator = Allocator::default();
    let options = ParseOptions {
        allow_return_outside_function: true,
        ..ParseOptions::default()
    };
    let ret = Parser::new(&allocator, code, SourceType::cjs())
        .with_options(options)
        .parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::Parse {
            path: path.to_path_buf(),
            message: if message.is_empty() {
                "unrecoverable syntax error".to_string()
            } else {
                message
            },
        });
    }

    let mut collector = RequireCollector::default();
    collector.visit_program(&ret.program);
    Ok(collector.specifiers)
}

#[derive(Default)]
struct RequireCollector {
    specifiers: Vec<String>,
}

impl<'a> Visit<'a> for RequireCollector {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some(specifier) = require_specifier(call) {
            if !self.specifiers.contains(&specifier) {
                self.specifiers.push(specifier);
            }
        }
        walk::walk_call_expression(self, call);
    }
}

/// The literal specifier of a `require("...")` call, if `call` is one.
fn require_specifier(call: &CallExpression<'_>) -> Option<String> {
    let Expression::Identifier(ident) = &call.callee else {
        return None;
    };
    if ident.name.as_str() != "require" || call.arguments.len() != 1 {
        return None;
    }

    match &call.arguments[0] {
        Argument::StringLiteral(lit) => Some(lit.value.as_str().to_string()),
        Argument::TemplateLiteral(tpl) if tpl.expressions.is_empty() => tpl
            .quasis
            .first()
            .and_then(|quasi| quasi.value.cooked.as_ref())
            .map(|cooked| cooked.as_str().to_string()),
        _ => None,
    }
}
