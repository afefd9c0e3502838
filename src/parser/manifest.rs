//! Parser for `__manifest__.py` module manifests.
//!
//! Manifests are Python source files containing a single dictionary
//! literal. They are parsed with tree-sitter and evaluated strictly as
//! literal data: strings, numbers, booleans, `None` and the list, tuple,
//! set and dict containers. Any other construct is rejected, so nothing in
//! a manifest is ever executed or resolved.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

use super::types::{Manifest, ManifestValue};

/// Errors that can occur while parsing a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The Python grammar could not be loaded.
    #[error("Tree-sitter language initialization failed")]
    LanguageInit,

    /// The source is not valid Python.
    #[error("Syntax error at line {line}")]
    Syntax { line: usize },

    /// The top-level expression is not a dictionary.
    #[error("Manifest must contain a single dictionary literal, found {0}")]
    NotADictionary(String),

    /// An expression other than a plain literal was found.
    #[error("Unsupported expression `{kind}` at line {line}")]
    NotLiteral { kind: String, line: usize },

    /// A literal could not be converted (out of range number, complex, ...).
    #[error("Invalid literal `{text}` at line {line}")]
    InvalidLiteral { text: String, line: usize },

    /// The `depends` key has the wrong shape.
    #[error("`depends` must be a list of strings, found {0}")]
    InvalidDepends(String),

    /// The manifest path has no parent directory to name the module after.
    #[error("Cannot derive a module name from {0}")]
    NoModuleName(String),
}

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Reusable manifest parser holding a configured tree-sitter parser.
pub struct ManifestParser {
    parser: Parser,
}

impl ManifestParser {
    /// Creates a parser for Python manifest sources.
    pub fn new() -> ManifestResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|_| ManifestError::LanguageInit)?;
        Ok(Self { parser })
    }

    /// Parses a manifest file. The module name is the parent directory's name.
    pub fn parse_file(&mut self, path: &Path) -> ManifestResult<Manifest> {
        let module = module_name_from_path(path)
            .ok_or_else(|| ManifestError::NoModuleName(path.display().to_string()))?;
        let content = fs::read_to_string(path)?;
        self.parse_manifest(&module, &content)
    }

    /// Parses manifest source text for the given module name.
    pub fn parse_manifest(&mut self, module: &str, source: &str) -> ManifestResult<Manifest> {
        let value = self.parse_literal(source)?;
        manifest_from_value(module, &value)
    }

    /// Evaluates the manifest source as a literal dictionary.
    pub fn parse_literal(&mut self, source: &str) -> ManifestResult<ManifestValue> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(ManifestError::Syntax { line: 1 })?;
        let root = tree.root_node();

        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            return Err(ManifestError::Syntax { line });
        }

        let statements = named_elements(root);
        let [statement] = statements.as_slice() else {
            return Err(ManifestError::NotADictionary(format!(
                "{} statements",
                statements.len()
            )));
        };
        if statement.kind() != "expression_statement" {
            return Err(ManifestError::NotLiteral {
                kind: statement.kind().to_string(),
                line: line_of(statement),
            });
        }

        let expressions = named_elements(*statement);
        let [expression] = expressions.as_slice() else {
            return Err(ManifestError::NotADictionary("tuple".to_string()));
        };

        let value = literal(*expression, source)?;
        match value {
            ManifestValue::Dict(_) => Ok(value),
            other => Err(ManifestError::NotADictionary(other.type_name().to_string())),
        }
    }

    /// Loads a manifest with the skip-and-warn policy.
    ///
    /// Any failure is logged and turned into `None`, so one malformed
    /// manifest never stops a scan.
    pub fn load(&mut self, path: &Path) -> Option<Manifest> {
        match self.parse_file(path) {
            Ok(manifest) => {
                debug!(
                    module = %manifest.module,
                    depends = manifest.depends.len(),
                    "parsed manifest"
                );
                Some(manifest)
            }
            Err(e) => {
                warn!("Error parsing manifest file {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Parses a manifest file with a fresh parser.
pub fn parse_file(path: &Path) -> ManifestResult<Manifest> {
    ManifestParser::new()?.parse_file(path)
}

/// Parses manifest source text for the given module name.
///
/// # Example
///
/// ```
/// use addon_graph::parser::parse_str;
///
/// let manifest = parse_str("sale", "{'name': 'Sales', 'depends': ['base', 'mail']}").unwrap();
/// assert_eq!(manifest.depends, vec!["base", "mail"]);
/// assert_eq!(manifest.title.as_deref(), Some("Sales"));
/// ```
pub fn parse_str(module: &str, source: &str) -> ManifestResult<Manifest> {
    ManifestParser::new()?.parse_manifest(module, source)
}

/// Loads a manifest as a `(module, dependencies)` pair.
///
/// On failure the pair is `(None, [])` and a warning is logged; callers skip
/// entries without a module name.
pub fn load_manifest(path: &Path) -> (Option<String>, Vec<String>) {
    let manifest = match ManifestParser::new() {
        Ok(mut parser) => parser.load(path),
        Err(e) => {
            warn!("Error parsing manifest file {}: {}", path.display(), e);
            None
        }
    };

    match manifest {
        Some(m) => (Some(m.module), m.depends),
        None => (None, Vec::new()),
    }
}

/// Derives the module name from a manifest path (its parent directory).
pub fn module_name_from_path(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
}

/// Builds a [`Manifest`] from an evaluated dictionary.
pub fn manifest_from_value(module: &str, value: &ManifestValue) -> ManifestResult<Manifest> {
    let depends = match value.get("depends") {
        None => Vec::new(),
        Some(deps) => {
            let items = deps
                .as_sequence()
                .ok_or_else(|| ManifestError::InvalidDepends(deps.type_name().to_string()))?;
            items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ManifestError::InvalidDepends(format!(
                            "{} containing {}",
                            deps.type_name(),
                            item.type_name()
                        ))
                    })
                })
                .collect::<ManifestResult<Vec<_>>>()?
        }
    };

    Ok(Manifest {
        module: module.to_string(),
        title: value.get("name").and_then(|v| v.as_str()).map(str::to_string),
        version: value
            .get("version")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        depends,
    })
}

/// Converts a syntax node into a literal value, rejecting anything else.
fn literal(node: Node<'_>, source: &str) -> ManifestResult<ManifestValue> {
    match node.kind() {
        "string" => string_literal(node, source),
        "concatenated_string" => {
            let mut text = String::new();
            let mut bytes: Option<bool> = None;
            for part in named_elements(node) {
                let (is_bytes, value) = match string_literal(part, source)? {
                    ManifestValue::Str(s) => (false, s),
                    ManifestValue::Bytes(s) => (true, s),
                    _ => unreachable!("string_literal only yields strings"),
                };
                if bytes.is_some_and(|b| b != is_bytes) {
                    return Err(ManifestError::InvalidLiteral {
                        text: node_text(&node, source).to_string(),
                        line: line_of(&node),
                    });
                }
                bytes = Some(is_bytes);
                text.push_str(&value);
            }
            Ok(if bytes == Some(true) {
                ManifestValue::Bytes(text)
            } else {
                ManifestValue::Str(text)
            })
        }
        "integer" => integer_literal(node, source, false),
        "float" => float_literal(node, source, false),
        "true" => Ok(ManifestValue::Bool(true)),
        "false" => Ok(ManifestValue::Bool(false)),
        "none" => Ok(ManifestValue::None),
        "unary_operator" => {
            let operator = node
                .child_by_field_name("operator")
                .map(|op| node_text(&op, source))
                .unwrap_or("");
            let argument = node.child_by_field_name("argument");
            match (operator, argument) {
                ("-" | "+", Some(arg)) if arg.kind() == "integer" => {
                    integer_literal(arg, source, operator == "-")
                }
                ("-" | "+", Some(arg)) if arg.kind() == "float" => {
                    float_literal(arg, source, operator == "-")
                }
                _ => Err(not_literal(&node)),
            }
        }
        "parenthesized_expression" => match named_elements(node).as_slice() {
            [inner] => literal(*inner, source),
            _ => Err(not_literal(&node)),
        },
        "list" => Ok(ManifestValue::List(sequence(node, source)?)),
        "tuple" => Ok(ManifestValue::Tuple(sequence(node, source)?)),
        "set" => Ok(ManifestValue::Set(sequence(node, source)?)),
        "dictionary" => {
            let mut pairs = Vec::new();
            for child in named_elements(node) {
                if child.kind() != "pair" {
                    return Err(not_literal(&child));
                }
                let key = child
                    .child_by_field_name("key")
                    .ok_or_else(|| not_literal(&child))?;
                let value = child
                    .child_by_field_name("value")
                    .ok_or_else(|| not_literal(&child))?;
                pairs.push((literal(key, source)?, literal(value, source)?));
            }
            Ok(ManifestValue::Dict(pairs))
        }
        _ => Err(not_literal(&node)),
    }
}

fn sequence(node: Node<'_>, source: &str) -> ManifestResult<Vec<ManifestValue>> {
    named_elements(node)
        .into_iter()
        .map(|child| literal(child, source))
        .collect()
}

/// Decodes a single string literal, including its prefix and quotes.
fn string_literal(node: Node<'_>, source: &str) -> ManifestResult<ManifestValue> {
    let text = node_text(&node, source);
    let invalid = || ManifestError::InvalidLiteral {
        text: text.to_string(),
        line: line_of(&node),
    };

    let quote_at = text.find(['\'', '"']).ok_or_else(invalid)?;
    let prefix = text[..quote_at].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('t') {
        return Err(not_literal(&node));
    }

    let body = &text[quote_at..];
    let quote = &body[..1];
    let delimiter_len = if body.starts_with(&quote.repeat(3)) && body.len() >= 6 {
        3
    } else {
        1
    };
    if body.len() < 2 * delimiter_len {
        return Err(invalid());
    }
    let content = &body[delimiter_len..body.len() - delimiter_len];

    let decoded = if prefix.contains('r') {
        content.to_string()
    } else {
        unescape(content)
    };

    if prefix.contains('b') {
        Ok(ManifestValue::Bytes(decoded))
    } else {
        Ok(ManifestValue::Str(decoded))
    }
}

/// Resolves backslash escapes the way Python does for non-raw strings.
///
/// Unknown escapes are kept verbatim, including the backslash.
fn unescape(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.push(ch);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

fn integer_literal(
    node: Node<'_>,
    source: &str,
    negative: bool,
) -> ManifestResult<ManifestValue> {
    let text = node_text(&node, source);
    let cleaned = text.replace('_', "").to_ascii_lowercase();

    let (digits, radix) = if let Some(rest) = cleaned.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = cleaned.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = cleaned.strip_prefix("0b") {
        (rest, 2)
    } else {
        (cleaned.as_str(), 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ManifestError::InvalidLiteral {
            text: text.to_string(),
            line: line_of(&node),
        });
    }

    let value = u64::from_str_radix(digits, radix).ok().and_then(|magnitude| {
        let magnitude = i128::from(magnitude);
        i64::try_from(if negative { -magnitude } else { magnitude }).ok()
    });
    Ok(match value {
        Some(value) => ManifestValue::Int(value),
        None => ManifestValue::BigInt(format!("{}{}", if negative { "-" } else { "" }, cleaned)),
    })
}

fn float_literal(node: Node<'_>, source: &str, negative: bool) -> ManifestResult<ManifestValue> {
    let text = node_text(&node, source);
    let value: f64 = text
        .replace('_', "")
        .parse()
        .map_err(|_| ManifestError::InvalidLiteral {
            text: text.to_string(),
            line: line_of(&node),
        })?;
    Ok(ManifestValue::Float(if negative { -value } else { value }))
}

/// Named children of a node, excluding comments and other extras.
fn named_elements(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn first_error_line(node: Node<'_>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(line_of(&node));
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error_line)
}

fn not_literal(node: &Node<'_>) -> ManifestError {
    ManifestError::NotLiteral {
        kind: node.kind().to_string(),
        line: line_of(node),
    }
}

fn line_of(node: &Node<'_>) -> usize {
    node.start_position().row + 1
}

fn node_text<'a>(node: &Node<'_>, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}
