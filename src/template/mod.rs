//! Named-field text templates.
//!
//! The template language is the small subset of Go's `text/template` that
//! configuration templates actually use:
//!
//! - `{{.Field}}` / `{{ .Field }}` interpolates a named field verbatim
//! - `{{- ` and ` -}}` strip whitespace in the adjacent literal text
//! - `{{/* comment */}}` is dropped
//! - `{{ "{{" }}` emits a string constant, for templates whose output is
//!   itself a Go template (Packer's `boot_command`)
//!
//! All other text passes through unchanged. Rendering is pure: the same
//! template and data always produce the same output.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use freebsdvirt_image_kit::template::Template;
//!
//! let tpl = Template::parse("greeting", "user={{ .SSHUsername }}\n").unwrap();
//! let data = BTreeMap::from([("SSHUsername", "freebsd")]);
//! assert_eq!(tpl.render(&data).unwrap(), "user=freebsd\n");
//! ```

mod parser;

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use thiserror::Error;

/// Template parse or render failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Malformed template syntax.
    #[error("line {line}, column {column}: {reason}")]
    Parse {
        line: usize,
        column: usize,
        reason: String,
    },

    /// The template references a field the data record does not define.
    #[error("line {line}: undefined field '{field}'")]
    UndefinedField { field: String, line: usize },
}

impl TemplateError {
    fn parse(line: usize, column: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            reason: reason.into(),
        }
    }
}

/// A record whose named fields can be interpolated into a template.
pub trait TemplateData {
    /// Look up a field by name.
    fn field(&self, name: &str) -> Option<&str>;
}

impl<K, V> TemplateData for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

impl<K, V> TemplateData for HashMap<K, V>
where
    K: Borrow<str> + Eq + Hash,
    V: AsRef<str>,
{
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    /// Output of a string constant action; never affected by trim markers.
    Literal(String),
    Field { name: String, line: usize },
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source. Syntax errors carry line and column.
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            name: name.into(),
            nodes: parser::parse(source)?,
        })
    }

    /// Name given at parse time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field names referenced by the template, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Field { name, .. } => Some(name.as_str()),
            Node::Text(_) | Node::Literal(_) => None,
        })
    }

    /// Render against `data`.
    ///
    /// Output is built in memory; on error nothing is returned, so callers
    /// never see a partially rendered artifact.
    pub fn render<D: TemplateData + ?Sized>(&self, data: &D) -> Result<String, TemplateError> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) | Node::Literal(text) => out.push_str(text),
                Node::Field { name, line } => {
                    let value = data.field(name).ok_or_else(|| TemplateError::UndefinedField {
                        field: name.clone(),
                        line: *line,
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Parse and render in one step.
pub fn render<D: TemplateData + ?Sized>(source: &str, data: &D) -> Result<String, TemplateError> {
    Template::parse("inline", source)?.render(data)
}
