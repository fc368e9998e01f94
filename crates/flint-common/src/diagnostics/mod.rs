//! Diagnostic tree and message lookup for the checker.
//!
//! Diagnostics are produced as a tree: a primary message made of text parts
//! (some of which point at source), and a recursive list of extra-info
//! nodes explaining the failure. Renderers consume the serialized form, so
//! field names and nesting are part of the output contract.
//!
//! Message templates live in `data.rs` and use `{0}`, `{1}`, ...
//! placeholders filled by `format_message`.

use crate::span::SourceSpan;
use serde::{Deserialize, Serialize};

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes, diagnostic_messages};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Error,
    Warning,
}

/// Source reference attached to a message part.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReference {
    pub span: SourceSpan,
    /// Full text of the first line covered by `span`.
    pub context_line: String,
}

/// One segment of a message. Segments with a reference are rendered as
/// links to the referenced source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<MessageReference>,
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reference: None,
        }
    }

    pub fn with_reference(text: impl Into<String>, span: SourceSpan, context_line: String) -> Self {
        Self {
            text: text.into(),
            reference: Some(MessageReference { span, context_line }),
        }
    }
}

/// Recursive explanation node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraInfo {
    pub message: Vec<MessagePart>,
    #[serde(default)]
    pub children: Vec<ExtraInfo>,
}

impl ExtraInfo {
    pub fn leaf(text: impl Into<String>) -> Self {
        Self {
            message: vec![MessagePart::text(text)],
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: ExtraInfo) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// A checker diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub primary_message: Vec<MessagePart>,
    pub severity: Severity,
    #[serde(default)]
    pub extra_info: Vec<ExtraInfo>,
    pub code: u32,
    pub file: String,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(file: impl Into<String>, code: u32, primary_message: Vec<MessagePart>) -> Self {
        Self {
            primary_message,
            severity: Severity::Error,
            extra_info: Vec::new(),
            code,
            file: file.into(),
        }
    }

    /// Create a new warning diagnostic.
    #[must_use]
    pub fn warning(file: impl Into<String>, code: u32, primary_message: Vec<MessagePart>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(file, code, primary_message)
        }
    }

    #[must_use]
    pub fn with_extra(mut self, info: ExtraInfo) -> Self {
        self.extra_info.push(info);
        self
    }

    /// The primary message flattened to plain text.
    pub fn message_text(&self) -> String {
        self.primary_message
            .iter()
            .map(|part| part.text.as_str())
            .collect()
    }

    /// The first source reference in the primary message, if any.
    pub fn primary_span(&self) -> Option<&SourceSpan> {
        self.primary_message
            .iter()
            .find_map(|part| part.reference.as_ref().map(|r| &r.span))
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, severity, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub severity: Severity,
    pub message: &'static str,
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

#[cfg(test)]
#[path = "../../tests/diagnostics_tests.rs"]
mod tests;
