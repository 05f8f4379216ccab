//! Single-line message rendering.

use scrivener_audit_types::{AuditEvent, EventContext};

/// Renders a message template and raw context into one sanitized line.
///
/// Substitution is a single left-to-right pass: a substituted value is never
/// rescanned for placeholders, so untrusted context values cannot smuggle in
/// further substitutions. Whitespace collapse runs unconditionally on the
/// final rendered string, not per field, because untrusted values may also
/// appear inside resolved lists.
#[derive(Debug, Clone, Default)]
pub struct LineFormatter;

impl LineFormatter {
    /// Create a formatter.
    pub fn new() -> Self {
        Self
    }

    /// Substitute every `{name}` placeholder present in `context`.
    ///
    /// Placeholders with no matching field are left literal, which keeps a
    /// template mistake visible in the log rather than silently vanishing.
    pub fn render(&self, template: &str, context: &EventContext) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = &after[..close];
                    match context.get(name) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Collapse every run of whitespace, newlines included, into a single
    /// space. This is the log-injection defense: no output of this function
    /// contains more than one consecutive space, and never a line break.
    pub fn sanitize(message: &str) -> String {
        let mut out = String::with_capacity(message.len());
        let mut in_whitespace = false;
        for ch in message.chars() {
            if ch.is_whitespace() {
                if !in_whitespace {
                    out.push(' ');
                }
                in_whitespace = true;
            } else {
                out.push(ch);
                in_whitespace = false;
            }
        }
        out
    }

    /// Render an event's template and context into the final wire line.
    pub fn format_event(&self, event: &AuditEvent) -> String {
        Self::sanitize(&self.render(&event.template, &event.context))
    }
}
