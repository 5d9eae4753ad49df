//! Error/warning reporting shared by every compiler stage: a [`Diagnostic`]
//! carries a level, message, and span, and a [`Handler`] accumulates them
//! for `zincc-drv` to render once the pipeline stops or finishes.
//!
//! Each stage crate's `thiserror` error enum converts `Into<Diagnostic>` at
//! its boundary; this module doesn't know about lex/parse/resolve/lower
//! error kinds specifically.

mod builder;
mod level;

pub use builder::{DiagnosticBuilder, SourceSnippet};
pub use level::Level;

use std::cell::RefCell;

use crate::span::Span;

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Vec<String>,
    pub snippet: Option<SourceSnippet>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            notes: Vec::new(),
            help: Vec::new(),
            snippet: None,
        }
    }

    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

/// Accumulates diagnostics over the course of one compilation.
///
/// Not `Sync` — the pipeline is single-threaded end to end, so a plain
/// `RefCell` is enough; nothing here needs to survive across threads.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::error(message, span));
    }

    pub fn warning(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::warning(message, span));
    }

    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn build_error(&self, span: Span, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(Level::Error, span, message)
    }

    pub fn build_warning(&self, span: Span, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(Level::Warning, span, message)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.level.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level.is_error())
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_ignores_warnings() {
        let handler = Handler::new();
        handler.warning("suspicious", Span::DUMMY);
        assert!(!handler.has_errors());

        handler.error("broken", Span::DUMMY);
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn emit_accepts_a_built_diagnostic() {
        let handler = Handler::new();
        let diag = handler
            .build_error(Span::DUMMY, "duplicate function")
            .note("first defined here")
            .build();
        handler.emit(diag);
        assert_eq!(handler.diagnostics().len(), 1);
    }
}
