use super::{Diagnostic, Level};
use crate::span::Span;

/// One source line, with the column range the diagnostic wants to underline.
#[derive(Clone, Debug)]
pub struct SourceSnippet {
    pub line: String,
    pub line_number: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub label: Option<String>,
}

impl SourceSnippet {
    pub fn new(
        line: impl Into<String>,
        line_number: usize,
        start_column: usize,
        end_column: usize,
        label: Option<&str>,
    ) -> Self {
        Self {
            line: line.into(),
            line_number,
            start_column,
            end_column,
            label: label.map(str::to_owned),
        }
    }
}

/// Fluent constructor for a [`Diagnostic`], mirroring the way `zincc-drv`
/// reports one error per call site without threading every field through
/// a constructor argument list.
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
    notes: Vec<String>,
    help: Vec<String>,
    snippet: Option<SourceSnippet>,
}

impl DiagnosticBuilder {
    pub fn new(level: Level, span: Span, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            notes: Vec::new(),
            help: Vec::new(),
            snippet: None,
        }
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    pub fn snippet(mut self, snippet: SourceSnippet) -> Self {
        self.snippet = Some(snippet);
        self
    }

    pub fn build(self) -> Diagnostic {
        Diagnostic {
            level: self.level,
            message: self.message,
            span: self.span,
            notes: self.notes,
            help: self.help,
            snippet: self.snippet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_notes_and_help() {
        let diag = DiagnosticBuilder::new(Level::Error, Span::DUMMY, "bad thing")
            .note("first note")
            .note("second note")
            .help("try this instead")
            .build();

        assert_eq!(diag.message, "bad thing");
        assert_eq!(diag.notes.len(), 2);
        assert_eq!(diag.help.len(), 1);
    }
}
