//! Preparation diagnostics and host-facing error types.
//!
//! Evaluation failures are never reported here; they are Bottom values.

use lazyscript_ast::span::Span;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrepareError {
    #[error("undefined reference: ~{name}")]
    UndefinedRef { name: String, span: Span },
    #[error("duplicate binding: ~{name}")]
    DuplicateBinding { name: String, span: Span, first: Span },
    #[error("or-pattern sides bind different variables: {{{left}}} vs {{{right}}}")]
    OrPatternMismatch { left: String, right: String, span: Span },
}

impl PrepareError {
    pub fn span(&self) -> Span {
        match self {
            PrepareError::UndefinedRef { span, .. }
            | PrepareError::DuplicateBinding { span, .. }
            | PrepareError::OrPatternMismatch { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
}

/// Diagnostics collected while preparing one or more expressions.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    errors: usize,
    warnings: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, err: PrepareError) {
        let span = err.span();
        tracing::error!(offset = span.offset, len = span.len, "{err}");
        self.errors += 1;
        self.items.push(Diagnostic { severity: Severity::Error, message: err.to_string(), span });
    }

    pub fn warning(&mut self, message: impl Into<String>, span: Span) {
        let message = message.into();
        tracing::warn!(offset = span.offset, len = span.len, "{message}");
        self.warnings += 1;
        self.items.push(Diagnostic { severity: Severity::Warning, message, span });
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.errors += other.errors;
        self.warnings += other.warnings;
        self.items.extend(other.items);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    #[error("preparation failed with {errors} error(s)")]
    Aborted { errors: usize, diagnostics: Vec<Diagnostic> },
}

impl CompileError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::Aborted { diagnostics, .. } => diagnostics,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    #[error("scope is not writable")]
    ReadOnly,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("{0}")]
    Bottom(#[from] crate::display::BottomReport),
}
