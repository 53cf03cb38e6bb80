#![allow(unused_assignments)]

use std::ops::Range;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("Syntax error: {message}")]
    #[diagnostic(code(ctxeq::parse::syntax))]
    Syntax {
        message: String,
        #[label("here")]
        span: miette::SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("Malformed parse tree: {message}")]
    #[diagnostic(
        code(ctxeq::parse::malformed),
        help("this is a bug in the formula grammar, please report it")
    )]
    Malformed {
        message: String,
        #[label("while reading this")]
        span: miette::SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl ParseError {
    pub fn syntax(
        message: impl Into<String>,
        span: Range<usize>,
        source: &str,
        filename: &str,
    ) -> Self {
        ParseError::Syntax {
            message: message.into(),
            span: (span.start, span.end.saturating_sub(span.start)).into(),
            src: miette::NamedSource::new(filename, source.to_owned()),
        }
    }

    pub fn malformed(
        message: impl Into<String>,
        span: Range<usize>,
        source: &str,
        filename: &str,
    ) -> Self {
        ParseError::Malformed {
            message: message.into(),
            span: (span.start, span.end.saturating_sub(span.start)).into(),
            src: miette::NamedSource::new(filename, source.to_owned()),
        }
    }

    /// Byte range of the offending input.
    pub fn span(&self) -> Range<usize> {
        let span = match self {
            ParseError::Syntax { span, .. } | ParseError::Malformed { span, .. } => span,
        };
        span.offset()..span.offset() + span.len()
    }
}
