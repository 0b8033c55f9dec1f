use miette::{Diagnostic, SourceSpan};

use crate::parser::error::{ParseError, ParseErrorKind};
use crate::query::error::EvalError;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InnerError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// A high-level error with diagnostic information for the user.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    /// The underlying cause of the error.
    pub cause: InnerError,
    /// The source code related to the error.
    pub source_code: String,
    /// The location in the source code for diagnostics.
    pub location: SourceSpan,
}

impl Error {
    pub(crate) fn from_parse(source_code: impl Into<String>, err: ParseError) -> Self {
        let location = SourceSpan::new(err.offset().into(), 1);
        Self {
            cause: InnerError::Parse(err),
            source_code: source_code.into(),
            location,
        }
    }

    pub(crate) fn from_eval(source_code: impl Into<String>, err: EvalError) -> Self {
        // Expression nodes carry no source positions; anchor at the start.
        Self {
            cause: InnerError::Eval(err),
            source_code: source_code.into(),
            location: SourceSpan::new(0.into(), 1),
        }
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match &self.cause {
            InnerError::Parse(err) => match err.kind {
                ParseErrorKind::Expected(_) => "ParseError::Expected",
                ParseErrorKind::Function(_) => "ParseError::Function",
            },
            InnerError::Eval(EvalError::NoInput) => "EvalError::NoInput",
            InnerError::Eval(EvalError::PathNotFound(_)) => "EvalError::PathNotFound",
            InnerError::Eval(EvalError::MetaNotFound(_)) => "EvalError::MetaNotFound",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let msg = match &self.cause {
            InnerError::Parse(err) => match &err.kind {
                ParseErrorKind::Expected(_) => {
                    "Check for syntax errors or misplaced tokens in your mapping.".to_string()
                }
                ParseErrorKind::Function(_) => {
                    "Check the function name and its arguments.".to_string()
                }
            },
            InnerError::Eval(EvalError::NoInput) => {
                "The mapping reads the message payload, but none was supplied.".to_string()
            }
            InnerError::Eval(EvalError::PathNotFound(path)) => {
                format!("The payload has no value at `{path}`.")
            }
            InnerError::Eval(EvalError::MetaNotFound(key)) => {
                format!("No metadata entry named `{key}` is attached to the message.")
            }
        };
        Some(Box::new(msg))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(
            miette::LabeledSpan::new_with_span(Some(format!("{}", self.cause)), self.location),
        )))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source_code)
    }
}
