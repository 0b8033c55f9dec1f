use std::borrow::Cow;
use std::cmp::Ordering;

use nom::error::ErrorKind;
use smallvec::SmallVec;
use thiserror::Error;

use super::Span;

pub(crate) type Expectations = SmallVec<[Cow<'static, str>; 4]>;

/// A parse failure anchored to a position in the source.
///
/// Alternation keeps the failure that reached furthest into the input;
/// failures at the same position merge their expectation labels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct ParseError {
    offset: usize,
    line: u32,
    column: usize,
    pub(crate) kind: ParseErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected {}", .0.join(", "))]
    Expected(Expectations),
    #[error("{0}")]
    Function(String),
}

impl ParseError {
    pub(crate) fn expected(span: &Span, label: impl Into<Cow<'static, str>>) -> Self {
        let mut labels = Expectations::new();
        labels.push(label.into());
        Self::new(span, ParseErrorKind::Expected(labels))
    }

    pub(crate) fn function(span: &Span, message: String) -> Self {
        Self::new(span, ParseErrorKind::Function(message))
    }

    fn new(span: &Span, kind: ParseErrorKind) -> Self {
        Self {
            offset: span.location_offset(),
            line: span.location_line(),
            column: span.get_utf8_column(),
            kind,
        }
    }

    /// Byte offset of the failure in the source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 1-based line of the failure.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based column of the failure.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Combines two alternative failures: the one that reached further wins,
    /// expectation labels merge at equal positions.
    pub(crate) fn merge(self, other: Self) -> Self {
        match self.offset.cmp(&other.offset) {
            Ordering::Greater => self,
            Ordering::Less => other,
            Ordering::Equal => {
                let ParseError {
                    offset,
                    line,
                    column,
                    kind: other_kind,
                } = other;
                let kind = match (self.kind, other_kind) {
                    (ParseErrorKind::Expected(mut labels), ParseErrorKind::Expected(more)) => {
                        for label in more {
                            if !labels.contains(&label) {
                                labels.push(label);
                            }
                        }
                        ParseErrorKind::Expected(labels)
                    }
                    (kind @ ParseErrorKind::Function(_), _) => kind,
                    (_, kind) => kind,
                };
                ParseError {
                    offset,
                    line,
                    column,
                    kind,
                }
            }
        }
    }
}

impl<'a> nom::error::ParseError<Span<'a>> for ParseError {
    fn from_error_kind(input: Span<'a>, kind: ErrorKind) -> Self {
        Self::expected(&input, kind.description().to_string())
    }

    fn append(_input: Span<'a>, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        self.merge(other)
    }
}

impl<'a, E> nom::error::FromExternalError<Span<'a>, E> for ParseError {
    fn from_external_error(input: Span<'a>, kind: ErrorKind, _e: E) -> Self {
        <Self as nom::error::ParseError<Span<'a>>>::from_error_kind(input, kind)
    }
}
