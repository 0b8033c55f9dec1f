pub(crate) mod combinators;
pub mod error;
pub(crate) mod literal;
pub(crate) mod query;

use nom::Parser;
use nom::branch::alt;
use nom::sequence::delimited;
use nom_locate::LocatedSpan;

use crate::query::Function;
use self::combinators::whitespace;
use self::error::ParseError;

pub(crate) type Span<'a> = LocatedSpan<&'a str>;
pub(crate) type PResult<'a, T> = nom::IResult<Span<'a>, T, ParseError>;

/// Parses a complete mapping: one literal or query expression spanning the
/// whole input.
pub(crate) fn parse_mapping(input: &str) -> Result<Box<dyn Function>, ParseError> {
    let span = Span::new(input);
    match delimited(whitespace, alt((literal::literal, query::query)), whitespace).parse(span) {
        Ok((rest, function)) => {
            if rest.fragment().is_empty() {
                Ok(function)
            } else {
                Err(ParseError::expected(&rest, "end of input"))
            }
        }
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err),
        Err(nom::Err::Incomplete(_)) => unreachable!(),
    }
}
