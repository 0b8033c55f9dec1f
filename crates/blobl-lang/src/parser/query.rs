use nom::Parser;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char};
use nom::combinator::{map, opt, recognize};
use nom::multi::many0;
use nom::sequence::pair;

use super::combinators::{delimited_pattern, expect, spaces_and_tabs, whitespace};
use super::error::ParseError;
use super::{PResult, Span, literal};
use crate::query::functions;
use crate::query::{Function, Parsed};

/// Parses a query sub-expression: a call into the function registry.
///
/// Resolution happens at parse time; an unrecognised name or an invalid
/// argument shape is a hard failure rather than a fallback to another
/// grammar branch.
pub(crate) fn query(input: Span) -> PResult<Box<dyn Function>> {
    let (rest, name) = function_name(input)?;
    let (rest, args) = function_args(rest)?;
    match functions::resolve(name.fragment(), args) {
        Ok(function) => Ok((rest, function)),
        Err(err) => Err(nom::Err::Failure(ParseError::function(
            &input,
            err.to_string(),
        ))),
    }
}

fn function_name(input: Span) -> PResult<Span> {
    expect(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        "function",
    )(input)
}

fn function_args(input: Span) -> PResult<Vec<Parsed>> {
    delimited_pattern(
        expect((char('('), whitespace), "function arguments"),
        argument,
        (opt(spaces_and_tabs), char(','), whitespace),
        (whitespace, char(')')),
        false,
        true,
    )(input)
}

fn argument(input: Span) -> PResult<Parsed> {
    alt((literal::dynamic_literal_value, map(query, Parsed::Dynamic))).parse(input)
}
