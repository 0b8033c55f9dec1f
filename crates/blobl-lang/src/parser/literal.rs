use nom::Parser;
use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::sequence::separated_pair;

use super::combinators::{
    delimited_pattern, expect, quoted_string, scalar, spaces_and_tabs, whitespace,
};
use super::query;
use super::{PResult, Span};
use crate::query::literal::{ArrayLiteral, MapLiteral};
use crate::query::{Function, Parsed};

/// Parses any literal value. Containers fold to a concrete value at parse
/// time unless at least one element is dynamic.
pub(crate) fn dynamic_literal_value(input: Span) -> PResult<Parsed> {
    alt((
        map(scalar, Parsed::Static),
        dynamic_array,
        dynamic_object,
    ))
    .parse(input)
}

/// Top-level literal entry point: the result is always an expression node,
/// so downstream grammar rules need not distinguish static from dynamic.
pub(crate) fn literal(input: Span) -> PResult<Box<dyn Function>> {
    map(dynamic_literal_value, Parsed::into_function).parse(input)
}

/// A container element: a literal, or a query sub-expression. The fallback
/// keeps the grammar's `object` expectation label even though it accepts any
/// query.
fn element(input: Span) -> PResult<Parsed> {
    alt((
        dynamic_literal_value,
        map(expect(query::query, "object"), Parsed::Dynamic),
    ))
    .parse(input)
}

fn dynamic_array(input: Span) -> PResult<Parsed> {
    map(
        delimited_pattern(
            expect((char('['), whitespace), "array"),
            element,
            (opt(spaces_and_tabs), char(','), whitespace),
            (whitespace, char(']')),
            false,
            false,
        ),
        ArrayLiteral::fold,
    )
    .parse(input)
}

fn dynamic_object(input: Span) -> PResult<Parsed> {
    map(
        delimited_pattern(
            expect((char('{'), whitespace), "object"),
            separated_pair(
                quoted_string,
                (opt(spaces_and_tabs), char(':'), whitespace),
                element,
            ),
            (opt(spaces_and_tabs), char(','), whitespace),
            (whitespace, char('}')),
            false,
            false,
        ),
        MapLiteral::fold,
    )
    .parse(input)
}
