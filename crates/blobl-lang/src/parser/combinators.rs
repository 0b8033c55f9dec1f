use nom::Parser;
use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, tag, take_while1, take_while_m_n};
use nom::character::complete::{char, line_ending, none_of, not_line_ending};
use nom::combinator::{map, map_opt, map_res, opt, recognize, value};
use nom::multi::many0;
use nom::number::complete::double;
use nom::sequence::{delimited, pair, preceded};

use super::error::ParseError;
use super::{PResult, Span};
use crate::number::Number;
use crate::value::Value;

/// Replaces a soft failure of `parser` with an expectation labeled `label`,
/// anchored at the attempted position. Hard failures pass through.
pub(crate) fn expect<'a, O, P>(
    mut parser: P,
    label: &'static str,
) -> impl FnMut(Span<'a>) -> PResult<'a, O>
where
    P: Parser<Span<'a>, Output = O, Error = ParseError>,
{
    move |input: Span<'a>| {
        parser.parse(input).map_err(|err| match err {
            nom::Err::Error(_) => nom::Err::Error(ParseError::expected(&input, label)),
            err => err,
        })
    }
}

fn merge_err(a: nom::Err<ParseError>, b: nom::Err<ParseError>) -> nom::Err<ParseError> {
    match (a, b) {
        (nom::Err::Error(a), nom::Err::Error(b)) => nom::Err::Error(a.merge(b)),
        (err @ nom::Err::Failure(_), _) => err,
        (_, err) => err,
    }
}

/// Parses a bracketed, separator-delimited list.
///
/// The two flags control whether a separator may trail the final element and
/// whether the list may hold zero elements.
pub(crate) fn delimited_pattern<'a, P, E, S, C>(
    mut open: P,
    mut element: E,
    mut separator: S,
    mut close: C,
    allow_trailing: bool,
    allow_empty: bool,
) -> impl FnMut(Span<'a>) -> PResult<'a, Vec<E::Output>>
where
    P: Parser<Span<'a>, Error = ParseError>,
    E: Parser<Span<'a>, Error = ParseError>,
    S: Parser<Span<'a>, Error = ParseError>,
    C: Parser<Span<'a>, Error = ParseError>,
{
    move |input: Span<'a>| {
        let (mut rest, _) = open.parse(input)?;
        let mut items = Vec::new();
        if allow_empty {
            if let Ok((after_close, _)) = close.parse(rest) {
                return Ok((after_close, items));
            }
        }
        loop {
            let (after_element, item) = element.parse(rest)?;
            items.push(item);
            rest = after_element;
            match separator.parse(rest) {
                Ok((after_separator, _)) => rest = after_separator,
                Err(err @ nom::Err::Failure(_)) => return Err(err),
                Err(separator_err) => {
                    return match close.parse(rest) {
                        Ok((after_close, _)) => Ok((after_close, items)),
                        Err(close_err) => Err(merge_err(separator_err, close_err)),
                    };
                }
            }
            if allow_trailing {
                if let Ok((after_close, _)) = close.parse(rest) {
                    return Ok((after_close, items));
                }
            }
        }
    }
}

/// Discards a run of spaces and tabs.
pub(crate) fn spaces_and_tabs(input: Span) -> PResult<()> {
    value((), take_while1(|c| c == ' ' || c == '\t')).parse(input)
}

/// Discards a newline, optionally preceded by a `#` comment running to the
/// end of the line.
pub(crate) fn newline_allow_comment(input: Span) -> PResult<()> {
    value(
        (),
        pair(opt(preceded(char('#'), not_line_ending)), line_ending),
    )
    .parse(input)
}

/// Discards any run of insignificant whitespace, including comment lines.
pub(crate) fn whitespace(input: Span) -> PResult<()> {
    value((), many0(alt((newline_allow_comment, spaces_and_tabs)))).parse(input)
}

pub(crate) fn boolean(input: Span) -> PResult<Value> {
    expect(
        alt((
            value(Value::Bool(true), tag("true")),
            value(Value::Bool(false), tag("false")),
        )),
        "boolean",
    )(input)
}

pub(crate) fn number(input: Span) -> PResult<Value> {
    expect(
        map_res(recognize(pair(opt(char('-')), double)), |span: Span| {
            match span.fragment().parse::<i64>() {
                Ok(n) => Ok(Value::Number(Number::Int(n))),
                Err(_) => span
                    .fragment()
                    .parse::<f64>()
                    .map(|n| Value::Number(Number::Float(n))),
            }
        }),
        "number",
    )(input)
}

fn unicode(input: Span) -> PResult<char> {
    map_opt(
        map_res(
            preceded(
                char('u'),
                delimited(
                    char('{'),
                    take_while_m_n(1, 6, |c: char| c.is_ascii_hexdigit()),
                    char('}'),
                ),
            ),
            |span: Span| u32::from_str_radix(span.fragment(), 16),
        ),
        char::from_u32,
    )
    .parse(input)
}

/// Parses a quoted string, decoding escape sequences.
pub(crate) fn quoted_string(input: Span) -> PResult<String> {
    expect(
        alt((
            map(tag("\"\""), |_| String::new()),
            delimited(
                char('"'),
                escaped_transform(
                    none_of("\"\\"),
                    '\\',
                    alt((
                        value('\\', char('\\')),
                        value('\"', char('\"')),
                        value('\r', char('r')),
                        value('\n', char('n')),
                        value('\t', char('t')),
                        unicode,
                    )),
                ),
                char('"'),
            ),
        )),
        "string",
    )(input)
}

pub(crate) fn null(input: Span) -> PResult<Value> {
    expect(value(Value::Null, tag("null")), "null")(input)
}

/// Parses any scalar literal, trying each form in a fixed priority order.
pub(crate) fn scalar(input: Span) -> PResult<Value> {
    alt((boolean, number, map(quoted_string, Value::String), null)).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn span(input: &str) -> Span<'_> {
        Span::new(input)
    }

    #[rstest]
    #[case("true", Value::Bool(true), "")]
    #[case("false", Value::Bool(false), "")]
    #[case("123", Value::Number(Number::Int(123)), "")]
    #[case("-42", Value::Number(Number::Int(-42)), "")]
    #[case("4.5", Value::Number(Number::Float(4.5)), "")]
    #[case("1e3", Value::Number(Number::Float(1000.0)), "")]
    #[case("123abc", Value::Number(Number::Int(123)), "abc")]
    #[case("\"foo\"", Value::String("foo".to_string()), "")]
    #[case("\"\"", Value::String(String::new()), "")]
    #[case("\"a\\nb\"", Value::String("a\nb".to_string()), "")]
    #[case("\"quote \\\"q\\\"\"", Value::String("quote \"q\"".to_string()), "")]
    #[case("\"\\u{0061}\"", Value::String("a".to_string()), "")]
    #[case("null", Value::Null, "")]
    fn test_scalar(#[case] input: &str, #[case] expected: Value, #[case] remaining: &str) {
        let (rest, parsed) = scalar(span(input)).unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(*rest.fragment(), remaining);
    }

    #[test]
    fn test_scalar_merges_expectations() {
        let err = match scalar(span("@")) {
            Err(nom::Err::Error(err)) => err,
            other => panic!("expected a soft failure, got {:?}", other.is_ok()),
        };
        assert_eq!(err.to_string(), "expected boolean, number, string, null");
    }

    #[rstest]
    #[case(" \t ", "")]
    #[case("# comment\n  x", "x")]
    #[case("\n\t# one\n# two\n x", "x")]
    #[case("x", "x")]
    fn test_whitespace(#[case] input: &str, #[case] remaining: &str) {
        let (rest, ()) = whitespace(span(input)).unwrap();
        assert_eq!(*rest.fragment(), remaining);
    }

    fn digits<'a>(
        allow_trailing: bool,
        allow_empty: bool,
    ) -> impl FnMut(Span<'a>) -> PResult<'a, Vec<Value>> {
        delimited_pattern(
            char('('),
            number,
            char(','),
            char(')'),
            allow_trailing,
            allow_empty,
        )
    }

    #[rstest]
    #[case("(1,2,3)", false, false, Some(vec![1, 2, 3]))]
    #[case("(1)", false, false, Some(vec![1]))]
    #[case("()", false, false, None)]
    #[case("()", false, true, Some(vec![]))]
    #[case("(1,2,)", false, false, None)]
    #[case("(1,2,)", true, false, Some(vec![1, 2]))]
    #[case("(1,2", false, false, None)]
    fn test_delimited_pattern(
        #[case] input: &str,
        #[case] allow_trailing: bool,
        #[case] allow_empty: bool,
        #[case] expected: Option<Vec<i64>>,
    ) {
        let result = digits(allow_trailing, allow_empty)(span(input));
        match expected {
            Some(values) => {
                let expected: Vec<Value> = values.into_iter().map(Value::from).collect();
                assert_eq!(result.unwrap().1, expected);
            }
            None => assert!(result.is_err()),
        }
    }

    #[test]
    fn test_expect_relabels_soft_failures() {
        let err = match expect(char('['), "array")(span("x")) {
            Err(nom::Err::Error(err)) => err,
            other => panic!("expected a soft failure, got {:?}", other.is_ok()),
        };
        assert_eq!(err.to_string(), "expected array");
        assert_eq!(err.offset(), 0);
    }
}
