// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP record parser using nom
//!
//! Line-oriented scanning of `#id = KEYWORD(args)` records plus the token
//! grammar used to decode their arguments. Zero-copy: tokens borrow from the
//! document text.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, one_of, satisfy},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::ErrorKind,
    multi::{separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::RecordId;

/// STEP argument token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Entity reference: #123
    EntityRef(RecordId),
    /// String literal: 'text'
    String(&'a str),
    /// Integer: 42
    Integer(i64),
    /// Float: 3.14, 0., 1.E-3
    Float(f64),
    /// Enum: .T., .F., .UNSPECIFIED.
    Enum(&'a str),
    /// List: (1, 2, 3)
    List(Vec<Token<'a>>),
    /// Typed value: LENGTH_MEASURE(1.)
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Null value: $
    Null,
    /// Asterisk (derived value): *
    Derived,
}

impl<'a> Token<'a> {
    /// Get as entity reference
    #[inline]
    pub fn as_entity_ref(&self) -> Option<RecordId> {
        match self {
            Token::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Get as float (integers are widened)
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Token::Float(f) => Some(*f),
            Token::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get a STEP logical (`.T.` / `.F.`) as bool
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Enum("T") | Token::Enum("TRUE") => Some(true),
            Token::Enum("F") | Token::Enum("FALSE") => Some(false),
            _ => None,
        }
    }

    /// Get as list
    #[inline]
    pub fn as_list(&self) -> Option<&[Token<'a>]> {
        match self {
            Token::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check if null/derived
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Token::Null | Token::Derived)
    }
}

/// Parse entity reference: #123
fn entity_ref(input: &str) -> IResult<&str, Token> {
    map(
        preceded(char('#'), map_res(digit1, |s: &str| s.parse::<RecordId>())),
        Token::EntityRef,
    )(input)
}

/// Parse string literal: 'text'
/// STEP uses '' to escape a single quote within a string
fn string_literal(input: &str) -> IResult<&str, Token> {
    fn string_content(input: &str) -> IResult<&str, &str> {
        let bytes = input.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if bytes.get(i + 1) == Some(&b'\'') {
                    i += 2;
                    continue;
                }
                return Ok((&input[i..], &input[..i]));
            }
            i += 1;
        }
        Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Char)))
    }

    map(delimited(char('\''), string_content, char('\'')), Token::String)(input)
}

/// Parse integer: 42, -42
fn integer(input: &str) -> IResult<&str, Token> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &str| {
        s.parse::<i64>().map(Token::Integer)
    })(input)
}

/// Parse float: 3.14, -3.14, 1.5E-10, 0.
/// STEP reals always carry a decimal point, possibly without fraction digits
fn float(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            char('.'),
            opt(digit1),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| fast_float::parse::<f64, _>(s).map(Token::Float),
    )(input)
}

/// Parse enum: .T., .F., .UNSPECIFIED.
fn enum_value(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('.'),
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
            char('.'),
        ),
        Token::Enum,
    )(input)
}

/// Parse null: $
fn null(input: &str) -> IResult<&str, Token> {
    map(char('$'), |_| Token::Null)(input)
}

/// Parse derived: *
fn derived(input: &str) -> IResult<&str, Token> {
    map(char('*'), |_| Token::Derived)(input)
}

/// Parse an entity keyword: CARTESIAN_POINT, AXIS2_PLACEMENT_3D
fn keyword(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// Parse typed value: LENGTH_MEASURE(1.)
fn typed_value(input: &str) -> IResult<&str, Token> {
    map(pair(keyword, parenthesized(token)), |(type_name, args)| {
        Token::TypedValue(type_name, args)
    })(input)
}

/// Skip whitespace
fn ws(input: &str) -> IResult<&str, ()> {
    map(take_while(|c: char| c.is_whitespace()), |_| ())(input)
}

/// Comma-separated items between parentheses, whitespace tolerant
fn parenthesized<'a, O, F>(item: F) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<O>>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(
        pair(char('('), ws),
        separated_list0(delimited(ws, char(','), ws), item),
        pair(ws, char(')')),
    )
}

/// Parse a token with optional surrounding whitespace
fn token(input: &str) -> IResult<&str, Token> {
    delimited(
        ws,
        alt((
            float, // Try float before integer (float includes '.')
            integer,
            entity_ref,
            string_literal,
            enum_value,
            list,
            typed_value,
            null,
            derived,
        )),
        ws,
    )(input)
}

/// Parse list: (1, 2, 3) or nested lists
fn list(input: &str) -> IResult<&str, Token> {
    map(parenthesized(token), Token::List)(input)
}

/// Parse a bare number for coordinate tuples
fn number(input: &str) -> IResult<&str, f64> {
    match fast_float::parse_partial::<f64, _>(input) {
        Ok((value, consumed)) if consumed > 0 => Ok((&input[consumed..], value)),
        _ => Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Float))),
    }
}

/// Flat numeric tuple: (0., 1.5, -2.)
fn number_tuple(input: &str) -> IResult<&str, Vec<f64>> {
    delimited(
        pair(char('('), ws),
        separated_list1(delimited(ws, char(','), ws), number),
        pair(ws, char(')')),
    )(input)
}

/// Arguments of CARTESIAN_POINT / DIRECTION: ('name', (x, y, z))
fn coordinate_arguments(input: &str) -> IResult<&str, Vec<f64>> {
    delimited(
        pair(char('('), ws),
        preceded(
            pair(alt((string_literal, null)), delimited(ws, char(','), ws)),
            number_tuple,
        ),
        pair(ws, char(')')),
    )(input)
}

/// Record header anchored at line start: `#12 = KEYWORD`
fn record_header(input: &str) -> IResult<&str, (RecordId, &str)> {
    map(
        tuple((
            preceded(char('#'), map_res(digit1, |s: &str| s.parse::<RecordId>())),
            delimited(ws, char('='), ws),
            keyword,
            ws,
        )),
        |(id, _, keyword, _)| (id, keyword),
    )(input)
}

/// Decode a parenthesized argument text with the generic token grammar
pub fn parse_arguments(input: &str, line: usize) -> Result<Vec<Token<'_>>> {
    match all_consuming(delimited(ws, list, ws))(input) {
        Ok((_, Token::List(items))) => Ok(items),
        Ok((_, other)) => Err(Error::parse(line, format!("expected argument list, got {:?}", other))),
        Err(e) => Err(Error::parse(line, format!("invalid arguments: {}", e))),
    }
}

/// Decode the flat coordinate tuple carried by points and directions.
/// Two-component tuples are padded with z = 0.
pub fn parse_coordinates(input: &str, line: usize) -> Result<[f64; 3]> {
    let values: SmallVec<[f64; 3]> = match all_consuming(delimited(ws, coordinate_arguments, ws))(input) {
        Ok((_, values)) => values.into_iter().collect(),
        Err(e) => return Err(Error::parse(line, format!("invalid coordinate tuple: {}", e))),
    };

    match values.as_slice() {
        [x, y] => Ok([*x, *y, 0.0]),
        [x, y, z] => Ok([*x, *y, *z]),
        other => Err(Error::parse(
            line,
            format!("expected 2 or 3 coordinates, got {}", other.len()),
        )),
    }
}

/// A candidate record: header matched, arguments not yet decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// Record identifier (`#12` → 12)
    pub id: RecordId,
    /// Entity keyword as written
    pub keyword: &'a str,
    /// Raw argument text including the outer parentheses
    pub args: &'a str,
    /// 1-based line number in the document
    pub line: usize,
}

impl<'a> RawRecord<'a> {
    /// Match one line against `#<digits> = <KEYWORD>(`.
    /// Returns `None` for lines that are not candidate records.
    pub fn from_line(text: &'a str, line: usize) -> Option<Self> {
        let (rest, (id, keyword)) = record_header(text).ok()?;
        if !rest.starts_with('(') {
            return None;
        }

        // Trailing `;` (or anything after the last parenthesis) is tolerated.
        // A line without a closing parenthesis stays a candidate and fails decoding.
        let args = match rest.rfind(')') {
            Some(close) => &rest[..=close],
            None => rest,
        };

        Some(Self {
            id,
            keyword,
            args,
            line,
        })
    }
}

/// Lazy line scanner over a STEP document
/// Yields candidate records; every other line is skipped silently
pub struct RecordScanner<'a> {
    content: &'a str,
    position: usize,
    line: usize,
}

impl<'a> RecordScanner<'a> {
    /// Create a new scanner
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            position: 0,
            line: 0,
        }
    }
}

impl<'a> Iterator for RecordScanner<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.content.len() {
            let remaining = &self.content[self.position..];
            let line_len = memchr::memchr(b'\n', remaining.as_bytes()).unwrap_or(remaining.len());
            let text = remaining[..line_len].trim_end_matches('\r');

            self.position += line_len + 1;
            self.line += 1;

            if !text.starts_with('#') {
                continue;
            }
            if let Some(record) = RawRecord::from_line(text, self.line) {
                return Some(record);
            }
        }
        None
    }
}

/// Check for the ISO-10303-21 exchange-structure header
pub fn is_step_document(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.starts_with("ISO-10303-21"))
        .unwrap_or(false)
}

/// Check for a `.step` / `.stp` file extension (case-insensitive)
pub fn is_step_path(path: impl AsRef<std::path::Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("step") || ext.eq_ignore_ascii_case("stp"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ref() {
        assert_eq!(entity_ref("#123"), Ok(("", Token::EntityRef(123))));
        assert_eq!(entity_ref("#0"), Ok(("", Token::EntityRef(0))));
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("'hello'"), Ok(("", Token::String("hello"))));
        assert_eq!(string_literal("''"), Ok(("", Token::String(""))));
        assert_eq!(string_literal("'it''s'"), Ok(("", Token::String("it''s"))));
    }

    #[test]
    fn test_float() {
        assert_eq!(float("3.14"), Ok(("", Token::Float(3.14))));
        assert_eq!(float("-3.14"), Ok(("", Token::Float(-3.14))));
        assert_eq!(float("0."), Ok(("", Token::Float(0.0))));
        assert_eq!(float("1.5E-10"), Ok(("", Token::Float(1.5e-10))));
        assert!(float("42").is_err());
    }

    #[test]
    fn test_enum_and_bool() {
        let (_, t) = enum_value(".T.").unwrap();
        assert_eq!(t.as_bool(), Some(true));
        let (_, f) = enum_value(".F.").unwrap();
        assert_eq!(f.as_bool(), Some(false));
        let (_, u) = enum_value(".UNSPECIFIED.").unwrap();
        assert_eq!(u.as_bool(), None);
    }

    #[test]
    fn test_nested_list() {
        let (_, token) = list("( 1, (#2 , #3), $, * )").unwrap();
        let items = token.as_list().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], Token::Integer(1));
        assert_eq!(items[1].as_list().unwrap()[1].as_entity_ref(), Some(3));
        assert!(items[2].is_null());
        assert!(items[3].is_null());
    }

    #[test]
    fn test_empty_list() {
        let (_, token) = list("( )").unwrap();
        assert_eq!(token.as_list().map(|l| l.len()), Some(0));
    }

    #[test]
    fn test_parse_arguments() {
        let args = parse_arguments("('',*,*,#12,.T.)", 1).unwrap();
        assert_eq!(args.len(), 5);
        assert!(args[1].is_null());
        assert_eq!(args[3].as_entity_ref(), Some(12));
        assert_eq!(args[4].as_bool(), Some(true));

        assert!(parse_arguments("('',#1", 1).is_err());
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(
            parse_coordinates("('', (0.E+000, -1.5, 2.))", 1).unwrap(),
            [0.0, -1.5, 2.0]
        );
        assert_eq!(parse_coordinates("('p', (3., 4.))", 1).unwrap(), [3.0, 4.0, 0.0]);
        assert!(parse_coordinates("('', (1., 2., 3., 4.))", 1).is_err());
        assert!(parse_coordinates("('', #5)", 1).is_err());
    }

    #[test]
    fn test_raw_record_from_line() {
        let record = RawRecord::from_line("#42 = CARTESIAN_POINT('', (1., 2., 3.));", 7).unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.keyword, "CARTESIAN_POINT");
        assert_eq!(record.args, "('', (1., 2., 3.))");
        assert_eq!(record.line, 7);

        // Compact form without spaces
        let record = RawRecord::from_line("#7=PLANE('',#8)", 1).unwrap();
        assert_eq!(record.keyword, "PLANE");
        assert_eq!(record.args, "('',#8)");

        // Not anchored, no keyword, complex entity
        assert!(RawRecord::from_line("  #1 = PLANE('',#8);", 1).is_none());
        assert!(RawRecord::from_line("#1 = ('',#8);", 1).is_none());
        assert!(RawRecord::from_line("DATA;", 1).is_none());
    }

    #[test]
    fn test_record_scanner() {
        let content = "ISO-10303-21;\r\nDATA;\r\n#1 = CARTESIAN_POINT('', (0., 0., 0.));\r\n/* comment */\r\n#2 = DIRECTION('', (0., 0., 1.));\r\nENDSEC;";
        let records: Vec<_> = RecordScanner::new(content).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].line, 3);
        assert_eq!(records[1].keyword, "DIRECTION");
        assert_eq!(records[1].line, 5);
    }

    #[test]
    fn test_is_step_document() {
        assert!(is_step_document("\n  ISO-10303-21;\nHEADER;"));
        assert!(!is_step_document("solid cube\nfacet normal"));
        assert!(!is_step_document(""));
    }

    #[test]
    fn test_is_step_path() {
        assert!(is_step_path("models/bracket.step"));
        assert!(is_step_path("BRACKET.STP"));
        assert!(!is_step_path("bracket.stl"));
        assert!(!is_step_path("step"));
    }
}
