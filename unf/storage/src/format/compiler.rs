//! One-pass compiler for field-specification strings.
//!
//! Grammar (tokens separated by commas, whitespace around tokens ignored):
//!
//! ```text
//! token  := [repeat] type width [ '[' 'i' width ']' ]
//! type   := 'i' | 'r' | 'z' | 'c'
//! ```
//!
//! A repeat count expands into that many independent descriptors. Character
//! fields take no bracket suffix since their length is never dynamic.

use std::iter;

use unf_common::constants::MAX_FIELDS;

use super::descriptor::{FieldDescriptor, FieldType, FormatSpec, IntWidth, RealWidth};
use crate::error::{UnfError, UnfResult};

/// Compiles a format string into its field descriptors.
///
/// An empty (or all-whitespace) string compiles to an empty spec.
pub fn compile(format: &str) -> UnfResult<FormatSpec> {
    if format.trim().is_empty() {
        return Ok(FormatSpec::default());
    }

    let mut fields = Vec::new();
    for (index, raw) in format.split(',').enumerate() {
        let text = raw.trim();
        let error = |reason| UnfError::Format {
            token: index,
            text: text.to_string(),
            reason,
        };
        let (repeat, field) = parse_token(text).map_err(error)?;
        if repeat > MAX_FIELDS - fields.len() {
            return Err(error(format!(
                "repeat count too large, a format holds at most {MAX_FIELDS} fields"
            )));
        }
        fields.extend(iter::repeat_n(field, repeat));
    }
    Ok(FormatSpec::from(fields))
}

struct Token<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Token<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn letter(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        if byte.is_ascii_alphabetic() {
            self.pos += 1;
            Some(byte.to_ascii_lowercase())
        } else {
            None
        }
    }

    /// Parses a run of decimal digits, if one starts here.
    fn number(&mut self) -> Result<Option<usize>, String> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        let digits = &self.bytes[start..self.pos];
        digits
            .iter()
            .try_fold(0usize, |acc, d| {
                acc.checked_mul(10)?.checked_add(usize::from(d - b'0'))
            })
            .map(Some)
            .ok_or_else(|| "number too large".to_string())
    }

    fn rest(&self) -> &str {
        std::str::from_utf8(&self.bytes[self.pos..]).unwrap_or("?")
    }

    fn is_done(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

fn parse_token(text: &str) -> Result<(usize, FieldDescriptor), String> {
    if text.is_empty() {
        return Err("empty token".to_string());
    }
    let mut token = Token::new(text);

    let repeat = match token.number()? {
        Some(0) => return Err("repeat count must be positive".to_string()),
        Some(n) => n,
        None => 1,
    };

    let letter = token
        .letter()
        .ok_or_else(|| "missing type letter".to_string())?;
    let width = positive_width(&mut token)?;

    let ty = match letter {
        b'i' => FieldType::Int(int_width(width)?),
        b'r' => FieldType::Real(real_width(width, "real")?),
        b'z' => FieldType::Complex(real_width(width, "complex")?),
        b'c' => FieldType::Char(width),
        other => return Err(format!("unknown type letter '{}'", other as char)),
    };

    let count = if token.eat(b'[') {
        if matches!(ty, FieldType::Char(_)) {
            return Err("character fields cannot take a count suffix".to_string());
        }
        match token.letter() {
            Some(b'i') => {}
            Some(_) => return Err("count type must be an integer".to_string()),
            None => return Err("missing count type".to_string()),
        }
        let count_width = int_width(positive_width(&mut token)?)?;
        if !token.eat(b']') {
            return Err("unterminated bracket".to_string());
        }
        Some(count_width)
    } else {
        None
    };

    if !token.is_done() {
        return Err(format!("unexpected trailing characters {:?}", token.rest()));
    }

    Ok((repeat, FieldDescriptor { ty, count }))
}

fn positive_width(token: &mut Token<'_>) -> Result<usize, String> {
    match token.number()? {
        Some(0) => Err("width must be positive".to_string()),
        Some(width) => Ok(width),
        None => Err("missing width".to_string()),
    }
}

fn int_width(width: usize) -> Result<IntWidth, String> {
    IntWidth::from_bytes(width).ok_or_else(|| format!("unsupported integer width {width}"))
}

fn real_width(width: usize, kind: &str) -> Result<RealWidth, String> {
    RealWidth::from_bytes(width).ok_or_else(|| format!("unsupported {kind} width {width}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(format: &str) -> Vec<String> {
        compile(format)
            .unwrap()
            .iter()
            .map(|f| f.to_string())
            .collect()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(types("i1,i2,i4,i8"), ["i1", "i2", "i4", "i8"]);
        assert_eq!(types("r4,r8,z4,z8"), ["r4", "r8", "z4", "z8"]);
        assert_eq!(types("c13"), ["c13"]);
    }

    #[test]
    fn test_repeat_expands() {
        assert_eq!(types("2i4,r8"), ["i4", "i4", "r8"]);
        assert_eq!(types("3r8"), ["r8", "r8", "r8"]);
        assert_eq!(types("2r8[i4]"), ["r8[i4]", "r8[i4]"]);
    }

    #[test]
    fn test_arrays() {
        let spec = compile("i4[i4],r8[i8]").unwrap();
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.fields()[0].count, Some(IntWidth::W4));
        assert_eq!(spec.fields()[1].count, Some(IntWidth::W8));
        assert_eq!(spec.fields()[1].ty, FieldType::Real(RealWidth::W8));
    }

    #[test]
    fn test_empty_format() {
        assert!(compile("").unwrap().is_empty());
        assert!(compile("  ").unwrap().is_empty());
    }

    #[test]
    fn test_whitespace_and_case() {
        assert_eq!(types(" I4 , R8 "), ["i4", "r8"]);
    }

    #[test]
    fn test_rejects_malformed() {
        let cases = [
            ("q4", "unknown type letter"),
            ("i3", "unsupported integer width"),
            ("r2", "unsupported real width"),
            ("z16", "unsupported complex width"),
            ("0i4", "repeat count must be positive"),
            ("i0", "width must be positive"),
            ("c0", "width must be positive"),
            ("i", "missing width"),
            ("4", "missing type letter"),
            ("-1i4", "missing type letter"),
            ("i4[i4", "unterminated bracket"),
            ("i4[r8]", "count type must be an integer"),
            ("i4[]", "missing count type"),
            ("i4[i3]", "unsupported integer width"),
            ("c10[i4]", "character fields cannot take a count suffix"),
            ("i4]", "unexpected trailing characters"),
            ("i4,,r8", "empty token"),
            ("i4,", "empty token"),
            ("4000000000i4", "repeat count too large"),
            ("99999999999999999999i4", "number too large"),
        ];
        for (format, expected) in cases {
            match compile(format) {
                Err(UnfError::Format { reason, .. }) => {
                    assert!(
                        reason.contains(expected),
                        "{format}: got {reason:?}, expected {expected:?}"
                    )
                }
                other => panic!("{format}: expected format error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_repeat_total_is_capped() {
        assert_eq!(compile(&format!("{MAX_FIELDS}i1")).unwrap().len(), MAX_FIELDS);
        match compile(&format!("i4,{MAX_FIELDS}i1")) {
            Err(UnfError::Format { token, reason, .. }) => {
                assert_eq!(token, 1);
                assert!(reason.contains("repeat count too large"));
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_names_token() {
        match compile("i4,r8,x2") {
            Err(UnfError::Format { token, text, .. }) => {
                assert_eq!(token, 2);
                assert_eq!(text, "x2");
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }
}
