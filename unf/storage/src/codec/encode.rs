use unf_common::constants::CHAR_PAD;

use super::value::Value;
use crate::error::{UnfError, UnfResult};
use crate::format::{FieldType, FormatSpec};

/// Packs `values` into a record payload laid out by `spec`.
///
/// Fields are concatenated in order without padding. Nothing is produced if
/// any value disagrees with its descriptor.
pub fn encode(spec: &FormatSpec, values: &[Value<'_>]) -> UnfResult<Vec<u8>> {
    if spec.len() != values.len() {
        return Err(UnfError::FieldCount {
            expected: spec.len(),
            found: values.len(),
        });
    }

    let mut payload = Vec::with_capacity(spec.fixed_size().unwrap_or(0));
    for (index, (field, value)) in spec.iter().zip(values).enumerate() {
        match (field.count, value) {
            (None, Value::Scalar(scalar)) if scalar.field_type() == field.ty => {
                scalar.put(&mut payload);
            }
            (None, Value::Char(text)) if matches!(field.ty, FieldType::Char(_)) => {
                put_chars(&mut payload, text, field.ty.size());
            }
            (Some(count), Value::Array(array)) if array.element_type() == field.ty => {
                if array.len() as u64 > count.max_count() {
                    return Err(UnfError::Bounds(format!(
                        "field {index}: {} elements do not fit an i{} count",
                        array.len(),
                        count.bytes()
                    )));
                }
                array.put(&mut payload);
            }
            _ => {
                return Err(UnfError::FieldMismatch {
                    index,
                    expected: field.to_string(),
                    found: value.describe(),
                });
            }
        }
    }
    Ok(payload)
}

/// Writes exactly `width` bytes: `text` truncated or right-padded with blanks.
fn put_chars(out: &mut Vec<u8>, text: &[u8], width: usize) {
    let n = text.len().min(width);
    out.extend_from_slice(&text[..n]);
    out.resize(out.len() + (width - n), CHAR_PAD);
}
