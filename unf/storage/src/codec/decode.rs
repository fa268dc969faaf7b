use super::value::{Count, Dest, Element};
use crate::error::{UnfError, UnfResult};
use crate::format::{FieldDescriptor, FieldType, FormatSpec, IntWidth};

/// Supplies record bytes to the decoder, one field at a time.
pub trait FieldSource {
    /// Returns the next `len` bytes, or `None` (consuming nothing) if fewer remain.
    fn take(&mut self, len: usize) -> UnfResult<Option<&[u8]>>;

    /// Number of bytes still available.
    fn available(&self) -> u64;
}

/// A [`FieldSource`] over an in-memory payload.
#[derive(Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl FieldSource for SliceSource<'_> {
    fn take(&mut self, len: usize) -> UnfResult<Option<&[u8]>> {
        if self.data.len() - self.pos < len {
            return Ok(None);
        }
        let start = self.pos;
        self.pos += len;
        Ok(Some(&self.data[start..self.pos]))
    }

    fn available(&self) -> u64 {
        (self.data.len() - self.pos) as u64
    }
}

/// Result of a read: how many fields were fully transferred, and whether the
/// transfer stopped early.
#[derive(Debug)]
pub struct Transfer {
    pub fields: usize,
    pub result: UnfResult<()>,
}

impl Transfer {
    pub fn complete(fields: usize) -> Self {
        Self {
            fields,
            result: Ok(()),
        }
    }

    pub fn partial(fields: usize, err: UnfError) -> Self {
        Self {
            fields,
            result: Err(err),
        }
    }

    pub fn failed(err: UnfError) -> Self {
        Self::partial(0, err)
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Unpacks fields described by `spec` from `source` into `dests`.
///
/// Skipped destinations still consume their bytes and count as transferred.
/// Decoding stops at the first field the source cannot fully satisfy; any
/// bytes after the last requested field are left untouched.
pub fn decode<S>(spec: &FormatSpec, source: &mut S, dests: &mut [Dest<'_>]) -> Transfer
where
    S: FieldSource + ?Sized,
{
    if let Err(err) = check_dests(spec, dests) {
        return Transfer::failed(err);
    }

    // Integer fields seen so far, for `Count::Field` lookups.
    let mut ints: Vec<Option<i64>> = Vec::with_capacity(spec.len());
    for (index, (field, dest)) in spec.iter().zip(dests.iter_mut()).enumerate() {
        let len = match field_len(index, field, dest, &ints) {
            Ok(len) => len,
            Err(err) => return Transfer::partial(index, err),
        };
        let available = source.available();
        let bytes = match source.take(len) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                return Transfer::partial(
                    index,
                    UnfError::ShortRecord {
                        needed: len as u64,
                        available,
                    },
                );
            }
            Err(err) => return Transfer::partial(index, err),
        };
        ints.push(int_value(field, bytes));
        store(dest, bytes);
    }
    Transfer::complete(spec.len())
}

/// Checks `dests` against `spec` without reading anything.
pub(crate) fn check_dests(spec: &FormatSpec, dests: &[Dest<'_>]) -> UnfResult<()> {
    if spec.len() != dests.len() {
        return Err(UnfError::FieldCount {
            expected: spec.len(),
            found: dests.len(),
        });
    }

    for (index, (field, dest)) in spec.iter().zip(dests).enumerate() {
        let fits = match (field.count, dest) {
            (None, Dest::Skip) => true,
            (None, Dest::Scalar(d)) => d.field_type() == field.ty,
            (None, Dest::Char(buf)) => match field.ty {
                FieldType::Char(width) => buf.len() >= width,
                _ => false,
            },
            (Some(_), Dest::Array { target, count }) => {
                let element_fits = target.as_ref().is_none_or(|t| t.element_type() == field.ty);
                element_fits && count_source_fits(spec, index, *count)
            }
            _ => false,
        };
        if !fits {
            return Err(UnfError::FieldMismatch {
                index,
                expected: field.to_string(),
                found: dest.describe(),
            });
        }
    }
    Ok(())
}

/// A field-sourced count must name an earlier integer scalar.
fn count_source_fits(spec: &FormatSpec, index: usize, count: Count) -> bool {
    match count {
        Count::Fixed(_) => true,
        Count::Field(source) => {
            source < index
                && spec.fields()[source].count.is_none()
                && matches!(spec.fields()[source].ty, FieldType::Int(_))
        }
    }
}

fn field_len(
    index: usize,
    field: &FieldDescriptor,
    dest: &Dest<'_>,
    ints: &[Option<i64>],
) -> UnfResult<usize> {
    let (Some(count_width), Dest::Array { count, .. }) = (field.count, dest) else {
        return Ok(field.ty.size());
    };

    let elements = match *count {
        Count::Fixed(n) => n as u64,
        Count::Field(source) => {
            let value = ints.get(source).copied().flatten().ok_or_else(|| {
                UnfError::Bounds(format!("field {index}: count field {source} not decoded"))
            })?;
            u64::try_from(value).map_err(|_| {
                UnfError::Bounds(format!("field {index}: negative element count {value}"))
            })?
        }
    };
    check_count(index, elements, count_width)?;

    (elements as usize)
        .checked_mul(field.ty.size())
        .ok_or_else(|| UnfError::Bounds(format!("field {index}: array size overflows")))
}

fn check_count(index: usize, elements: u64, width: IntWidth) -> UnfResult<()> {
    if elements > width.max_count() {
        return Err(UnfError::Bounds(format!(
            "field {index}: {elements} elements do not fit an i{} count",
            width.bytes()
        )));
    }
    Ok(())
}

fn int_value(field: &FieldDescriptor, bytes: &[u8]) -> Option<i64> {
    if field.is_array() {
        return None;
    }
    match field.ty {
        FieldType::Int(IntWidth::W1) => Some(i64::from(i8::get(bytes))),
        FieldType::Int(IntWidth::W2) => Some(i64::from(i16::get(bytes))),
        FieldType::Int(IntWidth::W4) => Some(i64::from(i32::get(bytes))),
        FieldType::Int(IntWidth::W8) => Some(i64::get(bytes)),
        _ => None,
    }
}

fn store(dest: &mut Dest<'_>, bytes: &[u8]) {
    match dest {
        Dest::Skip | Dest::Array { target: None, .. } => {}
        Dest::Scalar(d) => d.set(bytes),
        Dest::Char(buf) => buf[..bytes.len()].copy_from_slice(bytes),
        Dest::Array {
            target: Some(t), ..
        } => t.fill(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Complex32, Value, encode};

    #[test]
    fn test_skip_counts_but_does_not_store() {
        let spec = FormatSpec::compile("i1,i2,i4,i8").unwrap();
        let payload = encode(
            &spec,
            &[
                Value::from(101i8),
                Value::from(102i16),
                Value::from(104i32),
                Value::from(108i64),
            ],
        )
        .unwrap();

        let (mut a, mut b, mut d) = (0i8, 0i16, 0i64);
        let mut dests = [
            Dest::from(&mut a),
            Dest::from(&mut b),
            Dest::Skip,
            Dest::from(&mut d),
        ];
        let transfer = decode(&spec, &mut SliceSource::new(&payload), &mut dests);
        assert!(transfer.is_ok());
        assert_eq!(transfer.fields, 4);
        assert_eq!((a, b, d), (101, 102, 108));
    }

    #[test]
    fn test_short_payload_stops_early() {
        let spec = FormatSpec::compile("i4,i4,i8").unwrap();
        let mut payload = Vec::new();
        payload.extend_from_slice(&1i32.to_ne_bytes());
        payload.extend_from_slice(&2i32.to_ne_bytes());
        payload.extend_from_slice(&[0u8; 3]);

        let (mut x, mut y, mut z) = (0i32, 0i32, 0i64);
        let mut dests = [Dest::from(&mut x), Dest::from(&mut y), Dest::from(&mut z)];
        let transfer = decode(&spec, &mut SliceSource::new(&payload), &mut dests);
        assert_eq!(transfer.fields, 2);
        assert!(matches!(
            transfer.result,
            Err(UnfError::ShortRecord {
                needed: 8,
                available: 3
            })
        ));
        assert_eq!((x, y, z), (1, 2, 0));
    }

    #[test]
    fn test_partial_read_leaves_remainder() {
        let payload: Vec<u8> = [7i32, 8, 9].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let spec = FormatSpec::compile("i4").unwrap();
        let mut x = 0i32;
        let mut source = SliceSource::new(&payload);
        let transfer = decode(&spec, &mut source, &mut [Dest::from(&mut x)]);
        assert!(transfer.is_ok());
        assert_eq!(x, 7);
        assert_eq!(source.consumed(), 4);
    }

    #[test]
    fn test_char_copies_exact_width() {
        let spec = FormatSpec::compile("c5").unwrap();
        let mut buf = [b'#'; 8];
        let transfer = decode(
            &spec,
            &mut SliceSource::new(b"Hello, World!"),
            &mut [Dest::chars(&mut buf)],
        );
        assert!(transfer.is_ok());
        assert_eq!(&buf, b"Hello###");
    }

    #[test]
    fn test_char_buffer_too_small() {
        let spec = FormatSpec::compile("c5").unwrap();
        let mut buf = [0u8; 4];
        let transfer = decode(&spec, &mut SliceSource::new(b"Hello"), &mut [Dest::chars(&mut buf)]);
        assert_eq!(transfer.fields, 0);
        assert!(matches!(transfer.result, Err(UnfError::FieldMismatch { .. })));
    }

    #[test]
    fn test_array_count_from_earlier_field() {
        let spec = FormatSpec::compile("i4,z4[i4]").unwrap();
        let zs = [Complex32::new(1.0, 2.0), Complex32::new(3.0, 4.0)];
        let payload = encode(&spec, &[Value::from(2i32), Value::from(&zs[..])]).unwrap();

        let mut n = 0i32;
        let mut out: Vec<Complex32> = Vec::new();
        let mut dests = [Dest::from(&mut n), Dest::array(&mut out, Count::Field(0))];
        let transfer = decode(&spec, &mut SliceSource::new(&payload), &mut dests);
        assert!(transfer.is_ok());
        assert_eq!(n, 2);
        assert_eq!(out, zs);
    }

    #[test]
    fn test_count_field_may_be_skipped() {
        let spec = FormatSpec::compile("i2,i4[i2]").unwrap();
        let xs = [5i32, 6, 7];
        let payload = encode(&spec, &[Value::from(3i16), Value::from(&xs[..])]).unwrap();

        let mut out: Vec<i32> = Vec::new();
        let mut dests = [Dest::Skip, Dest::array(&mut out, Count::Field(0))];
        let transfer = decode(&spec, &mut SliceSource::new(&payload), &mut dests);
        assert_eq!(transfer.fields, 2);
        assert_eq!(out, xs);
    }

    #[test]
    fn test_count_field_must_precede_array() {
        let spec = FormatSpec::compile("r8[i4],i4").unwrap();
        let mut out: Vec<f64> = Vec::new();
        let mut n = 0i32;
        let mut dests = [Dest::array(&mut out, Count::Field(1)), Dest::from(&mut n)];
        let transfer = decode(&spec, &mut SliceSource::new(&[]), &mut dests);
        assert!(matches!(
            transfer.result,
            Err(UnfError::FieldMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_negative_count_is_bounds_error() {
        let spec = FormatSpec::compile("i4,r8[i4]").unwrap();
        let payload = (-1i32).to_ne_bytes();
        let mut n = 0i32;
        let mut dests = [Dest::from(&mut n), Dest::skip_array(Count::Field(0))];
        let transfer = decode(&spec, &mut SliceSource::new(&payload), &mut dests);
        assert_eq!(transfer.fields, 1);
        assert!(matches!(transfer.result, Err(UnfError::Bounds(_))));
    }

    #[test]
    fn test_skipped_array_consumes_bytes() {
        let spec = FormatSpec::compile("i2[i4],i8").unwrap();
        let xs = [1i16, 2, 3];
        let payload = encode(&spec, &[Value::from(&xs[..]), Value::from(9i64)]).unwrap();
        let mut tail = 0i64;
        let mut dests = [Dest::skip_array(Count::Fixed(3)), Dest::from(&mut tail)];
        let transfer = decode(&spec, &mut SliceSource::new(&payload), &mut dests);
        assert_eq!(transfer.fields, 2);
        assert_eq!(tail, 9);
    }

    #[test]
    fn test_array_needs_count() {
        let spec = FormatSpec::compile("i4[i4]").unwrap();
        let transfer = decode(&spec, &mut SliceSource::new(&[]), &mut [Dest::Skip]);
        assert!(matches!(transfer.result, Err(UnfError::FieldMismatch { .. })));
    }
}
