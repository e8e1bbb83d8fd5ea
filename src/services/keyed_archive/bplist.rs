//! Binary property list (`bplist00`) reader.
//!
//! Layout: 8-byte magic, the objects, an offset table, then a 32-byte
//! trailer. Containers point at their children by position in the offset
//! table ("object refs"); keyed-archive UIDs are a separate, higher-level
//! kind of reference and are decoded as [`Value::Reference`].

use super::value::{Number, Value};
use crate::types::errors::DecodeError;
use chrono::{DateTime, SecondsFormat};

const MAGIC: &[u8] = b"bplist00";
const TRAILER_LEN: usize = 32;

/// Deepest container nesting accepted by the reader and the resolver.
pub const MAX_NESTING: usize = 512;

/// Lower bound of every node budget.
const MIN_NODE_BUDGET: usize = 1 << 18;

/// Decoded nodes allowed per input byte (reader) or per table node
/// (resolver). Containers sharing children are expanded once per use, so
/// the budget bounds the blow-up.
const NODES_PER_UNIT: usize = 16;

/// Node budget for `units` bytes or table nodes.
pub fn node_budget(units: usize) -> usize {
    units.saturating_mul(NODES_PER_UNIT).max(MIN_NODE_BUDGET)
}

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
const APPLE_EPOCH_OFFSET: f64 = 978_307_200.0;

/// Parse a complete binary plist and return its top object.
pub fn parse(data: &[u8]) -> Result<Value, DecodeError> {
    let mut reader = BinaryPlistReader::new(data)?;
    let top = reader.top;
    reader.read_object(top, 0)
}

/// Cursor over one binary plist. Borrowed bytes, owned offset table.
struct BinaryPlistReader<'a> {
    data: &'a [u8],
    /// End of the object area (start of the offset table).
    objects_end: usize,
    offsets: Vec<usize>,
    ref_size: usize,
    top: usize,
    /// Object refs currently being decoded on this path.
    active: Vec<bool>,
    decoded: usize,
    budget: usize,
}

impl<'a> BinaryPlistReader<'a> {
    fn new(data: &'a [u8]) -> Result<Self, DecodeError> {
        if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        if data.len() < MAGIC.len() + TRAILER_LEN {
            return Err(DecodeError::BadTrailer(format!(
                "{} bytes is too short for a trailer",
                data.len()
            )));
        }

        let trailer = &data[data.len() - TRAILER_LEN..];
        let offset_size = usize::from(trailer[6]);
        let ref_size = usize::from(trailer[7]);
        if !(1..=8).contains(&offset_size) || !(1..=8).contains(&ref_size) {
            return Err(DecodeError::BadTrailer(format!(
                "offset size {offset_size}, object ref size {ref_size}"
            )));
        }

        let num_objects = to_usize(be_uint(&trailer[8..16]));
        let top = to_usize(be_uint(&trailer[16..24]));
        let table_offset = to_usize(be_uint(&trailer[24..32]));

        if num_objects == 0 || top >= num_objects {
            return Err(DecodeError::BadTrailer(format!(
                "top object {top} with {num_objects} objects"
            )));
        }

        let table_end = num_objects
            .checked_mul(offset_size)
            .and_then(|len| table_offset.checked_add(len))
            .ok_or_else(|| DecodeError::BadTrailer("offset table size overflows".into()))?;
        if table_offset < MAGIC.len() || table_end > data.len() - TRAILER_LEN {
            return Err(DecodeError::BadTrailer(format!(
                "offset table at {table_offset} does not fit"
            )));
        }

        let offsets = data[table_offset..table_end]
            .chunks_exact(offset_size)
            .enumerate()
            .map(|(objref, chunk)| {
                let offset = to_usize(be_uint(chunk));
                if offset < MAGIC.len() || offset >= table_offset {
                    Err(DecodeError::BadOffset { objref, offset })
                } else {
                    Ok(offset)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            data,
            objects_end: table_offset,
            active: vec![false; offsets.len()],
            offsets,
            ref_size,
            top,
            decoded: 0,
            budget: node_budget(data.len()),
        })
    }

    fn read_object(&mut self, objref: usize, depth: usize) -> Result<Value, DecodeError> {
        if depth > MAX_NESTING {
            return Err(DecodeError::NestingTooDeep(MAX_NESTING));
        }
        let offset = *self
            .offsets
            .get(objref)
            .ok_or(DecodeError::BadObjectRef {
                objref,
                count: self.offsets.len(),
            })?;

        if self.active[objref] {
            return Err(DecodeError::CyclicObject(objref));
        }
        self.decoded += 1;
        if self.decoded > self.budget {
            return Err(DecodeError::TooManyNodes(self.budget));
        }
        self.active[objref] = true;
        let result = self.read_at(offset, depth);
        self.active[objref] = false;
        result
    }

    fn read_at(&mut self, offset: usize, depth: usize) -> Result<Value, DecodeError> {
        let marker = self.byte(offset)?;
        let info = marker & 0x0F;

        match marker >> 4 {
            0x0 => match info {
                0x0 | 0xF => Ok(Value::Null),
                0x8 => Ok(Value::Bool(false)),
                0x9 => Ok(Value::Bool(true)),
                _ => Err(DecodeError::UnsupportedMarker { marker, offset }),
            },
            0x1 => self.read_int(offset).map(|(n, _)| Value::Number(n)),
            0x2 => self.read_real(offset, info).map(Value::Number),
            0x3 if info == 0x3 => self.read_date(offset),
            0x4 => {
                let (len, start) = self.read_length(offset, info)?;
                Ok(Value::ByteString(self.slice(start, len)?.to_vec()))
            }
            0x5 => {
                let (len, start) = self.read_length(offset, info)?;
                // ASCII strings; bytes above 0x7f are taken as Latin-1.
                Ok(Value::String(
                    self.slice(start, len)?.iter().map(|&b| char::from(b)).collect(),
                ))
            }
            0x6 => {
                let (units, start) = self.read_length(offset, info)?;
                let byte_len = units.checked_mul(2).ok_or(DecodeError::Truncated(start))?;
                let wide: Vec<u16> = self
                    .slice(start, byte_len)?
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&wide)
                    .map(Value::String)
                    .map_err(|_| DecodeError::InvalidString(offset))
            }
            0x7 => {
                let (len, start) = self.read_length(offset, info)?;
                std::str::from_utf8(self.slice(start, len)?)
                    .map(|s| Value::String(s.to_string()))
                    .map_err(|_| DecodeError::InvalidString(offset))
            }
            0x8 => {
                let bytes = self.slice(offset + 1, usize::from(info) + 1)?;
                Ok(Value::Reference(to_usize(be_uint(bytes))))
            }
            0xA | 0xC => {
                let (count, start) = self.read_length(offset, info)?;
                let refs = self.read_refs(start, count)?;
                let mut items = Vec::with_capacity(refs.len());
                for child in refs {
                    items.push(self.read_object(child, depth + 1)?);
                }
                Ok(Value::Sequence(items))
            }
            0xD => {
                let (count, start) = self.read_length(offset, info)?;
                let keys = self.read_refs(start, count)?;
                let values = self.read_refs(start + count * self.ref_size, count)?;
                let mut entries = Vec::with_capacity(count);
                for (key_ref, value_ref) in keys.into_iter().zip(values) {
                    let key = match self.read_object(key_ref, depth + 1)? {
                        Value::String(s) => s,
                        _ => return Err(DecodeError::NonStringKey(offset)),
                    };
                    entries.push((key, self.read_object(value_ref, depth + 1)?));
                }
                Ok(Value::Mapping(entries))
            }
            _ => Err(DecodeError::UnsupportedMarker { marker, offset }),
        }
    }

    /// Reads an int object at `offset`; returns the value and the next offset.
    fn read_int(&self, offset: usize) -> Result<(Number, usize), DecodeError> {
        let marker = self.byte(offset)?;
        let power = marker & 0x0F;
        if marker >> 4 != 0x1 || power > 4 {
            return Err(DecodeError::UnsupportedMarker { marker, offset });
        }
        let width = 1usize << power;
        let bytes = self.slice(offset + 1, width)?;

        let number = match width {
            // 1, 2 and 4 byte ints are unsigned; 8 and 16 byte ints are signed.
            1 | 2 | 4 | 8 => Number::Int(be_uint(bytes) as i64),
            _ => {
                let mut buf = [0u8; 16];
                buf.copy_from_slice(bytes);
                let wide = i128::from_be_bytes(buf);
                if let Ok(v) = i64::try_from(wide) {
                    Number::Int(v)
                } else if let Ok(v) = u64::try_from(wide) {
                    Number::UInt(v)
                } else {
                    return Err(DecodeError::UnsupportedMarker { marker, offset });
                }
            }
        };
        Ok((number, offset + 1 + width))
    }

    fn read_real(&self, offset: usize, info: u8) -> Result<Number, DecodeError> {
        match info {
            0x2 => {
                let b = self.slice(offset + 1, 4)?;
                Ok(Number::Real(f64::from(f32::from_be_bytes([b[0], b[1], b[2], b[3]]))))
            }
            0x3 => Ok(Number::Real(self.f64_at(offset + 1)?)),
            _ => Err(DecodeError::UnsupportedMarker {
                marker: 0x20 | info,
                offset,
            }),
        }
    }

    fn read_date(&self, offset: usize) -> Result<Value, DecodeError> {
        let since_2001 = self.f64_at(offset + 1)?;
        let unix = APPLE_EPOCH_OFFSET + since_2001;
        let secs = unix.floor();
        let nanos = ((unix - secs) * 1e9) as u32;

        if !secs.is_finite() {
            return Err(DecodeError::UnsupportedMarker { marker: 0x33, offset });
        }
        DateTime::from_timestamp(secs as i64, nanos)
            .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            .ok_or(DecodeError::UnsupportedMarker { marker: 0x33, offset })
    }

    /// Object count or byte length from the low nibble, or from the int
    /// object that follows when the nibble is `0xF`. Returns (length, start).
    fn read_length(&self, offset: usize, info: u8) -> Result<(usize, usize), DecodeError> {
        if info != 0x0F {
            return Ok((usize::from(info), offset + 1));
        }
        match self.read_int(offset + 1)? {
            (Number::Int(n), next) if n >= 0 => Ok((to_usize(n as u64), next)),
            _ => Err(DecodeError::UnsupportedMarker {
                marker: self.byte(offset)?,
                offset,
            }),
        }
    }

    fn read_refs(&self, start: usize, count: usize) -> Result<Vec<usize>, DecodeError> {
        let len = count
            .checked_mul(self.ref_size)
            .ok_or(DecodeError::Truncated(start))?;
        Ok(self
            .slice(start, len)?
            .chunks_exact(self.ref_size)
            .map(|chunk| to_usize(be_uint(chunk)))
            .collect())
    }

    fn byte(&self, offset: usize) -> Result<u8, DecodeError> {
        Ok(self.slice(offset, 1)?[0])
    }

    fn f64_at(&self, offset: usize) -> Result<f64, DecodeError> {
        let b = self.slice(offset, 8)?;
        Ok(f64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn slice(&self, start: usize, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = start.checked_add(len).ok_or(DecodeError::Truncated(start))?;
        if end > self.objects_end {
            return Err(DecodeError::Truncated(start));
        }
        Ok(&self.data[start..end])
    }
}

fn be_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

fn to_usize(v: u64) -> usize {
    usize::try_from(v).unwrap_or(usize::MAX)
}
