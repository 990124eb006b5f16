//! Compact form: an immutable, relocatable binary image of a tree's leaves.
//!
//! # Layout
//!
//! All integers are little-endian. Offsets are relative to the start of the
//! buffer, so the image can be moved, mapped or sent as-is.
//!
//! ```text
//! 0   magic      8 bytes   "oiJS\0\0\0\0"
//! 8   count      u32       number of entries
//! 12  flags      u32       bit 0: entries are sorted by path
//! 16  offsets    count x u64, one per entry, pointing at its record
//!     (pad to 16)
//!     records, each starting on a 16-byte boundary:
//!       v_offset u32       payload start, relative to the record start
//!       path     bytes     escaped path, NUL-terminated
//!       (pad to 8)
//!       tag      u32       0 null, 1 false, 2 true, 3 number, 4 string
//!       number:  u32 cache flags, i64, f64, NUL-terminated text
//!       string:  NUL-terminated UTF-8
//!       (pad to 16)
//! ```
//!
//! Only scalar leaves are stored; arrays and objects are implied by the paths.
//! Every read goes through a bounds-checked accessor, so a corrupt offset fails
//! with a [`TreeError`] instead of reading past the buffer.

use std::fmt;

use crate::enumerate::PathFilter;
use crate::error::{Result, TreeError};
use crate::value::{Number, Value};

/// Magic tag at the start of every compact-form buffer.
pub const MAGIC: [u8; 8] = *b"oiJS\0\0\0\0";
/// Header flag: entries are in strictly ascending path order.
pub const FLAG_SORTED: u32 = 0x01;

const HEADER_LEN: usize = 16;
const OFFSET_LEN: usize = 8;
const RECORD_ALIGN: usize = 16;
const PAYLOAD_ALIGN: usize = 8;

const TAG_NULL: u32 = 0;
const TAG_FALSE: u32 = 1;
const TAG_TRUE: u32 = 2;
const TAG_NUMBER: u32 = 3;
const TAG_STRING: u32 = 4;

const NUMBER_INT_VALID: u32 = 0x01;
const NUMBER_DOUBLE_VALID: u32 = 0x02;
/// tag + cache flags + i64 + f64
const NUMBER_FIXED_LEN: usize = 4 + 4 + 8 + 8;

/// Whether `bytes` starts with the compact-form magic tag.
pub fn is_compact(bytes: &[u8]) -> bool {
    bytes.starts_with(&MAGIC[..4])
}

/// A scalar payload borrowed from a compact-form buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Null,
    Bool(bool),
    Number {
        text: &'a str,
        int: Option<i64>,
        double: Option<f64>,
    },
    String(&'a str),
}

impl<'a> Scalar<'a> {
    /// The payload as text; `null`, `true` and `false` are spelled out.
    pub fn text(&self) -> &'a str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(true) => "true",
            Scalar::Bool(false) => "false",
            Scalar::Number { text, .. } => text,
            Scalar::String(s) => s,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Copy the payload into an owned tree node.
    pub fn to_value(&self) -> Value {
        match *self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Number { text, int, double } => {
                Value::Number(Number::from_parts(text.to_string(), int, double))
            }
            Scalar::String(s) => Value::String(s.to_string()),
        }
    }
}

/// One path/value record of a compact form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<'a> {
    pub path: &'a str,
    pub scalar: Scalar<'a>,
}

/// An immutable, validated compact-form buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct CompactForm {
    bytes: Box<[u8]>,
    count: usize,
    flags: u32,
}

impl CompactForm {
    /// Take ownership of a buffer after checking its header and every record.
    ///
    /// A buffer that claims to be sorted but is not loses its sorted flag, so
    /// lookups fall back to linear scans instead of returning wrong answers.
    pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Result<Self> {
        let bytes = bytes.into();
        let header = bytes.get(..HEADER_LEN).ok_or(TreeError::BadMagic)?;
        if header[..8] != MAGIC {
            return Err(TreeError::BadMagic);
        }
        let count = u32::from_le_bytes([header[8], header[9], header[10], header[11]]) as usize;
        let flags = u32::from_le_bytes([header[12], header[13], header[14], header[15]]);
        let table_end = count
            .checked_mul(OFFSET_LEN)
            .and_then(|len| len.checked_add(HEADER_LEN))
            .ok_or(TreeError::OffsetOverflow)?;
        if table_end > bytes.len() {
            return Err(TreeError::OutOfBounds {
                offset: table_end,
                len: bytes.len(),
            });
        }

        let mut form = Self {
            bytes,
            count,
            flags,
        };
        let mut sorted = true;
        let mut previous: Option<&str> = None;
        for index in 0..form.count {
            let entry = form.entry(index)?;
            if previous.is_some_and(|p| p >= entry.path) {
                sorted = false;
            }
            previous = Some(entry.path);
        }
        if form.flags & FLAG_SORTED != 0 && !sorted {
            tracing::warn!("compact form flagged sorted but is not; binary search disabled");
            form.flags &= !FLAG_SORTED;
        }
        Ok(form)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes.into_vec()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Whether binary search over the entries is valid.
    pub fn is_sorted(&self) -> bool {
        self.flags & FLAG_SORTED != 0
    }

    /// Read the entry at `index` in offset-table order.
    pub fn entry(&self, index: usize) -> Result<Entry<'_>> {
        let record = self.record_at(index)?;
        Ok(Entry {
            path: self.record_path(record)?,
            scalar: self.record_scalar(record)?,
        })
    }

    /// Only the path of the entry at `index`.
    pub fn path_at(&self, index: usize) -> Result<&str> {
        let record = self.record_at(index)?;
        self.record_path(record)
    }

    /// Record offset of entry `index`, which must be below [`Self::len`].
    fn record_at(&self, index: usize) -> Result<usize> {
        if index >= self.count {
            return Err(TreeError::OutOfBounds {
                offset: index,
                len: self.count,
            });
        }
        self.read_offset(index)
    }

    /// Iterate all entries in offset-table order.
    pub fn entries(&self) -> impl Iterator<Item = Result<Entry<'_>>> + '_ {
        (0..self.count).map(move |index| self.entry(index))
    }

    /// All stored paths, without deserializing any payload.
    pub fn paths(&self) -> Result<Vec<&str>> {
        (0..self.count).map(|index| self.path_at(index)).collect()
    }

    fn read_offset(&self, index: usize) -> Result<usize> {
        let at = HEADER_LEN + index * OFFSET_LEN;
        let offset = u64::from_le_bytes(self.read_array(at)?);
        usize::try_from(offset).map_err(|_| TreeError::OffsetOverflow)
    }

    fn record_path(&self, record: usize) -> Result<&str> {
        let at = record.checked_add(4).ok_or(TreeError::OffsetOverflow)?;
        self.read_cstr(at)
    }

    fn record_scalar(&self, record: usize) -> Result<Scalar<'_>> {
        let v_offset = u32::from_le_bytes(self.read_array(record)?) as usize;
        let at = record
            .checked_add(v_offset)
            .ok_or(TreeError::OffsetOverflow)?;
        let tag = u32::from_le_bytes(self.read_array(at)?);
        Ok(match tag {
            TAG_NULL => Scalar::Null,
            TAG_FALSE => Scalar::Bool(false),
            TAG_TRUE => Scalar::Bool(true),
            TAG_NUMBER => {
                let cache = u32::from_le_bytes(self.read_array(at + 4)?);
                let int = i64::from_le_bytes(self.read_array(at + 8)?);
                let double = f64::from_le_bytes(self.read_array(at + 16)?);
                Scalar::Number {
                    text: self.read_cstr(at + NUMBER_FIXED_LEN)?,
                    int: (cache & NUMBER_INT_VALID != 0).then_some(int),
                    double: (cache & NUMBER_DOUBLE_VALID != 0).then_some(double),
                }
            }
            TAG_STRING => Scalar::String(self.read_cstr(at + 4)?),
            tag => return Err(TreeError::InvalidKind { offset: at, tag }),
        })
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        offset
            .checked_add(N)
            .and_then(|end| self.bytes.get(offset..end))
            .and_then(|slice| slice.try_into().ok())
            .ok_or(TreeError::OutOfBounds {
                offset,
                len: self.bytes.len(),
            })
    }

    fn read_cstr(&self, offset: usize) -> Result<&str> {
        let out_of_bounds = TreeError::OutOfBounds {
            offset,
            len: self.bytes.len(),
        };
        let tail = self.bytes.get(offset..).ok_or(out_of_bounds)?;
        let end = tail.iter().position(|&b| b == 0).ok_or(TreeError::OutOfBounds {
            offset: self.bytes.len(),
            len: self.bytes.len(),
        })?;
        std::str::from_utf8(&tail[..end]).map_err(|_| TreeError::InvalidUtf8 { offset })
    }
}

impl fmt::Debug for CompactForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompactForm")
            .field("bytes", &self.bytes.len())
            .field("count", &self.count)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Textual dump: an `oiJS:` header, the entry count, then `path:value` lines.
impl fmt::Display for CompactForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "oiJS:")?;
        writeln!(f, "count: {}", self.count)?;
        for entry in self.entries() {
            match entry {
                Ok(entry) => writeln!(f, "{}:{}", entry.path, entry.scalar.text())?,
                Err(e) => writeln!(f, ":--- {e}")?,
            }
        }
        Ok(())
    }
}

impl Value {
    /// Serialize this tree's scalar leaves into a compact form.
    pub fn to_compact(&self) -> Result<CompactForm> {
        serialize(self)
    }
}

/// Serialize the scalar leaves of `root` into a sorted compact form.
///
/// Fails on an object member with an empty key, on NUL bytes in paths or
/// strings, and on trees too large for 32-bit record offsets.
pub fn serialize(root: &Value) -> Result<CompactForm> {
    reject_missing_keys(root, &mut String::new())?;

    let mut paths = root.to_paths(0, PathFilter::Leaves);
    paths.sort_unstable();

    // First pass: size and place every record.
    let mut records = Vec::with_capacity(paths.len());
    let mut size = pad(HEADER_LEN + OFFSET_LEN * paths.len(), RECORD_ALIGN);
    for path in &paths {
        let Some(node) = root.get(path) else {
            continue;
        };
        if !node.is_scalar() {
            tracing::trace!(path = %path, "skipping empty container");
            continue;
        }
        if path.as_bytes().contains(&0) {
            return Err(TreeError::EmbeddedNul { path: path.clone() });
        }
        let v_offset = pad(4 + path.len() + 1, PAYLOAD_ALIGN);
        let record_len = v_offset + payload_len(node, path)?;
        records.push((size, v_offset, path.as_str(), node));
        size = pad(
            size.checked_add(record_len).ok_or(TreeError::OffsetOverflow)?,
            RECORD_ALIGN,
        );
    }
    let count = u32::try_from(records.len()).map_err(|_| TreeError::OffsetOverflow)?;

    // Second pass: write into one zeroed buffer.
    let mut buf = vec![0u8; size];
    buf[..8].copy_from_slice(&MAGIC);
    put(&mut buf, 8, &count.to_le_bytes());
    put(&mut buf, 12, &FLAG_SORTED.to_le_bytes());
    for (index, &(record, v_offset, path, node)) in records.iter().enumerate() {
        put(&mut buf, HEADER_LEN + index * OFFSET_LEN, &(record as u64).to_le_bytes());
        let v_offset32 = u32::try_from(v_offset).map_err(|_| TreeError::OffsetOverflow)?;
        put(&mut buf, record, &v_offset32.to_le_bytes());
        put(&mut buf, record + 4, path.as_bytes());
        write_payload(&mut buf, record + v_offset, node);
    }
    tracing::debug!(entries = records.len(), bytes = size, "serialized compact form");

    // The offset table shrinks when empty containers were skipped, which
    // leaves unused slack before the first record; the layout stays valid.
    CompactForm::from_bytes(buf)
}

/// Rebuild a tree from a compact form by creating every stored path.
///
/// Objects come back with their members in path order, which is the sorted
/// order for a serialized tree.
pub fn deserialize(form: &CompactForm) -> Result<Value> {
    let mut root = Value::Null;
    for entry in form.entries() {
        let entry = entry?;
        *root.create(entry.path)? = entry.scalar.to_value();
    }
    Ok(root)
}

fn reject_missing_keys(node: &Value, path: &mut String) -> Result<()> {
    match node {
        Value::Object(members) => {
            for (key, child) in members {
                if key.is_empty() {
                    return Err(TreeError::MissingKey { path: path.clone() });
                }
                let mark = path.len();
                crate::path::push_key(path, key);
                reject_missing_keys(child, path)?;
                path.truncate(mark);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                let mark = path.len();
                crate::path::push_index(path, i);
                reject_missing_keys(child, path)?;
                path.truncate(mark);
            }
        }
        _ => {}
    }
    Ok(())
}

fn payload_len(node: &Value, path: &str) -> Result<usize> {
    let text_len = |text: &str| {
        if text.as_bytes().contains(&0) {
            Err(TreeError::EmbeddedNul {
                path: path.to_string(),
            })
        } else {
            Ok(text.len() + 1)
        }
    };
    match node {
        Value::Number(n) => Ok(NUMBER_FIXED_LEN + text_len(n.as_str())?),
        Value::String(s) => Ok(4 + text_len(s)?),
        _ => Ok(4),
    }
}

fn write_payload(buf: &mut [u8], at: usize, node: &Value) {
    match node {
        Value::Null | Value::Array(_) | Value::Object(_) => put(buf, at, &TAG_NULL.to_le_bytes()),
        Value::Bool(false) => put(buf, at, &TAG_FALSE.to_le_bytes()),
        Value::Bool(true) => put(buf, at, &TAG_TRUE.to_le_bytes()),
        Value::Number(n) => {
            let mut cache = 0;
            if n.as_i64().is_some() {
                cache |= NUMBER_INT_VALID;
            }
            if n.as_f64().is_some() {
                cache |= NUMBER_DOUBLE_VALID;
            }
            put(buf, at, &TAG_NUMBER.to_le_bytes());
            put(buf, at + 4, &cache.to_le_bytes());
            put(buf, at + 8, &n.as_i64().unwrap_or(0).to_le_bytes());
            put(buf, at + 16, &n.as_f64().unwrap_or(0.0).to_le_bytes());
            put(buf, at + NUMBER_FIXED_LEN, n.as_str().as_bytes());
        }
        Value::String(s) => {
            put(buf, at, &TAG_STRING.to_le_bytes());
            put(buf, at + 4, s.as_bytes());
        }
    }
}

fn put(buf: &mut [u8], at: usize, bytes: &[u8]) {
    buf[at..at + bytes.len()].copy_from_slice(bytes);
}

fn pad(size: usize, align: usize) -> usize {
    size.div_ceil(align) * align
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_rounds_up() {
        assert_eq!(pad(0, 16), 0);
        assert_eq!(pad(1, 16), 16);
        assert_eq!(pad(16, 16), 16);
        assert_eq!(pad(17, 8), 24);
    }

    #[test]
    fn header_layout() {
        let v = Value::from_json(r#"{"a":1}"#).unwrap();
        let form = serialize(&v).unwrap();
        let bytes = form.as_bytes();
        assert_eq!(&bytes[..8], b"oiJS\0\0\0\0");
        assert_eq!(&bytes[8..12], &1u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &FLAG_SORTED.to_le_bytes());
        let record = u64::from_le_bytes(bytes[16..24].try_into().unwrap()) as usize;
        assert_eq!(record % RECORD_ALIGN, 0);
        assert_eq!(&bytes[record + 4..record + 6], b"a\0");
        assert_eq!(bytes.len() % RECORD_ALIGN, 0);
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let v = Value::from_json(r#"{"a":"text"}"#).unwrap();
        let mut bytes = serialize(&v).unwrap().into_bytes();
        bytes.truncate(bytes.len() - 16);
        assert!(matches!(
            CompactForm::from_bytes(bytes),
            Err(TreeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn corrupt_offset_is_rejected() {
        let v = Value::from_json(r#"{"a":1}"#).unwrap();
        let mut bytes = serialize(&v).unwrap().into_bytes();
        bytes[16..24].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(CompactForm::from_bytes(bytes).is_err());
    }

    #[test]
    fn unsorted_flag_is_dropped() {
        let v = Value::from_json(r#"{"a":1,"b":2}"#).unwrap();
        let mut bytes = serialize(&v).unwrap().into_bytes();
        // swap the two offsets
        let (first, second) = (bytes[16..24].to_vec(), bytes[24..32].to_vec());
        bytes[16..24].copy_from_slice(&second);
        bytes[24..32].copy_from_slice(&first);
        let form = CompactForm::from_bytes(bytes).unwrap();
        assert!(!form.is_sorted());
    }
}
