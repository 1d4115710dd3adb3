//! Reader for the NumPy `.npy` array format (versions 1.0 through 3.0).
//!
//! Layout: magic `\x93NUMPY`, major/minor version bytes, a little-endian
//! header length (u16 for 1.x, u32 otherwise), a Python dict literal with
//! `descr`, `fortran_order` and `shape`, then the raw element bytes.

use thiserror::Error;

use super::tabular::unique_columns;
use crate::storage::models::{Table, Value};

const MAGIC: &[u8] = b"\x93NUMPY";

#[derive(Debug, Error)]
pub enum NpyError {
    #[error("not an NPY file (bad magic)")]
    BadMagic,
    #[error("unsupported NPY version {0}.{1}")]
    UnsupportedVersion(u8, u8),
    #[error("file is truncated: {0}")]
    Truncated(&'static str),
    #[error("malformed header: {0}")]
    Header(String),
    #[error("unsupported dtype '{0}'")]
    UnsupportedDtype(String),
    #[error("array has no columns")]
    NoColumns,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool,
    Int { size: usize, big_endian: bool },
    UInt { size: usize, big_endian: bool },
    Float { size: usize, big_endian: bool },
    Bytes(usize),
    Unicode { chars: usize, big_endian: bool },
}

impl Scalar {
    fn size(&self) -> usize {
        match *self {
            Scalar::Bool => 1,
            Scalar::Int { size, .. } | Scalar::UInt { size, .. } | Scalar::Float { size, .. } => {
                size
            }
            Scalar::Bytes(n) => n,
            Scalar::Unicode { chars, .. } => chars.saturating_mul(4),
        }
    }

    fn parse(descr: &str) -> Result<Self, NpyError> {
        let unsupported = || NpyError::UnsupportedDtype(descr.to_string());

        let (big_endian, rest) = match descr.as_bytes().first() {
            Some(b'>') => (true, &descr[1..]),
            Some(b'<') | Some(b'|') => (false, &descr[1..]),
            Some(b'=') => (cfg!(target_endian = "big"), &descr[1..]),
            _ => (false, descr),
        };
        let mut chars = rest.chars();
        let kind = chars.next().ok_or_else(unsupported)?;
        if kind == 'O' {
            return Err(NpyError::UnsupportedDtype(
                "object arrays (pickled) are not supported".to_string(),
            ));
        }
        let size: usize = chars.as_str().parse().map_err(|_| unsupported())?;

        let scalar = match (kind, size) {
            ('b', 1) => Scalar::Bool,
            ('i', 1 | 2 | 4 | 8) => Scalar::Int { size, big_endian },
            ('u', 1 | 2 | 4 | 8) => Scalar::UInt { size, big_endian },
            ('f', 4 | 8) => Scalar::Float { size, big_endian },
            ('S' | 'a' | 'U', 0) => {
                return Err(NpyError::UnsupportedDtype(format!(
                    "zero-width dtype '{descr}'"
                )))
            }
            ('S' | 'a', n) => Scalar::Bytes(n),
            ('U', n) if n.checked_mul(4).is_some() => Scalar::Unicode {
                chars: n,
                big_endian,
            },
            _ => return Err(unsupported()),
        };
        Ok(scalar)
    }

    fn read(&self, bytes: &[u8]) -> Value {
        match *self {
            Scalar::Bool => Value::Integer(i64::from(bytes[0] != 0)),
            Scalar::Int { size, big_endian } => {
                let raw = read_uint(bytes, size, big_endian);
                // Sign-extend from `size` bytes
                let shift = 64 - size * 8;
                Value::Integer(((raw << shift) as i64) >> shift)
            }
            Scalar::UInt { size, big_endian } => {
                let raw = read_uint(bytes, size, big_endian);
                match i64::try_from(raw) {
                    Ok(v) => Value::Integer(v),
                    Err(_) => Value::Real(raw as f64),
                }
            }
            Scalar::Float { size, big_endian } => {
                let raw = read_uint(bytes, size, big_endian);
                let f = if size == 4 {
                    f64::from(f32::from_bits(raw as u32))
                } else {
                    f64::from_bits(raw)
                };
                if f.is_nan() {
                    Value::Null
                } else {
                    Value::Real(f)
                }
            }
            Scalar::Bytes(n) => {
                let slice = &bytes[..n];
                let end = slice.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
                Value::Text(String::from_utf8_lossy(&slice[..end]).into_owned())
            }
            Scalar::Unicode { chars, big_endian } => {
                let text: String = (0..chars)
                    .map(|i| read_uint(&bytes[i * 4..], 4, big_endian) as u32)
                    .take_while(|&cp| cp != 0)
                    .map(|cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect();
                Value::Text(text)
            }
        }
    }
}

fn read_uint(bytes: &[u8], size: usize, big_endian: bool) -> u64 {
    let slice = &bytes[..size];
    let fold = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
    if big_endian {
        slice.iter().fold(0, fold)
    } else {
        slice.iter().rev().fold(0, fold)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub scalar: Scalar,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dtype {
    Plain(Scalar),
    /// Structured record; `stride` includes unnamed padding fields.
    Record { fields: Vec<Field>, stride: usize },
}

impl Dtype {
    fn item_size(&self) -> usize {
        match self {
            Dtype::Plain(s) => s.size(),
            Dtype::Record { stride, .. } => *stride,
        }
    }
}

#[derive(Debug)]
pub struct NpyArray<'a> {
    pub dtype: Dtype,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
    len: usize,
    data: &'a [u8],
}

/// Decode the header and borrow the element bytes.
pub fn decode(bytes: &[u8]) -> Result<NpyArray<'_>, NpyError> {
    let rest = bytes.strip_prefix(MAGIC).ok_or(NpyError::BadMagic)?;
    let (&major, rest) = rest.split_first().ok_or(NpyError::Truncated("version"))?;
    let (&minor, rest) = rest.split_first().ok_or(NpyError::Truncated("version"))?;

    let (header_len, rest) = match major {
        1 => {
            if rest.len() < 2 {
                return Err(NpyError::Truncated("header length"));
            }
            (u16::from_le_bytes([rest[0], rest[1]]) as usize, &rest[2..])
        }
        2 | 3 => {
            if rest.len() < 4 {
                return Err(NpyError::Truncated("header length"));
            }
            (
                u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize,
                &rest[4..],
            )
        }
        _ => return Err(NpyError::UnsupportedVersion(major, minor)),
    };
    if rest.len() < header_len {
        return Err(NpyError::Truncated("header"));
    }
    let (header, data) = rest.split_at(header_len);
    let header = std::str::from_utf8(header).map_err(|e| NpyError::Header(e.to_string()))?;

    let Literal::Dict(entries) = LiteralParser::new(header).parse()? else {
        return Err(NpyError::Header("header is not a dict".to_string()));
    };

    let mut descr = None;
    let mut fortran_order = false;
    let mut shape = None;
    for (key, value) in entries {
        match (key.as_str(), value) {
            (Some("descr"), v) => descr = Some(parse_descr(&v)?),
            (Some("fortran_order"), Literal::Bool(b)) => fortran_order = b,
            (Some("shape"), Literal::Seq(dims)) => {
                let dims = dims
                    .iter()
                    .map(|d| match d {
                        Literal::Int(n) if *n >= 0 => Ok(*n as usize),
                        _ => Err(NpyError::Header("shape must hold non-negative ints".to_string())),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                shape = Some(dims);
            }
            _ => {}
        }
    }

    let dtype = descr.ok_or_else(|| NpyError::Header("missing 'descr'".to_string()))?;
    let shape = shape.ok_or_else(|| NpyError::Header("missing 'shape'".to_string()))?;

    // A nonzero item size ties the element count to the bytes actually present
    let item_size = dtype.item_size();
    if item_size == 0 {
        return Err(NpyError::UnsupportedDtype("zero-width dtype".to_string()));
    }
    let len = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| NpyError::Header("shape overflows".to_string()))?;
    let needed = len
        .checked_mul(item_size)
        .ok_or_else(|| NpyError::Header("array size overflows".to_string()))?;
    if data.len() < needed {
        return Err(NpyError::Truncated("array data"));
    }

    Ok(NpyArray {
        dtype,
        fortran_order,
        shape,
        len,
        data: &data[..needed],
    })
}

fn parse_descr(value: &Literal) -> Result<Dtype, NpyError> {
    match value {
        Literal::Str(s) => Ok(Dtype::Plain(Scalar::parse(s)?)),
        Literal::Seq(items) => {
            let mut fields = Vec::with_capacity(items.len());
            let mut offset = 0;
            for item in items {
                let (name, ty) = match item {
                    Literal::Seq(parts) if parts.len() == 2 => (&parts[0], &parts[1]),
                    _ => {
                        return Err(NpyError::UnsupportedDtype(
                            "sub-array record fields".to_string(),
                        ))
                    }
                };
                let (Literal::Str(name), Literal::Str(ty)) = (name, ty) else {
                    return Err(NpyError::UnsupportedDtype(
                        "record field must be (name, type)".to_string(),
                    ));
                };
                let scalar = Scalar::parse(ty)?;
                // Unnamed fields are alignment padding
                if !name.is_empty() {
                    fields.push(Field {
                        name: name.clone(),
                        scalar,
                        offset,
                    });
                }
                offset = offset
                    .checked_add(scalar.size())
                    .ok_or_else(|| NpyError::Header("record size overflows".to_string()))?;
            }
            if fields.is_empty() {
                return Err(NpyError::NoColumns);
            }
            if offset == 0 {
                return Err(NpyError::UnsupportedDtype("zero-width record".to_string()));
            }
            Ok(Dtype::Record {
                fields,
                stride: offset,
            })
        }
        _ => Err(NpyError::Header("'descr' must be a string or list".to_string())),
    }
}

impl NpyArray<'_> {
    /// Project the array into rows and columns.
    ///
    /// Records become one row each with their field names as columns, 2-D
    /// arrays keep their shape with positional column names, and any other
    /// shape is flattened into a single column `0`.
    pub fn into_table(self) -> Result<Table, NpyError> {
        match &self.dtype {
            Dtype::Record { fields, stride } => {
                let stride = *stride;
                let columns = unique_columns(fields.iter().map(|f| f.name.as_str()));
                let rows = (0..self.len)
                    .map(|i| {
                        let record = &self.data[i * stride..(i + 1) * stride];
                        fields
                            .iter()
                            .map(|f| f.scalar.read(&record[f.offset..]))
                            .collect()
                    })
                    .collect();
                Ok(Table { columns, rows })
            }
            Dtype::Plain(scalar) if self.shape.len() == 2 => {
                let (n_rows, n_cols) = (self.shape[0], self.shape[1]);
                if n_cols == 0 {
                    return Err(NpyError::NoColumns);
                }
                let size = scalar.size();
                let rows = (0..n_rows)
                    .map(|r| {
                        (0..n_cols)
                            .map(|c| {
                                let index = if self.fortran_order {
                                    c * n_rows + r
                                } else {
                                    r * n_cols + c
                                };
                                scalar.read(&self.data[index * size..])
                            })
                            .collect()
                    })
                    .collect();
                Ok(Table {
                    columns: (0..n_cols).map(|c| c.to_string()).collect(),
                    rows,
                })
            }
            Dtype::Plain(scalar) => {
                let size = scalar.size();
                let rows = (0..self.len)
                    .map(|i| vec![scalar.read(&self.data[i * size..])])
                    .collect();
                Ok(Table {
                    columns: vec!["0".to_string()],
                    rows,
                })
            }
        }
    }
}

// ============================================================================
// Header literal parsing
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    /// Tuples and lists alike
    Seq(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Recursive-descent parser for the subset of Python literals NPY headers use.
struct LiteralParser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Literal, NpyError> {
        let value = self.value()?;
        self.skip_ws();
        if self.pos != self.input.len() {
            return Err(self.error("trailing characters"));
        }
        Ok(value)
    }

    fn error(&self, what: &str) -> NpyError {
        NpyError::Header(format!("{what} at offset {}", self.pos))
    }

    fn skip_ws(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.input.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<(), NpyError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    fn value(&mut self) -> Result<Literal, NpyError> {
        match self.peek() {
            Some(b'{') => self.dict(),
            Some(b'(') => self.seq(b')'),
            Some(b'[') => self.seq(b']'),
            Some(q @ (b'\'' | b'"')) => self.string(q),
            Some(c) if c == b'-' || c.is_ascii_digit() => self.int(),
            Some(c) if c.is_ascii_alphabetic() => self.word(),
            _ => Err(self.error("unexpected input")),
        }
    }

    fn dict(&mut self) -> Result<Literal, NpyError> {
        self.expect(b'{')?;
        let mut entries = Vec::new();
        loop {
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Literal::Dict(entries));
            }
            let key = self.value()?;
            self.expect(b':')?;
            let value = self.value()?;
            entries.push((key, value));
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn seq(&mut self, close: u8) -> Result<Literal, NpyError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Literal::Seq(items));
            }
            items.push(self.value()?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(c) if c == close => {}
                _ => return Err(self.error("expected ',' or closing bracket")),
            }
        }
    }

    fn string(&mut self, quote: u8) -> Result<Literal, NpyError> {
        self.pos += 1;
        let mut out = Vec::new();
        while let Some(&b) = self.input.get(self.pos) {
            self.pos += 1;
            match b {
                b'\\' => {
                    let escaped = *self
                        .input
                        .get(self.pos)
                        .ok_or_else(|| self.error("unterminated escape"))?;
                    self.pos += 1;
                    out.push(escaped);
                }
                b if b == quote => {
                    return String::from_utf8(out)
                        .map(Literal::Str)
                        .map_err(|e| NpyError::Header(e.to_string()));
                }
                b => out.push(b),
            }
        }
        Err(self.error("unterminated string"))
    }

    fn int(&mut self) -> Result<Literal, NpyError> {
        let start = self.pos;
        if self.input[self.pos] == b'-' {
            self.pos += 1;
        }
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|e| NpyError::Header(e.to_string()))?;
        let n = text.parse().map_err(|_| self.error("bad integer"))?;
        // Python 2 long suffix
        if matches!(self.input.get(self.pos), Some(b'L')) {
            self.pos += 1;
        }
        Ok(Literal::Int(n))
    }

    fn word(&mut self) -> Result<Literal, NpyError> {
        let start = self.pos;
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_alphanumeric() {
            self.pos += 1;
        }
        match &self.input[start..self.pos] {
            b"True" => Ok(Literal::Bool(true)),
            b"False" => Ok(Literal::Bool(false)),
            b"None" => Ok(Literal::None),
            _ => Err(self.error("unknown identifier")),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Assemble a version 1.0 file around a header dict and raw data.
    pub(crate) fn npy_bytes(header: &str, data: &[u8]) -> Vec<u8> {
        let mut dict = header.to_string();
        // Pad so that magic + version + len + header is a multiple of 64
        let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
        dict.push_str(&" ".repeat((64 - unpadded % 64) % 64));
        dict.push('\n');

        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        out.extend_from_slice(dict.as_bytes());
        out.extend_from_slice(data);
        out
    }

    fn f8(values: &[f64]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_two_dimensional_float_array() {
        let bytes = npy_bytes(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (2, 3), }",
            &f8(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        );
        let table = decode(&bytes).unwrap().into_table().unwrap();
        assert_eq!(table.columns, vec!["0", "1", "2"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], Value::Real(4.0));
        assert_eq!(table.rows[0][2], Value::Real(3.0));
    }

    #[test]
    fn test_fortran_order_transposes_storage() {
        // Column-major storage of [[1, 2], [3, 4]]
        let data: Vec<u8> = [1i32, 3, 2, 4].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = npy_bytes(
            "{'descr': '<i4', 'fortran_order': True, 'shape': (2, 2), }",
            &data,
        );
        let table = decode(&bytes).unwrap().into_table().unwrap();
        assert_eq!(table.rows[0], vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(table.rows[1], vec![Value::Integer(3), Value::Integer(4)]);
    }

    #[test]
    fn test_one_dimensional_array_is_single_column() {
        let data: Vec<u8> = [-1i16, 7].iter().flat_map(|v| v.to_be_bytes()).collect();
        let bytes = npy_bytes("{'descr': '>i2', 'fortran_order': False, 'shape': (2,), }", &data);
        let table = decode(&bytes).unwrap().into_table().unwrap();
        assert_eq!(table.columns, vec!["0"]);
        assert_eq!(table.rows, vec![vec![Value::Integer(-1)], vec![Value::Integer(7)]]);
    }

    #[test]
    fn test_three_dimensional_array_flattens() {
        let bytes = npy_bytes(
            "{'descr': '|u1', 'fortran_order': False, 'shape': (2, 2, 2), }",
            &[0, 1, 2, 3, 4, 5, 6, 7],
        );
        let table = decode(&bytes).unwrap().into_table().unwrap();
        assert_eq!(table.columns, vec!["0"]);
        assert_eq!(table.rows.len(), 8);
        assert_eq!(table.rows[7][0], Value::Integer(7));
    }

    #[test]
    fn test_structured_records_use_field_names() {
        let mut data = Vec::new();
        for (name, gap) in [(b"Si\0\0", 1.12f64), (b"GaAs", 1.42)] {
            data.extend_from_slice(name);
            data.extend_from_slice(&gap.to_le_bytes());
        }
        let bytes = npy_bytes(
            "{'descr': [('material', '|S4'), ('bandgap', '<f8')], 'fortran_order': False, 'shape': (2,), }",
            &data,
        );
        let table = decode(&bytes).unwrap().into_table().unwrap();
        assert_eq!(table.columns, vec!["material", "bandgap"]);
        assert_eq!(table.rows[0][0], Value::Text("Si".to_string()));
        assert_eq!(table.rows[1][1], Value::Real(1.42));
    }

    #[test]
    fn test_unicode_and_bool() {
        let mut data = Vec::new();
        for c in "ab".chars() {
            data.extend_from_slice(&(c as u32).to_le_bytes());
        }
        data.extend_from_slice(&0u32.to_le_bytes());
        let bytes = npy_bytes("{'descr': '<U3', 'fortran_order': False, 'shape': (1,), }", &data);
        let table = decode(&bytes).unwrap().into_table().unwrap();
        assert_eq!(table.rows[0][0], Value::Text("ab".to_string()));

        let bytes = npy_bytes("{'descr': '|b1', 'fortran_order': False, 'shape': (2,), }", &[1, 0]);
        let table = decode(&bytes).unwrap().into_table().unwrap();
        assert_eq!(table.rows[0][0], Value::Integer(1));
        assert_eq!(table.rows[1][0], Value::Integer(0));
    }

    #[test]
    fn test_nan_becomes_null() {
        let bytes = npy_bytes(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (1,), }",
            &f8(&[f64::NAN]),
        );
        let table = decode(&bytes).unwrap().into_table().unwrap();
        assert_eq!(table.rows[0][0], Value::Null);
    }

    #[test]
    fn test_rejects_object_arrays() {
        let bytes = npy_bytes("{'descr': '|O', 'fortran_order': False, 'shape': (1,), }", &[0; 8]);
        assert!(matches!(decode(&bytes), Err(NpyError::UnsupportedDtype(_))));
    }

    #[test]
    fn test_rejects_oversized_unicode_width() {
        let bytes = npy_bytes(
            "{'descr': '<U4611686018427387904', 'fortran_order': False, 'shape': (1,), }",
            &[0; 16],
        );
        assert!(
            crate::ingest::tabular::parse_table(crate::ingest::tabular::DatasetFormat::Npy, &bytes)
                .is_err()
        );
        assert!(matches!(decode(&bytes), Err(NpyError::UnsupportedDtype(_))));
    }

    #[test]
    fn test_rejects_zero_width_dtypes() {
        for descr in ["'|S0'", "'<U0'", "[('a', '|S0'), ('b', '|S0')]"] {
            let header = format!(
                "{{'descr': {descr}, 'fortran_order': False, 'shape': (1000000000000000000,), }}"
            );
            let bytes = npy_bytes(&header, &[]);
            assert!(
                matches!(decode(&bytes), Err(NpyError::UnsupportedDtype(_))),
                "{descr} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_shape_overflow() {
        let bytes = npy_bytes(
            "{'descr': '|u1', 'fortran_order': False, 'shape': (4294967296, 4294967296, 16), }",
            &[0; 8],
        );
        assert!(matches!(decode(&bytes), Err(NpyError::Header(_))));

        // Fits in usize but far exceeds the data
        let bytes = npy_bytes(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (1000000000000000000,), }",
            &f8(&[1.0]),
        );
        assert!(matches!(decode(&bytes), Err(NpyError::Truncated(_))));
    }

    #[test]
    fn test_rejects_bad_magic_and_truncation() {
        assert!(matches!(decode(b"not numpy"), Err(NpyError::BadMagic)));

        let bytes = npy_bytes(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (4,), }",
            &f8(&[1.0]),
        );
        assert!(matches!(decode(&bytes), Err(NpyError::Truncated(_))));
    }

    #[test]
    fn test_header_literal_parser() {
        let parsed = LiteralParser::new("{'a': (1, -2,), \"b\": [True, None], 'c': 3L}")
            .parse()
            .unwrap();
        assert_eq!(
            parsed,
            Literal::Dict(vec![
                (
                    Literal::Str("a".into()),
                    Literal::Seq(vec![Literal::Int(1), Literal::Int(-2)])
                ),
                (
                    Literal::Str("b".into()),
                    Literal::Seq(vec![Literal::Bool(true), Literal::None])
                ),
                (Literal::Str("c".into()), Literal::Int(3)),
            ])
        );
    }
}
