// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Conversion of field values into caller-owned output buffers.
//!
//! | Target | Accepts | Written |
//! |--------|---------|---------|
//! | `Char` | any non-null | UTF-8, NUL-terminated, truncated at a char boundary |
//! | `WChar` | any non-null | UTF-16 (native endian), NUL-terminated, never splits a surrogate pair |
//! | `SLong` | booleans | 32-bit 1/0 |
//! | `SBigInt` | integers | 64-bit integer |
//! | `Double` | integers, floats | 64-bit float |
//!
//! Text targets report the full untruncated byte length (excluding the
//! terminator). Fixed-width targets are written whole or not at all; a value
//! the target cannot represent yields [`Indicator::Null`], as does a null
//! value for every target.

use crate::error::{Error, Result};
use crate::types::FieldValue;

/// Length/indicator value reported for null data.
pub const NULL_DATA: isize = -1;

/// Requested C encoding of an output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CDataType {
    Char,
    WChar,
    SLong,
    SBigInt,
    Double,
}

impl CDataType {
    pub fn code(self) -> i16 {
        match self {
            CDataType::Char => 1,      // SQL_C_CHAR
            CDataType::WChar => -8,    // SQL_C_WCHAR
            CDataType::SLong => -16,   // SQL_C_SLONG
            CDataType::SBigInt => -25, // SQL_C_SBIGINT
            CDataType::Double => 8,    // SQL_C_DOUBLE
        }
    }

    /// Size in bytes of a fixed-width target; `None` for text targets.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            CDataType::Char | CDataType::WChar => None,
            CDataType::SLong => Some(4),
            CDataType::SBigInt | CDataType::Double => Some(8),
        }
    }
}

impl TryFrom<i16> for CDataType {
    type Error = Error;

    fn try_from(code: i16) -> Result<Self> {
        match code {
            1 => Ok(CDataType::Char),
            -8 => Ok(CDataType::WChar),
            -16 => Ok(CDataType::SLong),
            -25 => Ok(CDataType::SBigInt),
            8 => Ok(CDataType::Double),
            other => Err(Error::invalid_argument()
                .sqlstate("HY003")
                .message(format!("Unsupported target type: {}", other))),
        }
    }
}

/// Outcome of marshaling one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Nothing written; the value is null or not representable.
    Null,
    /// Full length in bytes of the converted value.
    Length(usize),
}

impl Indicator {
    /// Value for a length/indicator output (`-1` for null).
    pub fn as_sqllen(self) -> isize {
        match self {
            Indicator::Null => NULL_DATA,
            Indicator::Length(n) => n as isize,
        }
    }

    /// Whether a text conversion into `buffer_len` bytes lost data.
    pub fn is_truncated(self, target: CDataType, buffer_len: usize) -> bool {
        match (self, target) {
            (Indicator::Length(n), CDataType::Char) => n + 1 > buffer_len,
            (Indicator::Length(n), CDataType::WChar) => n + 2 > buffer_len,
            _ => false,
        }
    }
}

/// Writes `value` into `buf` using the `target` encoding.
pub fn marshal(value: &FieldValue, target: CDataType, buf: &mut [u8]) -> Result<Indicator> {
    if value.is_null() {
        return Ok(Indicator::Null);
    }

    match target {
        CDataType::Char => match value.as_text() {
            Some(text) => Ok(write_narrow(&text, buf)),
            None => Ok(Indicator::Null),
        },
        CDataType::WChar => match value.as_text() {
            Some(text) => Ok(write_wide(&text, buf)),
            None => Ok(Indicator::Null),
        },
        CDataType::SLong => match value {
            FieldValue::Bool(b) => write_fixed(&i32::from(*b).to_ne_bytes(), buf),
            _ => Ok(Indicator::Null),
        },
        CDataType::SBigInt => match value {
            FieldValue::Int(i) => write_fixed(&i.to_ne_bytes(), buf),
            _ => Ok(Indicator::Null),
        },
        CDataType::Double => match value {
            FieldValue::Int(i) => write_fixed(&(*i as f64).to_ne_bytes(), buf),
            FieldValue::Float(f) => write_fixed(&f.to_ne_bytes(), buf),
            _ => Ok(Indicator::Null),
        },
    }
}

fn write_fixed(bytes: &[u8], buf: &mut [u8]) -> Result<Indicator> {
    let buf_len = buf.len();
    let dst = buf.get_mut(..bytes.len()).ok_or_else(|| {
        Error::invalid_argument().sqlstate("HY090").message(format!(
            "Buffer of {} bytes cannot hold a {} byte value",
            buf_len,
            bytes.len()
        ))
    })?;
    dst.copy_from_slice(bytes);
    Ok(Indicator::Length(bytes.len()))
}

/// Copies `text` as NUL-terminated UTF-8, truncating at a char boundary.
pub(crate) fn write_narrow(text: &str, buf: &mut [u8]) -> Indicator {
    if let Some(room) = buf.len().checked_sub(1) {
        let mut end = room.min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        buf[..end].copy_from_slice(&text.as_bytes()[..end]);
        buf[end] = 0;
    }
    Indicator::Length(text.len())
}

fn write_wide(text: &str, buf: &mut [u8]) -> Indicator {
    let units: Vec<u16> = text.encode_utf16().collect();
    if let Some(room) = (buf.len() / 2).checked_sub(1) {
        let mut end = room.min(units.len());
        if end < units.len() && end > 0 && is_high_surrogate(units[end - 1]) {
            end -= 1;
        }
        for (i, unit) in units[..end].iter().chain(std::iter::once(&0u16)).enumerate() {
            buf[i * 2..i * 2 + 2].copy_from_slice(&unit.to_ne_bytes());
        }
    }
    Indicator::Length(units.len() * 2)
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TARGETS: [CDataType; 5] = [
        CDataType::Char,
        CDataType::WChar,
        CDataType::SLong,
        CDataType::SBigInt,
        CDataType::Double,
    ];

    fn wide(buf: &[u8]) -> Vec<u16> {
        buf.chunks_exact(2)
            .map(|c| u16::from_ne_bytes([c[0], c[1]]))
            .collect()
    }

    #[test]
    fn test_null_is_null_for_every_target() {
        for target in ALL_TARGETS {
            let mut buf = [0xAAu8; 16];
            let ind = marshal(&FieldValue::Null, target, &mut buf).unwrap();
            assert_eq!(ind, Indicator::Null);
            assert_eq!(ind.as_sqllen(), -1);
            assert_eq!(buf, [0xAAu8; 16]);
        }
    }

    #[test]
    fn test_char_fits() {
        let mut buf = [0xFFu8; 8];
        let ind = marshal(&FieldValue::from("R-001"), CDataType::Char, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(5));
        assert_eq!(&buf[..6], b"R-001\0");
        assert!(!ind.is_truncated(CDataType::Char, buf.len()));
    }

    #[test]
    fn test_char_truncates_at_char_boundary() {
        // One byte of room cannot hold the two-byte Ω.
        let mut buf = [0xFFu8; 2];
        let ind = marshal(&FieldValue::from("Ωm"), CDataType::Char, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(3));
        assert_eq!(buf, [0, 0xFF]);
        assert!(ind.is_truncated(CDataType::Char, buf.len()));
    }

    #[test]
    fn test_char_renders_numbers_and_bools() {
        let mut buf = [0u8; 32];
        let ind = marshal(&FieldValue::Int(42), CDataType::Char, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(2));
        assert_eq!(&buf[..3], b"42\0");

        let ind = marshal(&FieldValue::Float(0.25), CDataType::Char, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(4));
        assert_eq!(&buf[..5], b"0.25\0");

        let ind = marshal(&FieldValue::Bool(true), CDataType::Char, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(1));
        assert_eq!(&buf[..2], b"1\0");
    }

    #[test]
    fn test_char_empty_buffer_reports_length() {
        let ind = marshal(&FieldValue::from("abc"), CDataType::Char, &mut []).unwrap();
        assert_eq!(ind, Indicator::Length(3));
    }

    #[test]
    fn test_wchar_fits() {
        let mut buf = [0xFFu8; 12];
        let ind = marshal(&FieldValue::from("10kΩ"), CDataType::WChar, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(8));
        assert_eq!(wide(&buf[..10]), vec![0x31, 0x30, 0x6B, 0x3A9, 0]);
    }

    #[test]
    fn test_wchar_does_not_split_surrogate_pair() {
        // 'a' + U+1F600 = 3 UTF-16 units.
        let value = FieldValue::from("a\u{1F600}");
        // Room for two units plus terminator: the pair does not fit whole.
        let mut buf = [0xFFu8; 6];
        let ind = marshal(&value, CDataType::WChar, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(6));
        assert!(ind.is_truncated(CDataType::WChar, buf.len()));
        assert_eq!(wide(&buf), vec![0x61, 0, 0xFFFF]);
    }

    #[test]
    fn test_wchar_full_pair_when_room() {
        let value = FieldValue::from("a\u{1F600}");
        let mut buf = [0xFFu8; 8];
        let ind = marshal(&value, CDataType::WChar, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(6));
        assert!(!ind.is_truncated(CDataType::WChar, buf.len()));
        assert_eq!(wide(&buf), vec![0x61, 0xD83D, 0xDE00, 0]);
    }

    #[test]
    fn test_slong_accepts_booleans_only() {
        let mut buf = [0u8; 4];
        let ind = marshal(&FieldValue::Bool(true), CDataType::SLong, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(4));
        assert_eq!(i32::from_ne_bytes(buf), 1);

        let ind = marshal(&FieldValue::Bool(false), CDataType::SLong, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(4));
        assert_eq!(i32::from_ne_bytes(buf), 0);

        let ind = marshal(&FieldValue::from("yes"), CDataType::SLong, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Null);
    }

    #[test]
    fn test_sbigint() {
        let mut buf = [0u8; 8];
        let ind = marshal(&FieldValue::Int(-12), CDataType::SBigInt, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(8));
        assert_eq!(i64::from_ne_bytes(buf), -12);

        let ind = marshal(&FieldValue::Float(1.5), CDataType::SBigInt, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Null);
    }

    #[test]
    fn test_double_from_int_and_float() {
        let mut buf = [0u8; 8];
        marshal(&FieldValue::Int(3), CDataType::Double, &mut buf).unwrap();
        assert_eq!(f64::from_ne_bytes(buf), 3.0);

        let ind = marshal(&FieldValue::Float(4.7), CDataType::Double, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Length(8));
        assert_eq!(f64::from_ne_bytes(buf), 4.7);

        let ind = marshal(&FieldValue::Bool(true), CDataType::Double, &mut buf).unwrap();
        assert_eq!(ind, Indicator::Null);
    }

    #[test]
    fn test_fixed_width_buffer_too_small() {
        let mut buf = [0u8; 4];
        let err = marshal(&FieldValue::Int(1), CDataType::SBigInt, &mut buf).unwrap_err();
        assert_eq!(err.sql_state(), "HY090");
        assert_eq!(err.text(), "Buffer of 4 bytes cannot hold a 8 byte value");
    }

    #[test]
    fn test_fixed_width_sizes() {
        assert_eq!(CDataType::SLong.fixed_width(), Some(4));
        assert_eq!(CDataType::SBigInt.fixed_width(), Some(8));
        assert_eq!(CDataType::Double.fixed_width(), Some(8));
        assert_eq!(CDataType::Char.fixed_width(), None);
        assert_eq!(CDataType::WChar.fixed_width(), None);
    }

    #[test]
    fn test_target_type_codes() {
        assert_eq!(CDataType::try_from(1).unwrap(), CDataType::Char);
        assert_eq!(CDataType::try_from(-8).unwrap(), CDataType::WChar);
        assert_eq!(CDataType::try_from(-25).unwrap(), CDataType::SBigInt);
        assert_eq!(CDataType::Double.code(), 8);
        let err = CDataType::try_from(93).unwrap_err();
        assert_eq!(err.sql_state(), "HY003");
    }
}
