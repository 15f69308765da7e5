//! Field decoder.
//!
//! Reads one fixed-width integer out of a report buffer. The numeric type tag
//! fixes the width, byte order and signedness; nothing else is inferred.
//!
//! Decoded values are returned as `i128`, which holds every tag losslessly
//! (including the full `u64` and `i64` ranges), so callers can compare values
//! without narrowing.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width, byte order and signedness of a packed report field.
///
/// Serialized with the short names (`u8`, `i16le`, ...). The long forms used
/// by older definition files (`uint8`, `int16le`, ...) are accepted on input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericType {
    #[serde(rename = "u8", alias = "uint8")]
    U8,
    #[serde(rename = "i8", alias = "int8")]
    I8,
    #[serde(rename = "u16le", alias = "uint16le")]
    U16Le,
    #[serde(rename = "i16le", alias = "int16le")]
    I16Le,
    #[serde(rename = "u16be", alias = "uint16be")]
    U16Be,
    #[serde(rename = "i16be", alias = "int16be")]
    I16Be,
    #[serde(rename = "u32le", alias = "uint32le")]
    U32Le,
    #[serde(rename = "i32le", alias = "int32le")]
    I32Le,
    #[serde(rename = "u32be", alias = "uint32be")]
    U32Be,
    #[serde(rename = "i32be", alias = "int32be")]
    I32Be,
    #[serde(rename = "u64le", alias = "uint64le")]
    U64Le,
    #[serde(rename = "i64le", alias = "int64le")]
    I64Le,
    #[serde(rename = "u64be", alias = "uint64be")]
    U64Be,
    #[serde(rename = "i64be", alias = "int64be")]
    I64Be,
}

impl NumericType {
    pub const ALL: [NumericType; 14] = [
        NumericType::U8,
        NumericType::I8,
        NumericType::U16Le,
        NumericType::I16Le,
        NumericType::U16Be,
        NumericType::I16Be,
        NumericType::U32Le,
        NumericType::I32Le,
        NumericType::U32Be,
        NumericType::I32Be,
        NumericType::U64Le,
        NumericType::I64Le,
        NumericType::U64Be,
        NumericType::I64Be,
    ];

    /// Number of bytes read for this type.
    pub const fn width(self) -> usize {
        match self {
            NumericType::U8 | NumericType::I8 => 1,
            NumericType::U16Le | NumericType::I16Le | NumericType::U16Be | NumericType::I16Be => 2,
            NumericType::U32Le | NumericType::I32Le | NumericType::U32Be | NumericType::I32Be => 4,
            NumericType::U64Le | NumericType::I64Le | NumericType::U64Be | NumericType::I64Be => 8,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            NumericType::I8
                | NumericType::I16Le
                | NumericType::I16Be
                | NumericType::I32Le
                | NumericType::I32Be
                | NumericType::I64Le
                | NumericType::I64Be
        )
    }

    /// Short tag name, e.g. `"i16le"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            NumericType::U8 => "u8",
            NumericType::I8 => "i8",
            NumericType::U16Le => "u16le",
            NumericType::I16Le => "i16le",
            NumericType::U16Be => "u16be",
            NumericType::I16Be => "i16be",
            NumericType::U32Le => "u32le",
            NumericType::I32Le => "i32le",
            NumericType::U32Be => "u32be",
            NumericType::I32Be => "i32be",
            NumericType::U64Le => "u64le",
            NumericType::I64Le => "i64le",
            NumericType::U64Be => "u64be",
            NumericType::I64Be => "i64be",
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumericType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // "uint16le" -> "u16le", "int8" -> "i8"
        let short = if let Some(rest) = s.strip_prefix("uint") {
            format!("u{rest}")
        } else if let Some(rest) = s.strip_prefix("int") {
            format!("i{rest}")
        } else {
            s.to_string()
        };
        NumericType::ALL
            .into_iter()
            .find(|t| t.as_str() == short)
            .ok_or_else(|| Error::UnknownType(s.to_string()))
    }
}

/// Copy exactly `N` bytes starting at `offset`.
#[inline]
fn take<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    let out_of_range = || Error::OutOfRange {
        offset,
        width: N,
        len: buf.len(),
    };
    let end = offset.checked_add(N).ok_or_else(out_of_range)?;
    let bytes = buf.get(offset..end).ok_or_else(out_of_range)?;
    bytes.try_into().map_err(|_| out_of_range())
}

/// Decode the field of type `ty` located at `offset` in `buf`.
///
/// Fails with [`Error::OutOfRange`] if `offset + ty.width() > buf.len()`.
pub fn decode(buf: &[u8], offset: usize, ty: NumericType) -> Result<i128> {
    let value = match ty {
        NumericType::U8 => i128::from(u8::from_le_bytes(take(buf, offset)?)),
        NumericType::I8 => i128::from(i8::from_le_bytes(take(buf, offset)?)),
        NumericType::U16Le => i128::from(u16::from_le_bytes(take(buf, offset)?)),
        NumericType::I16Le => i128::from(i16::from_le_bytes(take(buf, offset)?)),
        NumericType::U16Be => i128::from(u16::from_be_bytes(take(buf, offset)?)),
        NumericType::I16Be => i128::from(i16::from_be_bytes(take(buf, offset)?)),
        NumericType::U32Le => i128::from(u32::from_le_bytes(take(buf, offset)?)),
        NumericType::I32Le => i128::from(i32::from_le_bytes(take(buf, offset)?)),
        NumericType::U32Be => i128::from(u32::from_be_bytes(take(buf, offset)?)),
        NumericType::I32Be => i128::from(i32::from_be_bytes(take(buf, offset)?)),
        NumericType::U64Le => i128::from(u64::from_le_bytes(take(buf, offset)?)),
        NumericType::I64Le => i128::from(i64::from_le_bytes(take(buf, offset)?)),
        NumericType::U64Be => i128::from(u64::from_be_bytes(take(buf, offset)?)),
        NumericType::I64Be => i128::from(i64::from_be_bytes(take(buf, offset)?)),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn eight_bit_signedness() {
        let buf = [0xFE];
        assert_eq!(decode(&buf, 0, NumericType::U8).unwrap(), 0xFE);
        assert_eq!(decode(&buf, 0, NumericType::I8).unwrap(), -2);
    }

    #[test]
    fn byte_order_follows_tag() {
        let buf = [0x00, 0x10, 0x00];
        assert_eq!(decode(&buf, 1, NumericType::U16Le).unwrap(), 0x0010);
        assert_eq!(decode(&buf, 0, NumericType::U16Be).unwrap(), 0x0010);
        assert_eq!(decode(&[0xFF, 0x7F], 0, NumericType::I16Le).unwrap(), i128::from(i16::MAX));
        assert_eq!(decode(&[0xFF, 0xFE], 0, NumericType::I16Be).unwrap(), -2);
    }

    #[test]
    fn thirty_two_bit_values() {
        let buf = [0x78, 0x56, 0x34, 0x12];
        assert_eq!(decode(&buf, 0, NumericType::U32Le).unwrap(), 0x1234_5678);
        assert_eq!(decode(&buf, 0, NumericType::U32Be).unwrap(), 0x7856_3412);
        assert_eq!(decode(&[0xFF; 4], 0, NumericType::I32Be).unwrap(), -1);
        assert_eq!(decode(&[0xFF; 4], 0, NumericType::I32Le).unwrap(), -1);
    }

    #[test]
    fn sixty_four_bit_values_are_not_narrowed() {
        let buf = [0xFF; 8];
        assert_eq!(decode(&buf, 0, NumericType::U64Le).unwrap(), i128::from(u64::MAX));
        assert_eq!(decode(&buf, 0, NumericType::U64Be).unwrap(), i128::from(u64::MAX));
        assert_eq!(decode(&buf, 0, NumericType::I64Le).unwrap(), -1);

        let mut be = [0u8; 8];
        be[0] = 0x80;
        assert_eq!(decode(&be, 0, NumericType::I64Be).unwrap(), i128::from(i64::MIN));
    }

    #[test]
    fn out_of_range_reports_bounds() {
        let err = decode(&[0x00, 0x01], 1, NumericType::U16Le).unwrap_err();
        match err {
            Error::OutOfRange { offset, width, len } => {
                assert_eq!((offset, width, len), (1, 2, 2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(decode(&[], 0, NumericType::U8).is_err());
        assert!(decode(&[0; 4], usize::MAX, NumericType::U8).is_err());
    }

    #[test]
    fn tags_parse_short_and_long_forms() {
        assert_eq!("u8".parse::<NumericType>().unwrap(), NumericType::U8);
        assert_eq!("uint16le".parse::<NumericType>().unwrap(), NumericType::U16Le);
        assert_eq!("int64be".parse::<NumericType>().unwrap(), NumericType::I64Be);
        assert!("float32".parse::<NumericType>().is_err());
        for ty in NumericType::ALL {
            assert_eq!(ty.to_string().parse::<NumericType>().unwrap(), ty);
        }
    }

    proptest! {
        #[test]
        fn decode_succeeds_exactly_within_bounds(
            len in 0usize..24,
            offset in 0usize..24,
            idx in 0usize..NumericType::ALL.len(),
        ) {
            let ty = NumericType::ALL[idx];
            let buf = vec![0xA5u8; len];
            let ok = decode(&buf, offset, ty).is_ok();
            prop_assert_eq!(ok, offset + ty.width() <= len);
        }

        #[test]
        fn unsigned_values_are_never_negative(bytes in proptest::collection::vec(any::<u8>(), 8)) {
            for ty in NumericType::ALL.into_iter().filter(|t| !t.is_signed()) {
                prop_assert!(decode(&bytes, 0, ty).unwrap() >= 0);
            }
        }
    }
}
