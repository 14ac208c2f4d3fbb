use embedded_can::{ExtendedId, StandardId};
use heapless::Vec;

use crate::{FrameParseError, MAX_DATA_LENGTH, MAX_ENCODED_DATA_LENGTH};

/* Encoding */

pub fn to_hex_digit(value: u32) -> u8 {
    const HEX_LUT: &[u8] = "0123456789ABCDEF".as_bytes();

    HEX_LUT[(value & 0xF) as usize]
}

pub fn standard_id_to_hex(id: StandardId) -> [u8; 3] {
    let raw = id.as_raw() as u32;

    [
        to_hex_digit(raw >> 8),
        to_hex_digit(raw >> 4),
        to_hex_digit(raw),
    ]
}

pub fn extended_id_to_hex(id: ExtendedId) -> [u8; 8] {
    let raw = id.as_raw();

    [
        to_hex_digit(raw >> 28),
        to_hex_digit(raw >> 24),
        to_hex_digit(raw >> 20),
        to_hex_digit(raw >> 16),
        to_hex_digit(raw >> 12),
        to_hex_digit(raw >> 8),
        to_hex_digit(raw >> 4),
        to_hex_digit(raw),
    ]
}

/// Hex encodes at most [`MAX_DATA_LENGTH`] bytes, anything past that is
/// never emitted.
pub fn bytes_to_hex(data: &[u8]) -> Vec<u8, MAX_ENCODED_DATA_LENGTH> {
    data.iter()
        .take(MAX_DATA_LENGTH)
        .flat_map(|byte| [to_hex_digit((byte >> 4) as u32), to_hex_digit(*byte as u32)])
        .collect()
}

pub fn u8_to_hex(value: u8) -> [u8; 2] {
    [to_hex_digit((value >> 4) as u32), to_hex_digit(value as u32)]
}

/// Big-endian nibble order, as appended to received frames.
pub fn timestamp_to_hex(timestamp: u16) -> [u8; 4] {
    let raw = timestamp as u32;

    [
        to_hex_digit(raw >> 12),
        to_hex_digit(raw >> 8),
        to_hex_digit(raw >> 4),
        to_hex_digit(raw),
    ]
}

/* Decoding */

pub fn hex_digit_to_u8(byte: u8) -> Result<u8, FrameParseError> {
    Ok(match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        b'A'..=b'F' => byte - b'A' + 10,
        _ => return Err(FrameParseError::IllegalHexDigit(byte)),
    })
}

pub fn dec_digit_to_u8(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        _ => None,
    }
}

pub fn u8_from_hex_nibbles(hex_nibbles: &[u8; 2]) -> Result<u8, FrameParseError> {
    let msn = hex_digit_to_u8(hex_nibbles[0])?;
    let lsn = hex_digit_to_u8(hex_nibbles[1])?;

    Ok((msn << 4) | lsn)
}

fn u32_from_hex(hex_nibbles: &[u8]) -> Result<u32, FrameParseError> {
    let mut value = 0u32;

    for nibble in hex_nibbles.iter() {
        value <<= 4;
        value |= hex_digit_to_u8(*nibble)? as u32;
    }

    Ok(value)
}

pub fn standard_id_from_hex(hex_nibbles: &[u8; 3]) -> Result<StandardId, FrameParseError> {
    let value = u32_from_hex(hex_nibbles)? as u16;

    StandardId::new(value).ok_or(FrameParseError::StandardIdOutOfRange(value))
}

pub fn extended_id_from_hex(hex_nibbles: &[u8; 8]) -> Result<ExtendedId, FrameParseError> {
    let value = u32_from_hex(hex_nibbles)?;

    ExtendedId::new(value).ok_or(FrameParseError::ExtendedIdOutOfRange(value))
}

/// Decodes a single hex DLC digit, which must be in the range 0..=8.
pub fn dlc_from_hex(byte: u8) -> Result<usize, FrameParseError> {
    let dlc = hex_digit_to_u8(byte)?;

    if dlc as usize > MAX_DATA_LENGTH {
        return Err(FrameParseError::InvalidDataLengthCode(dlc));
    }

    Ok(dlc as usize)
}

pub fn timestamp_from_hex(hex_nibbles: &[u8; 4]) -> Result<u16, FrameParseError> {
    Ok(u32_from_hex(hex_nibbles)? as u16)
}

/// Unpacks `2 * expected_length` hex digits from the front of `hex_bytes`.
///
/// Digits past that are left to the caller.
pub fn unpack_data_bytes(
    hex_bytes: &[u8],
    expected_length: usize,
) -> Result<Vec<u8, MAX_DATA_LENGTH>, FrameParseError> {
    if hex_bytes.len() < expected_length * 2 {
        return Err(FrameParseError::MismatchedDataLength(
            expected_length as u8,
            hex_bytes.len() / 2,
        ));
    }

    let mut buf = Vec::new();

    for chunk in hex_bytes[..expected_length * 2].chunks_exact(2) {
        let byte = u8_from_hex_nibbles(&[chunk[0], chunk[1]])?;

        buf.push(byte)
            .map_err(|_| FrameParseError::InvalidDataLengthCode(expected_length as u8))?;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use embedded_can::{ExtendedId, StandardId};

    use super::*;

    #[test]
    fn hex_digits_accept_both_cases() {
        assert_eq!(hex_digit_to_u8(b'0'), Ok(0));
        assert_eq!(hex_digit_to_u8(b'a'), Ok(10));
        assert_eq!(hex_digit_to_u8(b'F'), Ok(15));
        assert_eq!(
            hex_digit_to_u8(b'g'),
            Err(FrameParseError::IllegalHexDigit(b'g'))
        );
        assert_eq!(
            hex_digit_to_u8(b' '),
            Err(FrameParseError::IllegalHexDigit(b' '))
        );
    }

    #[test]
    fn ids_encode_zero_padded_uppercase() {
        assert_eq!(
            &standard_id_to_hex(StandardId::new(0x0A).unwrap()),
            b"00A"
        );
        assert_eq!(&standard_id_to_hex(StandardId::MAX), b"7FF");
        assert_eq!(
            &extended_id_to_hex(ExtendedId::new(0xABCDE).unwrap()),
            b"000ABCDE"
        );
        assert_eq!(&extended_id_to_hex(ExtendedId::MAX), b"1FFFFFFF");
    }

    #[test]
    fn ids_decode_with_range_checks() {
        assert_eq!(
            standard_id_from_hex(b"7ff"),
            Ok(StandardId::new(0x7FF).unwrap())
        );
        assert_eq!(
            standard_id_from_hex(b"800"),
            Err(FrameParseError::StandardIdOutOfRange(0x800))
        );
        assert_eq!(
            extended_id_from_hex(b"20000000"),
            Err(FrameParseError::ExtendedIdOutOfRange(0x2000_0000))
        );
        assert_eq!(
            extended_id_from_hex(b"1234567X"),
            Err(FrameParseError::IllegalHexDigit(b'X'))
        );
    }

    #[test]
    fn dlc_range() {
        assert_eq!(dlc_from_hex(b'0'), Ok(0));
        assert_eq!(dlc_from_hex(b'8'), Ok(8));
        assert_eq!(
            dlc_from_hex(b'9'),
            Err(FrameParseError::InvalidDataLengthCode(9))
        );
        assert_eq!(
            dlc_from_hex(b'F'),
            Err(FrameParseError::InvalidDataLengthCode(15))
        );
    }

    #[test]
    fn data_bytes() {
        assert_eq!(&bytes_to_hex(&[0xAA, 0x0b, 0x00])[..], b"AA0B00");
        assert_eq!(
            &bytes_to_hex(&[1, 2, 3, 4, 5, 6, 7, 8, 9])[..],
            b"0102030405060708"
        );

        assert_eq!(&unpack_data_bytes(b"aabbcc", 3).unwrap()[..], &[0xAA, 0xBB, 0xCC]);
        assert_eq!(&unpack_data_bytes(b"aabbcc1234", 3).unwrap()[..], &[0xAA, 0xBB, 0xCC]);
        assert_eq!(
            unpack_data_bytes(b"aabb", 3),
            Err(FrameParseError::MismatchedDataLength(3, 2))
        );
        assert_eq!(
            unpack_data_bytes(b"aazz", 2),
            Err(FrameParseError::IllegalHexDigit(b'z'))
        );
    }

    #[test]
    fn timestamps() {
        assert_eq!(&timestamp_to_hex(0x12AB), b"12AB");
        assert_eq!(&timestamp_to_hex(0x0001), b"0001");
        assert_eq!(timestamp_from_hex(b"ffff"), Ok(0xFFFF));
    }
}
