use embedded_can::Id;
use heapless::Vec;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
    codec::{
        bytes_to_hex, dlc_from_hex, extended_id_from_hex, extended_id_to_hex,
        standard_id_from_hex, standard_id_to_hex, to_hex_digit, unpack_data_bytes,
    },
    MAX_DATA_LENGTH, MAX_FRAME_LINE_SIZE,
};

/// Represents a classic CAN 2.0 frame which supports RTR (Remote Transmission
/// Request).
///
/// The DLC can be up to 8 bytes, and the data if absent means that it is an
/// RTR frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanFrame {
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    id: Id,
    dlc: usize,
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    data: Option<Vec<u8, MAX_DATA_LENGTH>>,
}

impl CanFrame {
    /// Creates a new data frame. `data` must have a length in the range 0..=8
    /// or else `None` will be returned instead.
    pub fn new_data(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        let data = Vec::from_slice(data).ok()?;

        Some(Self {
            id: id.into(),
            dlc: data.len(),
            data: Some(data),
        })
    }

    /// Creates a new remote frame. `dlc` must be in the range 0..=8 or else
    /// `None` will be returned instead.
    pub fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_DATA_LENGTH {
            return None;
        }

        Some(Self {
            id: id.into(),
            dlc,
            data: None,
        })
    }

    /// Gets the message ID of the frame
    pub fn id(&self) -> Id {
        self.id
    }

    /// Gets the DLC (Data Length Code) of the frame
    pub fn dlc(&self) -> usize {
        self.dlc
    }

    /// Gets the payload of the frame. Remote frames have an empty payload.
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    pub fn is_remote(&self) -> bool {
        self.data.is_none()
    }

    pub fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    pub fn kind(&self) -> FrameKind {
        match (self.id, self.is_remote()) {
            (Id::Standard(_), false) => FrameKind::StandardData,
            (Id::Extended(_), false) => FrameKind::ExtendedData,
            (Id::Standard(_), true) => FrameKind::StandardRemote,
            (Id::Extended(_), true) => FrameKind::ExtendedRemote,
        }
    }
}

impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        Self::new_data(id, data)
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        CanFrame::new_remote(id, dlc)
    }

    fn is_extended(&self) -> bool {
        CanFrame::is_extended(self)
    }

    fn is_remote_frame(&self) -> bool {
        self.is_remote()
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.dlc
    }

    fn data(&self) -> &[u8] {
        CanFrame::data(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameParseError {
    #[error("Tried to decode frame kind but it was invalid ({0:?})")]
    InvalidFrameKind(u8),
    #[error("Received a frame line ({0:?} bytes) that is too short for its id and DLC")]
    NotEnoughBytes(usize),
    #[error("Tried to decode a hex digit but it was out of range ({0:?})")]
    IllegalHexDigit(u8),
    #[error("Received a CAN Standard ID ({0:?}) that was out of the valid range (0..=0x7FF)")]
    StandardIdOutOfRange(u16),
    #[error("Received a CAN Extended ID ({0:?}) that was out of the valid range (0..=0x1FFFFFFF)")]
    ExtendedIdOutOfRange(u32),
    #[error("Received a DLC ({0:?}) that was out of the valid range (0..=8)")]
    InvalidDataLengthCode(u8),
    #[error("Received a frame with expected length ({0:?}) but ({1:?}) bytes of data")]
    MismatchedDataLength(u8, usize),
    #[error("Received a frame with ({0:?}) unexpected trailing bytes")]
    TrailingBytes(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdKind {
    #[default]
    Standard,
    Extended,
}

pub trait IdExt {
    fn kind(self) -> IdKind;
}

impl IdExt for Id {
    fn kind(self) -> IdKind {
        match self {
            Id::Standard(_) => IdKind::Standard,
            Id::Extended(_) => IdKind::Extended,
        }
    }
}

/// The leading letter of a frame line, shared by the transmit commands and
/// the received frame notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = FrameParseError, constructor = FrameParseError::InvalidFrameKind))]
#[repr(u8)]
pub enum FrameKind {
    StandardData = b't',
    ExtendedData = b'T',
    StandardRemote = b'r',
    ExtendedRemote = b'R',
}

impl FrameKind {
    pub const fn is_extended(&self) -> bool {
        matches!(self, Self::ExtendedData | Self::ExtendedRemote)
    }

    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::StandardRemote | Self::ExtendedRemote)
    }

    const fn id_length(&self) -> usize {
        if self.is_extended() {
            8
        } else {
            3
        }
    }

    /// Letter + id + DLC
    pub const fn header_length(&self) -> usize {
        1 + self.id_length() + 1
    }
}

impl CanFrame {
    /// Decodes a complete frame line (without the CR). Trailing bytes after
    /// the data digits are rejected.
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, FrameParseError> {
        let (frame, remaining) = Self::from_bytes_prefix(buffer)?;

        if !remaining.is_empty() {
            return Err(FrameParseError::TrailingBytes(remaining.len()));
        }

        Ok(frame)
    }

    /// Decodes a frame from the front of `buffer` and returns whatever follows
    /// the data digits (e.g. a timestamp).
    ///
    /// Checks run in wire order and stop at the first failure: length of the
    /// header, id digits, DLC digit, length of the data, data digits.
    pub fn from_bytes_prefix(buffer: &[u8]) -> Result<(Self, &[u8]), FrameParseError> {
        let Some(&first) = buffer.first() else {
            return Err(FrameParseError::NotEnoughBytes(0));
        };

        let kind: FrameKind = first.try_into()?;

        if buffer.len() < kind.header_length() {
            return Err(FrameParseError::NotEnoughBytes(buffer.len()));
        }

        let (id, remaining) = match kind.is_extended() {
            false => (
                Id::Standard(standard_id_from_hex(&[buffer[1], buffer[2], buffer[3]])?),
                &buffer[4..],
            ),
            true => {
                let mut hex_nibbles = [0u8; 8];
                hex_nibbles.copy_from_slice(&buffer[1..9]);

                (
                    Id::Extended(extended_id_from_hex(&hex_nibbles)?),
                    &buffer[9..],
                )
            }
        };

        let dlc = dlc_from_hex(remaining[0])?;
        let remaining = &remaining[1..];

        if kind.is_remote() {
            let frame = Self {
                id,
                dlc,
                data: None,
            };

            return Ok((frame, remaining));
        }

        let data = unpack_data_bytes(remaining, dlc)?;
        let frame = Self {
            id,
            dlc,
            data: Some(data),
        };

        Ok((frame, &remaining[dlc * 2..]))
    }

    /// Encodes the frame line without a terminator, e.g. `t123AABBCC`.
    pub fn as_bytes(&self) -> Vec<u8, MAX_FRAME_LINE_SIZE> {
        let mut result = Vec::new();

        result.push(self.kind().into()).ok();

        match self.id {
            Id::Standard(standard_id) => {
                result.extend_from_slice(&standard_id_to_hex(standard_id)).ok();
            }
            Id::Extended(extended_id) => {
                result.extend_from_slice(&extended_id_to_hex(extended_id)).ok();
            }
        }

        let dlc = self.dlc.min(MAX_DATA_LENGTH);

        result.push(to_hex_digit(dlc as u32)).ok();

        if let Some(data) = &self.data {
            result.extend_from_slice(&bytes_to_hex(&data[..dlc.min(data.len())])).ok();
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use embedded_can::{ExtendedId, StandardId};

    use crate::{CanFrame, FrameKind, FrameParseError};

    fn standard(raw: u16) -> StandardId {
        StandardId::new(raw).unwrap()
    }

    #[test]
    fn frame_parse_errors() {
        /* Kind parsing */

        assert_eq!(
            CanFrame::from_bytes(b"x1230"),
            Err(FrameParseError::InvalidFrameKind(b'x'))
        );

        assert_eq!(
            CanFrame::from_bytes(b""),
            Err(FrameParseError::NotEnoughBytes(0))
        );

        /* Header length */

        assert_eq!(
            CanFrame::from_bytes(b"t123"),
            Err(FrameParseError::NotEnoughBytes(4))
        );

        assert_eq!(
            CanFrame::from_bytes(b"T1234567"),
            Err(FrameParseError::NotEnoughBytes(8))
        );

        /* ID parsing */

        assert_eq!(
            CanFrame::from_bytes(b"tFFG0"),
            Err(FrameParseError::IllegalHexDigit(b'G'))
        );

        assert_eq!(
            CanFrame::from_bytes(b"tFFF0"),
            Err(FrameParseError::StandardIdOutOfRange(0xFFF))
        );

        assert_eq!(
            CanFrame::from_bytes(b"T2FFFFFFF0"),
            Err(FrameParseError::ExtendedIdOutOfRange(0x2FFFFFFF))
        );

        /* DLC parsing */

        assert_eq!(
            CanFrame::from_bytes(b"t123G"),
            Err(FrameParseError::IllegalHexDigit(b'G'))
        );

        assert_eq!(
            CanFrame::from_bytes(b"t1239"),
            Err(FrameParseError::InvalidDataLengthCode(9))
        );

        /* Data parsing */

        assert_eq!(
            CanFrame::from_bytes(b"t1232AA"),
            Err(FrameParseError::MismatchedDataLength(2, 1))
        );

        assert_eq!(
            CanFrame::from_bytes(b"t1231GG"),
            Err(FrameParseError::IllegalHexDigit(b'G'))
        );

        assert_eq!(
            CanFrame::from_bytes(b"t1231AABB"),
            Err(FrameParseError::TrailingBytes(2))
        );

        assert_eq!(
            CanFrame::from_bytes(b"r12310"),
            Err(FrameParseError::TrailingBytes(1))
        );
    }

    #[test]
    fn parse_data_frames() {
        assert_eq!(
            CanFrame::from_bytes(b"t1231122334455667788"),
            Ok(CanFrame::new_data(
                standard(0x123),
                &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88]
            )
            .unwrap())
        );

        assert_eq!(
            CanFrame::from_bytes(b"t7ff3aabbcc"),
            Ok(CanFrame::new_data(StandardId::MAX, &[0xAA, 0xBB, 0xCC]).unwrap())
        );

        assert_eq!(
            CanFrame::from_bytes(b"t0000"),
            Ok(CanFrame::new_data(StandardId::ZERO, &[]).unwrap())
        );

        assert_eq!(
            CanFrame::from_bytes(b"T1FFFFFFF0"),
            Ok(CanFrame::new_data(ExtendedId::MAX, &[]).unwrap())
        );
    }

    #[test]
    fn parse_remote_frames() {
        let frame = CanFrame::from_bytes(b"r1238").unwrap();

        assert_eq!(frame, CanFrame::new_remote(standard(0x123), 8).unwrap());
        assert!(frame.is_remote());
        assert_eq!(frame.dlc(), 8);
        assert!(frame.data().is_empty());

        assert_eq!(
            CanFrame::from_bytes(b"R000000010"),
            Ok(CanFrame::new_remote(ExtendedId::new(1).unwrap(), 0).unwrap())
        );
    }

    #[test]
    fn prefix_leaves_trailing_bytes() {
        let (frame, rest) = CanFrame::from_bytes_prefix(b"t1231AA12AB").unwrap();

        assert_eq!(frame, CanFrame::new_data(standard(0x123), &[0xAA]).unwrap());
        assert_eq!(rest, b"12AB");
    }

    #[test]
    fn encode_frames() {
        let frame = CanFrame::new_data(standard(0x123), &[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(&frame.as_bytes()[..], b"t1233AABBCC");

        let frame = CanFrame::new_data(ExtendedId::new(0x1ABCDEF).unwrap(), &[0x01]).unwrap();
        assert_eq!(&frame.as_bytes()[..], b"T01ABCDEF101");

        let frame = CanFrame::new_remote(standard(0x7), 2).unwrap();
        assert_eq!(&frame.as_bytes()[..], b"r0072");

        let frame = CanFrame::new_remote(ExtendedId::MAX, 0).unwrap();
        assert_eq!(&frame.as_bytes()[..], b"R1FFFFFFF0");
    }

    #[test]
    fn round_trip_all_lengths() {
        let payload = [0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x23, 0x45, 0x67];

        for len in 0..=8 {
            let frame = CanFrame::new_data(standard(0x5A5), &payload[..len]).unwrap();

            assert_eq!(CanFrame::from_bytes(&frame.as_bytes()), Ok(frame));
        }
    }

    #[test]
    fn oversized_payload_is_rejected() {
        assert_eq!(CanFrame::new_data(StandardId::ZERO, &[0; 9]), None);
        assert_eq!(CanFrame::new_remote(StandardId::ZERO, 9), None);
    }

    #[test]
    fn kinds() {
        assert!(FrameKind::ExtendedRemote.is_extended());
        assert!(FrameKind::ExtendedRemote.is_remote());
        assert!(!FrameKind::StandardData.is_remote());
        assert_eq!(FrameKind::StandardData.header_length(), 5);
        assert_eq!(FrameKind::ExtendedData.header_length(), 10);
    }
}
