use core::str::Utf8Error;

use heapless::{String, Vec};

use crate::{
    codec::{hex_digit_to_u8, timestamp_from_hex, timestamp_to_hex, u8_to_hex},
    frame::{CanFrame, FrameKind},
    FrameParseError, IdKind, MAX_EVENT_SIZE, MAX_FRAME_LINE_SIZE, MAX_INFO_LENGTH,
};

const ACK: u8 = b'\r';
const NACK: u8 = 0x07;

/// Text of a `V` or `N` reply
pub type InfoString = String<MAX_INFO_LENGTH>;

// Every event fits, so the pushes in `as_bytes` cannot fail
const _: () = assert!(1 + MAX_INFO_LENGTH + 1 <= MAX_EVENT_SIZE);
const _: () = assert!(MAX_FRAME_LINE_SIZE + 4 + 1 <= MAX_EVENT_SIZE);

/// Everything the adapter writes back to the host.
///
/// Each variant encodes to the exact bytes put on the serial line, including
/// the trailing CR. A NACK is a lone BEL with no CR.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Command succeeded
    Ack,
    /// Command failed
    Nack,
    /// A data frame was handed to the transceiver (`z` or `Z`)
    Transmitted(IdKind),
    /// Status flags (`F`)
    Status(u8),
    /// Firmware version (`V`)
    Version(#[cfg_attr(feature = "defmt", defmt(Debug2Format))] InfoString),
    /// Serial number (`N`)
    Serial(#[cfg_attr(feature = "defmt", defmt(Debug2Format))] InfoString),
    /// Received a frame from the bus, optionally stamped with
    /// milliseconds modulo 65536
    ReceivedFrame {
        frame: CanFrame,
        timestamp: Option<u16>,
    },
}

impl IdKind {
    const fn echo(&self) -> u8 {
        match self {
            IdKind::Standard => b'z',
            IdKind::Extended => b'Z',
        }
    }
}

impl Event {
    pub fn as_bytes(&self) -> Vec<u8, MAX_EVENT_SIZE> {
        let mut result = Vec::new();

        match self {
            Self::Ack => {}
            Self::Nack => {
                result.push(NACK).unwrap();
                return result;
            }
            Self::Transmitted(id_kind) => {
                result.push(id_kind.echo()).unwrap();
            }
            Self::Status(flags) => {
                result.push(b'F').unwrap();
                result.extend_from_slice(&u8_to_hex(*flags)).unwrap();
            }
            Self::Version(version) => {
                result.push(b'V').unwrap();
                result.extend_from_slice(version.as_bytes()).unwrap();
            }
            Self::Serial(serial) => {
                result.push(b'N').unwrap();
                result.extend_from_slice(serial.as_bytes()).unwrap();
            }
            Self::ReceivedFrame { frame, timestamp } => {
                result.extend_from_slice(&frame.as_bytes()).unwrap();

                if let Some(timestamp) = timestamp {
                    result.extend_from_slice(&timestamp_to_hex(*timestamp)).unwrap();
                }
            }
        }

        result.push(ACK).unwrap();

        result
    }
}

/// Various errors which can arise while parsing an adapter reply
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventParseError {
    #[error("Received an event with an unrecognized specifier ({0:?})")]
    UnrecognizedEvent(u8),
    #[error("Received an event ({0:?}) with an unexpected length ({1:?})")]
    InvalidLength(u8, usize),
    #[error("Tried to decode event text as UTF-8 but it was invalid ({0:?})")]
    InvalidUtf8(
        #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
        #[from]
        Utf8Error,
    ),

    /* Frame Parsing */
    #[error("Failed to parse frame content")]
    InvalidFrameContent(#[from] FrameParseError),
}

impl Event {
    /// Decodes one reply as read by a host, with the terminating CR already
    /// stripped. An empty line is a bare ACK and a lone BEL is a NACK.
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, EventParseError> {
        let Some(&first) = buffer.first() else {
            return Ok(Self::Ack);
        };

        let data = &buffer[1..];

        Ok(match first {
            NACK if data.is_empty() => Self::Nack,
            b'z' | b'Z' if data.is_empty() => Self::Transmitted(match first {
                b'z' => IdKind::Standard,
                _ => IdKind::Extended,
            }),
            b'F' => {
                let [msn, lsn] = data else {
                    return Err(EventParseError::InvalidLength(first, buffer.len()));
                };

                Self::Status((hex_digit_to_u8(*msn)? << 4) | hex_digit_to_u8(*lsn)?)
            }
            b'V' | b'N' => {
                let text = InfoString::try_from(core::str::from_utf8(data)?)
                    .map_err(|_| EventParseError::InvalidLength(first, buffer.len()))?;

                match first {
                    b'V' => Self::Version(text),
                    _ => Self::Serial(text),
                }
            }
            _ => {
                if FrameKind::try_from(first).is_err() {
                    return Err(EventParseError::UnrecognizedEvent(first));
                }

                let (frame, remaining) = CanFrame::from_bytes_prefix(buffer)?;

                let timestamp = match remaining {
                    [] => None,
                    [a, b, c, d] => Some(timestamp_from_hex(&[*a, *b, *c, *d])?),
                    _ => return Err(FrameParseError::TrailingBytes(remaining.len()).into()),
                };

                Self::ReceivedFrame { frame, timestamp }
            }
        })
    }
}
