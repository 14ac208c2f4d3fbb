use heapless::Vec;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
    frame::{CanFrame, FrameKind},
    Bitrate, BitrateError, FrameParseError, MAX_LINE_DATA_LENGTH,
};

/// A command sent from the host to the adapter, decoded from one line.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Open the channel in normal mode (sending & receiving)
    Open,
    /// Close the channel
    Close,
    /// Open the channel without acknowledging or transmitting on the bus
    ListenOnly,
    SetBitrate(Bitrate),
    /// Transmit a data or remote frame (`t`, `T`, `r`, `R`)
    TransmitFrame(CanFrame),
    ReadStatus,
    ReadVersion,
    ReadSerial,
    SetTimestamps(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = CommandParseError, constructor = CommandParseError::UnrecognizedCommand))]
#[repr(u8)]
pub enum CommandKind {
    Open = b'O',
    Close = b'C',
    ListenOnly = b'L',
    SetBitrate = b'S',
    TransmitStandard = b't',
    TransmitExtended = b'T',
    TransmitStandardRemote = b'r',
    TransmitExtendedRemote = b'R',
    ReadStatus = b'F',
    ReadVersion = b'V',
    ReadSerial = b'N',
    SetTimestamps = b'Z',
}

impl CommandKind {
    const fn frame_kind(&self) -> Option<FrameKind> {
        match self {
            Self::TransmitStandard => Some(FrameKind::StandardData),
            Self::TransmitExtended => Some(FrameKind::ExtendedData),
            Self::TransmitStandardRemote => Some(FrameKind::StandardRemote),
            Self::TransmitExtendedRemote => Some(FrameKind::ExtendedRemote),
            _ => None,
        }
    }

    /// Whether the command puts a frame on the bus and so needs an open
    /// channel that is not listen-only.
    pub const fn is_transmit(&self) -> bool {
        self.frame_kind().is_some()
    }

    const fn get_min_data_length(&self) -> usize {
        match self.frame_kind() {
            Some(kind) => kind.header_length() - 1,
            None => match self {
                Self::SetBitrate | Self::SetTimestamps => 1,
                _ => 0,
            },
        }
    }

    // Hosts append stray arguments to `C` and the queries, which take none
    const fn get_max_data_length(&self) -> usize {
        match self.frame_kind() {
            Some(_) => MAX_LINE_DATA_LENGTH,
            None => match self {
                Self::SetBitrate | Self::SetTimestamps => 1,
                Self::Open | Self::ListenOnly => 0,
                _ => MAX_LINE_DATA_LENGTH,
            },
        }
    }
}

impl Command {
    pub fn get_kind(&self) -> CommandKind {
        match self {
            Self::Open => CommandKind::Open,
            Self::Close => CommandKind::Close,
            Self::ListenOnly => CommandKind::ListenOnly,
            Self::SetBitrate(_) => CommandKind::SetBitrate,
            Self::TransmitFrame(frame) => match frame.kind() {
                FrameKind::StandardData => CommandKind::TransmitStandard,
                FrameKind::ExtendedData => CommandKind::TransmitExtended,
                FrameKind::StandardRemote => CommandKind::TransmitStandardRemote,
                FrameKind::ExtendedRemote => CommandKind::TransmitExtendedRemote,
            },
            Self::ReadStatus => CommandKind::ReadStatus,
            Self::ReadVersion => CommandKind::ReadVersion,
            Self::ReadSerial => CommandKind::ReadSerial,
            Self::SetTimestamps(_) => CommandKind::SetTimestamps,
        }
    }

    /// Encodes the command as a host would send it, without the CR.
    pub fn as_bytes(&self) -> Vec<u8, MAX_LINE_DATA_LENGTH> {
        let mut result = Vec::new();

        match self {
            Self::TransmitFrame(can_frame) => {
                result.extend_from_slice(&can_frame.as_bytes()).ok();
            }
            Self::SetBitrate(bitrate) => {
                result.push(self.get_kind().into()).ok();
                result.push(bitrate.to_digit()).ok();
            }
            Self::SetTimestamps(enabled) => {
                result.push(self.get_kind().into()).ok();
                result.push(if *enabled { b'1' } else { b'0' }).ok();
            }
            _ => {
                result.push(self.get_kind().into()).ok();
            }
        }

        result
    }
}

/// Various errors which can arise while parsing a command line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandParseError {
    /* Generic message parsing */
    #[error("Tried to parse an empty buffer")]
    Empty,
    #[error("Received a command with an unrecognized specifier ({0:?})")]
    UnrecognizedCommand(u8),
    #[error("Received a command ({0:?}) but less bytes than is required to parse it ({1:?})")]
    NotEnoughBytes(CommandKind, usize),
    #[error("Received a command ({0:?}) but more bytes than were expected ({1:?})")]
    TooManyBytes(CommandKind, usize),

    /* Option Parsing */
    #[error("Tried to decode the bitrate index but it was invalid")]
    Bitrate(#[from] BitrateError),
    #[error("Tried to decode the timestamp switch but it was invalid ({0:?})")]
    InvalidTimestampSwitch(u8),

    /* Frame Parsing */
    #[error("Failed to parse frame content")]
    InvalidFrameContent(#[from] FrameParseError),
}

impl Command {
    /// Classifies a line by its first byte without decoding the rest.
    pub fn kind_of(buffer: &[u8]) -> Result<CommandKind, CommandParseError> {
        let Some(&first) = buffer.first() else {
            return Err(CommandParseError::Empty);
        };

        let kind: CommandKind = first.try_into()?;

        Ok(kind)
    }

    /// Decodes one command line (without the CR).
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, CommandParseError> {
        let kind = Self::kind_of(buffer)?;
        let command_data = &buffer[1..];

        /* Validate data length */

        if command_data.len() < kind.get_min_data_length() {
            return Err(CommandParseError::NotEnoughBytes(kind, buffer.len()));
        }

        if command_data.len() > kind.get_max_data_length() {
            return Err(CommandParseError::TooManyBytes(kind, buffer.len()));
        }

        /* Parse data bytes */

        Ok(match kind {
            CommandKind::Open => Self::Open,
            CommandKind::Close => Self::Close,
            CommandKind::ListenOnly => Self::ListenOnly,
            CommandKind::SetBitrate => Self::SetBitrate(Bitrate::from_digit(command_data[0])?),
            CommandKind::TransmitStandard
            | CommandKind::TransmitExtended
            | CommandKind::TransmitStandardRemote
            | CommandKind::TransmitExtendedRemote => {
                Self::TransmitFrame(CanFrame::from_bytes(buffer)?)
            }
            CommandKind::ReadStatus => Self::ReadStatus,
            CommandKind::ReadVersion => Self::ReadVersion,
            CommandKind::ReadSerial => Self::ReadSerial,
            CommandKind::SetTimestamps => Self::SetTimestamps(match command_data[0] {
                b'0' => false,
                b'1' => true,
                other => return Err(CommandParseError::InvalidTimestampSwitch(other)),
            }),
        })
    }
}
