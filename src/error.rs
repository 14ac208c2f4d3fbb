use crate::{BitrateError, CommandParseError, FrameParseError};

/// Every way a single command can fail.
///
/// The wire protocol only knows one failure reply (BEL), so each variant is
/// turned into exactly one NACK at the command boundary. The variants exist
/// for logging and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[error("Tried to decode a hex digit but it was out of range ({0:?})")]
    InvalidHex(u8),
    #[error("Received a command with a wrong length or missing fields")]
    MalformedCommand,
    #[error("Command is not allowed in the current channel state")]
    PreconditionViolation,
    #[error("Bitrate index ({0:?}) is not supported")]
    UnsupportedBitrate(u8),
    #[error("The CAN transceiver rejected the request")]
    TransceiverError,
    #[error("Command line exceeded the line buffer")]
    BufferOverflow,
}

impl From<FrameParseError> for Error {
    fn from(error: FrameParseError) -> Self {
        match error {
            FrameParseError::IllegalHexDigit(byte) => Self::InvalidHex(byte),
            _ => Self::MalformedCommand,
        }
    }
}

impl From<BitrateError> for Error {
    fn from(error: BitrateError) -> Self {
        match error {
            BitrateError::Unsupported(index) => Self::UnsupportedBitrate(index),
            BitrateError::NotADigit(_) => Self::MalformedCommand,
        }
    }
}

impl From<CommandParseError> for Error {
    fn from(error: CommandParseError) -> Self {
        match error {
            CommandParseError::Bitrate(error) => error.into(),
            CommandParseError::InvalidFrameContent(error) => error.into(),
            _ => Self::MalformedCommand,
        }
    }
}
