use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::codec::dec_digit_to_u8;

/// The CAN 2.0 bit rates selectable with the `S<n>` command. The integer
/// value of each variant is its protocol speed index.
///
/// Index 7 (800 Kbit/s on other adapters) is not supported by the
/// transceiver and is rejected rather than mapped to some other rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = BitrateError, constructor = BitrateError::Unsupported))]
#[repr(u8)]
pub enum Bitrate {
    /// Transmits and receives at 10 Kbit/s
    Rate10Kbit = 0,
    /// Transmits and receives at 20 Kbit/s
    Rate20Kbit = 1,
    /// Transmits and receives at 50 Kbit/s
    Rate50Kbit = 2,
    /// Transmits and receives at 100 Kbit/s
    Rate100Kbit = 3,
    /// Transmits and receives at 125 Kbit/s
    Rate125Kbit = 4,
    /// Transmits and receives at 250 Kbit/s
    Rate250Kbit = 5,
    /// Transmits and receives at 500 Kbit/s
    Rate500Kbit = 6,
    /// Transmits and receives at 1 Mbit/s
    Rate1Mbit = 8,
}

// Not `#[default]`: num_enum would treat that variant as a catch-all for
// unknown indices.
impl Default for Bitrate {
    fn default() -> Self {
        Self::Rate1Mbit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitrateError {
    #[error("Bitrate index ({0:?}) is not supported")]
    Unsupported(u8),
    #[error("Bitrate argument ({0:?}) is not a decimal digit")]
    NotADigit(u8),
}

impl Bitrate {
    /// Looks up the bit rate for a protocol speed index.
    pub fn lookup(index: u8) -> Result<Self, BitrateError> {
        index.try_into()
    }

    /// Decodes the ASCII digit following `S`.
    pub fn from_digit(byte: u8) -> Result<Self, BitrateError> {
        let index = dec_digit_to_u8(byte).ok_or(BitrateError::NotADigit(byte))?;

        Self::lookup(index)
    }

    /// The ASCII digit used to select this rate.
    pub fn to_digit(self) -> u8 {
        b'0' + u8::from(self)
    }

    pub fn index(self) -> u8 {
        self.into()
    }

    pub fn bits_per_second(self) -> u32 {
        match self {
            Self::Rate10Kbit => 10_000,
            Self::Rate20Kbit => 20_000,
            Self::Rate50Kbit => 50_000,
            Self::Rate100Kbit => 100_000,
            Self::Rate125Kbit => 125_000,
            Self::Rate250Kbit => 250_000,
            Self::Rate500Kbit => 500_000,
            Self::Rate1Mbit => 1_000_000,
        }
    }
}
