use crate::{Bitrate, Error, Mode};

/// Whether the CAN channel is open and how it is configured.
///
/// Only the engine's command path mutates this; the receive interrupt never
/// touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelState {
    open: bool,
    listen_only: bool,
    bitrate: Bitrate,
    timestamps: bool,
}

impl ChannelState {
    pub const fn new() -> Self {
        Self {
            open: false,
            listen_only: false,
            bitrate: Bitrate::Rate1Mbit,
            timestamps: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_listen_only(&self) -> bool {
        self.listen_only
    }

    pub fn bitrate(&self) -> Bitrate {
        self.bitrate
    }

    pub fn timestamps_enabled(&self) -> bool {
        self.timestamps
    }

    /// Fails with [`Error::PreconditionViolation`] unless the channel is closed.
    pub fn ensure_closed(&self) -> Result<(), Error> {
        match self.open {
            true => Err(Error::PreconditionViolation),
            false => Ok(()),
        }
    }

    /// Fails with [`Error::PreconditionViolation`] unless frames may be put
    /// on the bus, i.e. the channel is open and not listen-only.
    pub fn ensure_can_transmit(&self) -> Result<(), Error> {
        match (self.open, self.listen_only) {
            (true, false) => Ok(()),
            _ => Err(Error::PreconditionViolation),
        }
    }

    /// The bitrate can only change while the channel is closed.
    pub fn set_bitrate(&mut self, bitrate: Bitrate) -> Result<(), Error> {
        self.ensure_closed()?;
        self.bitrate = bitrate;
        Ok(())
    }

    /// Records that the transceiver was opened in `mode`.
    pub fn mark_open(&mut self, mode: Mode) -> Result<(), Error> {
        self.ensure_closed()?;
        self.open = true;
        self.listen_only = mode == Mode::ListenOnly;
        Ok(())
    }

    pub fn mark_closed(&mut self) {
        self.open = false;
        self.listen_only = false;
    }

    pub fn set_timestamps(&mut self, enabled: bool) {
        self.timestamps = enabled;
    }
}
