use crate::{InfoString, Mode};

/// Fixed values reported to the host and timing knobs of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    version: InfoString,
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    serial_number: InfoString,
    status_flags: u8,
    open_mode: Mode,
    poll_interval_ms: u32,
    baud_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Both literals fit in an `InfoString`
            version: InfoString::try_from("1013").unwrap_or_default(),
            serial_number: InfoString::try_from("A123").unwrap_or_default(),
            status_flags: 0x00,
            open_mode: Mode::Normal,
            poll_interval_ms: 10,
            baud_rate: 115_200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("Info string is too long ({0:?} bytes)")]
    InfoTooLong(usize),
    #[error("Info string must be printable ASCII")]
    InfoNotAscii,
    #[error("Poll interval must be at least 1 ms")]
    ZeroPollInterval,
    #[error("Listen-only is opened with `L`, not `O`")]
    ListenOnlyOpenMode,
}

fn info(text: &str) -> Result<InfoString, ConfigError> {
    if !text.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(ConfigError::InfoNotAscii);
    }

    InfoString::try_from(text).map_err(|_| ConfigError::InfoTooLong(text.len()))
}

impl Config {
    /// Sets the string sent after `V` in reply to a version query
    pub fn with_version(mut self, version: &str) -> Result<Self, ConfigError> {
        self.version = info(version)?;
        Ok(self)
    }

    /// Sets the string sent after `N` in reply to a serial number query
    pub fn with_serial_number(mut self, serial_number: &str) -> Result<Self, ConfigError> {
        self.serial_number = info(serial_number)?;
        Ok(self)
    }

    pub fn with_status_flags(mut self, status_flags: u8) -> Self {
        self.status_flags = status_flags;
        self
    }

    /// Sets the controller mode `O` opens the channel in. Boards without a
    /// bus attached use [`Mode::Loopback`] for bring-up.
    pub fn with_open_mode(mut self, open_mode: Mode) -> Result<Self, ConfigError> {
        if open_mode == Mode::ListenOnly {
            return Err(ConfigError::ListenOnlyOpenMode);
        }

        self.open_mode = open_mode;
        Ok(self)
    }

    /// Sets how often the receive path is polled when no interrupt arrives
    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u32) -> Result<Self, ConfigError> {
        if poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        self.poll_interval_ms = poll_interval_ms;
        Ok(self)
    }

    /// Only used by board bring-up when opening the serial port
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn version(&self) -> &InfoString {
        &self.version
    }

    pub fn serial_number(&self) -> &InfoString {
        &self.serial_number
    }

    pub fn status_flags(&self) -> u8 {
        self.status_flags
    }

    pub fn open_mode(&self) -> Mode {
        self.open_mode
    }

    pub fn poll_interval_ms(&self) -> u32 {
        self.poll_interval_ms
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}
