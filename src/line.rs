use heapless::Vec;

use crate::MAX_LINE_DATA_LENGTH;

/// One command line with its terminator stripped
pub type Line = Vec<u8, MAX_LINE_DATA_LENGTH>;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Assembled {
    /// A CR completed a non-empty line
    Line(#[cfg_attr(feature = "defmt", defmt(Debug2Format))] Line),
    /// The line outgrew the buffer and was thrown away
    Overflow,
}

/// Rebuilds CR-terminated lines from a byte stream.
///
/// LF is dropped so `\r\n` endings work. A bare CR yields nothing. When a
/// byte does not fit, the partial line and that byte are discarded.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: Line,
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn push(&mut self, byte: u8) -> Option<Assembled> {
        match byte {
            b'\r' if self.buffer.is_empty() => None,
            b'\r' => Some(Assembled::Line(core::mem::take(&mut self.buffer))),
            b'\n' => None,
            _ => match self.buffer.push(byte) {
                Ok(()) => None,
                Err(_) => {
                    self.buffer.clear();
                    Some(Assembled::Overflow)
                }
            },
        }
    }

    /// Bytes of the line collected so far
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}
