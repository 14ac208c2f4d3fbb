//! Boundaries to the hardware the engine drives but does not own: the serial
//! byte stream, the CAN controller, a millisecond clock and the flag raised
//! by the controller's interrupt line.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::{Bitrate, CanFrame};

/// Raw serial transport (UART or USB-CDC).
pub trait ByteChannel {
    /// Returns the next received byte, or `None` if nothing is pending.
    /// Must not block.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queues bytes for transmission to the host.
    fn write(&mut self, bytes: &[u8]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    Normal,
    ListenOnly,
    Loopback,
}

/// The CAN controller driver.
pub trait CanTransceiver {
    type Error: core::fmt::Debug;

    /// Starts the controller at `bitrate` in `mode`.
    fn configure(&mut self, bitrate: Bitrate, mode: Mode) -> Result<(), Self::Error>;

    /// Takes the controller off the bus.
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Starts routing the receive interrupt to [`InterruptFlag::signal`].
    fn enable_interrupt(&mut self) {}

    /// Stops routing the receive interrupt.
    fn disable_interrupt(&mut self) {}

    fn frame_available(&mut self) -> bool;

    /// Reads the next pending frame. Only called after
    /// [`frame_available`](Self::frame_available) returned `true`.
    fn receive(&mut self) -> Result<CanFrame, Self::Error>;

    fn transmit(&mut self, frame: &CanFrame) -> Result<(), Self::Error>;
}

/// Free-running millisecond counter, allowed to wrap.
pub trait Clock {
    fn now_millis(&self) -> u32;
}

/// "Frame pending" flag shared between the receive interrupt and the main
/// loop. Interrupt handlers must only call [`signal`](Self::signal).
#[derive(Debug, Default)]
pub struct InterruptFlag(AtomicBool);

impl InterruptFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Marks a frame as pending. Safe to call from interrupt context.
    pub fn signal(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Clears the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
