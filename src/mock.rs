//! In-memory stand-ins for the serial port, CAN controller and clock.

use core::cell::Cell;

use heapless::{Deque, Vec};

use crate::{Bitrate, ByteChannel, CanFrame, CanTransceiver, Clock, Mode};

pub struct MockChannel {
    input: Deque<u8, 256>,
    output: Vec<u8, 1024>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            input: Deque::new(),
            output: Vec::new(),
        }
    }

    /// Bytes the host sends to the adapter
    pub fn send(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.input.push_back(*byte).unwrap();
        }
    }

    /// Everything the adapter wrote so far
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<u8, 1024> {
        core::mem::take(&mut self.output)
    }
}

impl ByteChannel for MockChannel {
    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes).unwrap();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

pub struct MockTransceiver {
    pub configured: Option<(Bitrate, Mode)>,
    pub interrupt_enabled: bool,
    pub fail_configure: bool,
    pub fail_transmit: bool,
    pub fail_receive: bool,
    sent: Vec<CanFrame, 16>,
    pending: Deque<CanFrame, 16>,
}

impl MockTransceiver {
    pub fn new() -> Self {
        Self {
            configured: None,
            interrupt_enabled: false,
            fail_configure: false,
            fail_transmit: false,
            fail_receive: false,
            sent: Vec::new(),
            pending: Deque::new(),
        }
    }

    /// Queues a frame as if it arrived from the bus
    pub fn deliver(&mut self, frame: CanFrame) {
        self.pending.push_back(frame).unwrap();
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn sent(&self) -> &[CanFrame] {
        &self.sent
    }
}

impl CanTransceiver for MockTransceiver {
    type Error = MockError;

    fn configure(&mut self, bitrate: Bitrate, mode: Mode) -> Result<(), Self::Error> {
        if self.fail_configure {
            return Err(MockError);
        }

        self.configured = Some((bitrate, mode));
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.configured = None;
        Ok(())
    }

    fn enable_interrupt(&mut self) {
        self.interrupt_enabled = true;
    }

    fn disable_interrupt(&mut self) {
        self.interrupt_enabled = false;
    }

    fn frame_available(&mut self) -> bool {
        !self.pending.is_empty()
    }

    fn receive(&mut self) -> Result<CanFrame, Self::Error> {
        if self.fail_receive {
            return Err(MockError);
        }

        self.pending.pop_front().ok_or(MockError)
    }

    fn transmit(&mut self, frame: &CanFrame) -> Result<(), Self::Error> {
        if self.fail_transmit {
            return Err(MockError);
        }

        self.sent.push(frame.clone()).map_err(|_| MockError)
    }
}

pub struct MockClock(Cell<u32>);

impl MockClock {
    pub fn new(now_millis: u32) -> Self {
        Self(Cell::new(now_millis))
    }

    pub fn set(&self, now_millis: u32) {
        self.0.set(now_millis);
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u32 {
        self.0.get()
    }
}
