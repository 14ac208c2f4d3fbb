use crate::{ByteChannel, CanTransceiver, Clock, Event, InterruptFlag};

/// Forwards frames from the transceiver to the host.
///
/// A drain is due when the receive interrupt has fired or, as a fallback for
/// missed edges, when the poll interval has elapsed since the last drain.
#[derive(Debug)]
pub struct ReceiveRelay {
    poll_interval_ms: u32,
    last_drain_ms: u32,
}

impl ReceiveRelay {
    pub const fn new(poll_interval_ms: u32) -> Self {
        Self {
            poll_interval_ms,
            last_drain_ms: 0,
        }
    }

    /// Consumes the interrupt flag and checks the poll deadline.
    pub fn is_due(&mut self, interrupt: &InterruptFlag, now_ms: u32) -> bool {
        let signaled = interrupt.take();
        let elapsed = now_ms.wrapping_sub(self.last_drain_ms) >= self.poll_interval_ms;

        if signaled || elapsed {
            self.last_drain_ms = now_ms;
            return true;
        }

        false
    }

    /// Reads every pending frame and writes each one to `channel` in the
    /// order the transceiver delivered them. When `clock` is given, each line
    /// carries the low 16 bits of the millisecond counter.
    ///
    /// Returns how many frames were forwarded. A receive error stops the
    /// drain; frames already forwarded stay forwarded.
    pub fn drain<T, B, C>(
        transceiver: &mut T,
        channel: &mut B,
        clock: Option<&C>,
    ) -> Result<usize, T::Error>
    where
        T: CanTransceiver,
        B: ByteChannel,
        C: Clock,
    {
        let mut forwarded = 0;

        while transceiver.frame_available() {
            let frame = transceiver.receive()?;

            #[cfg(feature = "defmt")]
            defmt::trace!("Relaying frame: {}", frame);

            let event = Event::ReceivedFrame {
                frame,
                timestamp: clock.map(|clock| (clock.now_millis() & 0xFFFF) as u16),
            };

            channel.write(&event.as_bytes());
            forwarded += 1;
        }

        Ok(forwarded)
    }
}
