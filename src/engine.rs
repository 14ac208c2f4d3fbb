use crate::{
    frame::IdExt, Assembled, ByteChannel, CanFrame, CanTransceiver, ChannelState, Clock, Command,
    Config, Error, Event, IdKind, InterruptFlag, LineAssembler, Mode, ReceiveRelay,
};

/// What a successful command answers with. Failures are always a single NACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    Ack,
    /// `z`/`Z` echo followed by the ACK
    Transmitted(IdKind),
    Status,
    Version,
    Serial,
}

/// Runs the adapter: turns serial input into commands, drives the
/// transceiver and relays received frames back over the same serial
/// channel.
///
/// Call [`poll`](Self::poll) from the main loop. The receive interrupt
/// handler only calls [`InterruptFlag::signal`] on the flag passed in here.
pub struct Engine<'a, T, B, C> {
    transceiver: T,
    channel: B,
    clock: C,
    interrupt: &'a InterruptFlag,
    config: Config,
    state: ChannelState,
    assembler: LineAssembler,
    relay: ReceiveRelay,
}

impl<'a, T, B, C> Engine<'a, T, B, C>
where
    T: CanTransceiver,
    B: ByteChannel,
    C: Clock,
{
    pub fn new(
        transceiver: T,
        channel: B,
        clock: C,
        interrupt: &'a InterruptFlag,
        config: Config,
    ) -> Self {
        Self {
            transceiver,
            channel,
            clock,
            interrupt,
            relay: ReceiveRelay::new(config.poll_interval_ms()),
            config,
            state: ChannelState::new(),
            assembler: LineAssembler::new(),
        }
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transceiver(&self) -> &T {
        &self.transceiver
    }

    pub fn transceiver_mut(&mut self) -> &mut T {
        &mut self.transceiver
    }

    pub fn channel(&self) -> &B {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut B {
        &mut self.channel
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// One main loop iteration: handle every byte the host sent, then relay
    /// received frames if a drain is due.
    pub fn poll(&mut self) {
        while let Some(byte) = self.channel.read_byte() {
            self.feed(byte);
        }

        self.service_receive();
    }

    /// Feeds a single serial byte through the line assembler, executing the
    /// line it completes.
    pub fn feed(&mut self, byte: u8) {
        match self.assembler.push(byte) {
            Some(Assembled::Line(line)) => self.handle_line(&line),
            Some(Assembled::Overflow) => self.respond(Err(Error::BufferOverflow)),
            None => {}
        }
    }

    /// Executes one command line and writes its reply.
    pub fn handle_line(&mut self, line: &[u8]) {
        let result = self.execute(line);

        self.respond(result);
    }

    /// Executes one command line without replying.
    ///
    /// Transmit commands are rejected on a closed or listen-only channel
    /// before their body is decoded. Nothing reaches the transceiver unless
    /// the whole line is valid.
    pub fn execute(&mut self, line: &[u8]) -> Result<Reply, Error> {
        let kind = Command::kind_of(line)?;

        if kind.is_transmit() {
            self.state.ensure_can_transmit()?;
        }

        let command = Command::from_bytes(line)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Executing command: {}", command);

        match command {
            Command::Open => self.open(self.config.open_mode()),
            Command::ListenOnly => self.open(Mode::ListenOnly),
            Command::Close => {
                self.close();
                Ok(Reply::Ack)
            }
            Command::SetBitrate(bitrate) => {
                self.state.set_bitrate(bitrate)?;
                Ok(Reply::Ack)
            }
            Command::TransmitFrame(frame) => self.transmit(&frame),
            Command::ReadStatus => Ok(Reply::Status),
            Command::ReadVersion => Ok(Reply::Version),
            Command::ReadSerial => Ok(Reply::Serial),
            Command::SetTimestamps(enabled) => {
                self.state.set_timestamps(enabled);
                Ok(Reply::Ack)
            }
        }
    }

    /// Drains the transceiver if the interrupt fired or the poll interval
    /// elapsed. Does nothing while the channel is closed, leaving the
    /// interrupt flag untouched.
    pub fn service_receive(&mut self) {
        if !self.state.is_open() {
            return;
        }

        let now_ms = self.clock.now_millis();

        if !self.relay.is_due(self.interrupt, now_ms) {
            return;
        }

        let clock = self.state.timestamps_enabled().then_some(&self.clock);

        if let Err(_error) = ReceiveRelay::drain(&mut self.transceiver, &mut self.channel, clock) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to read frame: {}", defmt::Debug2Format(&_error));
        }
    }

    fn open(&mut self, mode: Mode) -> Result<Reply, Error> {
        self.state.ensure_closed()?;

        let bitrate = self.state.bitrate();

        self.transceiver
            .configure(bitrate, mode)
            .map_err(|_error| {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Failed to configure transceiver: {}",
                    defmt::Debug2Format(&_error)
                );

                Error::TransceiverError
            })?;

        // Drop edges left over from before the channel was opened
        self.interrupt.take();
        self.transceiver.enable_interrupt();
        self.state.mark_open(mode)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Channel open at {} in {}", bitrate, mode);

        Ok(Reply::Ack)
    }

    fn close(&mut self) {
        self.transceiver.disable_interrupt();

        if let Err(_error) = self.transceiver.close() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to close transceiver: {}", defmt::Debug2Format(&_error));
        }

        self.state.mark_closed();

        #[cfg(feature = "defmt")]
        defmt::debug!("Channel closed");
    }

    fn transmit(&mut self, frame: &CanFrame) -> Result<Reply, Error> {
        self.transceiver.transmit(frame).map_err(|_error| {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to transmit frame: {}", defmt::Debug2Format(&_error));

            Error::TransceiverError
        })?;

        Ok(match frame.is_remote() {
            true => Reply::Ack,
            false => Reply::Transmitted(frame.id().kind()),
        })
    }

    fn respond(&mut self, result: Result<Reply, Error>) {
        let event = match result {
            Ok(Reply::Ack) => Event::Ack,
            Ok(Reply::Transmitted(id_kind)) => Event::Transmitted(id_kind),
            Ok(Reply::Status) => Event::Status(self.config.status_flags()),
            Ok(Reply::Version) => Event::Version(self.config.version().clone()),
            Ok(Reply::Serial) => Event::Serial(self.config.serial_number().clone()),
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Rejected command: {}", _error);

                Event::Nack
            }
        };

        self.channel.write(&event.as_bytes());
    }
}
