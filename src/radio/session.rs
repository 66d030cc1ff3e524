//! Radio Session
//!
//! The operating loop of the node. A session starts `Idle`, makes exactly
//! one radio initialization attempt and then either runs its role's loop
//! forever or parks in the terminal `Failed` state.
//!
//! The session never sleeps or spins itself. Each [`RadioSession::step`]
//! performs one iteration and returns a [`Step`] telling the caller how to
//! wait before the next one, which keeps the state machine testable on the
//! host.

use crate::config::{RECEIVE_DELAY_MS, SEND_DELAY_MS, TX_PAYLOAD_PREFIX};
use crate::diagnostics::{Diagnostics, Status};
use crate::radio::link::RadioLink;
use crate::types::{ChannelOffset, Frame, Mode, RadioInitResult, SequenceCounter};

/// Observable state of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Radio not initialized yet
    Idle,
    /// Transmitting frames
    Sending,
    /// Waiting for and reading frames
    Receiving,
    /// Radio init failed; nothing else will happen
    Failed,
}

#[cfg(feature = "embedded")]
impl defmt::Format for SessionState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::Sending => defmt::write!(f, "Sending"),
            Self::Receiving => defmt::write!(f, "Receiving"),
            Self::Failed => defmt::write!(f, "Failed"),
        }
    }
}

/// What the caller should do before stepping again
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Block for this many milliseconds
    Sleep(u32),
    /// Step again immediately (nothing was available)
    Poll,
    /// Nothing will ever happen again
    Halt,
}

/// One iteration of a role's operating loop
pub trait SessionLoop {
    /// State reported while this loop is running
    const STATE: SessionState;

    /// Fresh loop state
    fn new() -> Self;

    /// Run one iteration against an initialized radio
    fn step<R: RadioLink, D: Diagnostics>(&mut self, radio: &mut R, diag: &mut D) -> Step;
}

/// Build-time role selection
///
/// Implemented by the zero-sized markers [`Transmitter`] and [`Receiver`];
/// a session is generic over one of them, so an unset or mixed mode cannot
/// exist.
pub trait Role {
    /// Mode handed to the radio at init
    const MODE: Mode;

    /// Loop run once the radio is up
    type Loop: SessionLoop;
}

/// Transmitting node
#[derive(Clone, Copy, Debug)]
pub enum Transmitter {}

/// Receiving node
#[derive(Clone, Copy, Debug)]
pub enum Receiver {}

impl Role for Transmitter {
    const MODE: Mode = Mode::Transmitter;
    type Loop = TransmitLoop;
}

impl Role for Receiver {
    const MODE: Mode = Mode::Receiver;
    type Loop = ReceiveLoop;
}

/// Transmit loop: one tagged frame per step
#[derive(Clone, Debug)]
pub struct TransmitLoop {
    sequence: SequenceCounter,
    frame: Frame,
}

impl TransmitLoop {
    /// Sequence number the next frame will carry
    #[must_use]
    pub const fn sequence(&self) -> SequenceCounter {
        self.sequence
    }

    /// Last frame handed to the radio
    #[must_use]
    pub const fn last_frame(&self) -> &Frame {
        &self.frame
    }
}

impl SessionLoop for TransmitLoop {
    const STATE: SessionState = SessionState::Sending;

    fn new() -> Self {
        Self {
            sequence: SequenceCounter::new(),
            frame: Frame::empty(),
        }
    }

    fn step<R: RadioLink, D: Diagnostics>(&mut self, radio: &mut R, diag: &mut D) -> Step {
        self.frame.write_text(format_args!(
            "{}{}",
            TX_PAYLOAD_PREFIX,
            self.sequence.value()
        ));
        diag.report(&Status::FrameSent(&self.frame));
        radio.send(&self.frame);
        self.sequence.advance();
        Step::Sleep(SEND_DELAY_MS)
    }
}

/// Receive loop: poll for availability, read one frame when there is one
#[derive(Clone, Debug)]
pub struct ReceiveLoop {
    frame: Frame,
    frames_read: u32,
}

impl ReceiveLoop {
    /// Last frame read from the radio
    #[must_use]
    pub const fn last_frame(&self) -> &Frame {
        &self.frame
    }

    /// Number of frames read so far (wrapping)
    #[must_use]
    pub const fn frames_read(&self) -> u32 {
        self.frames_read
    }
}

impl SessionLoop for ReceiveLoop {
    const STATE: SessionState = SessionState::Receiving;

    fn new() -> Self {
        Self {
            frame: Frame::empty(),
            frames_read: 0,
        }
    }

    fn step<R: RadioLink, D: Diagnostics>(&mut self, radio: &mut R, diag: &mut D) -> Step {
        // No timeout: an absent peer keeps us polling forever
        if !radio.is_data_available() {
            return Step::Poll;
        }

        radio.receive(&mut self.frame);
        self.frames_read = self.frames_read.wrapping_add(1);
        diag.report(&Status::FrameReceived(&self.frame));
        Step::Sleep(RECEIVE_DELAY_MS)
    }
}

enum Phase<L> {
    Idle,
    Active(L),
    Failed,
}

/// Session controller for role `R`
pub struct RadioSession<R: Role> {
    channel: ChannelOffset,
    phase: Phase<R::Loop>,
}

impl<R: Role> RadioSession<R> {
    /// Create an idle session for `channel`
    #[must_use]
    pub const fn new(channel: ChannelOffset) -> Self {
        Self {
            channel,
            phase: Phase::Idle,
        }
    }

    /// Channel the session was created for
    #[must_use]
    pub const fn channel(&self) -> ChannelOffset {
        self.channel
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Active(_) => <R::Loop as SessionLoop>::STATE,
            Phase::Failed => SessionState::Failed,
        }
    }

    /// Running loop, if the radio came up
    #[must_use]
    pub const fn active(&self) -> Option<&R::Loop> {
        match &self.phase {
            Phase::Active(running) => Some(running),
            Phase::Idle | Phase::Failed => None,
        }
    }

    /// Initialize the radio and leave `Idle`
    ///
    /// Only the first call talks to the radio; later calls report the
    /// outcome of that attempt.
    pub fn start<L: RadioLink, D: Diagnostics>(
        &mut self,
        radio: &mut L,
        diag: &mut D,
    ) -> RadioInitResult {
        match self.phase {
            Phase::Active(_) => return RadioInitResult::Ok,
            Phase::Failed => return RadioInitResult::Failed,
            Phase::Idle => {}
        }

        let result = radio.init(R::MODE, self.channel);
        match result {
            RadioInitResult::Ok => {
                let config = radio.config();
                diag.report(&Status::RadioReady(&config));
                self.phase = Phase::Active(R::Loop::new());
            }
            RadioInitResult::Failed => {
                diag.report(&Status::RadioFailed);
                self.phase = Phase::Failed;
            }
        }
        result
    }

    /// Run one iteration of the operating loop
    ///
    /// `Idle` and `Failed` sessions do nothing and return [`Step::Halt`].
    pub fn step<L: RadioLink, D: Diagnostics>(&mut self, radio: &mut L, diag: &mut D) -> Step {
        match &mut self.phase {
            Phase::Active(running) => running.step(radio, diag),
            Phase::Idle | Phase::Failed => Step::Halt,
        }
    }
}
