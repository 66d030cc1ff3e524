//! Tests for the radio session state machine
//!
//! Drives `RadioSession` against a scripted radio and a recording
//! diagnostics sink.
//! Run with: cargo test --no-default-features --features std --test session_tests

use std::collections::VecDeque;

use nrf24_link::config::{CHANNEL_OFFSET, RECEIVE_DELAY_MS, SEND_DELAY_MS};
use nrf24_link::diagnostics::{Diagnostics, Status};
use nrf24_link::radio::link::{CrcLength, DataRate, RadioConfig, RadioLink, TxPower};
use nrf24_link::radio::session::{
    RadioSession, Receiver, SessionLoop, SessionState, Step, TransmitLoop, Transmitter,
};
use nrf24_link::types::{ChannelOffset, Frame, Mode, RadioInitResult};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Init(Mode, u8),
    Send(String),
    Poll(bool),
    Receive,
    Config,
}

/// Scripted radio recording every call
struct FakeRadio {
    init_result: RadioInitResult,
    availability: VecDeque<bool>,
    inbox: VecDeque<Frame>,
    calls: Vec<Call>,
}

impl FakeRadio {
    fn new(init_result: RadioInitResult) -> Self {
        Self {
            init_result,
            availability: VecDeque::new(),
            inbox: VecDeque::new(),
            calls: Vec::new(),
        }
    }

    fn sent(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Send(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|&c| pred(c)).count()
    }
}

impl RadioLink for FakeRadio {
    fn init(&mut self, mode: Mode, channel: ChannelOffset) -> RadioInitResult {
        self.calls.push(Call::Init(mode, channel.value()));
        self.init_result
    }

    fn send(&mut self, frame: &Frame) {
        assert_eq!(frame.as_bytes().len(), Frame::LEN);
        self.calls.push(Call::Send(frame.text().to_owned()));
    }

    fn is_data_available(&mut self) -> bool {
        let available = self.availability.pop_front().unwrap_or(false);
        self.calls.push(Call::Poll(available));
        available
    }

    fn receive(&mut self, frame: &mut Frame) {
        self.calls.push(Call::Receive);
        *frame = self.inbox.pop_front().unwrap_or_default();
    }

    fn config(&mut self) -> RadioConfig {
        self.calls.push(Call::Config);
        RadioConfig {
            mode: Mode::Transmitter,
            channel: CHANNEL_OFFSET,
            data_rate: DataRate::Mbps1,
            power: TxPower::ZeroDbm,
            crc: CrcLength::OneByte,
            payload_width: 32,
            retransmit_delay_us: 1750,
            retransmit_count: 8,
            address: [0xE7; 5],
        }
    }
}

/// Diagnostics sink keeping the rendered text of every report
#[derive(Default)]
struct Recorder {
    reports: Vec<String>,
}

impl Recorder {
    fn count_containing(&self, needle: &str) -> usize {
        self.reports.iter().filter(|r| r.contains(needle)).count()
    }
}

impl Diagnostics for Recorder {
    fn report(&mut self, status: &Status<'_>) {
        let mut text = String::new();
        status.render(&mut text).unwrap();
        self.reports.push(text);
    }
}

/// Digits after the payload prefix
fn sequence_of(text: &str) -> u8 {
    text.strip_prefix("Hello Arduino ")
        .and_then(|n| n.parse().ok())
        .expect("tagged payload")
}

// ============================================================================
// Initialization Tests
// ============================================================================

#[test]
fn new_session_is_idle() {
    let session = RadioSession::<Transmitter>::new(CHANNEL_OFFSET);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.channel().value(), 115);
    assert!(session.active().is_none());
}

#[test]
fn idle_session_does_not_step() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Transmitter>::new(CHANNEL_OFFSET);

    assert_eq!(session.step(&mut radio, &mut log), Step::Halt);
    assert!(radio.calls.is_empty());
    assert!(log.reports.is_empty());
}

#[test]
fn transmitter_init_ok_enters_sending() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Transmitter>::new(CHANNEL_OFFSET);

    assert_eq!(session.start(&mut radio, &mut log), RadioInitResult::Ok);
    assert_eq!(session.state(), SessionState::Sending);
    assert_eq!(radio.calls[0], Call::Init(Mode::Transmitter, 115));
}

#[test]
fn receiver_init_ok_enters_receiving() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Receiver>::new(CHANNEL_OFFSET);

    assert_eq!(session.start(&mut radio, &mut log), RadioInitResult::Ok);
    assert_eq!(session.state(), SessionState::Receiving);
    assert_eq!(radio.calls[0], Call::Init(Mode::Receiver, 115));
}

#[test]
fn init_ok_emits_exactly_one_config_banner() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Transmitter>::new(CHANNEL_OFFSET);
    session.start(&mut radio, &mut log);

    assert_eq!(log.reports.len(), 1);
    assert_eq!(log.count_containing("NRF24L01 Initialize successful"), 1);
    assert_eq!(log.count_containing("RF channel: 115 (2515 MHz)"), 1);
    assert_eq!(radio.count(|c| *c == Call::Config), 1);
}

#[test]
fn init_is_attempted_only_once() {
    let mut radio = FakeRadio::new(RadioInitResult::Failed);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Receiver>::new(CHANNEL_OFFSET);

    assert_eq!(session.start(&mut radio, &mut log), RadioInitResult::Failed);
    // A later init would succeed, but the first answer is authoritative
    radio.init_result = RadioInitResult::Ok;
    assert_eq!(session.start(&mut radio, &mut log), RadioInitResult::Failed);

    assert_eq!(radio.count(|c| matches!(c, Call::Init(..))), 1);
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(log.reports.len(), 1);
}

#[test]
fn restart_of_running_session_is_a_no_op() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Transmitter>::new(CHANNEL_OFFSET);
    session.start(&mut radio, &mut log);
    session.step(&mut radio, &mut log);

    assert_eq!(session.start(&mut radio, &mut log), RadioInitResult::Ok);
    assert_eq!(radio.count(|c| matches!(c, Call::Init(..))), 1);
    // Sequence was not reset
    assert_eq!(session.active().map(|l| l.sequence().value()), Some(1));
}

// ============================================================================
// Failure Path Tests
// ============================================================================

#[test]
fn receiver_init_failure_emits_one_banner_then_silence() {
    let mut radio = FakeRadio::new(RadioInitResult::Failed);
    radio.availability.extend([true, true, true]);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Receiver>::new(CHANNEL_OFFSET);

    session.start(&mut radio, &mut log);
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(log.reports.len(), 1);
    assert_eq!(log.count_containing("Failed Initialize NRF24L01"), 1);

    for _ in 0..1000 {
        assert_eq!(session.step(&mut radio, &mut log), Step::Halt);
    }

    assert_eq!(log.reports.len(), 1);
    // Only the init call ever reached the radio
    assert_eq!(radio.calls, vec![Call::Init(Mode::Receiver, 115)]);
}

#[test]
fn failure_does_not_query_config() {
    let mut radio = FakeRadio::new(RadioInitResult::Failed);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Transmitter>::new(CHANNEL_OFFSET);
    session.start(&mut radio, &mut log);

    assert_eq!(radio.count(|c| *c == Call::Config), 0);
    assert_eq!(log.count_containing("Initialize successful"), 0);
}

// ============================================================================
// Sending Tests
// ============================================================================

#[test]
fn transmitter_scenario_first_three_frames() {
    let channel = ChannelOffset::new(115).unwrap();
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Transmitter>::new(channel);
    session.start(&mut radio, &mut log);

    for _ in 0..3 {
        assert_eq!(session.step(&mut radio, &mut log), Step::Sleep(SEND_DELAY_MS));
    }

    assert_eq!(
        radio.sent(),
        vec!["Hello Arduino 0", "Hello Arduino 1", "Hello Arduino 2"]
    );
    assert_eq!(log.count_containing("NRF24L01 Initialize successful"), 1);
    assert_eq!(log.reports[1], "NRF24 Send Data: Hello Arduino 0\n");
    assert_eq!(log.reports[3], "NRF24 Send Data: Hello Arduino 2\n");
}

#[test]
fn transmitter_logs_before_sending() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Transmitter>::new(CHANNEL_OFFSET);
    session.start(&mut radio, &mut log);
    session.step(&mut radio, &mut log);

    assert_eq!(log.reports.len(), 2);
    assert_eq!(radio.sent().len(), 1);
}

#[test]
fn transmitter_sequence_wraps_modulo_256() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Transmitter>::new(CHANNEL_OFFSET);
    session.start(&mut radio, &mut log);

    for _ in 0..600 {
        session.step(&mut radio, &mut log);
    }

    let sequences: Vec<u8> = radio.sent().iter().map(|t| sequence_of(t)).collect();
    assert_eq!(sequences.len(), 600);
    assert_eq!(sequences[0], 0);
    for pair in sequences.windows(2) {
        assert_eq!(pair[1], pair[0].wrapping_add(1));
    }
    assert_eq!(sequences[255], 255);
    assert_eq!(sequences[256], 0);
}

#[test]
fn transmitter_never_polls_or_reads() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Transmitter>::new(CHANNEL_OFFSET);
    session.start(&mut radio, &mut log);
    for _ in 0..10 {
        session.step(&mut radio, &mut log);
    }

    assert_eq!(radio.count(|c| matches!(c, Call::Poll(_) | Call::Receive)), 0);
}

#[test]
fn transmit_loop_tracks_last_frame() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut running = TransmitLoop::new();
    running.step(&mut radio, &mut log);
    running.step(&mut radio, &mut log);

    assert_eq!(running.last_frame().text(), "Hello Arduino 1");
    assert_eq!(running.sequence().value(), 2);
}

// ============================================================================
// Receiving Tests
// ============================================================================

#[test]
fn receiver_polls_without_reading_while_unavailable() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Receiver>::new(CHANNEL_OFFSET);
    session.start(&mut radio, &mut log);

    for _ in 0..50 {
        assert_eq!(session.step(&mut radio, &mut log), Step::Poll);
    }

    assert_eq!(radio.count(|c| *c == Call::Receive), 0);
    assert_eq!(radio.count(|c| *c == Call::Poll(false)), 50);
    // Banner only
    assert_eq!(log.reports.len(), 1);
}

#[test]
fn receiver_reads_iff_available() {
    let pattern = [false, true, false, false, true, true, false];
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    radio.availability.extend(pattern);
    radio.inbox.extend([
        Frame::from_fmt(format_args!("Hello Arduino 0")),
        Frame::from_fmt(format_args!("Hello Arduino 1")),
        Frame::from_fmt(format_args!("Hello Arduino 2")),
    ]);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Receiver>::new(CHANNEL_OFFSET);
    session.start(&mut radio, &mut log);

    let steps: Vec<Step> = pattern
        .iter()
        .map(|_| session.step(&mut radio, &mut log))
        .collect();

    let expected: Vec<Step> = pattern
        .iter()
        .map(|&a| if a { Step::Sleep(RECEIVE_DELAY_MS) } else { Step::Poll })
        .collect();
    assert_eq!(steps, expected);

    // Every Receive immediately follows a Poll(true), and every Poll(true) is followed by a Receive
    let calls = &radio.calls[2..];
    for (i, call) in calls.iter().enumerate() {
        match call {
            Call::Receive => assert_eq!(calls[i - 1], Call::Poll(true)),
            Call::Poll(true) => assert_eq!(calls[i + 1], Call::Receive),
            _ => {}
        }
    }
    assert_eq!(radio.count(|c| *c == Call::Receive), 3);
}

#[test]
fn receiver_logs_each_frame() {
    let mut radio = FakeRadio::new(RadioInitResult::Ok);
    radio.availability.extend([true, true]);
    radio.inbox.extend([
        Frame::from_fmt(format_args!("Hello Arduino 41")),
        Frame::from_fmt(format_args!("Hello Arduino 42")),
    ]);
    let mut log = Recorder::default();
    let mut session = RadioSession::<Receiver>::new(CHANNEL_OFFSET);
    session.start(&mut radio, &mut log);
    session.step(&mut radio, &mut log);
    session.step(&mut radio, &mut log);

    assert_eq!(log.reports[1], "NRF24 Receive Data: Hello Arduino 41\n");
    assert_eq!(log.reports[2], "NRF24 Receive Data: Hello Arduino 42\n");
    let running = session.active().unwrap();
    assert_eq!(running.frames_read(), 2);
    assert_eq!(running.last_frame().text(), "Hello Arduino 42");
}
