//! Discovery state machine and steady-state pin I/O.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use tracing::{debug, warn};

use pinio_protocol::command;
use pinio_protocol::{
    parse_analog_mapping, parse_capabilities, DigitalValue, PinMode, PinRecord, PinSnapshot,
    StreamingReport, StreamingReportDecoder, SysexAccumulator,
};

use crate::error::{Error, Result};
use crate::event::{EngineEvent, EventReceiver};
use crate::timeout::QueryTimeout;
use crate::transport::PinIoTransport;

/// The firmware answers a capability query within this budget or the engine
/// assumes the default pin layout.
const CAPABILITY_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Minimum spacing between analog/PWM writes, shared across all pins.
const PWM_SEND_INTERVAL: Duration = Duration::from_millis(50);

const DEFAULT_EVENT_CAPACITY: usize = 32;

// Synthetic layout used when discovery fails: the classic 20-pin Arduino
// shape the original app assumes for an unresponsive peripheral.
const DEFAULT_PIN_COUNT: i32 = 20;
const FIRST_DIGITAL_PIN: i32 = 3;
const LAST_DIGITAL_PIN: i32 = 8;
const FIRST_ANALOG_PIN: i32 = 14;
const LAST_ANALOG_PIN: i32 = 19;

/// Phase of the capability discovery handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryPhase {
    /// Steady state: inbound bytes are streaming reports, outbound calls are
    /// pin writes.
    Idle,
    /// Waiting for the capability response.
    QueryingCapabilities,
    /// Waiting for the analog mapping response.
    QueryingAnalogMapping,
}

/// Configures and builds a [`PinIoEngine`].
pub struct PinIoEngineBuilder {
    transport: Arc<dyn PinIoTransport>,
    query_timeout: Duration,
    event_capacity: usize,
}

impl PinIoEngineBuilder {
    /// Override the capability query timeout (default 5 s). Tests shrink
    /// this so the abort path runs without real waiting.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Capacity of the bounded event channel (default 32). Events beyond
    /// capacity are dropped with a debug log.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn build(self) -> PinIoEngine {
        let (events_tx, events_rx) = bounded(self.event_capacity);
        let snapshot = Arc::new(ArcSwap::from_pointee(Vec::new()));
        let shared = Arc::new(Mutex::new(EngineShared {
            transport: self.transport,
            phase: QueryPhase::Idle,
            pins: Vec::new(),
            capability_buffer: SysexAccumulator::new(),
            mapping_buffer: SysexAccumulator::new(),
            report_decoder: StreamingReportDecoder::new(),
            timeout: None,
            query_timeout: self.query_timeout,
            generation: 0,
            last_pwm_sent: None,
            events: events_tx,
            snapshot: snapshot.clone(),
        }));
        PinIoEngine {
            shared,
            snapshot,
            events: events_rx,
        }
    }
}

/// Firmata-subset pin I/O engine.
///
/// All mutable state sits behind one mutex, so API calls and transport
/// deliveries serialize onto a single logical thread of control; nothing
/// here blocks beyond that lock. [`pins`](Self::pins) reads a published
/// snapshot without locking.
pub struct PinIoEngine {
    shared: Arc<Mutex<EngineShared>>,
    snapshot: Arc<ArcSwap<Vec<PinSnapshot>>>,
    events: EventReceiver,
}

impl PinIoEngine {
    pub fn builder(transport: Arc<dyn PinIoTransport>) -> PinIoEngineBuilder {
        PinIoEngineBuilder {
            transport,
            query_timeout: CAPABILITY_QUERY_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Engine event stream (query completion, pin state changes).
    pub fn events(&self) -> &EventReceiver {
        &self.events
    }

    /// Read-only snapshot of the pin table.
    pub fn pins(&self) -> Arc<Vec<PinSnapshot>> {
        self.snapshot.load_full()
    }

    pub fn digital_pin_count(&self) -> usize {
        self.pins().iter().filter(|p| p.is_digital).count()
    }

    pub fn analog_pin_count(&self) -> usize {
        self.pins().iter().filter(|p| p.is_analog).count()
    }

    pub fn phase(&self) -> QueryPhase {
        self.shared.lock().phase
    }

    pub fn is_querying(&self) -> bool {
        self.phase() != QueryPhase::Idle
    }

    /// Clear the pin table and reset the firmware protocol state. Any query
    /// in flight is abandoned without an event.
    pub fn reset(&self) {
        let mut shared = self.shared.lock();
        if let Some(timeout) = shared.timeout.take() {
            timeout.cancel();
        }
        shared.generation += 1;
        shared.phase = QueryPhase::Idle;
        shared.pins.clear();
        shared.capability_buffer.clear();
        shared.mapping_buffer.clear();
        shared.publish_snapshot();
        let reset = command::system_reset();
        shared.transport.send(&reset);
    }

    /// Start a discovery cycle: send the capability query and arm the
    /// timeout. Rejected while a previous cycle is still in flight.
    pub fn query_capabilities(&self) -> Result<()> {
        let mut shared = self.shared.lock();
        if shared.phase != QueryPhase::Idle {
            return Err(Error::QueryInProgress);
        }
        debug!("starting capability query");
        shared.pins.clear();
        shared.publish_snapshot();
        shared.phase = QueryPhase::QueryingCapabilities;
        shared.capability_buffer.clear();
        shared.mapping_buffer.clear();
        shared.generation += 1;

        let query = command::capability_query();
        shared.transport.send(&query);

        let weak = Arc::downgrade(&self.shared);
        let generation = shared.generation;
        shared.timeout = Some(QueryTimeout::arm(shared.query_timeout, move || {
            handle_query_timeout(weak, generation);
        }));
        Ok(())
    }

    /// Finish the discovery cycle. Called internally on the mapping response
    /// and on timeout; exposed so a caller tearing down mid-query can force
    /// the table into a known state.
    pub fn end_pin_query(&self, abort: bool) {
        self.shared.lock().end_pin_query(abort);
    }

    /// Deliver inbound transport bytes. Routing depends on the phase:
    /// response accumulation while querying, report decoding otherwise.
    pub fn on_receive(&self, bytes: &[u8]) {
        let mut shared = self.shared.lock();
        match shared.phase {
            QueryPhase::QueryingCapabilities => {
                if shared.capability_buffer.push(bytes) {
                    debug!("capability response complete");
                    if let Some(timeout) = shared.timeout.take() {
                        timeout.cancel();
                    }
                    shared.phase = QueryPhase::QueryingAnalogMapping;
                    shared.mapping_buffer.clear();
                    let query = command::analog_mapping_query();
                    shared.transport.send(&query);
                }
            }
            QueryPhase::QueryingAnalogMapping => {
                if shared.mapping_buffer.push(bytes) {
                    debug!("analog mapping response complete");
                    shared.end_pin_query(false);
                }
            }
            QueryPhase::Idle => {
                let reports = shared.report_decoder.push(bytes);
                if reports.is_empty() {
                    return;
                }
                for report in reports {
                    shared.apply_report(report);
                }
                shared.publish_snapshot();
                shared.emit(EngineEvent::PinStateChanged);
            }
        }
    }

    /// Change a pin's operating mode. Resets the pin's values, writes the
    /// mode to the firmware, and keeps analog reporting in sync.
    pub fn set_control_mode(&self, digital_id: u8, mode: PinMode) -> Result<()> {
        let mut shared = self.shared.lock();
        let index = shared
            .index_of_digital(digital_id as i32)
            .ok_or(Error::UnknownPin(digital_id))?;
        shared.apply_control_mode(index, mode);
        shared.publish_snapshot();
        Ok(())
    }

    /// Set a digital output level. The whole 8-pin port bitmask is rebuilt
    /// from the table and written in one message.
    pub fn set_digital_value(&self, digital_id: u8, value: DigitalValue) -> Result<()> {
        let mut shared = self.shared.lock();
        let index = shared
            .index_of_digital(digital_id as i32)
            .ok_or(Error::UnknownPin(digital_id))?;
        shared.pins[index].digital_value = value;

        let port = digital_id / 8;
        let bitmask = shared.port_bitmask(port);
        let write = command::digital_port_write(port, bitmask);
        shared.transport.send(&write);
        shared.publish_snapshot();
        Ok(())
    }

    /// Write an analog/PWM value. Returns `Ok(false)` when suppressed by the
    /// shared 50 ms rate limit; nothing is stored or sent in that case.
    pub fn set_pwm_value(&self, digital_id: u8, value: u16) -> Result<bool> {
        let mut shared = self.shared.lock();
        let index = shared
            .index_of_digital(digital_id as i32)
            .ok_or(Error::UnknownPin(digital_id))?;

        let now = Instant::now();
        if let Some(last) = shared.last_pwm_sent {
            if now.duration_since(last) < PWM_SEND_INTERVAL {
                debug!(pin = digital_id, "analog write suppressed by rate limit");
                return Ok(false);
            }
        }
        shared.last_pwm_sent = Some(now);
        shared.pins[index].analog_value = value;

        let write = if digital_id > 15 {
            command::extended_analog_write(digital_id, value)
        } else {
            command::analog_write(digital_id, value)
        };
        shared.transport.send(&write);
        shared.publish_snapshot();
        Ok(true)
    }
}

/// Timer thread entry point: abort the query if this timer's discovery
/// session is still the live one.
fn handle_query_timeout(shared: Weak<Mutex<EngineShared>>, generation: u64) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut shared = shared.lock();
    if shared.generation == generation && shared.phase == QueryPhase::QueryingCapabilities {
        debug!("capability query timed out");
        shared.end_pin_query(true);
    }
}

struct EngineShared {
    transport: Arc<dyn PinIoTransport>,
    phase: QueryPhase,
    pins: Vec<PinRecord>,
    capability_buffer: SysexAccumulator,
    mapping_buffer: SysexAccumulator,
    report_decoder: StreamingReportDecoder,
    timeout: Option<QueryTimeout>,
    query_timeout: Duration,
    /// Discovery session counter; guards against a stale timer firing after
    /// its session ended.
    generation: u64,
    /// Shared (not per-pin) timestamp of the last analog/PWM write.
    last_pwm_sent: Option<Instant>,
    events: Sender<EngineEvent>,
    snapshot: Arc<ArcSwap<Vec<PinSnapshot>>>,
}

impl EngineShared {
    fn end_pin_query(&mut self, abort: bool) {
        if let Some(timeout) = self.timeout.take() {
            timeout.cancel();
        }
        self.phase = QueryPhase::Idle;

        let mut parsed = false;
        if !abort && !self.capability_buffer.is_empty() && !self.mapping_buffer.is_empty() {
            parsed = self.parse_query_responses();
        }

        let default_configuration_assumed = !parsed;
        if default_configuration_assumed {
            self.initialize_default_pins();
        }
        self.enable_read_reports();

        self.capability_buffer.clear();
        self.mapping_buffer.clear();
        self.publish_snapshot();
        self.emit(EngineEvent::QueryFinished {
            default_configuration_assumed,
        });
    }

    /// Run both parsers over the accumulated responses. Any failure leaves
    /// the table untouched for the default-layout fallback.
    fn parse_query_responses(&mut self) -> bool {
        let pins = match parse_capabilities(self.capability_buffer.as_bytes()) {
            Ok(pins) => pins,
            Err(e) => {
                warn!("invalid capability response: {e}");
                return false;
            }
        };
        let mapping = match parse_analog_mapping(self.mapping_buffer.as_bytes()) {
            Ok(mapping) => mapping,
            Err(e) => {
                warn!("invalid analog mapping response: {e}");
                return false;
            }
        };

        self.pins = pins;
        for (digital_id, analog_id) in mapping {
            match self.index_of_digital(digital_id as i32) {
                Some(index) if !self.pins[index].is_analog => {
                    warn!(
                        pin = digital_id,
                        analog_id, "mapping addresses a pin without analog capability"
                    );
                }
                Some(_) if self.index_of_analog(analog_id as i32).is_some() => {
                    warn!(pin = digital_id, analog_id, "duplicate analog id in mapping");
                }
                Some(index) => {
                    debug!(pin = digital_id, analog_id, "analog mapping");
                    self.pins[index].analog_id = analog_id as i32;
                }
                None => {
                    warn!(pin = digital_id, analog_id, "mapping addresses an unknown pin");
                }
            }
        }
        true
    }

    /// Fixed 20-pin layout assumed when discovery fails: digital ids 3..=8
    /// digital-only, 14..=19 digital+analog with analog id = id - 14.
    fn initialize_default_pins(&mut self) {
        self.pins.clear();
        for id in 0..DEFAULT_PIN_COUNT {
            if (FIRST_DIGITAL_PIN..=LAST_DIGITAL_PIN).contains(&id) {
                self.pins.push(PinRecord::new(id, true, false, false));
            } else if (FIRST_ANALOG_PIN..=LAST_ANALOG_PIN).contains(&id) {
                let mut pin = PinRecord::new(id, true, true, false);
                pin.analog_id = id - FIRST_ANALOG_PIN;
                self.pins.push(pin);
            }
        }
    }

    /// Turn on digital reporting for ports 0..=2, then push every pin's
    /// current mode to the firmware.
    fn enable_read_reports(&mut self) {
        for port in 0..3u8 {
            let enable = command::report_digital_port(port, true);
            self.transport.send(&enable);
        }
        for index in 0..self.pins.len() {
            let mode = self.pins[index].mode;
            self.apply_control_mode(index, mode);
        }
    }

    fn apply_control_mode(&mut self, index: usize, mode: PinMode) {
        let previous_mode = self.pins[index].mode;
        self.pins[index].set_mode(mode);

        let digital_id = self.pins[index].digital_id as u8;
        let set_mode = command::set_pin_mode(digital_id, mode);
        self.transport.send(&set_mode);

        if mode == PinMode::Analog {
            self.set_analog_reporting(index, true);
        } else if previous_mode == PinMode::Analog {
            self.set_analog_reporting(index, false);
        }
    }

    fn set_analog_reporting(&mut self, index: usize, enable: bool) {
        let pin = &self.pins[index];
        if pin.analog_id < 0 {
            warn!(
                pin = pin.digital_id,
                "cannot toggle analog reporting without an analog id"
            );
            return;
        }
        let report = command::report_analog_pin(pin.analog_id as u8, enable);
        self.transport.send(&report);
    }

    fn apply_report(&mut self, report: StreamingReport) {
        match report {
            StreamingReport::DigitalPort { port, bitmask } => {
                let offset = 8 * port as i32;
                for bit in 0..8 {
                    let level = ((bitmask >> bit) & 1) as u8;
                    if let Some(index) = self.index_of_digital(offset + bit) {
                        if let Some(value) = DigitalValue::from_byte(level) {
                            self.pins[index].digital_value = value;
                        }
                    }
                }
            }
            StreamingReport::AnalogValue { analog_id, value } => {
                match self.index_of_analog(analog_id as i32) {
                    Some(index) => self.pins[index].analog_value = value,
                    None => warn!(analog_id, "report for unknown analog pin id"),
                }
            }
            StreamingReport::PinState {
                digital_id,
                mode,
                digital,
                analog,
            } => {
                let Some(index) = self.index_of_digital(digital_id as i32) else {
                    warn!(pin = digital_id, "pin state response for unknown pin id");
                    return;
                };
                let Some(mode) = mode else {
                    warn!(pin = digital_id, "pin state response with unknown mode");
                    return;
                };
                self.pins[index].mode = mode;
                if mode.reports_analog_value() {
                    if let Some(value) = analog {
                        self.pins[index].analog_value = value;
                    }
                } else {
                    match digital {
                        Some(value) => self.pins[index].digital_value = value,
                        None => warn!(
                            pin = digital_id,
                            "pin state response with invalid digital value"
                        ),
                    }
                }
            }
        }
    }

    fn port_bitmask(&self, port: u8) -> u16 {
        let offset = 8 * port as i32;
        let mut bitmask = 0u16;
        for bit in 0..8 {
            if let Some(index) = self.index_of_digital(offset + bit) {
                bitmask |= (self.pins[index].digital_value.to_bit() as u16) << bit;
            }
        }
        bitmask
    }

    fn index_of_digital(&self, digital_id: i32) -> Option<usize> {
        self.pins.iter().position(|p| p.digital_id == digital_id)
    }

    fn index_of_analog(&self, analog_id: i32) -> Option<usize> {
        self.pins.iter().position(|p| p.analog_id == analog_id)
    }

    fn publish_snapshot(&self) {
        let snapshot: Vec<PinSnapshot> = self.pins.iter().map(PinSnapshot::from).collect();
        self.snapshot.store(Arc::new(snapshot));
    }

    fn emit(&self, event: EngineEvent) {
        if self.events.try_send(event).is_err() {
            debug!(?event, "event channel full, dropping event");
        }
    }
}
