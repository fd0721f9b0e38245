//! End-to-end steady-state tests: streaming report routing and outbound pin
//! writes against a discovered table.

mod helpers;

use std::time::Duration;

use helpers::MockTransport;
use pinio::prelude::*;
use std::sync::Arc;

const DIGITAL_PIN_GROUP: [u8; 4] = [0x00, 0x01, 0x01, 0x01];

/// Discover a table with the given number of plain digital pins (ids 0..n).
fn engine_with_digital_pins(count: usize) -> (PinIoEngine, Arc<MockTransport>) {
    let transport = MockTransport::new();
    let engine = PinIoEngine::builder(transport.clone()).build();
    engine.query_capabilities().unwrap();

    let mut capability = vec![0xF0, 0x6C];
    for _ in 0..count {
        capability.extend_from_slice(&DIGITAL_PIN_GROUP);
        capability.push(0x7F);
    }
    capability.push(0xF7);
    engine.on_receive(&capability);

    let mut mapping = vec![0xF0, 0x6A];
    mapping.extend(std::iter::repeat(0x7F).take(count));
    mapping.push(0xF7);
    engine.on_receive(&mapping);

    transport.clear();
    while engine.events().try_recv().is_ok() {}
    (engine, transport)
}

/// Discover the synthetic default layout by aborting the query.
fn engine_with_default_pins() -> (PinIoEngine, Arc<MockTransport>) {
    let transport = MockTransport::new();
    let engine = PinIoEngine::builder(transport.clone()).build();
    engine.query_capabilities().unwrap();
    engine.end_pin_query(true);
    transport.clear();
    while engine.events().try_recv().is_ok() {}
    (engine, transport)
}

fn pin(engine: &PinIoEngine, digital_id: i32) -> PinSnapshot {
    engine
        .pins()
        .iter()
        .find(|p| p.digital_id == digital_id)
        .cloned()
        .unwrap()
}

#[test]
fn test_digital_port_report_fans_out_to_pins() {
    let (engine, _transport) = engine_with_digital_pins(3);

    // 0x05 = 0b101: bits 0 and 2 high, bit 1 low.
    engine.on_receive(&[0x90, 0x05, 0x00]);

    assert_eq!(pin(&engine, 0).digital_value, DigitalValue::High);
    assert_eq!(pin(&engine, 1).digital_value, DigitalValue::Low);
    assert_eq!(pin(&engine, 2).digital_value, DigitalValue::High);
    assert_eq!(engine.events().try_recv(), Ok(EngineEvent::PinStateChanged));
}

#[test]
fn test_report_split_across_deliveries() {
    let (engine, _transport) = engine_with_digital_pins(3);

    engine.on_receive(&[0x90]);
    engine.on_receive(&[0x05]);
    assert!(engine.events().try_recv().is_err(), "incomplete message, no event");
    engine.on_receive(&[0x00]);

    assert_eq!(pin(&engine, 0).digital_value, DigitalValue::High);
    assert_eq!(engine.events().try_recv(), Ok(EngineEvent::PinStateChanged));
}

#[test]
fn test_analog_report_routes_by_analog_id() {
    let (engine, _transport) = engine_with_default_pins();

    // Analog id 5 belongs to digital pin 19 in the default layout.
    engine.on_receive(&[0xE5, 0x7F, 0x7F]);
    assert_eq!(pin(&engine, 19).analog_value, 16383);

    // Unknown analog id: dropped without touching the table.
    let before = engine.pins();
    engine.on_receive(&[0xEB, 0x01, 0x00]);
    // The report decoded, so an event still fires, but values are unchanged
    // except for the warning-logged drop.
    assert_eq!(*engine.pins(), *before);
}

#[test]
fn test_mode_set_pin_state_round_trip() {
    let (engine, transport) = engine_with_default_pins();

    engine.set_control_mode(7, PinMode::Pwm).unwrap();
    assert_eq!(transport.sent(), vec![vec![0xF4, 0x07, 0x03]]);

    // Firmware answers a pin state query with the same mode and a known
    // value; the engine must reproduce it exactly.
    let value: u16 = 1234;
    engine.on_receive(&[
        0xF0,
        0x6E,
        0x07,
        0x03,
        (value & 0x7F) as u8,
        (value >> 7) as u8,
        0xF7,
    ]);
    let p = pin(&engine, 7);
    assert_eq!(p.mode, PinMode::Pwm);
    assert_eq!(p.analog_value, value);
}

#[test]
fn test_pwm_boundary_pin_forms() {
    let (engine, transport) = engine_with_default_pins();

    assert_eq!(engine.set_pwm_value(15, 100), Ok(true));
    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(engine.set_pwm_value(16, 100), Ok(true));

    let sent = transport.sent();
    assert_eq!(sent[0].len(), 3, "pin 15 uses the standard form");
    assert_eq!(sent[0][0], 0xEF);
    assert_eq!(sent[1].len(), 6, "pin 16 uses the extended sysex form");
    assert_eq!(sent[1], vec![0xF0, 0x6F, 16, 100 & 0x7F, 100 >> 7, 0xF7]);
}

#[test]
fn test_pwm_rate_limit_window() {
    let (engine, transport) = engine_with_default_pins();

    assert_eq!(engine.set_pwm_value(5, 64), Ok(true));
    assert_eq!(engine.set_pwm_value(5, 65), Ok(false), "inside the 50 ms window");
    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(engine.set_pwm_value(5, 66), Ok(true));
    assert_eq!(transport.sent().len(), 2);
}

#[test]
fn test_digital_write_recomputes_shared_port() {
    let (engine, transport) = engine_with_digital_pins(8);

    engine.set_digital_value(0, DigitalValue::High).unwrap();
    engine.set_digital_value(7, DigitalValue::High).unwrap();
    engine.set_digital_value(0, DigitalValue::Low).unwrap();

    let sent = transport.sent();
    assert_eq!(sent[0], vec![0x90, 0b0000_0001, 0x00]);
    assert_eq!(sent[1], vec![0x90, 0x01, 0x01], "bit 7 carries in the high byte");
    assert_eq!(sent[2], vec![0x90, 0x00, 0x01]);
}

#[test]
fn test_unrecognized_bytes_stall_without_corruption() {
    let (engine, _transport) = engine_with_digital_pins(3);

    // A leading byte outside every report range wedges the stream; later
    // valid messages behind it are not misparsed.
    engine.on_receive(&[0x42]);
    engine.on_receive(&[0x90, 0x05, 0x00]);
    assert!(engine.events().try_recv().is_err());
    assert_eq!(pin(&engine, 0).digital_value, DigitalValue::Low);
}

#[test]
fn test_capability_flags_survive_streaming() {
    let (engine, _transport) = engine_with_default_pins();
    engine.on_receive(&[0x90, 0x7F, 0x01]);
    engine.on_receive(&[0xE0, 0x10, 0x00]);
    let p = pin(&engine, 14);
    assert!(p.is_digital && p.is_analog, "streaming never mutates capabilities");
    assert_eq!(p.analog_id, 0);
}
