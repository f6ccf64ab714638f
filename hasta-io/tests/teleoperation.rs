//! End-to-end tests over the public API with a simulated hand

use approx::assert_abs_diff_eq;
use hasta_io::control::{
    spawn_tracker_thread, ControlCycle, CycleConfig, JsonLinesSource, PoseSlot, RecordingSink,
    SlotSource,
};
use hasta_io::pose::{Handedness, Landmark, LandmarkSet, PoseMapper, TrackerFrame};
use hasta_io::protocol::constants::{
    CHANNEL_COUNT, FIXED_POINT_MAX, FIXED_POINT_RANGE, FULL_PAYLOAD_LEN, OFFSET_TOUCH,
    POSITION_STRIDE, SHORT_PAYLOAD_LEN, TOUCH_PAIR_COUNT, TOUCH_PAIR_LEN,
};
use hasta_io::protocol::reply::{pack_touch_pair, unpack_touch_pair};
use hasta_io::protocol::{decode_payload, read_reply, ReplyFormat, TxFrame};
use hasta_io::transport::MockTransport;
use hasta_io::{AppConfig, CommandVector, NoReplyReason, Reply};
use std::io::Cursor;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

const RESOLUTION: f64 = FIXED_POINT_RANGE / FIXED_POINT_MAX;

/// Simulated hand: reports the commanded positions and fixed touch readings
fn simulated_hand(transport: &MockTransport) {
    transport.set_responder(|frame| {
        let mut payload = [0u8; FULL_PAYLOAD_LEN];
        for channel in 0..CHANNEL_COUNT {
            let src = 2 + channel * 2;
            let dst = channel * POSITION_STRIDE;
            payload[dst..dst + 2].copy_from_slice(&frame[src..src + 2]);
        }
        for pair in 0..TOUCH_PAIR_COUNT {
            let offset = OFFSET_TOUCH + pair * TOUCH_PAIR_LEN;
            let packed = pack_touch_pair(pair as u16 * 100, 4095 - pair as u16);
            payload[offset..offset + TOUCH_PAIR_LEN].copy_from_slice(&packed);
        }
        let mut reply = vec![0x01];
        reply.extend_from_slice(&payload);
        reply
    });
}

fn fast_config() -> CycleConfig {
    CycleConfig {
        read_timeout: Duration::from_millis(5),
        ..CycleConfig::default()
    }
}

/// Hand at unit scale with the index tip `index_reach` from the wrist
fn pose(index_reach: f64) -> LandmarkSet {
    let mut points = vec![Landmark::new(0.0, 0.0); 21];
    points[5] = Landmark::new(1.0, 0.0);
    points[9] = Landmark::new(0.0, 1.0);
    points[13] = Landmark::new(1.0, 0.0);
    points[17] = Landmark::new(0.0, 1.0);
    points[8] = Landmark::new(index_reach, 0.0);
    LandmarkSet::new(&points).unwrap()
}

#[test]
fn test_encode_decode_round_trip() {
    let commands = [
        CommandVector::uniform(0.0),
        CommandVector::uniform(100.0),
        CommandVector::idle(),
        CommandVector::new([0.1, 12.34, 50.0, 77.7, 99.99, 3.3]),
        CommandVector::new([64.0, 1.0, 33.333, 0.004, 42.0, 88.8]),
    ];

    for command in &commands {
        let frame = TxFrame::encode(command);
        let bytes = frame.as_bytes();

        let mut payload = [0u8; FULL_PAYLOAD_LEN];
        for channel in 0..CHANNEL_COUNT {
            let dst = channel * POSITION_STRIDE;
            payload[dst..dst + 2].copy_from_slice(&bytes[2 + channel * 2..4 + channel * 2]);
        }

        let decoded = decode_payload(ReplyFormat::Full, &payload).unwrap();
        for channel in 0..5 {
            assert!((decoded.positions[channel] - command[channel]).abs() < RESOLUTION);
        }
        // Thumb rotation comes back sign-inverted
        assert!((decoded.positions[5] + command[5]).abs() < RESOLUTION);
    }
}

#[test]
fn test_touch_packing_round_trip() {
    for a in (0..4096u16).step_by(37).chain([4095]) {
        for b in (0..4096u16).step_by(41).chain([4095]) {
            assert_eq!(unpack_touch_pair(pack_touch_pair(a, b)), (a, b));
        }
    }
}

#[test]
fn test_reply_length_selection() {
    for header in 0..=255u8 {
        let expected = if header & 0x0F == 2 { 38 } else { 71 };
        assert_eq!(ReplyFormat::from_header(header).total_len(), expected);
    }
}

#[test]
fn test_all_zero_full_reply() {
    let mut transport = MockTransport::new();
    transport.inject_read(&[0u8; 71]);

    let reply = read_reply(&mut transport, Duration::from_millis(5)).unwrap();
    let frame = reply.telemetry().unwrap();
    assert!(frame.positions.iter().all(|&p| p == 0.0));
    assert!(frame.touch.iter().all(|&t| t == 0));
    // Real zeros are telemetry, not silence
    assert!(!reply.is_no_reply());
}

#[test]
fn test_truncated_reply_is_not_decoded() {
    let mut transport = MockTransport::new();
    let mut bytes = vec![0x01];
    bytes.extend_from_slice(&[0x7F; 10]);
    transport.inject_read(&bytes);

    let reply = read_reply(&mut transport, Duration::from_millis(5)).unwrap();
    assert_eq!(
        reply,
        Reply::NoReply(NoReplyReason::ShortRead {
            expected: 70,
            received: 10
        })
    );
    assert!(reply.into_frame_or_zeroed().is_all_zero());
}

#[test]
fn test_short_reply_read_from_transport() {
    let mut transport = MockTransport::new();
    let mut payload = [0u8; SHORT_PAYLOAD_LEN];
    payload[0..2].copy_from_slice(&3277i16.to_le_bytes());
    transport.inject_read(&[0x02]);
    transport.inject_read(&payload);
    transport.inject_read(&[0xEE, 0xEE, 0xEE]);

    let reply = read_reply(&mut transport, Duration::from_millis(5)).unwrap();
    let frame = reply.telemetry().unwrap();
    assert_abs_diff_eq!(frame.positions[0], 15.0, epsilon = RESOLUTION);
    assert!(frame.touch.iter().all(|&t| t == 0));

    // Exactly 38 bytes consumed
    assert_eq!(transport.pending_read(), 3);
}

#[test]
fn test_session_survives_non_utf8_tracker_line() {
    let left = serde_json::to_string(&TrackerFrame::single(Handedness::Left, pose(1.0))).unwrap();
    let mut input = Vec::new();
    input.extend_from_slice(b"{}\n\xff\xfe garbage\n");
    input.extend_from_slice(left.as_bytes());
    input.extend_from_slice(b"\n{}\n");

    let transport = MockTransport::new();
    simulated_hand(&transport);
    let mut cycle = ControlCycle::new(transport, PoseMapper::default(), fast_config());
    let mut sink = RecordingSink::default();
    let running = AtomicBool::new(true);

    let stats = cycle
        .run(&mut JsonLinesSource::new(Cursor::new(input)), &mut sink, &running, None)
        .unwrap();
    assert_eq!(stats.cycles, 4);
    assert_eq!(stats.mapped_commands, 1);
    assert_eq!(sink.replies.len(), 4);
}

#[test]
fn test_index_scenario_through_the_cycle() {
    let transport = MockTransport::new();
    simulated_hand(&transport);
    let mut cycle = ControlCycle::new(transport.clone(), PoseMapper::default(), fast_config());

    let outcome = cycle
        .run_once(Some(&TrackerFrame::single(Handedness::Left, pose(1.0))))
        .unwrap();
    assert_abs_diff_eq!(outcome.command[0], 90.0, epsilon = 1e-9);

    let telemetry = outcome.reply.telemetry().unwrap();
    assert_abs_diff_eq!(telemetry.positions[0], 90.0, epsilon = RESOLUTION);
    assert_eq!(telemetry.touch[0], 0);
    assert_eq!(telemetry.touch[1], 4095);
    assert_eq!(telemetry.touch[28], 1400);
    assert_eq!(telemetry.touch[29], 4081);
}

#[test]
fn test_json_lines_session() {
    let points = |reach: f64| {
        let set = pose(reach);
        serde_json::to_string(&set).unwrap()
    };
    let input = format!(
        "{{\"hands\":[{{\"handedness\":\"Left\",\"landmarks\":{}}}]}}\n\
         \n\
         {{\"hands\":[{{\"handedness\":\"Right\",\"landmarks\":{}}}]}}\n\
         not json\n\
         {{\"hands\":[{{\"handedness\":\"Left\",\"landmarks\":{}}}]}}\n",
        points(1.0),
        points(1.9),
        points(1.4)
    );

    let transport = MockTransport::new();
    simulated_hand(&transport);
    let mut cycle = ControlCycle::from_config(transport.clone(), &AppConfig::default()).unwrap();

    let mut source = JsonLinesSource::new(Cursor::new(input));
    let mut sink = RecordingSink::default();
    let running = AtomicBool::new(true);
    let stats = cycle.run(&mut source, &mut sink, &running, None).unwrap();

    // Malformed line still costs a cycle, holding the command
    assert_eq!(stats.cycles, 5);
    assert_eq!(stats.mapped_commands, 2);
    assert_eq!(stats.held_commands, 3);

    let index: Vec<f64> = sink
        .replies
        .iter()
        .map(|r| r.telemetry().unwrap().positions[0])
        .collect();
    for (reported, expected) in index.iter().zip([90.0, 90.0, 90.0, 90.0, 50.0]) {
        assert_abs_diff_eq!(*reported, expected, epsilon = RESOLUTION);
    }
}

#[test]
fn test_threaded_tracker_handoff() {
    let frames: Vec<TrackerFrame> = [1.0, 1.2, 1.4]
        .iter()
        .map(|&reach| TrackerFrame::single(Handedness::Left, pose(reach)))
        .collect();
    let input: String = frames
        .iter()
        .map(|f| serde_json::to_string(f).unwrap() + "\n")
        .collect();

    let slot = Arc::new(PoseSlot::new());
    let running = Arc::new(AtomicBool::new(true));
    let tracker = spawn_tracker_thread(
        JsonLinesSource::new(Cursor::new(input)),
        Arc::clone(&slot),
        Arc::clone(&running),
    )
    .unwrap();
    tracker.join().unwrap();

    let transport = MockTransport::new();
    simulated_hand(&transport);
    let mut cycle = ControlCycle::new(transport, PoseMapper::default(), fast_config());
    let mut sink = RecordingSink::default();
    let stats = cycle
        .run(&mut SlotSource::new(slot), &mut sink, &running, None)
        .unwrap();

    // Only the newest pose survives the handoff
    assert_eq!(stats.cycles, 1);
    let reported = sink.replies[0].telemetry().unwrap().positions[0];
    assert_abs_diff_eq!(reported, 50.0, epsilon = RESOLUTION);
}

#[test]
fn test_unplugged_hand_keeps_cycling() {
    let transport = MockTransport::new();
    let mut cycle = ControlCycle::new(transport.clone(), PoseMapper::default(), fast_config());

    for _ in 0..3 {
        let outcome = cycle.run_once(None).unwrap();
        assert_eq!(outcome.reply, Reply::NoReply(NoReplyReason::NoHeader));
    }
    assert_eq!(cycle.stats().no_replies, 3);
    assert_eq!(transport.get_written().len(), 3 * 15);
}
