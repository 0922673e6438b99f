//! End-to-end checks of the byte-stream → frame → typed-event pipeline.

use feedflow_link::{FrameReader, MockTransport};
use feedflow_types::ParsedFrame;

async fn run_pipeline(bytes: &[u8]) -> Vec<ParsedFrame> {
    let transport = MockTransport::new();
    transport.push_bytes(bytes);
    transport.push_eof();

    let mut reader = FrameReader::new(transport);
    let mut parsed = Vec::new();
    while let Some(frame) = reader.next_frame().await.unwrap() {
        parsed.push(ParsedFrame::classify(&frame));
    }
    parsed
}

#[tokio::test]
async fn mixed_stream_decodes_in_order() {
    let parsed = run_pipeline(b"26.5,42.0,90,1\nFEEDING_DONE\ngarbage\n27.0,41.5,90,0\n").await;

    assert_eq!(parsed.len(), 4);
    match &parsed[0] {
        ParsedFrame::Reading(r) => {
            assert!((r.temperature_c - 26.5).abs() < f64::EPSILON);
            assert!((r.weight_kg - 42.0).abs() < f64::EPSILON);
            assert_eq!(r.servo_position, 90);
            assert!(r.feeding_active);
        }
        other => panic!("expected reading, got {other:?}"),
    }
    match &parsed[1] {
        ParsedFrame::Status(s) => assert_eq!(s.code, "FEEDING_DONE"),
        other => panic!("expected status, got {other:?}"),
    }
    // "garbage" has no comma, so it classifies as an (unknown) status
    // token rather than a failed telemetry frame.
    match &parsed[2] {
        ParsedFrame::Status(s) => assert_eq!(s.code, "garbage"),
        other => panic!("expected status, got {other:?}"),
    }
    match &parsed[3] {
        ParsedFrame::Reading(r) => {
            assert!((r.temperature_c - 27.0).abs() < f64::EPSILON);
            assert!(!r.feeding_active);
        }
        other => panic!("expected reading, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_telemetry_does_not_block_later_frames() {
    let parsed = run_pipeline(b"26.5,42.0\nnot,a,number,here\n26.5,42.0,90,1,extra\n27.0,41.5,90,0\n").await;

    assert_eq!(parsed.len(), 4);
    assert!(matches!(parsed[0], ParsedFrame::Unparseable));
    assert!(matches!(parsed[1], ParsedFrame::Unparseable));
    assert!(matches!(parsed[2], ParsedFrame::Unparseable));
    assert!(matches!(parsed[3], ParsedFrame::Reading(_)));
}

#[tokio::test]
async fn chunk_boundaries_are_invisible_to_the_parser() {
    let transport = MockTransport::new();
    // One frame delivered a byte at a time.
    for byte in b"26.5,42.0,90,1\n" {
        transport.push_bytes(&[*byte]);
    }
    transport.push_eof();

    let mut reader = FrameReader::new(transport);
    let frame = reader.next_frame().await.unwrap().unwrap();
    assert!(matches!(
        ParsedFrame::classify(&frame),
        ParsedFrame::Reading(_)
    ));
    assert!(reader.next_frame().await.unwrap().is_none());
}
