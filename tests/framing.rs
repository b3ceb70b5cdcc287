use crate::common::{parse_frames, RecordingTransport};
use bytes::Bytes;
use futures::executor::block_on;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use ws_frame_sender::{
    completion, ControlOptions, MessageState, SendOptions, WsConfig, WsSendError, WsSender,
};

mod common;

fn sender(config: WsConfig) -> WsSender<RecordingTransport> {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init();
    WsSender::with_rng(RecordingTransport::default(), config, StdRng::seed_from_u64(42))
}

#[test]
fn payload_length_encoding() {
    for (len, marker, head_len) in [
        (0usize, 0u8, 2usize),
        (1, 1, 2),
        (125, 125, 2),
        (126, 126, 4),
        (65535, 126, 4),
        (65536, 127, 10),
    ] {
        let mut sender = sender(WsConfig::server());
        sender.send(vec![0x61u8; len], SendOptions::new().binary(true));
        block_on(sender.flush());
        let bytes = sender.get_ref().bytes();
        assert_eq!(bytes.len(), head_len + len, "len {}", len);
        let frames = parse_frames(&bytes);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len_marker, marker, "len {}", len);
        assert_eq!(frames[0].payload.len(), len);
    }
}

#[test]
fn masking_round_trips() {
    let original: Vec<u8> = (0..70_000u32).map(|i| (i % 253) as u8).collect();
    for len in [0, 1, 5, 125, 126, 40_000, 70_000] {
        let mut sender = sender(WsConfig::client());
        sender.send(original[..len].to_vec(), SendOptions::new().binary(true));
        block_on(sender.flush());
        let frames = parse_frames(&sender.get_ref().bytes());
        assert!(frames[0].mask.is_some());
        assert_eq!(frames[0].payload, &original[..len], "len {}", len);
    }
}

#[test]
fn empty_masked_frame_has_zero_key() {
    let mut sender = sender(WsConfig::client());
    sender.ping(Vec::new(), ControlOptions::new()).unwrap();
    block_on(sender.flush());
    assert_eq!(sender.get_ref().writes, [vec![0x89, 0x80, 0, 0, 0, 0]]);
}

#[test]
fn per_send_mask_override() {
    let mut sender = sender(WsConfig::server());
    sender.send("a", SendOptions::new().mask(true));
    sender.send("b", SendOptions::new());
    block_on(sender.flush());
    let frames = parse_frames(&sender.get_ref().bytes());
    assert!(frames[0].mask.is_some());
    assert!(frames[1].mask.is_none());
}

#[test]
fn fragmented_message_opcodes() {
    for binary in [false, true] {
        let mut sender = sender(WsConfig::client());
        for i in 0..5 {
            sender.send(
                vec![i as u8; 10],
                SendOptions::new().fin(i == 4).binary(binary),
            );
            if i == 2 {
                sender.pong("keepalive", ControlOptions::new()).unwrap();
            }
        }
        assert_eq!(sender.message_state(), MessageState::MessageStart);
        block_on(sender.flush());
        let frames = parse_frames(&sender.get_ref().bytes());
        let opcodes: Vec<u8> = frames.iter().map(|frame| frame.opcode).collect();
        let first = if binary { 2 } else { 1 };
        assert_eq!(opcodes, [first, 0, 0, 0xA, 0, 0]);
        let fins: Vec<bool> = frames.iter().map(|frame| frame.fin).collect();
        assert_eq!(fins, [false, false, false, true, false, true]);
        assert_eq!(frames[3].payload, b"keepalive");
    }
}

#[test]
fn close_frames() {
    let mut sender = sender(WsConfig::server());
    assert!(matches!(
        sender.close(Some(999), Some("bye"), ControlOptions::new()),
        Err(WsSendError::InvalidCloseCode(999))
    ));
    assert!(matches!(
        sender.close(Some(1005), None, ControlOptions::new()),
        Err(WsSendError::InvalidCloseCode(1005))
    ));
    sender
        .close(Some(1000), Some("bye"), ControlOptions::new())
        .unwrap();
    sender.close(Some(4000), None, ControlOptions::new()).unwrap();
    block_on(sender.flush());
    let frames = parse_frames(&sender.get_ref().bytes());
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].opcode, 0x8);
    assert!(frames[0].fin);
    assert_eq!(frames[0].payload, [0x03, 0xE8, b'b', b'y', b'e']);
    assert_eq!(frames[1].payload, [0x0F, 0xA0]);
}

#[test]
fn write_counts() {
    let mut sender = sender(WsConfig::client());
    sender.send(vec![1u8; 100], SendOptions::new());
    sender.send(vec![1u8; 40_000], SendOptions::new());
    sender.send(Bytes::from(vec![1u8; 40_000]), SendOptions::new());
    sender.send(
        Bytes::from(vec![1u8; 40_000]),
        SendOptions::new().mask(false),
    );
    block_on(sender.flush());
    let lens: Vec<usize> = sender.get_ref().writes.iter().map(Vec::len).collect();
    assert_eq!(lens, [106, 8, 40_000, 40_008, 4, 40_000]);
}

#[test]
fn transport_failure_reporting() {
    let mut sender = sender(WsConfig::server());
    sender.get_mut().fail_after = Some(1);
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = observed.clone();
    sender.on_error(move |err| sink.lock().unwrap().push(err));

    let (first, mut first_result) = completion();
    let (second, mut second_result) = completion();
    sender.send("ok", SendOptions::new().on_complete(first));
    sender.send("lost", SendOptions::new().on_complete(second));
    sender.send("unobserved", SendOptions::new());
    block_on(sender.flush());

    assert!(matches!(first_result.try_recv(), Ok(Some(Ok(())))));
    match second_result.try_recv() {
        Ok(Some(Err(WsSendError::Transport(err)))) => {
            assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset)
        }
        other => panic!("unexpected result: {:?}", other),
    }
    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 1);
    match &observed[0] {
        WsSendError::Transport(err) => assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe),
        err => panic!("unexpected error: {}", err),
    }
    assert_eq!(sender.get_ref().writes.len(), 1);
}

#[test]
fn sends_after_failure_fail() {
    let mut sender = sender(WsConfig::server());
    sender.get_mut().fail_after = Some(0);
    sender.send("a", SendOptions::new());
    block_on(sender.flush());
    assert!(sender.is_failed());

    let (done, mut result) = completion();
    sender.ping("b", ControlOptions::new().on_complete(done)).unwrap();
    block_on(sender.flush());
    assert!(matches!(
        result.try_recv(),
        Ok(Some(Err(WsSendError::Transport(_))))
    ));
    assert_eq!(sender.pending(), 0);
}
