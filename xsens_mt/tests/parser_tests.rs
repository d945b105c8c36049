use rand::{rngs::StdRng, Rng, SeedableRng};
use xsens_mt::{Assembler, FrameEvent, ParserError, MAX_PAYLOAD_LEN, MT_BUS_ID, MT_PREAMBLE};

fn encode(message_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![MT_PREAMBLE, MT_BUS_ID, message_id, payload.len() as u8];
    out.extend_from_slice(payload);
    let sum: u8 = out[1..].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    out.push(0u8.wrapping_sub(sum));
    out
}

fn feed_all(asm: &mut Assembler, bytes: &[u8]) -> Vec<(u8, Vec<u8>)> {
    let mut frames = vec![];
    for b in bytes {
        if let Some(frame) = asm.feed(*b) {
            frames.push((frame.message_id(), frame.payload().to_vec()));
        }
    }
    frames
}

#[test]
fn test_byte_by_byte_completes_on_checksum() {
    let bytes = encode(0x32, &[1, 2, 3, 4]);
    let mut asm = Assembler::new();
    for b in &bytes[..bytes.len() - 1] {
        assert!(asm.feed(*b).is_none());
    }
    let frame = asm.feed(bytes[bytes.len() - 1]).unwrap();
    assert_eq!(frame.message_id(), 0x32);
    assert_eq!(frame.payload(), &[1, 2, 3, 4]);
}

#[test]
fn test_back_to_back_frames() {
    let mut bytes = encode(0x32, &[1]);
    bytes.extend_from_slice(&encode(0xa7, &[0]));
    bytes.extend_from_slice(&encode(0x30, &[]));
    let mut asm = Assembler::new();
    let frames = feed_all(&mut asm, &bytes);
    assert_eq!(
        frames,
        vec![(0x32, vec![1]), (0xa7, vec![0]), (0x30, vec![])]
    );
    assert_eq!(asm.discarded_frames(), 0);
}

#[test]
fn test_garbage_between_frames_is_skipped() {
    let mut bytes = vec![0x00, 0x13, 0x37, 0xb5, 0x62];
    bytes.extend_from_slice(&encode(0x32, &[42]));
    bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    bytes.extend_from_slice(&encode(0x32, &[43]));
    let mut asm = Assembler::new();
    let frames = feed_all(&mut asm, &bytes);
    assert_eq!(frames, vec![(0x32, vec![42]), (0x32, vec![43])]);
}

#[test]
fn test_every_single_byte_flip_is_rejected() {
    let good = encode(0x32, &[10, 20, 30, 40, 50]);
    for i in 0..good.len() {
        let mut bad = good.clone();
        bad[i] ^= 0x01;
        let mut asm = Assembler::new();
        let frames = feed_all(&mut asm, &bad);
        assert_eq!(frames, vec![], "flip at offset {} was accepted", i);
        // A long quiet gap drains any partial state, then a pristine
        // frame must go through.
        feed_all(&mut asm, &[0u8; 300]);
        let frames = feed_all(&mut asm, &good);
        assert_eq!(frames, vec![(0x32, vec![10, 20, 30, 40, 50])]);
    }
}

#[test]
fn test_truncated_frame_then_good_frame() {
    let good = encode(0x32, &[7, 8, 9]);
    let mut bytes = good[..4].to_vec();
    bytes.extend_from_slice(&[0u8; 300]);
    bytes.extend_from_slice(&good);
    let mut asm = Assembler::new();
    let frames = feed_all(&mut asm, &bytes);
    assert_eq!(frames, vec![(0x32, vec![7, 8, 9])]);
}

#[test]
fn test_random_stream_never_panics_and_recovers() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut asm = Assembler::new();
    for _ in 0..10_000 {
        let _ = asm.feed(rng.gen());
    }
    feed_all(&mut asm, &[0u8; 300]);
    let payload: Vec<u8> = (0..MAX_PAYLOAD_LEN).map(|i| i as u8).collect();
    let frames = feed_all(&mut asm, &encode(0x32, &payload));
    assert_eq!(frames, vec![(0x32, payload)]);
}

#[test]
fn test_advance_reports_checksum_residue() {
    let mut bad = encode(0x32, &[1, 2]);
    let n = bad.len();
    bad[n - 1] = bad[n - 1].wrapping_add(1);
    let mut asm = Assembler::new();
    let mut discards = vec![];
    for b in &bad {
        if let FrameEvent::Discarded(err) = asm.advance(*b) {
            discards.push(err);
        }
    }
    assert_eq!(discards, vec![ParserError::InvalidChecksum { got: 1 }]);
    assert_eq!(asm.discarded_frames(), 1);
}
