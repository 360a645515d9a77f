//! Property tests for the frame codec

use appsbee_protocol::frame::{FrameDecoder, FrameError, MAX_DATA_LEN};
use appsbee_protocol::{dispatch, DeviceId, Frame, Payload, FRAME_START};
use proptest::prelude::*;

fn device_id() -> impl Strategy<Value = DeviceId> {
    (-1i16..=2047).prop_map(|id| DeviceId::new(id).unwrap())
}

fn frame() -> impl Strategy<Value = Frame> {
    (
        any::<u8>(),
        device_id(),
        prop::collection::vec(any::<u8>(), 0..=MAX_DATA_LEN),
    )
        .prop_map(|(tag, source, data)| Frame::new(tag, source, &data).unwrap())
}

fn noise() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("not a preamble", |b| *b != FRAME_START), 0..64)
}

/// Feed every byte, collecting decoded frames and rejections
fn decode_all(decoder: &mut FrameDecoder, bytes: &[u8]) -> (Vec<Frame>, Vec<FrameError>) {
    let mut frames = Vec::new();
    let mut errors = Vec::new();
    for &byte in bytes {
        match decoder.feed(byte) {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }
    (frames, errors)
}

proptest! {
    #[test]
    fn roundtrip(original in frame()) {
        let encoded = original.encode_to_vec().unwrap();
        let mut decoder = FrameDecoder::new();
        let (frames, errors) = decode_all(&mut decoder, &encoded);

        prop_assert!(errors.is_empty());
        prop_assert_eq!(frames, vec![original]);
        prop_assert!(decoder.is_idle());
    }

    #[test]
    fn flipped_byte_is_rejected(
        original in frame(),
        index in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let mut encoded = original.encode_to_vec().unwrap();
        // Tag, source, data or checksum; never the preamble or length
        let i = 2 + index.index(encoded.len() - 2);
        encoded[i] ^= mask;

        let mut decoder = FrameDecoder::new();
        prop_assert_eq!(decoder.feed_bytes(&encoded), Err(FrameError::InvalidChecksum));
        prop_assert!(decoder.is_idle());
    }

    #[test]
    fn noise_then_frame_yields_one_frame(prefix in noise(), original in frame()) {
        let mut bytes = prefix;
        bytes.extend_from_slice(&original.encode_to_vec().unwrap());

        let mut decoder = FrameDecoder::new();
        let (frames, errors) = decode_all(&mut decoder, &bytes);

        prop_assert!(errors.is_empty());
        prop_assert_eq!(frames, vec![original]);
    }

    #[test]
    fn decoder_recovers_after_any_frame(
        first in frame(),
        corrupt in any::<bool>(),
        second in frame(),
    ) {
        let mut bytes = first.encode_to_vec().unwrap().to_vec();
        if corrupt {
            let last = bytes.len() - 1;
            bytes[last] = bytes[last].wrapping_add(1);
        }
        bytes.extend_from_slice(&second.encode_to_vec().unwrap());

        let mut decoder = FrameDecoder::new();
        let (frames, errors) = decode_all(&mut decoder, &bytes);

        if corrupt {
            prop_assert_eq!(errors, vec![FrameError::InvalidChecksum]);
            prop_assert_eq!(frames, vec![second]);
        } else {
            prop_assert!(errors.is_empty());
            prop_assert_eq!(frames, vec![first, second]);
        }
    }

    #[test]
    fn int_payload_roundtrip(value in any::<i16>(), source in device_id()) {
        let frame = Payload::Int(value).to_frame(source).unwrap();
        let encoded = frame.encode_to_vec().unwrap();
        let decoded = FrameDecoder::new().feed_bytes(&encoded).unwrap().unwrap();

        prop_assert_eq!(decoded.source, source);
        prop_assert_eq!(dispatch(&decoded), Ok(Payload::Int(value)));
    }

    #[test]
    fn text_payload_roundtrip(text in "[ -~]{0,248}", source in device_id()) {
        let payload = Payload::text(&text).unwrap();
        let frame = payload.to_frame(source).unwrap();
        let encoded = frame.encode_to_vec().unwrap();
        let decoded = FrameDecoder::new().feed_bytes(&encoded).unwrap().unwrap();

        prop_assert_eq!(dispatch(&decoded), Ok(payload));
    }
}

#[test]
fn zero_length_data_roundtrip() {
    let original = Frame::new(0x06, DeviceId::new(17).unwrap(), &[]).unwrap();
    let encoded = original.encode_to_vec().unwrap();
    assert_eq!(encoded[1], 3);

    let decoded = FrameDecoder::new().feed_bytes(&encoded).unwrap().unwrap();
    assert_eq!(decoded, original);
    assert!(decoded.data.is_empty());
}

#[test]
fn addressed_frame_decodes_past_header() {
    // The destination header is stripped by the module, but a receiver that
    // sees it anyway resyncs on the preamble.
    let original = Frame::new(0x08, DeviceId::new(5).unwrap(), &[0x2A, 0x00]).unwrap();
    let bytes = original
        .encode_addressed_to_vec(appsbee_protocol::DestinationHeader::new(0x0102))
        .unwrap();

    let decoded = FrameDecoder::new().feed_bytes(&bytes).unwrap().unwrap();
    assert_eq!(dispatch(&decoded), Ok(Payload::Int(42)));
}
