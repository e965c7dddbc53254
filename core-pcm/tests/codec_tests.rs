use core_pcm::candidates::INTERLEAVED_ENCODINGS;
use core_pcm::codec::{self, g711};
use core_pcm::format::{DecodedBuffer, Encoding, FormatDescriptor};
use core_pcm::PcmError;

#[test]
fn test_s16le_round_trip_reconstructs_bytes() {
    let mut bytes = Vec::new();
    for value in [0i16, 1, -1, 32767, -32768, 12345, -23456, 256] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }

    for channels in [1u16, 2] {
        let format = FormatDescriptor::new(Encoding::Signed16Le, channels);
        let decoded = codec::decode(&bytes, &format, None).unwrap();
        let encoded = codec::encode16(&decoded);
        assert_eq!(codec::pcm16_to_le_bytes(&encoded), bytes);
    }
}

#[test]
fn test_silent_source_decodes_to_zero() {
    for encoding in INTERLEAVED_ENCODINGS {
        let format = FormatDescriptor::mono(encoding);
        let sample_bytes = format.bytes_per_sample().unwrap();
        let silent: Vec<u8> = match encoding {
            Encoding::Unsigned8 => vec![0x80; 16],
            Encoding::MuLaw => vec![0xFF; 16],
            Encoding::ALaw => vec![0xD5; 16],
            _ => vec![0x00; 16 * sample_bytes],
        };

        let decoded = codec::decode(&silent, &format, None).unwrap();
        assert_eq!(decoded.frames(), 16, "{}", encoding);
        for sample in decoded.channel(0).unwrap() {
            assert!(sample.abs() < 1e-3, "{} produced {}", encoding, sample);
        }
    }
}

#[test]
fn test_unsigned8_reference_points() {
    let decoded = codec::decode(&[128, 0, 255], &FormatDescriptor::mono(Encoding::Unsigned8), None)
        .unwrap();
    let samples = decoded.channel(0).unwrap();
    assert_eq!(samples[0], 0.0);
    assert_eq!(samples[1], -1.0);
    assert!((samples[2] - 0.992).abs() < 1e-3);
}

#[test]
fn test_companded_silence_matches_g711_tables() {
    assert_eq!(g711::ulaw_to_linear(0xFF), 0);
    assert_eq!(g711::alaw_to_linear(0xD5), 8);

    let mulaw = codec::decode(&[0xFF, 0x80], &FormatDescriptor::mono(Encoding::MuLaw), None)
        .unwrap();
    assert_eq!(mulaw.channel(0).unwrap()[0], 0.0);
    assert!((mulaw.channel(0).unwrap()[1] - 32124.0 / 32768.0).abs() < 1e-6);

    let alaw = codec::decode(&[0xD5], &FormatDescriptor::mono(Encoding::ALaw), None).unwrap();
    assert_eq!(alaw.channel(0).unwrap()[0], 8.0 / 32768.0);
}

#[test]
fn test_stereo_deinterleave() {
    let bytes = [0x00, 0x40, 0x00, 0xC0, 0x00, 0x20, 0x00, 0xE0];
    let decoded = codec::decode(&bytes, &FormatDescriptor::stereo(Encoding::Signed16Le), None)
        .unwrap();
    assert_eq!(decoded.channel(0), Some(&[0.5, 0.25][..]));
    assert_eq!(decoded.channel(1), Some(&[-0.5, -0.25][..]));
    assert_eq!(codec::downmix(&decoded), vec![0.0, 0.0]);
}

#[test]
fn test_big_endian_differs_from_little_endian() {
    let bytes = [0x7F, 0x00];
    let le = codec::decode(&bytes, &FormatDescriptor::mono(Encoding::Signed16Le), None).unwrap();
    let be = codec::decode(&bytes, &FormatDescriptor::mono(Encoding::Signed16Be), None).unwrap();
    assert_eq!(le.channel(0).unwrap()[0], 127.0 / 32768.0);
    assert_eq!(be.channel(0).unwrap()[0], 32512.0 / 32768.0);
}

#[test]
fn test_adpcm_needs_routing() {
    for encoding in [Encoding::OkiAdpcm, Encoding::G726Adpcm] {
        let result = codec::decode(&[0u8; 32], &FormatDescriptor::mono(encoding), None);
        assert!(matches!(result, Err(PcmError::UnsupportedFormat(_))));
    }
}

#[test]
fn test_encode16_interleaves_channels() {
    let buffer = DecodedBuffer::from_channels(vec![vec![0.5, -0.5], vec![-1.0, 1.0]]).unwrap();
    assert_eq!(codec::encode16(&buffer), vec![16384, -32768, -16384, 32767]);
}
