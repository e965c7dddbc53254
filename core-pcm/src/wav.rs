//! # WAVE Container Export
//!
//! Wraps interleaved 16-bit PCM in a minimal RIFF/WAVE file: a 44-byte
//! header with a single `fmt ` chunk (PCM, tag 1) followed by the `data`
//! chunk. All fields are little-endian.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec;
use crate::format::{Candidate, DecodedBuffer};

/// Size of the header written by [`make_container`].
pub const WAV_HEADER_LEN: usize = 44;

const FORMAT_TAG_PCM: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Build a WAVE file from interleaved 16-bit samples.
pub fn make_container(pcm: &[i16], channels: u16, sample_rate: u32) -> Bytes {
    let block_align = channels.saturating_mul(BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate.saturating_mul(u32::from(block_align));
    let data_len = u32::try_from(pcm.len() * 2).unwrap_or(u32::MAX);

    let mut out = BytesMut::with_capacity(WAV_HEADER_LEN + pcm.len() * 2);
    out.put_slice(b"RIFF");
    out.put_u32_le(data_len.saturating_add(36));
    out.put_slice(b"WAVE");

    out.put_slice(b"fmt ");
    out.put_u32_le(16);
    out.put_u16_le(FORMAT_TAG_PCM);
    out.put_u16_le(channels);
    out.put_u32_le(sample_rate);
    out.put_u32_le(byte_rate);
    out.put_u16_le(block_align);
    out.put_u16_le(BITS_PER_SAMPLE);

    out.put_slice(b"data");
    out.put_u32_le(data_len);
    for sample in pcm {
        out.put_i16_le(*sample);
    }
    out.freeze()
}

/// Encode a decoded buffer and wrap it in a WAVE container.
pub fn export_buffer(buffer: &DecodedBuffer, sample_rate: u32) -> Bytes {
    make_container(&codec::encode16(buffer), buffer.channel_count(), sample_rate)
}

/// Suggested download name: input stem, candidate id and `.wav`.
pub fn export_file_name(input_name: &str, candidate: &Candidate) -> String {
    let base = input_name.rsplit(['/', '\\']).next().unwrap_or(input_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    let stem = if stem.is_empty() { "decoded" } else { stem };
    format!("{}.{}.wav", stem, candidate.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::find_candidate;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
    }

    #[test]
    fn test_extreme_rate_saturates_byte_rate() {
        let wav = make_container(&[1, 2, 3, 4], 2, u32::MAX);
        assert_eq!(u32_at(&wav, 24), u32::MAX);
        assert_eq!(u32_at(&wav, 28), u32::MAX);
        assert_eq!(u16_at(&wav, 32), 4);

        let wav = make_container(&[1, 2], 2, 1_073_741_823);
        assert_eq!(u32_at(&wav, 28), 4_294_967_292);
    }

    #[test]
    fn test_header_fields() {
        let wav = make_container(&[0, 1, -1, 32767], 2, 44100);
        assert_eq!(wav.len(), 52);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 44);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 2);
        assert_eq!(u32_at(&wav, 24), 44100);
        assert_eq!(u32_at(&wav, 28), 44100 * 2 * 2);
        assert_eq!(u16_at(&wav, 32), 4);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 8);
        assert_eq!(&wav[44..], &[0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn test_empty_container_is_header_only() {
        let wav = make_container(&[], 1, 8000);
        assert_eq!(wav.len(), WAV_HEADER_LEN);
        assert_eq!(u32_at(&wav, 4), 36);
        assert_eq!(u32_at(&wav, 40), 0);
    }

    #[test]
    fn test_export_file_name() {
        let candidate = find_candidate("s16le-1ch").unwrap();
        assert_eq!(export_file_name("capture.raw", &candidate), "capture.s16le-1ch.wav");
        assert_eq!(export_file_name("/tmp/a.b.pcm", &candidate), "a.b.s16le-1ch.wav");
        assert_eq!(export_file_name("noext", &candidate), "noext.s16le-1ch.wav");
    }
}
