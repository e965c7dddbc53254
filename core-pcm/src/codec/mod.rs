//! # Sample Codec
//!
//! Converts raw interleaved bytes into normalized per-channel floats, and
//! decoded floats back into 16-bit PCM for export.
//!
//! All decoders are pure functions of their input. Floats are normalized to
//! `[-1.0, 1.0]`; fixed-point inputs divide by the magnitude of their most
//! negative code so that the most negative sample maps exactly to `-1.0`.

pub mod g711;

use crate::error::{PcmError, Result};
use crate::format::{DecodedBuffer, Encoding, FormatDescriptor};

/// Decode `bytes` as interleaved frames of `format`.
///
/// At most `frame_limit` frames are produced; a trailing partial frame is
/// ignored. An empty or too-short input yields a buffer with zero frames.
///
/// # Errors
///
/// Returns [`PcmError::UnsupportedFormat`] for ADPCM-family encodings, which
/// need the external decoder.
///
/// # Example
///
/// ```rust
/// use core_pcm::codec;
/// use core_pcm::format::{Encoding, FormatDescriptor};
///
/// let bytes = [0x00, 0x80, 0xFF, 0x7F];
/// let buffer = codec::decode(&bytes, &FormatDescriptor::mono(Encoding::Signed16Le), None)?;
/// assert_eq!(buffer.channel(0), Some(&[-1.0, 32767.0 / 32768.0][..]));
/// # Ok::<(), core_pcm::PcmError>(())
/// ```
pub fn decode(
    bytes: &[u8],
    format: &FormatDescriptor,
    frame_limit: Option<usize>,
) -> Result<DecodedBuffer> {
    let (Some(sample_bytes), Some(frame_bytes)) =
        (format.bytes_per_sample(), format.bytes_per_frame())
    else {
        return Err(PcmError::UnsupportedFormat(format.to_string()));
    };

    let channels = usize::from(format.channels.max(1));
    let available = bytes.len() / frame_bytes;
    let frames = frame_limit.map_or(available, |limit| limit.min(available));

    let mut planes = vec![Vec::with_capacity(frames); channels];
    for frame in bytes.chunks_exact(frame_bytes).take(frames) {
        for (plane, sample) in planes.iter_mut().zip(frame.chunks_exact(sample_bytes)) {
            plane.push(decode_sample(format.encoding, sample));
        }
    }

    DecodedBuffer::from_channels(planes)
        .ok_or_else(|| PcmError::Internal("ragged channel planes".to_string()))
}

/// Decode 16-bit little-endian PCM as produced by the external decoder.
pub fn decode_pcm16le(bytes: &[u8], channels: u16) -> DecodedBuffer {
    let format = FormatDescriptor::new(Encoding::Signed16Le, channels);
    decode(bytes, &format, None).unwrap_or_else(|_| DecodedBuffer::empty(channels))
}

/// Decode one sample. `sample` holds exactly the wire bytes of one sample.
fn decode_sample(encoding: Encoding, sample: &[u8]) -> f32 {
    let value = match encoding {
        Encoding::Unsigned8 => (f32::from(sample[0]) - 128.0) / 128.0,
        Encoding::Signed16Le => f32::from(i16::from_le_bytes([sample[0], sample[1]])) / 32768.0,
        Encoding::Signed16Be => f32::from(i16::from_be_bytes([sample[0], sample[1]])) / 32768.0,
        Encoding::Signed24Le => i24(sample[0], sample[1], sample[2]) as f32 / 8_388_608.0,
        Encoding::Signed24Be => i24(sample[2], sample[1], sample[0]) as f32 / 8_388_608.0,
        Encoding::Signed32Le => {
            let raw = i32::from_le_bytes([sample[0], sample[1], sample[2], sample[3]]);
            (f64::from(raw) / 2_147_483_648.0) as f32
        }
        Encoding::Float32Le => {
            let raw = f32::from_le_bytes([sample[0], sample[1], sample[2], sample[3]]);
            if raw.is_nan() {
                0.0
            } else {
                raw
            }
        }
        Encoding::MuLaw => f32::from(g711::ulaw_to_linear(sample[0])) / 32768.0,
        Encoding::ALaw => f32::from(g711::alaw_to_linear(sample[0])) / 32768.0,
        Encoding::OkiAdpcm | Encoding::G726Adpcm => 0.0,
    };
    value.clamp(-1.0, 1.0)
}

/// Assemble a sign-extended 24-bit value from low, middle and high bytes.
fn i24(low: u8, mid: u8, high: u8) -> i32 {
    i32::from_le_bytes([0, low, mid, high]) >> 8
}

/// Encode a decoded buffer as interleaved signed 16-bit samples.
///
/// Samples are clamped to `[-1, 1]`, scaled by 32768 and truncated toward
/// zero; the positive end saturates at 32767. Any sample produced by
/// decoding signed 16-bit input maps back to its original code.
pub fn encode16(buffer: &DecodedBuffer) -> Vec<i16> {
    let frames = buffer.frames();
    let planes = buffer.channels();
    let mut out = Vec::with_capacity(frames * planes.len());
    for i in 0..frames {
        for plane in planes {
            out.push(encode_sample(plane[i]));
        }
    }
    out
}

fn encode_sample(sample: f32) -> i16 {
    let clamped = if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    };
    (clamped * 32768.0).clamp(-32768.0, 32767.0) as i16
}

/// Interleaved little-endian bytes of 16-bit samples.
pub fn pcm16_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Reduce a buffer to one channel.
///
/// Mono buffers are returned as-is; otherwise the first two channels are
/// averaged frame by frame.
pub fn downmix(buffer: &DecodedBuffer) -> Vec<f32> {
    match buffer.channels() {
        [] => Vec::new(),
        [mono] => mono.clone(),
        [left, right, ..] => left
            .iter()
            .zip(right)
            .map(|(l, r)| (l + r) * 0.5)
            .collect(),
    }
}
