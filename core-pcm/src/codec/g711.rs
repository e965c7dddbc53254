//! G.711 companding tables.
//!
//! Expansion follows the ITU-T reference decoder: µ-law yields values in
//! `[-32124, 32124]`, A-law in `[-32256, 32256]`.

const SIGN_BIT: u8 = 0x80;
const QUANT_MASK: u8 = 0x0F;
const SEG_SHIFT: u8 = 4;
const SEG_MASK: u8 = 0x70;
const ULAW_BIAS: i32 = 0x84;

/// Expand a µ-law byte to a 16-bit linear value.
pub fn ulaw_to_linear(byte: u8) -> i16 {
    let u = !byte;
    let mut t = (i32::from(u & QUANT_MASK) << 3) + ULAW_BIAS;
    t <<= (u & SEG_MASK) >> SEG_SHIFT;
    let value = if u & SIGN_BIT != 0 {
        ULAW_BIAS - t
    } else {
        t - ULAW_BIAS
    };
    value as i16
}

/// Expand an A-law byte to a 16-bit linear value.
pub fn alaw_to_linear(byte: u8) -> i16 {
    let a = byte ^ 0x55;
    let mut t = i32::from(a & QUANT_MASK) << 4;
    let segment = (a & SEG_MASK) >> SEG_SHIFT;
    match segment {
        0 => t += 8,
        1 => t += 0x108,
        _ => {
            t += 0x108;
            t <<= segment - 1;
        }
    }
    let value = if a & SIGN_BIT != 0 { t } else { -t };
    value as i16
}
