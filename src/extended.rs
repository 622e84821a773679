// IEEE 754 80-bit extended precision, integer rates only
// https://en.wikipedia.org/wiki/Extended_precision#x86_extended_precision_format
//
// 1 sign bit, 15 exponent bits, then a 64 bit significand with an explicit
// integer bit. Sample rates are whole numbers in practice, so the conversion
// never goes through floating point.

pub type Extended = [u8; 10];

const EXP_BIAS: u16 = 16383;
const EXP_MAX: u16 = 0x7fff;
const SIGN: u8 = 0b1000_0000;

/// Integer part of an extended value, saturated to the `u32` range.
/// Fractions are truncated. Negatives and NaN give 0, +inf gives `u32::MAX`.
pub fn to_u32(b: &Extended) -> u32 {
    let exp = u16::from_be_bytes([b[0] & !SIGN, b[1]]);
    let mut significand = [0; 8];
    significand.copy_from_slice(&b[2..]);
    let significand = u64::from_be_bytes(significand);

    if b[0] & SIGN == SIGN {
        return 0;
    }
    if exp == EXP_MAX {
        // fraction bits set means NaN
        return if significand << 1 == 0 { u32::MAX } else { 0 };
    }
    if exp < EXP_BIAS {
        return 0;
    }

    let shift = exp - EXP_BIAS;
    if shift > 31 {
        return u32::MAX;
    }
    (significand >> (63 - shift)) as u32
}

pub fn from_u32(rate: u32) -> Extended {
    let mut out = [0; 10];
    if rate == 0 {
        return out;
    }

    let msb = 31 - rate.leading_zeros() as u16;
    out[..2].copy_from_slice(&(EXP_BIAS + msb).to_be_bytes());
    out[2..].copy_from_slice(&(u64::from(rate) << (63 - msb)).to_be_bytes());
    out
}

/// True when `b` is exactly what [`from_u32`] writes for its integer part.
pub fn is_canonical(b: &Extended) -> bool {
    from_u32(to_u32(b)) == *b
}
