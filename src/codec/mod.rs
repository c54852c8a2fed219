//! # codec
//!
//! Bit-exact packing of physical signal values into CAN frames and back.
//!
//! Frames are handled either as a `u64` holding the payload bytes in
//! little-endian order (byte 0 is the least significant byte) or as byte
//! buffers of any length. Intel signals are addressed from their least
//! significant bit. Motorola signals are addressed from their most
//! significant bit in the sawtooth numbering of DBC files; they are placed by
//! mirroring the frame bytes, writing the field little-endian at the mirrored
//! start bit and mirroring back.
//!
//! A field that does not fit the frame (length outside `1..=64`, or bits
//! beyond the last byte) is never written and reads as raw zero.
//!
//! ```
//! use candbc_parser::{codec, ByteOrder, Signal, ValueKind};
//!
//! let sig = Signal {
//!     start_bit: 2,
//!     length: 14,
//!     byte_order: ByteOrder::Intel,
//!     value_kind: ValueKind::Signed,
//!     factor: 0.01,
//!     offset: 20.0,
//!     ..Default::default()
//! };
//! let frame = codec::pack(-34.3, &sig);
//! assert_eq!(frame, 43816);
//! assert_eq!(codec::unpack(frame, &sig), -34.3);
//! ```

mod decimal;

use crate::dbc::types::signal::{ByteOrder, Signal, ValueKind};

/// Packs a physical value into an otherwise empty frame.
///
/// Integer kinds round `(value - offset) / factor` to the nearest integer
/// (ties to even) and clamp it to the field's range. IEEE kinds store the bit
/// pattern of the scaled value unchanged.
pub fn pack(value: f64, signal: &Signal) -> u64 {
    write_field(0, encode(value, signal), signal)
}

/// Packs a physical value into `buffer`, leaving every other bit untouched.
pub fn pack_into(buffer: &mut [u8], value: f64, signal: &Signal) {
    write_field_bytes(buffer, encode(value, signal), signal);
}

/// Physical value of `signal` inside `frame`.
pub fn unpack(frame: u64, signal: &Signal) -> f64 {
    decode(read_field(frame, signal), signal)
}

/// Physical value of `signal` inside `buffer`.
pub fn unpack_bytes(buffer: &[u8], signal: &Signal) -> f64 {
    decode(read_field_bytes(buffer, signal), signal)
}

/// Packs a raw integer state, without factor and offset, into an otherwise
/// empty frame. The state is clamped to the field's range; IEEE kinds are
/// treated as unsigned fields.
pub fn pack_state(state: i64, signal: &Signal) -> u64 {
    write_field(0, clamp_to_field(i128::from(state), signal), signal)
}

pub fn pack_state_into(buffer: &mut [u8], state: i64, signal: &Signal) {
    write_field_bytes(buffer, clamp_to_field(i128::from(state), signal), signal);
}

/// Raw integer state of `signal` inside `frame`, sign-extended for signed
/// signals. Unsigned 64-bit states above `i64::MAX` wrap.
pub fn unpack_state(frame: u64, signal: &Signal) -> i64 {
    raw_state(read_field(frame, signal), signal)
}

pub fn unpack_state_bytes(buffer: &[u8], signal: &Signal) -> i64 {
    raw_state(read_field_bytes(buffer, signal), signal)
}

// ---------- value <-> raw bits ----------

fn encode(value: f64, signal: &Signal) -> u64 {
    let scaled: f64 = (value - signal.offset) / signal.factor;
    match signal.value_kind {
        ValueKind::IeeeFloat => u64::from((scaled as f32).to_bits()),
        ValueKind::IeeeDouble => scaled.to_bits(),
        // float to int casts saturate and map NaN to 0
        ValueKind::Signed | ValueKind::Unsigned => {
            clamp_to_field(scaled.round_ties_even() as i128, signal)
        }
    }
}

fn decode(raw: u64, signal: &Signal) -> f64 {
    match signal.value_kind {
        ValueKind::IeeeFloat => {
            f64::from(f32::from_bits(raw as u32)) * signal.factor + signal.offset
        }
        ValueKind::IeeeDouble => f64::from_bits(raw) * signal.factor + signal.offset,
        ValueKind::Signed => decimal::scale(
            sign_extend(raw, field_length(signal)),
            signal.factor,
            signal.offset,
        ),
        ValueKind::Unsigned => decimal::scale(i128::from(raw), signal.factor, signal.offset),
    }
}

fn raw_state(raw: u64, signal: &Signal) -> i64 {
    if signal.is_signed() {
        sign_extend(raw, field_length(signal)) as i64
    } else {
        raw as i64
    }
}

/// Two's-complement bits of `raw` clamped to the signal's integer range.
fn clamp_to_field(raw: i128, signal: &Signal) -> u64 {
    let length: u32 = field_length(signal);
    let (min, max): (i128, i128) = if signal.is_signed() {
        (-(1i128 << (length - 1)), (1i128 << (length - 1)) - 1)
    } else {
        (0, (1i128 << length) - 1)
    };
    (raw.clamp(min, max) as u64) & field_mask(length)
}

fn sign_extend(raw: u64, length: u32) -> i128 {
    if length >= 64 {
        return i128::from(raw as i64);
    }
    if raw & (1u64 << (length - 1)) != 0 {
        i128::from(raw) - (1i128 << length)
    } else {
        i128::from(raw)
    }
}

// ---------- placement ----------

/// Signal length limited to what a `u64` field can hold.
fn field_length(signal: &Signal) -> u32 {
    u32::from(signal.length).clamp(1, 64)
}

fn field_mask(length: u32) -> u64 {
    if length >= 64 {
        u64::MAX
    } else {
        (1u64 << length) - 1
    }
}

/// Little-endian position of the field's least significant bit in a frame of
/// `frame_bits` bits (mirrored frame for Motorola).
fn lsb_offset(signal: &Signal, frame_bits: u32) -> Option<u32> {
    let length: u32 = u32::from(signal.length);
    if !(1..=64).contains(&length) {
        return None;
    }
    let start: u32 = u32::from(signal.start_bit);
    let offset: u32 = match signal.byte_order {
        ByteOrder::Intel => start,
        ByteOrder::Motorola => {
            let byte: u32 = start / 8;
            frame_bits.checked_sub(length + 8 * byte + (8 * (byte + 1) - (start + 1)) % 8)?
        }
    };
    (offset + length <= frame_bits).then_some(offset)
}

fn write_field(frame: u64, bits: u64, signal: &Signal) -> u64 {
    let Some(offset) = lsb_offset(signal, 64) else {
        return frame;
    };
    let mask: u64 = field_mask(u32::from(signal.length)) << offset;
    let place = |f: u64| (f & !mask) | ((bits << offset) & mask);
    match signal.byte_order {
        ByteOrder::Intel => place(frame),
        ByteOrder::Motorola => place(frame.swap_bytes()).swap_bytes(),
    }
}

fn read_field(frame: u64, signal: &Signal) -> u64 {
    let Some(offset) = lsb_offset(signal, 64) else {
        return 0;
    };
    let frame: u64 = match signal.byte_order {
        ByteOrder::Intel => frame,
        ByteOrder::Motorola => frame.swap_bytes(),
    };
    (frame >> offset) & field_mask(u32::from(signal.length))
}

fn buffer_bits(buffer: &[u8]) -> Option<u32> {
    u32::try_from(buffer.len()).ok()?.checked_mul(8)
}

fn write_field_bytes(buffer: &mut [u8], bits: u64, signal: &Signal) {
    let Some(offset) = buffer_bits(buffer).and_then(|n| lsb_offset(signal, n)) else {
        return;
    };
    let motorola: bool = signal.byte_order == ByteOrder::Motorola;
    if motorola {
        buffer.reverse();
    }
    for k in 0..u32::from(signal.length) {
        let pos = (offset + k) as usize;
        let flag: u8 = 1 << (pos % 8);
        if (bits >> k) & 1 == 1 {
            buffer[pos / 8] |= flag;
        } else {
            buffer[pos / 8] &= !flag;
        }
    }
    if motorola {
        buffer.reverse();
    }
}

fn read_field_bytes(buffer: &[u8], signal: &Signal) -> u64 {
    let Some(offset) = buffer_bits(buffer).and_then(|n| lsb_offset(signal, n)) else {
        return 0;
    };
    let len: usize = buffer.len();
    // reading the mirrored buffer without copying it
    let byte_at = |i: usize| match signal.byte_order {
        ByteOrder::Intel => buffer[i],
        ByteOrder::Motorola => buffer[len - 1 - i],
    };
    (0..u32::from(signal.length)).fold(0u64, |acc, k| {
        let pos = (offset + k) as usize;
        let bit = u64::from((byte_at(pos / 8) >> (pos % 8)) & 1);
        acc | (bit << k)
    })
}
