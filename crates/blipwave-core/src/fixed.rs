//! Fixed-point time base shared by buffers and synthesizers.
//!
//! Positions inside a [`BlipBuffer`](crate::BlipBuffer) are 16.16 fixed-point
//! sample indices. A clock tick maps to one by multiplying with the buffer's
//! `factor` (samples per clock scaled by `2^16`) and adding the current offset.

use crate::error::BufferError;

/// Fractional bits of a fixed-point sample position.
pub const BUFFER_ACCURACY: u32 = 16;

/// One whole sample in fixed point.
pub const FIXED_UNIT: Fixed = 1 << BUFFER_ACCURACY;

/// Bits of sub-sample phase resolved by the kernels.
pub const PHASE_BITS: u32 = 6;

/// Number of kernel phases per sample.
pub const BLIP_RES: usize = 1 << PHASE_BITS;

/// Widest supported kernel in taps.
pub const MAX_QUALITY: usize = 32;

/// Padding slots past the nominal size that the widest kernel can touch.
pub const BUFFER_EXTRA: usize = MAX_QUALITY + 2;

/// Fractional bits carried by the delta storage and the integrator.
pub const DELTA_BITS: u32 = 14;

/// Full-scale bits used when turning a volume unit into a delta factor.
pub const SAMPLE_BITS: u32 = 30;

/// Samples between a step's position and the centre of its kernel.
pub const OUTPUT_LATENCY: usize = MAX_QUALITY / 2;

/// Buffer length used when none has been chosen.
pub const DEFAULT_LENGTH_MS: u32 = 250;

/// Largest buffer size in samples.
pub const MAX_SAMPLES: usize = (u32::MAX >> BUFFER_ACCURACY) as usize - BUFFER_EXTRA - 64;

/// 16.16 fixed-point sample position.
pub type Fixed = u64;

/// Time in clock ticks relative to the start of the current frame.
pub type ClockTime = u32;

/// Computes `round(sample_rate / clock_rate * 2^16)`.
pub fn clock_factor(clock_rate: u32, sample_rate: u32) -> Result<u32, BufferError> {
    if clock_rate == 0 || sample_rate == 0 {
        return Err(BufferError::InvalidRate {
            clock_rate,
            sample_rate,
        });
    }
    let ratio = f64::from(sample_rate) / f64::from(clock_rate);
    let factor = libm::floor(ratio * FIXED_UNIT as f64 + 0.5);
    if factor < 1.0 || factor > f64::from(u32::MAX) {
        return Err(BufferError::UnrepresentableRatio {
            clock_rate,
            sample_rate,
        });
    }
    Ok(factor as u32)
}

/// Buffer size in samples for `length_ms` at `sample_rate`.
///
/// A length of zero selects [`MAX_SAMPLES`].
pub fn samples_for_length(sample_rate: u32, length_ms: u32) -> Result<usize, BufferError> {
    if length_ms == 0 {
        return Ok(MAX_SAMPLES);
    }
    let requested = (u64::from(sample_rate) * (u64::from(length_ms) + 1) + 999) / 1000;
    if requested > MAX_SAMPLES as u64 {
        return Err(BufferError::LengthTooLong {
            requested,
            max: MAX_SAMPLES,
        });
    }
    Ok(requested as usize)
}

/// Length in milliseconds actually covered by `size` samples.
pub(crate) fn length_for(size: usize, sample_rate: u32) -> u32 {
    let ms = size as u64 * 1000 / u64::from(sample_rate.max(1));
    ms.saturating_sub(1) as u32
}

/// Leak shift of the integrator's high-pass for a cutoff of `bass_freq` Hz.
///
/// Each halving of `bass_freq / sample_rate` adds one to the shift, starting
/// from 13. A cutoff of zero disables the high-pass.
pub fn bass_shift(bass_freq: u32, sample_rate: u32) -> u32 {
    if bass_freq == 0 || sample_rate == 0 {
        return 31;
    }
    let mut shift = 13;
    let mut f = (u64::from(bass_freq) << 16) / u64::from(sample_rate);
    loop {
        f >>= 1;
        if f == 0 {
            break;
        }
        shift -= 1;
        if shift == 0 {
            break;
        }
    }
    shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_factor_nes() {
        let factor = clock_factor(1_789_773, 44100).unwrap();
        assert_eq!(factor, 1615);
    }

    #[test]
    fn test_clock_factor_rejects_zero() {
        assert!(matches!(
            clock_factor(0, 44100),
            Err(BufferError::InvalidRate { .. })
        ));
        assert!(matches!(
            clock_factor(44100, 0),
            Err(BufferError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_clock_factor_unrepresentable() {
        // One sample per 2^17 clocks rounds to zero.
        assert!(matches!(
            clock_factor(1 << 18, 1),
            Err(BufferError::UnrepresentableRatio { .. })
        ));
        // 2^16 samples per clock overflows 32 bits.
        assert!(matches!(
            clock_factor(1, 1 << 16),
            Err(BufferError::UnrepresentableRatio { .. })
        ));
    }

    #[test]
    fn test_samples_for_length() {
        assert_eq!(samples_for_length(44100, 250).unwrap(), 11070);
        assert_eq!(samples_for_length(44100, 0).unwrap(), MAX_SAMPLES);
        assert!(matches!(
            samples_for_length(96000, 60_000),
            Err(BufferError::LengthTooLong { .. })
        ));
    }

    #[test]
    fn test_length_round_trip() {
        let size = samples_for_length(44100, 250).unwrap();
        assert_eq!(length_for(size, 44100), 250);
    }

    #[test]
    fn test_bass_shift() {
        assert_eq!(bass_shift(16, 44100), 9);
        assert_eq!(bass_shift(0, 44100), 31);
        // Higher cutoffs leak faster.
        assert!(bass_shift(90, 44100) < bass_shift(16, 44100));
    }
}
