//! Treble equalization and impulse generation for the kernels.
//!
//! The band-limited impulse is a closed-form sum of `4096` cosine harmonics
//! whose amplitudes roll off geometrically above a cutoff, giving a
//! controllable treble slope. [`TrebleEq`] holds the parameters; the
//! synthesizers window the half-impulse with a Hamming window and integrate
//! it into per-phase step kernels.

use core::f64::consts::PI;

use crate::fixed::BLIP_RES;

/// Treble response of a band-limited kernel.
///
/// `treble_db` is the attenuation at half the sample rate relative to the
/// rolloff frequency. With a rolloff of zero the slope starts at DC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrebleEq {
    /// Treble level in dB at half the sample rate, clamped to `[-300, 5]`.
    pub treble_db: f64,
    /// Frequency in Hz where the rolloff begins.
    pub rolloff_freq: u32,
    /// Sample rate the response is designed for.
    pub sample_rate: u32,
    /// Optional hard cutoff in Hz; zero keeps the kernel's natural bandwidth.
    pub cutoff_freq: u32,
}

impl Default for TrebleEq {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TREBLE_DB)
    }
}

impl TrebleEq {
    /// Treble level used by freshly created synthesizers.
    pub const DEFAULT_TREBLE_DB: f64 = -8.0;

    /// Lowest accepted treble level.
    pub const MIN_TREBLE_DB: f64 = -300.0;

    /// Highest accepted treble level.
    pub const MAX_TREBLE_DB: f64 = 5.0;

    /// Creates an EQ with the given treble level at 44.1 kHz.
    pub fn new(treble_db: f64) -> Self {
        Self {
            treble_db,
            rolloff_freq: 0,
            sample_rate: 44100,
            cutoff_freq: 0,
        }
    }

    /// Creates an EQ whose rolloff starts at `rolloff_freq`.
    pub fn with_rolloff(treble_db: f64, rolloff_freq: u32, sample_rate: u32) -> Self {
        Self {
            treble_db,
            rolloff_freq,
            sample_rate,
            cutoff_freq: 0,
        }
    }

    /// Sets a hard cutoff frequency.
    pub fn cutoff(mut self, cutoff_freq: u32) -> Self {
        self.cutoff_freq = cutoff_freq;
        self
    }

    /// Fills `out` with the windowed first half of the impulse.
    ///
    /// The impulse peak lies just past the end of `out`; mirroring it gives
    /// the full symmetric impulse.
    pub(crate) fn generate(&self, out: &mut [f64]) {
        let count = out.len();
        if count == 0 {
            return;
        }
        let half_rate = f64::from(self.sample_rate) * 0.5;
        let mut oversample = BLIP_RES as f64 * 2.25 / count as f64 + 0.85;
        if self.cutoff_freq != 0 && self.sample_rate != 0 {
            oversample = half_rate / f64::from(self.cutoff_freq);
        }
        let cutoff = if self.sample_rate == 0 {
            0.0
        } else {
            f64::from(self.rolloff_freq) * oversample / half_rate
        };

        gen_sinc(out, BLIP_RES as f64 * oversample, self.treble_db, cutoff);

        // Half Hamming window
        if count > 1 {
            let to_fraction = PI / (count - 1) as f64;
            for (i, v) in out.iter_mut().enumerate() {
                *v *= 0.54 - 0.46 * libm::cos(i as f64 * to_fraction);
            }
        }
    }
}

/// Closed-form sum of `MAXH` harmonics with geometric rolloff above `cutoff`.
fn gen_sinc(out: &mut [f64], oversample: f64, treble: f64, cutoff: f64) {
    const MAXH: f64 = 4096.0;

    let cutoff = cutoff.min(0.999);
    let treble = treble.clamp(TrebleEq::MIN_TREBLE_DB, TrebleEq::MAX_TREBLE_DB);
    let rolloff = libm::pow(10.0, 1.0 / (MAXH * 20.0) * treble / (1.0 - cutoff));
    let pow_a_n = libm::pow(rolloff, MAXH - MAXH * cutoff);
    let to_angle = PI / 2.0 / MAXH / oversample;

    let count = out.len() as f64;
    for (i, v) in out.iter_mut().enumerate() {
        let angle = ((i as f64 - count) * 2.0 + 1.0) * to_angle;
        let cos_angle = libm::cos(angle);
        let cos_nc_angle = libm::cos(MAXH * cutoff * angle);
        let cos_nc1_angle = libm::cos((MAXH * cutoff - 1.0) * angle);

        let c = (rolloff * libm::cos((MAXH - 1.0) * angle) - libm::cos(MAXH * angle)) * pow_a_n
            - rolloff * cos_nc1_angle
            + cos_nc_angle;
        let d = 1.0 + rolloff * (rolloff - cos_angle - cos_angle);
        let b = 2.0 - cos_angle - cos_angle;
        let a = 1.0 - cos_angle - cos_nc_angle + cos_nc1_angle;

        *v = (a * d + c * b) / (b * d);
    }
}
