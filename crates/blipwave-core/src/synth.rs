//! Step synthesizers that turn amplitude changes into buffer deltas.
//!
//! Two implementations share the [`DeltaSynth`] interface:
//!
//! - [`FastSynth`] drops each step on the nearest sample. Cheap, with some
//!   aliasing, and no treble control.
//! - [`Synth<WIDTH>`] spreads each step over a `WIDTH`-tap band-limited
//!   kernel chosen from [`BLIP_RES`] sub-sample phases.
//!
//! Both centre the step [`OUTPUT_LATENCY`] samples after its position, so
//! they can write into the same buffer.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::buffer::BlipBuffer;
use crate::eq::TrebleEq;
use crate::fixed::{
    BLIP_RES, BUFFER_ACCURACY, ClockTime, FIXED_UNIT, Fixed, MAX_QUALITY, OUTPUT_LATENCY,
    PHASE_BITS, SAMPLE_BITS,
};
use crate::multi::{BufferId, MultiBuffer};

/// Sum of every kernel phase before volume rescaling.
const KERNEL_UNIT: i32 = 1 << 15;

/// Per-synthesizer state shared by both implementations.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthState {
    /// Multiplier from amplitude units to delta units.
    pub delta_factor: i32,
    /// Amplitude of the last [`update`](DeltaSynth::update).
    pub last_amp: i32,
    /// Buffer that [`update_routed`](DeltaSynth::update_routed) writes to.
    pub output: Option<BufferId>,
    /// Amplitude corresponding to full volume, used by [`volume`](DeltaSynth::volume).
    pub range: u32,
}

impl Default for SynthState {
    fn default() -> Self {
        Self {
            delta_factor: 0,
            last_amp: 0,
            output: None,
            range: 1,
        }
    }
}

/// Common interface of the step synthesizers.
///
/// Implementors supply the kernel placement in
/// [`offset_resampled`](Self::offset_resampled); amplitude tracking and
/// routing are provided.
pub trait DeltaSynth {
    /// Shared state.
    fn state(&self) -> &SynthState;

    /// Shared state, mutably.
    fn state_mut(&mut self) -> &mut SynthState;

    /// Sets the output scale: an amplitude change of `1` becomes a step of
    /// `unit` times full scale.
    fn volume_unit(&mut self, unit: f64);

    /// Sets the treble response. Ignored by synthesizers without a kernel.
    fn treble_eq(&mut self, eq: &TrebleEq);

    /// Adds a step of `delta` amplitude units at a fixed-point position.
    fn offset_resampled(&self, position: Fixed, delta: i32, buf: &mut BlipBuffer);

    /// Adds a step of `delta` at clock `time` of the current frame.
    #[inline]
    fn offset(&self, time: ClockTime, delta: i32, buf: &mut BlipBuffer) {
        self.offset_resampled(buf.to_fixed(time), delta, buf);
    }

    /// Moves the output to `amplitude` at clock `time`.
    #[inline]
    fn update(&mut self, time: ClockTime, amplitude: i32, buf: &mut BlipBuffer) {
        let delta = self.take_delta(amplitude);
        if delta != 0 {
            self.offset(time, delta, buf);
        }
    }

    /// Like [`update`](Self::update), writing to the buffer set with
    /// [`set_output`](Self::set_output).
    ///
    /// Returns `false` when no output is set or the handle has gone stale; the
    /// amplitude is still recorded so the next step is relative to it.
    fn update_routed(&mut self, time: ClockTime, amplitude: i32, multi: &mut MultiBuffer) -> bool {
        let delta = self.take_delta(amplitude);
        let Some(buf) = self.output().and_then(|id| multi.buffer_mut(id)) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(amplitude, "synth: no live output buffer");
            return false;
        };
        if delta != 0 {
            self.offset(time, delta, buf);
        }
        true
    }

    /// Records `amplitude` and returns the change from the previous one.
    #[inline]
    fn take_delta(&mut self, amplitude: i32) -> i32 {
        let state = self.state_mut();
        let delta = amplitude.wrapping_sub(state.last_amp);
        state.last_amp = amplitude;
        delta
    }

    /// Sets the volume relative to the amplitude range.
    fn volume(&mut self, volume: f64) {
        let range = self.state().range.max(1);
        self.volume_unit(volume / f64::from(range));
    }

    /// Current delta factor.
    fn delta_factor(&self) -> i32 {
        self.state().delta_factor
    }

    /// Amplitude of the last update.
    fn last_amp(&self) -> i32 {
        self.state().last_amp
    }

    /// Routes [`update_routed`](Self::update_routed) to `output`.
    fn set_output(&mut self, output: Option<BufferId>) {
        self.state_mut().output = output;
    }

    /// Current routing target.
    fn output(&self) -> Option<BufferId> {
        self.state().output
    }
}

/// Nearest-sample step synthesizer.
#[derive(Debug, Clone, Default)]
pub struct FastSynth {
    state: SynthState,
}

impl FastSynth {
    /// Creates a synthesizer with zero volume and a range of one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a synthesizer whose full volume corresponds to `range` amplitude units.
    pub fn with_range(range: u32) -> Self {
        let mut synth = Self::new();
        synth.state.range = range.max(1);
        synth
    }
}

impl DeltaSynth for FastSynth {
    fn state(&self) -> &SynthState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SynthState {
        &mut self.state
    }

    fn volume_unit(&mut self, unit: f64) {
        self.state.delta_factor = libm::floor(unit * f64::from(1u32 << SAMPLE_BITS) + 0.5) as i32;
    }

    fn treble_eq(&mut self, _eq: &TrebleEq) {}

    #[inline]
    fn offset_resampled(&self, position: Fixed, delta: i32, buf: &mut BlipBuffer) {
        let round = usize::from(position & (FIXED_UNIT / 2) != 0);
        let slot = buf.footprint_mut(position, OUTPUT_LATENCY + round, 1);
        slot[0] = slot[0].wrapping_add(delta.wrapping_mul(self.state.delta_factor));
    }
}

/// Band-limited step synthesizer with a `WIDTH`-tap kernel.
///
/// `WIDTH` must be even and between 2 and [`MAX_QUALITY`].
#[derive(Clone)]
pub struct Synth<const WIDTH: usize> {
    state: SynthState,
    eq: TrebleEq,
    volume_unit: f64,
    kernel_unit: i32,
    /// `BLIP_RES` phases of `WIDTH` taps each.
    kernels: Vec<i16>,
}

/// 8-tap kernel.
pub type LowSynth = Synth<8>;
/// 12-tap kernel.
pub type MedSynth = Synth<12>;
/// 16-tap kernel.
pub type GoodSynth = Synth<16>;
/// 20-tap kernel.
pub type HighSynth = Synth<20>;

impl<const WIDTH: usize> core::fmt::Debug for Synth<WIDTH> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Synth")
            .field("width", &WIDTH)
            .field("state", &self.state)
            .field("eq", &self.eq)
            .field("volume_unit", &self.volume_unit)
            .field("kernel_unit", &self.kernel_unit)
            .finish_non_exhaustive()
    }
}

impl<const WIDTH: usize> Default for Synth<WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const WIDTH: usize> Synth<WIDTH> {
    const VALID_WIDTH: () = assert!(
        WIDTH >= 2 && WIDTH <= MAX_QUALITY && WIDTH % 2 == 0,
        "kernel width must be even and at most MAX_QUALITY"
    );

    /// Creates a synthesizer with the default treble EQ and zero volume.
    pub fn new() -> Self {
        let () = Self::VALID_WIDTH;
        let mut synth = Self {
            state: SynthState::default(),
            eq: TrebleEq::default(),
            volume_unit: 0.0,
            kernel_unit: KERNEL_UNIT,
            kernels: vec![0; BLIP_RES * WIDTH],
        };
        synth.rebuild();
        synth
    }

    /// Creates a synthesizer whose full volume corresponds to `range` amplitude units.
    pub fn with_range(range: u32) -> Self {
        let mut synth = Self::new();
        synth.state.range = range.max(1);
        synth
    }

    /// Kernel width in taps.
    pub const fn width() -> usize {
        WIDTH
    }

    /// Current treble EQ.
    pub fn eq(&self) -> &TrebleEq {
        &self.eq
    }

    /// Sum of the taps of every phase.
    pub fn kernel_unit(&self) -> i32 {
        self.kernel_unit
    }

    /// Taps of one phase.
    pub fn kernel(&self, phase: usize) -> &[i16] {
        &self.kernels[phase * WIDTH..(phase + 1) * WIDTH]
    }

    fn rebuild(&mut self) {
        self.kernel_unit = KERNEL_UNIT;
        build_kernels(&self.eq, WIDTH, self.kernel_unit, &mut self.kernels);

        let mut factor = self.volume_unit * f64::from(1u32 << SAMPLE_BITS) / f64::from(self.kernel_unit);
        if factor > 0.0 {
            // Trade kernel precision for delta precision at low volumes.
            let mut shift = 0;
            while factor < 2.0 && shift < 15 {
                shift += 1;
                factor *= 2.0;
            }
            if shift > 0 {
                self.rescale_kernels(shift);
            }
        }
        self.state.delta_factor = libm::floor(factor + 0.5) as i32;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            width = WIDTH,
            treble_db = self.eq.treble_db,
            kernel_unit = self.kernel_unit,
            delta_factor = self.state.delta_factor,
            "synth: kernels rebuilt"
        );
    }

    /// Divides every tap by `2^shift` with rounding, then restores unit sums.
    fn rescale_kernels(&mut self, shift: u32) {
        let keep_positive = 0x8000 + (1 << (shift - 1));
        for tap in &mut self.kernels {
            *tap = (((i32::from(*tap) + keep_positive) >> shift) - (0x8000 >> shift)) as i16;
        }
        self.kernel_unit >>= shift;
        normalize_kernels(&mut self.kernels, WIDTH, self.kernel_unit);
    }
}

impl<const WIDTH: usize> DeltaSynth for Synth<WIDTH> {
    fn state(&self) -> &SynthState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SynthState {
        &mut self.state
    }

    fn volume_unit(&mut self, unit: f64) {
        if unit != self.volume_unit {
            self.volume_unit = unit;
            self.rebuild();
        }
    }

    fn treble_eq(&mut self, eq: &TrebleEq) {
        self.eq = *eq;
        self.rebuild();
    }

    #[inline]
    fn offset_resampled(&self, position: Fixed, delta: i32, buf: &mut BlipBuffer) {
        let delta = delta.wrapping_mul(self.state.delta_factor);
        let phase = (position >> (BUFFER_ACCURACY - PHASE_BITS)) as usize & (BLIP_RES - 1);
        let kernel = self.kernel(phase);
        let window = buf.footprint_mut(position, OUTPUT_LATENCY + 1 - WIDTH / 2, WIDTH);
        for (slot, &tap) in window.iter_mut().zip(kernel) {
            *slot = slot.wrapping_add(i32::from(tap).wrapping_mul(delta));
        }
    }
}

/// Integrates the windowed impulse into `BLIP_RES` phases of `width` taps.
///
/// Tap `k` of phase `p` holds the impulse area over
/// `(k * BLIP_RES - p, (k + 1) * BLIP_RES - p]`, scaled so the whole
/// impulse sums to `kernel_unit`.
fn build_kernels(eq: &TrebleEq, width: usize, kernel_unit: i32, kernels: &mut [i16]) {
    let half = BLIP_RES * width / 2;
    let mut half_impulse = vec![0.0; half];
    eq.generate(&mut half_impulse);

    let full = half * 2;
    let mut cumulative = Vec::with_capacity(full + 1);
    let mut sum = 0.0;
    cumulative.push(sum);
    for i in 0..full {
        sum += if i < half {
            half_impulse[i]
        } else {
            half_impulse[full - 1 - i]
        };
        cumulative.push(sum);
    }

    let scale = f64::from(kernel_unit) / sum;
    for (phase, taps) in kernels.chunks_exact_mut(width).enumerate() {
        for (k, tap) in taps.iter_mut().enumerate() {
            let hi = ((k + 1) * BLIP_RES).saturating_sub(phase);
            let lo = (k * BLIP_RES).saturating_sub(phase);
            let area = libm::floor((cumulative[hi] - cumulative[lo]) * scale + 0.5);
            *tap = area.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
        }
    }
    normalize_kernels(kernels, width, kernel_unit);
}

/// Folds each phase's rounding error into its largest tap.
fn normalize_kernels(kernels: &mut [i16], width: usize, kernel_unit: i32) {
    for taps in kernels.chunks_exact_mut(width) {
        let sum: i32 = taps.iter().map(|&t| i32::from(t)).sum();
        let error = kernel_unit - sum;
        if error == 0 {
            continue;
        }
        let peak = taps
            .iter()
            .enumerate()
            .max_by_key(|&(_, &t)| i32::from(t).abs())
            .map_or(0, |(i, _)| i);
        let corrected = i32::from(taps[peak]) + error;
        taps[peak] = corrected.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
    }
}
