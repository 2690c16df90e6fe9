//! Band-limited synthesis buffer.
//!
//! [`BlipBuffer`] stores amplitude *changes* rather than samples. Producers
//! deposit deltas at fixed-point positions (usually through a
//! [`DeltaSynth`](crate::DeltaSynth)), close each frame with
//! [`end_frame`](BlipBuffer::end_frame), and the reader integrates the deltas
//! into 16-bit PCM while a one-pole high-pass removes DC.
//!
//! # Frame cycle
//!
//! ```rust
//! use blipwave_core::BlipBuffer;
//!
//! let mut buf = BlipBuffer::new();
//! buf.set_rates(1_789_773, 44100).unwrap();
//! buf.set_bass_freq(16);
//!
//! let pos = buf.to_fixed(0);
//! buf.deposit(pos, 100 << 14);
//! buf.end_frame(29780);
//!
//! let mut pcm = vec![0i16; buf.samples_avail()];
//! let read = buf.read_samples(&mut pcm, 4096);
//! assert_eq!(pcm[0], 100);
//! assert_eq!(read, pcm.len());
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::BufferError;
use crate::fixed::{
    BUFFER_ACCURACY, BUFFER_EXTRA, ClockTime, DEFAULT_LENGTH_MS, DELTA_BITS, Fixed,
    OUTPUT_LATENCY, bass_shift, clock_factor, length_for, samples_for_length,
};

/// Default bass cutoff in Hz.
pub const DEFAULT_BASS_FREQ: u32 = 16;

/// Running sum of the delta stream with a leaky high-pass.
///
/// `step` returns the full-precision accumulator before the leak is applied,
/// so callers can sum several integrators before truncating.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Integrator {
    accum: i32,
    bass_shift: u32,
}

impl Integrator {
    #[inline]
    pub(crate) fn step(&mut self, delta: i32) -> i32 {
        let accum = self.accum.wrapping_add(delta);
        self.accum = accum.wrapping_sub(accum >> self.bass_shift);
        accum
    }

    /// Applies the leak of `count` silent slots.
    pub(crate) fn skip(&mut self, count: usize) {
        for _ in 0..count {
            let leak = self.accum >> self.bass_shift;
            if leak == 0 {
                break;
            }
            self.accum -= leak;
        }
    }
}

/// Saturates a 32-bit sample to 16 bits.
#[inline]
pub(crate) fn clamp_sample(sample: i32) -> i16 {
    sample.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Integrator, offset and padding deltas of a drained buffer.
///
/// Restoring a state into a buffer configured with the same rates makes it
/// continue exactly where the saved one left off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferState {
    /// Fractional part of the fixed-point offset.
    pub offset: Fixed,
    /// Integrator value.
    pub reader_accum: i32,
    /// Deltas already deposited past the read position.
    pub pending: [i32; BUFFER_EXTRA],
}

/// Delta buffer with fixed-point time base and integrating reader.
///
/// The delta storage holds `size + BUFFER_EXTRA` slots so the widest kernel
/// at the last legal position stays in bounds.
#[derive(Clone)]
pub struct BlipBuffer {
    factor: u32,
    offset: Fixed,
    deltas: Vec<i32>,
    size: usize,
    reader_accum: i32,
    bass_shift: u32,
    sample_rate: u32,
    clock_rate: u32,
    bass_freq: u32,
    length_ms: u32,
    modified: bool,
    /// One past the furthest slot written, relative to the read position.
    dirty_end: usize,
}

/// A validated sample rate change with its storage already allocated.
#[derive(Debug)]
pub(crate) struct SampleRateChange {
    sample_rate: u32,
    size: usize,
    factor: Option<u32>,
    storage: Option<Vec<i32>>,
}

impl core::fmt::Debug for BlipBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BlipBuffer")
            .field("sample_rate", &self.sample_rate)
            .field("clock_rate", &self.clock_rate)
            .field("factor", &self.factor)
            .field("size", &self.size)
            .field("offset", &self.offset)
            .field("reader_accum", &self.reader_accum)
            .field("bass_shift", &self.bass_shift)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

impl Default for BlipBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl BlipBuffer {
    /// Creates an unconfigured buffer. Set the rates before use.
    pub fn new() -> Self {
        Self {
            factor: 0,
            offset: 0,
            deltas: Vec::new(),
            size: 0,
            reader_accum: 0,
            bass_shift: 0,
            sample_rate: 0,
            clock_rate: 0,
            bass_freq: DEFAULT_BASS_FREQ,
            length_ms: 0,
            modified: false,
            dirty_end: 0,
        }
    }

    /// Latency in samples between a step's position and its kernel centre.
    pub const fn output_latency() -> usize {
        OUTPUT_LATENCY
    }

    /// Sets both rates at once, keeping the current length (or
    /// [`DEFAULT_LENGTH_MS`] if none was chosen), and clears the buffer.
    ///
    /// On error the buffer is left as it was.
    pub fn set_rates(&mut self, clock_rate: u32, sample_rate: u32) -> Result<(), BufferError> {
        let factor = clock_factor(clock_rate, sample_rate)?;
        if sample_rate != self.sample_rate || self.deltas.is_empty() {
            let msec = if self.length_ms == 0 {
                DEFAULT_LENGTH_MS
            } else {
                self.length_ms
            };
            let size = samples_for_length(sample_rate, msec)?;
            let storage = self.storage_for(size)?;
            self.install_storage(size, storage);
            self.sample_rate = sample_rate;
            self.length_ms = length_for(size, sample_rate);
            self.bass_shift = bass_shift(self.bass_freq, sample_rate);
        }
        self.clock_rate = clock_rate;
        self.factor = factor;
        self.clear();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            clock_rate,
            sample_rate,
            factor,
            size = self.size,
            "blip_buffer: rates set"
        );
        Ok(())
    }

    /// Sets the output sample rate and buffer length, then clears the buffer.
    ///
    /// A length of zero requests the largest supported buffer. If a clock
    /// rate is already known the clock factor is recomputed for the new rate.
    pub fn set_sample_rate(&mut self, sample_rate: u32, length_ms: u32) -> Result<(), BufferError> {
        let change = self.prepare_sample_rate(sample_rate, length_ms)?;
        self.apply_sample_rate(change);
        Ok(())
    }

    /// Validates a sample rate change and allocates its storage without
    /// touching the buffer.
    pub(crate) fn prepare_sample_rate(
        &self,
        sample_rate: u32,
        length_ms: u32,
    ) -> Result<SampleRateChange, BufferError> {
        if sample_rate == 0 {
            return Err(BufferError::InvalidRate {
                clock_rate: self.clock_rate,
                sample_rate,
            });
        }
        let size = samples_for_length(sample_rate, length_ms)?;
        let factor = if self.clock_rate == 0 {
            None
        } else {
            Some(clock_factor(self.clock_rate, sample_rate)?)
        };
        let storage = self.storage_for(size)?;
        Ok(SampleRateChange {
            sample_rate,
            size,
            factor,
            storage,
        })
    }

    /// Commits a change from [`prepare_sample_rate`](Self::prepare_sample_rate)
    /// and clears the buffer. Cannot fail.
    pub(crate) fn apply_sample_rate(&mut self, change: SampleRateChange) {
        let SampleRateChange {
            sample_rate,
            size,
            factor,
            storage,
        } = change;
        self.install_storage(size, storage);
        self.sample_rate = sample_rate;
        self.length_ms = length_for(size, sample_rate);
        if let Some(factor) = factor {
            self.factor = factor;
        }
        self.bass_shift = bass_shift(self.bass_freq, sample_rate);
        self.clear();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            length_ms = self.length_ms,
            size,
            "blip_buffer: sample rate set"
        );
    }

    /// Changes the buffer length, keeping the sample rate.
    pub fn set_length(&mut self, length_ms: u32) -> Result<(), BufferError> {
        self.set_sample_rate(self.sample_rate, length_ms)
    }

    /// Sets the clock rate used to map ticks to samples.
    ///
    /// Before a sample rate is chosen the clock rate is only recorded.
    pub fn set_clock_rate(&mut self, clock_rate: u32) -> Result<(), BufferError> {
        if clock_rate == 0 {
            return Err(BufferError::InvalidRate {
                clock_rate,
                sample_rate: self.sample_rate,
            });
        }
        if self.sample_rate != 0 {
            self.factor = clock_factor(clock_rate, self.sample_rate)?;
        }
        self.clock_rate = clock_rate;

        #[cfg(feature = "tracing")]
        tracing::debug!(clock_rate, factor = self.factor, "blip_buffer: clock rate set");
        Ok(())
    }

    /// Sets the high-pass cutoff in Hz. Zero disables the high-pass.
    pub fn set_bass_freq(&mut self, bass_freq: u32) {
        self.bass_freq = bass_freq;
        self.bass_shift = bass_shift(bass_freq, self.sample_rate);
    }

    /// Fresh zeroed storage for `size` samples, or `None` if the current
    /// storage already has the right length.
    fn storage_for(&self, size: usize) -> Result<Option<Vec<i32>>, BufferError> {
        let slots = size + BUFFER_EXTRA;
        if self.deltas.len() == slots {
            return Ok(None);
        }
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(slots)
            .map_err(|_| BufferError::OutOfMemory { slots })?;
        storage.resize(slots, 0);
        Ok(Some(storage))
    }

    fn install_storage(&mut self, size: usize, storage: Option<Vec<i32>>) {
        if let Some(storage) = storage {
            self.deltas = storage;
        }
        self.size = size;
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Clock rate in Hz.
    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// High-pass cutoff in Hz.
    pub fn bass_freq(&self) -> u32 {
        self.bass_freq
    }

    /// Leak shift derived from the bass cutoff.
    pub fn bass_shift(&self) -> u32 {
        self.bass_shift
    }

    /// Buffer length in milliseconds.
    pub fn length(&self) -> u32 {
        self.length_ms
    }

    /// Nominal size in samples.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Allocated delta slots, including the padding past `size`.
    pub fn storage_len(&self) -> usize {
        self.deltas.len()
    }

    /// Samples per clock tick in 16.16 fixed point.
    pub fn factor(&self) -> u32 {
        self.factor
    }

    /// Converts a clock time within the current frame to a fixed-point position.
    #[inline]
    pub fn to_fixed(&self, time: ClockTime) -> Fixed {
        u64::from(time) * u64::from(self.factor) + self.offset
    }

    /// Length of `duration` clocks in fixed point, without the frame offset.
    #[inline]
    pub fn resampled_duration(&self, duration: ClockTime) -> Fixed {
        u64::from(duration) * u64::from(self.factor)
    }

    /// Adds a raw delta at the whole sample containing `position`.
    ///
    /// No kernel and no latency are applied.
    #[inline]
    pub fn deposit(&mut self, position: Fixed, delta: i32) {
        let slot = self.footprint_mut(position, 0, 1);
        slot[0] = slot[0].wrapping_add(delta);
    }

    /// Delta slots `start..start + len` past the sample containing `position`.
    #[inline]
    pub(crate) fn footprint_mut(&mut self, position: Fixed, start: usize, len: usize) -> &mut [i32] {
        let slot = (position >> BUFFER_ACCURACY) as usize;
        debug_assert!(
            slot < self.size,
            "deposit at sample {slot} past buffer size {}",
            self.size
        );
        self.modified = true;
        let begin = slot + start;
        self.dirty_end = self.dirty_end.max(begin + len);
        &mut self.deltas[begin..begin + len]
    }

    /// Makes `duration` clocks of deposits readable and starts a new frame.
    pub fn end_frame(&mut self, duration: ClockTime) {
        debug_assert!(self.factor != 0, "end_frame before clock rate is set");
        self.offset += self.resampled_duration(duration);
        debug_assert!(
            self.samples_avail() <= self.size,
            "frame overflowed buffer of {} samples",
            self.size
        );
    }

    /// Number of samples ready to be read.
    #[inline]
    pub fn samples_avail(&self) -> usize {
        (self.offset >> BUFFER_ACCURACY) as usize
    }

    /// Samples that `duration` more clocks would make available.
    pub fn count_samples(&self, duration: ClockTime) -> usize {
        let last = (self.resampled_duration(duration) + self.offset) >> BUFFER_ACCURACY;
        let first = self.offset >> BUFFER_ACCURACY;
        (last - first) as usize
    }

    /// Clocks needed for `samples` samples (capped at `size`) to become available.
    pub fn count_clocks(&self, samples: usize) -> ClockTime {
        debug_assert!(self.factor != 0, "count_clocks before clock rate is set");
        if self.factor == 0 {
            return 0;
        }
        let target = (samples.min(self.size) as Fixed) << BUFFER_ACCURACY;
        let needed = target.saturating_sub(self.offset);
        let factor = Fixed::from(self.factor);
        ((needed + factor - 1) / factor) as ClockTime
    }

    /// Integrates up to `max_count` samples into `out` and removes them.
    ///
    /// Returns the number written, bounded by [`samples_avail`](Self::samples_avail)
    /// and `out.len()`.
    pub fn read_samples(&mut self, out: &mut [i16], max_count: usize) -> usize {
        let count = self.samples_avail().min(max_count).min(out.len());
        if count == 0 {
            return 0;
        }
        let mut reader = self.reader();
        for (sample, &delta) in out[..count].iter_mut().zip(&self.deltas[..count]) {
            *sample = clamp_sample(reader.step(delta) >> DELTA_BITS);
        }
        self.reader_accum = reader.accum;
        self.discard(count);
        count
    }

    /// Removes `count` samples, folding their deltas into the integrator as
    /// a read would.
    pub fn remove_samples(&mut self, count: usize) {
        debug_assert!(count <= self.samples_avail(), "removing more than available");
        let count = count.min(self.samples_avail());
        if count == 0 {
            return;
        }
        let mut reader = self.reader();
        for &delta in &self.deltas[..count] {
            reader.step(delta);
        }
        self.reader_accum = reader.accum;
        self.discard(count);
    }

    /// Removes `count` samples known to hold no deltas, applying only the leak.
    pub fn remove_silence(&mut self, count: usize) {
        debug_assert!(count <= self.samples_avail(), "removing more than available");
        let count = count.min(self.samples_avail());
        debug_assert!(
            self.deltas[..count].iter().all(|&d| d == 0),
            "remove_silence over deposited deltas"
        );
        self.leak(count);
        self.discard(count);
    }

    /// Adds rendered PCM at the read horizon, aligned with the kernel latency.
    ///
    /// # Panics
    ///
    /// Panics if the samples do not fit in the delta storage.
    pub fn mix_samples(&mut self, input: &[i16]) {
        if input.is_empty() {
            return;
        }
        let start = self.samples_avail() + OUTPUT_LATENCY;
        let end = start + input.len();
        let mut prev = 0i32;
        for (slot, &sample) in self.deltas[start..end].iter_mut().zip(input) {
            let scaled = i32::from(sample) << DELTA_BITS;
            *slot = slot.wrapping_add(scaled - prev);
            prev = scaled;
        }
        self.deltas[end] = self.deltas[end].wrapping_sub(prev);
        self.dirty_end = self.dirty_end.max(end + 1);
        self.modified = true;
    }

    /// Zeroes all deltas and resets the integrator, offset and `modified` flag.
    pub fn clear(&mut self) {
        self.offset = 0;
        self.reader_accum = 0;
        self.modified = false;
        self.dirty_end = 0;
        self.deltas.fill(0);
    }

    /// Current integrator value.
    pub fn integrator(&self) -> i32 {
        self.reader_accum
    }

    /// Overrides the integrator value.
    pub fn set_integrator(&mut self, accum: i32) {
        self.reader_accum = accum;
    }

    /// True once anything has been deposited since the flag was last cleared.
    pub fn modified(&self) -> bool {
        self.modified
    }

    /// Marks the buffer as written without depositing.
    pub fn set_modified(&mut self) {
        self.modified = true;
    }

    /// Captures the state of a drained buffer.
    pub fn save_state(&self) -> Result<BufferState, BufferError> {
        let avail = self.samples_avail();
        if avail != 0 {
            return Err(BufferError::NotDrained(avail));
        }
        let mut pending = [0; BUFFER_EXTRA];
        let n = self.deltas.len().min(BUFFER_EXTRA);
        pending[..n].copy_from_slice(&self.deltas[..n]);
        Ok(BufferState {
            offset: self.offset,
            reader_accum: self.reader_accum,
            pending,
        })
    }

    /// Restores a state captured by [`save_state`](Self::save_state).
    pub fn load_state(&mut self, state: &BufferState) {
        self.clear();
        self.offset = state.offset;
        self.reader_accum = state.reader_accum;
        let n = self.deltas.len().min(BUFFER_EXTRA);
        self.deltas[..n].copy_from_slice(&state.pending[..n]);
        self.dirty_end = n;
    }

    pub(crate) fn clear_modified(&mut self) {
        self.modified = false;
    }

    pub(crate) fn deltas(&self) -> &[i32] {
        &self.deltas
    }

    /// One past the furthest slot written, relative to the read position.
    pub(crate) fn dirty_end(&self) -> usize {
        self.dirty_end
    }

    pub(crate) fn reader(&self) -> Integrator {
        Integrator {
            accum: self.reader_accum,
            bass_shift: self.bass_shift,
        }
    }

    pub(crate) fn finish_reader(&mut self, reader: Integrator) {
        self.reader_accum = reader.accum;
    }

    /// Applies `count` samples of high-pass leak to the integrator.
    pub(crate) fn leak(&mut self, count: usize) {
        let mut reader = self.reader();
        reader.skip(count);
        self.reader_accum = reader.accum;
    }

    /// Drops `count` samples without touching the integrator.
    pub(crate) fn discard(&mut self, count: usize) {
        let end = (self.samples_avail() + BUFFER_EXTRA)
            .max(self.dirty_end)
            .min(self.deltas.len());
        self.offset -= (count as Fixed) << BUFFER_ACCURACY;
        self.deltas.copy_within(count..end, 0);
        self.deltas[end - count..end].fill(0);
        self.dirty_end = self.dirty_end.saturating_sub(count);
    }

    /// Drops `count` samples from a buffer whose deltas are all zero.
    pub(crate) fn discard_cleared(&mut self, count: usize) {
        self.offset -= (count as Fixed) << BUFFER_ACCURACY;
        self.dirty_end = self.dirty_end.saturating_sub(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{FIXED_UNIT, MAX_SAMPLES};

    fn unit_buffer() -> BlipBuffer {
        // One sample per clock, high-pass disabled.
        let mut buf = BlipBuffer::new();
        buf.set_rates(44100, 44100).unwrap();
        buf.set_bass_freq(0);
        buf
    }

    #[test]
    fn test_set_rates_allocates_padding() {
        let mut buf = BlipBuffer::new();
        buf.set_rates(1_789_773, 44100).unwrap();
        assert_eq!(buf.size(), 11070);
        assert_eq!(buf.storage_len(), 11070 + BUFFER_EXTRA);
        assert_eq!(buf.length(), 250);
        assert_eq!(buf.factor(), 1615);
        assert_eq!(buf.bass_shift(), 9);
    }

    #[test]
    fn test_set_rates_error_leaves_state() {
        let mut buf = unit_buffer();
        assert!(buf.set_rates(0, 44100).is_err());
        assert_eq!(buf.clock_rate(), 44100);
        assert_eq!(buf.factor(), FIXED_UNIT as u32);
    }

    #[test]
    fn test_set_sample_rate_max_length() {
        let mut buf = BlipBuffer::new();
        buf.set_sample_rate(44100, 0).unwrap();
        assert_eq!(buf.size(), MAX_SAMPLES);
        assert!(buf.set_sample_rate(44100, 100_000).is_err());
        assert_eq!(buf.size(), MAX_SAMPLES);
    }

    #[test]
    fn test_clock_rate_before_sample_rate() {
        let mut buf = BlipBuffer::new();
        buf.set_clock_rate(1_789_773).unwrap();
        assert_eq!(buf.factor(), 0);
        buf.set_sample_rate(44100, 100).unwrap();
        assert_eq!(buf.factor(), 1615);
    }

    #[test]
    fn test_read_integrates_deltas() {
        let mut buf = unit_buffer();
        buf.deposit(0, 100 << DELTA_BITS);
        buf.deposit(2 * FIXED_UNIT, -30 << DELTA_BITS);
        buf.end_frame(4);

        let mut out = [0i16; 4];
        assert_eq!(buf.read_samples(&mut out, 4), 4);
        assert_eq!(out, [100, 100, 70, 70]);
        assert_eq!(buf.samples_avail(), 0);
    }

    #[test]
    fn test_read_zero_is_noop() {
        let mut buf = unit_buffer();
        buf.deposit(0, 5 << DELTA_BITS);
        buf.end_frame(3);
        let mut out = [0i16; 3];
        assert_eq!(buf.read_samples(&mut out, 0), 0);
        assert_eq!(buf.samples_avail(), 3);
        assert_eq!(buf.integrator(), 0);
    }

    #[test]
    fn test_read_clamps() {
        let mut buf = unit_buffer();
        buf.deposit(0, 40_000 << DELTA_BITS);
        buf.deposit(FIXED_UNIT, -80_000 << DELTA_BITS);
        buf.end_frame(2);
        let mut out = [0i16; 2];
        buf.read_samples(&mut out, 2);
        assert_eq!(out, [i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_partial_read_keeps_remainder() {
        let mut buf = unit_buffer();
        buf.deposit(3 * FIXED_UNIT, 9 << DELTA_BITS);
        buf.end_frame(6);

        let mut out = [0i16; 6];
        assert_eq!(buf.read_samples(&mut out, 2), 2);
        assert_eq!(&out[..2], &[0, 0]);
        assert_eq!(buf.samples_avail(), 4);
        assert_eq!(buf.read_samples(&mut out, 6), 4);
        assert_eq!(&out[..4], &[0, 9, 9, 9]);
    }

    #[test]
    fn test_remove_samples_matches_read() {
        let mut a = unit_buffer();
        a.set_bass_freq(16);
        let mut b = a.clone();
        for buf in [&mut a, &mut b] {
            buf.deposit(FIXED_UNIT, 1000 << DELTA_BITS);
            buf.end_frame(10);
        }
        let mut out = [0i16; 10];
        a.read_samples(&mut out, 10);
        b.remove_samples(10);
        assert_eq!(a.integrator(), b.integrator());
    }

    #[test]
    fn test_remove_silence_leaks() {
        let mut a = unit_buffer();
        a.set_bass_freq(1000);
        a.set_integrator(1 << 24);
        let mut b = a.clone();
        a.end_frame(50);
        b.end_frame(50);

        let mut out = [0i16; 50];
        a.read_samples(&mut out, 50);
        b.remove_silence(50);
        assert_eq!(a.integrator(), b.integrator());
        assert!(b.integrator() < 1 << 24);
    }

    #[test]
    fn test_deposit_after_partial_read_shifts() {
        let mut buf = unit_buffer();
        buf.end_frame(4);
        buf.remove_samples(2);
        // Frame time 0 now lands on what was sample 2.
        let pos = buf.to_fixed(0);
        assert_eq!(pos >> BUFFER_ACCURACY, 2);
        buf.deposit(pos, 7 << DELTA_BITS);
        buf.end_frame(1);
        let mut out = [0i16; 3];
        assert_eq!(buf.read_samples(&mut out, 3), 3);
        assert_eq!(out, [0, 0, 7]);
    }

    #[test]
    fn test_count_samples_and_clocks() {
        let mut buf = BlipBuffer::new();
        buf.set_rates(1_789_773, 44100).unwrap();
        let samples = buf.count_samples(29780);
        assert_eq!(samples, ((29780u64 * 1615) >> 16) as usize);
        let clocks = buf.count_clocks(samples);
        assert!(buf.count_samples(clocks) >= samples);
        assert!(buf.count_samples(clocks - 1) < samples);
    }

    #[test]
    fn test_mix_samples_reproduces_pcm() {
        let mut buf = unit_buffer();
        buf.mix_samples(&[10, -20, 30]);
        buf.end_frame((OUTPUT_LATENCY + 5) as ClockTime);
        let mut out = [0i16; OUTPUT_LATENCY + 5];
        buf.read_samples(&mut out, OUTPUT_LATENCY + 5);
        assert!(out[..OUTPUT_LATENCY].iter().all(|&s| s == 0));
        assert_eq!(&out[OUTPUT_LATENCY..], &[10, -20, 30, 0, 0]);
    }

    #[test]
    fn test_long_mix_survives_partial_reads() {
        let mut buf = unit_buffer();
        buf.mix_samples(&[-40; 50]);
        let mut out = vec![0i16; 100];
        for chunk in out.chunks_mut(10) {
            buf.end_frame(10);
            assert_eq!(buf.read_samples(chunk, 10), 10);
        }
        assert!(out[..OUTPUT_LATENCY].iter().all(|&s| s == 0));
        assert!(out[OUTPUT_LATENCY..OUTPUT_LATENCY + 50].iter().all(|&s| s == -40));
        assert!(out[OUTPUT_LATENCY + 50..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_save_requires_drained() {
        let mut buf = unit_buffer();
        buf.end_frame(3);
        assert_eq!(buf.save_state(), Err(BufferError::NotDrained(3)));
    }

    #[test]
    fn test_save_load_continues() {
        let mut a = unit_buffer();
        a.set_bass_freq(16);
        a.deposit(0, 500 << DELTA_BITS);
        a.end_frame(1);
        a.remove_samples(1);
        // A step straddling the frame boundary leaves a pending delta.
        a.deposit(a.to_fixed(2), -200 << DELTA_BITS);
        let state = a.save_state().unwrap();

        let mut b = unit_buffer();
        b.set_bass_freq(16);
        b.load_state(&state);
        assert_eq!(b.integrator(), a.integrator());

        a.end_frame(4);
        b.end_frame(4);
        let mut out_a = [0i16; 4];
        let mut out_b = [0i16; 4];
        a.read_samples(&mut out_a, 4);
        b.read_samples(&mut out_b, 4);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_clear_resets() {
        let mut buf = unit_buffer();
        buf.deposit(0, 1 << DELTA_BITS);
        buf.end_frame(2);
        buf.clear();
        assert_eq!(buf.samples_avail(), 0);
        assert!(!buf.modified());
        assert!(buf.deltas().iter().all(|&d| d == 0));
    }
}
