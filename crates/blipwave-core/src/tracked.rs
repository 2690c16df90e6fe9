//! Buffer wrapper that knows when its output has gone quiet.

use core::ops::{Deref, DerefMut};

use crate::buffer::BlipBuffer;
use crate::fixed::{BUFFER_EXTRA, ClockTime, DELTA_BITS};

/// [`BlipBuffer`] plus a horizon of samples that may still be non-silent.
///
/// Each [`end_frame`](Self::end_frame) after a deposit pushes the horizon to
/// `samples_avail + BUFFER_EXTRA`, or further if mixed samples reach past
/// that; every removed sample pulls it back by one.
/// Once it reaches zero every delta slot is zero, so silent stretches can be
/// skipped without touching storage.
///
/// Reads and removals must go through the methods here, not the
/// dereferenced [`BlipBuffer`], or the horizon falls out of step.
#[derive(Debug, Clone, Default)]
pub struct TrackedBuffer {
    buffer: BlipBuffer,
    last_non_silence: usize,
}

impl Deref for TrackedBuffer {
    type Target = BlipBuffer;

    fn deref(&self) -> &BlipBuffer {
        &self.buffer
    }
}

impl DerefMut for TrackedBuffer {
    fn deref_mut(&mut self) -> &mut BlipBuffer {
        &mut self.buffer
    }
}

impl TrackedBuffer {
    /// Creates an unconfigured buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while deposited deltas may still affect the output, or the
    /// integrator has not decayed below one output unit.
    pub fn non_silent(&self) -> bool {
        self.last_non_silence != 0 || (self.buffer.integrator() >> DELTA_BITS) != 0
    }

    /// Ends the frame, extending the non-silence horizon if anything was written.
    pub fn end_frame(&mut self, duration: ClockTime) {
        self.buffer.end_frame(duration);
        if self.buffer.modified() {
            self.buffer.clear_modified();
            self.last_non_silence =
                (self.buffer.samples_avail() + BUFFER_EXTRA).max(self.buffer.dirty_end());
        }
    }

    /// Clears the buffer and the horizon.
    pub fn clear(&mut self) {
        self.last_non_silence = 0;
        self.buffer.clear();
    }

    /// Reads samples as [`BlipBuffer::read_samples`] does.
    pub fn read_samples(&mut self, out: &mut [i16], max_count: usize) -> usize {
        let count = self.buffer.read_samples(out, max_count);
        self.consume(count);
        count
    }

    /// Removes samples as [`BlipBuffer::remove_samples`] does.
    pub fn remove_samples(&mut self, count: usize) {
        let count = count.min(self.buffer.samples_avail());
        self.buffer.remove_samples(count);
        self.consume(count);
    }

    /// Removes silent samples, skipping the storage shift when nothing is pending.
    pub fn remove_silence(&mut self, count: usize) {
        let count = count.min(self.buffer.samples_avail());
        if self.is_cleared() {
            self.buffer.leak(count);
            self.buffer.discard_cleared(count);
        } else {
            self.buffer.remove_silence(count);
        }
        self.consume(count);
    }

    /// Drops everything available, taking the silent path when possible.
    pub fn remove_all_samples(&mut self) {
        let avail = self.buffer.samples_avail();
        if self.non_silent() {
            self.remove_samples(avail);
        } else {
            self.remove_silence(avail);
        }
    }

    /// Applies the integrator leak of `count` samples without removing them.
    pub(crate) fn leak(&mut self, count: usize) {
        self.buffer.leak(count);
    }

    /// Drops `count` samples whose deltas a mixer already integrated.
    pub(crate) fn discard_mixed(&mut self, count: usize) {
        if self.is_cleared() {
            self.buffer.discard_cleared(count);
        } else {
            self.buffer.discard(count);
        }
        self.consume(count);
    }

    /// Horizon in samples.
    pub fn non_silence_horizon(&self) -> usize {
        self.last_non_silence
    }

    /// True when every delta slot is known to be zero.
    fn is_cleared(&self) -> bool {
        self.last_non_silence == 0 && !self.buffer.modified()
    }

    fn consume(&mut self, count: usize) {
        self.last_non_silence = self.last_non_silence.saturating_sub(count);
    }
}
