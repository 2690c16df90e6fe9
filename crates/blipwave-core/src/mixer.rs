//! Interleaved stereo output from left, right and center buffers.

use crate::buffer::{Integrator, clamp_sample};
use crate::fixed::DELTA_BITS;
use crate::tracked::TrackedBuffer;

/// Index of the left buffer in a `[left, right, center]` triple.
pub const LEFT: usize = 0;
/// Index of the right buffer.
pub const RIGHT: usize = 1;
/// Index of the center buffer.
pub const CENTER: usize = 2;

#[inline]
fn clamp_wide(sample: i64) -> i16 {
    sample.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

/// Mixes three tracked buffers into interleaved pairs.
///
/// Left output is center + left, right output is center + right, summed at
/// integrator precision before truncation. Samples are read starting at
/// `samples_read`; removing them from the buffers is left to the owner.
#[derive(Debug)]
pub struct StereoMixer<'a> {
    left: &'a mut TrackedBuffer,
    right: &'a mut TrackedBuffer,
    center: &'a mut TrackedBuffer,
    samples_read: usize,
}

impl<'a> StereoMixer<'a> {
    /// Borrows a `[left, right, center]` triple with `samples_read` samples
    /// already consumed.
    pub fn new(bufs: &'a mut [TrackedBuffer; 3], samples_read: usize) -> Self {
        let [left, right, center] = bufs;
        Self {
            left,
            right,
            center,
            samples_read,
        }
    }

    /// Samples consumed so far.
    pub fn samples_read(&self) -> usize {
        self.samples_read
    }

    /// Pairs that can still be read.
    pub fn pairs_avail(&self) -> usize {
        self.center.samples_avail().saturating_sub(self.samples_read)
    }

    /// Writes up to `pair_count` interleaved pairs into `out`.
    ///
    /// Returns the number of pairs written, which is short when fewer are
    /// available or `out` is too small.
    pub fn read_pairs(&mut self, out: &mut [i16], pair_count: usize) -> usize {
        let count = pair_count.min(self.pairs_avail()).min(out.len() / 2);
        if count == 0 {
            return 0;
        }
        let out = &mut out[..count * 2];
        if self.left.non_silent() || self.right.non_silent() {
            self.mix_stereo(out);
        } else {
            self.mix_mono(out);
        }
        self.samples_read += count;
        count
    }

    fn mix_mono(&mut self, out: &mut [i16]) {
        let count = out.len() / 2;
        let start = self.samples_read;
        let mut center = self.center.reader();
        let deltas = &self.center.deltas()[start..start + count];
        for (pair, &delta) in out.chunks_exact_mut(2).zip(deltas) {
            let sample = clamp_sample(center.step(delta) >> DELTA_BITS);
            pair[0] = sample;
            pair[1] = sample;
        }
        self.center.finish_reader(center);
        self.left.leak(count);
        self.right.leak(count);
    }

    fn mix_stereo(&mut self, out: &mut [i16]) {
        let count = out.len() / 2;
        let range = self.samples_read..self.samples_read + count;
        let mut center: Integrator = self.center.reader();
        let mut left = self.left.reader();
        let mut right = self.right.reader();
        let center_deltas = &self.center.deltas()[range.clone()];
        let left_deltas = &self.left.deltas()[range.clone()];
        let right_deltas = &self.right.deltas()[range];

        for (i, pair) in out.chunks_exact_mut(2).enumerate() {
            let c = i64::from(center.step(center_deltas[i]));
            let l = i64::from(left.step(left_deltas[i]));
            let r = i64::from(right.step(right_deltas[i]));
            pair[0] = clamp_wide((c + l) >> DELTA_BITS);
            pair[1] = clamp_wide((c + r) >> DELTA_BITS);
        }

        self.center.finish_reader(center);
        self.left.finish_reader(left);
        self.right.finish_reader(right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FIXED_UNIT;

    fn triple() -> [TrackedBuffer; 3] {
        core::array::from_fn(|_| {
            let mut buf = TrackedBuffer::new();
            buf.set_rates(44100, 44100).unwrap();
            buf.set_bass_freq(0);
            buf
        })
    }

    #[test]
    fn test_mono_path_duplicates_center() {
        let mut bufs = triple();
        bufs[CENTER].deposit(FIXED_UNIT, 12 << DELTA_BITS);
        for buf in &mut bufs {
            buf.end_frame(3);
        }
        let mut mixer = StereoMixer::new(&mut bufs, 0);
        let mut out = [0i16; 6];
        assert_eq!(mixer.read_pairs(&mut out, 3), 3);
        assert_eq!(out, [0, 0, 12, 12, 12, 12]);
        assert_eq!(mixer.samples_read(), 3);
    }

    #[test]
    fn test_stereo_sum_saturates() {
        let mut bufs = triple();
        bufs[CENTER].deposit(0, 30_000 << DELTA_BITS);
        bufs[LEFT].deposit(0, 30_000 << DELTA_BITS);
        bufs[RIGHT].deposit(0, -70_000 << DELTA_BITS);
        for buf in &mut bufs {
            buf.end_frame(1);
        }
        let mut out = [0i16; 2];
        StereoMixer::new(&mut bufs, 0).read_pairs(&mut out, 1);
        assert_eq!(out, [i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_short_read() {
        let mut bufs = triple();
        for buf in &mut bufs {
            buf.end_frame(2);
        }
        let mut out = [0i16; 8];
        let mut mixer = StereoMixer::new(&mut bufs, 1);
        assert_eq!(mixer.pairs_avail(), 1);
        assert_eq!(mixer.read_pairs(&mut out, 4), 1);
        assert_eq!(mixer.read_pairs(&mut out, 4), 0);
    }
}
