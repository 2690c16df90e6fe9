//! Output layouts: mono, stereo and silent.
//!
//! A [`MultiBuffer`] owns the buffers a sound chip writes into and hands out
//! [`Channel`]s of [`BufferId`] handles, one per chip voice. Handles carry the
//! generation of the channel layout they were issued under; after
//! [`set_channel_count`](MultiBuffer::set_channel_count) they resolve to
//! nothing and must be fetched again.
//!
//! ```rust
//! use blipwave_core::{DeltaSynth, FastSynth, MultiBuffer};
//!
//! let mut multi = MultiBuffer::stereo();
//! multi.set_sample_rate(44100, 100).unwrap();
//! multi.set_clock_rate(1_789_773).unwrap();
//!
//! let mut synth = FastSynth::with_range(15);
//! synth.volume(0.5);
//! let channel = multi.channel(0).unwrap();
//! synth.set_output(Some(channel.center));
//!
//! assert!(synth.update_routed(0, 15, &mut multi));
//! multi.end_frame(29780);
//!
//! let mut pcm = vec![0i16; 2 * 1024];
//! let read = multi.read_samples(&mut pcm, 2 * 1024);
//! assert_eq!(read % 2, 0);
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::buffer::BlipBuffer;
use crate::error::BufferError;
use crate::fixed::{ClockTime, DEFAULT_LENGTH_MS, clock_factor, length_for, samples_for_length};
use crate::mixer::{CENTER, LEFT, RIGHT, StereoMixer};
use crate::tracked::TrackedBuffer;

/// What a chip voice produces, for layouts that place voices differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Tonal voice (pulse, triangle, wavetable).
    Wave,
    /// Noise voice.
    Noise,
    /// Voice already mixing several sources.
    Mixed,
}

/// Chip-specific voice index plus its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelType {
    /// Voice index within the chip.
    pub index: u8,
    /// Voice kind.
    pub kind: ChannelKind,
}

impl ChannelType {
    /// Creates a channel type.
    pub const fn new(index: u8, kind: ChannelKind) -> Self {
        Self { index, kind }
    }
}

/// Which buffer of a layout a handle names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Left-only buffer.
    Left,
    /// Right-only buffer.
    Right,
    /// Buffer shared by both sides.
    Center,
}

/// Weak reference to a buffer owned by a [`MultiBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId {
    slot: Slot,
    generation: u32,
}

impl BufferId {
    /// Buffer this handle names.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Layout generation this handle was issued under.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Center, left and right buffers of one voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channel {
    /// Buffer heard on both sides.
    pub center: BufferId,
    /// Buffer heard on the left only.
    pub left: BufferId,
    /// Buffer heard on the right only.
    pub right: BufferId,
}

/// Configuration shared by every layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLayout {
    channel_count: usize,
    channel_types: Vec<ChannelType>,
    sample_rate: u32,
    length_ms: u32,
    changed_count: u32,
    samples_per_frame: usize,
}

impl ChannelLayout {
    fn new(samples_per_frame: usize) -> Self {
        Self {
            channel_count: 1,
            channel_types: Vec::new(),
            sample_rate: 0,
            length_ms: DEFAULT_LENGTH_MS,
            changed_count: 1,
            samples_per_frame,
        }
    }

    /// Number of voices.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Voice types, empty when none were given.
    pub fn channel_types(&self) -> &[ChannelType] {
        &self.channel_types
    }

    /// Output sample rate in Hz, zero until set.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Buffer length in milliseconds.
    pub fn length(&self) -> u32 {
        self.length_ms
    }

    /// Incremented on every change to the channel layout.
    pub fn channels_changed_count(&self) -> u32 {
        self.changed_count
    }

    /// Output samples per sample frame: 2 for stereo, 1 otherwise.
    pub fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    fn set_channel_count(
        &mut self,
        count: usize,
        types: Option<&[ChannelType]>,
    ) -> Result<(), BufferError> {
        if count == 0 {
            return Err(BufferError::InvalidChannelCount(count));
        }
        match types {
            Some(types) if types.len() != count => {
                return Err(BufferError::ChannelTypeMismatch {
                    channels: count,
                    types: types.len(),
                });
            }
            _ => {}
        }
        self.channel_count = count;
        self.channel_types = types.map(<[ChannelType]>::to_vec).unwrap_or_default();
        self.changed_count = self.changed_count.wrapping_add(1);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            count,
            generation = self.changed_count,
            "multi_buffer: channels changed"
        );
        Ok(())
    }

    fn id(&self, slot: Slot) -> BufferId {
        BufferId {
            slot,
            generation: self.changed_count,
        }
    }

    fn channel(&self, index: usize) -> Option<Channel> {
        (index < self.channel_count).then(|| Channel {
            center: self.id(Slot::Center),
            left: self.id(Slot::Left),
            right: self.id(Slot::Right),
        })
    }

    fn is_current(&self, id: BufferId) -> bool {
        id.generation == self.changed_count
    }
}

/// Single buffer; every voice and side writes into it.
#[derive(Debug, Clone)]
pub struct MonoBuffer {
    layout: ChannelLayout,
    buf: BlipBuffer,
}

impl Default for MonoBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MonoBuffer {
    /// Creates an unconfigured mono layout.
    pub fn new() -> Self {
        Self {
            layout: ChannelLayout::new(1),
            buf: BlipBuffer::new(),
        }
    }

    /// Shared layout configuration.
    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    /// The buffer itself.
    pub fn center(&mut self) -> &mut BlipBuffer {
        &mut self.buf
    }

    /// Sets the number of voices and optionally their types.
    pub fn set_channel_count(
        &mut self,
        count: usize,
        types: Option<&[ChannelType]>,
    ) -> Result<(), BufferError> {
        self.layout.set_channel_count(count, types)
    }

    /// Handles for voice `index`; all three name the single buffer.
    pub fn channel(&self, index: usize) -> Option<Channel> {
        self.layout.channel(index)
    }

    /// Resolves a handle.
    pub fn buffer_mut(&mut self, id: BufferId) -> Option<&mut BlipBuffer> {
        self.layout.is_current(id).then_some(&mut self.buf)
    }

    /// Sets the sample rate and length.
    pub fn set_sample_rate(&mut self, sample_rate: u32, length_ms: u32) -> Result<(), BufferError> {
        self.buf.set_sample_rate(sample_rate, length_ms)?;
        self.layout.sample_rate = sample_rate;
        self.layout.length_ms = self.buf.length();
        Ok(())
    }

    /// Sets the clock rate.
    pub fn set_clock_rate(&mut self, clock_rate: u32) -> Result<(), BufferError> {
        self.buf.set_clock_rate(clock_rate)
    }

    /// Sets the bass cutoff.
    pub fn set_bass_freq(&mut self, bass_freq: u32) {
        self.buf.set_bass_freq(bass_freq);
    }

    /// Clears the buffer.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Ends the frame.
    pub fn end_frame(&mut self, duration: ClockTime) {
        self.buf.end_frame(duration);
    }

    /// Samples ready to read.
    pub fn samples_avail(&self) -> usize {
        self.buf.samples_avail()
    }

    /// Reads mono samples.
    pub fn read_samples(&mut self, out: &mut [i16], max_count: usize) -> usize {
        self.buf.read_samples(out, max_count)
    }
}

/// Left, right and center buffers mixed into interleaved stereo.
///
/// Every voice maps to the same three buffers. Reads must ask for an even
/// number of samples.
#[derive(Debug, Clone)]
pub struct StereoBuffer {
    layout: ChannelLayout,
    bufs: [TrackedBuffer; 3],
    samples_read: usize,
    immediate_removal: bool,
}

impl Default for StereoBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl StereoBuffer {
    /// Creates an unconfigured stereo layout.
    pub fn new() -> Self {
        Self {
            layout: ChannelLayout::new(2),
            bufs: Default::default(),
            samples_read: 0,
            immediate_removal: true,
        }
    }

    /// Shared layout configuration.
    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    /// Left buffer.
    pub fn left(&mut self) -> &mut TrackedBuffer {
        &mut self.bufs[LEFT]
    }

    /// Right buffer.
    pub fn right(&mut self) -> &mut TrackedBuffer {
        &mut self.bufs[RIGHT]
    }

    /// Center buffer.
    pub fn center(&mut self) -> &mut TrackedBuffer {
        &mut self.bufs[CENTER]
    }

    /// Keeps read samples in the buffers until everything available has
    /// been read, instead of removing them after each read.
    pub fn disable_immediate_removal(&mut self) {
        self.immediate_removal = false;
    }

    /// Sets the number of voices and optionally their types.
    pub fn set_channel_count(
        &mut self,
        count: usize,
        types: Option<&[ChannelType]>,
    ) -> Result<(), BufferError> {
        self.layout.set_channel_count(count, types)
    }

    /// Handles for voice `index`.
    pub fn channel(&self, index: usize) -> Option<Channel> {
        self.layout.channel(index)
    }

    /// Resolves a handle.
    pub fn buffer_mut(&mut self, id: BufferId) -> Option<&mut BlipBuffer> {
        if !self.layout.is_current(id) {
            return None;
        }
        let index = match id.slot {
            Slot::Left => LEFT,
            Slot::Right => RIGHT,
            Slot::Center => CENTER,
        };
        let buf: &mut BlipBuffer = &mut self.bufs[index];
        Some(buf)
    }

    /// Sets the sample rate and length of all three buffers.
    ///
    /// All three buffers are validated and allocated before any of them
    /// changes, so on error they keep their previous configuration.
    pub fn set_sample_rate(&mut self, sample_rate: u32, length_ms: u32) -> Result<(), BufferError> {
        let left = self.bufs[LEFT].prepare_sample_rate(sample_rate, length_ms)?;
        let right = self.bufs[RIGHT].prepare_sample_rate(sample_rate, length_ms)?;
        let center = self.bufs[CENTER].prepare_sample_rate(sample_rate, length_ms)?;
        for (index, change) in [(LEFT, left), (RIGHT, right), (CENTER, center)] {
            let buf = &mut self.bufs[index];
            buf.apply_sample_rate(change);
            buf.clear();
        }
        self.samples_read = 0;
        self.layout.sample_rate = sample_rate;
        self.layout.length_ms = self.bufs[CENTER].length();
        Ok(())
    }

    /// Sets the clock rate of all three buffers.
    pub fn set_clock_rate(&mut self, clock_rate: u32) -> Result<(), BufferError> {
        for buf in &mut self.bufs {
            buf.set_clock_rate(clock_rate)?;
        }
        Ok(())
    }

    /// Sets the bass cutoff of all three buffers.
    pub fn set_bass_freq(&mut self, bass_freq: u32) {
        for buf in &mut self.bufs {
            buf.set_bass_freq(bass_freq);
        }
    }

    /// Clears all three buffers.
    pub fn clear(&mut self) {
        self.samples_read = 0;
        for buf in &mut self.bufs {
            buf.clear();
        }
    }

    /// Ends the frame in all three buffers.
    pub fn end_frame(&mut self, duration: ClockTime) {
        for buf in &mut self.bufs {
            buf.end_frame(duration);
        }
    }

    /// Interleaved samples ready to read.
    pub fn samples_avail(&self) -> usize {
        self.bufs[CENTER]
            .samples_avail()
            .saturating_sub(self.samples_read)
            * 2
    }

    /// Reads interleaved left/right pairs; returns the number of samples
    /// written, always even.
    pub fn read_samples(&mut self, out: &mut [i16], max_count: usize) -> usize {
        debug_assert!(max_count % 2 == 0, "stereo reads need an even count");
        let pair_count = max_count.min(self.samples_avail()).min(out.len()) / 2;
        if pair_count == 0 {
            return 0;
        }

        let mut mixer = StereoMixer::new(&mut self.bufs, self.samples_read);
        let pairs = mixer.read_pairs(out, pair_count);
        self.samples_read = mixer.samples_read();

        if self.immediate_removal || self.samples_avail() == 0 {
            for buf in &mut self.bufs {
                buf.discard_mixed(self.samples_read);
            }
            self.samples_read = 0;
        }
        pairs * 2
    }
}

/// Layout that produces nothing.
#[derive(Debug, Clone)]
pub struct SilentBuffer {
    layout: ChannelLayout,
    clock_rate: u32,
}

impl Default for SilentBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SilentBuffer {
    /// Creates a silent layout.
    pub fn new() -> Self {
        Self {
            layout: ChannelLayout::new(1),
            clock_rate: 0,
        }
    }

    /// Shared layout configuration.
    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    /// Sets the number of voices and optionally their types.
    pub fn set_channel_count(
        &mut self,
        count: usize,
        types: Option<&[ChannelType]>,
    ) -> Result<(), BufferError> {
        self.layout.set_channel_count(count, types)
    }

    /// Always `None`: there are no buffers to write into.
    pub fn channel(&self, _index: usize) -> Option<Channel> {
        None
    }

    /// Always `None`.
    pub fn buffer_mut(&mut self, _id: BufferId) -> Option<&mut BlipBuffer> {
        None
    }

    /// Records the sample rate and length, rejecting what a real buffer
    /// would reject.
    pub fn set_sample_rate(&mut self, sample_rate: u32, length_ms: u32) -> Result<(), BufferError> {
        if sample_rate == 0 {
            return Err(BufferError::InvalidRate {
                clock_rate: self.clock_rate,
                sample_rate,
            });
        }
        let size = samples_for_length(sample_rate, length_ms)?;
        if self.clock_rate != 0 {
            clock_factor(self.clock_rate, sample_rate)?;
        }
        self.layout.sample_rate = sample_rate;
        self.layout.length_ms = length_for(size, sample_rate);
        Ok(())
    }

    /// Records the clock rate after the same checks a real buffer applies.
    pub fn set_clock_rate(&mut self, clock_rate: u32) -> Result<(), BufferError> {
        if clock_rate == 0 {
            return Err(BufferError::InvalidRate {
                clock_rate,
                sample_rate: self.layout.sample_rate,
            });
        }
        if self.layout.sample_rate != 0 {
            clock_factor(clock_rate, self.layout.sample_rate)?;
        }
        self.clock_rate = clock_rate;
        Ok(())
    }

    /// Accepted and ignored.
    pub fn set_bass_freq(&mut self, _bass_freq: u32) {}

    /// Nothing to clear.
    pub fn clear(&mut self) {}

    /// Nothing to end.
    pub fn end_frame(&mut self, _duration: ClockTime) {}

    /// Always zero.
    pub fn samples_avail(&self) -> usize {
        0
    }

    /// Always zero.
    pub fn read_samples(&mut self, _out: &mut [i16], _max_count: usize) -> usize {
        0
    }
}

/// One of the output layouts, dispatched by `match`.
#[derive(Debug, Clone)]
pub enum MultiBuffer {
    /// Single buffer.
    Mono(MonoBuffer),
    /// Left, right and center buffers mixed to interleaved stereo.
    Stereo(StereoBuffer),
    /// No output.
    Silent(SilentBuffer),
}

macro_rules! dispatch {
    ($self:expr, $buf:ident => $body:expr) => {
        match $self {
            MultiBuffer::Mono($buf) => $body,
            MultiBuffer::Stereo($buf) => $body,
            MultiBuffer::Silent($buf) => $body,
        }
    };
}

impl MultiBuffer {
    /// Creates a mono layout.
    pub fn mono() -> Self {
        Self::Mono(MonoBuffer::new())
    }

    /// Creates a stereo layout.
    pub fn stereo() -> Self {
        Self::Stereo(StereoBuffer::new())
    }

    /// Creates a silent layout.
    pub fn silent() -> Self {
        Self::Silent(SilentBuffer::new())
    }

    /// Shared layout configuration.
    pub fn layout(&self) -> &ChannelLayout {
        dispatch!(self, b => b.layout())
    }

    /// Sets the number of voices and optionally one type per voice.
    ///
    /// Handles issued before the change stop resolving.
    pub fn set_channel_count(
        &mut self,
        count: usize,
        types: Option<&[ChannelType]>,
    ) -> Result<(), BufferError> {
        dispatch!(self, b => b.set_channel_count(count, types))
    }

    /// Handles for voice `index`, or `None` past the channel count or for
    /// the silent layout.
    pub fn channel(&self, index: usize) -> Option<Channel> {
        dispatch!(self, b => b.channel(index))
    }

    /// Resolves a handle, or `None` if it is stale.
    pub fn buffer_mut(&mut self, id: BufferId) -> Option<&mut BlipBuffer> {
        dispatch!(self, b => b.buffer_mut(id))
    }

    /// Sets the output sample rate and buffer length. Zero length selects
    /// the maximum.
    pub fn set_sample_rate(&mut self, sample_rate: u32, length_ms: u32) -> Result<(), BufferError> {
        dispatch!(self, b => b.set_sample_rate(sample_rate, length_ms))
    }

    /// Sets the clock rate.
    pub fn set_clock_rate(&mut self, clock_rate: u32) -> Result<(), BufferError> {
        dispatch!(self, b => b.set_clock_rate(clock_rate))
    }

    /// Sets the bass cutoff.
    pub fn set_bass_freq(&mut self, bass_freq: u32) {
        dispatch!(self, b => b.set_bass_freq(bass_freq))
    }

    /// Clears every buffer.
    pub fn clear(&mut self) {
        dispatch!(self, b => b.clear())
    }

    /// Ends the frame in every buffer.
    pub fn end_frame(&mut self, duration: ClockTime) {
        dispatch!(self, b => b.end_frame(duration))
    }

    /// Output samples ready to read.
    pub fn samples_avail(&self) -> usize {
        dispatch!(self, b => b.samples_avail())
    }

    /// Reads output samples; stereo output is interleaved.
    pub fn read_samples(&mut self, out: &mut [i16], max_count: usize) -> usize {
        dispatch!(self, b => b.read_samples(out, max_count))
    }

    /// Output samples per sample frame.
    pub fn samples_per_frame(&self) -> usize {
        self.layout().samples_per_frame()
    }

    /// Number of voices.
    pub fn channel_count(&self) -> usize {
        self.layout().channel_count()
    }

    /// Layout generation counter.
    pub fn channels_changed_count(&self) -> u32 {
        self.layout().channels_changed_count()
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.layout().sample_rate()
    }

    /// Buffer length in milliseconds.
    pub fn length(&self) -> u32 {
        self.layout().length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{DELTA_BITS, FIXED_UNIT};

    fn configured(mut multi: MultiBuffer) -> MultiBuffer {
        multi.set_sample_rate(44100, 100).unwrap();
        multi.set_clock_rate(44100).unwrap();
        multi.set_bass_freq(0);
        multi
    }

    #[test]
    fn test_samples_per_frame() {
        assert_eq!(MultiBuffer::mono().samples_per_frame(), 1);
        assert_eq!(MultiBuffer::stereo().samples_per_frame(), 2);
        assert_eq!(MultiBuffer::silent().samples_per_frame(), 1);
    }

    #[test]
    fn test_channel_count_validation() {
        let mut multi = MultiBuffer::mono();
        assert_eq!(
            multi.set_channel_count(0, None),
            Err(BufferError::InvalidChannelCount(0))
        );
        let types = [ChannelType::new(0, ChannelKind::Wave)];
        assert_eq!(
            multi.set_channel_count(2, Some(&types)),
            Err(BufferError::ChannelTypeMismatch {
                channels: 2,
                types: 1
            })
        );
        assert_eq!(multi.channel_count(), 1);
    }

    #[test]
    fn test_channel_types_recorded() {
        let mut multi = MultiBuffer::stereo();
        let types = [
            ChannelType::new(0, ChannelKind::Wave),
            ChannelType::new(1, ChannelKind::Noise),
        ];
        multi.set_channel_count(2, Some(&types)).unwrap();
        assert_eq!(multi.layout().channel_types(), &types);
        assert!(multi.channel(1).is_some());
        assert!(multi.channel(2).is_none());
    }

    #[test]
    fn test_stale_handle_after_channel_change() {
        let mut multi = configured(MultiBuffer::mono());
        let before = multi.channels_changed_count();
        let old = multi.channel(0).unwrap();
        multi.set_channel_count(3, None).unwrap();
        assert_eq!(multi.channels_changed_count(), before + 1);
        assert!(multi.buffer_mut(old.center).is_none());
        let new = multi.channel(2).unwrap();
        assert!(multi.buffer_mut(new.center).is_some());
    }

    #[test]
    fn test_silent_has_no_buffers() {
        let mut multi = configured(MultiBuffer::silent());
        assert!(multi.channel(0).is_none());
        multi.end_frame(100);
        let mut out = [0i16; 8];
        assert_eq!(multi.read_samples(&mut out, 8), 0);
        assert_eq!(multi.sample_rate(), 44100);
    }

    #[test]
    fn test_mono_pass_through() {
        let mut multi = configured(MultiBuffer::mono());
        let id = multi.channel(0).unwrap().left;
        multi.buffer_mut(id).unwrap().deposit(0, 42 << DELTA_BITS);
        multi.end_frame(3);
        assert_eq!(multi.samples_avail(), 3);
        let mut out = [0i16; 3];
        assert_eq!(multi.read_samples(&mut out, 3), 3);
        assert_eq!(out, [42, 42, 42]);
    }

    #[test]
    fn test_stereo_deferred_removal() {
        let mut multi = configured(MultiBuffer::stereo());
        if let MultiBuffer::Stereo(stereo) = &mut multi {
            stereo.disable_immediate_removal();
        }
        let channel = multi.channel(0).unwrap();
        multi
            .buffer_mut(channel.right)
            .unwrap()
            .deposit(FIXED_UNIT, 5 << DELTA_BITS);
        multi.end_frame(4);
        assert_eq!(multi.samples_avail(), 8);

        let mut out = [0i16; 4];
        assert_eq!(multi.read_samples(&mut out, 4), 4);
        assert_eq!(out, [0, 0, 0, 5]);
        assert_eq!(multi.samples_avail(), 4);
        assert_eq!(multi.read_samples(&mut out, 4), 4);
        assert_eq!(out, [0, 5, 0, 5]);
        assert_eq!(multi.samples_avail(), 0);

        // Drained: the next frame starts from the beginning of storage.
        multi.end_frame(1);
        assert_eq!(multi.samples_avail(), 2);
    }

    #[test]
    fn test_stereo_long_mix_returns_to_zero() {
        let mut multi = configured(MultiBuffer::stereo());
        let left = multi.channel(0).unwrap().left;
        multi.buffer_mut(left).unwrap().mix_samples(&[100; 60]);

        let mut out = vec![0i16; 240];
        let mut read = 0;
        for _ in 0..12 {
            multi.end_frame(10);
            read += multi.read_samples(&mut out[read..], 20);
        }
        assert_eq!(read, 240);

        let lefts: Vec<i16> = out.iter().step_by(2).copied().collect();
        assert!(lefts[..16].iter().all(|&s| s == 0));
        assert!(lefts[16..76].iter().all(|&s| s == 100));
        assert!(lefts[76..].iter().all(|&s| s == 0));
        assert!(out.iter().skip(1).step_by(2).all(|&s| s == 0));
        if let MultiBuffer::Stereo(stereo) = &mut multi {
            assert!(!stereo.left().non_silent());
        }
    }

    #[test]
    fn test_silent_validates_like_buffers() {
        let mut silent = MultiBuffer::silent();
        let mut mono = MultiBuffer::mono();
        for multi in [&mut silent, &mut mono] {
            multi.set_clock_rate(1_789_773).unwrap();
            assert!(matches!(
                multi.set_sample_rate(44100, 70_000),
                Err(BufferError::LengthTooLong { .. })
            ));
            assert_eq!(
                multi.set_sample_rate(0, 100),
                Err(BufferError::InvalidRate {
                    clock_rate: 1_789_773,
                    sample_rate: 0
                })
            );
            multi.set_sample_rate(44100, 100).unwrap();
        }
        assert_eq!(silent.length(), mono.length());
        assert!(silent.set_clock_rate(0).is_err());
    }

    #[test]
    fn test_stereo_sample_rate_error_keeps_buffers() {
        let mut multi = configured(MultiBuffer::stereo());
        assert!(multi.set_sample_rate(44100, 1_000_000).is_err());
        assert_eq!(multi.sample_rate(), 44100);
        assert_eq!(multi.length(), 100);
        if let MultiBuffer::Stereo(stereo) = &mut multi {
            let sizes = [stereo.left().size(), stereo.right().size(), stereo.center().size()];
            assert!(sizes.iter().all(|&size| size == sizes[0]));
        }
    }
}
