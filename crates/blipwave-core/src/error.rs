//! Error type for buffer and channel configuration.

use thiserror::Error;

/// Errors returned by the configuration entry points of the buffers.
///
/// Contract violations on the hot path (deposits past the end of a buffer,
/// `end_frame` before the rates are set, odd stereo read counts) are not
/// reported here; they are checked with `debug_assert!`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A clock or sample rate of zero.
    #[error("invalid rate: clock {clock_rate} Hz, sample {sample_rate} Hz")]
    InvalidRate {
        /// Clock rate in Hz.
        clock_rate: u32,
        /// Sample rate in Hz.
        sample_rate: u32,
    },

    /// The sample/clock ratio rounds to zero or overflows 16.16 fixed point.
    #[error("sample/clock ratio {sample_rate}/{clock_rate} is not representable in fixed point")]
    UnrepresentableRatio {
        /// Clock rate in Hz.
        clock_rate: u32,
        /// Sample rate in Hz.
        sample_rate: u32,
    },

    /// Requested length exceeds what the fixed-point offset can address.
    #[error("buffer length of {requested} samples exceeds the maximum of {max}")]
    LengthTooLong {
        /// Samples the requested length works out to.
        requested: u64,
        /// Largest supported length in samples.
        max: usize,
    },

    /// Delta storage could not be reserved.
    #[error("out of memory reserving {slots} delta slots")]
    OutOfMemory {
        /// Number of slots that were requested.
        slots: usize,
    },

    /// A multi-buffer needs at least one channel.
    #[error("channel count must be at least 1, got {0}")]
    InvalidChannelCount(usize),

    /// The channel type list does not have one entry per channel.
    #[error("{types} channel types supplied for {channels} channels")]
    ChannelTypeMismatch {
        /// Requested channel count.
        channels: usize,
        /// Length of the supplied type list.
        types: usize,
    },

    /// State can only be captured from a buffer with nothing left to read.
    #[error("buffer still holds {0} unread samples")]
    NotDrained(usize),
}
