//! Blipwave Core - band-limited step synthesis for emulated sound chips
//!
//! Sound chips change their output level at arbitrary clock ticks. This crate
//! records each change as a band-limited step in a delta buffer and resamples
//! the result to 16-bit PCM at the host sample rate, with a DC-removing
//! high-pass applied on the way out.
//!
//! # Core Abstractions
//!
//! ## Buffers
//!
//! - [`BlipBuffer`] - Delta storage, fixed-point time base and integrating reader
//! - [`TrackedBuffer`] - [`BlipBuffer`] that knows when its output has gone quiet
//! - [`BufferState`] - Snapshot of a drained buffer
//!
//! ## Synthesizers
//!
//! - [`DeltaSynth`] - Common interface: `update`, `offset`, volume and treble
//! - [`FastSynth`] - Nearest-sample placement
//! - [`Synth`] - `WIDTH`-tap band-limited kernel ([`LowSynth`] .. [`HighSynth`])
//! - [`TrebleEq`] - Treble response of the kernels
//!
//! ## Output Layouts
//!
//! - [`MultiBuffer`] - Mono, stereo or silent output behind one interface
//! - [`StereoMixer`] - Center + left/right mixing into interleaved pairs
//! - [`BufferId`] / [`Channel`] - Handles a synthesizer writes through
//!
//! # Frame Cycle
//!
//! Every frame, deposit steps in clock order, close the frame with
//! `end_frame(duration)`, then read what became available:
//!
//! ```rust
//! use blipwave_core::{BlipBuffer, DeltaSynth, GoodSynth};
//!
//! let mut buf = BlipBuffer::new();
//! buf.set_rates(1_789_773, 44100).unwrap();
//!
//! let mut square = GoodSynth::with_range(15);
//! square.volume(0.5);
//!
//! for (time, amp) in [(0, 15), (4000, 0), (8000, 15), (12000, 0)] {
//!     square.update(time, amp, &mut buf);
//! }
//! buf.end_frame(29780);
//!
//! let mut pcm = [0i16; 1024];
//! let read = buf.read_samples(&mut pcm, 1024);
//! assert!(read > 700);
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc`). Disable the default
//! `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! blipwave-core = { version = "0.1", default-features = false }
//! ```
//!
//! Enable the `tracing` feature for debug events on configuration changes.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod eq;
pub mod error;
pub mod fixed;
pub mod mixer;
pub mod multi;
pub mod synth;
pub mod tracked;

// Re-export main types at crate root
pub use buffer::{BlipBuffer, BufferState, DEFAULT_BASS_FREQ};
pub use eq::TrebleEq;
pub use error::BufferError;
pub use fixed::{
    BLIP_RES, BUFFER_ACCURACY, BUFFER_EXTRA, ClockTime, DEFAULT_LENGTH_MS, DELTA_BITS, FIXED_UNIT,
    Fixed, MAX_QUALITY, MAX_SAMPLES, OUTPUT_LATENCY, PHASE_BITS, SAMPLE_BITS, bass_shift,
    clock_factor, samples_for_length,
};
pub use mixer::StereoMixer;
pub use multi::{
    BufferId, Channel, ChannelKind, ChannelLayout, ChannelType, MonoBuffer, MultiBuffer,
    SilentBuffer, Slot, StereoBuffer,
};
pub use synth::{
    DeltaSynth, FastSynth, GoodSynth, HighSynth, LowSynth, MedSynth, Synth, SynthState,
};
pub use tracked::TrackedBuffer;
