//! NES frame demo: a square and a noise voice mixed into stereo.
//!
//! Run with: RUST_LOG=debug cargo run -p blipwave-core --features tracing --example nes_frame

use blipwave_core::{DeltaSynth, FastSynth, GoodSynth, MultiBuffer, TrebleEq};
use tracing_subscriber::EnvFilter;

const CLOCK_RATE: u32 = 1_789_773;
const SAMPLE_RATE: u32 = 44100;
const FRAME_CLOCKS: u32 = 29780;

fn main() -> Result<(), blipwave_core::BufferError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut multi = MultiBuffer::stereo();
    multi.set_sample_rate(SAMPLE_RATE, 100)?;
    multi.set_clock_rate(CLOCK_RATE)?;
    multi.set_bass_freq(90);
    multi.set_channel_count(2, None)?;

    let mut square = GoodSynth::with_range(15);
    square.treble_eq(&TrebleEq::new(-12.0));
    square.volume(0.4);
    square.set_output(multi.channel(0).map(|c| c.left));

    let mut noise = FastSynth::with_range(15);
    noise.volume(0.2);
    noise.set_output(multi.channel(1).map(|c| c.center));

    let mut pcm = vec![0i16; 4096];
    let mut lfsr: u16 = 1;
    let mut peak = 0i16;

    for frame in 0..60 {
        // 440 Hz square: toggle every half period.
        let half_period = CLOCK_RATE / 880;
        let mut time = 0;
        let mut high = frame % 2 == 0;
        while time < FRAME_CLOCKS {
            square.update_routed(time, if high { 15 } else { 0 }, &mut multi);
            high = !high;
            time += half_period;
        }

        // Noise clocked every 1016 cycles.
        let mut time = 0;
        while time < FRAME_CLOCKS {
            let feedback = (lfsr ^ (lfsr >> 1)) & 1;
            lfsr = (lfsr >> 1) | (feedback << 14);
            noise.update_routed(time, if lfsr & 1 == 0 { 15 } else { 0 }, &mut multi);
            time += 1016;
        }

        multi.end_frame(FRAME_CLOCKS);
        let read = multi.read_samples(&mut pcm, 4096);
        peak = pcm[..read].iter().fold(peak, |p, &s| p.max(s.saturating_abs()));
        tracing::info!(frame, read, peak, "frame rendered");
    }

    println!("rendered 60 frames, peak amplitude {peak}");
    Ok(())
}
