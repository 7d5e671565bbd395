//! WAV container output. 16- or 24-bit integer PCM with optional triangular
//! dither on the bit-depth reduction. The dither noise is seeded, so exports
//! stay reproducible.

use std::io::Cursor;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use waveline_model::AudioBuffer;

const DITHER_SEED: u64 = 0x7761_7665_6c69_6e65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Sixteen,
    TwentyFour,
}

impl BitDepth {
    fn bits(&self) -> u16 {
        match self {
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
        }
    }
}

/// Serialize a buffer into a complete RIFF/WAVE byte stream.
pub fn write_wav_bytes(
    buffer: &AudioBuffer,
    bit_depth: BitDepth,
    dither: bool,
) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: bit_depth.bits(),
        sample_format: hound::SampleFormat::Int,
    };

    let mut out = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut out), spec)?;
        let max = ((1i64 << (bit_depth.bits() - 1)) - 1) as f64;
        // TPDF noise spans one quantization step peak-to-peak
        let step = 1.0 / (1i64 << (bit_depth.bits() - 1)) as f64;
        let mut rng = StdRng::seed_from_u64(DITHER_SEED);

        for &sample in &buffer.samples {
            let mut value = sample as f64;
            if dither {
                let r1: f64 = rng.gen_range(0.0..1.0);
                let r2: f64 = rng.gen_range(0.0..1.0);
                value += (r1 - r2) * step;
            }
            let quantized = (value.clamp(-1.0, 1.0) * max).round() as i32;
            writer.write_sample(quantized)?;
        }
        writer.finalize()?;
    }
    Ok(out)
}

pub fn write_wav_file(
    buffer: &AudioBuffer,
    path: &Path,
    bit_depth: BitDepth,
    dither: bool,
) -> anyhow::Result<()> {
    let bytes = write_wav_bytes(buffer, bit_depth, dither)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
