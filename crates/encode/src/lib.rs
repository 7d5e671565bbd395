//! Export encoding. WAV bytes pass through untouched; every other container
//! goes through an external converter behind [`AudioConverter`]. The actual
//! FLAC/AAC/OGG encoders are not implemented here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Wav,
    Flac,
    M4a,
    Ogg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Wav => "wav",
            ExportFormat::Flac => "flac",
            ExportFormat::M4a => "m4a",
            ExportFormat::Ogg => "ogg",
        }
    }
}

/// A conversion request: WAV bytes in, target container out.
#[derive(Debug, Clone, Copy)]
pub struct ConversionJob<'a> {
    pub wav: &'a [u8],
    pub target: ExportFormat,
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("no converter available for {0:?}")]
    NoConverter(ExportFormat),

    #[error("invalid conversion: {0}")]
    InvalidConversion(String),

    #[error("conversion failed: {0}")]
    ConversionFailed(String),

    #[error("converter produced no output")]
    EmptyOutput,
}

/// External conversion collaborator.
///
/// `validate` runs before any conversion work; a job that reports itself
/// invalid must fail fast instead of emitting garbage.
pub trait AudioConverter {
    fn validate(&self, job: &ConversionJob<'_>) -> Result<(), EncodeError>;
    fn convert(
        &self,
        job: &ConversionJob<'_>,
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<Vec<u8>, EncodeError>;
}

/// Encode rendered WAV bytes into the requested export container.
///
/// Progress is reported in [0, 1] and forced monotonically non-decreasing
/// regardless of what the converter reports; it always ends at 1.0 on
/// success.
pub fn encode(
    wav_bytes: Vec<u8>,
    format: ExportFormat,
    converter: Option<&dyn AudioConverter>,
    mut on_progress: impl FnMut(f64),
) -> Result<Vec<u8>, EncodeError> {
    if format == ExportFormat::Wav {
        on_progress(1.0);
        return Ok(wav_bytes);
    }

    let Some(converter) = converter else {
        return Err(EncodeError::NoConverter(format));
    };

    let job = ConversionJob {
        wav: &wav_bytes,
        target: format,
    };
    converter.validate(&job)?;

    let mut reported = 0.0f64;
    let mut monotone = |p: f64| {
        let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        if p > reported {
            reported = p;
            on_progress(p);
        }
    };

    let encoded = converter.convert(&job, &mut monotone)?;
    if encoded.is_empty() {
        log::error!("converter for {format:?} returned empty output");
        return Err(EncodeError::EmptyOutput);
    }
    monotone(1.0);
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Converter double that replays a scripted progress sequence.
    struct FakeConverter {
        progress_script: Vec<f64>,
        output: Vec<u8>,
        reject: bool,
    }

    impl AudioConverter for FakeConverter {
        fn validate(&self, job: &ConversionJob<'_>) -> Result<(), EncodeError> {
            if self.reject {
                return Err(EncodeError::InvalidConversion(format!(
                    "cannot produce {:?}",
                    job.target
                )));
            }
            Ok(())
        }

        fn convert(
            &self,
            _job: &ConversionJob<'_>,
            on_progress: &mut dyn FnMut(f64),
        ) -> Result<Vec<u8>, EncodeError> {
            for &p in &self.progress_script {
                on_progress(p);
            }
            Ok(self.output.clone())
        }
    }

    #[test]
    fn test_wav_is_passthrough() {
        let bytes = vec![1, 2, 3, 4];
        let mut progress = Vec::new();
        let out = encode(bytes.clone(), ExportFormat::Wav, None, |p| progress.push(p)).unwrap();
        assert_eq!(out, bytes);
        assert_eq!(progress, vec![1.0]);
    }

    #[test]
    fn test_non_wav_requires_converter() {
        let err = encode(vec![0], ExportFormat::Flac, None, |_| {}).unwrap_err();
        assert!(matches!(err, EncodeError::NoConverter(ExportFormat::Flac)));
    }

    #[test]
    fn test_invalid_conversion_fails_fast() {
        let converter = FakeConverter {
            progress_script: vec![],
            output: vec![9],
            reject: true,
        };
        let mut called = false;
        let err = encode(vec![0], ExportFormat::Ogg, Some(&converter), |_| {
            called = true;
        })
        .unwrap_err();
        assert!(matches!(err, EncodeError::InvalidConversion(_)));
        assert!(!called, "no progress before validation passes");
    }

    #[test]
    fn test_progress_is_monotone_and_clamped() {
        let converter = FakeConverter {
            progress_script: vec![0.2, 0.1, 0.5, f64::NAN, 2.0, 0.9],
            output: vec![7],
            reject: false,
        };
        let mut progress = Vec::new();
        encode(vec![0], ExportFormat::M4a, Some(&converter), |p| {
            progress.push(p)
        })
        .unwrap();
        assert_eq!(progress, vec![0.2, 0.5, 1.0]);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_empty_output_is_an_error() {
        let converter = FakeConverter {
            progress_script: vec![0.5],
            output: vec![],
            reject: false,
        };
        let err = encode(vec![0], ExportFormat::Flac, Some(&converter), |_| {}).unwrap_err();
        assert!(matches!(err, EncodeError::EmptyOutput));
    }

    #[test]
    fn test_successful_conversion_ends_at_one() {
        let converter = FakeConverter {
            progress_script: vec![0.3, 0.6],
            output: vec![42; 10],
            reject: false,
        };
        let mut last = 0.0;
        let out = encode(vec![0], ExportFormat::Ogg, Some(&converter), |p| last = p).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(last, 1.0);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ExportFormat::Wav.extension(), "wav");
        assert_eq!(ExportFormat::M4a.extension(), "m4a");
    }
}
