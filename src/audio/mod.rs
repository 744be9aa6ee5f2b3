use crate::error::{ChoraleError, Result};
use std::io::Cursor;
use std::path::Path;

/// Sample rate expected by the transcription engines
pub const ENGINE_SAMPLE_RATE: u32 = 16000;

/// Measure a WAV file's duration in seconds without decoding samples
pub fn probe_duration<P: AsRef<Path>>(path: P) -> Result<f64> {
    let reader = hound::WavReader::open(path.as_ref())
        .map_err(|e| ChoraleError::Audio(format!("Failed to open WAV: {}", e)))?;

    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(ChoraleError::Audio("WAV reports zero sample rate".to_string()));
    }

    // duration() counts inter-channel sample frames
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Load a WAV file as 16kHz mono f32, ready for transcription
pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<Vec<f32>> {
    let reader = hound::WavReader::open(path.as_ref())
        .map_err(|e| ChoraleError::Audio(format!("Failed to open WAV: {}", e)))?;

    let spec = reader.spec();
    let samples = decode_to_f32(reader)?;

    let mono = to_mono(&samples, spec.channels);
    let mut resampled = resample(&mono, spec.sample_rate, ENGINE_SAMPLE_RATE)?;
    normalize(&mut resampled);

    Ok(resampled)
}

/// Encode 16kHz mono f32 samples as an in-memory WAV file
pub fn encode_wav(samples: &[f32]) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: ENGINE_SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| ChoraleError::Audio(format!("Failed to create WAV writer: {}", e)))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| ChoraleError::Audio(format!("Failed to write sample: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| ChoraleError::Audio(format!("Failed to finalize WAV: {}", e)))?;
    }

    Ok(cursor.into_inner())
}

fn decode_to_f32<R: std::io::Read>(reader: hound::WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ChoraleError::Audio(format!("Failed to read samples: {}", e)))?,
        hound::SampleFormat::Int => {
            // scale by the declared bit depth, not the container width
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| ChoraleError::Audio(format!("Failed to read samples: {}", e)))?
        }
    };

    Ok(samples)
}

/// Convert multi-channel audio to mono by averaging channels
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let channels = channels as usize;
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample audio to the target rate using rubato
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        to_rate as f64 / from_rate as f64,
        2.0,
        params,
        samples.len(),
        1,
    )
    .map_err(|e| ChoraleError::Audio(format!("Failed to create resampler: {}", e)))?;

    let input = vec![samples.to_vec()];
    let output = resampler
        .process(&input, None)
        .map_err(|e| ChoraleError::Audio(format!("Resample failed: {}", e)))?;

    Ok(output.into_iter().next().unwrap_or_default())
}

/// Clamp samples into [-1.0, 1.0] by peak scaling
pub fn normalize(samples: &mut [f32]) {
    let max_abs = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if max_abs > 1.0 {
        for sample in samples.iter_mut() {
            *sample /= max_abs;
        }
    }
}
