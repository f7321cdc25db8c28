use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use musegen_core::{CodecError, Waveform};
use std::io::Cursor;

/// Encode a waveform as a 32-bit float RIFF/WAVE file held in memory.
pub fn encode_wav(wave: &Waveform) -> Result<Vec<u8>, CodecError> {
    if wave.samples.is_empty() {
        return Err(CodecError::EmptyWaveform);
    }
    if wave.channels == 0 || wave.samples.len() % wave.channels as usize != 0 {
        return Err(CodecError::ChannelMismatch {
            samples: wave.samples.len(),
            channels: wave.channels,
        });
    }

    let spec = WavSpec {
        channels: wave.channels,
        sample_rate: wave.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(wave.samples.len() * 4 + 64));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| CodecError::WavEncode(e.to_string()))?;
        for &sample in &wave.samples {
            writer
                .write_sample(sample)
                .map_err(|e| CodecError::WavEncode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| CodecError::WavEncode(e.to_string()))?;
    }

    let bytes = cursor.into_inner();
    tracing::debug!(
        samples = wave.samples.len(),
        sample_rate = wave.sample_rate,
        bytes = bytes.len(),
        "encoded WAV"
    );
    Ok(bytes)
}

/// Decode an in-memory WAV file, normalizing integer samples to `[-1.0, 1.0]`.
pub fn decode_wav(bytes: &[u8]) -> Result<Waveform, CodecError> {
    let mut reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| CodecError::WavDecode(e.to_string()))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CodecError::WavDecode(e.to_string()))?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample)?;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CodecError::WavDecode(e.to_string()))?
        }
    };

    Ok(Waveform {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

fn int_scale(bits: u16) -> Result<f32, CodecError> {
    if bits == 0 || bits > 32 {
        return Err(CodecError::WavDecode(format!(
            "unsupported bit depth: {bits}"
        )));
    }
    Ok((1u64 << (bits - 1)) as f32)
}
