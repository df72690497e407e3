use crate::buffer::AudioBuffer;

/// Default normalization target in dB full-scale.
pub const DEFAULT_TARGET_DBFS: f64 = -20.0;

/// Apply a uniform gain so the buffer's peak loudness equals `target_dbfs`.
///
/// Deterministic and lossless aside from the gain scaling. Silent buffers
/// are returned unchanged since they have no measurable level to shift.
pub fn normalize(buffer: &AudioBuffer, target_dbfs: f64) -> AudioBuffer {
    match buffer.peak_dbfs() {
        Some(measured) => {
            let gain_db = target_dbfs - measured;
            let scale = 10f64.powf(gain_db / 20.0) as f32;
            let samples = buffer.samples.iter().map(|s| s * scale).collect();
            AudioBuffer::new(samples, buffer.sample_rate, buffer.channels)
        }
        None => buffer.clone(),
    }
}
