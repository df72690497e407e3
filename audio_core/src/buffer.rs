/// Decoded PCM audio owned by exactly one pipeline stage at a time.
///
/// Samples are interleaved f32 in `[-1.0, 1.0]`. Transforms never mutate a
/// buffer in place; each stage produces a replacement.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Playback length in seconds, set by whichever stage computed it.
    pub duration: Option<f64>,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let duration = if sample_rate > 0 && channels > 0 {
            Some(samples.len() as f64 / channels as f64 / sample_rate as f64)
        } else {
            None
        };
        Self {
            samples,
            sample_rate,
            channels,
            duration,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Peak level in dB relative to full scale. `None` when the buffer is
    /// silent (no finite level exists for an all-zero signal).
    pub fn peak_dbfs(&self) -> Option<f64> {
        let peak = self
            .samples
            .iter()
            .fold(0.0f32, |max, s| max.max(s.abs()));
        if peak > 0.0 {
            Some(20.0 * (peak as f64).log10())
        } else {
            None
        }
    }
}
