//! Per-turn synthesis against the remote provider with bounded
//! exponential-backoff retry.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use audio_core::{decode_payload, AudioBuffer};

use crate::error::PipelineError;
use crate::provider::SpeechProvider;

/// Bounded exponential backoff for provider retries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per turn, including the first.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt` (0-indexed), without jitter:
    /// `min(max_delay, base_delay * 2^attempt)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map(|d| d.min(self.max_delay))
            .unwrap_or(self.max_delay)
    }
}

/// Add up to 10% random jitter to a backoff delay.
fn with_jitter(delay: Duration) -> Duration {
    let jitter = delay.mul_f64(0.1 * rand::thread_rng().gen::<f64>());
    delay + jitter
}

/// Synthesizes one dialogue turn against the remote provider and decodes
/// the returned payload into an audio buffer.
pub struct SegmentSynthesizer<P> {
    provider: Arc<P>,
    policy: RetryPolicy,
}

impl<P: SpeechProvider> SegmentSynthesizer<P> {
    pub fn new(provider: Arc<P>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Request synthesis for one turn.
    ///
    /// Only an answered request with no usable candidate is retried, with
    /// the backoff sleep between attempts (never before the first).
    /// Transport failures and payload decoding failures abort immediately.
    pub async fn synthesize(
        &self,
        style_prompt: &str,
        text: &str,
        voice_id: &str,
        speaker: &str,
        turn: usize,
    ) -> Result<AudioBuffer, PipelineError> {
        for attempt in 0..self.policy.max_retries {
            debug!(
                speaker,
                turn,
                attempt = attempt + 1,
                max_retries = self.policy.max_retries,
                "requesting synthesis"
            );
            match self
                .provider
                .generate_speech(style_prompt, text, voice_id)
                .await?
            {
                Some(payload) => {
                    let buffer = decode_payload(&payload.data, &payload.encoding)?;
                    return Ok(buffer);
                }
                None => {
                    if attempt + 1 < self.policy.max_retries {
                        let delay = with_jitter(self.policy.delay_for_attempt(attempt));
                        warn!(
                            speaker,
                            turn,
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "no candidates in response, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(PipelineError::SynthesisExhausted {
            speaker: speaker.to_string(),
            turn,
            attempts: self.policy.max_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::provider::{AudioPayload, ProviderError};

    struct EmptyProvider {
        calls: AtomicU32,
    }

    #[async_trait]
    impl SpeechProvider for EmptyProvider {
        async fn generate_speech(
            &self,
            _style_prompt: &str,
            _text: &str,
            _voice_id: &str,
        ) -> Result<Option<AudioPayload>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    struct FixedProvider {
        calls: AtomicU32,
        payload: AudioPayload,
    }

    #[async_trait]
    impl SpeechProvider for FixedProvider {
        async fn generate_speech(
            &self,
            _style_prompt: &str,
            _text: &str,
            _voice_id: &str,
        ) -> Result<Option<AudioPayload>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(self.payload.clone()))
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let policy = RetryPolicy {
            max_retries: 8,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
        };
        let delays: Vec<u64> = (0..6)
            .map(|k| policy.delay_for_attempt(k).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1000, 1000]);

        let mut sorted = delays.clone();
        sorted.sort_unstable();
        assert_eq!(delays, sorted, "delays must be non-decreasing");
    }

    #[test]
    fn jitter_stays_within_ten_percent() {
        let base = Duration::from_millis(1000);
        for _ in 0..100 {
            let jittered = with_jitter(base);
            assert!(jittered >= base);
            assert!(jittered <= base + Duration::from_millis(100));
        }
    }

    #[tokio::test]
    async fn exhausts_after_max_retries() {
        let provider = Arc::new(EmptyProvider {
            calls: AtomicU32::new(0),
        });
        let synth = SegmentSynthesizer::new(provider.clone(), fast_policy());

        let err = synth
            .synthesize("style", "hello", "Puck", "Alice", 1)
            .await
            .unwrap_err();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            err,
            PipelineError::SynthesisExhausted { speaker, turn: 1, attempts: 3 } if speaker == "Alice"
        ));
    }

    #[tokio::test]
    async fn decodes_successful_pcm_payload() {
        let provider = Arc::new(FixedProvider {
            calls: AtomicU32::new(0),
            payload: AudioPayload {
                data: vec![0x00, 0x40, 0x00, 0xC0],
                encoding: "audio/L16;rate=24000".to_string(),
            },
        });
        let synth = SegmentSynthesizer::new(provider.clone(), fast_policy());

        let buffer = synth
            .synthesize("style", "hello", "Puck", "Alice", 1)
            .await
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(buffer.sample_rate, 24_000);
        assert_eq!(buffer.samples.len(), 2);
    }

    #[tokio::test]
    async fn decoding_failure_is_not_retried() {
        let provider = Arc::new(FixedProvider {
            calls: AtomicU32::new(0),
            payload: AudioPayload {
                data: vec![0xDE, 0xAD],
                encoding: "application/x-mystery".to_string(),
            },
        });
        let synth = SegmentSynthesizer::new(provider.clone(), fast_policy());

        let err = synth
            .synthesize("style", "hello", "Puck", "Alice", 1)
            .await
            .unwrap_err();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            err,
            PipelineError::Audio(audio_core::AudioError::UnsupportedEncoding(_))
        ));
    }
}
