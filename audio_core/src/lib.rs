//! Audio-domain core: decoded buffers, provider payload decoding,
//! loudness normalization, and ordered assembly of dialogue segments.
//!
//! Everything here is synchronous and network-free; the generation
//! pipeline in `gen_core` drives these transforms per dialogue turn.

pub mod assemble;
pub mod buffer;
pub mod decode;
mod error;
pub mod normalize;
pub mod wav;

pub use assemble::{concatenate, AssemblyConfig};
pub use buffer::AudioBuffer;
pub use decode::{decode_payload, AudioEncoding, DEFAULT_PCM_RATE};
pub use error::AudioError;
pub use normalize::{normalize, DEFAULT_TARGET_DBFS};
pub use wav::encode_wav;
