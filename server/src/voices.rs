//! Prebuilt voice metadata and persona configuration options exposed to
//! the frontend.

use serde_json::{json, Value};

/// The provider's prebuilt voices with display metadata.
pub fn voice_metadata() -> Value {
    json!({
        "Puck": {
            "icon": "🌟",
            "color": "#FF6B6B",
            "description": "Playful and energetic voice perfect for dynamic content"
        },
        "Charon": {
            "icon": "🌌",
            "color": "#4A90E2",
            "description": "Deep and mysterious voice ideal for serious topics"
        },
        "Aoede": {
            "icon": "🎵",
            "color": "#F39C12",
            "description": "Melodic and musical voice for engaging storytelling"
        },
        "Zephyr": {
            "icon": "🌪️",
            "color": "#3498DB",
            "description": "Swift and airy voice for energetic content"
        },
        "Fenrir": {
            "icon": "🐺",
            "color": "#9B59B6",
            "description": "Strong and powerful voice for authoritative content"
        },
        "Leda": {
            "icon": "🌙",
            "color": "#E74C3C",
            "description": "Graceful and elegant voice for refined delivery"
        },
        "Orus": {
            "icon": "☀️",
            "color": "#2ECC71",
            "description": "Bright and clear voice for educational content"
        },
        "Kore": {
            "icon": "🌸",
            "color": "#50E3C2",
            "description": "Soft and gentle voice for calming content"
        }
    })
}

/// Podcast-level configuration options.
pub fn podcast_config_options() -> Value {
    json!({
        "duration_options": [5, 10, 15, 20, 30],
        "speaker_options": [2, 3, 4],
        "expertise_levels": ["beginner", "intermediate", "expert", "mixed"],
        "format_styles": ["casual", "interview", "debate", "educational", "storytelling"]
    })
}

/// Per-speaker persona configuration options.
pub fn voice_config_options() -> Value {
    json!({
        "age_range": [20, 70],
        "genders": ["male", "female", "neutral"],
        "voice_tones": ["warm", "professional", "energetic", "calm", "authoritative"],
        "accents": ["neutral", "british", "american", "australian", "indian"],
        "speaking_rate_ranges": {
            "normal": [100, 200],
            "excited": [120, 220],
            "analytical": [80, 180]
        },
        "voice_characteristics_options": {
            "pitch_range": ["narrow", "medium", "wide"],
            "resonance": ["chest", "head", "mixed"],
            "breathiness": ["low", "medium", "high"],
            "vocal_energy": ["low", "moderate", "high"],
            "pause_pattern": ["natural", "dramatic", "minimal"],
            "emphasis_pattern": ["balanced", "strong", "subtle"],
            "emotional_range": ["neutral", "expressive", "highly-expressive"],
            "breathing_pattern": ["relaxed", "controlled", "dynamic"]
        },
        "speech_patterns_options": {
            "phrasing": ["natural", "structured", "flowing"],
            "rhythm": ["regular", "varied", "dynamic"],
            "articulation": ["clear", "precise", "relaxed"],
            "modulation": ["subtle", "moderate", "dramatic"]
        }
    })
}
