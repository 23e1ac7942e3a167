use crate::foundation::error::{SpeakifyError, SpeakifyResult};

/// How the requested resolution maps to output pixel dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridShape {
    /// Center-crop the source to a square, then scale to `R x R`.
    #[default]
    Square,
    /// Keep the source aspect ratio: width `R`, height scaled to match.
    PreserveAspect,
}

/// GIF loop behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    /// Loop forever (NETSCAPE2.0 loop count 0).
    #[default]
    Infinite,
    /// Loop `n` additional times. `Finite(0)` plays once, like `Once`.
    Finite(u16),
    /// Play once; no loop extension is written.
    Once,
}

/// Caps applied while decoding, so oversized inputs fail instead of exhausting memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Maximum accepted input buffer length in bytes.
    pub max_input_bytes: u64,
    /// Maximum source width in pixels.
    pub max_width: u32,
    /// Maximum source height in pixels.
    pub max_height: u32,
    /// Maximum number of decoded source frames.
    pub max_frames: u32,
    /// Maximum sum of `width * height` over all decoded frames.
    pub max_total_pixels: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: 256 * 1024 * 1024,
            max_width: 16_384,
            max_height: 16_384,
            max_frames: 4_096,
            // 1 GiB of RGBA8.
            max_total_pixels: 256 * 1024 * 1024,
        }
    }
}

impl DecodeLimits {
    /// Reject limits that would refuse every input.
    pub fn validate(&self) -> SpeakifyResult<()> {
        if self.max_input_bytes == 0
            || self.max_width == 0
            || self.max_height == 0
            || self.max_frames == 0
            || self.max_total_pixels == 0
        {
            return Err(SpeakifyError::invalid_argument(
                "decode limits must all be > 0",
            ));
        }
        Ok(())
    }
}

/// Engine options. Every field has a default, so partial JSON configs are accepted.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConvertOpts {
    /// Resolution-to-dimension rule.
    pub shape: GridShape,
    /// Loop behavior written into the animation.
    pub repeat: Repeat,
    /// Palette budget, including the transparent slot when one is needed. `2..=256`.
    pub max_colors: u16,
    /// Pixels with alpha below this are transparent. `0` disables transparency.
    pub alpha_threshold: u8,
    /// Per-frame output delay for sources without timing (still images).
    pub untimed_frame_delay_ms: u32,
    /// Cap on `output width * output height * frames`, checked before any frame is resampled.
    pub max_output_pixels: u64,
    /// Decode-time resource caps.
    pub limits: DecodeLimits,
}

impl Default for ConvertOpts {
    fn default() -> Self {
        Self {
            shape: GridShape::Square,
            repeat: Repeat::Infinite,
            max_colors: 256,
            alpha_threshold: 128,
            untimed_frame_delay_ms: 50,
            max_output_pixels: 256 * 1024 * 1024,
            limits: DecodeLimits::default(),
        }
    }
}

impl ConvertOpts {
    /// Validate option ranges.
    pub fn validate(&self) -> SpeakifyResult<()> {
        if !(2..=256).contains(&self.max_colors) {
            return Err(SpeakifyError::invalid_argument(format!(
                "max_colors must be in 2..=256, got {}",
                self.max_colors
            )));
        }
        if self.max_output_pixels == 0 {
            return Err(SpeakifyError::invalid_argument("max_output_pixels must be > 0"));
        }
        self.limits.validate()
    }

    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> SpeakifyResult<Self> {
        let opts: Self = serde_json::from_str(json)
            .map_err(|e| SpeakifyError::invalid_argument(format!("options json: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }
}
