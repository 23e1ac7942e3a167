use crate::foundation::core::Dimensions;
use crate::foundation::error::{SpeakifyError, SpeakifyResult};

/// One decoded source frame in straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    dims: Dimensions,
    rgba: Vec<u8>,
    delay_ms: u32,
}

impl RawFrame {
    /// Build a frame, checking the buffer length against `dims`.
    pub fn new(dims: Dimensions, rgba: Vec<u8>, delay_ms: u32) -> SpeakifyResult<Self> {
        let expected = dims
            .rgba_len()
            .ok_or_else(|| SpeakifyError::corrupt_input(format!("frame {dims} too large")))?;
        if rgba.len() != expected {
            return Err(SpeakifyError::internal(format!(
                "frame {dims} expects {expected} rgba bytes, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            dims,
            rgba,
            delay_ms,
        })
    }

    /// Frame dimensions.
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Row-major straight-alpha RGBA8 pixels.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Display duration in milliseconds.
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Consume the frame, returning its pixel buffer.
    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }
}

/// Decoded source frames in display order. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<RawFrame>,
    timed: bool,
}

impl FrameSequence {
    /// Build a sequence. Fails with `EmptySource` when `frames` is empty.
    ///
    /// `timed` is cleared when every frame reports a zero delay.
    pub fn new(frames: Vec<RawFrame>, timed: bool) -> SpeakifyResult<Self> {
        if frames.is_empty() {
            return Err(SpeakifyError::empty_source("source contains no frames"));
        }
        let timed = timed && frames.iter().any(|f| f.delay_ms > 0);
        Ok(Self { frames, timed })
    }

    /// Single untimed frame, as produced by still-image formats.
    pub fn still(frame: RawFrame) -> Self {
        Self {
            frames: vec![frame],
            timed: false,
        }
    }

    /// Frames in display order.
    pub fn frames(&self) -> &[RawFrame] {
        &self.frames
    }

    /// Number of frames (always >= 1).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether frame delays carry meaningful timing.
    pub fn is_timed(&self) -> bool {
        self.timed
    }

    /// Sum of frame delays in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.delay_ms)).sum()
    }

    /// Dimensions of the first frame (the source canvas).
    pub fn canvas(&self) -> Dimensions {
        self.frames[0].dims
    }
}
