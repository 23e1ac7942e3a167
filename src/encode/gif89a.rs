use crate::config::Repeat;
use crate::encode::lzw::LzwEncoder;
use crate::foundation::core::Dimensions;
use crate::foundation::error::{SpeakifyError, SpeakifyResult};
use crate::quantize::{MAX_PALETTE_LEN, QuantizedAnimation};

const EXTENSION: u8 = 0x21;
const GRAPHIC_CONTROL: u8 = 0xF9;
const APPLICATION: u8 = 0xFF;
const IMAGE_SEPARATOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;
const SUB_BLOCK_MAX: usize = 255;

const DISPOSE_NONE: u8 = 1;
const DISPOSE_BACKGROUND: u8 = 2;

/// Check that `dims` fits the 16-bit fields of a GIF descriptor.
pub fn check_dimensions(dims: Dimensions) -> SpeakifyResult<(u16, u16)> {
    let w = u16::try_from(dims.width);
    let h = u16::try_from(dims.height);
    match (w, h) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(SpeakifyError::encoding_overflow(format!(
            "{dims} exceeds the GIF limit of {}x{}",
            u16::MAX,
            u16::MAX
        ))),
    }
}

/// Animated GIF writer. Holds the LZW dictionary and code buffer between calls.
#[derive(Debug, Default)]
pub struct GifEncoder {
    lzw: LzwEncoder,
    codes: Vec<u8>,
}

impl GifEncoder {
    /// Create an encoder with empty scratch.
    pub fn new() -> Self {
        Self {
            lzw: LzwEncoder::new(),
            codes: Vec::new(),
        }
    }

    /// Drop scratch allocations.
    pub fn release(&mut self) {
        *self = Self::default();
    }

    /// Approximate bytes retained in scratch.
    pub fn retained_bytes(&self) -> usize {
        self.lzw.retained_bytes() + self.codes.capacity()
    }

    /// Serialize `anim` as a complete GIF89a file.
    #[tracing::instrument(skip_all, fields(frames = anim.frames.len(), palette = anim.palette.len()))]
    pub fn encode(&mut self, anim: &QuantizedAnimation, repeat: Repeat) -> SpeakifyResult<Vec<u8>> {
        let Some(first) = anim.frames.first() else {
            return Err(SpeakifyError::internal("no frames to encode"));
        };
        let dims = first.dims();
        let (width, height) = check_dimensions(dims)?;

        let palette = &anim.palette;
        if palette.len() > MAX_PALETTE_LEN {
            return Err(SpeakifyError::encoding_overflow(format!(
                "palette has {} entries",
                palette.len()
            )));
        }
        let bits = palette.table_bits();
        let min_code_size = bits.max(2);
        let len = palette.len();
        for (i, frame) in anim.frames.iter().enumerate() {
            if frame.dims() != dims {
                return Err(SpeakifyError::internal(format!(
                    "frame {i} is {} but the animation is {dims}",
                    frame.dims()
                )));
            }
            if let Some(bad) = frame.indices().iter().find(|&&idx| usize::from(idx) >= len) {
                return Err(SpeakifyError::encoding_overflow(format!(
                    "frame {i} uses index {bad} outside palette of {len}"
                )));
            }
        }

        let mut out = Vec::with_capacity(1024 + dims.pixel_count().unwrap_or(0) / 2);

        out.extend_from_slice(b"GIF89a");
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        // Global table present, 8-bit color resolution, table size 2^bits.
        out.push(0x80 | (7 << 4) | (bits - 1));
        out.push(0);
        out.push(0);

        for c in palette.colors() {
            out.extend_from_slice(&[c.r, c.g, c.b]);
        }
        for _ in len..(1usize << bits) {
            out.extend_from_slice(&[0, 0, 0]);
        }

        let loops = match repeat {
            Repeat::Infinite => Some(0u16),
            Repeat::Finite(0) | Repeat::Once => None,
            Repeat::Finite(n) => Some(n),
        };
        if let Some(n) = loops {
            out.extend_from_slice(&[EXTENSION, APPLICATION, 0x0B]);
            out.extend_from_slice(b"NETSCAPE2.0");
            out.extend_from_slice(&[0x03, 0x01]);
            out.extend_from_slice(&n.to_le_bytes());
            out.push(0);
        }

        let (disposal, transparent_flag, transparent_index) = match palette.transparent() {
            Some(t) => (DISPOSE_BACKGROUND, 1u8, t),
            None => (DISPOSE_NONE, 0u8, 0),
        };

        let mut clock = CentisecondClock::default();
        for frame in &anim.frames {
            let delay = clock.advance(frame.delay_ms());

            out.extend_from_slice(&[EXTENSION, GRAPHIC_CONTROL, 0x04]);
            out.push((disposal << 2) | transparent_flag);
            out.extend_from_slice(&delay.to_le_bytes());
            out.push(transparent_index);
            out.push(0);

            out.push(IMAGE_SEPARATOR);
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&width.to_le_bytes());
            out.extend_from_slice(&height.to_le_bytes());
            out.push(0);

            out.push(min_code_size);
            self.codes.clear();
            self.lzw.encode(frame.indices(), min_code_size, &mut self.codes);
            for block in self.codes.chunks(SUB_BLOCK_MAX) {
                out.push(block.len() as u8);
                out.extend_from_slice(block);
            }
            out.push(0);
        }

        out.push(TRAILER);
        tracing::debug!(bytes = out.len(), %dims, "encoded gif");
        Ok(out)
    }
}

/// Converts millisecond delays to centiseconds, rounding the running total so that playback time
/// drifts by at most 5 ms over the whole animation.
#[derive(Debug, Default)]
struct CentisecondClock {
    elapsed_ms: u64,
}

impl CentisecondClock {
    fn advance(&mut self, delay_ms: u32) -> u16 {
        let start = (self.elapsed_ms + 5) / 10;
        self.elapsed_ms += u64::from(delay_ms);
        let end = (self.elapsed_ms + 5) / 10;
        let cs = end - start;
        u16::try_from(cs).unwrap_or_else(|_| {
            tracing::warn!(delay_ms, "frame delay exceeds the GIF maximum; saturating");
            u16::MAX
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif89a.rs"]
mod tests;
