//! Global color quantization: every output frame shares one palette.

pub(crate) mod median_cut;

use std::collections::HashMap;

use crate::foundation::core::{Dimensions, Rgb8};
use crate::foundation::error::{SpeakifyError, SpeakifyResult};
use crate::resample::spatial::ResampledFrame;

/// Maximum number of entries a GIF color table can hold.
pub const MAX_PALETTE_LEN: usize = 256;

/// Global color table shared by every frame of one animation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb8>,
    transparent: Option<u8>,
}

impl Palette {
    /// Build a palette. `transparent`, when set, must index into `colors`.
    pub fn new(colors: Vec<Rgb8>, transparent: Option<u8>) -> SpeakifyResult<Self> {
        if colors.is_empty() {
            return Err(SpeakifyError::internal("palette is empty"));
        }
        if colors.len() > MAX_PALETTE_LEN {
            return Err(SpeakifyError::encoding_overflow(format!(
                "palette has {} entries, at most {MAX_PALETTE_LEN} allowed",
                colors.len()
            )));
        }
        if let Some(t) = transparent
            && usize::from(t) >= colors.len()
        {
            return Err(SpeakifyError::internal(format!(
                "transparent index {t} outside palette of {}",
                colors.len()
            )));
        }
        Ok(Self {
            colors,
            transparent,
        })
    }

    /// Palette entries, including the transparent slot if any.
    pub fn colors(&self) -> &[Rgb8] {
        &self.colors
    }

    /// Index whose pixels are fully transparent.
    pub fn transparent(&self) -> Option<u8> {
        self.transparent
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Smallest `bits >= 1` with `2^bits >= len`.
    pub fn table_bits(&self) -> u8 {
        let mut bits = 1u8;
        while (1usize << bits) < self.colors.len() {
            bits += 1;
        }
        bits
    }
}

/// One output frame as palette indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedFrame {
    dims: Dimensions,
    indices: Vec<u8>,
    delay_ms: u32,
}

impl IndexedFrame {
    /// Build a frame, checking the index count against `dims`.
    pub fn new(dims: Dimensions, indices: Vec<u8>, delay_ms: u32) -> SpeakifyResult<Self> {
        if dims.pixel_count() != Some(indices.len()) {
            return Err(SpeakifyError::internal(format!(
                "indexed frame {dims} has {} indices",
                indices.len()
            )));
        }
        Ok(Self {
            dims,
            indices,
            delay_ms,
        })
    }

    /// Frame dimensions.
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Row-major palette indices.
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Display duration in milliseconds.
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }
}

/// Quantizer output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantizedAnimation {
    /// Shared palette.
    pub palette: Palette,
    /// Frames in display order.
    pub frames: Vec<IndexedFrame>,
}

/// Palette builder and pixel mapper holding reusable scratch.
#[derive(Debug, Default)]
pub struct Quantizer {
    histogram: HashMap<u32, u64>,
    entries: Vec<(Rgb8, u64)>,
    lookup: HashMap<u32, u8>,
}

impl Quantizer {
    /// Create a quantizer with empty scratch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop scratch allocations.
    pub fn release(&mut self) {
        *self = Self::default();
    }

    /// Approximate bytes retained in scratch.
    pub fn retained_bytes(&self) -> usize {
        self.histogram.capacity() * std::mem::size_of::<(u32, u64)>()
            + self.entries.capacity() * std::mem::size_of::<(Rgb8, u64)>()
            + self.lookup.capacity() * std::mem::size_of::<(u32, u8)>()
    }

    /// Build one palette for all `frames` and map every pixel onto it.
    ///
    /// Each frame is paired with its output delay. Pixels with alpha below `alpha_threshold`
    /// become the transparent index, which is reserved as the last palette slot.
    #[tracing::instrument(skip_all, fields(frames = frames.len(), max_colors = max_colors))]
    pub fn quantize(
        &mut self,
        frames: &[(&ResampledFrame, u32)],
        max_colors: u16,
        alpha_threshold: u8,
    ) -> SpeakifyResult<QuantizedAnimation> {
        let Some((first, _)) = frames.first() else {
            return Err(SpeakifyError::internal("no frames to quantize"));
        };
        let dims = first.dims();
        if let Some((odd, _)) = frames.iter().find(|(f, _)| f.dims() != dims) {
            return Err(SpeakifyError::internal(format!(
                "frame {} does not match output geometry {dims}",
                odd.dims()
            )));
        }
        let max_colors = usize::from(max_colors).clamp(2, MAX_PALETTE_LEN);

        self.histogram.clear();
        let mut has_transparent = false;
        for (frame, _) in frames {
            for px in frame.rgba().chunks_exact(4) {
                if px[3] < alpha_threshold {
                    has_transparent = true;
                    continue;
                }
                let key = Rgb8::new(px[0], px[1], px[2]).pack();
                *self.histogram.entry(key).or_insert(0) += 1;
            }
        }

        self.entries.clear();
        self.entries
            .extend(self.histogram.iter().map(|(&k, &n)| (Rgb8::unpack(k), n)));
        self.entries.sort_unstable_by_key(|(c, _)| *c);

        let budget = max_colors - usize::from(has_transparent);
        let exact = self.entries.len() <= budget;
        let mut colors: Vec<Rgb8> = if exact {
            self.entries.iter().map(|(c, _)| *c).collect()
        } else {
            median_cut::median_cut(&mut self.entries, budget)
        };
        let opaque_len = colors.len();

        let transparent = if has_transparent {
            colors.push(Rgb8::new(0, 0, 0));
            Some(opaque_len as u8)
        } else {
            None
        };
        if colors.is_empty() {
            return Err(SpeakifyError::internal("frames produced no colors"));
        }
        let palette = Palette::new(colors, transparent)?;

        tracing::debug!(
            distinct = self.entries.len(),
            palette = palette.len(),
            exact,
            transparent = has_transparent,
            "built palette"
        );

        self.lookup.clear();
        let opaque = &palette.colors()[..opaque_len];
        let mut out = Vec::with_capacity(frames.len());
        for (frame, delay_ms) in frames {
            let mut indices = Vec::with_capacity(frame.rgba().len() / 4);
            for px in frame.rgba().chunks_exact(4) {
                let idx = match transparent {
                    Some(t) if px[3] < alpha_threshold => t,
                    _ => {
                        let color = Rgb8::new(px[0], px[1], px[2]);
                        *self
                            .lookup
                            .entry(color.pack())
                            .or_insert_with(|| nearest(opaque, color))
                    }
                };
                indices.push(idx);
            }
            out.push(IndexedFrame::new(dims, indices, *delay_ms)?);
        }

        Ok(QuantizedAnimation {
            palette,
            frames: out,
        })
    }
}

/// Index of the closest entry by squared RGB distance; ties go to the lowest index.
fn nearest(palette: &[Rgb8], color: Rgb8) -> u8 {
    let mut best = (0usize, u32::MAX);
    for (i, &p) in palette.iter().enumerate() {
        let d = color.dist2(p);
        if d < best.1 {
            best = (i, d);
            if d == 0 {
                break;
            }
        }
    }
    best.0 as u8
}

#[cfg(test)]
#[path = "../../tests/unit/quantize/quantizer.rs"]
mod tests;
