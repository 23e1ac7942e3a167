use crate::config::GridShape;
use crate::decode::frames::RawFrame;
use crate::foundation::core::Dimensions;
use crate::foundation::error::{SpeakifyError, SpeakifyResult};
use crate::foundation::math::{div_round, mul_div_round};

/// Source rectangle sampled by the resampler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge in source pixels.
    pub x: u32,
    /// Top edge in source pixels.
    pub y: u32,
    /// Width in source pixels.
    pub width: u32,
    /// Height in source pixels.
    pub height: u32,
}

/// Output geometry shared by every frame of one conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputGeometry {
    shape: GridShape,
    out: Dimensions,
}

impl OutputGeometry {
    /// Derive the output dimensions for `resolution` from the source canvas.
    ///
    /// `Square` always yields `R x R`. `PreserveAspect` yields width `R` and the height that keeps
    /// the source aspect ratio (at least 1).
    pub fn for_source(
        shape: GridShape,
        resolution: u32,
        canvas: Dimensions,
    ) -> SpeakifyResult<Self> {
        if resolution == 0 {
            return Err(SpeakifyError::invalid_resolution("resolution must be >= 1"));
        }
        let out = match shape {
            GridShape::Square => Dimensions::new(resolution, resolution)?,
            GridShape::PreserveAspect => {
                let h = mul_div_round(
                    u64::from(resolution),
                    u64::from(canvas.height),
                    u64::from(canvas.width),
                )
                .max(1);
                let h = u32::try_from(h).map_err(|_| {
                    SpeakifyError::invalid_resolution(format!(
                        "height for resolution {resolution} over {canvas} does not fit u32"
                    ))
                })?;
                Dimensions::new(resolution, h)?
            }
        };
        if out.rgba_len().is_none() {
            return Err(SpeakifyError::invalid_resolution(format!(
                "output {out} is not addressable"
            )));
        }
        Ok(Self { shape, out })
    }

    /// Output dimensions.
    pub fn dims(&self) -> Dimensions {
        self.out
    }

    /// Shape rule this geometry was derived with.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Source rectangle to sample for a frame of size `src`.
    pub fn crop_for(&self, src: Dimensions) -> CropRect {
        match self.shape {
            GridShape::Square => {
                let side = src.width.min(src.height);
                CropRect {
                    x: (src.width - side) / 2,
                    y: (src.height - side) / 2,
                    width: side,
                    height: side,
                }
            }
            GridShape::PreserveAspect => CropRect {
                x: 0,
                y: 0,
                width: src.width,
                height: src.height,
            },
        }
    }
}

/// A frame at the conversion's output geometry, straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResampledFrame {
    dims: Dimensions,
    rgba: Vec<u8>,
}

impl ResampledFrame {
    /// Build a frame, checking the buffer length against `dims`.
    pub fn new(dims: Dimensions, rgba: Vec<u8>) -> SpeakifyResult<Self> {
        if dims.rgba_len() != Some(rgba.len()) {
            return Err(SpeakifyError::internal(format!(
                "resampled frame {dims} has {} rgba bytes",
                rgba.len()
            )));
        }
        Ok(Self { dims, rgba })
    }

    /// Frame dimensions.
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Row-major straight-alpha RGBA8 pixels.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Taps of one output cell along one axis.
#[derive(Clone, Copy, Debug, Default)]
struct Span {
    /// First source index covered.
    first: usize,
    /// Offset of the cell's weights in `AxisWeights::taps`.
    tap_start: usize,
    /// Number of covered source pixels.
    len: usize,
}

/// Per-axis box-coverage weights.
///
/// Output cell `o` covers source interval `[o * src_len, (o + 1) * src_len)` measured in units of
/// `1 / out_len` source pixels, so every overlap is an exact integer and the weights of one cell
/// sum to `src_len`.
#[derive(Clone, Debug, Default)]
struct AxisWeights {
    spans: Vec<Span>,
    taps: Vec<u64>,
}

impl AxisWeights {
    fn rebuild(&mut self, src_len: u32, out_len: u32) {
        self.spans.clear();
        self.taps.clear();
        let (src_len, out_len) = (u64::from(src_len), u64::from(out_len));

        for o in 0..out_len {
            let lo = o * src_len;
            let hi = (o + 1) * src_len;
            let first = lo / out_len;
            let last = hi.div_ceil(out_len);
            let tap_start = self.taps.len();
            for s in first..last {
                self.taps.push(hi.min((s + 1) * out_len) - lo.max(s * out_len));
            }
            self.spans.push(Span {
                first: first as usize,
                tap_start,
                len: self.taps.len() - tap_start,
            });
        }
    }

    fn cell(&self, o: usize) -> (usize, &[u64]) {
        let span = self.spans[o];
        (span.first, &self.taps[span.tap_start..span.tap_start + span.len])
    }
}

/// Area-averaging resampler holding reusable scratch.
///
/// Scratch is two output-width rows, so it stays `O(out.width)` whatever the crop height.
#[derive(Debug, Default)]
pub struct SpatialResampler {
    xw: AxisWeights,
    yw: AxisWeights,
    /// Horizontal pass of the most recent source row: `out.width * 4` premultiplied sums.
    hrow: Vec<u64>,
    /// Vertical accumulator for the output row being built.
    vacc: Vec<u64>,
}

impl SpatialResampler {
    /// Create a resampler with empty scratch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop scratch allocations.
    pub fn release(&mut self) {
        *self = Self::default();
    }

    /// Bytes currently retained in scratch.
    pub fn retained_bytes(&self) -> usize {
        (self.hrow.capacity() + self.vacc.capacity()) * std::mem::size_of::<u64>()
            + (self.xw.taps.capacity() + self.yw.taps.capacity()) * std::mem::size_of::<u64>()
            + (self.xw.spans.capacity() + self.yw.spans.capacity()) * std::mem::size_of::<Span>()
    }

    /// Resample `frame` to `geometry` by exact area averaging in premultiplied alpha.
    ///
    /// Output rows are built top to bottom from the source rows they cover. Each source row is
    /// reduced horizontally once, and an output row is written as soon as its span closes.
    pub fn resample(
        &mut self,
        frame: &RawFrame,
        geometry: &OutputGeometry,
    ) -> SpeakifyResult<ResampledFrame> {
        let src = frame.dims();
        let out = geometry.dims();
        let crop = geometry.crop_for(src);
        if crop.width == 0 || crop.height == 0 {
            return Err(SpeakifyError::internal(format!("empty crop for source {src}")));
        }

        let Self { xw, yw, hrow, vacc } = self;
        xw.rebuild(crop.width, out.width);
        yw.rebuild(crop.height, out.height);

        let ow = out.width as usize;
        let oh = out.height as usize;
        let stride = src.width as usize * 4;
        let rgba = frame.rgba();

        hrow.clear();
        hrow.resize(ow * 4, 0);
        vacc.clear();
        vacc.resize(ow * 4, 0);

        let area = u64::from(crop.width) * u64::from(crop.height);
        let mut dst = vec![0u8; ow * oh * 4];
        // Adjacent output rows share at most their boundary source row.
        let mut reduced: Option<usize> = None;

        for oy in 0..oh {
            vacc.fill(0);
            let (first, taps) = yw.cell(oy);
            for (i, &w) in taps.iter().enumerate() {
                let cy = first + i;
                if reduced != Some(cy) {
                    let row_start = (crop.y as usize + cy) * stride + crop.x as usize * 4;
                    reduce_row(xw, &rgba[row_start..], hrow);
                    reduced = Some(cy);
                }
                for (acc, &h) in vacc.iter_mut().zip(hrow.iter()) {
                    *acc += h * w;
                }
            }

            let dst_row = &mut dst[oy * ow * 4..(oy + 1) * ow * 4];
            for (px, acc) in dst_row.chunks_exact_mut(4).zip(vacc.chunks_exact(4)) {
                let alpha_sum = acc[3];
                if alpha_sum > 0 {
                    for c in 0..3 {
                        px[c] = div_round(acc[c], alpha_sum).min(255) as u8;
                    }
                }
                px[3] = div_round(alpha_sum, area).min(255) as u8;
            }
        }

        ResampledFrame::new(out, dst)
    }
}

/// Horizontal pass over one source row starting at the crop's left edge.
fn reduce_row(xw: &AxisWeights, row: &[u8], out: &mut [u64]) {
    for (ox, acc_px) in out.chunks_exact_mut(4).enumerate() {
        let (first, taps) = xw.cell(ox);
        let mut acc = [0u64; 4];
        for (i, &w) in taps.iter().enumerate() {
            let p = (first + i) * 4;
            let a = u64::from(row[p + 3]);
            acc[0] += u64::from(row[p]) * a * w;
            acc[1] += u64::from(row[p + 1]) * a * w;
            acc[2] += u64::from(row[p + 2]) * a * w;
            acc[3] += a * w;
        }
        acc_px.copy_from_slice(&acc);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resample/spatial.rs"]
mod tests;
