use std::collections::HashMap;

use crate::config::{ConvertOpts, GridShape};
use crate::decode::format::SourceFormat;
use crate::decode::{ImageSourceDecoder, SourceDecoder};
use crate::encode::{GifEncoder, check_dimensions};
use crate::foundation::core::Dimensions;
use crate::foundation::error::{SpeakifyError, SpeakifyResult};
use crate::quantize::Quantizer;
use crate::resample::spatial::{OutputGeometry, ResampledFrame, SpatialResampler};
use crate::resample::temporal::resample_temporal;

/// Where a conversion currently is (or stopped).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// No conversion has started, or a new one is about to.
    Idle,
    /// Turning input bytes into frames.
    Decoding,
    /// Choosing output frames and scaling them.
    Resampling,
    /// Building the shared palette and indexing pixels.
    Quantizing,
    /// Writing the GIF stream.
    Encoding,
    /// The last conversion succeeded.
    Done,
    /// The last conversion failed; see [`Engine::failed_stage`].
    Failed,
}

/// Facts about one successful conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ConversionStats {
    /// Detected container, if the input matched a known signature.
    pub format: Option<SourceFormat>,
    /// Frames produced by the decoder.
    pub source_frames: usize,
    /// Dimensions of the first decoded frame.
    pub source_dims: Dimensions,
    /// Dimensions of every output frame.
    pub output_dims: Dimensions,
    /// Frames written to the GIF.
    pub output_frames: usize,
    /// Distinct source frames that were resampled.
    pub resampled_frames: usize,
    /// Entries in the global palette, including the transparent slot.
    pub palette_len: usize,
    /// Size of the GIF in bytes.
    pub output_bytes: usize,
}

/// Reusable conversion engine.
///
/// The engine owns only scratch buffers between calls, so results never depend on what it
/// converted before. `convert` takes `&mut self`; use one engine per thread.
pub struct Engine {
    opts: ConvertOpts,
    decoder: Box<dyn SourceDecoder>,
    resampler: SpatialResampler,
    quantizer: Quantizer,
    encoder: GifEncoder,
    stage: PipelineStage,
    failed_stage: Option<PipelineStage>,
    released: bool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("opts", &self.opts)
            .field("stage", &self.stage)
            .field("failed_stage", &self.failed_stage)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(ConvertOpts::default())
    }
}

impl Engine {
    /// Create an engine with the `image`-backed decoder. Fails on invalid options.
    pub fn new(opts: ConvertOpts) -> SpeakifyResult<Self> {
        opts.validate()?;
        Ok(Self::build(opts))
    }

    fn build(opts: ConvertOpts) -> Self {
        Self {
            decoder: Box::new(ImageSourceDecoder::new(opts.limits)),
            opts,
            resampler: SpatialResampler::new(),
            quantizer: Quantizer::new(),
            encoder: GifEncoder::new(),
            stage: PipelineStage::Idle,
            failed_stage: None,
            released: false,
        }
    }

    /// Replace the input decoder.
    pub fn with_decoder(mut self, decoder: Box<dyn SourceDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Options in effect.
    pub fn opts(&self) -> &ConvertOpts {
        &self.opts
    }

    /// Last stage reached.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Stage at which the most recent conversion failed, if it did.
    pub fn failed_stage(&self) -> Option<PipelineStage> {
        self.failed_stage
    }

    /// Approximate bytes held in scratch buffers.
    pub fn retained_bytes(&self) -> usize {
        self.resampler.retained_bytes()
            + self.quantizer.retained_bytes()
            + self.encoder.retained_bytes()
    }

    /// Free scratch buffers. Calling it again is a no-op.
    ///
    /// A released engine can still convert; scratch grows back on demand.
    pub fn release(&mut self) {
        if self.released {
            tracing::warn!("engine already released");
            return;
        }
        self.resampler.release();
        self.quantizer.release();
        self.encoder.release();
        self.released = true;
        tracing::debug!("released engine scratch");
    }

    /// Convert `input` into an animated GIF of `frames` frames at `resolution`.
    pub fn convert(
        &mut self,
        input: &[u8],
        resolution: u32,
        frames: u32,
    ) -> SpeakifyResult<Vec<u8>> {
        self.convert_with_stats(input, resolution, frames)
            .map(|(gif, _)| gif)
    }

    /// Like [`Engine::convert`], also returning [`ConversionStats`].
    #[tracing::instrument(skip(self, input), fields(len = input.len()))]
    pub fn convert_with_stats(
        &mut self,
        input: &[u8],
        resolution: u32,
        frames: u32,
    ) -> SpeakifyResult<(Vec<u8>, ConversionStats)> {
        self.stage = PipelineStage::Idle;
        self.failed_stage = None;
        self.released = false;

        match self.run(input, resolution, frames) {
            Ok(out) => {
                self.stage = PipelineStage::Done;
                tracing::debug!(
                    output_bytes = out.1.output_bytes,
                    palette = out.1.palette_len,
                    "conversion done"
                );
                Ok(out)
            }
            Err(err) => {
                tracing::debug!(stage = ?self.stage, error = %err, "conversion failed");
                self.failed_stage = Some(self.stage);
                self.stage = PipelineStage::Failed;
                Err(err)
            }
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        tracing::trace!(?stage, "stage");
        self.stage = stage;
    }

    fn run(
        &mut self,
        input: &[u8],
        resolution: u32,
        frames: u32,
    ) -> SpeakifyResult<(Vec<u8>, ConversionStats)> {
        if resolution == 0 {
            return Err(SpeakifyError::invalid_argument("resolution must be >= 1"));
        }
        if frames == 0 {
            return Err(SpeakifyError::invalid_argument("frames must be >= 1"));
        }
        // Width is always `resolution`, so this check needs no decoding.
        check_dimensions(Dimensions::new(resolution, 1)?)?;
        if self.opts.shape == GridShape::Square {
            self.check_output_budget(Dimensions::new(resolution, resolution)?, frames)?;
        }

        self.enter(PipelineStage::Decoding);
        let seq = self.decoder.decode(input)?;
        let source_dims = seq.canvas();
        let source_frames = seq.len();

        self.enter(PipelineStage::Resampling);
        let plan = resample_temporal(&seq, frames, self.opts.untimed_frame_delay_ms)?;
        let geometry = OutputGeometry::for_source(self.opts.shape, resolution, source_dims)?;
        check_dimensions(geometry.dims())?;
        self.check_output_budget(geometry.dims(), frames)?;

        let distinct = plan.distinct_sources();
        let mut scaled: HashMap<usize, ResampledFrame> = HashMap::with_capacity(distinct.len());
        for &src in &distinct {
            let raw = seq.frames().get(src).ok_or_else(|| {
                SpeakifyError::internal(format!("plan references missing frame {src}"))
            })?;
            scaled.insert(src, self.resampler.resample(raw, &geometry)?);
        }
        drop(seq);

        self.enter(PipelineStage::Quantizing);
        let mut ordered = Vec::with_capacity(plan.len());
        for pick in plan.picks() {
            let frame = scaled.get(&pick.source).ok_or_else(|| {
                SpeakifyError::internal(format!("frame {} was not resampled", pick.source))
            })?;
            ordered.push((frame, pick.delay_ms));
        }
        let anim = self.quantizer.quantize(
            &ordered,
            self.opts.max_colors,
            self.opts.alpha_threshold,
        )?;
        drop(ordered);
        drop(scaled);

        self.enter(PipelineStage::Encoding);
        let gif = self.encoder.encode(&anim, self.opts.repeat)?;

        let stats = ConversionStats {
            format: SourceFormat::detect(input),
            source_frames,
            source_dims,
            output_dims: geometry.dims(),
            output_frames: anim.frames.len(),
            resampled_frames: distinct.len(),
            palette_len: anim.palette.len(),
            output_bytes: gif.len(),
        };
        Ok((gif, stats))
    }

    fn check_output_budget(&self, dims: Dimensions, frames: u32) -> SpeakifyResult<()> {
        let total = u64::from(dims.width)
            .saturating_mul(u64::from(dims.height))
            .saturating_mul(u64::from(frames));
        if total > self.opts.max_output_pixels {
            return Err(SpeakifyError::invalid_argument(format!(
                "{frames} frames of {dims} exceed the output limit of {} pixels",
                self.opts.max_output_pixels
            )));
        }
        Ok(())
    }
}

/// Convert with default options.
pub fn convert(input: &[u8], resolution: u32, frames: u32) -> SpeakifyResult<Vec<u8>> {
    Engine::default().convert(input, resolution, frames)
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
