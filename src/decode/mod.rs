//! Input decoding: bytes in, [`FrameSequence`] out.
//!
//! Format selection is a closed dispatch over [`SourceFormat`]; the pixel work is delegated to the
//! bounds-checked codecs of the `image` crate, with [`DecodeLimits`] enforced on top.

pub(crate) mod format;
pub(crate) mod frames;

use std::io::Cursor;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, ImageDecoder};

use crate::config::DecodeLimits;
use crate::decode::format::SourceFormat;
use crate::decode::frames::{FrameSequence, RawFrame};
use crate::foundation::core::Dimensions;
use crate::foundation::error::{SpeakifyError, SpeakifyResult};
use crate::foundation::math::div_round;

/// Seam between the engine and whatever turns input bytes into frames.
pub trait SourceDecoder: Send {
    /// Decode `bytes` into a non-empty frame sequence.
    fn decode(&mut self, bytes: &[u8]) -> SpeakifyResult<FrameSequence>;
}

/// Production decoder backed by the `image` crate codecs.
#[derive(Clone, Debug, Default)]
pub struct ImageSourceDecoder {
    limits: DecodeLimits,
}

impl ImageSourceDecoder {
    /// Create a decoder enforcing `limits`.
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }

    /// Limits in effect.
    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    fn image_limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(self.limits.max_width);
        limits.max_image_height = Some(self.limits.max_height);
        limits.max_alloc = Some(self.limits.max_total_pixels.saturating_mul(4));
        limits
    }

    fn decode_animation<'a>(
        &self,
        format: SourceFormat,
        frames: image::Frames<'a>,
    ) -> SpeakifyResult<FrameSequence> {
        let mut out = Vec::new();
        let mut total_pixels = 0u64;

        for frame in frames {
            let frame = frame.map_err(|e| map_image_error(format, e))?;
            if out.len() >= self.limits.max_frames as usize {
                return Err(SpeakifyError::corrupt_input(format!(
                    "{format}: more than {} frames",
                    self.limits.max_frames
                )));
            }

            let delay_ms = delay_to_ms(frame.delay());
            let buffer = frame.into_buffer();
            let (width, height) = buffer.dimensions();
            total_pixels = total_pixels.saturating_add(u64::from(width) * u64::from(height));
            if total_pixels > self.limits.max_total_pixels {
                return Err(SpeakifyError::corrupt_input(format!(
                    "{format}: decoded pixels exceed limit of {}",
                    self.limits.max_total_pixels
                )));
            }

            let dims = Dimensions::new(width, height)
                .map_err(|_| SpeakifyError::corrupt_input(format!("{format}: zero-sized frame")))?;
            out.push(RawFrame::new(dims, buffer.into_raw(), delay_ms)?);
        }

        FrameSequence::new(out, true)
            .map_err(|_| SpeakifyError::empty_source(format!("{format} contains no frames")))
    }

    fn decode_still(
        &self,
        format: SourceFormat,
        img: DynamicImage,
    ) -> SpeakifyResult<FrameSequence> {
        let rgba = img.into_rgba8();
        let (width, height) = rgba.dimensions();
        if u64::from(width) * u64::from(height) > self.limits.max_total_pixels {
            return Err(SpeakifyError::corrupt_input(format!(
                "{format}: decoded pixels exceed limit of {}",
                self.limits.max_total_pixels
            )));
        }
        let dims = Dimensions::new(width, height)
            .map_err(|_| SpeakifyError::empty_source(format!("{format} image has no pixels")))?;
        Ok(FrameSequence::still(RawFrame::new(dims, rgba.into_raw(), 0)?))
    }
}

impl SourceDecoder for ImageSourceDecoder {
    #[tracing::instrument(skip_all, fields(len = bytes.len()))]
    fn decode(&mut self, bytes: &[u8]) -> SpeakifyResult<FrameSequence> {
        if bytes.len() as u64 > self.limits.max_input_bytes {
            return Err(SpeakifyError::corrupt_input(format!(
                "input of {} bytes exceeds limit of {}",
                bytes.len(),
                self.limits.max_input_bytes
            )));
        }

        let format = SourceFormat::detect(bytes).ok_or_else(|| unrecognized(bytes))?;
        let map = |e| map_image_error(format, e);

        let seq = match format {
            SourceFormat::Gif => {
                if !gif_has_frames(bytes)? {
                    return Err(SpeakifyError::empty_source("gif contains no frames"));
                }
                let mut dec = GifDecoder::new(Cursor::new(bytes)).map_err(map)?;
                dec.set_limits(self.image_limits()).map_err(map)?;
                self.decode_animation(format, dec.into_frames())?
            }
            SourceFormat::Png => {
                let mut dec = PngDecoder::new(Cursor::new(bytes)).map_err(map)?;
                dec.set_limits(self.image_limits()).map_err(map)?;
                if dec.is_apng().map_err(map)? {
                    self.decode_animation(format, dec.apng().map_err(map)?.into_frames())?
                } else {
                    self.decode_still(format, DynamicImage::from_decoder(dec).map_err(map)?)?
                }
            }
            SourceFormat::WebP => {
                let mut dec = WebPDecoder::new(Cursor::new(bytes)).map_err(map)?;
                dec.set_limits(self.image_limits()).map_err(map)?;
                if dec.has_animation() {
                    self.decode_animation(format, dec.into_frames())?
                } else {
                    self.decode_still(format, DynamicImage::from_decoder(dec).map_err(map)?)?
                }
            }
            SourceFormat::Jpeg | SourceFormat::Bmp => {
                let mut reader =
                    image::ImageReader::with_format(Cursor::new(bytes), format.image_format());
                reader.limits(self.image_limits());
                self.decode_still(format, reader.decode().map_err(map)?)?
            }
        };

        tracing::debug!(
            %format,
            frames = seq.len(),
            canvas = %seq.canvas(),
            timed = seq.is_timed(),
            "decoded source"
        );
        Ok(seq)
    }
}

fn unrecognized(bytes: &[u8]) -> SpeakifyError {
    if bytes.is_empty() {
        return SpeakifyError::unsupported_format("empty input");
    }
    let head: Vec<String> = bytes.iter().take(8).map(|b| format!("{b:02x}")).collect();
    SpeakifyError::unsupported_format(format!(
        "unrecognized signature [{}]; expected one of png, jpeg, gif, webp, bmp",
        head.join(" ")
    ))
}

/// Scan to the first image descriptor without decoding pixels.
///
/// `GifDecoder::new` reports a frameless stream the same way as a truncated one.
fn gif_has_frames(bytes: &[u8]) -> SpeakifyResult<bool> {
    let corrupt = |e: gif::DecodingError| SpeakifyError::corrupt_input(format!("gif: {e}"));
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::Indexed);
    let mut dec = opts.read_info(bytes).map_err(corrupt)?;
    let first = dec.next_frame_info().map_err(corrupt)?.is_some();
    Ok(first)
}

fn map_image_error(format: SourceFormat, err: image::ImageError) -> SpeakifyError {
    match err {
        image::ImageError::Unsupported(e) => {
            SpeakifyError::unsupported_format(format!("{format}: {e}"))
        }
        image::ImageError::Limits(e) => {
            SpeakifyError::corrupt_input(format!("{format}: exceeds decode limits: {e}"))
        }
        other => SpeakifyError::corrupt_input(format!("{format}: {other}")),
    }
}

fn delay_to_ms(delay: image::Delay) -> u32 {
    let (num, den) = delay.numer_denom_ms();
    if den == 0 {
        return 0;
    }
    u32::try_from(div_round(u64::from(num), u64::from(den))).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/decode/decoder.rs"]
mod tests;
