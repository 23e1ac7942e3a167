//! Speakify turns a still or animated image into a small looping GIF.
//!
//! A conversion takes the input bytes, a grid resolution and a frame count, and runs a fixed
//! pipeline:
//!
//! - decode the input into frames ([`SourceDecoder`])
//! - pick output frames in time ([`resample_temporal`]) and scale them ([`SpatialResampler`])
//! - build one shared palette and index every pixel ([`Quantizer`])
//! - write a GIF89a stream ([`GifEncoder`])
//!
//! [`Engine`] drives the pipeline and keeps scratch buffers between conversions.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod decode;
mod encode;
mod engine;
mod foundation;
mod quantize;
mod resample;

pub use crate::config::{ConvertOpts, DecodeLimits, GridShape, Repeat};
pub use crate::decode::format::SourceFormat;
pub use crate::decode::frames::{FrameSequence, RawFrame};
pub use crate::decode::{ImageSourceDecoder, SourceDecoder};
pub use crate::encode::{GifEncoder, check_dimensions};
pub use crate::engine::{ConversionStats, Engine, PipelineStage, convert};
pub use crate::foundation::core::{Dimensions, Rgb8};
pub use crate::foundation::error::{ErrorKind, SpeakifyError, SpeakifyResult};
pub use crate::quantize::{IndexedFrame, MAX_PALETTE_LEN, Palette, QuantizedAnimation, Quantizer};
pub use crate::resample::spatial::{CropRect, OutputGeometry, ResampledFrame, SpatialResampler};
pub use crate::resample::temporal::{FramePick, TemporalPlan, resample_temporal};

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
