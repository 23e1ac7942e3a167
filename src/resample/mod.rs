//! Time and space resampling of decoded frame sequences.

pub(crate) mod spatial;
pub(crate) mod temporal;
