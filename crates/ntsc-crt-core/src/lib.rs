//! NTSC composite video signal emulator
//!
//! An integer-only emulation of the NTSC analog television signal chain.
//! A source raster is modulated into one field of sampled composite baseband
//! signal, sync pulses, color burst and QAM chroma included, then demodulated
//! back into a raster the way a consumer CRT receiver would: sync search,
//! burst phase recovery, synchronous chroma demodulation, bandlimiting,
//! three-band equalization and beam bloom.
//!
//! # Features
//! - Fixed-point throughout; no floating point anywhere on the signal path
//! - Interlaced fields with half-line vertical sync identification
//! - Stateful sync trackers and burst recovery, so the picture "locks on"
//!   over a few frames instead of snapping
//! - Tunable saturation, brightness, contrast, black and white points
//! - Optional monochrome signal (no burst, no chroma)
//! - Deterministic noise injection with per-receiver generator state
//!
//! # Quick start
//! ```no_run
//! use ntsc_crt::{Crt, NtscSource};
//!
//! let image = vec![0x00c0_4020u32; 320 * 240];
//! let mut frame = vec![0u32; 640 * 480];
//!
//! let mut crt = Crt::new(640, 480)?;
//! let src = NtscSource {
//!     rgb: &image,
//!     width: 320,
//!     height: 240,
//!     field: 0,
//!     as_color: true,
//! };
//! crt.encode(&src)?;
//! crt.decode(24, &mut frame)?;
//! # Ok::<(), ntsc_crt::CrtError>(())
//! ```
//!
//! For interlaced output, toggle `field` between calls and keep feeding the
//! same `frame` buffer; the decoder blends each field over the previous one.

#![warn(missing_docs)]

pub mod constants;
mod crt;
mod decoder;
mod encoder;
mod filters;
mod fixed;
mod signal;

/// Error types for receiver operations
///
/// The signal pipeline itself is total; errors only arise at the interface
/// boundary (bad geometry, undersized buffers) or from the I/O of a caller
/// layered on top.
#[derive(thiserror::Error, Debug)]
pub enum CrtError {
    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for CrtError {
    /// Converts a String into `CrtError::Other`.
    fn from(msg: String) -> Self {
        CrtError::Other(msg)
    }
}

impl From<&str> for CrtError {
    /// Converts a string slice into `CrtError::Other`.
    fn from(msg: &str) -> Self {
        CrtError::Other(msg.to_string())
    }
}

/// Result type for receiver operations
pub type Result<T> = std::result::Result<T, CrtError>;

// Public API exports
pub use crt::{
    fade_phosphors, Crt, DEFAULT_BLACK_POINT, DEFAULT_BRIGHTNESS, DEFAULT_CONTRAST,
    DEFAULT_SATURATION, DEFAULT_WHITE_POINT,
};
pub use encoder::NtscSource;
