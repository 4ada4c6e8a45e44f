//! The virtual CRT receiver
//!
//! One [`Crt`] is one television set: it owns the generated composite signal,
//! the noisy copy the decoder sees, the sync trackers that give the set its
//! "lock" behavior, and the filter instances both pipeline halves run on.
//! Nothing here is shared process-wide; two sets tuned to the same source
//! drift independently once their noise generators diverge.

use crate::constants::{khz_to_line, CRT_HRES, I_FREQ, L_FREQ, Q_FREQ, Y_FREQ};
use crate::filters::{EqFilter, IirLowPass};
use crate::signal::SignalBuffer;
use crate::{CrtError, Result};

/// Default saturation after [`Crt::reset`].
pub const DEFAULT_SATURATION: i32 = 18;
/// Default brightness after [`Crt::reset`].
pub const DEFAULT_BRIGHTNESS: i32 = 0;
/// Default contrast after [`Crt::reset`].
pub const DEFAULT_CONTRAST: i32 = 179;
/// Default black point after [`Crt::reset`].
pub const DEFAULT_BLACK_POINT: i32 = 0;
/// Default white point after [`Crt::reset`].
pub const DEFAULT_WHITE_POINT: i32 = 100;

/// Seed of the decoder's noise generator.
const NOISE_SEED: i32 = 194;

/// A virtual CRT receiver.
///
/// Create one with [`Crt::new`], feed it a raster with
/// [`encode`](Crt::encode), then pull a decoded frame with
/// [`decode`](Crt::decode). The sync trackers and the noise generator
/// persist across calls on purpose; resetting them every frame would destroy
/// the lock-on behavior that makes the emulation look like a real set.
#[derive(Clone, Debug)]
pub struct Crt {
    /// Chroma gain applied during demodulation.
    pub saturation: i32,
    /// Luma offset applied before equalization.
    pub brightness: i32,
    /// Output gain applied after YIQ to RGB conversion.
    pub contrast: i32,
    /// Offset added to the black level on the encoded signal.
    pub black_point: i32,
    /// Percent scale on the white level of the encoded signal.
    pub white_point: i32,

    pub(crate) outw: usize,
    pub(crate) outh: usize,

    /// Horizontal sync tracker, column units. Persists across frames.
    pub(crate) hsync: i32,
    /// Vertical sync tracker, line units. Persists across frames.
    pub(crate) vsync: i32,
    /// Field parity recovered by the last vertical sync search.
    pub(crate) last_field: u8,

    /// Noise generator state.
    pub(crate) rn: i32,

    /// Clean composite signal written by the encoder.
    pub(crate) analog: SignalBuffer,
    /// Composite signal after noise injection, what the decoder sees.
    pub(crate) inp: SignalBuffer,

    // Encoder bandlimiters, reset per active-video row.
    pub(crate) iir_y: IirLowPass,
    pub(crate) iir_i: IirLowPass,
    pub(crate) iir_q: IirLowPass,

    // Decoder equalizers, reset per decoded line.
    pub(crate) eq_y: EqFilter,
    pub(crate) eq_i: EqFilter,
    pub(crate) eq_q: EqFilter,
}

impl Crt {
    /// Create a receiver producing `outw` x `outh` frames.
    ///
    /// The band gains here are pre-scaled 16-bit fixed point, matched to the
    /// equalizer's internal precision.
    pub fn new(outw: usize, outh: usize) -> Result<Self> {
        check_geometry(outw, outh)?;

        let rate = CRT_HRES as i32;
        let mut crt = Self {
            saturation: 0,
            brightness: 0,
            contrast: 0,
            black_point: 0,
            white_point: 0,
            outw,
            outh,
            hsync: 0,
            vsync: 0,
            last_field: 0,
            rn: NOISE_SEED,
            analog: SignalBuffer::new(),
            inp: SignalBuffer::new(),
            iir_y: IirLowPass::new(L_FREQ, Y_FREQ),
            iir_i: IirLowPass::new(L_FREQ, I_FREQ),
            iir_q: IirLowPass::new(L_FREQ, Q_FREQ),
            eq_y: EqFilter::new(khz_to_line(1500), khz_to_line(3000), rate, 65536, 8192, 9175),
            eq_i: EqFilter::new(khz_to_line(80), khz_to_line(1150), rate, 65536, 65536, 1311),
            eq_q: EqFilter::new(khz_to_line(80), khz_to_line(1000), rate, 65536, 65536, 0),
        };
        crt.reset();
        Ok(crt)
    }

    /// Rebind the output geometry. Filters and sync state are untouched, so
    /// a resized receiver stays locked onto the signal.
    pub fn resize(&mut self, outw: usize, outh: usize) -> Result<()> {
        check_geometry(outw, outh)?;
        self.outw = outw;
        self.outh = outh;
        Ok(())
    }

    /// Restore default tuning and drop sync lock. Filters are unchanged.
    pub fn reset(&mut self) {
        self.saturation = DEFAULT_SATURATION;
        self.brightness = DEFAULT_BRIGHTNESS;
        self.contrast = DEFAULT_CONTRAST;
        self.black_point = DEFAULT_BLACK_POINT;
        self.white_point = DEFAULT_WHITE_POINT;
        self.hsync = 0;
        self.vsync = 0;
    }

    /// Output frame width in pixels.
    pub fn width(&self) -> usize {
        self.outw
    }

    /// Output frame height in pixels.
    pub fn height(&self) -> usize {
        self.outh
    }

    /// Column the horizontal sync search last locked onto.
    pub fn hsync(&self) -> usize {
        self.hsync as usize
    }

    /// Line the vertical sync search last locked onto.
    pub fn vsync(&self) -> usize {
        self.vsync as usize
    }

    /// Field parity (0 or 1) recovered from the last decoded signal.
    pub fn recovered_field(&self) -> u8 {
        self.last_field
    }

    /// The clean composite signal produced by the last [`encode`](Crt::encode).
    pub fn analog_signal(&self) -> &[i8] {
        self.analog.as_slice()
    }

    /// The noise-injected signal consumed by the last [`decode`](Crt::decode).
    pub fn input_signal(&self) -> &[i8] {
        self.inp.as_slice()
    }
}

fn check_geometry(outw: usize, outh: usize) -> Result<()> {
    if outw == 0 || outh == 0 {
        return Err(CrtError::ConfigError(format!(
            "output geometry must be nonzero, got {outw}x{outh}"
        )));
    }
    Ok(())
}

/// Age a frame the way phosphors do between refreshes.
///
/// Every pixel decays to ~94% of its value via shifted masked halves, the
/// same arithmetic a frontend would run before blending the next decoded
/// field on top.
pub fn fade_phosphors(frame: &mut [u32]) {
    for px in frame {
        let c = *px & 0x00ff_ffff;
        *px = ((c >> 1) & 0x007f_7f7f)
            + ((c >> 2) & 0x003f_3f3f)
            + ((c >> 3) & 0x001f_1f1f)
            + ((c >> 4) & 0x000f_0f0f);
    }
}
