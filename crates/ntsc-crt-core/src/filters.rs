//! Reusable DSP blocks
//!
//! Two filters make up the whole bandlimiting story: a single-pole IIR
//! low-pass used by the encoder to bandlimit Y/I/Q before modulation, and a
//! three-band equalizer used by the decoder to shape the demodulated
//! channels. Both are plain integer state machines that get reset at every
//! scan line so no state smears across sync transitions.

use crate::fixed::{exp_mul, expx, sincos14, EXP_ONE, EXP_PI, T14_PI};

/// Single-pole IIR low-pass for bandlimiting a YIQ channel.
///
/// The coefficient is the usual first-order RC discretization,
/// `1 - e^(-pi / rate)` in Q11, where `rate` is cycles per sample.
#[derive(Clone, Debug)]
pub(crate) struct IirLowPass {
    /// Q11 filter coefficient, in (0, 1).
    c: i32,
    /// Accumulator.
    h: i32,
}

impl IirLowPass {
    /// `freq` is the total bandwidth, `limit` the cutoff, both on the same
    /// scale.
    pub(crate) fn new(freq: i32, limit: i32) -> Self {
        let rate = (freq << 9) / limit;
        Self {
            c: EXP_ONE - expx(-((EXP_PI << 9) / rate)),
            h: 0,
        }
    }

    /// Zero the accumulator. Called at the start of every scan line.
    pub(crate) fn reset(&mut self) {
        self.h = 0;
    }

    #[inline]
    pub(crate) fn process(&mut self, s: i32) -> i32 {
        self.h += exp_mul(s - self.h, self.c);
        self.h
    }
}

/// History depth of the equalizer's raw-input delay line.
const HIST_LEN: usize = 3;
/// Newest history slot.
const HIST_NEW: usize = 0;
/// Oldest history slot.
const HIST_OLD: usize = HIST_LEN - 1;

/// Fractional bits of the equalizer fixed point. The band gains are
/// pre-scaled to this precision.
const EQ_P: i32 = 16;
/// Rounding term for the cascade updates.
const EQ_R: i32 = 1 << (EQ_P - 1);

/// One cascade stage update toward `target`. The Q16 product can exceed 32
/// bits on a noisy chroma signal, so it is formed at 64.
#[inline]
fn one_pole(c: i32, target: i32, state: i32) -> i32 {
    state + (((c as i64 * (target - state) as i64 + EQ_R as i64) >> EQ_P) as i32)
}

/// Three-band equalizer built from two cascaded 4-stage one-pole low-pass
/// sections and a 3-sample delay line.
///
/// The low cascade output is the low band; the difference between the two
/// cascades is the mid band; the delayed raw input minus the high cascade is
/// the high band. The delay compensates the group delay of the cascades so
/// the three bands stay aligned when summed.
#[derive(Clone, Debug)]
pub(crate) struct EqFilter {
    /// Q16 low cutoff fraction.
    lf: i32,
    /// Q16 high cutoff fraction.
    hf: i32,
    /// Q16 band gains: low, mid, high.
    g: [i32; 3],
    /// Low cascade state.
    fl: [i32; 4],
    /// High cascade state.
    fh: [i32; 4],
    /// Raw-input delay line.
    h: [i32; HIST_LEN],
}

impl EqFilter {
    /// Build an equalizer for cutoffs `f_lo`/`f_hi` (in samples of `rate`)
    /// with Q16 band gains.
    pub(crate) fn new(f_lo: i32, f_hi: i32, rate: i32, g_lo: i32, g_mid: i32, g_hi: i32) -> Self {
        // 2 sin(pi f / rate), rescaled from the 15-bit sine to Q16.
        let (sn, _) = sincos14(T14_PI * f_lo / rate);
        let lf = 2 * (sn << (EQ_P - 15));
        let (sn, _) = sincos14(T14_PI * f_hi / rate);
        let hf = 2 * (sn << (EQ_P - 15));

        Self {
            lf,
            hf,
            g: [g_lo, g_mid, g_hi],
            fl: [0; 4],
            fh: [0; 4],
            h: [0; HIST_LEN],
        }
    }

    /// Zero all cascade and history state. Called at the start of every
    /// decoded scan line.
    pub(crate) fn reset(&mut self) {
        self.fl = [0; 4];
        self.fh = [0; 4];
        self.h = [0; HIST_LEN];
    }

    pub(crate) fn process(&mut self, s: i32) -> i32 {
        self.fl[0] = one_pole(self.lf, s, self.fl[0]);
        self.fh[0] = one_pole(self.hf, s, self.fh[0]);
        for i in 1..4 {
            self.fl[i] = one_pole(self.lf, self.fl[i - 1], self.fl[i]);
            self.fh[i] = one_pole(self.hf, self.fh[i - 1], self.fh[i]);
        }

        let mut r = [
            self.fl[3],
            self.fh[3] - self.fl[3],
            self.h[HIST_OLD] - self.fh[3],
        ];
        for (band, gain) in r.iter_mut().zip(self.g) {
            *band = ((*band as i64 * gain as i64) >> EQ_P) as i32;
        }

        for i in (1..HIST_LEN).rev() {
            self.h[i] = self.h[i - 1];
        }
        self.h[HIST_NEW] = s;

        r[0] + r[1] + r[2]
    }
}
