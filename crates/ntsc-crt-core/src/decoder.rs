//! Composite signal to raster
//!
//! The receiving half: inject noise, chase vertical and horizontal sync,
//! recover the color burst, synchronously demodulate chroma, equalize,
//! emulate beam bloom, and resample each scan line into the output raster.
//!
//! Order matters within a field: every line's output depends on the burst
//! reference and beam energy accumulated on the lines above it.

use crate::constants::{
    AV_BEG, AV_LEN, BLACK_LEVEL, CB_BEG, CB_CYCLES, CRT_BOT, CRT_CB_FREQ, CRT_HRES,
    CRT_INPUT_SIZE, CRT_LINES, CRT_TOP, CRT_VRES, SYNC_BEG, SYNC_LEVEL,
};
use crate::crt::Crt;
use crate::{CrtError, Result};

/// Horizontal sync search span, in samples around the current lock.
const HSYNC_WINDOW: i32 = 8;
/// Vertical sync search span, in lines around the current lock.
const VSYNC_WINDOW: i32 = 8;

/// Modulo that stays non-negative for negative offsets.
#[inline]
fn posmod(x: i32, n: i32) -> i32 {
    ((x % n) + n) % n
}

/// One demodulated sample triple on the scan line scratchpad.
#[derive(Clone, Copy, Default)]
struct Yiq {
    y: i32,
    i: i32,
    q: i32,
}

impl Crt {
    /// Decode the current composite signal into `out`, blending 50/50 with
    /// the frame already there.
    ///
    /// `noise` scales the injected static; 0 is a clean cable feed. `out`
    /// must hold at least `width() * height()` packed `0x00RRGGBB` pixels
    /// and is caller-owned; its previous contents are half of every output
    /// pixel.
    pub fn decode(&mut self, noise: u8, out: &mut [u32]) -> Result<()> {
        if out.len() < self.outw * self.outh {
            return Err(CrtError::ConfigError(format!(
                "output buffer holds {} pixels, geometry needs {}",
                out.len(),
                self.outw * self.outh
            )));
        }

        let noise = noise as i32;
        let bright = self.brightness - (BLACK_LEVEL + self.black_point);

        // Burst reference vector, one accumulator per carrier phase. It is
        // rebuilt over the course of the field and leaks from line to line,
        // which is what makes the hue settle instead of snapping.
        let mut ccref = [0i32; 4];

        // Signal plus static. The generator state lives on the receiver so
        // consecutive frames get independent noise.
        for i in 0..CRT_INPUT_SIZE {
            self.rn = self.rn.wrapping_mul(214_019).wrapping_add(140_327_895);
            let n = (((self.rn >> 16) & 0xff) - 0x7f) * noise >> 8;
            let s = self.analog.get(i) + n;
            self.inp.set(i, s.clamp(-127, 127) as i8);
        }

        // Vertical sync: integrate candidate lines near the current lock
        // until one sinks below the threshold. The vsync pulse holds sync
        // for most of a line, so its integral is far deeper than anything a
        // picture line can produce.
        let mut vline = 0;
        let mut crossing = CRT_HRES;
        'vsync: {
            for i in -VSYNC_WINDOW..VSYNC_WINDOW {
                vline = posmod(self.vsync + i, CRT_VRES as i32);
                let base = vline as usize * CRT_HRES;
                let mut sum = 0;
                crossing = 0;
                while crossing < CRT_HRES {
                    sum += self.inp.get(base + crossing);
                    if sum <= 100 * SYNC_LEVEL {
                        break 'vsync;
                    }
                    crossing += 1;
                }
            }
            // No line triggered; settle for the last candidate.
        }
        self.vsync = vline;
        // Sync landing in the back half of the line marks the odd field.
        let field = usize::from(crossing > CRT_HRES / 2);
        self.last_field = field as u8;

        // Beam energy bounds for the bloom emulation.
        let max_e = (128 + noise / 2) * AV_LEN as i32;
        let mut prev_e = 16384 / 8;

        // Rounded ratio of output rows to signal lines.
        let ratio = ((self.outh << 16) / CRT_LINES + 32768) >> 16;
        let field_rows = field * (ratio / 2);

        let mut scratch = [Yiq::default(); AV_LEN + 1];

        for line in CRT_TOP..CRT_BOT {
            let beg = (line - CRT_TOP) * self.outh / CRT_LINES + field_rows;
            let end = ((line - CRT_TOP + 1) * self.outh / CRT_LINES + field_rows).min(self.outh);
            if beg >= self.outh {
                continue;
            }

            let ln = posmod(line as i32 + self.vsync, CRT_VRES as i32) as usize * CRT_HRES;

            // Horizontal sync: same integration trick on the sync tip,
            // shallower threshold.
            let sync_base = ln + self.hsync as usize + SYNC_BEG;
            let mut i = -HSYNC_WINDOW;
            let mut sum = 0;
            while i < HSYNC_WINDOW {
                sum += self.inp.get((sync_base as i32 + i) as usize);
                if sum <= 4 * SYNC_LEVEL {
                    break;
                }
                i += 1;
            }
            self.hsync = posmod(i + self.hsync, CRT_HRES as i32);

            // Color burst, read at carrier-aligned offset: fold each sample
            // into the matching phase accumulator, keeping 127/128 of what
            // was already there.
            let burst_base = ln + (self.hsync & !3) as usize;
            for i in CB_BEG..CB_BEG + CB_CYCLES * CRT_CB_FREQ {
                let p = ccref[i & 3] * 127 / 128;
                ccref[i & 3] = p + self.inp.get(burst_base + i);
            }

            let xpos = posmod(AV_BEG as i32 + self.hsync, CRT_HRES as i32) as usize;
            let ypos = posmod(line as i32 + self.vsync, CRT_VRES as i32) as usize;
            let pos = xpos + ypos * CRT_HRES;
            let phasealign = pos & 3;

            // Carrier amplitude is saturation, phase difference is hue.
            let dci = ccref[(phasealign + 1) & 3] - ccref[(phasealign + 3) & 3];
            let dcq = ccref[(phasealign + 2) & 3] - ccref[phasealign & 3];
            let wave = [
                -dcq * self.saturation,
                dci * self.saturation,
                dcq * self.saturation,
                -dci * self.saturation,
            ];

            // Scan line energy drives the bloom: bright lines narrow, dark
            // lines widen.
            let mut energy = 0;
            for k in 0..AV_LEN {
                energy += self.inp.get(pos + k);
            }
            prev_e = prev_e * 123 / 128 + (((max_e >> 1) - energy) << 10) / max_e;
            let line_w = AV_LEN as i32 * 112 / 128 + (prev_e >> 9);

            let dx = (line_w << 12) / self.outw as i32;
            let scan_l = ((AV_LEN as i32 / 2 - (line_w >> 1) + 8) << 12).max(0);
            let scan_r = (AV_LEN as i32 - 1) << 12;

            let l = (scan_l >> 12) as usize;
            let r = (scan_r >> 12) as usize;

            self.eq_y.reset();
            self.eq_i.reset();
            self.eq_q.reset();

            for k in l..r {
                let s = self.inp.get(pos + k);
                scratch[k] = Yiq {
                    y: self.eq_y.process(s + bright) << 4,
                    i: self.eq_i.process(s * wave[k & 3] >> 9) >> 3,
                    q: self.eq_q.process(s * wave[(k + 3) & 3] >> 9) >> 3,
                };
            }

            // Resample the scan span into the output row, interpolating
            // between scratch samples with Q12 weights, then convert to RGB
            // and blend 50/50 with what the frame already holds. The masks
            // keep the per-channel right shift from borrowing across
            // channels.
            let row = &mut out[beg * self.outw..(beg + 1) * self.outw];
            let mut col = 0;
            let mut pos_q = scan_l;
            while pos_q < scan_r && col < self.outw {
                let rw = pos_q & 0xfff;
                let lw = 0xfff - rw;
                let s0 = (pos_q >> 12) as usize;
                let a = scratch[s0];
                let b = scratch[s0 + 1];

                let y = ((a.y * lw) >> 2) + ((b.y * rw) >> 2);
                let ci = ((a.i * lw) >> 14) + ((b.i * rw) >> 14);
                let cq = ((a.q * lw) >> 14) + ((b.q * rw) >> 14);

                let red = (((y + 3879 * ci + 2556 * cq) >> 12) * self.contrast) >> 8;
                let grn = (((y - 1126 * ci - 2605 * cq) >> 12) * self.contrast) >> 8;
                let blu = (((y - 4530 * ci + 7021 * cq) >> 12) * self.contrast) >> 8;

                let aa = ((red.clamp(0, 255) as u32) << 16)
                    | ((grn.clamp(0, 255) as u32) << 8)
                    | (blu.clamp(0, 255) as u32);
                let bb = row[col];
                row[col] = ((aa & 0x00fe_feff) >> 1) + ((bb & 0x00fe_feff) >> 1);

                col += 1;
                pos_q += dx;
            }

            // Replicate the scan line down the rest of its destination band.
            for s in beg + 1..end {
                out.copy_within((s - 1) * self.outw..s * self.outw, s * self.outw);
            }
        }

        Ok(())
    }
}
