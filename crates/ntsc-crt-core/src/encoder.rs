//! Raster to composite signal
//!
//! Lays down one field of composite signal: equalizing pulses and the
//! vertical sync block at the top of the field, then horizontal blanking,
//! color burst and QAM-modulated active video on every picture line.

use crate::constants::{
    AV_BEG, AV_LEN, BLACK_LEVEL, BLANK_LEVEL, BURST_LEVEL, BW_BEG, CB_BEG, CB_CYCLES, CC_SEQ,
    CRT_CB_FREQ, CRT_HRES, CRT_LINES, CRT_TOP, CRT_VRES, SYNC_BEG, SYNC_LEVEL, WHITE_LEVEL,
};
use crate::crt::Crt;
use crate::{CrtError, Result};

/// A source raster handed to [`Crt::encode`].
pub struct NtscSource<'a> {
    /// Packed `0x00RRGGBB` pixels, row-major, no stride.
    pub rgb: &'a [u32],
    /// Source width in pixels.
    pub width: usize,
    /// Source height in pixels.
    pub height: usize,
    /// Field parity; only the low bit is used.
    pub field: u8,
    /// Emit a color burst and modulate chroma. When false the signal is
    /// monochrome and carries no burst.
    pub as_color: bool,
}

/// Lines 0-3 and 7-9 carry equalizing pulses: short blips of sync at twice
/// line rate, mostly blank. Boundaries are percent of line.
const EQ_PULSE_BOUNDS: [usize; 4] = [4, 50, 54, 100];
/// Lines 4-6 carry the vertical sync block: mostly sync, brief blanks. The
/// even/odd split is the half-line offset that identifies the field.
const VSYNC_EVEN_BOUNDS: [usize; 4] = [46, 50, 96, 100];
const VSYNC_ODD_BOUNDS: [usize; 4] = [4, 50, 96, 100];

/// Write alternating sync/blank spans up to each percent boundary.
fn pulse_train(line: &mut [i8], bounds: &[usize; 4]) {
    let mut t = 0;
    for (k, &pct) in bounds.iter().enumerate() {
        let stop = pct * CRT_HRES / 100;
        let level = if k % 2 == 0 { SYNC_LEVEL } else { BLANK_LEVEL };
        line[t..stop].fill(level as i8);
        t = stop;
    }
}

impl Crt {
    /// Encode one field of `src` into the receiver's composite signal.
    ///
    /// Only the signal buffer is written; nothing is decoded until
    /// [`decode`](Crt::decode) runs.
    pub fn encode(&mut self, src: &NtscSource<'_>) -> Result<()> {
        if src.width == 0 || src.height == 0 {
            return Err(CrtError::ConfigError(format!(
                "source geometry must be nonzero, got {}x{}",
                src.width, src.height
            )));
        }
        if src.rgb.len() < src.width * src.height {
            return Err(CrtError::ConfigError(format!(
                "source buffer holds {} pixels, geometry needs {}",
                src.rgb.len(),
                src.width * src.height
            )));
        }

        let field = usize::from(src.field & 1);

        // Slight overscan: the picture is scaled into a bit less than the
        // active region, centered, and the horizontal offset is rounded down
        // to a multiple of 4 to keep chroma phase aligned.
        let destw = (AV_LEN * 55_500) >> 16;
        let desth = (CRT_LINES * 63_500) >> 16;
        let xo = (AV_BEG + 4 + (AV_LEN - destw) / 2) & !3;
        let yo = CRT_TOP + 4 + (CRT_LINES - desth) / 2;

        for n in 0..CRT_VRES {
            let line = self.analog.line_mut(n);

            if n <= 3 || (7..=9).contains(&n) {
                pulse_train(line, &EQ_PULSE_BOUNDS);
            } else if (4..=6).contains(&n) {
                let bounds = if field == 1 {
                    &VSYNC_ODD_BOUNDS
                } else {
                    &VSYNC_EVEN_BOUNDS
                };
                pulse_train(line, bounds);
            } else {
                // Picture line: front porch, sync tip, then blank through the
                // burst and back porch. Above the visible band the rest of
                // the line stays blank too.
                line[..SYNC_BEG].fill(BLANK_LEVEL as i8);
                line[SYNC_BEG..BW_BEG].fill(SYNC_LEVEL as i8);
                line[BW_BEG..AV_BEG].fill(BLANK_LEVEL as i8);
                if n < CRT_TOP {
                    line[AV_BEG..].fill(BLANK_LEVEL as i8);
                }
                if src.as_color {
                    // CB_CYCLES of color burst at the subcarrier rate.
                    for t in CB_BEG..CB_BEG + CB_CYCLES * CRT_CB_FREQ {
                        line[t] = (BLANK_LEVEL + CC_SEQ[t & 3] * BURST_LEVEL) as i8;
                    }
                }
            }
        }

        // Half a source line of vertical shear between the two fields.
        let field_offset = (field * src.height + desth) / desth / 2;
        let white_gain = WHITE_LEVEL * self.white_point / 100;

        for y in 0..desth {
            // Two adjacent source rows blend into every signal line.
            let sy_a = ((y * src.height) / desth + field_offset).min(src.height - 1);
            let sy_b = ((y * src.height + desth / 2) / desth + field_offset).min(src.height - 1);
            let row_a = &src.rgb[sy_a * src.width..];
            let row_b = &src.rgb[sy_b * src.width..];

            let ph = if (y + yo) % 2 == 1 { -1 } else { 1 };

            self.iir_y.reset();
            self.iir_i.reset();
            self.iir_q.reset();

            for x in 0..destw {
                let sx = x * src.width / destw;
                let (ra, ga, ba) = split_rgb(row_a[sx]);
                let (rb, gb, bb) = split_rgb(row_b[sx]);

                // RGB to YIQ, summing the pixel pair (vertical oversampling
                // feeding the bandlimit filters).
                let fy = (19595 * ra + 38470 * ga + 7471 * ba + 19595 * rb + 38470 * gb + 7471 * bb)
                    >> 15;
                let fi = (39059 * ra - 18022 * ga - 21103 * ba + 39059 * rb - 18022 * gb
                    - 21103 * bb)
                    >> 15;
                let fq = (13894 * ra - 34275 * ga + 20382 * ba + 13894 * rb - 34275 * gb
                    + 20382 * bb)
                    >> 15;

                let fy = self.iir_y.process(fy);
                let fi = self.iir_i.process(fi) * ph * CC_SEQ[x & 3];
                let fq = self.iir_q.process(fq) * ph * CC_SEQ[(x + 3) & 3];

                let mut ire = BLACK_LEVEL + self.black_point;
                ire += ((fy + fi + fq) * white_gain) >> 10;
                let ire = ire.clamp(0, 110);

                self.analog.set((x + xo) + (y + yo) * CRT_HRES, ire as i8);
            }
        }

        Ok(())
    }
}

#[inline]
fn split_rgb(px: u32) -> (i32, i32, i32) {
    (
        ((px >> 16) & 0xff) as i32,
        ((px >> 8) & 0xff) as i32,
        (px & 0xff) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_source(rgb: &[u32], color: bool, field: u8) -> NtscSource<'_> {
        NtscSource {
            rgb,
            width: 32,
            height: 32,
            field,
            as_color: color,
        }
    }

    #[test]
    fn rejects_undersized_buffers() {
        let px = vec![0u32; 10];
        let mut crt = Crt::new(64, 64).unwrap();
        let src = NtscSource {
            rgb: &px,
            width: 32,
            height: 32,
            field: 0,
            as_color: true,
        };
        assert!(crt.encode(&src).is_err());
    }

    #[test]
    fn picture_lines_carry_sync_and_burst() {
        let px = vec![0u32; 32 * 32];
        let mut crt = Crt::new(64, 64).unwrap();
        crt.encode(&flat_source(&px, true, 0)).unwrap();

        let line = &crt.analog_signal()[40 * CRT_HRES..41 * CRT_HRES];
        assert!(line[..SYNC_BEG].iter().all(|&s| s == BLANK_LEVEL as i8));
        assert!(line[SYNC_BEG..BW_BEG].iter().all(|&s| s == SYNC_LEVEL as i8));

        let burst = &line[CB_BEG..CB_BEG + CB_CYCLES * CRT_CB_FREQ];
        assert!(burst.iter().any(|&s| s == BURST_LEVEL as i8));
        assert!(burst.iter().any(|&s| s == -BURST_LEVEL as i8));
    }

    #[test]
    fn monochrome_signal_has_no_burst() {
        let px = vec![0u32; 32 * 32];
        let mut crt = Crt::new(64, 64).unwrap();
        crt.encode(&flat_source(&px, false, 0)).unwrap();

        let line = &crt.analog_signal()[40 * CRT_HRES..41 * CRT_HRES];
        assert!(line[CB_BEG..CB_BEG + CB_CYCLES * CRT_CB_FREQ]
            .iter()
            .all(|&s| s == BLANK_LEVEL as i8));
    }

    #[test]
    fn vertical_sync_block_differs_by_field() {
        let px = vec![0u32; 32 * 32];
        let mut even = Crt::new(64, 64).unwrap();
        let mut odd = Crt::new(64, 64).unwrap();
        even.encode(&flat_source(&px, true, 0)).unwrap();
        odd.encode(&flat_source(&px, true, 1)).unwrap();

        let line_even = &even.analog_signal()[4 * CRT_HRES..5 * CRT_HRES];
        let line_odd = &odd.analog_signal()[4 * CRT_HRES..5 * CRT_HRES];
        assert_ne!(line_even, line_odd);

        // Even field holds sync almost half the line; odd drops it early.
        assert_eq!(line_even[20 * CRT_HRES / 100], SYNC_LEVEL as i8);
        assert_eq!(line_odd[20 * CRT_HRES / 100], BLANK_LEVEL as i8);
    }

    #[test]
    fn equalizing_lines_are_mostly_blank() {
        let px = vec![0u32; 32 * 32];
        let mut crt = Crt::new(64, 64).unwrap();
        crt.encode(&flat_source(&px, true, 0)).unwrap();

        for n in [0, 1, 2, 3, 7, 8, 9] {
            let line = &crt.analog_signal()[n * CRT_HRES..(n + 1) * CRT_HRES];
            let sync_samples = line.iter().filter(|&&s| s == SYNC_LEVEL as i8).count();
            assert!(
                sync_samples < CRT_HRES / 10,
                "line {n} has {sync_samples} sync samples"
            );
        }
    }

    #[test]
    fn all_samples_stay_in_composite_range() {
        let px: Vec<u32> = (0..32 * 32).map(|i| (i as u32) * 0x0004_0301).collect();
        let mut crt = Crt::new(64, 64).unwrap();
        crt.encode(&flat_source(&px, true, 0)).unwrap();
        for &s in crt.analog_signal() {
            let s = s as i32;
            assert!((SYNC_LEVEL..=110).contains(&s), "sample {s} out of range");
        }
    }
}
