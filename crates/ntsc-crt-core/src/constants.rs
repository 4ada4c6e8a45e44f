//! Signal geometry and level constants
//!
//! Everything here derives from the nominal NTSC horizontal line (~63500 ns)
//! sampled at four times the color subcarrier (14.31818 MHz), which puts 908
//! samples on a line. The per-region sample offsets are computed from the
//! nanosecond durations so the layout stays consistent if the sample rate
//! constant is ever changed.
//!
//! ```text
//!                  FULL HORIZONTAL LINE SIGNAL (~63500 ns)
//! |--------------------------------------------------------------------|
//!   HBLANK (~10900 ns)              ACTIVE VIDEO (~52600 ns)
//! |-------------------||-----------------------------------------------|
//!
//!   WITHIN HBLANK PERIOD:
//!
//!   FP (~1500 ns) SYNC (~4700 ns) BW (~600 ns) CB (~2500 ns) BP (~1600 ns)
//! |--------------||--------------||-----------||------------||----------|
//!      BLANK           SYNC          BLANK         BLANK        BLANK
//! ```

/// Color-carrier period in samples (the signal is sampled at 4x subcarrier).
pub const CRT_CB_FREQ: usize = 4;

/// Samples per scan line (227 subcarrier cycles worth).
pub const CRT_HRES: usize = CRT_CB_FREQ * 227;

/// Scan lines per field.
pub const CRT_VRES: usize = 262;

/// Total samples in one field of composite signal.
pub const CRT_INPUT_SIZE: usize = CRT_HRES * CRT_VRES;

/// First scan line carrying active video.
pub const CRT_TOP: usize = 21;

/// One past the last scan line carrying active video.
pub const CRT_BOT: usize = 261;

/// Number of active video lines.
pub const CRT_LINES: usize = CRT_BOT - CRT_TOP;

/// Front porch duration, nanoseconds.
pub const FP_NS: usize = 1500;
/// Sync tip duration, nanoseconds.
pub const SYNC_NS: usize = 4700;
/// Breezeway duration, nanoseconds.
pub const BW_NS: usize = 600;
/// Color burst duration, nanoseconds.
pub const CB_NS: usize = 2500;
/// Back porch duration, nanoseconds.
pub const BP_NS: usize = 1600;
/// Active video duration, nanoseconds.
pub const AV_NS: usize = 52600;

/// Horizontal blanking duration, nanoseconds.
pub const HB_NS: usize = FP_NS + SYNC_NS + BW_NS + CB_NS + BP_NS;

/// Full line duration, nanoseconds (~63500).
pub const LINE_NS: usize = HB_NS + AV_NS;

/// Convert a nanosecond offset to its sample position on the line.
pub const fn ns_to_pos(ns: usize) -> usize {
    ns * CRT_HRES / LINE_NS
}

/// Sample position where the front porch begins (line start).
pub const FP_BEG: usize = ns_to_pos(0);
/// Sample position where the sync tip begins.
pub const SYNC_BEG: usize = ns_to_pos(FP_NS);
/// Sample position where the breezeway begins.
pub const BW_BEG: usize = ns_to_pos(FP_NS + SYNC_NS);
/// Sample position where the color burst begins.
pub const CB_BEG: usize = ns_to_pos(FP_NS + SYNC_NS + BW_NS);
/// Sample position where the back porch begins.
pub const BP_BEG: usize = ns_to_pos(FP_NS + SYNC_NS + BW_NS + CB_NS);
/// Sample position where active video begins.
pub const AV_BEG: usize = ns_to_pos(HB_NS);
/// Active video length in samples.
pub const AV_LEN: usize = ns_to_pos(AV_NS);

/// Color burst cycles emitted on the back porch (somewhere between 7 and 12).
pub const CB_CYCLES: usize = 10;

/// Full line bandwidth, in tens of hertz (14.31818 MHz sample rate).
pub const L_FREQ: i32 = 1_431_818;
/// Luma (Y) bandwidth limit, same scale as [`L_FREQ`].
pub const Y_FREQ: i32 = 420_000;
/// Chroma (I) bandwidth limit, same scale as [`L_FREQ`].
pub const I_FREQ: i32 = 150_000;
/// Chroma (Q) bandwidth limit, same scale as [`L_FREQ`].
pub const Q_FREQ: i32 = 55_000;

/// Peak white, IRE.
pub const WHITE_LEVEL: i32 = 100;
/// Color burst amplitude, IRE.
pub const BURST_LEVEL: i32 = 20;
/// Black setup level, IRE.
pub const BLACK_LEVEL: i32 = 7;
/// Blanking level, IRE.
pub const BLANK_LEVEL: i32 = 0;
/// Sync tip level, IRE.
pub const SYNC_LEVEL: i32 = -40;

/// Four-sample color-carrier sequence; 227.5 subcarrier cycles per line mean
/// every other line carries it with reversed phase.
pub const CC_SEQ: [i32; 4] = [0, 1, 0, -1];

/// Convert a cutoff in kHz to line-sample units for the equalizer setup.
pub const fn khz_to_line(khz: i32) -> i32 {
    (CRT_HRES as i32) * (khz * 100) / L_FREQ
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_duration_sums_to_nominal() {
        assert_eq!(LINE_NS, 63_500);
        assert_eq!(HB_NS, 10_900);
    }

    #[test]
    fn region_offsets_are_ordered() {
        assert_eq!(FP_BEG, 0);
        assert!(FP_BEG < SYNC_BEG);
        assert!(SYNC_BEG < BW_BEG);
        assert!(BW_BEG < CB_BEG);
        assert!(CB_BEG < BP_BEG);
        assert!(BP_BEG < AV_BEG);
        assert!(AV_BEG + AV_LEN <= CRT_HRES);
    }

    #[test]
    fn derived_geometry() {
        assert_eq!(CRT_HRES, 908);
        assert_eq!(SYNC_BEG, 21);
        assert_eq!(BW_BEG, 88);
        assert_eq!(CB_BEG, 97);
        assert_eq!(AV_BEG, 155);
        assert_eq!(AV_LEN, 752);
        assert_eq!(CRT_LINES, 240);
        assert_eq!(CRT_INPUT_SIZE, 908 * 262);
    }

    #[test]
    fn burst_fits_in_back_porch() {
        // Ten cycles of burst must end before active video starts.
        assert!(CB_BEG + CB_CYCLES * CRT_CB_FREQ <= AV_BEG);
    }

    #[test]
    fn khz_conversion_matches_eq_setup_points() {
        assert_eq!(khz_to_line(1500), 95);
        assert_eq!(khz_to_line(3000), 190);
        assert_eq!(khz_to_line(80), 5);
        assert_eq!(khz_to_line(1150), 72);
        assert_eq!(khz_to_line(1000), 63);
    }
}
