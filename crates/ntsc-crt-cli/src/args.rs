//! Command-line argument parsing for the PPM converter.
//!
//! The interface is a flag string followed by positional arguments:
//!
//! ```text
//! ntsc-crt -m|o|f|p|h outwidth outheight noise infile outfile
//! ```
//!
//! The flag argument is required; a bare `-` selects the defaults (full
//! color, interlaced, even field, prompt before overwriting).

use std::env;

use crate::CliError;

/// Parsed command-line arguments.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Encode a monochrome signal (no burst, no chroma).
    pub monochrome: bool,
    /// Prompt before overwriting an existing output file.
    pub prompt_overwrite: bool,
    /// Starting field parity.
    pub field: u8,
    /// Progressive scan: keep the same field every frame.
    pub progressive: bool,
    /// Help was requested.
    pub show_help: bool,
    /// Output width in pixels.
    pub outw: usize,
    /// Output height in pixels.
    pub outh: usize,
    /// Noise level, clamped to [0, 255].
    pub noise: u8,
    /// Input PPM path.
    pub infile: String,
    /// Output PPM path.
    pub outfile: String,
}

impl CliArgs {
    /// Parse arguments from the process command line.
    pub fn parse() -> Result<Self, CliError> {
        Self::parse_from(&env::args().skip(1).collect::<Vec<_>>())
    }

    /// Parse arguments from a slice (testable entry point).
    pub fn parse_from(args: &[String]) -> Result<Self, CliError> {
        let mut parsed = Self {
            monochrome: false,
            prompt_overwrite: true,
            field: 0,
            progressive: false,
            show_help: false,
            outw: 832,
            outh: 624,
            noise: 24,
            infile: String::new(),
            outfile: String::new(),
        };

        let flags = args
            .first()
            .ok_or_else(|| CliError::Usage("missing flag argument".into()))?;
        for flag in flags.trim_start_matches('-').chars() {
            match flag {
                'm' => parsed.monochrome = true,
                'o' => parsed.prompt_overwrite = false,
                'f' => parsed.field = 1,
                'p' => parsed.progressive = true,
                'h' => {
                    parsed.show_help = true;
                    return Ok(parsed);
                }
                other => {
                    return Err(CliError::Usage(format!("unrecognized flag '{other}'")));
                }
            }
        }

        if args.len() < 6 {
            return Err(CliError::Usage(format!(
                "expected 6 arguments, got {}",
                args.len()
            )));
        }

        parsed.outw = parse_int(&args[1], "outwidth")?;
        parsed.outh = parse_int(&args[2], "outheight")?;
        let noise: i64 = args[3]
            .parse()
            .map_err(|_| CliError::Usage(format!("bad integer for noise: {:?}", args[3])))?;
        parsed.noise = noise.clamp(0, 255) as u8;
        parsed.infile = args[4].clone();
        parsed.outfile = args[5].clone();

        Ok(parsed)
    }

    /// Print usage to stdout.
    pub fn print_help(program: &str) {
        println!("usage: {program} -m|o|f|p|h outwidth outheight noise infile outfile");
        println!("sample usage: {program} -op 640 480 24 in.ppm out.ppm");
        println!("sample usage: {program} - 832 624 0 in.ppm out.ppm");
        println!("-- NOTE: the - after the program name is required");
        println!("------------------------------------------------------------");
        println!("\tm : monochrome");
        println!("\to : do not prompt when overwriting files");
        println!("\tf : odd field (only meaningful in progressive mode)");
        println!("\tp : progressive scan (rather than interlaced)");
        println!("\th : print help");
        println!();
        println!("by default, the image will be full color and interlaced");
    }
}

fn parse_int(token: &str, what: &str) -> Result<usize, CliError> {
    let value: usize = token
        .parse()
        .map_err(|_| CliError::Usage(format!("bad integer for {what}: {token:?}")))?;
    if value == 0 {
        return Err(CliError::Usage(format!("{what} must be nonzero")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_defaults_with_bare_dash() {
        let args = CliArgs::parse_from(&strings(&["-", "640", "480", "24", "a.ppm", "b.ppm"]))
            .unwrap();
        assert!(!args.monochrome);
        assert!(args.prompt_overwrite);
        assert!(!args.progressive);
        assert_eq!(args.field, 0);
        assert_eq!((args.outw, args.outh), (640, 480));
        assert_eq!(args.noise, 24);
        assert_eq!(args.infile, "a.ppm");
        assert_eq!(args.outfile, "b.ppm");
    }

    #[test]
    fn parses_combined_flags() {
        let args = CliArgs::parse_from(&strings(&["-mofp", "320", "240", "0", "a.ppm", "b.ppm"]))
            .unwrap();
        assert!(args.monochrome);
        assert!(!args.prompt_overwrite);
        assert!(args.progressive);
        assert_eq!(args.field, 1);
    }

    #[test]
    fn clamps_noise() {
        let args = CliArgs::parse_from(&strings(&["-o", "320", "240", "999", "a.ppm", "b.ppm"]))
            .unwrap();
        assert_eq!(args.noise, 255);
        let args = CliArgs::parse_from(&strings(&["-o", "320", "240", "-5", "a.ppm", "b.ppm"]))
            .unwrap();
        assert_eq!(args.noise, 0);
    }

    #[test]
    fn help_short_circuits() {
        let args = CliArgs::parse_from(&strings(&["-h"])).unwrap();
        assert!(args.show_help);
    }

    #[test]
    fn rejects_unknown_flags_and_missing_args() {
        assert!(CliArgs::parse_from(&strings(&["-z", "1", "1", "0", "a", "b"])).is_err());
        assert!(CliArgs::parse_from(&strings(&["-", "640"])).is_err());
        assert!(CliArgs::parse_from(&strings(&[])).is_err());
        assert!(CliArgs::parse_from(&strings(&["-", "0", "480", "0", "a", "b"])).is_err());
    }
}
