//! NTSC/CRT PPM converter
//!
//! Reads a binary PPM, pushes it through the composite encode/decode
//! pipeline for a few frame pairs so the receiver locks on and the blend
//! accumulates, then writes the decoded frame back out as PPM.

mod args;
mod ppm;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use ntsc_crt::{Crt, NtscSource};

use args::CliArgs;

const DRV_HEADER: &str = "NTSC/CRT composite signal converter";

/// Frame pairs accumulated before the output is written.
const ACCUM_FRAMES: u32 = 4;

/// Errors surfaced by the converter.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// IO error from filesystem or stdin
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed or unsupported image file
    #[error("bad image: {0}")]
    BadImage(String),

    /// Bad command line
    #[error("{0}")]
    Usage(String),

    /// Error from the signal pipeline
    #[error(transparent)]
    Crt(#[from] ntsc_crt::CrtError),
}

fn main() -> ExitCode {
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| "ntsc-crt".into());

    let args = match CliArgs::parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            CliArgs::print_help(&program);
            return ExitCode::FAILURE;
        }
    };
    if args.show_help {
        CliArgs::print_help(&program);
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), CliError> {
    println!("{DRV_HEADER}");

    let image = ppm::read_ppm(&args.infile)?;
    println!("loaded {} {}", image.width, image.height);

    if args.prompt_overwrite && !confirm_overwrite(&args.outfile)? {
        return Err(CliError::Usage(format!(
            "not overwriting {}",
            args.outfile
        )));
    }

    let mut crt = Crt::new(args.outw, args.outh)?;
    let mut output = vec![0u32; args.outw * args.outh];
    let mut field = args.field;

    println!("converting to {}x{}...", args.outw, args.outh);
    for _ in 0..ACCUM_FRAMES {
        run_field(&mut crt, &image, field, args, &mut output)?;
        if !args.progressive {
            field ^= 1;
            run_field(&mut crt, &image, field, args, &mut output)?;
        }
    }

    ppm::write_ppm(&args.outfile, &output, args.outw, args.outh)?;
    println!("done");
    Ok(())
}

fn run_field(
    crt: &mut Crt,
    image: &ppm::Image,
    field: u8,
    args: &CliArgs,
    output: &mut [u32],
) -> Result<(), CliError> {
    let src = NtscSource {
        rgb: &image.pixels,
        width: image.width,
        height: image.height,
        field,
        as_color: !args.monochrome,
    };
    crt.encode(&src)?;
    crt.decode(args.noise, output)?;
    Ok(())
}

/// Ask on stdin before clobbering an existing file.
fn confirm_overwrite(path: &str) -> Result<bool, CliError> {
    if !Path::new(path).exists() {
        return Ok(true);
    }
    let stdin = io::stdin();
    loop {
        println!("\n--- file ({path}) already exists, overwrite? (y/n)");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim() {
            "y" | "Y" => return Ok(true),
            "n" | "N" => return Ok(false),
            _ => continue,
        }
    }
}
