//! Minimal encode/decode round trip over a generated test card.
//!
//! Runs a few interlaced frame pairs and prints signal statistics, no image
//! files needed.

use ntsc_crt::{Crt, NtscSource};

const SRC_W: usize = 160;
const SRC_H: usize = 120;
const OUT_W: usize = 320;
const OUT_H: usize = 240;

fn main() -> ntsc_crt::Result<()> {
    // Classic color bars.
    let image: Vec<u32> = (0..SRC_W * SRC_H)
        .map(|i| match (i % SRC_W) * 7 / SRC_W {
            0 => 0xffffff,
            1 => 0xffff00,
            2 => 0x00ffff,
            3 => 0x00ff00,
            4 => 0xff00ff,
            5 => 0xff0000,
            _ => 0x0000ff,
        })
        .collect();

    let mut crt = Crt::new(OUT_W, OUT_H)?;
    let mut frame = vec![0u32; OUT_W * OUT_H];

    for pair in 0..4 {
        for field in 0u8..2 {
            let src = NtscSource {
                rgb: &image,
                width: SRC_W,
                height: SRC_H,
                field,
                as_color: true,
            };
            crt.encode(&src)?;
            crt.decode(24, &mut frame)?;
        }
        println!(
            "pair {pair}: hsync={} vsync={} field={}",
            crt.hsync(),
            crt.vsync(),
            crt.recovered_field()
        );
    }

    let luma: Vec<i64> = frame
        .iter()
        .map(|&p| {
            (((p >> 16) & 0xff) as i64 + ((p >> 8) & 0xff) as i64 + (p & 0xff) as i64) / 3
        })
        .collect();
    let avg = luma.iter().sum::<i64>() / luma.len() as i64;
    let peak = luma.iter().max().unwrap();
    println!("decoded {OUT_W}x{OUT_H}: average luma {avg}, peak {peak}");

    Ok(())
}
