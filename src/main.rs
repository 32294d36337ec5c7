//! CLI for maze generation

use std::convert::Infallible;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use pbm_maze::{pbm, GlibcSequence, Grid, MazeGenerator, RandomSequence, SeededSequence};

/// Generate a perfect maze and save it as a plain PBM bitmap
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze width in cells, up to 16384
    #[arg(value_parser = parse_dimension, allow_hyphen_values = true)]
    width: i64,

    /// Maze height in cells, up to 16384
    #[arg(value_parser = parse_dimension, allow_hyphen_values = true)]
    height: i64,

    /// Path to the output `.pbm` file, created or truncated
    output: PathBuf,

    /// Random seed
    #[arg(long, default_value_t = pbm_maze::DEFAULT_SEED)]
    seed: u64,

    /// Random sequence used to pick the next cell
    #[arg(long, value_enum, default_value_t = Sequence::Std)]
    rng: Sequence,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Sequence {
    /// Seeded generator of the `rand` crate
    Std,
    /// Same sequence as glibc `srand`/`rand`; the seed is truncated to 32 bits
    Glibc,
}

/// Read an integer the way C `strtol` does.
///
/// Leading whitespace and a sign are accepted, digits are consumed as far as
/// they go and anything after them is ignored. Without digits the value is
/// zero; values out of range saturate.
fn parse_dimension(text: &str) -> Result<i64, Infallible> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });

    Ok(if negative {
        -magnitude
    } else {
        magnitude
    })
}

fn generate<R: RandomSequence>(random: R, args: &Args) -> pbm_maze::error::Result<Grid> {
    MazeGenerator::new(random).generate(args.width, args.height)
}

/// Generate the maze, then write it out
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::try_parse().unwrap_or_else(|err| {
        if err.use_stderr() {
            let _ = err.print();
            process::exit(1);
        }
        err.exit()
    });

    info!(
        "Generating a {}x{} maze with the {:?} sequence, seed {}",
        args.width, args.height, args.rng, args.seed
    );
    let grid = match args.rng {
        Sequence::Std => generate(SeededSequence::new(args.seed), &args),
        Sequence::Glibc => generate(GlibcSequence::new(args.seed as u32), &args),
    }?;
    let pixels = grid.into_pixels();
    debug!("Opened {} walls", pixels.opened_walls());

    pbm::save(&pixels, &args.output).with_context(|| {
        format!(
            "Failed to write the maze to the output `.pbm` file {}",
            args.output.display()
        )
    })?;
    info!("Wrote {}", args.output.display());
    Ok(())
}
