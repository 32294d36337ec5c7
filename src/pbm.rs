//! Plain ("P1") portable bitmap reading and writing
//!
//! The header holds the magic number and the bitmap size, columns first,
//! followed by one line per pixel row with values separated by spaces.
//! `1` is a wall and `0` a passage.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use itertools::Itertools;

use crate::error::{MazeError, Result};
use crate::grid::{Pixel, PixelGrid};

const MAGIC: &str = "P1";

/// Write `pixels` as a plain PBM image.
pub fn write<W: Write>(pixels: &PixelGrid, mut out: W) -> Result<()> {
    writeln!(out, "{MAGIC}")?;
    writeln!(out, "{} {}", pixels.width(), pixels.height())?;
    for row in pixels.rows() {
        writeln!(out, "{}", row.iter().format(" "))?;
    }
    out.flush()?;
    Ok(())
}

/// Create or truncate `path` and write `pixels` to it.
pub fn save(pixels: &PixelGrid, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write(pixels, BufWriter::new(file))
}

/// Parse a plain PBM image.
///
/// Accepts `#` comments and arbitrary whitespace, as well as raster digits
/// written without separators. Anything after the last pixel is ignored.
///
/// # Examples
/// ```
/// use pbm_maze::{pbm, Pixel};
///
/// let pixels = pbm::parse("P1\n# a lone cell\n3 3\n1 1 1\n1 0 1\n1 1 1\n").unwrap();
/// assert_eq!(pixels.get(1, 1), Pixel::Passage);
/// assert!(pixels.has_closed_border());
/// ```
pub fn parse(text: &str) -> Result<PixelGrid> {
    let mut reader = Reader { text, position: 0 };

    let magic = reader.token().ok_or_else(|| format_error("empty input"))?;
    if magic != MAGIC {
        return Err(format_error(format!("expected magic `{MAGIC}`, found `{magic}`")));
    }
    let width = reader.number("width")?;
    let height = reader.number("height")?;

    let len = width
        .checked_mul(height)
        .ok_or_else(|| format_error(format!("bitmap size {width}x{height} overflows")))?;
    // A declared size cannot need more pixels than there are characters left
    let mut pixels = Vec::with_capacity(len.min(text.len()));
    while pixels.len() < len {
        let pixel = match reader.digit() {
            Some('0') => Pixel::Passage,
            Some('1') => Pixel::Wall,
            Some(other) => {
                return Err(format_error(format!(
                    "unexpected `{other}` at pixel {} of {len}",
                    pixels.len()
                )))
            }
            None => {
                return Err(format_error(format!(
                    "raster ends after {} of {len} pixels",
                    pixels.len()
                )))
            }
        };
        pixels.push(pixel);
    }

    Ok(PixelGrid::from_raw(width, height, pixels))
}

fn format_error(message: impl Into<String>) -> MazeError {
    MazeError::Format(message.into())
}

/// Cursor over PBM text that skips whitespace and comments
struct Reader<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.position..]
    }

    fn skip_blank(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.position += rest.len() - trimmed.len();
            if trimmed.starts_with('#') {
                self.position += trimmed.find('\n').unwrap_or(trimmed.len());
            } else {
                break;
            }
        }
    }

    /// Next whitespace-delimited header token
    fn token(&mut self) -> Option<&'a str> {
        self.skip_blank();
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '#')
            .unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        self.position += end;
        Some(&rest[..end])
    }

    fn number(&mut self, name: &str) -> Result<usize> {
        let token = self
            .token()
            .ok_or_else(|| format_error(format!("missing {name}")))?;
        token
            .parse()
            .map_err(|_| format_error(format!("invalid {name} `{token}`")))
    }

    /// Next raster character
    fn digit(&mut self) -> Option<char> {
        self.skip_blank();
        let c = self.rest().chars().next()?;
        self.position += c.len_utf8();
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, write};
    use crate::error::MazeError;
    use crate::grid::{Grid, Pixel, PixelGrid};
    use crate::maze_generator::MazeGenerator;

    fn to_text(pixels: &PixelGrid) -> String {
        let mut out = Vec::new();
        write(pixels, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_two_by_one_maze() {
        let grid = MazeGenerator::with_seed(0).generate(2, 1).unwrap();
        assert_eq!(
            to_text(grid.pixels()),
            "P1\n5 3\n1 1 1 1 1\n1 0 0 0 1\n1 1 1 1 1\n"
        );
    }

    #[test]
    fn header_is_columns_then_rows() {
        let grid = Grid::new(3, 1).unwrap();
        let text = to_text(grid.pixels());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "7 3");
        assert_eq!(lines.len(), 2 + 3);
        assert!(lines[2..].iter().all(|row| row.split(' ').count() == 7));
    }

    #[test]
    fn zero_width_maze_has_single_column() {
        let grid = MazeGenerator::with_seed(0).generate(0, 2).unwrap();
        assert_eq!(to_text(grid.pixels()), "P1\n1 5\n1\n1\n1\n1\n1\n");
    }

    #[test]
    fn zero_sized_maze_is_one_pixel() {
        let grid = MazeGenerator::with_seed(0).generate(0, 0).unwrap();
        assert_eq!(to_text(grid.pixels()), "P1\n1 1\n1\n");
    }

    #[test]
    fn written_maze_parses_back() {
        let grid = MazeGenerator::with_seed(9).generate(6, 4).unwrap();
        let parsed = parse(&to_text(grid.pixels())).unwrap();
        assert_eq!(&parsed, grid.pixels());
        assert_eq!(parsed.cell_dimensions(), (6, 4));
    }

    #[test]
    fn parses_compact_raster_and_comments() {
        let pixels = parse("P1 # magic\n3 # width\n1\n010").unwrap();
        assert_eq!(pixels.width(), 3);
        assert_eq!(pixels.height(), 1);
        assert_eq!(pixels.get(0, 0), Pixel::Passage);
        assert_eq!(pixels.get(1, 0), Pixel::Wall);
    }

    #[test]
    fn rejects_malformed_input() {
        for text in [
            "",
            "P4\n1 1\n1\n",
            "P1\nthree 3\n",
            "P1\n2\n",
            "P1\n2 2\n1 0 1\n",
            "P1\n1 1\n2\n",
        ] {
            assert!(
                matches!(parse(text), Err(MazeError::Format(_))),
                "accepted {text:?}"
            );
        }
    }
}
