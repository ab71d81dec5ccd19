//! Rasterizes a [`PatternGrid`] onto a pixel canvas.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::color::Color;
use crate::error::RenderError;
use crate::pattern::{GRID_SIZE, PatternGrid};

/// In-memory truecolor pixel buffer, prior to encoding.
pub type Canvas = RgbImage;

const CHANNELS: usize = 3;

/// A rectangle defined in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectPx {
    /// X offset from the left edge of the canvas
    pub x: u32,
    /// Y offset from the top edge of the canvas
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RectPx {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Builds a rectangle from inclusive corner coordinates.
    ///
    /// Degenerate corners (`x1 < x0` or `y1 < y0`) give an empty rectangle.
    pub fn from_corners(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: (x1 + 1).saturating_sub(x0),
            height: (y1 + 1).saturating_sub(y0),
        }
    }

    /// Exclusive right edge (x + width).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge (y + height).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel rectangle covered by grid cell `(x, y)` on a `size`-pixel canvas.
///
/// The block edge is `size / 5` without rounding; corners are floored, and
/// the far corner is pulled in by one pixel before being treated as
/// inclusive.
pub fn cell_rect(x: usize, y: usize, size: u32) -> RectPx {
    let block = f64::from(size) / GRID_SIZE as f64;
    let edge = |i: usize| (i as f64 * block).floor() as u32;

    RectPx::from_corners(
        edge(x),
        edge(y),
        edge(x + 1).saturating_sub(1),
        edge(y + 1).saturating_sub(1),
    )
}

/// Allocates a `size × size` canvas filled with `background`.
///
/// Allocation failure is reported instead of aborting the process.
pub fn blank_canvas(size: u32, background: Color) -> Result<Canvas, RenderError> {
    let alloc_err = || RenderError::CanvasAllocation {
        width: size,
        height: size,
    };

    let len = (size as usize)
        .checked_mul(size as usize)
        .and_then(|px| px.checked_mul(CHANNELS))
        .ok_or_else(alloc_err)?;

    let mut raw: Vec<u8> = Vec::new();
    raw.try_reserve_exact(len).map_err(|_| alloc_err())?;
    let Rgb(pixel) = Rgb::<u8>::from(background);
    for _ in 0..(len / CHANNELS) {
        raw.extend_from_slice(&pixel);
    }

    ImageBuffer::from_raw(size, size, raw).ok_or_else(alloc_err)
}

/// Fills `rect` with `color`, clipped to the canvas.
pub fn fill_rect(canvas: &mut Canvas, rect: RectPx, color: Color) {
    let pixel = Rgb::<u8>::from(color);
    for py in rect.y..rect.bottom().min(canvas.height()) {
        for px in rect.x..rect.right().min(canvas.width()) {
            canvas.put_pixel(px, py, pixel);
        }
    }
}

/// Draws `grid` onto a fresh `size × size` canvas.
pub fn render(
    grid: &PatternGrid,
    size: u32,
    background: Color,
    foreground: Color,
) -> Result<Canvas, RenderError> {
    let mut canvas = blank_canvas(size, background)?;
    for (x, y) in grid.filled_cells() {
        fill_rect(&mut canvas, cell_rect(x, y, size), foreground);
    }
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::Digest;

    const FG: Color = Color::new(186, 78, 129);

    fn sample_grid() -> PatternGrid {
        PatternGrid::from_digest(&Digest::of("test@example.com"))
    }

    #[test]
    fn rect_px_from_corners() {
        let rect = RectPx::from_corners(10, 20, 59, 69);
        assert_eq!(rect, RectPx::new(10, 20, 50, 50));
        assert_eq!(rect.right(), 60);
        assert_eq!(rect.bottom(), 70);
        assert!(RectPx::from_corners(5, 5, 3, 9).is_empty());
    }

    #[test]
    fn cells_on_even_sizes() {
        assert_eq!(cell_rect(0, 0, 250), RectPx::new(0, 0, 50, 50));
        assert_eq!(cell_rect(4, 4, 250), RectPx::new(200, 200, 50, 50));
        assert_eq!(cell_rect(1, 3, 50), RectPx::new(10, 30, 10, 10));
    }

    #[test]
    fn cells_on_fractional_sizes() {
        // block = 24.6
        assert_eq!(cell_rect(0, 0, 123), RectPx::new(0, 0, 24, 24));
        assert_eq!(cell_rect(1, 0, 123), RectPx::new(24, 0, 25, 24));
        assert_eq!(cell_rect(2, 0, 123), RectPx::new(49, 0, 24, 24));
        assert_eq!(cell_rect(4, 4, 123), RectPx::new(98, 98, 25, 25));
    }

    #[test]
    fn cells_tile_the_canvas() {
        for size in [50, 51, 123, 250, 499, 500] {
            let mut covered = vec![0u8; (size * size) as usize];
            for y in 0..GRID_SIZE {
                for x in 0..GRID_SIZE {
                    let rect = cell_rect(x, y, size);
                    for py in rect.y..rect.bottom() {
                        for px in rect.x..rect.right() {
                            covered[(py * size + px) as usize] += 1;
                        }
                    }
                }
            }
            assert!(covered.iter().all(|c| *c == 1), "size {size}");
        }
    }

    #[test]
    fn blank_canvas_is_background() {
        let canvas = blank_canvas(60, Color::new(1, 2, 3)).unwrap();
        assert_eq!(canvas.dimensions(), (60, 60));
        assert!(canvas.pixels().all(|p| p.0 == [1, 2, 3]));
    }

    #[test]
    fn render_paints_filled_cells() {
        let canvas = render(&sample_grid(), 250, Color::WHITE, FG).unwrap();

        // Row 0 is fully filled.
        assert_eq!(canvas.get_pixel(0, 0).0, [186, 78, 129]);
        assert_eq!(canvas.get_pixel(249, 49).0, [186, 78, 129]);
        // Row 1 center is empty.
        assert_eq!(canvas.get_pixel(125, 75).0, [255, 255, 255]);
        assert_eq!(canvas.get_pixel(99, 75).0, [186, 78, 129]);
        assert_eq!(canvas.get_pixel(100, 75).0, [255, 255, 255]);
        assert_eq!(canvas.get_pixel(150, 75).0, [186, 78, 129]);
        // Row 3 is empty.
        assert!((0..250).all(|x| canvas.get_pixel(x, 175).0 == [255, 255, 255]));
        // Last pixel belongs to cell (4, 4), which is filled.
        assert_eq!(canvas.get_pixel(249, 249).0, [186, 78, 129]);
    }

    #[test]
    fn rendered_canvas_is_mirror_symmetric() {
        for seed in ["a", "b", "c", "alice@example.com"] {
            let grid = PatternGrid::from_digest(&Digest::of(seed));
            let canvas = render(&grid, 250, Color::BLACK, Color::WHITE).unwrap();
            for y in (0..250).step_by(7) {
                for x in 0..125 {
                    assert_eq!(canvas.get_pixel(x, y), canvas.get_pixel(249 - x, y));
                }
            }
        }
    }

    #[test]
    fn foreground_pixel_count_matches_cells() {
        let grid = sample_grid();
        let canvas = render(&grid, 250, Color::WHITE, FG).unwrap();
        let painted = canvas.pixels().filter(|p| p.0 == [186, 78, 129]).count();
        assert_eq!(painted, grid.filled_count() * 50 * 50);
    }
}
