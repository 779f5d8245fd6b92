use aeroloc_core::ContourSet;
use image::{GrayImage, Luma};

/// Pixel value for contour ink. Background is 0.
pub const FOREGROUND: u8 = 255;

/// How a contour set is rendered onto the comparison canvas.
///
/// `canvas_size` must be identical for every canvas compared in one matching
/// run. `centered` moves the pattern's bounding-box center onto the canvas
/// center so that absolute position in the source image does not bias the
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub canvas_size: u32,
    pub centered: bool,
    pub thickness: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            canvas_size: 1000,
            centered: true,
            thickness: 1,
        }
    }
}

/// Render all contours of `set` onto a square binary canvas.
///
/// An empty set yields an all-background canvas. Contours with no points are
/// dropped silently. Each contour is drawn as a closed polyline; drawing is
/// idempotent and deterministic.
pub fn rasterize(set: &ContourSet, opts: &RasterOptions) -> GrayImage {
    let mut canvas = GrayImage::new(opts.canvas_size, opts.canvas_size);

    let (offset_x, offset_y) = if opts.centered {
        match set.bounding_box() {
            Some(bbox) => {
                let center = bbox.center();
                let target = opts.canvas_size as f32 / 2.0;
                (
                    (target - center.x).round() as i32,
                    (target - center.y).round() as i32,
                )
            }
            None => (0, 0),
        }
    } else {
        (0, 0)
    };

    for contour in &set.contours {
        let pts: Vec<(i32, i32)> = contour
            .points
            .iter()
            .map(|p| {
                (
                    p.x.round() as i32 + offset_x,
                    p.y.round() as i32 + offset_y,
                )
            })
            .collect();

        match pts.len() {
            0 => continue,
            1 => stamp(&mut canvas, pts[0], opts.thickness),
            n => {
                for i in 0..n {
                    // Closing segment connects the last vertex back to the first.
                    let a = pts[i];
                    let b = pts[(i + 1) % n];
                    draw_segment(&mut canvas, a, b, opts.thickness);
                }
            }
        }
    }

    canvas
}

/// Bresenham line between two canvas points; pixels outside are discarded.
fn draw_segment(canvas: &mut GrayImage, p1: (i32, i32), p2: (i32, i32), thickness: u32) {
    let (mut x0, mut y0) = p1;
    let (x1, y1) = p2;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(canvas, (x0, y0), thickness);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn stamp(canvas: &mut GrayImage, center: (i32, i32), thickness: u32) {
    if thickness <= 1 {
        put_foreground(canvas, center.0, center.1);
        return;
    }

    let radius = (thickness / 2) as i32;
    let r2 = radius * radius;
    for y in (center.1 - radius)..=(center.1 + radius) {
        for x in (center.0 - radius)..=(center.0 + radius) {
            if (x - center.0).pow(2) + (y - center.1).pow(2) <= r2 {
                put_foreground(canvas, x, y);
            }
        }
    }
}

#[inline]
fn put_foreground(canvas: &mut GrayImage, x: i32, y: i32) {
    if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
        canvas.put_pixel(x as u32, y as u32, Luma([FOREGROUND]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeroloc_core::Contour;

    fn foreground_count(img: &GrayImage) -> usize {
        img.as_raw().iter().filter(|&&v| v > 0).count()
    }

    #[test]
    fn empty_set_yields_blank_canvas() {
        let canvas = rasterize(&ContourSet::default(), &RasterOptions::default());
        assert_eq!(canvas.width(), 1000);
        assert_eq!(canvas.height(), 1000);
        assert_eq!(foreground_count(&canvas), 0);
    }

    #[test]
    fn centering_moves_pattern_to_canvas_center() {
        // A 10x10 square near the origin must land around (50, 50) on a 100px canvas.
        let set = ContourSet::new(vec![Contour::from_pairs(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ])]);
        let opts = RasterOptions {
            canvas_size: 100,
            centered: true,
            thickness: 1,
        };
        let canvas = rasterize(&set, &opts);

        assert_eq!(canvas.get_pixel(45, 45)[0], FOREGROUND);
        assert_eq!(canvas.get_pixel(55, 55)[0], FOREGROUND);
        assert_eq!(canvas.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn uncentered_draws_at_source_coordinates() {
        let set = ContourSet::new(vec![Contour::from_pairs(&[(3.0, 4.0), (8.0, 4.0)])]);
        let opts = RasterOptions {
            canvas_size: 20,
            centered: false,
            thickness: 1,
        };
        let canvas = rasterize(&set, &opts);
        assert_eq!(canvas.get_pixel(3, 4)[0], FOREGROUND);
        assert_eq!(canvas.get_pixel(8, 4)[0], FOREGROUND);
    }

    #[test]
    fn drawing_is_idempotent() {
        let square = Contour::from_pairs(&[(2.0, 2.0), (12.0, 2.0), (12.0, 12.0), (2.0, 12.0)]);
        let once = ContourSet::new(vec![square.clone()]);
        let twice = ContourSet::new(vec![square.clone(), square]);
        let opts = RasterOptions {
            canvas_size: 32,
            centered: false,
            thickness: 1,
        };
        assert_eq!(rasterize(&once, &opts), rasterize(&twice, &opts));
    }

    #[test]
    fn zero_point_contours_are_dropped() {
        let set = ContourSet::new(vec![Contour::default()]);
        let canvas = rasterize(&set, &RasterOptions::default());
        assert_eq!(foreground_count(&canvas), 0);
    }

    #[test]
    fn thickness_widens_the_stroke() {
        let set = ContourSet::new(vec![Contour::from_pairs(&[(5.0, 10.0), (15.0, 10.0)])]);
        let thin = rasterize(
            &set,
            &RasterOptions {
                canvas_size: 24,
                centered: false,
                thickness: 1,
            },
        );
        let thick = rasterize(
            &set,
            &RasterOptions {
                canvas_size: 24,
                centered: false,
                thickness: 3,
            },
        );
        assert!(foreground_count(&thick) > foreground_count(&thin));
    }

    #[test]
    fn off_canvas_points_are_discarded() {
        let set = ContourSet::new(vec![Contour::from_pairs(&[(-50.0, -50.0), (-10.0, -10.0)])]);
        let opts = RasterOptions {
            canvas_size: 20,
            centered: false,
            thickness: 1,
        };
        let canvas = rasterize(&set, &opts);
        assert_eq!(foreground_count(&canvas), 0);
    }
}
