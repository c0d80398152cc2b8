// ============================================================================
// CONTOURS — external boundary tracing and outline drawing
// ============================================================================

use image::{GrayImage, Rgb, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::drawing::BresenhamLineIter;

/// Outline colour used by the contour overlay.
pub const CONTOUR_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline width in pixels.
pub const CONTOUR_THICKNESS: u32 = 2;

/// Ordered boundary points of one connected region.
pub type Outline = Vec<(i32, i32)>;

/// Trace the outermost borders of every foreground region in a binary map.
/// Hole borders and borders nested inside another region are skipped.
pub fn external_contours(binary: &GrayImage) -> Vec<Outline> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points.into_iter().map(|p| (p.x, p.y)).collect())
        .collect()
}

/// Draw each outline as a closed polyline of the given width.
pub fn draw_outlines_mut(canvas: &mut RgbImage, outlines: &[Outline], color: Rgb<u8>, thickness: u32) {
    for outline in outlines {
        let Some(&first) = outline.first() else { continue };
        if outline.len() == 1 {
            stamp(canvas, first, color, thickness);
            continue;
        }
        for pair in outline.windows(2) {
            draw_thick_segment(canvas, pair[0], pair[1], color, thickness);
        }
        if let Some(&last) = outline.last() {
            draw_thick_segment(canvas, last, first, color, thickness);
        }
    }
}

fn draw_thick_segment(canvas: &mut RgbImage, a: (i32, i32), b: (i32, i32), color: Rgb<u8>, thickness: u32) {
    stamp(canvas, a, color, thickness);
    stamp(canvas, b, color, thickness);
    let line = BresenhamLineIter::new((a.0 as f32, a.1 as f32), (b.0 as f32, b.1 as f32));
    for p in line {
        stamp(canvas, p, color, thickness);
    }
}

/// Fill a `thickness`-wide square brush around `center`, clipped to the canvas.
fn stamp(canvas: &mut RgbImage, center: (i32, i32), color: Rgb<u8>, thickness: u32) {
    let t = thickness.max(1) as i32;
    let lo = -(t / 2);
    let hi = lo + t;
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    for dy in lo..hi {
        for dx in lo..hi {
            let x = center.0 + dx;
            let y = center.1 + dy;
            if x >= 0 && y >= 0 && x < w && y < h {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
