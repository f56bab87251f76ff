//! Draw the fWHR box onto the measured image.

use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};

use crate::error::Result;
use crate::fwhr::FwhrBox;

pub const BOX_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Line thickness for an image of the given height: 1px per 100 rows,
/// rounded up.
pub fn line_width(image_height: u32) -> u32 {
    image_height.div_ceil(100).max(1)
}

/// Returns an RGB copy of `image` with the four edges of `fwhr_box` drawn.
pub fn draw_box(image: &DynamicImage, fwhr_box: &FwhrBox) -> RgbImage {
    let mut rgb = image.to_rgb8();
    let thickness = line_width(rgb.height()) as i32;

    let (width, height) = rgb.dimensions();
    let x0 = to_pixel(fwhr_box.top_left.x, width, thickness);
    let x1 = to_pixel(fwhr_box.top_right.x, width, thickness);
    let y0 = to_pixel(fwhr_box.top_left.y, height, thickness);
    let y1 = to_pixel(fwhr_box.bottom_left.y, height, thickness);

    draw_hline(&mut rgb, x0, x1, y0, thickness, BOX_COLOR);
    draw_hline(&mut rgb, x0, x1, y1, thickness, BOX_COLOR);
    draw_vline(&mut rgb, x0, y0, y1, thickness, BOX_COLOR);
    draw_vline(&mut rgb, x1, y0, y1, thickness, BOX_COLOR);

    rgb
}

/// Open `input`, draw the box and write the result to `output`. The format
/// follows the output extension.
pub fn save_annotated(input: &Path, output: &Path, fwhr_box: &FwhrBox) -> Result<()> {
    let image = image::open(input)?;
    draw_box(&image, fwhr_box).save(output)?;
    tracing::info!(output = %output.display(), "annotated image written");
    Ok(())
}

/// Round a box coordinate to a pixel, clamped to one line width beyond the
/// image so the drawing arithmetic stays small. NaN maps to 0.
fn to_pixel(v: f32, extent: u32, thickness: i32) -> i32 {
    let limit = extent as f32 + thickness as f32;
    v.round().clamp(-(thickness as f32), limit) as i32
}

// Thick lines are centered on the nominal coordinate.

fn draw_hline(img: &mut RgbImage, x0: i32, x1: i32, y: i32, thickness: i32, color: Rgb<u8>) {
    let (lo, hi) = (x0.min(x1), x0.max(x1));
    let start = y - thickness / 2;
    fill_rect(img, lo - thickness / 2, start, hi - lo + thickness, thickness, color);
}

fn draw_vline(img: &mut RgbImage, x: i32, y0: i32, y1: i32, thickness: i32, color: Rgb<u8>) {
    let (lo, hi) = (y0.min(y1), y0.max(y1));
    let start = x - thickness / 2;
    fill_rect(img, start, lo - thickness / 2, thickness, hi - lo + thickness, color);
}

fn fill_rect(img: &mut RgbImage, x: i32, y: i32, w: i32, h: i32, color: Rgb<u8>) {
    let (img_w, img_h) = img.dimensions();

    for py in y.max(0)..(y + h).min(img_h as i32) {
        for px in x.max(0)..(x + w).min(img_w as i32) {
            img.put_pixel(px as u32, py as u32, color);
        }
    }
}
