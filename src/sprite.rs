use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::rendering::Canvas;
use crate::types::{Rect, Rgb};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Apex at the top center, base along the bottom edge.
    Triangle(Rgb),
    Solid(Rgb),
}

/// What an entity looks like. Chosen once at construction.
#[derive(Clone, Debug)]
pub enum Sprite {
    Bitmap(RgbaImage),
    Procedural(Shape),
}

impl Sprite {
    /// A bitmap scaled to `width`×`height`, or `None` when there is no usable source.
    pub fn scaled(source: Option<&RgbaImage>, width: i32, height: i32) -> Option<Sprite> {
        source.and_then(|src| scale_image(src, width, height)).map(Sprite::Bitmap)
    }

    pub fn draw(&self, canvas: &mut Canvas, rect: Rect) {
        match self {
            Sprite::Bitmap(img) => canvas.blit(img, rect.x, rect.y),
            Sprite::Procedural(Shape::Solid(color)) => canvas.fill_rect(rect, *color),
            Sprite::Procedural(Shape::Triangle(color)) => canvas.fill_triangle(
                (rect.x + rect.width / 2, rect.top()),
                (rect.left(), rect.bottom()),
                (rect.right(), rect.bottom()),
                *color,
            ),
        }
    }
}

/// Smooth scaling that keeps the alpha channel. Empty sources or targets fail.
pub fn scale_image(src: &RgbaImage, width: i32, height: i32) -> Option<RgbaImage> {
    if src.width() == 0 || src.height() == 0 || width <= 0 || height <= 0 {
        return None;
    }
    Some(imageops::resize(src, width as u32, height as u32, FilterType::Triangle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn scaling_keeps_transparency() {
        let src = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 0]));
        let scaled = scale_image(&src, 30, 20).unwrap();
        assert_eq!(scaled.dimensions(), (30, 20));
        assert!(scaled.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn empty_source_cannot_scale() {
        let empty = RgbaImage::new(0, 0);
        assert!(scale_image(&empty, 10, 10).is_none());
        assert!(Sprite::scaled(Some(&empty), 10, 10).is_none());
        assert!(Sprite::scaled(None, 10, 10).is_none());
    }

    #[test]
    fn scaled_sprite_is_bitmap() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let sprite = Sprite::scaled(Some(&src), 8, 8).unwrap();
        assert!(matches!(sprite, Sprite::Bitmap(ref img) if img.dimensions() == (8, 8)));
    }

    #[test]
    fn triangle_leaves_top_corners_empty() {
        let mut canvas = Canvas::new(50, 30, Rgb(0, 0, 0));
        let blue = Rgb(50, 120, 220);
        Sprite::Procedural(Shape::Triangle(blue)).draw(&mut canvas, Rect::new(0, 0, 50, 30));
        assert_eq!(canvas.get(0, 0), Some(Rgb(0, 0, 0)));
        assert_eq!(canvas.get(49, 0), Some(Rgb(0, 0, 0)));
        assert_eq!(canvas.get(25, 15), Some(blue));
        assert_eq!(canvas.get(2, 29), Some(blue));
    }
}
