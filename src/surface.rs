use std::io::Cursor;

use tiny_skia::Pixmap;

use crate::document::CanvasSize;
use crate::error::RenderError;

/// A device-resolution pixel buffer for one canvas.
///
/// Pixels are stored premultiplied, as tiny-skia composites them. Exports
/// convert to straight alpha where the consumer expects it.
#[derive(Debug, Clone)]
pub struct Surface {
    pixmap: Pixmap,
    pixels_per_point: f32,
    canvas_size: CanvasSize,
}

impl Surface {
    /// Allocate a surface for `canvas_size` logical pixels at `pixels_per_point`.
    pub fn new(canvas_size: CanvasSize, pixels_per_point: f32) -> Result<Self, RenderError> {
        let width = device_extent(canvas_size.width, pixels_per_point);
        let height = device_extent(canvas_size.height, pixels_per_point);
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceUnavailable { width, height })?;
        log::debug!("Allocated {width}x{height} drawing surface");

        Ok(Self {
            pixmap,
            pixels_per_point,
            canvas_size,
        })
    }

    /// Whether this surface can be reused for the given canvas and scale.
    pub fn matches(&self, canvas_size: CanvasSize, pixels_per_point: f32) -> bool {
        self.canvas_size == canvas_size && self.pixels_per_point == pixels_per_point
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas_size
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Straight-alpha RGBA of a device pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Number of pixels with any coverage.
    pub fn painted_pixels(&self) -> usize {
        self.pixmap
            .pixels()
            .iter()
            .filter(|pixel| pixel.alpha() > 0)
            .count()
    }

    /// Copy into an egui image for uploading as a texture.
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_premultiplied(
            [self.width() as usize, self.height() as usize],
            self.pixmap.data(),
        )
    }

    pub fn to_rgba_image(&self) -> Result<image::RgbaImage, RenderError> {
        let data = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect();
        image::RgbaImage::from_raw(self.width(), self.height(), data).ok_or(
            RenderError::SurfaceUnavailable {
                width: self.width(),
                height: self.height(),
            },
        )
    }

    /// Encode the surface as a straight-alpha PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let image = self.to_rgba_image()?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}

fn device_extent(logical: f32, pixels_per_point: f32) -> u32 {
    let extent = (logical * pixels_per_point).ceil();
    if extent.is_finite() && extent > 0.0 && extent <= u32::MAX as f32 {
        extent as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_is_at_device_resolution() {
        let surface = Surface::new(CanvasSize::new(400.0, 240.0), 2.0).unwrap();
        assert_eq!((surface.width(), surface.height()), (800, 480));
        assert_eq!(surface.painted_pixels(), 0);
    }

    #[test]
    fn test_zero_sized_surface_is_an_error() {
        let result = Surface::new(CanvasSize::new(0.0, 240.0), 1.0);
        assert!(matches!(
            result,
            Err(RenderError::SurfaceUnavailable { width: 0, .. })
        ));
        assert!(Surface::new(CanvasSize::new(400.0, 240.0), f32::NAN).is_err());
    }

    #[test]
    fn test_png_export_decodes() {
        let surface = Surface::new(CanvasSize::new(40.0, 20.0), 1.5).unwrap();
        let png = surface.encode_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (60, 30));
    }
}
