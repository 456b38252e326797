//! Page, crop and resolution arithmetic for one frame. Every frame resolves
//! its geometry independently; nothing here assumes a global page size.

use crate::encoder::WriteOptions;
use crate::frame::{Frame, Gravity, Rect, ResolutionUnits};

/// Default device resolution in points per inch.
pub(crate) const DEFAULT_RESOLUTION: f64 = 72.0;

/// Letter-size fallback page used when gravity is set but no page geometry
/// exists at all.
const LETTER_PAGE: (u64, u64) = (612, 792);

/// Resolved placement of one frame on its page, in device points.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageLayout {
    pub media_width: u64,
    pub media_height: u64,
    pub crop: Rect,
    /// Horizontal and vertical factors of the content-stream `cm` matrix.
    pub scale: (f64, f64),
}

/// Resolve the layout for a frame: declared resolution (else the density
/// option, else 72x72), page rectangle by precedence, aspect-preserving
/// shrink of the frame into the page rect, conversion of both boxes into
/// device points, and gravity anchoring of the crop origin.
pub(crate) fn resolve(frame: &Frame, options: &WriteOptions) -> PageLayout {
    let (mut res_x, mut res_y) = frame
        .resolution
        .or(options.density)
        .unwrap_or((DEFAULT_RESOLUTION, DEFAULT_RESOLUTION));
    if frame.units == ResolutionUnits::PixelsPerCentimeter {
        res_x *= 2.54;
        res_y *= 2.54;
    }

    let page = options
        .page
        .or_else(|| frame.page.filter(|p| p.width != 0 && p.height != 0))
        .unwrap_or_else(|| {
            if frame.gravity.is_some() {
                Rect::new(0, 0, LETTER_PAGE.0, LETTER_PAGE.1)
            } else {
                Rect::new(0, 0, u64::from(frame.width()), u64::from(frame.height()))
            }
        });

    let (fit_width, fit_height) = shrink_to_fit(
        u64::from(frame.width()),
        u64::from(frame.height()),
        page.width,
        page.height,
    );

    let device_x = DEFAULT_RESOLUTION / res_x;
    let device_y = DEFAULT_RESOLUTION / res_y;
    let scale = (fit_width as f64 * device_x, fit_height as f64 * device_y);
    let media_width = (page.width as f64 * device_x + 0.5) as u64;
    let media_height = (page.height as f64 * device_y + 0.5) as u64;
    let mut crop = Rect::new(
        (page.x as f64 * device_x).round() as i64,
        (page.y as f64 * device_y).round() as i64,
        (scale.0 + 0.5) as u64,
        (scale.1 + 0.5) as u64,
    );

    if let Some(gravity) = frame.gravity {
        let (x, y) = anchor(gravity, media_width, media_height, crop.width, crop.height);
        crop.x = x;
        crop.y = y;
    }

    PageLayout {
        media_width,
        media_height,
        crop,
        scale,
    }
}

/// Aspect-preserving fit; never grows the frame.
fn shrink_to_fit(width: u64, height: u64, bound_width: u64, bound_height: u64) -> (u64, u64) {
    if width <= bound_width && height <= bound_height {
        return (width, height);
    }
    let ratio = f64::min(
        bound_width as f64 / width as f64,
        bound_height as f64 / height as f64,
    );
    (
        ((width as f64 * ratio + 0.5) as u64).max(1),
        ((height as f64 * ratio + 0.5) as u64).max(1),
    )
}

/// Anchor a crop rectangle inside the media box. PDF device space has its
/// origin at the lower left, so "north" means the top of the page.
fn anchor(gravity: Gravity, media_width: u64, media_height: u64, width: u64, height: u64) -> (i64, i64) {
    let spare_x = media_width as i64 - width as i64;
    let spare_y = media_height as i64 - height as i64;
    let x = match gravity {
        Gravity::NorthWest | Gravity::West | Gravity::SouthWest => 0,
        Gravity::North | Gravity::Center | Gravity::South => spare_x / 2,
        Gravity::NorthEast | Gravity::East | Gravity::SouthEast => spare_x,
    };
    let y = match gravity {
        Gravity::SouthWest | Gravity::South | Gravity::SouthEast => 0,
        Gravity::West | Gravity::Center | Gravity::East => spare_y / 2,
        Gravity::NorthWest | Gravity::North | Gravity::NorthEast => spare_y,
    };
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    fn frame(width: u32, height: u32) -> Frame {
        Frame::gray(width, height, vec![0; (width * height) as usize]).unwrap()
    }

    #[test]
    fn default_layout_matches_pixel_dimensions() {
        let layout = resolve(&frame(2, 2), &WriteOptions::default());
        assert_eq!((layout.media_width, layout.media_height), (2, 2));
        assert_eq!(layout.crop, Rect::new(0, 0, 2, 2));
        assert_eq!(layout.scale, (2.0, 2.0));
    }

    #[test]
    fn frame_resolution_scales_into_points() {
        let mut image = frame(144, 72);
        image.resolution = Some((144.0, 144.0));
        let layout = resolve(&image, &WriteOptions::default());
        assert_eq!((layout.media_width, layout.media_height), (72, 36));
        assert_eq!((layout.crop.width, layout.crop.height), (72, 36));
    }

    #[test]
    fn centimeter_resolutions_are_converted() {
        let mut image = frame(254, 254);
        image.resolution = Some((100.0, 100.0));
        image.units = ResolutionUnits::PixelsPerCentimeter;
        let layout = resolve(&image, &WriteOptions::default());
        assert_eq!((layout.crop.width, layout.crop.height), (72, 72));
    }

    #[test]
    fn gravity_forces_the_letter_fallback_and_anchors() {
        let mut image = frame(112, 92);
        image.gravity = Some(Gravity::Center);
        let layout = resolve(&image, &WriteOptions::default());
        assert_eq!((layout.media_width, layout.media_height), (612, 792));
        assert_eq!(layout.crop, Rect::new(250, 350, 112, 92));
    }

    #[test]
    fn oversized_frames_shrink_into_the_page_option() {
        let options = WriteOptions {
            page: Some(Rect::new(0, 0, 100, 100)),
            ..WriteOptions::default()
        };
        let layout = resolve(&frame(400, 200), &options);
        assert_eq!((layout.crop.width, layout.crop.height), (100, 50));
        assert_eq!((layout.media_width, layout.media_height), (100, 100));
    }
}
