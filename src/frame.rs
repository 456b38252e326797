use crate::filters::Compression;
use crate::{Error, Result};

/// Per-pixel sample storage for a frame, row-major, top-to-bottom.
#[derive(Debug, Clone)]
pub enum Samples {
    /// One intensity byte per pixel.
    Gray(Vec<u8>),
    /// Three bytes (R, G, B) per pixel.
    Rgb(Vec<u8>),
    /// Four bytes (C, M, Y, K) per pixel.
    Cmyk(Vec<u8>),
    /// One colormap index per pixel; the frame carries the colormap.
    Indexed(Vec<u8>),
}

/// Placement anchor used when a frame is positioned on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

/// Unit of a frame's declared resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionUnits {
    #[default]
    PixelsPerInch,
    PixelsPerCentimeter,
}

/// An axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u64,
    pub height: u64,
}

impl Rect {
    pub fn new(x: i64, y: i64, width: u64, height: u64) -> Rect {
        Rect { x, y, width, height }
    }
}

/// One raster image in the input sequence. Sample buffers are validated at
/// construction so the writer can iterate rows infallibly.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    samples: Samples,
    colormap: Option<Vec<[u8; 3]>>,
    alpha: Option<Vec<u8>>,

    /// Declared compression for this frame's image streams. Requests for
    /// codecs that are not built in are downgraded to run-length at write
    /// time, with a warning.
    pub compression: Compression,
    /// Compression quality, 0-100. Drives the Flate level and JPEG quality.
    pub quality: u8,
    /// Declared resolution in `units` per axis; 72x72 is assumed when absent.
    pub resolution: Option<(f64, f64)>,
    pub units: ResolutionUnits,
    /// Stored page box, if the frame carries one.
    pub page: Option<Rect>,
    pub gravity: Option<Gravity>,
    /// Label lines drawn above the image in the page content stream.
    pub labels: Vec<String>,
}

impl Frame {
    fn new(width: u32, height: u32, samples: Samples, colormap: Option<Vec<[u8; 3]>>) -> Result<Frame> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidFrame(format!("zero dimension {}x{}", width, height)));
        }
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .filter(|&n| n <= usize::MAX as u64 / 4)
            .ok_or(Error::ResourceLimit("pixel count overflows the sample buffer"))? as usize;
        let (len, expected) = match &samples {
            Samples::Gray(data) => (data.len(), pixels),
            Samples::Rgb(data) => (data.len(), pixels * 3),
            Samples::Cmyk(data) => (data.len(), pixels * 4),
            Samples::Indexed(data) => (data.len(), pixels),
        };
        if len != expected {
            return Err(Error::InvalidFrame(format!(
                "sample buffer holds {} bytes, expected {}",
                len, expected
            )));
        }
        if let Samples::Indexed(indices) = &samples {
            let colors = colormap.as_ref().map_or(0, Vec::len);
            if colors == 0 {
                return Err(Error::InvalidFrame("indexed frame without a colormap".into()));
            }
            if colors <= 256 {
                if let Some(&index) = indices.iter().find(|&&index| index as usize >= colors) {
                    return Err(Error::InvalidFrame(format!(
                        "index {} out of range for a {}-color colormap",
                        index, colors
                    )));
                }
            }
        }
        Ok(Frame {
            width,
            height,
            samples,
            colormap,
            alpha: None,
            compression: Compression::Rle,
            quality: 75,
            resolution: None,
            units: ResolutionUnits::default(),
            page: None,
            gravity: None,
            labels: Vec::new(),
        })
    }

    pub fn gray(width: u32, height: u32, samples: Vec<u8>) -> Result<Frame> {
        Frame::new(width, height, Samples::Gray(samples), None)
    }

    pub fn rgb(width: u32, height: u32, samples: Vec<u8>) -> Result<Frame> {
        Frame::new(width, height, Samples::Rgb(samples), None)
    }

    pub fn cmyk(width: u32, height: u32, samples: Vec<u8>) -> Result<Frame> {
        Frame::new(width, height, Samples::Cmyk(samples), None)
    }

    pub fn indexed(width: u32, height: u32, indices: Vec<u8>, colormap: Vec<[u8; 3]>) -> Result<Frame> {
        Frame::new(width, height, Samples::Indexed(indices), Some(colormap))
    }

    /// Attach a coverage plane, one byte per pixel; 255 is fully opaque.
    pub fn with_alpha(mut self, alpha: Vec<u8>) -> Result<Frame> {
        let pixels = self.width as usize * self.height as usize;
        if alpha.len() != pixels {
            return Err(Error::InvalidFrame(format!(
                "alpha plane holds {} bytes, expected {}",
                alpha.len(),
                pixels
            )));
        }
        self.alpha = Some(alpha);
        Ok(self)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn colormap(&self) -> Option<&[[u8; 3]]> {
        self.colormap.as_deref()
    }

    pub fn alpha(&self) -> Option<&[u8]> {
        self.alpha.as_deref()
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    /// Whether the frame stores indexed (palette) samples.
    pub fn is_indexed(&self) -> bool {
        matches!(self.samples, Samples::Indexed(_))
    }

    /// Number of distinct colors the frame can address. Zero for direct-class
    /// frames, which do not have a colormap.
    pub fn color_count(&self) -> usize {
        if self.is_indexed() {
            self.colormap.as_ref().map_or(0, Vec::len)
        } else {
            0
        }
    }

    /// True when every pixel of the frame is achromatic. CMYK frames are
    /// never treated as gray.
    pub fn is_gray(&self) -> bool {
        match &self.samples {
            Samples::Gray(_) => true,
            Samples::Cmyk(_) => false,
            Samples::Rgb(data) => data.chunks_exact(3).all(|px| px[0] == px[1] && px[1] == px[2]),
            Samples::Indexed(indices) => {
                let colormap = self.colormap.as_deref().unwrap_or_default();
                indices.iter().all(|&index| {
                    colormap
                        .get(index as usize)
                        .is_some_and(|entry| entry[0] == entry[1] && entry[1] == entry[2])
                })
            }
        }
    }

    pub(crate) fn with_samples(&self, width: u32, height: u32, samples: Samples) -> Frame {
        Frame {
            width,
            height,
            samples,
            colormap: self.colormap.clone(),
            alpha: None,
            compression: self.compression,
            quality: self.quality,
            resolution: self.resolution,
            units: self.units,
            page: self.page,
            gravity: self.gravity,
            labels: Vec::new(),
        }
    }
}
