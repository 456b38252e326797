//! Triangle-filter downscaling for thumbnail images.

use crate::frame::{Frame, Samples};

/// Thumbnails fit inside this square, preserving aspect and never upscaling.
pub(crate) const THUMBNAIL_BOUND: u32 = 106;

/// Produce the thumbnail copy of a frame. Indexed frames come back indexed,
/// requantized to the parent colormap, so the shared colorspace object stays
/// valid; other frames keep their sample layout. Alpha and labels are not
/// carried over.
pub(crate) fn thumbnail(frame: &Frame) -> Frame {
    let (width, height) = (frame.width(), frame.height());
    let scale = f64::min(
        1.0,
        f64::min(
            f64::from(THUMBNAIL_BOUND) / f64::from(width),
            f64::from(THUMBNAIL_BOUND) / f64::from(height),
        ),
    );
    let target_width = ((f64::from(width) * scale).round() as u32).max(1);
    let target_height = ((f64::from(height) * scale).round() as u32).max(1);
    if target_width == width && target_height == height {
        return frame.with_samples(width, height, frame.samples().clone());
    }

    let samples = match frame.samples() {
        Samples::Gray(data) => Samples::Gray(resize(data, width, height, target_width, target_height, 1)),
        Samples::Rgb(data) => Samples::Rgb(resize(data, width, height, target_width, target_height, 3)),
        Samples::Cmyk(data) => Samples::Cmyk(resize(data, width, height, target_width, target_height, 4)),
        Samples::Indexed(indices) => {
            let colormap = frame.colormap().unwrap_or_default();
            let rgb: Vec<u8> = indices.iter().flat_map(|&index| colormap[index as usize]).collect();
            let resized = resize(&rgb, width, height, target_width, target_height, 3);
            let indices = resized
                .chunks_exact(3)
                .map(|px| nearest_entry(colormap, [px[0], px[1], px[2]]))
                .collect();
            Samples::Indexed(indices)
        }
    };
    frame.with_samples(target_width, target_height, samples)
}

fn nearest_entry(colormap: &[[u8; 3]], pixel: [u8; 3]) -> u8 {
    let mut best = 0usize;
    let mut best_distance = u32::MAX;
    for (index, entry) in colormap.iter().enumerate() {
        let distance: u32 = entry
            .iter()
            .zip(pixel.iter())
            .map(|(&a, &b)| {
                let d = i32::from(a) - i32::from(b);
                (d * d) as u32
            })
            .sum();
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best as u8
}

fn resize(src: &[u8], sw: u32, sh: u32, dw: u32, dh: u32, channels: usize) -> Vec<u8> {
    // Two separable passes; the intermediate buffer is dw wide and sh tall.
    let mut horizontal = vec![0u8; dw as usize * sh as usize * channels];
    let weights = TriangleKernel::new(sw, dw);
    for row in 0..sh as usize {
        for x in 0..dw as usize {
            for channel in 0..channels {
                let value = weights.apply(x, |source| {
                    f64::from(src[(row * sw as usize + source) * channels + channel])
                });
                horizontal[(row * dw as usize + x) * channels + channel] = value;
            }
        }
    }

    let mut output = vec![0u8; dw as usize * dh as usize * channels];
    let weights = TriangleKernel::new(sh, dh);
    for y in 0..dh as usize {
        for x in 0..dw as usize {
            for channel in 0..channels {
                let value = weights.apply(y, |source| {
                    f64::from(horizontal[(source * dw as usize + x) * channels + channel])
                });
                output[(y * dw as usize + x) * channels + channel] = value;
            }
        }
    }
    output
}

/// Triangle kernel widened by the downscale factor of one axis.
struct TriangleKernel {
    source_len: usize,
    filter_scale: f64,
    support: f64,
}

impl TriangleKernel {
    fn new(source_len: u32, target_len: u32) -> TriangleKernel {
        let filter_scale = (f64::from(source_len) / f64::from(target_len)).max(1.0);
        TriangleKernel {
            source_len: source_len as usize,
            filter_scale,
            support: filter_scale,
        }
    }

    fn apply<F: Fn(usize) -> f64>(&self, target: usize, fetch: F) -> u8 {
        let center = (target as f64 + 0.5) * self.filter_scale;
        let start = (center - self.support).floor().max(0.0) as usize;
        let end = ((center + self.support).ceil() as usize).min(self.source_len);
        let mut total = 0.0;
        let mut weight_sum = 0.0;
        for source in start..end {
            let weight = (1.0 - ((source as f64 + 0.5 - center) / self.filter_scale).abs()).max(0.0);
            if weight > 0.0 {
                total += weight * fetch(source);
                weight_sum += weight;
            }
        }
        if weight_sum > 0.0 {
            (total / weight_sum).round() as u8
        } else {
            0
        }
    }
}
