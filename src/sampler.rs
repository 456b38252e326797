//! Conversion of native frame storage into the flat byte buffers the
//! compression codecs expect. Rows are emitted top-to-bottom, left-to-right.

use crate::frame::{Frame, Samples};

/// Target semantic for a sampled payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SampleFormat {
    /// One luma-weighted intensity byte per pixel.
    Gray,
    /// Three bytes (R, G, B) per pixel.
    Rgb,
    /// Four bytes (C, M, Y, K) per pixel.
    Cmyk,
    /// One colormap index per pixel, unmodified.
    Index,
}

/// Rec. 601 luma, the perceptual intensity weighting the original pipeline
/// applies when collapsing color to gray.
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000) as u8
}

fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let apply = |channel: u8| ((255 - u32::from(channel)) * (255 - u32::from(k)) / 255) as u8;
    [apply(c), apply(m), apply(y)]
}

/// Flatten the frame's pixels into the requested target format.
pub(crate) fn sample(frame: &Frame, format: SampleFormat) -> Vec<u8> {
    let colormap = frame.colormap().unwrap_or_default();
    match (format, frame.samples()) {
        (SampleFormat::Gray, Samples::Gray(data)) => data.clone(),
        (SampleFormat::Gray, Samples::Rgb(data)) => {
            data.chunks_exact(3).map(|px| luma(px[0], px[1], px[2])).collect()
        }
        (SampleFormat::Gray, Samples::Cmyk(data)) => data
            .chunks_exact(4)
            .map(|px| {
                let [r, g, b] = cmyk_to_rgb(px[0], px[1], px[2], px[3]);
                luma(r, g, b)
            })
            .collect(),
        (SampleFormat::Gray, Samples::Indexed(indices)) => indices
            .iter()
            .map(|&index| {
                let [r, g, b] = colormap[index as usize];
                luma(r, g, b)
            })
            .collect(),
        (SampleFormat::Rgb, Samples::Rgb(data)) => data.clone(),
        (SampleFormat::Rgb, Samples::Gray(data)) => data.iter().flat_map(|&v| [v, v, v]).collect(),
        (SampleFormat::Rgb, Samples::Cmyk(data)) => data
            .chunks_exact(4)
            .flat_map(|px| cmyk_to_rgb(px[0], px[1], px[2], px[3]))
            .collect(),
        (SampleFormat::Rgb, Samples::Indexed(indices)) => indices
            .iter()
            .flat_map(|&index| colormap[index as usize])
            .collect(),
        (SampleFormat::Cmyk, Samples::Cmyk(data)) => data.clone(),
        (SampleFormat::Cmyk, _) => {
            unreachable!("CMYK sampling is only selected for CMYK frames")
        }
        (SampleFormat::Index, Samples::Indexed(indices)) => indices.clone(),
        (SampleFormat::Index, _) => {
            unreachable!("index sampling is only selected for indexed frames")
        }
    }
}

/// One byte per pixel for the soft mask: full coverage maps to maximum
/// brightness.
pub(crate) fn alpha_as_gray(frame: &Frame) -> Vec<u8> {
    frame.alpha().map(<[u8]>::to_vec).unwrap_or_default()
}
