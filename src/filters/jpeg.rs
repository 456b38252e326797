//! JPEG (DCTDecode) payloads, produced through the `image` crate's baseline
//! encoder.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::sampler::SampleFormat;
use crate::{Error, Result};

pub(crate) fn encode(data: &[u8], width: u32, height: u32, format: SampleFormat, quality: u8) -> Result<Vec<u8>> {
    let color = match format {
        SampleFormat::Gray => ExtendedColorType::L8,
        SampleFormat::Rgb => ExtendedColorType::Rgb8,
        SampleFormat::Cmyk => {
            return Err(Error::Coder {
                filter: "DCTDecode",
                reason: "the built-in JPEG encoder does not support CMYK samples".into(),
            });
        }
        SampleFormat::Index => {
            return Err(Error::Coder {
                filter: "DCTDecode",
                reason: "indexed samples cannot be JPEG-compressed".into(),
            });
        }
    };
    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100))
        .write_image(data, width, height, color)
        .map_err(|err| Error::Coder {
            filter: "DCTDecode",
            reason: err.to_string(),
        })?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_payload_is_a_jpeg_bitstream() {
        let data = encode(&[0, 64, 128, 255], 2, 2, SampleFormat::Gray, 75).unwrap();
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
        assert_eq!(&data[data.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn cmyk_is_rejected() {
        let result = encode(&[0; 4], 1, 1, SampleFormat::Cmyk, 75);
        assert!(matches!(result, Err(Error::Coder { .. })));
    }
}
