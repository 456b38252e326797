//! Compression tags and the uniform payload-encoding dispatch used for the
//! image, soft-mask and thumbnail streams.

use log::warn;

use crate::sampler::SampleFormat;
use crate::{Error, Result};

pub mod ascii85;
pub(crate) mod fax;
#[cfg(feature = "jpeg")]
pub(crate) mod jpeg;
pub(crate) mod packbits;

/// Compression tag attached to each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// No binary compression; stream bytes are ASCII85 text-armored.
    None,
    /// PackBits run-length coding, the default and universal fallback.
    #[default]
    Rle,
    Lzw,
    /// Deflate (zlib) coding, level driven by the frame quality.
    Zip,
    /// CCITT Group 3/4 bilevel coding.
    Fax,
    Jpeg,
    Jpeg2000,
}

impl Compression {
    /// Replace requests for codecs that are not built in with the run-length
    /// fallback, recording a warning. The document is still produced.
    pub(crate) fn resolve(self) -> Compression {
        match self {
            #[cfg(not(feature = "jpeg"))]
            Compression::Jpeg => {
                warn!("JPEG support is not built in; falling back to run-length compression");
                Compression::Rle
            }
            Compression::Jpeg2000 => {
                warn!("JPEG 2000 support is not built in; falling back to run-length compression");
                Compression::Rle
            }
            other => other,
        }
    }

    /// The stream filter a PDF reader must apply to undo this compression.
    pub(crate) fn filter_name(self) -> &'static str {
        match self {
            Compression::None => "ASCII85Decode",
            Compression::Rle => "RunLengthDecode",
            Compression::Lzw => "LZWDecode",
            Compression::Zip => "FlateDecode",
            Compression::Fax => "CCITTFaxDecode",
            Compression::Jpeg => "DCTDecode",
            Compression::Jpeg2000 => "JPXDecode",
        }
    }

    /// Soft-mask streams only distinguish the text, LZW and Flate codecs;
    /// everything else is coded as run-length.
    pub(crate) fn smask_resolved(self) -> Compression {
        match self {
            Compression::None | Compression::Lzw | Compression::Zip => self,
            _ => Compression::Rle,
        }
    }

    pub(crate) fn bits_per_component(self) -> i64 {
        match self {
            Compression::Fax => 1,
            _ => 8,
        }
    }
}

/// A sampled pixel buffer together with the context codecs need.
pub(crate) struct Payload<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub format: SampleFormat,
    pub quality: u8,
}

/// Encode a sampled payload with the given (already resolved) compression.
pub(crate) fn encode(compression: Compression, payload: Payload<'_>) -> Result<Vec<u8>> {
    match compression {
        Compression::None => Ok(ascii85::encode(payload.data)),
        Compression::Rle => Ok(packbits::encode(payload.data)),
        Compression::Lzw => {
            let mut encoder = weezl::encode::Encoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8);
            encoder.encode(payload.data).map_err(|err| Error::Coder {
                filter: "LZWDecode",
                reason: err.to_string(),
            })
        }
        Compression::Zip => deflate(payload.data, payload.quality),
        Compression::Fax => Ok(fax::encode(payload.data, payload.width)),
        #[cfg(feature = "jpeg")]
        Compression::Jpeg => jpeg::encode(
            payload.data,
            payload.width,
            payload.height,
            payload.format,
            payload.quality,
        ),
        #[cfg(not(feature = "jpeg"))]
        Compression::Jpeg => Err(Error::Coder {
            filter: "DCTDecode",
            reason: "JPEG support is not built in".into(),
        }),
        Compression::Jpeg2000 => Err(Error::Coder {
            filter: "JPXDecode",
            reason: "JPEG 2000 support is not built in".into(),
        }),
    }
}

fn deflate(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    let level = u32::from(quality / 10).clamp(1, 9);
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::new(level));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
