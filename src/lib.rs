mod document;
mod encoder;
mod error;
mod filters;
mod frame;
mod geometry;
mod object;
mod resample;
mod sampler;
mod writer;
mod xref;

pub use document::Document;
pub use encoder::{WriteOptions, build_pdf, write_pdf};
pub use error::{Error, Result};
pub use filters::Compression;
pub use filters::ascii85::Ascii85Encoder;
pub use frame::{Frame, Gravity, Rect, ResolutionUnits, Samples};
pub use object::{Dictionary, Object, ObjectId, Stream, StringFormat};
