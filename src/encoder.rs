//! The PDF object writer: walks a list of raster frames and assembles the
//! document object graph, one fixed-order object cluster per frame, followed
//! by the cross-reference table and trailer.
//!
//! Every object of a cluster is allocated a real object id before any body
//! is built, so cross-references inside a cluster and the Pages `/Kids`
//! array always name the ids that are actually emitted; there is no
//! arithmetic offset prediction.

use std::io::Write;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use time::OffsetDateTime;

use crate::filters::{self, Compression, Payload, fax};
use crate::frame::{Frame, Rect, Samples};
use crate::geometry::{self, PageLayout};
use crate::resample;
use crate::sampler::{self, SampleFormat};
use crate::{Dictionary, Document, Error, Object, ObjectId, Result, Stream, dictionary};

/// Document-level options for one write call.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Value of the Info dictionary's `/Title`, typically the file name.
    pub title: Option<String>,
    /// Producer string; the crate name and version when absent.
    pub producer: Option<String>,
    /// Fixed timestamp for `/CreationDate` and `/ModDate`; the current time
    /// when absent.
    pub creation_date: Option<OffsetDateTime>,
    /// Density fallback applied when a frame declares no resolution.
    pub density: Option<(f64, f64)>,
    /// Page geometry override, taking precedence over frame page boxes.
    pub page: Option<Rect>,
    /// Write every frame; when false only the first frame is written.
    pub adjoin: bool,
    /// Font size for label lines.
    pub point_size: f64,
    /// Keep gray frames in full color instead of collapsing them to
    /// DeviceGray intensities.
    pub truecolor: bool,
}

impl Default for WriteOptions {
    fn default() -> WriteOptions {
        WriteOptions {
            title: None,
            producer: None,
            creation_date: None,
            density: None,
            page: None,
            adjoin: true,
            point_size: 12.0,
            truecolor: false,
        }
    }
}

/// Serialize `frames` as a PDF document into `target`.
pub fn write_pdf<W: Write>(frames: &[Frame], options: &WriteOptions, target: &mut W) -> Result<()> {
    build_pdf(frames, options)?.save_to(target)
}

/// Assemble the document object graph for `frames` without serializing it.
pub fn build_pdf(frames: &[Frame], options: &WriteOptions) -> Result<Document> {
    if frames.is_empty() {
        return Err(Error::InvalidFrame("the frame list is empty".into()));
    }
    let written = if options.adjoin { frames } else { &frames[..1] };
    let streams = encode_streams(written, options)?;

    let mut doc = Document::with_version(document_version(&streams));

    let date = pdf_date(options.creation_date.unwrap_or_else(OffsetDateTime::now_utc));
    let mut info = Dictionary::new();
    if let Some(title) = &options.title {
        info.set("Title", Object::string_literal(title.as_str()));
    }
    info.set("CreationDate", Object::string_literal(date.as_str()));
    info.set("ModDate", Object::string_literal(date));
    let producer = options
        .producer
        .clone()
        .unwrap_or_else(|| concat!("rasterpdf ", env!("CARGO_PKG_VERSION")).to_string());
    info.set("Producer", Object::string_literal(producer));
    let info_id = doc.add_object(info);

    let root_id = doc.new_object_id();
    let pages_id = doc.new_object_id();
    doc.set_object(
        root_id,
        dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        },
    );

    let mut kids = Vec::with_capacity(written.len());
    for (scene, (frame, frame_streams)) in written.iter().zip(streams).enumerate() {
        kids.push(write_cluster(&mut doc, frame, frame_streams, scene, pages_id, options));
    }

    doc.set_object(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
            "Count" => kids.len() as i64,
        },
    );

    doc.trailer.set("Info", Object::Reference(info_id));
    doc.trailer.set("Root", Object::Reference(root_id));
    Ok(doc)
}

/// The encoded stream payloads of one frame, produced before any object is
/// assembled. Encoding is a pure function of the frame, so frames can be
/// processed in parallel; results are consumed strictly in document order.
struct FrameStreams {
    compression: Compression,
    matte: bool,
    image: Vec<u8>,
    smask: Option<Vec<u8>>,
    thumb: Vec<u8>,
    thumb_width: u32,
    thumb_height: u32,
    colormap: Option<Vec<u8>>,
}

fn encode_streams(frames: &[Frame], options: &WriteOptions) -> Result<Vec<FrameStreams>> {
    #[cfg(feature = "rayon")]
    {
        frames.par_iter().map(|frame| encode_frame(frame, options)).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        frames.iter().map(|frame| encode_frame(frame, options)).collect()
    }
}

fn encode_frame(frame: &Frame, options: &WriteOptions) -> Result<FrameStreams> {
    let compression = frame.compression.resolve();
    let matte = frame.has_alpha() && !frame.is_gray() && compression != Compression::Jpeg2000;

    let format = select_format(frame, compression, options.truecolor);
    let data = sampler::sample(frame, format);
    let image = filters::encode(
        compression,
        Payload {
            data: &data,
            width: frame.width(),
            height: frame.height(),
            format,
            quality: frame.quality,
        },
    )?;

    let smask = if matte {
        let alpha = sampler::alpha_as_gray(frame);
        Some(filters::encode(
            compression.smask_resolved(),
            Payload {
                data: &alpha,
                width: frame.width(),
                height: frame.height(),
                format: SampleFormat::Gray,
                quality: frame.quality,
            },
        )?)
    } else {
        None
    };

    let thumb_frame = resample::thumbnail(frame);
    let thumb_format = select_format(&thumb_frame, compression, options.truecolor);
    let thumb_data = sampler::sample(&thumb_frame, thumb_format);
    let thumb = filters::encode(
        compression,
        Payload {
            data: &thumb_data,
            width: thumb_frame.width(),
            height: thumb_frame.height(),
            format: thumb_format,
            quality: frame.quality,
        },
    )?;

    let colormap = if frame.is_indexed() && frame.color_count() <= 256 && compression != Compression::Fax {
        let triples: Vec<u8> = frame
            .colormap()
            .unwrap_or_default()
            .iter()
            .flatten()
            .copied()
            .collect();
        Some(if compression == Compression::None {
            filters::ascii85::encode(&triples)
        } else {
            triples
        })
    } else {
        None
    };

    Ok(FrameStreams {
        compression,
        matte,
        image,
        smask,
        thumb,
        thumb_width: thumb_frame.width(),
        thumb_height: thumb_frame.height(),
        colormap,
    })
}

/// Which sampling target feeds the compressor for a frame's image stream.
fn select_format(frame: &Frame, compression: Compression, truecolor: bool) -> SampleFormat {
    if compression == Compression::Fax || (!truecolor && frame.is_gray()) {
        SampleFormat::Gray
    } else if !frame.is_indexed()
        || frame.color_count() > 256
        || compression == Compression::Jpeg
        || compression == Compression::Jpeg2000
    {
        if is_cmyk(frame) {
            SampleFormat::Cmyk
        } else {
            SampleFormat::Rgb
        }
    } else {
        SampleFormat::Index
    }
}

fn is_cmyk(frame: &Frame) -> bool {
    matches!(frame.samples(), Samples::Cmyk(_))
}

/// The header version is global to the file, chosen from a scan of every
/// frame before any object is written.
fn document_version(streams: &[FrameStreams]) -> &'static str {
    if streams.iter().any(|s| s.compression == Compression::Jpeg2000) {
        "1.5"
    } else if streams.iter().any(|s| s.matte) {
        "1.4"
    } else {
        "1.3"
    }
}

fn pdf_date(date: OffsetDateTime) -> String {
    // Can only fail if the format description itself were invalid.
    let format = time::format_description::parse("[year][month][day][hour][minute][second]").unwrap();
    format!("D:{}", date.format(&format).unwrap())
}

/// Emit the per-frame object cluster in its fixed order and return the Page
/// object id.
fn write_cluster(
    doc: &mut Document, frame: &Frame, streams: FrameStreams, scene: usize, pages_id: ObjectId,
    options: &WriteOptions,
) -> ObjectId {
    let layout = geometry::resolve(frame, options);
    let compression = streams.compression;

    let page_id = doc.new_object_id();
    let contents_id = doc.new_object_id();
    let contents_length_id = doc.new_object_id();
    let procset_id = doc.new_object_id();
    let font_id = doc.new_object_id();
    let smask_ids = streams.matte.then(|| (doc.new_object_id(), doc.new_object_id()));
    let image_id = doc.new_object_id();
    let image_length_id = doc.new_object_id();
    let colorspace_id = doc.new_object_id();
    let thumb_id = doc.new_object_id();
    let thumb_length_id = doc.new_object_id();
    let colormap_ids = streams
        .colormap
        .is_some()
        .then(|| (doc.new_object_id(), doc.new_object_id()));

    doc.set_object(
        page_id,
        dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    format!("F{}", scene) => Object::Reference(font_id),
                },
                "XObject" => dictionary! {
                    format!("Im{}", scene) => Object::Reference(image_id),
                },
                "ProcSet" => Object::Reference(procset_id),
            },
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(layout.media_width as i64),
                Object::Integer(layout.media_height as i64),
            ],
            "CropBox" => vec![
                Object::Integer(layout.crop.x),
                Object::Integer(layout.crop.y),
                Object::Integer(layout.crop.x + layout.crop.width as i64),
                Object::Integer(layout.crop.y + layout.crop.height as i64),
            ],
            "Contents" => Object::Reference(contents_id),
            "Thumb" => Object::Reference(thumb_id),
        },
    );

    let content = content_stream(frame, &layout, scene, options);
    doc.set_object(contents_length_id, Object::Integer(content.len() as i64));
    doc.set_object(
        contents_id,
        Stream::with_indirect_length(Dictionary::new(), content, contents_length_id),
    );

    doc.set_object(procset_id, Object::Array(procset(frame, compression)));

    doc.set_object(
        font_id,
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "Name" => format!("F{}", scene),
            "BaseFont" => "Helvetica",
            "Encoding" => "MacRomanEncoding",
        },
    );

    if let (Some(data), Some((smask_id, smask_length_id))) = (streams.smask, smask_ids) {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Name" => format!("Ma{}", scene),
            "Filter" => vec![Object::from(compression.smask_resolved().filter_name())],
            "Width" => frame.width() as i64,
            "Height" => frame.height() as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8i64,
        };
        doc.set_object(smask_length_id, Object::Integer(data.len() as i64));
        doc.set_object(smask_id, Stream::with_indirect_length(dict, data, smask_length_id));
    }

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Name" => format!("Im{}", scene),
    };
    extend_dictionary(
        &mut image_dict,
        raster_stream_dict(compression, frame.width(), frame.height(), is_cmyk(frame), colorspace_id),
    );
    if let Some((smask_id, _)) = smask_ids {
        image_dict.set("SMask", Object::Reference(smask_id));
    }
    doc.set_object(image_length_id, Object::Integer(streams.image.len() as i64));
    doc.set_object(
        image_id,
        Stream::with_indirect_length(image_dict, streams.image, image_length_id),
    );

    doc.set_object(
        colorspace_id,
        colorspace(frame, compression, options, colormap_ids.map(|(id, _)| id)),
    );

    let thumb_dict = raster_stream_dict(
        compression,
        streams.thumb_width,
        streams.thumb_height,
        is_cmyk(frame),
        colorspace_id,
    );
    doc.set_object(thumb_length_id, Object::Integer(streams.thumb.len() as i64));
    doc.set_object(
        thumb_id,
        Stream::with_indirect_length(thumb_dict, streams.thumb, thumb_length_id),
    );

    if let (Some(data), Some((colormap_id, colormap_length_id))) = (streams.colormap, colormap_ids) {
        let mut dict = Dictionary::new();
        if compression == Compression::None {
            dict.set("Filter", vec![Object::from("ASCII85Decode")]);
        }
        doc.set_object(colormap_length_id, Object::Integer(data.len() as i64));
        doc.set_object(
            colormap_id,
            Stream::with_indirect_length(dict, data, colormap_length_id),
        );
    }

    page_id
}

/// Build the page content stream: label text runs, then the image placement.
fn content_stream(frame: &Frame, layout: &PageLayout, scene: usize, options: &WriteOptions) -> Vec<u8> {
    use std::fmt::Write as _;

    let mut content = String::from("q\n");
    for (line, text) in frame.labels.iter().enumerate() {
        let y = layout.crop.y
            + layout.crop.height as i64
            + (line as f64 * options.point_size + 12.0) as i64;
        let _ = writeln!(content, "BT");
        let _ = writeln!(content, "/F{} {} Tf", scene, format_number(options.point_size));
        let _ = writeln!(content, "{} {} Td", layout.crop.x, y);
        let _ = writeln!(content, "({}) Tj", escape_label(text));
        let _ = writeln!(content, "ET");
    }
    let _ = writeln!(
        content,
        "{} 0 0 {} {} {} cm",
        format_number(layout.scale.0),
        format_number(layout.scale.1),
        layout.crop.x,
        layout.crop.y,
    );
    let _ = writeln!(content, "/Im{} Do", scene);
    content.push_str("Q\n");
    content.into_bytes()
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '(' | ')' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn procset(frame: &Frame, compression: Compression) -> Vec<Object> {
    let image_kind = if !frame.is_indexed() || frame.color_count() > 256 {
        "ImageC"
    } else if compression == Compression::Fax {
        "ImageB"
    } else {
        "ImageI"
    };
    vec![Object::from("PDF"), Object::from("Text"), Object::from(image_kind)]
}

/// The filter, geometry and depth entries shared by the image and thumbnail
/// stream dictionaries.
fn raster_stream_dict(
    compression: Compression, width: u32, height: u32, cmyk: bool, colorspace_id: ObjectId,
) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Filter", vec![Object::from(compression.filter_name())]);
    if compression == Compression::Fax {
        dict.set(
            "DecodeParms",
            dictionary! {
                "K" => fax::K_PARAMETER,
                "Columns" => width as i64,
                "Rows" => height as i64,
            },
        );
    }
    if cmyk && matches!(compression, Compression::Jpeg | Compression::Jpeg2000) {
        let inverted = [1, 0, 1, 0, 1, 0, 1, 0];
        dict.set("Decode", inverted.map(Object::Integer).to_vec());
    }
    dict.set("Width", width as i64);
    dict.set("Height", height as i64);
    dict.set("ColorSpace", Object::Reference(colorspace_id));
    dict.set("BitsPerComponent", compression.bits_per_component());
    dict
}

fn extend_dictionary(target: &mut Dictionary, source: Dictionary) {
    for (key, value) in &source {
        target.set(key.clone(), value.clone());
    }
}

/// The ColorSpace object referenced by the image and thumbnail dictionaries.
/// Fax data is bilevel gray no matter what the source colorspace was.
fn colorspace(
    frame: &Frame, compression: Compression, options: &WriteOptions, colormap_id: Option<ObjectId>,
) -> Object {
    if compression == Compression::Fax {
        return Object::from("DeviceGray");
    }
    if is_cmyk(frame) {
        return Object::from("DeviceCMYK");
    }
    if !options.truecolor && frame.is_gray() {
        return Object::from("DeviceGray");
    }
    if !frame.is_indexed()
        || frame.color_count() > 256
        || matches!(compression, Compression::Jpeg | Compression::Jpeg2000)
    {
        return Object::from("DeviceRGB");
    }
    let Some(colormap_id) = colormap_id else {
        unreachable!("an indexed colorspace always has a colormap object")
    };
    Object::Array(vec![
        Object::from("Indexed"),
        Object::from("DeviceRGB"),
        Object::Integer(frame.color_count() as i64 - 1),
        Object::Reference(colormap_id),
    ])
}
