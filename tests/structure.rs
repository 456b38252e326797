//! Document-level structure: object ordering, cross-reference offsets,
//! the Pages tree and the per-frame object cluster.

mod common;

use common::{object_body, object_headers, xref_offsets};
use rasterpdf::{Compression, Frame, WriteOptions, write_pdf};

fn render(frames: &[Frame]) -> Vec<u8> {
    render_with(frames, &WriteOptions::default())
}

fn render_with(frames: &[Frame], options: &WriteOptions) -> Vec<u8> {
    let mut output = Vec::new();
    write_pdf(frames, options, &mut output).unwrap();
    output
}

fn rgb_2x2() -> Frame {
    Frame::rgb(2, 2, vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 9, 8, 7]).unwrap()
}

#[test]
fn rgb_rle_document_layout() {
    let options = WriteOptions {
        title: Some("test(image).pdf".into()),
        ..WriteOptions::default()
    };
    let pdf = render_with(&[rgb_2x2()], &options);
    assert!(pdf.starts_with(b"%PDF-1.3\n"));

    // Info, Catalog, Pages, then the ten-object cluster for a direct-class
    // frame without alpha: Page, Contents, Length, ProcSet, Font, Image,
    // Length, ColorSpace, Thumb, Length.
    let headers = object_headers(&pdf);
    let ids: Vec<u32> = headers.iter().map(|&(id, _)| id).collect();
    assert_eq!(ids, (1..=13).collect::<Vec<u32>>());

    let info = object_body(&pdf, 1);
    assert!(info.contains("/Title(test\\(image\\).pdf)"));
    assert!(info.contains("/CreationDate(D:"));
    assert!(info.contains("/Producer(rasterpdf"));

    let catalog = object_body(&pdf, 2);
    assert!(catalog.contains("/Type/Catalog"));
    assert!(catalog.contains("/Pages 3 0 R"));

    let pages = object_body(&pdf, 3);
    assert!(pages.contains("/Type/Pages"));
    assert!(pages.contains("/Kids[4 0 R]"));
    assert!(pages.contains("/Count 1"));

    let page = object_body(&pdf, 4);
    assert!(page.contains("/Type/Page"));
    assert!(page.contains("/Parent 3 0 R"));
    assert!(page.contains("/Contents 5 0 R"));
    assert!(page.contains("/ProcSet 7 0 R"));
    assert!(page.contains("/Font<</F0 8 0 R>>"));
    assert!(page.contains("/XObject<</Im0 9 0 R>>"));
    assert!(page.contains("/MediaBox[0 0 2 2]"));
    assert!(page.contains("/CropBox[0 0 2 2]"));
    assert!(page.contains("/Thumb 12 0 R"));

    assert!(object_body(&pdf, 7).contains("/ImageC"));
    assert!(object_body(&pdf, 8).contains("/BaseFont/Helvetica"));

    let image = object_body(&pdf, 9);
    assert!(image.contains("/Subtype/Image"));
    assert!(image.contains("/Filter[/RunLengthDecode]"));
    assert!(image.contains("/Width 2"));
    assert!(image.contains("/Height 2"));
    assert!(image.contains("/ColorSpace 11 0 R"));
    assert!(image.contains("/BitsPerComponent 8"));
    assert!(image.contains("/Length 10 0 R"));
    assert!(!image.contains("/SMask"));

    assert_eq!(object_body(&pdf, 11).trim(), "/DeviceRGB");

    let trailer_at = pdf.windows(7).rposition(|w| w == b"trailer").unwrap();
    let trailer = String::from_utf8_lossy(&pdf[trailer_at..]);
    assert!(trailer.contains("/Size 14"));
    assert!(trailer.contains("/Info 1 0 R"));
    assert!(trailer.contains("/Root 2 0 R"));
}

#[test]
fn xref_offsets_point_at_object_headers() {
    let mut indexed = Frame::indexed(
        2,
        2,
        vec![0, 1, 1, 0],
        vec![[0, 0, 0], [250, 100, 50]],
    )
    .unwrap();
    indexed.compression = Compression::Zip;
    let pdf = render(&[rgb_2x2(), indexed]);

    let offsets = xref_offsets(&pdf);
    let headers = object_headers(&pdf);
    assert_eq!(offsets.len(), headers.len());
    for (index, &offset) in offsets.iter().enumerate() {
        let expected = format!("{} 0 obj", index + 1);
        assert_eq!(
            &pdf[offset..offset + expected.len()],
            expected.as_bytes(),
            "xref entry {} does not point at its object",
            index + 1
        );
    }

    // startxref names the byte offset of the xref section itself.
    let text = String::from_utf8_lossy(&pdf);
    let startxref: usize = text
        .lines()
        .skip_while(|&line| line != "startxref")
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();
    assert!(pdf[startxref..].starts_with(b"xref"));
}

#[test]
fn kids_match_emitted_page_ids_across_mixed_clusters() {
    // Alpha and colormap objects change the cluster size; the Kids array
    // must list the page ids that were actually assigned.
    let with_alpha = rgb_2x2().with_alpha(vec![10, 20, 30, 40]).unwrap();
    let indexed = Frame::indexed(2, 1, vec![1, 0], vec![[0, 0, 0], [9, 9, 9]]).unwrap();
    let pdf = render(&[rgb_2x2(), with_alpha, indexed]);

    let pages = object_body(&pdf, 3);
    let kids_list = pages
        .split_once("/Kids[")
        .map(|(_, rest)| rest.split_once(']').unwrap().0)
        .unwrap();
    let kid_ids: Vec<u32> = kids_list
        .split(" 0 R")
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse().unwrap())
        .collect();
    assert_eq!(kid_ids.len(), 3);
    assert!(pages.contains("/Count 3"));
    for &kid in &kid_ids {
        assert!(object_body(&pdf, kid).contains("/Type/Page"));
    }

    // No gaps and no duplicates: headers run from 1 to the trailer size - 1.
    let headers = object_headers(&pdf);
    let ids: Vec<u32> = headers.iter().map(|&(id, _)| id).collect();
    assert_eq!(ids, (1..=ids.len() as u32).collect::<Vec<u32>>());
}

#[test]
fn alpha_emits_a_soft_mask_and_bumps_the_version() {
    let frame = rgb_2x2().with_alpha(vec![0, 64, 128, 255]).unwrap();
    let pdf = render(&[frame]);
    assert!(pdf.starts_with(b"%PDF-1.4\n"));

    // The soft mask sits between the Font and Image objects, shifting the
    // rest of the cluster by two ids.
    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/Name/Ma0"));
    let smask_body = object_body(&pdf, 9);
    assert!(smask_body.contains("/ColorSpace/DeviceGray"));
    assert!(smask_body.contains("/Width 2"));
    assert!(smask_body.contains("/Height 2"));
    assert!(smask_body.contains("/Filter[/RunLengthDecode]"));
    assert!(smask_body.contains("/BitsPerComponent 8"));

    let image = object_body(&pdf, 11);
    assert!(image.contains("/Name/Im0"));
    assert!(image.contains("/SMask 9 0 R"));
    assert!(image.contains("/ColorSpace 13 0 R"));
}

#[test]
fn gray_frames_never_carry_a_soft_mask() {
    let frame = Frame::gray(2, 2, vec![1, 2, 3, 4])
        .unwrap()
        .with_alpha(vec![255; 4])
        .unwrap();
    let pdf = render(&[frame]);
    assert!(pdf.starts_with(b"%PDF-1.3\n"));
    assert!(!String::from_utf8_lossy(&pdf).contains("/SMask"));
}

#[test]
fn adjoin_false_writes_a_single_page() {
    let options = WriteOptions {
        adjoin: false,
        ..WriteOptions::default()
    };
    let pdf = render_with(&[rgb_2x2(), rgb_2x2(), rgb_2x2()], &options);
    assert!(object_body(&pdf, 3).contains("/Count 1"));
}

#[test]
fn empty_frame_list_is_rejected() {
    let mut output = Vec::new();
    let result = write_pdf(&[], &WriteOptions::default(), &mut output);
    assert!(matches!(result, Err(rasterpdf::Error::InvalidFrame(_))));
}

#[test]
fn labels_render_text_runs_in_the_content_stream() {
    let mut frame = rgb_2x2();
    frame.labels = vec!["first line".into(), "second (note)".into()];
    let pdf = render(&[frame]);
    let content = common::stream_content(&pdf, 5);
    let text = String::from_utf8_lossy(&content);
    assert!(text.starts_with("q\n"));
    assert!(text.contains("BT\n/F0 12 Tf"));
    assert!(text.contains("(first line) Tj"));
    assert!(text.contains("(second \\(note\\)) Tj"));
    assert!(text.contains("/Im0 Do"));
    assert!(text.trim_end().ends_with('Q'));
}

#[test]
fn save_writes_the_same_bytes_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.pdf");
    let mut doc = rasterpdf::build_pdf(&[rgb_2x2()], &WriteOptions::default()).unwrap();
    doc.save(&path).unwrap();
    let written = std::fs::read(&path).unwrap();
    assert!(written.starts_with(b"%PDF-1.3\n"));
    assert!(written.trim_ascii_end().ends_with(b"%%EOF"));
}
