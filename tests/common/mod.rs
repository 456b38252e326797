//! Shared helpers for inspecting serialized PDF output.
#![allow(dead_code)]

/// Byte offsets of every `<n> 0 obj` header, in file order.
pub fn object_headers(pdf: &[u8]) -> Vec<(u32, usize)> {
    let mut headers = Vec::new();
    let mut position = 0;
    while let Some(found) = find(pdf, b" 0 obj", position) {
        let line_start = pdf[..found].iter().rposition(|&b| b == b'\n').map_or(0, |p| p + 1);
        let digits = &pdf[line_start..found];
        if !digits.is_empty() && digits.iter().all(u8::is_ascii_digit) {
            let id: u32 = String::from_utf8_lossy(digits).parse().unwrap();
            headers.push((id, line_start));
        }
        position = found + 1;
    }
    headers
}

/// The textual body of object `id`, between its header and `endobj`.
pub fn object_body(pdf: &[u8], id: u32) -> String {
    let header = format!("{} 0 obj", id);
    let start = find(pdf, header.as_bytes(), 0).unwrap_or_else(|| panic!("object {} not found", id));
    let end = find(pdf, b"endobj", start).unwrap();
    String::from_utf8_lossy(&pdf[start + header.len()..end]).into_owned()
}

/// The raw content of the stream belonging to object `id`.
pub fn stream_content(pdf: &[u8], id: u32) -> Vec<u8> {
    let header = format!("{} 0 obj", id);
    let start = find(pdf, header.as_bytes(), 0).unwrap_or_else(|| panic!("object {} not found", id));
    let data_start = find(pdf, b"stream\n", start).unwrap() + b"stream\n".len();
    let data_end = find(pdf, b"\nendstream", data_start).unwrap();
    pdf[data_start..data_end].to_vec()
}

/// Offsets recorded in the cross-reference table for object 1 onwards.
pub fn xref_offsets(pdf: &[u8]) -> Vec<usize> {
    let xref = find(pdf, b"\nxref\n", 0).unwrap() + 1;
    let text = String::from_utf8_lossy(&pdf[xref..]);
    text.lines()
        .skip(2) // "xref" and the "0 n" subsection line
        .take_while(|line| line.len() >= 18)
        .skip(1) // the reserved free entry
        .map(|line| line[..10].parse().unwrap())
        .collect()
}

/// The integer value of a bare integer object, e.g. a Length object.
pub fn integer_object(pdf: &[u8], id: u32) -> i64 {
    object_body(pdf, id).trim().parse().unwrap()
}

/// Decode an Adobe ASCII85 stream, including the `z` shortcut and the
/// `~>` terminator.
pub fn ascii85_decode(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    let mut group = [0u8; 5];
    let mut len = 0;
    for &byte in data {
        match byte {
            b'~' => break,
            b'z' if len == 0 => output.extend_from_slice(&[0, 0, 0, 0]),
            b'!'..=b'u' => {
                group[len] = byte - b'!';
                len += 1;
                if len == 5 {
                    let tuple = group.iter().fold(0u32, |acc, &d| acc * 85 + u32::from(d));
                    output.extend_from_slice(&tuple.to_be_bytes());
                    len = 0;
                }
            }
            _ => {}
        }
    }
    if len > 0 {
        let mut padded = group;
        padded[len..].fill(84);
        let tuple = padded.iter().fold(0u32, |acc, &d| acc * 85 + u32::from(d));
        output.extend_from_slice(&tuple.to_be_bytes()[..len - 1]);
    }
    output
}

/// Decode RunLengthDecode (PackBits) data.
pub fn run_length_decode(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let control = data[i];
        i += 1;
        match control {
            0..=127 => {
                let count = control as usize + 1;
                output.extend_from_slice(&data[i..i + count]);
                i += count;
            }
            128 => break,
            _ => {
                output.extend(std::iter::repeat_n(data[i], 257 - control as usize));
                i += 1;
            }
        }
    }
    output
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|p| p + from)
}
