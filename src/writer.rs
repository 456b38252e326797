use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::xref::{Xref, XrefEntry};
use crate::{Dictionary, Document, Error, Object, Result, Stream, StringFormat};

impl Document {
    /// Save the document to the specified file path.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<File> {
        let mut file = BufWriter::new(File::create(path)?);
        self.save_internal(&mut file)?;
        Ok(file.into_inner().map_err(|err| err.into_error())?)
    }

    /// Save the document to an arbitrary target.
    pub fn save_to<W: Write>(&mut self, target: &mut W) -> Result<()> {
        self.save_internal(target)
    }

    fn save_internal<W: Write>(&mut self, target: &mut W) -> Result<()> {
        let mut target = CountingWrite {
            inner: target,
            bytes_written: 0,
        };
        let mut xref = Xref::new(self.max_id + 1);
        writeln!(target, "%PDF-{}", self.version)?;

        for (&(id, generation), object) in &self.objects {
            Writer::write_indirect_object(&mut target, id, generation, object, &mut xref)?;
        }

        let xref_start = target.bytes_written;
        Writer::write_xref(&mut target, &xref)?;
        self.write_trailer(&mut target)?;
        write!(target, "\nstartxref\n{}\n%%EOF\n", xref_start)?;

        Ok(())
    }

    fn write_trailer(&mut self, file: &mut dyn Write) -> Result<()> {
        self.trailer.set("Size", i64::from(self.max_id + 1));
        file.write_all(b"trailer\n")?;
        Writer::write_dictionary(file, &self.trailer)?;
        Ok(())
    }
}

pub struct Writer;

impl Writer {
    fn need_separator(object: &Object) -> bool {
        matches!(
            *object,
            Object::Null
                | Object::Boolean(_)
                | Object::Integer(_)
                | Object::Real(_)
                | Object::Reference(_)
        )
    }

    fn need_end_separator(object: &Object) -> bool {
        matches!(
            *object,
            Object::Null
                | Object::Boolean(_)
                | Object::Integer(_)
                | Object::Real(_)
                | Object::Name(_)
                | Object::Reference(_)
                | Object::Stream(_)
        )
    }

    fn write_xref(file: &mut dyn Write, xref: &Xref) -> Result<()> {
        writeln!(file, "xref\n0 {}", xref.size)?;

        let mut write_xref_entry =
            |offset: u32, generation: u16, kind: char| writeln!(file, "{:>010} {:>05} {} ", offset, generation, kind);
        write_xref_entry(0, 65535, 'f')?;

        let mut obj_id = 1;
        while obj_id < xref.size {
            match xref.get(obj_id) {
                Some(XrefEntry::Normal { offset, generation }) => {
                    write_xref_entry(*offset, *generation, 'n')?;
                }
                _ => {
                    write_xref_entry(0, 65535, 'f')?;
                }
            }
            obj_id += 1;
        }
        Ok(())
    }

    fn write_indirect_object<W: Write>(
        file: &mut CountingWrite<&mut W>, id: u32, generation: u16, object: &Object, xref: &mut Xref,
    ) -> Result<()> {
        let offset = u32::try_from(file.bytes_written).map_err(|_| Error::ResourceLimit("output exceeds the addressable cross-reference offset range"))?;
        xref.insert(id, XrefEntry::Normal { offset, generation });
        write!(
            file,
            "{} {} obj{}",
            id,
            generation,
            if Writer::need_separator(object) { " " } else { "" }
        )?;
        Writer::write_object(file, object)?;
        writeln!(
            file,
            "{}endobj",
            if Writer::need_end_separator(object) { " " } else { "" }
        )?;
        Ok(())
    }

    pub fn write_object(file: &mut dyn Write, object: &Object) -> Result<()> {
        match object {
            Object::Null => file.write_all(b"null")?,
            Object::Boolean(value) => {
                if *value {
                    file.write_all(b"true")?;
                } else {
                    file.write_all(b"false")?;
                }
            }
            Object::Integer(value) => {
                let mut buffer = itoa::Buffer::new();
                file.write_all(buffer.format(*value).as_bytes())?;
            }
            Object::Real(value) => write!(file, "{:.02}", *value)?,
            Object::Name(name) => Writer::write_name(file, name)?,
            Object::String(text, format) => Writer::write_string(file, text, format)?,
            Object::Array(array) => Writer::write_array(file, array)?,
            Object::Dictionary(dict) => Writer::write_dictionary(file, dict)?,
            Object::Stream(stream) => Writer::write_stream(file, stream)?,
            Object::Reference(id) => write!(file, "{} {} R", id.0, id.1)?,
        }
        Ok(())
    }

    fn write_name(file: &mut dyn Write, name: &[u8]) -> Result<()> {
        file.write_all(b"/")?;
        for &byte in name {
            // White-space and delimiter chars are encoded to # sequences,
            // as are bytes outside of the range 33 (!) to 126 (~).
            if b" \t\n\r\x0C()<>[]{}/%#".contains(&byte) || !(33..=126).contains(&byte) {
                write!(file, "#{:02X}", byte)?;
            } else {
                file.write_all(&[byte])?;
            }
        }
        Ok(())
    }

    /// Literal strings backslash-escape every parenthesis, backslash and
    /// carriage return; text already free of those bytes is written verbatim.
    fn write_string(file: &mut dyn Write, text: &[u8], format: &StringFormat) -> Result<()> {
        match format {
            StringFormat::Literal => {
                file.write_all(b"(")?;
                for &byte in text {
                    match byte {
                        b'(' | b')' | b'\\' => {
                            file.write_all(&[b'\\', byte])?;
                        }
                        b'\r' => {
                            file.write_all(b"\\r")?;
                        }
                        _ => file.write_all(&[byte])?,
                    }
                }
                file.write_all(b")")?;
            }
            StringFormat::Hexadecimal => {
                file.write_all(b"<")?;
                for &byte in text {
                    write!(file, "{:02X}", byte)?;
                }
                file.write_all(b">")?;
            }
        }
        Ok(())
    }

    fn write_array(file: &mut dyn Write, array: &[Object]) -> Result<()> {
        file.write_all(b"[")?;
        let mut first = true;
        for object in array {
            if first {
                first = false;
            } else if Writer::need_separator(object) {
                file.write_all(b" ")?;
            }
            Writer::write_object(file, object)?;
        }
        file.write_all(b"]")?;
        Ok(())
    }

    fn write_dictionary(file: &mut dyn Write, dictionary: &Dictionary) -> Result<()> {
        file.write_all(b"<<")?;
        for (key, value) in dictionary {
            Writer::write_name(file, key)?;
            if Writer::need_separator(value) {
                file.write_all(b" ")?;
            }
            Writer::write_object(file, value)?;
        }
        file.write_all(b">>")?;
        Ok(())
    }

    fn write_stream(file: &mut dyn Write, stream: &Stream) -> Result<()> {
        Writer::write_dictionary(file, &stream.dict)?;
        file.write_all(b"stream\n")?;
        file.write_all(&stream.content)?;
        file.write_all(b"\nendstream")?;
        Ok(())
    }
}

pub struct CountingWrite<W: Write> {
    inner: W,
    bytes_written: usize,
}

impl<W: Write> Write for CountingWrite<W> {
    #[inline]
    fn write(&mut self, buffer: &[u8]) -> std::io::Result<usize> {
        let result = self.inner.write(buffer);
        if let Ok(bytes) = result {
            self.bytes_written += bytes;
        }
        result
    }

    #[inline]
    fn write_all(&mut self, buffer: &[u8]) -> std::io::Result<()> {
        self.bytes_written += buffer.len();
        // If this returns `Err` we can’t know how many bytes were actually
        // written (if any) but that doesn’t matter since we’re gonna abort
        // the entire PDF generation anyway.
        self.inner.write_all(buffer)
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
