//! Kitty Graphics Protocol implementation
//!
//! Draws item icons as real images in supporting terminals.
//!
//! Protocol documentation: https://sw.kovidgoyal.net/kitty/graphics-protocol/

use std::collections::HashMap;
use std::io::{self, Cursor, Stdout, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, ImageEncoder};

/// Max payload bytes per escape sequence
const CHUNK_SIZE: usize = 4096;

/// Kitty Graphics Protocol writer
pub struct KittyGraphics<W: Write = Stdout> {
    out: W,
    /// Uploaded image IDs mapped to their pixel dimensions
    uploaded: HashMap<u32, (u32, u32)>,
    next_id: u32,
}

impl KittyGraphics<Stdout> {
    /// Writer targeting the process stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> KittyGraphics<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            uploaded: HashMap::new(),
            next_id: 1,
        }
    }

    /// Transmit an image once and return the ID used to place it later
    pub fn upload_image(&mut self, image: &DynamicImage) -> io::Result<u32> {
        let id = self.next_id;
        self.next_id += 1;

        let rgba = image.to_rgba8();
        let dimensions = rgba.dimensions();
        let encoded = BASE64.encode(encode_png(&rgba)?);

        // a=t (transmit), f=100 (PNG), q=2 (no replies)
        let chunks = payload_chunks(&encoded);
        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.iter().enumerate() {
            let more = u8::from(i != last);
            if i == 0 {
                write!(self.out, "\x1b_Ga=t,t=d,f=100,i={},q=2,m={};{}\x1b\\", id, more, chunk)?;
            } else {
                write!(self.out, "\x1b_Gm={};{}\x1b\\", more, chunk)?;
            }
        }
        self.out.flush()?;

        self.uploaded.insert(id, dimensions);
        Ok(id)
    }

    /// Place an uploaded image scaled into a cell box at (col, row).
    /// The cursor is not moved by the placement (C=1).
    pub fn display_image_at(
        &mut self,
        image_id: u32,
        col: u16,
        row: u16,
        cols: u16,
        rows: u16,
    ) -> io::Result<()> {
        write!(self.out, "\x1b[{};{}H", row + 1, col + 1)?;
        write!(
            self.out,
            "\x1b_Ga=p,i={},c={},r={},C=1,q=2\x1b\\",
            image_id, cols, rows
        )?;
        self.out.flush()
    }

    /// Remove every visible placement, keeping uploaded image data
    pub fn clear_placements(&mut self) -> io::Result<()> {
        write!(self.out, "\x1b_Ga=d,d=a,q=2\x1b\\")?;
        self.out.flush()
    }

    /// Delete all placements and free all uploaded images
    pub fn clear_all(&mut self) -> io::Result<()> {
        write!(self.out, "\x1b_Ga=d,d=A,q=2\x1b\\")?;
        self.out.flush()?;
        self.uploaded.clear();
        Ok(())
    }

    pub fn is_uploaded(&self, image_id: u32) -> bool {
        self.uploaded.contains_key(&image_id)
    }

    pub fn get_dimensions(&self, image_id: u32) -> Option<(u32, u32)> {
        self.uploaded.get(&image_id).copied()
    }

    /// Underlying writer
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

/// Split base64 text into protocol-sized chunks. Base64 is ASCII so any
/// byte offset is a char boundary.
fn payload_chunks(encoded: &str) -> Vec<&str> {
    if encoded.is_empty() {
        return vec![""];
    }
    (0..encoded.len())
        .step_by(CHUNK_SIZE)
        .map(|start| &encoded[start..(start + CHUNK_SIZE).min(encoded.len())])
        .collect()
}

/// Encode an RGBA image as PNG bytes
fn encode_png(image: &image::RgbaImage) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(Cursor::new(&mut buffer))
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(io::Error::other)?;
    Ok(buffer)
}
