//! # Transfer-Encoding: chunked
//! src/http/chunked.rs
//!
//! Cada chunk es `<tamaño-hex>\r\n<bytes>\r\n`; el body termina con el chunk
//! de tamaño cero `0\r\n\r\n`.

use std::io::{self, Write};

/// Codificador chunked sobre cualquier `Write`
pub struct ChunkedEncoder<W: Write> {
    writer: W,
}

impl<W: Write> ChunkedEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Escribe un chunk. Un slice vacío no produce nada (el chunk vacío es el terminador).
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        write!(self.writer, "{:x}\r\n", data.len())?;
        self.writer.write_all(data)?;
        self.writer.write_all(b"\r\n")
    }

    /// Escribe el chunk terminador
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.write_all(b"0\r\n\r\n")?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_framing() {
        let mut encoder = ChunkedEncoder::new(Vec::new());
        encoder.write_chunk(b"hello").unwrap();
        encoder.write_chunk(&[b'x'; 26]).unwrap();
        let out = encoder.finish().unwrap();

        let expected = format!("5\r\nhello\r\n1a\r\n{}\r\n0\r\n\r\n", "x".repeat(26));
        assert_eq!(out, expected.as_bytes());
    }

    #[test]
    fn test_empty_chunk_skipped() {
        let mut encoder = ChunkedEncoder::new(Vec::new());
        encoder.write_chunk(b"").unwrap();
        assert_eq!(encoder.finish().unwrap(), b"0\r\n\r\n");
    }
}
