//! # Escritura de Respuestas
//! src/http/writer.rs
//!
//! `ResponseWriter` serializa el head y el body sobre la conexión. El orden
//! del head es fijo:
//!
//! ```text
//! HTTP/1.1 <code> <reason>\r\n
//! Content-Type: <tipo>\r\n
//! Content-Length: <n>\r\n        (o Transfer-Encoding: chunked)
//! \r\n
//! ```
//!
//! El writer recuerda si ya envió bytes (`is_committed`). Una vez enviado el
//! head no se puede cambiar de opinión: un fallo posterior solo puede cerrar
//! la conexión.

use super::chunked::ChunkedEncoder;
use super::{Response, StatusCode};
use std::io::{self, Read, Write};

/// Tamaño del buffer de lectura; en modo chunked es también el tamaño de cada chunk
pub const BODY_BUFFER_SIZE: usize = 1024;

/// Cómo se delimita el body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `Content-Length: <n>`
    Length(u64),

    /// `Transfer-Encoding: chunked`
    Chunked,
}

/// Lo que se envió, para el access log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentHead {
    pub status: StatusCode,
    pub content_type: String,
    pub framing: Framing,
}

/// Formatea status line + headers + línea vacía
pub fn format_head(status: StatusCode, content_type: &str, framing: Framing) -> String {
    let framing_line = match framing {
        Framing::Length(length) => format!("Content-Length: {}", length),
        Framing::Chunked => "Transfer-Encoding: chunked".to_string(),
    };
    format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\n{}\r\n\r\n",
        status, content_type, framing_line
    )
}

pub struct ResponseWriter<W: Write> {
    out: W,
    head: Option<SentHead>,
    body_bytes: u64,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            head: None,
            body_bytes: 0,
        }
    }

    /// Indica si el head ya salió hacia el cliente
    pub fn is_committed(&self) -> bool {
        self.head.is_some()
    }

    /// Head enviado, si lo hubo
    pub fn sent_head(&self) -> Option<&SentHead> {
        self.head.as_ref()
    }

    /// Bytes de body enviados (sin contar el framing chunked)
    pub fn body_bytes(&self) -> u64 {
        self.body_bytes
    }

    /// Escribe status line y headers. Solo puede llamarse una vez.
    pub fn write_head(
        &mut self,
        status: StatusCode,
        content_type: &str,
        framing: Framing,
    ) -> io::Result<()> {
        if self.is_committed() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "response head already written",
            ));
        }
        // Se marca antes de escribir: un fallo a mitad del head también compromete la conexión
        self.head = Some(SentHead {
            status,
            content_type: content_type.to_string(),
            framing,
        });
        self.out
            .write_all(format_head(status, content_type, framing).as_bytes())
    }

    /// Escribe bytes de body tal cual (modo Content-Length)
    pub fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.body_bytes += bytes.len() as u64;
        Ok(())
    }

    /// Copia `source` como body, en bloques de [`BODY_BUFFER_SIZE`].
    ///
    /// En modo chunked cada bloque leído es un chunk y se termina con el chunk vacío.
    pub fn copy_body<R: Read>(&mut self, mut source: R, framing: Framing) -> io::Result<u64> {
        let mut buffer = [0u8; BODY_BUFFER_SIZE];
        let mut total = 0u64;

        match framing {
            Framing::Length(_) => loop {
                let read = read_some(&mut source, &mut buffer)?;
                if read == 0 {
                    break;
                }
                self.out.write_all(&buffer[..read])?;
                total += read as u64;
            },
            Framing::Chunked => {
                let mut encoder = ChunkedEncoder::new(&mut self.out);
                loop {
                    let read = read_some(&mut source, &mut buffer)?;
                    if read == 0 {
                        break;
                    }
                    encoder.write_chunk(&buffer[..read])?;
                    total += read as u64;
                }
                encoder.finish()?;
            }
        }

        self.body_bytes += total;
        Ok(total)
    }

    /// Envía una respuesta en memoria completa
    pub fn send(&mut self, response: &Response, include_body: bool) -> io::Result<()> {
        let framing = Framing::Length(response.body().len() as u64);
        self.write_head(response.status(), response.content_type(), framing)?;
        if include_body {
            self.write_body(response.body())?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Recupera el stream subyacente
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// `read` que reintenta en `Interrupted`
fn read_some<R: Read>(source: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buffer) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
