//! # TRACE
//! src/handlers/trace.rs
//!
//! Devuelve como body la request line y el bloque de headers tal como
//! llegaron, byte a byte y con sus terminadores originales.

use crate::config::ServerConfig;
use crate::http::{Request, Response, ResponseWriter, StatusCode};
use std::io::{self, Write};

pub const MESSAGE_HTTP: &str = "message/http";

/// Handler para TRACE
pub fn trace_handler<W: Write>(
    req: &Request,
    _config: &ServerConfig,
    writer: &mut ResponseWriter<W>,
) -> io::Result<()> {
    let response = Response::new(StatusCode::Ok)
        .with_content_type(MESSAGE_HTTP)
        .with_body_bytes(req.raw_head().to_vec());
    writer.send(&response, true)
}
