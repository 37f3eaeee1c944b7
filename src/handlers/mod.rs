//! # Handlers por Método
//!
//! Un handler por método soportado. Todos tienen la misma firma: reciben el
//! request, la configuración y el writer de la conexión, y escriben una
//! respuesta completa.
//!
//! - **files**: GET y HEAD (archivos del document root)
//! - **form**: POST (formulario urlencoded → página HTML)
//! - **trace**: TRACE (eco del request)

pub mod files;
pub mod form;
pub mod trace;

pub use files::{get_handler, head_handler};
pub use form::post_handler;
pub use trace::trace_handler;

use crate::config::ServerConfig;
use crate::http::{Request, Response, ResponseWriter, StatusCode};
use std::io::{self, Write};

/// Handler para cualquier método no reconocido
pub fn not_implemented_handler<W: Write>(
    _req: &Request,
    _config: &ServerConfig,
    writer: &mut ResponseWriter<W>,
) -> io::Result<()> {
    writer.send(&Response::error(StatusCode::NotImplemented), true)
}
