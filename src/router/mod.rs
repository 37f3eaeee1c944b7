//! # Despacho por Método
//! src/router/mod.rs
//!
//! ```text
//! Request → Router → Handler → ResponseWriter
//! ```
//!
//! El router mira solo el token de método; el target lo interpreta cada
//! handler. Cualquier token fuera de GET/HEAD/POST/TRACE recibe 501.

use crate::config::ServerConfig;
use crate::handlers;
use crate::http::{Method, Request, ResponseWriter};
use std::io::{self, Write};
use std::sync::Arc;

/// Tipo de función handler
///
/// Un handler recibe el Request y escribe la respuesta completa en el writer
pub type Handler<W> = fn(&Request, &ServerConfig, &mut ResponseWriter<W>) -> io::Result<()>;

/// Router compartido por todos los workers
#[derive(Debug, Clone)]
pub struct Router {
    config: Arc<ServerConfig>,
}

impl Router {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Elige el handler para un método
    pub fn handler_for<W: Write>(method: &Method) -> Handler<W> {
        match method {
            Method::GET => handlers::get_handler::<W>,
            Method::HEAD => handlers::head_handler::<W>,
            Method::POST => handlers::post_handler::<W>,
            Method::TRACE => handlers::trace_handler::<W>,
            Method::Other(_) => handlers::not_implemented_handler::<W>,
        }
    }

    /// Despacha el request y escribe la respuesta
    ///
    /// # Ejemplo
    /// ```
    /// use static_http::config::ServerConfig;
    /// use static_http::http::{Request, ResponseWriter};
    /// use static_http::router::Router;
    /// use std::sync::Arc;
    ///
    /// let router = Router::new(Arc::new(ServerConfig::for_root("/srv/www").unwrap()));
    /// let request = Request::parse(b"DELETE /x HTTP/1.1\r\n\r\n").unwrap();
    /// let mut writer = ResponseWriter::new(Vec::new());
    /// router.route(&request, &mut writer).unwrap();
    ///
    /// assert!(writer.into_inner().starts_with(b"HTTP/1.1 501 Not Implemented\r\n"));
    /// ```
    pub fn route<W: Write>(
        &self,
        request: &Request,
        writer: &mut ResponseWriter<W>,
    ) -> io::Result<()> {
        let handler = Self::handler_for::<W>(request.method());
        handler(request, &self.config, writer)
    }
}
