//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Respuestas cuyo body completo está en memoria: formularios, TRACE y
//! errores. Se serializan con [`ResponseWriter::send`], siempre con
//! `Content-Length`; los archivos se transmiten con el mismo writer.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 404 Not Found\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 54\r\n
//! \r\n
//! <html><body><h1>Error 404 Not Found</h1></body></html>
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use static_http::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_content_type("text/plain")
//!     .with_body("Hello");
//!
//! assert_eq!(response.content_type(), "text/plain");
//! assert_eq!(response.body(), b"Hello");
//! ```
//!
//! [`ResponseWriter::send`]: super::ResponseWriter::send

use super::StatusCode;

/// Content-Type por defecto de las respuestas generadas
pub const TEXT_HTML: &str = "text/html";

/// Representa una respuesta HTTP completa en memoria
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Valor del header Content-Type
    content_type: String,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta vacía `text/html` con el código indicado
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: TEXT_HTML.to_string(),
            body: Vec::new(),
        }
    }

    /// Reemplaza el Content-Type
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    /// Establece el cuerpo desde un string
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self
    }

    /// Establece el cuerpo desde bytes
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Respuesta 200 `text/html`
    pub fn html(body: &str) -> Self {
        Self::new(StatusCode::Ok).with_body(body)
    }

    /// Respuesta de error con el cuerpo HTML fijo
    ///
    /// # Ejemplo
    /// ```
    /// use static_http::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound);
    /// assert_eq!(
    ///     response.body(),
    ///     b"<html><body><h1>Error 404 Not Found</h1></body></html>"
    /// );
    /// ```
    pub fn error(status: StatusCode) -> Self {
        let body = format!("<html><body><h1>Error {}</h1></body></html>", status);
        Self::new(status).with_body(&body)
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene el Content-Type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
