//! # Módulo HTTP
//!
//! Implementa la parte del protocolo HTTP/1.1 que necesita el servidor, sin
//! librerías de alto nivel:
//!
//! - Parsing de un request por conexión (sin keep-alive ni pipelining)
//! - Construcción de respuestas en memoria
//! - Escritura de respuestas con `Content-Length` o `Transfer-Encoding: chunked`
//! - Códigos de estado
//!
//! ### Formato de Request
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```

pub mod chunked; // Codificación chunked
pub mod request; // Parsing de HTTP requests
pub mod response; // Respuestas en memoria
pub mod status; // Códigos de estado HTTP
pub mod writer; // Serialización sobre la conexión

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
pub use writer::{Framing, ResponseWriter};
