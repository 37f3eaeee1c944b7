//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Lee exactamente un request desde el inicio de una conexión.
//!
//! ## Formato
//!
//! ```text
//! POST /form HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Length: 17\r\n
//! \r\n
//! name=Alice&age=30
//! ```
//!
//! ## Reglas
//!
//! 1. **Request line**: al menos dos tokens separados por espacios (método y target).
//! 2. **Headers**: se dividen en el primer `": "`. Las líneas sin ese separador
//!    se ignoran en el mapa pero se conservan en el head crudo.
//!
//! El head crudo (request line + headers, byte a byte y con sus terminadores
//! originales) se guarda aparte para TRACE.
//! 3. **Body**: exactamente `Content-Length` bytes. Sin ese header, o con un
//!    valor no numérico, el body es vacío. No hay soporte para bodies chunked.

use std::collections::HashMap;
use std::io::{self, BufRead, Read};
use thiserror::Error;

/// Métodos HTTP reconocidos por el servidor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un archivo del document root
    GET,

    /// HEAD - Como GET pero solo retorna headers
    HEAD,

    /// POST - Formulario `application/x-www-form-urlencoded`
    POST,

    /// TRACE - Eco del request recibido
    TRACE,

    /// Cualquier otro token (responde 501)
    Other(String),
}

impl Method {
    /// Clasifica el token de método. La comparación distingue mayúsculas.
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "TRACE" => Method::TRACE,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::TRACE => "TRACE",
            Method::Other(token) => token,
        }
    }
}

/// Representa un request HTTP parseado. Inmutable una vez construido.
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Request-URI tal cual llegó (ej: "/index.html?x=1")
    target: String,

    /// Request line original, sin el terminador de línea
    request_line: String,

    /// Headers HTTP. Último gana en duplicados; los nombres no se normalizan.
    headers: HashMap<String, String>,

    /// Líneas de header en orden, sin terminador
    raw_headers: Vec<String>,

    /// Request line + headers tal como llegaron, sin la línea vacía final
    raw_head: Vec<u8>,

    /// Body del request
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Error)]
pub enum ParseError {
    /// La primera línea llegó vacía
    #[error("Empty request line")]
    EmptyRequestLine,

    /// La request line tiene menos de dos tokens
    #[error("Malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// El cliente cerró antes de enviar `Content-Length` bytes
    #[error("Truncated body: expected {expected} bytes, received {received}")]
    TruncatedBody { expected: usize, received: usize },

    /// Fallo de lectura del socket
    #[error("I/O error while reading request: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    /// Indica si el error es culpa del cliente (400) y no del transporte (500)
    pub fn is_malformed(&self) -> bool {
        !matches!(self, ParseError::Io(_))
    }
}

impl Request {
    /// Lee un request completo desde un stream posicionado al inicio de la conexión.
    ///
    /// Retorna `Ok(None)` si el peer cerró la conexión sin enviar ningún byte.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Option<Self>, ParseError> {
        // 1. Request line
        let mut raw_head = match read_raw_line(reader)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let request_line = line_text(&raw_head);
        if request_line.is_empty() {
            return Err(ParseError::EmptyRequestLine);
        }
        let (method, target) = Self::parse_request_line(&request_line)?;

        // 2. Headers hasta la línea vacía (o EOF)
        let mut raw_headers = Vec::new();
        while let Some(raw) = read_raw_line(reader)? {
            let line = line_text(&raw);
            if line.is_empty() {
                break;
            }
            raw_head.extend_from_slice(&raw);
            raw_headers.push(line);
        }
        let headers = Self::parse_headers(&raw_headers);

        // 3. Body
        let expected = content_length(&raw_headers);
        let body = Self::read_body(reader, expected)?;

        Ok(Some(Request {
            method,
            target,
            request_line,
            headers,
            raw_headers,
            raw_head,
            body,
        }))
    }

    /// Parsea un request desde un buffer en memoria
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use static_http::http::Request;
    ///
    /// let raw = b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.target(), "/index.html");
    /// assert_eq!(request.header("Host"), Some("localhost"));
    /// ```
    pub fn parse(mut buffer: &[u8]) -> Result<Self, ParseError> {
        Self::read_from(&mut buffer)?.ok_or(ParseError::EmptyRequestLine)
    }

    /// Formato: `METHOD TARGET [VERSION]`. La versión no se valida.
    fn parse_request_line(line: &str) -> Result<(Method, String), ParseError> {
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(method), Some(target)) => Ok((Method::from_token(method), target.to_string())),
            _ => Err(ParseError::MalformedRequestLine(line.to_string())),
        }
    }

    fn parse_headers(lines: &[String]) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        for line in lines {
            if let Some((name, value)) = line.split_once(": ") {
                headers.insert(name.to_string(), value.to_string());
            }
        }
        headers
    }

    fn read_body<R: Read>(reader: &mut R, expected: usize) -> Result<Vec<u8>, ParseError> {
        if expected == 0 {
            return Ok(Vec::new());
        }

        // `take` evita reservar de antemano un Content-Length arbitrario
        let mut body = Vec::new();
        reader.take(expected as u64).read_to_end(&mut body)?;
        if body.len() < expected {
            return Err(ParseError::TruncatedBody {
                expected,
                received: body.len(),
            });
        }
        Ok(body)
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Obtiene el target crudo del request
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Obtiene la request line original
    pub fn request_line(&self) -> &str {
        &self.request_line
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header por nombre exacto
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Obtiene un header comparando el nombre sin distinguir mayúsculas.
    /// Con duplicados gana el último recibido.
    pub fn header_ignore_case(&self, name: &str) -> Option<&str> {
        self.raw_headers
            .iter()
            .rev()
            .filter_map(|line| line.split_once(": "))
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Líneas de header tal como llegaron, en orden
    pub fn raw_headers(&self) -> &[String] {
        &self.raw_headers
    }

    /// Request line y headers byte a byte, con sus terminadores
    pub fn raw_head(&self) -> &[u8] {
        &self.raw_head
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// El cliente pidió `Transfer-Encoding: chunked`
    pub fn wants_chunked(&self) -> bool {
        self.header_ignore_case("Transfer-Encoding")
            .map(|value| value.trim().eq_ignore_ascii_case("chunked"))
            .unwrap_or(false)
    }
}

/// Lee una línea cruda hasta `\n` inclusive. `None` en EOF sin datos.
fn read_raw_line<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut raw = Vec::new();
    if reader.read_until(b'\n', &mut raw)? == 0 {
        return Ok(None);
    }
    Ok(Some(raw))
}

/// Texto de una línea sin `\n` ni `\r\n`
fn line_text(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Longitud del body según el primer `Content-Length` (nombre sin distinguir
/// mayúsculas). Ausente o no numérico: 0.
fn content_length(lines: &[String]) -> usize {
    lines
        .iter()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
