//! # Procesamiento de una Conexión
//! src/server/connection.rs
//!
//! Una conexión = un request = una respuesta:
//!
//! ```text
//! parse → router → handler → flush → access log → close
//! ```
//!
//! Todo fallo se resuelve aquí. Si todavía no salió ningún byte hacia el
//! cliente se responde con el status del error (400 o 500); si el head ya se
//! envió, la conexión se abandona y solo queda el log. El socket se cierra al
//! soltar el `TcpStream`, en todos los caminos.

use crate::http::{Method, ParseError, Request, Response, ResponseWriter, StatusCode};
use crate::router::Router;
use crate::server::access_log::{self, Exchange};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Tiempo máximo que el accept loop descarta el request de un cliente rechazado
const REJECT_DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Tamaño del buffer de descarte
const DRAIN_BUFFER_SIZE: usize = 1024;

/// Fallo que termina una conexión
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Request inválido (400)
    #[error("bad request: {0}")]
    Parse(ParseError),

    /// Fallo de lectura o escritura en el socket o en un archivo (500)
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// Un handler entró en pánico (500)
    #[error("handler panicked")]
    Panicked,
}

impl ConnectionError {
    /// Status con el que se responde si la respuesta no está comprometida
    pub fn status(&self) -> StatusCode {
        match self {
            ConnectionError::Parse(_) => StatusCode::BadRequest,
            ConnectionError::Io(_) | ConnectionError::Panicked => StatusCode::InternalServerError,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// El peer cerró o reseteó la conexión
    pub fn is_peer_gone(&self) -> bool {
        match self {
            ConnectionError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

// Un fallo de lectura no es culpa del cliente: se separa de los errores de formato
impl From<ParseError> for ConnectionError {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Io(e) => ConnectionError::Io(e),
            other => ConnectionError::Parse(other),
        }
    }
}

impl From<io::Error> for ConnectionError {
    fn from(error: io::Error) -> Self {
        ConnectionError::Io(error)
    }
}

/// Lee un request, lo despacha y escribe la respuesta.
///
/// Nunca falla: el resultado (incluido el error, si lo hubo) queda en el
/// [`Exchange`] para el access log.
pub fn process<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut ResponseWriter<W>,
    router: &Router,
) -> Exchange {
    let mut exchange = Exchange::default();

    let outcome = match Request::read_from(reader) {
        Ok(None) => return exchange,
        Ok(Some(request)) => {
            let result = router
                .route(&request, writer)
                .and_then(|()| writer.flush())
                .map_err(ConnectionError::from);
            exchange.request = Some(request);
            result
        }
        Err(e) => Err(ConnectionError::from(e)),
    };

    if let Err(error) = outcome {
        if writer.is_committed() {
            exchange.abandoned = true;
        } else {
            let include_body = exchange
                .request
                .as_ref()
                .map_or(true, |request| *request.method() != Method::HEAD);
            send_error(writer, error.status(), include_body);
        }
        exchange.error = Some(error);
    }

    exchange.head = writer.sent_head().cloned();
    exchange.body_bytes = writer.body_bytes();
    exchange
}

/// Atiende una conexión aceptada hasta cerrarla
pub fn handle_connection(stream: TcpStream, router: &Router) {
    let started = Instant::now();
    let peer = peer_name(&stream);

    if let Some(timeout) = router.config().read_timeout() {
        if let Err(e) = stream.set_read_timeout(Some(timeout)) {
            tracing::warn!(peer = %peer, error = %e, "no se pudo fijar el timeout de lectura");
        }
    }

    let mut reader = BufReader::new(&stream);
    let mut writer = ResponseWriter::new(BufWriter::new(&stream));

    let exchange = match panic::catch_unwind(AssertUnwindSafe(|| {
        process(&mut reader, &mut writer, router)
    })) {
        Ok(exchange) => exchange,
        Err(_) => {
            let mut exchange = Exchange {
                error: Some(ConnectionError::Panicked),
                ..Exchange::default()
            };
            if writer.is_committed() {
                exchange.abandoned = true;
            } else {
                send_error(&mut writer, StatusCode::InternalServerError, true);
            }
            exchange.head = writer.sent_head().cloned();
            exchange.body_bytes = writer.body_bytes();
            exchange
        }
    };

    drop(writer);
    drop(reader);
    access_log::record(&peer, &exchange, started.elapsed());
}

/// Respuesta inmediata del accept loop cuando la cola de workers está llena.
///
/// Después del 503 se cierra la escritura y se descarta lo que el cliente
/// haya enviado, como mucho durante [`REJECT_DRAIN_TIMEOUT`]: cerrar con
/// bytes sin leer hace que el kernel envíe RST y el cliente pierda el 503.
pub fn reject_busy(stream: TcpStream) {
    let peer = peer_name(&stream);
    let mut writer = ResponseWriter::new(BufWriter::new(&stream));
    send_error(&mut writer, StatusCode::ServiceUnavailable, true);
    drop(writer);

    if let Err(e) = stream.shutdown(Shutdown::Write) {
        tracing::debug!(peer = %peer, error = %e, "shutdown de escritura falló");
    }
    let drained = drain(&stream, REJECT_DRAIN_TIMEOUT);
    tracing::warn!(peer = %peer, drained, "cola llena, conexión rechazada con 503");
}

/// Lee y descarta hasta EOF, error o `timeout` en total. Retorna los bytes descartados.
fn drain(mut stream: &TcpStream, timeout: Duration) -> usize {
    let deadline = Instant::now() + timeout;
    let mut scratch = [0u8; DRAIN_BUFFER_SIZE];
    let mut drained = 0;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || stream.set_read_timeout(Some(remaining)).is_err() {
            break;
        }
        match stream.read(&mut scratch) {
            Ok(0) | Err(_) => break,
            Ok(read) => drained += read,
        }
    }
    drained
}

/// Mejor esfuerzo: si el socket ya no sirve, solo se registra
fn send_error<W: Write>(writer: &mut ResponseWriter<W>, status: StatusCode, include_body: bool) {
    let result = writer
        .send(&Response::error(status), include_body)
        .and_then(|()| writer.flush());
    if let Err(e) = result {
        tracing::debug!(
            status = status.as_u16(),
            error = %e,
            "no se pudo enviar la respuesta de error"
        );
    }
}

fn peer_name(stream: &TcpStream) -> String {
    stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::fs;
    use std::io::Cursor;
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn router_for(root: &std::path::Path) -> Router {
        Router::new(Arc::new(ServerConfig::for_root(root).unwrap()))
    }

    fn run(raw: &[u8], router: &Router) -> (Exchange, String) {
        let mut reader = Cursor::new(raw.to_vec());
        let mut writer = ResponseWriter::new(Vec::new());
        let exchange = process(&mut reader, &mut writer, router);
        (exchange, String::from_utf8(writer.into_inner()).unwrap())
    }

    /// Reader que falla después de entregar un prefijo
    struct FailingReader {
        prefix: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let read = self.prefix.read(buf)?;
            if read == 0 {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            Ok(read)
        }
    }

    #[test]
    fn test_closed_without_bytes_sends_nothing() {
        let dir = TempDir::new().unwrap();
        let (exchange, out) = run(b"", &router_for(dir.path()));
        assert!(exchange.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn test_get_existing_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>hola</h1>").unwrap();

        let (exchange, out) = run(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n", &router_for(dir.path()));
        assert_eq!(
            out,
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\n\r\n<h1>hola</h1>"
        );
        assert!(exchange.error.is_none());
        assert_eq!(exchange.body_bytes, 13);
        assert_eq!(exchange.head.unwrap().status, StatusCode::Ok);
    }

    #[test]
    fn test_malformed_request_line_is_400() {
        let dir = TempDir::new().unwrap();
        let (exchange, out) = run(b"GARBAGE\r\n\r\n", &router_for(dir.path()));

        assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(out.contains("Content-Length: 56\r\n"));
        assert!(out.ends_with("<h1>Error 400 Bad Request</h1></body></html>"));
        assert!(exchange.request.is_none());
        assert!(exchange.error.as_ref().unwrap().is_client_error());
    }

    #[test]
    fn test_empty_request_line_is_400() {
        let dir = TempDir::new().unwrap();
        let (_, out) = run(b"\r\n", &router_for(dir.path()));
        assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn test_truncated_body_is_400_and_not_dispatched() {
        let dir = TempDir::new().unwrap();
        let (exchange, out) = run(
            b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc",
            &router_for(dir.path()),
        );
        assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(!out.contains("Form Submission Response"));
        assert!(matches!(
            exchange.error,
            Some(ConnectionError::Parse(ParseError::TruncatedBody { expected: 10, received: 3 }))
        ));
    }

    #[test]
    fn test_unknown_method_is_501_without_error() {
        let dir = TempDir::new().unwrap();
        let (exchange, out) = run(b"PUT /x HTTP/1.1\r\n\r\n", &router_for(dir.path()));
        assert!(out.starts_with("HTTP/1.1 501 Not Implemented\r\n"));
        assert!(exchange.error.is_none());
        assert_eq!(exchange.request.unwrap().method().as_str(), "PUT");
    }

    #[test]
    fn test_read_failure_is_500() {
        let dir = TempDir::new().unwrap();
        let mut reader = BufReader::new(FailingReader {
            prefix: Cursor::new(b"GET / HT".to_vec()),
        });
        let mut writer = ResponseWriter::new(Vec::new());
        let exchange = process(&mut reader, &mut writer, &router_for(dir.path()));

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert!(out.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        let error = exchange.error.unwrap();
        assert!(!error.is_client_error());
        assert!(error.is_peer_gone());
    }

    #[test]
    fn test_parse_io_error_maps_to_io() {
        let error = ConnectionError::from(ParseError::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            "timeout",
        )));
        assert!(matches!(error, ConnectionError::Io(_)));
        assert_eq!(error.status(), StatusCode::InternalServerError);
        assert_eq!(
            ConnectionError::from(ParseError::EmptyRequestLine).status(),
            StatusCode::BadRequest
        );
    }

    #[test]
    fn test_reject_busy_consumes_request_before_closing() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        client
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nUser-Agent: test\r\n\r\n")
            .unwrap();

        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_millis(50));
        reject_busy(stream);

        // Sin el descarte el cierre sería un RST y esta lectura fallaría
        let mut response = String::new();
        client.read_to_string(&mut response).unwrap();
        assert!(response.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
        assert!(response.ends_with("<h1>Error 503 Service Unavailable</h1></body></html>"));
    }

    #[test]
    fn test_drain_stops_at_eof() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        client.write_all(&[b'x'; 3000]).unwrap();
        drop(client);

        let (stream, _) = listener.accept().unwrap();
        assert_eq!(drain(&stream, Duration::from_secs(5)), 3000);
    }
}
