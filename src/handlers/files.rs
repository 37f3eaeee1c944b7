//! # GET / HEAD
//! src/handlers/files.rs
//!
//! Sirve archivos del document root.
//!
//! - Traversal fuera del root → 403
//! - Inexistente o directorio → 404 (el cliente no ve la diferencia)
//! - Archivo regular → 200 con el Content-Type inferido
//!
//! El modo de transferencia lo decide el header `Transfer-Encoding: chunked`
//! **del request**: si el cliente lo manda en un GET, la respuesta va
//! chunked; si no, con `Content-Length`. HEAD siempre usa `Content-Length`
//! y nunca envía body.

use crate::config::ServerConfig;
use crate::http::{Framing, Request, Response, ResponseWriter, StatusCode};
use crate::resolver::{resolve, ResolveError};
use std::fs::File;
use std::io::{self, Read, Write};

/// Handler para GET
pub fn get_handler<W: Write>(
    req: &Request,
    config: &ServerConfig,
    writer: &mut ResponseWriter<W>,
) -> io::Result<()> {
    serve_file(req.target(), config, writer, true, req.wants_chunked())
}

/// Handler para HEAD: mismo head que GET, sin body
pub fn head_handler<W: Write>(
    req: &Request,
    config: &ServerConfig,
    writer: &mut ResponseWriter<W>,
) -> io::Result<()> {
    serve_file(req.target(), config, writer, false, false)
}

fn serve_file<W: Write>(
    target: &str,
    config: &ServerConfig,
    writer: &mut ResponseWriter<W>,
    send_body: bool,
    chunked: bool,
) -> io::Result<()> {
    let resolved = match resolve(target, &config.root_directory, &config.default_page) {
        Ok(resolved) => resolved,
        Err(ResolveError::Forbidden(_)) => {
            return writer.send(&Response::error(StatusCode::Forbidden), send_body);
        }
    };

    if !resolved.is_file() {
        return writer.send(&Response::error(StatusCode::NotFound), send_body);
    }

    // El archivo pudo desaparecer entre la clasificación y el open
    let file = match File::open(resolved.path()) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return writer.send(&Response::error(StatusCode::NotFound), send_body);
        }
        Err(e) => return Err(e),
    };
    let length = file.metadata()?.len();

    let framing = if chunked {
        Framing::Chunked
    } else {
        Framing::Length(length)
    };
    writer.write_head(StatusCode::Ok, resolved.content_type(), framing)?;

    if send_body {
        // Nunca más bytes que el Content-Length anunciado
        writer.copy_body(file.take(length), framing)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ServerConfig) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Hola</h1>").unwrap();
        fs::write(dir.path().join("existing.txt"), "some text").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let config = ServerConfig::for_root(dir.path()).unwrap();
        (dir, config)
    }

    fn run(raw: &[u8], config: &ServerConfig) -> String {
        let request = Request::parse(raw).unwrap();
        let mut writer = ResponseWriter::new(Vec::new());
        match request.method() {
            crate::http::Method::HEAD => head_handler(&request, config, &mut writer).unwrap(),
            _ => get_handler(&request, config, &mut writer).unwrap(),
        }
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_get_default_page() {
        let (_dir, config) = setup();
        let text = run(b"GET / HTTP/1.1\r\n\r\n", &config);

        assert_eq!(
            text,
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\n\r\n<h1>Hola</h1>"
        );
    }

    #[test]
    fn test_get_missing_and_directory() {
        let (_dir, config) = setup();
        let missing = run(b"GET /absent.txt HTTP/1.1\r\n\r\n", &config);
        assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"));
        let directory = run(b"GET /sub HTTP/1.1\r\n\r\n", &config);
        assert!(directory.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[test]
    fn test_get_traversal() {
        let (_dir, config) = setup();
        let text = run(b"GET /../secret.txt HTTP/1.1\r\n\r\n", &config);
        assert!(text.starts_with("HTTP/1.1 403 Forbidden\r\n"));
    }

    #[test]
    fn test_get_chunked_when_client_asks() {
        let (_dir, config) = setup();
        let text = run(
            b"GET /existing.txt HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n",
            &config,
        );

        assert_eq!(
            text,
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\n\r\n\
             9\r\nsome text\r\n0\r\n\r\n"
        );
    }

    #[test]
    fn test_head_matches_get_head() {
        let (_dir, config) = setup();
        let get = run(b"GET /existing.txt HTTP/1.1\r\n\r\n", &config);
        let head = run(
            b"HEAD /existing.txt HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n",
            &config,
        );

        assert!(get.ends_with("\r\n\r\nsome text"));
        assert_eq!(head, get.trim_end_matches("some text"));
    }

    #[test]
    fn test_head_error_has_no_body() {
        let (_dir, config) = setup();
        let text = run(b"HEAD /absent.txt HTTP/1.1\r\n\r\n", &config);

        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
