//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Un thread acepta conexiones y las entrega al pool; nunca procesa requests.
//! Cada worker atiende una conexión completa y la cierra.
//!
//! Con `QueueCapacity > 0` la cola es acotada: si está llena, el propio
//! accept loop responde 503 y cierra.

use crate::config::ServerConfig;
use crate::router::Router;
use crate::server::connection;
use crate::server::pool::{QueueFull, WorkerPool};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;

/// Servidor HTTP/1.1 de archivos estáticos
pub struct Server {
    config: Arc<ServerConfig>,
    listener: TcpListener,
}

impl Server {
    /// Abre el socket de escucha en `host:port`
    pub fn bind(config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(config.address())?;
        Ok(Self {
            config: Arc::new(config),
            listener,
        })
    }

    /// Dirección efectiva (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Acepta conexiones indefinidamente
    pub fn run(self) -> io::Result<()> {
        let router = Arc::new(Router::new(Arc::clone(&self.config)));
        let pool = WorkerPool::new(
            self.config.max_threads,
            self.config.queue_capacity,
            move |stream: TcpStream| connection::handle_connection(stream, &router),
        )?;

        tracing::info!(
            address = %self.local_addr()?,
            workers = pool.size(),
            "servidor escuchando"
        );

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(QueueFull(stream)) = pool.submit(stream) {
                        connection::reject_busy(stream);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "error al aceptar conexión");
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Read, Write};
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_serves_over_tcp() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "ok").unwrap();

        let mut config = ServerConfig::for_root(dir.path()).unwrap();
        config.port = 0;
        let server = Server::bind(config).unwrap();
        let addr = server.local_addr().unwrap();
        thread::spawn(move || server.run());

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 2\r\n\r\nok"
        );
    }

    #[test]
    fn test_bind_failure_is_error() {
        let dir = TempDir::new().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();

        let mut config = ServerConfig::for_root(dir.path()).unwrap();
        config.port = taken.local_addr().unwrap().port();
        assert!(Server::bind(config).is_err());
    }
}
