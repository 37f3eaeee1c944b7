//! # Static HTTP Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo de archivos estáticos: una conexión por
//! request, un pool fijo de workers y solo std para la red.
//!
//! ## Arquitectura
//!
//! - `config`: archivo de propiedades + overrides de CLI
//! - `http`: parsing del request y escritura de la respuesta (plana o chunked)
//! - `resolver`: target → path dentro del document root (traversal guard)
//! - `router`: despacho por método
//! - `handlers`: GET/HEAD, POST y TRACE
//! - `server`: listener, pool de workers, conexión y access log
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use clap::Parser;
//! use static_http::config::{Cli, ServerConfig};
//! use static_http::server::Server;
//!
//! let config = ServerConfig::from_cli(&Cli::parse()).unwrap();
//! let server = Server::bind(config).unwrap();
//! server.run().unwrap();
//! ```

pub mod config;
pub mod handlers;
pub mod http;
pub mod resolver;
pub mod router;
pub mod server;
