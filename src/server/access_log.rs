//! # Access Log
//! src/server/access_log.rs
//!
//! Registro de cada intercambio request/response. Se invoca una sola vez por
//! conexión, después de escribir la respuesta; el parsing y el despacho no
//! hacen logging propio.

use crate::http::writer::SentHead;
use crate::http::{Framing, Request};
use crate::server::connection::ConnectionError;
use std::time::Duration;

/// Resultado de procesar una conexión
#[derive(Debug, Default)]
pub struct Exchange {
    /// Request parseado (None si no llegó o fue inválido)
    pub request: Option<Request>,

    /// Head enviado al cliente (None si no se respondió nada)
    pub head: Option<SentHead>,

    /// Bytes de body enviados
    pub body_bytes: u64,

    /// Fallo que terminó el intercambio, si lo hubo
    pub error: Option<ConnectionError>,

    /// El fallo llegó con la respuesta ya comprometida: la conexión se abandonó
    pub abandoned: bool,
}

impl Exchange {
    /// El peer cerró sin enviar nada
    pub fn is_empty(&self) -> bool {
        self.request.is_none() && self.head.is_none() && self.error.is_none()
    }
}

/// Emite los eventos de log de un intercambio
pub fn record(peer: &str, exchange: &Exchange, elapsed: Duration) {
    if exchange.is_empty() {
        tracing::debug!(peer, "conexión cerrada sin request");
        return;
    }

    if let Some(request) = &exchange.request {
        tracing::debug!(
            peer,
            request_line = %request.request_line(),
            headers = ?request.raw_headers(),
            "request recibido"
        );
    }

    let method = exchange
        .request
        .as_ref()
        .map(|r| r.method().as_str())
        .unwrap_or("-");
    let target = exchange
        .request
        .as_ref()
        .map(|r| r.target())
        .unwrap_or("-");
    let status = exchange
        .head
        .as_ref()
        .map(|head| head.status.as_u16())
        .unwrap_or(0);
    let framing = match exchange.head.as_ref().map(|head| head.framing) {
        Some(Framing::Chunked) => "chunked",
        Some(Framing::Length(_)) => "length",
        None => "-",
    };
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

    match &exchange.error {
        None => tracing::info!(
            peer,
            method,
            target,
            status,
            framing,
            bytes = exchange.body_bytes,
            elapsed_ms,
            "respuesta enviada"
        ),
        Some(error) if error.is_peer_gone() => tracing::warn!(
            peer,
            method,
            target,
            status,
            bytes = exchange.body_bytes,
            error = %error,
            "el cliente cerró la conexión"
        ),
        Some(error) if exchange.abandoned => tracing::error!(
            peer,
            method,
            target,
            status,
            bytes = exchange.body_bytes,
            error = %error,
            "conexión abandonada a mitad de la respuesta"
        ),
        Some(error) if error.is_client_error() => tracing::warn!(
            peer,
            method,
            target,
            status,
            error = %error,
            elapsed_ms,
            "request inválido"
        ),
        Some(error) => tracing::error!(
            peer,
            method,
            target,
            status,
            error = %error,
            elapsed_ms,
            "fallo procesando la conexión"
        ),
    }
}
