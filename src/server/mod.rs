//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! 1. `tcp`: escucha en un puerto y acepta conexiones
//! 2. `pool`: workers de tamaño fijo que consumen la cola de conexiones
//! 3. `connection`: parse → despacho → respuesta → cierre de cada conexión
//! 4. `access_log`: registro de cada intercambio, después de responder

pub mod access_log;
pub mod connection;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::ConnectionError;
pub use pool::WorkerPool;
pub use tcp::Server;
