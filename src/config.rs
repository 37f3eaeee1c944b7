//! # Configuración del Servidor
//! src/config.rs
//!
//! La configuración sale de un archivo de propiedades (`config.ini` por
//! defecto) leído una sola vez al arrancar. Después es inmutable y se
//! comparte entre workers como `Arc<ServerConfig>`.
//!
//! ## Archivo
//!
//! ```text
//! # config.ini
//! Port=8080
//! RootDirectory=/srv/www
//! DefaultPage=index.html
//! MaxThreads=10
//! ```
//!
//! Claves opcionales: `Host`, `QueueCapacity` (0 = sin límite),
//! `ReadTimeoutMs` (0 = sin timeout).
//!
//! ## Overrides
//!
//! Todo se puede pisar por CLI o variables de entorno; sin argumentos se usa
//! solo el archivo.
//!
//! ```bash
//! STATIC_HTTP_PORT=9090 ./static_http --root ./public
//! ```

use clap::Parser;
use path_clean::PathClean;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const KEY_PORT: &str = "Port";
pub const KEY_ROOT_DIRECTORY: &str = "RootDirectory";
pub const KEY_DEFAULT_PAGE: &str = "DefaultPage";
pub const KEY_MAX_THREADS: &str = "MaxThreads";
pub const KEY_HOST: &str = "Host";
pub const KEY_QUEUE_CAPACITY: &str = "QueueCapacity";
pub const KEY_READ_TIMEOUT_MS: &str = "ReadTimeoutMs";

const KNOWN_KEYS: [&str; 7] = [
    KEY_PORT,
    KEY_ROOT_DIRECTORY,
    KEY_DEFAULT_PAGE,
    KEY_MAX_THREADS,
    KEY_HOST,
    KEY_QUEUE_CAPACITY,
    KEY_READ_TIMEOUT_MS,
];

/// Errores al cargar o validar la configuración
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("invalid value for `{key}`: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Argumentos de línea de comandos (todos opcionales)
#[derive(Debug, Clone, Parser)]
#[command(name = "static_http")]
#[command(about = "Servidor HTTP/1.1 mínimo de archivos estáticos")]
#[command(version)]
pub struct Cli {
    /// Archivo de propiedades con la configuración
    #[arg(short, long, default_value = "config.ini", env = "STATIC_HTTP_CONFIG")]
    pub config: PathBuf,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, env = "STATIC_HTTP_PORT")]
    pub port: Option<u16>,

    /// Host/IP en el que escucha
    #[arg(long, env = "STATIC_HTTP_HOST")]
    pub host: Option<String>,

    /// Directorio raíz de los documentos
    #[arg(long = "root", env = "STATIC_HTTP_ROOT")]
    pub root_directory: Option<PathBuf>,

    /// Página servida para `/`
    #[arg(long, env = "STATIC_HTTP_DEFAULT_PAGE")]
    pub default_page: Option<String>,

    /// Tamaño del pool de workers
    #[arg(long, env = "STATIC_HTTP_MAX_THREADS")]
    pub max_threads: Option<usize>,

    /// Capacidad de la cola de conexiones (0 = sin límite)
    #[arg(long, env = "STATIC_HTTP_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Timeout de lectura por conexión en milisegundos (0 = sin timeout)
    #[arg(long, env = "STATIC_HTTP_READ_TIMEOUT_MS")]
    pub read_timeout_ms: Option<u64>,
}

impl Cli {
    /// Overrides como pares clave/valor del archivo de propiedades
    fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(port) = self.port {
            overrides.push((KEY_PORT, port.to_string()));
        }
        if let Some(host) = &self.host {
            overrides.push((KEY_HOST, host.clone()));
        }
        if let Some(root) = &self.root_directory {
            overrides.push((KEY_ROOT_DIRECTORY, root.display().to_string()));
        }
        if let Some(page) = &self.default_page {
            overrides.push((KEY_DEFAULT_PAGE, page.clone()));
        }
        if let Some(threads) = self.max_threads {
            overrides.push((KEY_MAX_THREADS, threads.to_string()));
        }
        if let Some(capacity) = self.queue_capacity {
            overrides.push((KEY_QUEUE_CAPACITY, capacity.to_string()));
        }
        if let Some(timeout) = self.read_timeout_ms {
            overrides.push((KEY_READ_TIMEOUT_MS, timeout.to_string()));
        }
        overrides
    }
}

/// Configuración del servidor, inmutable después del arranque
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host/IP en el que escucha
    pub host: String,

    /// Puerto en el que escucha
    pub port: u16,

    /// Document root absoluto y normalizado
    pub root_directory: PathBuf,

    /// Página servida para `/`
    pub default_page: String,

    /// Número de workers
    pub max_threads: usize,

    /// Capacidad de la cola de conexiones pendientes (0 = sin límite)
    pub queue_capacity: usize,

    /// Timeout de lectura por conexión en milisegundos (0 = sin timeout)
    pub read_timeout_ms: u64,
}

impl ServerConfig {
    /// Configuración con valores por defecto sobre un document root.
    /// El root se vuelve absoluto y se normaliza.
    pub fn for_root(root: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            root_directory: absolute_root(root.as_ref())?,
            default_page: "index.html".to_string(),
            max_threads: 4,
            queue_capacity: 0,
            read_timeout_ms: 0,
        })
    }

    /// Carga el archivo indicado por la CLI y aplica los overrides.
    ///
    /// Un archivo inexistente no es error si la CLI aporta las claves requeridas.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut properties = match fs::read_to_string(&cli.config) {
            Ok(text) => parse_properties(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %cli.config.display(),
                    "archivo de configuración no encontrado"
                );
                HashMap::new()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: cli.config.clone(),
                    source,
                })
            }
        };

        for (key, value) in cli.overrides() {
            properties.insert(key.to_string(), value);
        }

        Self::from_map(&properties)
    }

    /// Construye la configuración desde el texto de un archivo de propiedades
    ///
    /// # Ejemplo
    /// ```
    /// use static_http::config::ServerConfig;
    ///
    /// let config = ServerConfig::from_properties(
    ///     "Port=9000\nRootDirectory=/srv/www\nDefaultPage=index.html\nMaxThreads=8\n",
    /// ).unwrap();
    /// assert_eq!(config.port, 9000);
    /// assert_eq!(config.max_threads, 8);
    /// ```
    pub fn from_properties(text: &str) -> Result<Self, ConfigError> {
        Self::from_map(&parse_properties(text))
    }

    fn from_map(properties: &HashMap<String, String>) -> Result<Self, ConfigError> {
        for key in properties.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = %key, "clave de configuración desconocida, se ignora");
            }
        }

        let root = required(properties, KEY_ROOT_DIRECTORY)?;
        let root_directory =
            absolute_root(Path::new(root)).map_err(|_| ConfigError::InvalidValue {
                key: KEY_ROOT_DIRECTORY,
                value: root.to_string(),
            })?;

        let config = Self {
            host: properties
                .get(KEY_HOST)
                .cloned()
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_value(KEY_PORT, required(properties, KEY_PORT)?)?,
            root_directory,
            default_page: required(properties, KEY_DEFAULT_PAGE)?.to_string(),
            max_threads: parse_value(KEY_MAX_THREADS, required(properties, KEY_MAX_THREADS)?)?,
            queue_capacity: optional(properties, KEY_QUEUE_CAPACITY)?.unwrap_or(0),
            read_timeout_ms: optional(properties, KEY_READ_TIMEOUT_MS)?.unwrap_or(0),
        };
        config.validate()?;
        Ok(config)
    }

    /// Obtiene la dirección completa para bind (host:port)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeout de lectura, si está configurado
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_threads == 0 {
            return Err(ConfigError::Invalid("MaxThreads must be >= 1".to_string()));
        }
        if self.default_page.trim().is_empty() {
            return Err(ConfigError::Invalid("DefaultPage must not be empty".to_string()));
        }
        if self.default_page.contains('/') || self.default_page.contains('\\') {
            return Err(ConfigError::Invalid(
                "DefaultPage must be a file name, not a path".to_string(),
            ));
        }
        if !self.root_directory.is_absolute() {
            return Err(ConfigError::Invalid(
                "RootDirectory must resolve to an absolute path".to_string(),
            ));
        }
        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        tracing::info!(address = %self.address(), "red");
        tracing::info!(
            root = %self.root_directory.display(),
            default_page = %self.default_page,
            "documentos"
        );
        if self.queue_capacity > 0 {
            tracing::info!(
                workers = self.max_threads,
                queue_capacity = self.queue_capacity,
                "pool"
            );
        } else {
            tracing::info!(workers = self.max_threads, "pool (cola sin límite)");
        }
        if let Some(timeout) = self.read_timeout() {
            tracing::info!(timeout_ms = timeout.as_millis() as u64, "timeout de lectura");
        }
    }
}

/// Parsea formato de propiedades: `clave=valor` o `clave: valor`, comentarios `#`/`!`
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        // El separador es el primer '=' o ':'
        let (key, value) = match line.find(|c: char| c == '=' || c == ':') {
            Some(pos) => (&line[..pos], &line[pos + 1..]),
            None => (line, ""),
        };
        properties.insert(key.trim().to_string(), value.trim().to_string());
    }
    properties
}

fn required<'a>(
    properties: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    properties
        .get(key)
        .map(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingKey(key))
}

fn optional<T: std::str::FromStr>(
    properties: &HashMap<String, String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match properties.get(key) {
        Some(value) if !value.is_empty() => parse_value(key, value).map(Some),
        _ => Ok(None),
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Vuelve absoluto (relativo al directorio actual) y normaliza el root
fn absolute_root(root: &Path) -> io::Result<PathBuf> {
    let absolute = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()?.join(root)
    };
    Ok(absolute.clean())
}
