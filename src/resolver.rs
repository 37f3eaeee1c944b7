//! # Resolución de Paths
//! src/resolver.rs
//!
//! Traduce el target de un request a un archivo bajo el document root.
//!
//! ## Pasos
//!
//! 1. Quitar query string (`?…`) y fragmento (`#…`), decodificar `%XX`.
//! 2. `/` se reemplaza por `/<default_page>`.
//! 3. Quitar el `/` inicial, unir al document root y normalizar `.`/`..`
//!    de forma léxica (sin tocar el filesystem).
//! 4. **Traversal guard**: si el path normalizado no empieza con el document
//!    root normalizado, el request es `Forbidden`.
//! 5. Clasificar: archivo regular, directorio o inexistente.
//!
//! La comparación del paso 4 es por componentes (`Path::starts_with`), así
//! que `/srv/www-evil` no pasa por estar bajo `/srv/www`.

use path_clean::PathClean;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Content-Type cuando la extensión no dice nada
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Qué hay en el path resuelto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Missing,
}

/// Path absoluto garantizado dentro del document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    kind: FileKind,
    content_type: String,
}

impl ResolvedPath {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Content-Type inferido; solo tiene sentido para `FileKind::File`
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// El path normalizado sale del document root
    #[error("path escapes document root: {0}")]
    Forbidden(String),
}

/// Resuelve `target` contra `document_root` (que ya debe estar normalizado).
///
/// # Ejemplo
///
/// ```
/// use static_http::resolver::{resolve, ResolveError};
/// use std::path::Path;
///
/// let result = resolve("/../secret.txt", Path::new("/srv/www"), "index.html");
/// assert!(matches!(result, Err(ResolveError::Forbidden(_))));
/// ```
pub fn resolve(
    target: &str,
    document_root: &Path,
    default_page: &str,
) -> Result<ResolvedPath, ResolveError> {
    let path = normalize(target, document_root, default_page);

    if !path.starts_with(document_root) {
        return Err(ResolveError::Forbidden(target.to_string()));
    }

    let kind = match fs::metadata(&path) {
        Ok(metadata) if metadata.is_file() => FileKind::File,
        Ok(metadata) if metadata.is_dir() => FileKind::Directory,
        // Sockets, fifos y errores de acceso cuentan como inexistentes
        _ => FileKind::Missing,
    };
    let content_type = match kind {
        FileKind::File => probe_content_type(&path),
        _ => OCTET_STREAM.to_string(),
    };

    Ok(ResolvedPath {
        path,
        kind,
        content_type,
    })
}

/// Une y normaliza el target sin consultar el filesystem
fn normalize(target: &str, document_root: &Path, default_page: &str) -> PathBuf {
    let raw_path = target
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let decoded = urlencoding::decode(raw_path)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw_path.to_string());

    let decoded = if decoded == "/" {
        format!("/{}", default_page)
    } else {
        decoded
    };

    let relative = decoded.strip_prefix('/').unwrap_or(&decoded);
    // Si `relative` sigue siendo absoluto, `join` reemplaza el root y el guard lo rechaza
    document_root.join(relative).clean()
}

/// Content-Type según la extensión, `application/octet-stream` si no se conoce
pub fn probe_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
