//! # POST
//! src/handlers/form.rs
//!
//! El body se interpreta como `application/x-www-form-urlencoded` y se
//! devuelve una página HTML con los pares recibidos, en orden.

use crate::config::ServerConfig;
use crate::http::{Request, Response, ResponseWriter};
use std::io::{self, Write};

/// Handler para POST
///
/// # Ejemplo de response
/// ```html
/// <ul><li>name: Alice</li><li>age: 30</li></ul>
/// ```
pub fn post_handler<W: Write>(
    req: &Request,
    _config: &ServerConfig,
    writer: &mut ResponseWriter<W>,
) -> io::Result<()> {
    let body = String::from_utf8_lossy(req.body());
    let items = parse_form(&body);
    writer.send(&Response::html(&render_form_page(&items)), true)
}

/// Separa por `&` y cada item por su `=`. Items sin exactamente un `=` se descartan.
pub fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|item| item.matches('=').count() == 1)
        .filter_map(|item| item.split_once('='))
        .map(|(key, value)| (decode_component(key), decode_component(value)))
        .collect()
}

/// Página de respuesta del formulario
pub fn render_form_page(items: &[(String, String)]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html><html><head><title>Form Submission Response</title></head>\
         <body><h1>Form Submission Response</h1><p>Form data received:</p><ul>",
    );
    for (key, value) in items {
        html.push_str("<li>");
        html.push_str(&escape_html(key));
        html.push_str(": ");
        html.push_str(&escape_html(value));
        html.push_str("</li>");
    }
    html.push_str("</ul></body></html>");
    html
}

/// `+` es espacio y `%XX` se decodifica; si el resultado no es UTF-8 se deja crudo
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_in_order() {
        assert_eq!(
            parse_form("name=Alice&age=30"),
            pairs(&[("name", "Alice"), ("age", "30")])
        );
    }

    #[test]
    fn test_malformed_items_dropped() {
        assert_eq!(
            parse_form("flag&name=Alice&a=b=c&&age=30"),
            pairs(&[("name", "Alice"), ("age", "30")])
        );
    }

    #[test]
    fn test_empty_key_or_value_kept() {
        assert_eq!(parse_form("=x&y="), pairs(&[("", "x"), ("y", "")]));
    }

    #[test]
    fn test_empty_body() {
        assert!(parse_form("").is_empty());
    }

    #[test]
    fn test_decoding() {
        assert_eq!(
            parse_form("full+name=Ada%20Lovelace&sym=%26%3D"),
            pairs(&[("full name", "Ada Lovelace"), ("sym", "&=")])
        );
    }

    #[test]
    fn test_render_escapes_html() {
        let html = render_form_page(&pairs(&[("x", "<script>")]));
        assert!(html.contains("<li>x: &lt;script&gt;</li>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_post_handler_response() {
        let request =
            Request::parse(
                b"POST /form HTTP/1.1\r\nContent-Length: 22\r\n\r\nname=Alice&flag&age=30",
            )
                .unwrap();
        let config = ServerConfig::for_root("/srv/www").unwrap();
        let mut writer = ResponseWriter::new(Vec::new());
        post_handler(&request, &config, &mut writer).unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let body = text.split_once("\r\n\r\n").unwrap().1;
        assert!(text.starts_with("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n"));
        assert!(text.contains(&format!("Content-Length: {}\r\n", body.len())));

        let alice = body.find("<li>name: Alice</li>").unwrap();
        let age = body.find("<li>age: 30</li>").unwrap();
        assert!(alice < age);
        assert!(!body.contains("flag"));
    }
}
