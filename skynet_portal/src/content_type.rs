//! Content types of uploaded files.

use std::path::Path;

/// Number of leading bytes handed to [`ContentTypeResolver::resolve`].
pub const SNIFF_LEN: usize = 512;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Decides the `Content-Type` of a file part in an upload.
pub trait ContentTypeResolver: std::fmt::Debug + Send + Sync {
    /// `head` holds up to [`SNIFF_LEN`] leading bytes of the file.
    fn resolve(&self, file_name: &str, head: &[u8]) -> String;
}

/// Looks at the file extension first and falls back to sniffing the
/// leading bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContentTypeResolver;

impl ContentTypeResolver for DefaultContentTypeResolver {
    fn resolve(&self, file_name: &str, head: &[u8]) -> String {
        by_extension(file_name)
            .unwrap_or_else(|| sniff(head))
            .to_owned()
    }
}

pub fn by_extension(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/vnd.microsoft.icon",
        "avif" => "image/avif",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => return None,
    };
    Some(mime)
}

/// Guesses the content type from the leading bytes of a file.
pub fn sniff(head: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b\x08", "application/x-gzip"),
        (b"\x00asm", "application/wasm"),
        (b"ID3", "audio/mpeg"),
        (b"OggS\x00", "application/ogg"),
        (b"wOFF", "font/woff"),
        (b"wOF2", "font/woff2"),
    ];

    let head = &head[..head.len().min(SNIFF_LEN)];
    if let Some((_, mime)) = SIGNATURES.iter().find(|(sig, _)| head.starts_with(sig)) {
        return *mime;
    }
    if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        return "image/webp";
    }

    let text = head.trim_ascii_start();
    for tag in [&b"<!doctype html"[..], b"<html", b"<head", b"<body"] {
        if text.len() >= tag.len() && text[..tag.len()].eq_ignore_ascii_case(tag) {
            return "text/html; charset=utf-8";
        }
    }
    if text.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }
    if !head.iter().any(|&b| is_binary(b)) {
        return "text/plain; charset=utf-8";
    }
    OCTET_STREAM
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}
