use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::ImageFormat;

use crate::diagnostics;
use crate::document::Node;
use crate::value::HEX_BYTES;

/// Where the pixels of an `image` element come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Hex-encoded bytes in a `data` child. `format` is `None` when neither
    /// the `format` attribute nor the magic bytes identify the encoding.
    Inline {
        bytes: Vec<u8>,
        format: Option<ImageFormat>,
    },
    /// A base64 `data:` URI in `init_from`.
    DataUri { bytes: Vec<u8>, mime: String },
    /// A file reference in `init_from`, `%20` already decoded.
    Path(String),
}

impl ImageSource {
    /// Reads the source of an `image` element; `None` when it declares no
    /// usable data.
    #[must_use]
    pub fn from_image(image: &Node<'_>) -> Option<Self> {
        if let Some(bytes) = image.child_value("data", &HEX_BYTES) {
            let format = image
                .attr("format")
                .and_then(ImageFormat::from_extension)
                .or_else(|| image::guess_format(&bytes).ok());
            return Some(ImageSource::Inline { bytes, format });
        }

        let init_from = image.child("init_from").text().filter(|s| !s.is_empty())?;
        if let Some(uri) = init_from.strip_prefix("data:") {
            return Self::from_data_uri(uri);
        }
        Some(ImageSource::Path(decode_path(init_from)))
    }

    /// Parses the part of a `data:` URI after the scheme.
    fn from_data_uri(uri: &str) -> Option<Self> {
        let Some((header, payload)) = uri.split_once(',') else {
            diagnostics::unresolved("init_from", "data URI without payload");
            return None;
        };
        let Some(mime) = header.strip_suffix(";base64") else {
            diagnostics::unsupported("init_from", format_args!("data URI encoding '{header}'"));
            return None;
        };
        match BASE64.decode(payload.trim()) {
            Ok(bytes) => Some(ImageSource::DataUri {
                bytes,
                mime: mime.to_string(),
            }),
            Err(e) => {
                diagnostics::unresolved("init_from", format_args!("bad base64 payload: {e}"));
                None
            }
        }
    }

    /// Encoding hint for in-memory sources.
    #[must_use]
    pub fn format(&self) -> Option<ImageFormat> {
        match self {
            ImageSource::Inline { format, .. } => *format,
            ImageSource::DataUri { bytes, mime } => ImageFormat::from_mime_type(mime)
                .or_else(|| image::guess_format(bytes).ok()),
            ImageSource::Path(path) => ImageFormat::from_path(path).ok(),
        }
    }
}

/// Strips a `file://` scheme and decodes `%20`.
fn decode_path(raw: &str) -> String {
    let raw = raw.strip_prefix("file://").unwrap_or(raw);
    // `file:///C:/x` keeps a leading slash before the drive letter.
    let raw = match raw.as_bytes() {
        [b'/', drive, b':', ..] if drive.is_ascii_alphabetic() => &raw[1..],
        _ => raw,
    };
    raw.replace("%20", " ")
}

/// Files tried for a path source, in order: the path as written, the path
/// under the document folder, the bare file name under the document folder,
/// the bare file name, then the bare file name under each texture base.
#[must_use]
pub fn path_candidates(path: &str, document_folder: Option<&Path>, texture_bases: &[PathBuf]) -> Vec<PathBuf> {
    let written = PathBuf::from(path.replace('\\', "/"));
    let file_name = written.file_name().map(PathBuf::from);

    let mut out: Vec<PathBuf> = vec![written.clone()];
    if let Some(folder) = document_folder {
        out.push(folder.join(&written));
        if let Some(name) = &file_name {
            out.push(folder.join(name));
        }
    }
    if let Some(name) = &file_name {
        out.push(name.clone());
        out.extend(texture_bases.iter().map(|base| base.join(name)));
    }

    let mut unique = Vec::with_capacity(out.len());
    for candidate in out {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}
