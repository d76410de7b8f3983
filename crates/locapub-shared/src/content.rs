//! Interpretation of support content per media type.
//!
//! Image and audio content travels as `data:<mime>;base64,<payload>`, text
//! content as the text itself.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::constants::{AUDIO_MIME, IMAGE_MIME};
use crate::types::{Support, SupportKind};

/// Wrap a generation payload into storable content for `kind`.
pub fn from_generated(kind: SupportKind, payload: &str) -> String {
    match kind {
        SupportKind::Image => data_uri(IMAGE_MIME, payload),
        SupportKind::Audio => data_uri(AUDIO_MIME, payload),
        SupportKind::Text | SupportKind::Unknown => payload.to_string(),
    }
}

pub fn data_uri(mime: &str, base64_payload: &str) -> String {
    format!("data:{mime};base64,{base64_payload}")
}

/// Split a base64 data URI into `(mime, payload)`.
pub fn split_data_uri(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    Some((mime, payload))
}

/// Size in bytes of a base64 payload, `None` if it is not valid base64.
pub fn decoded_len(base64_payload: &str) -> Option<usize> {
    STANDARD.decode(base64_payload.trim()).ok().map(|bytes| bytes.len())
}

/// How a support's content should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPreview<'a> {
    Image { mime: &'a str, payload: &'a str },
    Audio { mime: &'a str, payload: &'a str },
    Text(&'a str),
    /// Kind unknown, or media content that is not a data URI.
    Unsupported,
}

pub fn preview(support: &Support) -> ContentPreview<'_> {
    match support.kind {
        SupportKind::Text => ContentPreview::Text(&support.content),
        SupportKind::Image => match split_data_uri(&support.content) {
            Some((mime, payload)) => ContentPreview::Image { mime, payload },
            None => ContentPreview::Unsupported,
        },
        SupportKind::Audio => match split_data_uri(&support.content) {
            Some((mime, payload)) => ContentPreview::Audio { mime, payload },
            None => ContentPreview::Unsupported,
        },
        SupportKind::Unknown => ContentPreview::Unsupported,
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}
