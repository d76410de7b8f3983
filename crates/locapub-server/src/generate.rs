//! Deterministic stand-in for the content generation service.
//!
//! Text is derived from the brief; image and audio are fixed placeholder
//! files so the client's media handling can be exercised without a model.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use locapub_shared::protocol::GenerateRequest;
use locapub_shared::SupportKind;

use crate::error::ServerError;

/// 1x1 transparent PNG.
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

/// ID3v2 header followed by a single silent MPEG frame header.
const PLACEHOLDER_MP3: &[u8] = &[
    0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xfb, 0x90, 0x64, 0x00, 0x00,
];

/// Generation payload for `request`: plain text, or base64 for media.
pub fn generate(request: &GenerateRequest) -> Result<String, ServerError> {
    let title = request.title.trim();
    let description = request.description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(ServerError::BadRequest(
            "Le titre et la description sont obligatoires.".into(),
        ));
    }

    match request.kind {
        SupportKind::Text => Ok(format!("{title}\n\n{description}")),
        SupportKind::Image => Ok(STANDARD.encode(PLACEHOLDER_PNG)),
        SupportKind::Audio => Ok(STANDARD.encode(PLACEHOLDER_MP3)),
        SupportKind::Unknown => Err(ServerError::BadRequest(
            "Type de support non pris en charge.".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use locapub_shared::content;

    use super::*;

    fn request(kind: SupportKind) -> GenerateRequest {
        GenerateRequest {
            title: "Soldes".into(),
            description: "Jusqu'à -50 %".into(),
            kind,
        }
    }

    #[test]
    fn text_echoes_brief() {
        assert_eq!(
            generate(&request(SupportKind::Text)).unwrap(),
            "Soldes\n\nJusqu'à -50 %"
        );
    }

    #[test]
    fn media_is_valid_base64() {
        let image = generate(&request(SupportKind::Image)).unwrap();
        assert_eq!(content::decoded_len(&image), Some(PLACEHOLDER_PNG.len()));
        let audio = generate(&request(SupportKind::Audio)).unwrap();
        assert_eq!(content::decoded_len(&audio), Some(PLACEHOLDER_MP3.len()));
    }

    #[test]
    fn unknown_kind_and_empty_brief_are_rejected() {
        assert!(generate(&request(SupportKind::Unknown)).is_err());
        let mut empty = request(SupportKind::Text);
        empty.title = "  ".into();
        assert!(matches!(generate(&empty), Err(ServerError::BadRequest(_))));
    }
}
