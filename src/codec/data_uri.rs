use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{AdjustError, Result};

/// Split a `data:<mime>;base64,<payload>` URI into its mime type and bytes.
///
/// A bare base64 string (no `data:` prefix) is accepted too, with no mime.
pub fn parse_data_uri(uri: &str) -> Result<(Option<String>, Vec<u8>)> {
    let uri = uri.trim();
    let (mime, payload) = match uri.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| AdjustError::Decode("data URI has no payload".into()))?;
            let mut parts = header.split(';');
            let mime = parts.next().map(str::trim).filter(|m| !m.is_empty());
            if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
                return Err(AdjustError::Decode("data URI is not base64 encoded".into()));
            }
            (mime.map(str::to_ascii_lowercase), payload)
        }
        None => (None, uri),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AdjustError::Decode(format!("invalid base64: {e}")))?;
    Ok((mime, bytes))
}

pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_mime() {
        let (mime, bytes) = parse_data_uri("data:image/JPEG;base64,AAEC").unwrap();
        assert_eq!(mime.as_deref(), Some("image/jpeg"));
        assert_eq!(bytes, vec![0, 1, 2]);
    }

    #[test]
    fn test_parse_bare_base64() {
        let (mime, bytes) = parse_data_uri("AAEC").unwrap();
        assert_eq!(mime, None);
        assert_eq!(bytes, vec![0, 1, 2]);
    }

    #[test]
    fn test_rejects_non_base64_uri() {
        assert!(parse_data_uri("data:text/plain,hello").is_err());
        assert!(parse_data_uri("data:image/png;base64").is_err());
        assert!(parse_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_format_round_trip() {
        let uri = to_data_uri("image/png", &[9, 8, 7]);
        assert_eq!(uri, "data:image/png;base64,CQgH");
        assert_eq!(parse_data_uri(&uri).unwrap().1, vec![9, 8, 7]);
    }
}
