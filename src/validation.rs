// src/validation.rs
use crate::errors::StylizeError;
use crate::models::{Credential, GenerateBody, GenerationRequest, Quality};
use base64::{Engine as _, engine::general_purpose};
use serde_json::{Map, Value};

const MISSING_FIELD: &str = "Image or key is missing";

// Enough base64 for `image::guess_format` to see any magic number.
const SNIFF_CHARS: usize = 64;

/// Turns a raw request body into a `GenerationRequest`. Runs before any
/// stream is opened or remote service is contacted.
pub fn parse_request(body: &[u8]) -> Result<GenerationRequest, StylizeError> {
    // serde messages echo offending values, which may be the caller's key,
    // so only the position is reported.
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        StylizeError::Validation(format!(
            "Invalid request body (line {} column {})",
            e.line(),
            e.column()
        ))
    })?;
    let Some(object) = value.as_object() else {
        return Err(StylizeError::Validation(MISSING_FIELD.to_string()));
    };

    let body = GenerateBody {
        image: string_field(object, "image")?,
        key: string_field(object, "key")?,
        style: string_field(object, "style")?,
        system_prompt: string_field(object, "systemPrompt")?,
        is_hd: match object.get("isHD") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(_) => return Err(wrong_type("isHD")),
        },
    };
    validate(body)
}

pub fn validate(body: GenerateBody) -> Result<GenerationRequest, StylizeError> {
    let image_data = required(body.image, "image")?;
    let key = required(body.key, "key")?;
    let style = required(body.style, "style")?;

    check_image(&image_data)?;

    Ok(GenerationRequest {
        image_data,
        credential: Credential::new(key),
        style,
        system_prompt: body.system_prompt.filter(|p| !p.trim().is_empty()),
        quality: Quality::from_hd_flag(body.is_hd.unwrap_or(false)),
    })
}

fn string_field(object: &Map<String, Value>, field: &str) -> Result<Option<String>, StylizeError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.clone())),
        Some(_) => Err(wrong_type(field)),
    }
}

fn wrong_type(field: &str) -> StylizeError {
    StylizeError::Validation(format!("Invalid request body: `{}` has the wrong type", field))
}

fn required(value: Option<String>, field: &str) -> Result<String, StylizeError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(StylizeError::Validation(format!(
            "{} (`{}` is required)",
            MISSING_FIELD, field
        ))),
    }
}

/// Accepts a base64 `data:` URI carrying a recognizable raster format, or a
/// plain http(s) URL the description service can fetch itself.
fn check_image(image: &str) -> Result<(), StylizeError> {
    if let Some(rest) = image.strip_prefix("data:") {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid_image("data URI has no payload"))?;
        if !header.ends_with(";base64") {
            return Err(invalid_image("data URI must be base64 encoded"));
        }

        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .take(SNIFF_CHARS)
            .collect();
        let prefix = if compact.len() < SNIFF_CHARS {
            compact.as_str()
        } else {
            &compact[..SNIFF_CHARS - SNIFF_CHARS % 4]
        };
        let bytes = general_purpose::STANDARD
            .decode(prefix)
            .map_err(|e| invalid_image(&format!("payload is not valid base64: {}", e)))?;
        image::guess_format(&bytes)
            .map_err(|e| invalid_image(&format!("unrecognized image format: {}", e)))?;
        return Ok(());
    }

    if image.starts_with("https://") || image.starts_with("http://") {
        return Ok(());
    }

    Err(invalid_image("expected a data URI or an http(s) URL"))
}

fn invalid_image(reason: &str) -> StylizeError {
    StylizeError::Validation(format!("Invalid image: {}", reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Just the PNG signature, enough for format sniffing.
    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn complete_body_is_accepted() {
        let request = parse_request(
            br#"{"image":"data:image/png;base64,iVBORw0KGgo=","key":"k","style":"anime","isHD":true}"#,
        )
        .unwrap();

        assert_eq!(request.image_data, PNG_URI);
        assert_eq!(request.style, "anime");
        assert_eq!(request.quality, Quality::Hd);
        assert!(request.system_prompt.is_none());
    }

    #[test]
    fn quality_defaults_to_standard() {
        let request = validate(GenerateBody {
            image: Some("https://example.com/cat.jpg".to_string()),
            key: Some("k".to_string()),
            style: Some("lego".to_string()),
            system_prompt: Some("   ".to_string()),
            is_hd: None,
        })
        .unwrap();

        assert_eq!(request.quality, Quality::Standard);
        assert!(request.system_prompt.is_none());
    }

    #[test]
    fn each_required_field_is_named_when_missing() {
        for (field, body) in [
            ("image", r#"{"key":"k","style":"anime"}"#),
            ("key", r#"{"image":"https://x/y.png","style":"anime"}"#),
            ("style", r#"{"image":"https://x/y.png","key":"k","style":""}"#),
        ] {
            let err = parse_request(body.as_bytes()).unwrap_err();
            let message = err.to_string();
            assert!(message.contains("Image or key is missing"), "{}", message);
            assert!(message.contains(field), "{}", message);
        }
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        let err = parse_request(b"{not json").unwrap_err();
        assert!(matches!(err, StylizeError::Validation(_)));
    }

    #[test]
    fn style_is_not_checked_against_the_registry_here() {
        let request = validate(GenerateBody {
            image: Some(PNG_URI.to_string()),
            key: Some("k".to_string()),
            style: Some("unknown-style".to_string()),
            ..Default::default()
        });
        assert!(request.is_ok());
    }

    #[test]
    fn bad_images_are_rejected() {
        for image in [
            "data:image/png,rawbytes",
            "data:image/png;base64,@@@",
            "data:text/plain;base64,aGVsbG8gd29ybGQ=",
            "ftp://example.com/cat.png",
        ] {
            let err = check_image(image).unwrap_err();
            assert!(err.to_string().starts_with("Invalid image"), "{}", image);
        }
    }

    #[test]
    fn wrong_typed_key_is_never_echoed() {
        let err = parse_request(
            br#"{"image":"https://x/y.png","key":987654321,"style":"anime"}"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(!message.contains("987654321"), "{}", message);
        assert!(message.contains("`key`"), "{}", message);

        let err = parse_request(br#"{"image":"https://x/y.png","key":"sk-live-123"#).unwrap_err();
        assert!(!err.to_string().contains("sk-live-123"));
    }

    #[test]
    fn null_and_non_object_bodies_count_as_missing_fields() {
        for body in ["null", "[]", "\"image\"", "42"] {
            let err = parse_request(body.as_bytes()).unwrap_err();
            assert_eq!(err.to_string(), "Image or key is missing", "{}", body);
        }
    }

    #[test]
    fn line_wrapped_base64_is_accepted() {
        assert!(check_image("data:image/png;base64,iVBORw0K\nGgo=").is_ok());
        assert!(check_image("data:image/png;base64, iVBORw0KGgo=\r\n").is_ok());
    }

    #[test]
    fn only_the_head_of_a_large_payload_is_decoded() {
        let image = format!(
            "data:image/png;base64,iVBORw0KGgo{}!!not-base64!!",
            "A".repeat(SNIFF_CHARS)
        );
        assert!(check_image(&image).is_ok());
    }
}
