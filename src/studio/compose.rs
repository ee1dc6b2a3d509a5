use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD},
    Engine as _,
};

use crate::{
    error::{Result, StudioError},
    gemini::{Content, GenerateContentRequest, GenerationConfig, ImageConfig, Part},
    models::{GenerationRequest, InlineImage, Workflow},
};

const DEFAULT_MIME: &str = "image/png";

const GENERATE_REINFORCEMENT: &str = "CRITICAL REQUIREMENTS:\n\
- If reference images are provided, preserve the exact design of the product shown in them: shape, colors, materials, logos and proportions must match.\n\
- Do not add any text, captions, watermarks or typography overlays to the image.";

const EDIT_REINFORCEMENT: &str = "CRITICAL REQUIREMENTS:\n\
- Preserve the facial identity of every person exactly: same face, features, skin tone and expression unless the instruction says otherwise.\n\
- Change only what the instruction asks for and keep everything else identical.\n\
- Do not add any text, captions, watermarks or typography overlays to the image.";

const FORMAT_REINFORCEMENT: &str = "CRITICAL REQUIREMENTS:\n\
- Preserve the exact design and composition of the source image; extend or reframe the background to fit the new aspect ratio instead of distorting or cropping the subject.\n\
- Do not add any text, captions, watermarks or typography overlays to the image.";

/// Constraint block restated after everything else for the given call site.
pub fn reinforcement(workflow: Workflow) -> &'static str {
    match workflow {
        Workflow::Generate => GENERATE_REINFORCEMENT,
        Workflow::Edit => EDIT_REINFORCEMENT,
        Workflow::Format => FORMAT_REINFORCEMENT,
    }
}

/// Parses `data:<mime>;base64,<payload>` into bytes.
///
/// Input without a `data:` prefix is taken as a bare base64 payload. An empty
/// MIME type falls back to `image/png`.
pub fn parse_data_url(input: &str) -> Result<InlineImage> {
    let input = input.trim();

    let (mime_type, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                StudioError::MalformedImageData("data URL has no ',' separator".into())
            })?;
            let header = header.strip_suffix(";base64").ok_or_else(|| {
                StudioError::MalformedImageData("data URL is not base64-encoded".into())
            })?;
            let mime_type = header.split(';').next().unwrap_or_default().trim();
            let mime_type = if mime_type.is_empty() {
                DEFAULT_MIME
            } else {
                mime_type
            };
            (mime_type, payload)
        }
        None => (DEFAULT_MIME, input),
    };

    if payload.trim().is_empty() {
        return Err(StudioError::MalformedImageData("empty image payload".into()));
    }

    let data = decode_lenient(payload)
        .map_err(|e| StudioError::MalformedImageData(e.to_string()))?;

    Ok(InlineImage::new(mime_type, data))
}

/// Accepts base64 with embedded whitespace or missing `=` padding.
fn decode_lenient(payload: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    match STANDARD.decode(&cleaned) {
        Ok(data) => Ok(data),
        Err(_) => STANDARD_NO_PAD.decode(&cleaned),
    }
}

pub fn parse_data_urls(inputs: &[String]) -> Result<Vec<InlineImage>> {
    inputs.iter().map(|input| parse_data_url(input)).collect()
}

/// Reference images first, in input order, then one text part carrying the
/// prompt and the workflow's reinforcement block.
pub fn compose(request: &GenerationRequest) -> Result<Vec<Part>> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() && request.reference_images.is_empty() {
        return Err(StudioError::InvalidRequest(
            "prompt must not be empty without reference images".into(),
        ));
    }

    let mut parts: Vec<Part> = request.reference_images.iter().map(Part::inline).collect();

    let closing = reinforcement(request.workflow);
    let text = if prompt.is_empty() {
        closing.to_string()
    } else {
        format!("{}\n\n{}", prompt, closing)
    };
    parts.push(Part::text(text));

    Ok(parts)
}

pub fn build_image_request(request: &GenerationRequest) -> Result<GenerateContentRequest> {
    Ok(GenerateContentRequest {
        contents: vec![Content::user(compose(request)?)],
        system_instruction: None,
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["IMAGE".to_string()],
            image_config: Some(ImageConfig {
                aspect_ratio: request.aspect_ratio.as_str().to_string(),
                image_size: request.resolution.as_str().to_string(),
            }),
            temperature: None,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, Resolution};

    #[test]
    fn test_parse_data_url_with_mime() {
        let image = parse_data_url("data:image/jpeg;base64,/9j/4AA=").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00]);
    }

    #[test]
    fn test_parse_data_url_defaults_mime() {
        let image = parse_data_url("data:;base64,AQID").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_raw_payload_passes_through_unchanged() {
        let raw = "iVBORw0KGgoAAAANSUhEUg==";
        let image = parse_data_url(raw).unwrap();
        assert_eq!(image.mime_type, "image/png");

        match Part::inline(&image) {
            Part::InlineData { inline_data } => assert_eq!(inline_data.data, raw),
            other => panic!("expected inline data, got {:?}", other),
        }
    }

    #[test]
    fn test_unpadded_and_wrapped_payloads_decode() {
        assert_eq!(parse_data_url("aGVsbG8").unwrap().data, b"hello");
        assert_eq!(parse_data_url("AQIDBA").unwrap().data, vec![1, 2, 3, 4]);
        assert_eq!(
            parse_data_url("AQID\nBAUG").unwrap().data,
            vec![1, 2, 3, 4, 5, 6]
        );
        assert_eq!(
            parse_data_url("data:image/png;base64,AQID\r\nBA").unwrap().data,
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_malformed_data_urls() {
        for input in [
            "data:image/png;base64,not base64!!",
            "data:image/png,plain-text",
            "data:image/png;base64",
            "data:image/png;base64,",
            "data:image/png;base64, \n ",
            "",
        ] {
            assert!(
                matches!(parse_data_url(input), Err(StudioError::MalformedImageData(_))),
                "{:?} should be malformed",
                input
            );
        }
    }

    #[test]
    fn test_single_prompt_composes_one_text_part() {
        let request = GenerationRequest::new("a red boxing glove on white background")
            .with_aspect_ratio(AspectRatio::Square);
        let parts = compose(&request).unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts.iter().filter(|p| p.is_inline_data()).count(), 0);
        let text = parts[0].as_text().unwrap();
        assert!(text.starts_with("a red boxing glove on white background"));
        assert!(text.ends_with(GENERATE_REINFORCEMENT));
    }

    #[test]
    fn test_reference_images_precede_text_in_input_order() {
        let images: Vec<InlineImage> = (0u8..3).map(|i| InlineImage::png(vec![i])).collect();
        let request = GenerationRequest::new("combine these").with_reference_images(images.clone());
        let parts = compose(&request).unwrap();

        assert_eq!(parts.len(), 4);
        for (part, image) in parts.iter().zip(&images) {
            assert_eq!(part, &Part::inline(image));
        }
        assert!(parts[3].as_text().is_some());
        // Input is left untouched.
        assert_eq!(request.reference_images, images);
    }

    #[test]
    fn test_empty_prompt_requires_reference_images() {
        assert!(matches!(
            compose(&GenerationRequest::new("   ")),
            Err(StudioError::InvalidRequest(_))
        ));

        let parts = compose(
            &GenerationRequest::new("").with_reference_images(vec![InlineImage::png(vec![7])]),
        )
        .unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].as_text(), Some(GENERATE_REINFORCEMENT));
    }

    #[test]
    fn test_workflow_selects_reinforcement() {
        let parts = compose(&GenerationRequest::new("make it night").with_workflow(Workflow::Edit))
            .unwrap();
        assert!(parts[0].as_text().unwrap().contains("facial identity"));

        let parts = compose(&GenerationRequest::new("reframe").with_workflow(Workflow::Format))
            .unwrap();
        assert!(parts[0].as_text().unwrap().contains("aspect ratio"));
    }

    #[test]
    fn test_build_image_request_carries_image_config() {
        let request = GenerationRequest::new("poster")
            .with_aspect_ratio(AspectRatio::Portrait)
            .with_resolution(Resolution::High);
        let body = build_image_request(&request).unwrap();
        let config = body.generation_config.unwrap();
        let image_config = config.image_config.unwrap();

        assert_eq!(config.response_modalities, vec!["IMAGE"]);
        assert_eq!(image_config.aspect_ratio, "9:16");
        assert_eq!(image_config.image_size, "2K");
        assert_eq!(body.contents.len(), 1);
        assert_eq!(body.contents[0].role.as_deref(), Some("user"));
    }
}
