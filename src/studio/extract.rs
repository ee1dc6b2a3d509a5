use crate::{
    error::{Result, StudioError},
    gemini::GenerateContentResponse,
};

pub const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// First inline image of the first candidate, as a PNG data URL.
///
/// Later image parts are ignored. A response without any image is
/// `NoImageInResponse`, which the invoker retries like an overload.
pub fn extract_image(response: &GenerateContentResponse) -> Result<String> {
    let candidate = response.candidates.first();

    if let Some(reason) = candidate.and_then(|c| c.finish_reason.as_deref()) {
        if reason != "STOP" {
            log::debug!("Candidate finished with reason {}", reason);
        }
    }
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        log::warn!("Prompt feedback block reason: {}", reason);
    }

    candidate
        .and_then(|c| c.content.as_ref())
        .and_then(|content| {
            content
                .parts
                .iter()
                .find_map(|part| part.inline_data.as_ref().filter(|b| !b.data.is_empty()))
        })
        .map(|blob| format!("{}{}", DATA_URL_PREFIX, blob.data))
        .ok_or(StudioError::NoImageInResponse)
}

/// First non-empty text part of the first candidate.
pub fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}
