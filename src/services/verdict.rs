use crate::models::verdict::VerdictPayload;

/// Parse the model's free-form answer into a verdict.
///
/// Takes the span from the first `{` to the last `}`, so prose or markdown
/// fences around the object are ignored. Missing fields fall back to their
/// defaults; anything that is not a JSON object is a [`VerdictError`].
pub fn parse_verdict(raw: &str) -> Result<VerdictPayload, VerdictError> {
    let object = extract_json_object(raw)?;
    serde_json::from_str(object).map_err(|source| VerdictError::InvalidJson {
        source,
        snippet: object.chars().take(200).collect(),
    })
}

fn extract_json_object(raw: &str) -> Result<&str, VerdictError> {
    let start = raw.find('{').ok_or(VerdictError::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(VerdictError::NoJsonObject)?;
    if end < start {
        return Err(VerdictError::NoJsonObject);
    }
    Ok(&raw[start..=end])
}

#[derive(Debug, thiserror::Error)]
pub enum VerdictError {
    #[error("Model response contains no JSON object")]
    NoJsonObject,

    #[error("Model response is not valid verdict JSON ({source}): {snippet}")]
    InvalidJson {
        source: serde_json::Error,
        snippet: String,
    },
}
