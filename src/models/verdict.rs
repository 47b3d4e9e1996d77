use serde::{Deserialize, Deserializer, Serialize};

/// Comment used when the model leaves the greeting out.
pub const PLACEHOLDER_COMMENT: &str = "no message";

/// Message posted when Mt. Fuji is not visible.
pub const NO_FUJI_MESSAGE: &str = "Maybe no Mt. Fuji today...";

/// Structured answer from the vision model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerdictPayload {
    #[serde(default, deserialize_with = "null_as_false")]
    pub found_mt_fuji: bool,

    #[serde(
        rename = "attractive_greeting_for_employees_to_come_office_seeing_the_image",
        default = "placeholder_comment",
        deserialize_with = "null_as_placeholder"
    )]
    pub comment: String,
}

fn placeholder_comment() -> String {
    PLACEHOLDER_COMMENT.to_string()
}

// Models emit `null` for fields they have nothing to say about.
fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn null_as_placeholder<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(placeholder_comment))
}

impl VerdictPayload {
    /// Text to post alongside the photo.
    pub fn message(&self) -> &str {
        if self.found_mt_fuji {
            &self.comment
        } else {
            NO_FUJI_MESSAGE
        }
    }
}
