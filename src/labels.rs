use crate::engine::LabelSet;

pub const USERNAME_LABEL: &str = "username";

#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("invalid label `{0}`; expected exactly one `key:value` separator")]
    Malformed(String),
}

pub fn parse_labels(raw: &[String]) -> Result<LabelSet, LabelError> {
    let mut labels = LabelSet::new();
    for token in raw {
        let separators = token.matches(':').count();
        if separators != 1 {
            return Err(LabelError::Malformed(token.clone()));
        }
        let (key, value) = token
            .split_once(':')
            .ok_or_else(|| LabelError::Malformed(token.clone()))?;
        if key.trim().is_empty() {
            return Err(LabelError::Malformed(token.clone()));
        }
        labels.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(labels)
}

// The username entry is written last so user-supplied `username` labels
// never shadow the submitting identity.
pub fn with_username(mut labels: LabelSet, username: &str) -> LabelSet {
    labels.insert(USERNAME_LABEL.to_string(), username.to_string());
    labels
}
