//! Error types for the form engine

/// Form engine failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// Submitted name was not produced by [`crate::FieldKey::encode`]
    #[error("could not decode key \"{key}\"")]
    Decode { key: String },
}

impl FormError {
    /// Create decode error for key
    pub fn decode(key: impl Into<String>) -> Self {
        Self::Decode { key: key.into() }
    }
}
