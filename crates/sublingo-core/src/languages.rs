use thiserror::Error;

/// Auto-detect pseudo language accepted as a source only.
pub const AUTO: &str = "auto";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub label: &'static str,
}

/// Languages the backend translates between, in the order the original
/// service advertises them. `auto` is listed first and is only valid as a
/// source.
pub const LANGUAGES: [Language; 22] = [
    Language { code: "auto", label: "Detect language" },
    Language { code: "en", label: "English" },
    Language { code: "vi", label: "Vietnamese" },
    Language { code: "zh", label: "Chinese" },
    Language { code: "zh-cn", label: "Chinese (Simplified)" },
    Language { code: "zh-tw", label: "Chinese (Traditional)" },
    Language { code: "ja", label: "Japanese" },
    Language { code: "ko", label: "Korean" },
    Language { code: "th", label: "Thai" },
    Language { code: "fr", label: "French" },
    Language { code: "de", label: "German" },
    Language { code: "es", label: "Spanish" },
    Language { code: "pt", label: "Portuguese" },
    Language { code: "ru", label: "Russian" },
    Language { code: "ar", label: "Arabic" },
    Language { code: "hi", label: "Hindi" },
    Language { code: "id", label: "Indonesian" },
    Language { code: "it", label: "Italian" },
    Language { code: "nl", label: "Dutch" },
    Language { code: "pl", label: "Polish" },
    Language { code: "tr", label: "Turkish" },
    Language { code: "uk", label: "Ukrainian" },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairError {
    #[error("target language is required")]
    MissingTarget,
    #[error("unknown source language '{code}'")]
    UnknownSource { code: String },
    #[error("unknown target language '{code}'")]
    UnknownTarget { code: String },
    #[error("target language cannot be '{AUTO}'")]
    AutoTarget,
    #[error("source and target languages are both '{code}'")]
    SameLanguage { code: String },
}

pub fn is_known(code: &str) -> bool {
    LANGUAGES.iter().any(|language| language.code == code)
}

pub fn label_for(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|language| language.code == code)
        .map(|language| language.label)
}

/// Validates a launchable source/target pair. Translating a language into
/// itself is rejected here, before any request is issued.
pub fn validate_pair(source: &str, target: &str) -> Result<(), PairError> {
    if !is_known(source) {
        return Err(PairError::UnknownSource {
            code: source.to_string(),
        });
    }

    if target.is_empty() {
        return Err(PairError::MissingTarget);
    }

    if target == AUTO {
        return Err(PairError::AutoTarget);
    }

    if !is_known(target) {
        return Err(PairError::UnknownTarget {
            code: target.to_string(),
        });
    }

    if source == target {
        return Err(PairError::SameLanguage {
            code: source.to_string(),
        });
    }

    Ok(())
}
