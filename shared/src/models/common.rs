//! Value types embedded in many documents

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One language variant of a display name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NameX {
    /// Language code, e.g. `th`, `en`
    #[serde(default)]
    #[validate(length(max = 10))]
    pub code: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,
    #[serde(default)]
    pub isauto: bool,
    #[serde(default)]
    pub isdelete: bool,
}

impl NameX {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            isauto: false,
            isdelete: false,
        }
    }
}

/// Keeps only the names whose language code matches `lang`
pub fn retain_lang(names: &mut Vec<NameX>, lang: &str) {
    names.retain(|n| n.code.eq_ignore_ascii_case(lang));
}

/// Activity feed for one module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastActivity<N, R> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<Vec<N>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove: Option<Vec<R>>,
}

impl<N, R> Default for LastActivity<N, R> {
    fn default() -> Self {
        Self {
            new: None,
            remove: None,
        }
    }
}

/// Outcome of a bulk import, identities grouped by what happened to them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkImport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub update_failed: Vec<String>,
    pub payload_duplicate: Vec<String>,
}
