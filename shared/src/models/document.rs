//! Stored document envelope

use serde::{Deserialize, Serialize};

/// A business payload plus the bookkeeping every collection carries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub guidfixed: String,
    pub shopid: String,
    #[serde(flatten)]
    pub data: T,
    pub createdby: String,
    pub createdat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updatedby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updatedat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletedby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletedat: Option<i64>,
}

impl<T> Document<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Document<U> {
        Document {
            guidfixed: self.guidfixed,
            shopid: self.shopid,
            data: f(self.data),
            createdby: self.createdby,
            createdat: self.createdat,
            updatedby: self.updatedby,
            updatedat: self.updatedat,
            deletedby: self.deletedby,
            deletedat: self.deletedat,
        }
    }
}

/// Tombstone reported by the activity feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteActivity {
    pub guidfixed: String,
    pub shopid: String,
    pub deletedat: i64,
    pub deletedby: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Payload {
        code: String,
    }

    #[test]
    fn test_document_flattens_payload() {
        let doc = Document {
            guidfixed: "g1".into(),
            shopid: "s1".into(),
            data: Payload { code: "A".into() },
            createdby: "u".into(),
            createdat: 10,
            updatedby: None,
            updatedat: None,
            deletedby: None,
            deletedat: None,
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({"guidfixed": "g1", "shopid": "s1", "code": "A", "createdby": "u", "createdat": 10})
        );

        let mapped = doc.map(|p| p.code.len());
        assert_eq!(mapped.data, 1);
    }
}
