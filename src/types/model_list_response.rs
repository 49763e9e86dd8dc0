use serde::{Deserialize, Serialize};

/// A model installed on the server, as listed by `GET /api/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Display name, e.g. `llama3.2:3b`.
    #[serde(default)]
    pub name: String,

    /// Model identifier used in requests.  Older servers omit it.
    #[serde(default)]
    pub model: String,

    /// Size on disk in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Content digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Last modification time as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

impl ModelInfo {
    /// The identifier to send in chat requests.
    pub fn id(&self) -> &str {
        if self.model.is_empty() {
            &self.name
        } else {
            &self.model
        }
    }
}

/// Response body of `GET /api/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelListResponse {
    /// Installed models.
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

impl ModelListResponse {
    /// The identifiers of all installed models, in server order.
    pub fn ids(&self) -> Vec<String> {
        self.models.iter().map(|m| m.id().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_list_deserialization() {
        let response: ModelListResponse = serde_json::from_value(json!({
            "models": [
                {
                    "name": "llama3.2:3b",
                    "model": "llama3.2:3b",
                    "modified_at": "2025-05-04T17:37:44.706015396-07:00",
                    "size": 2019393189u64,
                    "digest": "a80c4f17acd55265feec403c7aef86be0c25983ab279d83f3bcd3abbcb5b8b72",
                    "details": {"family": "llama"}
                },
                {"name": "phi3:mini"}
            ]
        }))
        .unwrap();
        assert_eq!(response.ids(), vec!["llama3.2:3b", "phi3:mini"]);
        assert_eq!(response.models[0].size, Some(2019393189));
    }

    #[test]
    fn empty_catalog() {
        let response: ModelListResponse = serde_json::from_value(json!({"models": []})).unwrap();
        assert!(response.ids().is_empty());
        let response: ModelListResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.ids().is_empty());
    }
}
