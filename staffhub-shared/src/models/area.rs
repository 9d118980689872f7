use serde::{Deserialize, Serialize};

/// Organizational area a collaborator can belong to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Area {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_optional() {
        let area: Area = serde_json::from_str(r#"{"id":"a-1","name":"Design"}"#).unwrap();
        assert_eq!(area.name, "Design");
        assert!(area.description.is_none());
        let json = serde_json::to_string(&area).unwrap();
        assert!(!json.contains("description"));
    }
}
