use serde::Serialize;

/// goes as query parameter
#[derive(Serialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListOptions {
    pub fn is_empty(&self) -> bool {
        self.field_selector.is_none() && self.label_selector.is_none() && self.limit.is_none()
    }
}
