/// Metadata carried by a clickable marker sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerInfo {
    pub description: String,
    pub url: String,
}

impl MarkerInfo {
    pub fn new(description: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            url: url.into(),
        }
    }
}
