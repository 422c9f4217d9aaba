use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub id: String,
    #[serde(alias = "username")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(alias = "top_genres")]
    pub top_genres: Vec<String>,
    #[serde(alias = "top_artists")]
    pub top_artists: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn photo_url(&self) -> &str {
        self.image.as_deref().unwrap_or("/profile.png")
    }
}
