use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct MenuCreateRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MenuUpdateRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubmenuCreateRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubmenuUpdateRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DishCreateRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Decimal carried as text, e.g. `"10.20"`.
    pub price: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DishUpdateRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
}
