use serde::{Deserialize, Serialize};

use super::event::{select_active_event, Event};

/// Конверт, в который бэкенд заворачивает все ответы.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Продюсер (владелец витрины) вместе со всеми событиями.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Producer {
    pub fn active_event(&self) -> Option<&Event> {
        select_active_event(&self.events)
    }
}
