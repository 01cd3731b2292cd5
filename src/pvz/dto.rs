use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::service::{ListParams, DEFAULT_LIMIT, DEFAULT_PAGE};

#[derive(Debug, Deserialize)]
pub struct CreatePvzRequest {
    pub city: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenReceptionRequest {
    pub pvz_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    pub pvz_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `GET /pvz` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPvzQuery {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl From<ListPvzQuery> for ListParams {
    fn from(q: ListPvzQuery) -> Self {
        Self {
            start: q.start_date,
            end: q.end_date,
            page: q.page.unwrap_or(DEFAULT_PAGE),
            limit: q.limit.unwrap_or(DEFAULT_LIMIT),
        }
    }
}
