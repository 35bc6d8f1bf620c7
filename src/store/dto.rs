use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::BoardState;

/// Wire envelope used by the hosted document endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEnvelope {
    pub document: BoardState,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct PutDocumentRequest<'a> {
    pub document: &'a BoardState,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
