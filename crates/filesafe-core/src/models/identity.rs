use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated identity resolved by the transport layer before the
/// pipelines run. Account state checks (disabled accounts, token validity)
/// happen there as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderIdentity {
    pub id: Uuid,
    pub display_name: String,
    /// Administrative override: may delete any record and list all uploads.
    pub admin: bool,
}
