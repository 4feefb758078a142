use serde::{Deserialize, Serialize};

/// A root the user can start browsing from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub name: String,
    pub path: String,
}
