use serde::Deserialize;

/// Member profile as returned by `users.get`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Present (e.g. "banned", "deleted") for deactivated accounts.
    #[serde(default)]
    pub deactivated: Option<String>,
    #[serde(default)]
    pub is_closed: bool,
}

impl UserProfile {
    /// Deactivated and closed/private profiles are dropped, not stored.
    pub fn is_trackable(&self) -> bool {
        self.deactivated.is_none() && !self.is_closed
    }
}

/// Community profile as returned by `groups.getById`.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupProfile {
    pub id: i64,
    pub name: String,
}
