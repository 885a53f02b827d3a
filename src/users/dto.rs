use serde::{Deserialize, Serialize};

use crate::{auth::repo_types::PublicUser, history::repo_types::Analysis};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub history: Vec<Analysis>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub dob: Option<String>,
}
