use serde::{Deserialize, Serialize};

use crate::utils;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VolInfo {
    pub name: String,
    pub created: utils::DateTime,
}
