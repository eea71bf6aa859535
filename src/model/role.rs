use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Roles carried in the access token as a numeric id.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Hr, Role::Employee];

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// ADMIN and HR share the same authority: full cross-employee access.
    /// Every privilege decision goes through here.
    pub fn is_privileged(self) -> bool {
        match self {
            Role::Admin | Role::Hr => true,
            Role::Employee => false,
        }
    }
}
