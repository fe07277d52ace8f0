use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Account type stored in `users.user_type`.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema,
    AsRefStr, Display, EnumString, EnumIter,
)]
pub enum Role {
    #[strum(serialize = "SUPER")]
    #[serde(rename = "SUPER")]
    Super = 1,
    #[strum(serialize = "ADMIN")]
    #[serde(rename = "ADMIN")]
    Admin = 2,
    #[strum(serialize = "TEAML")]
    #[serde(rename = "TEAML")]
    TeamLead = 3,
    #[strum(serialize = "RUSER")]
    #[serde(rename = "RUSER")]
    User = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Super),
            2 => Some(Role::Admin),
            3 => Some(Role::TeamLead),
            4 => Some(Role::User),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn is_super(self) -> bool {
        self == Role::Super
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn is_tl(self) -> bool {
        self == Role::TeamLead
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    /// Any role that manages other users.
    pub fn sup_tl_or_admin(self) -> bool {
        !self.is_user()
    }

    pub fn super_or_admin(self) -> bool {
        matches!(self, Role::Super | Role::Admin)
    }

    pub fn admin_or_tl(self) -> bool {
        matches!(self, Role::Admin | Role::TeamLead)
    }
}

impl TryFrom<String> for Role {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn ids_round_trip_through_tokens() {
        for role in Role::iter() {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(5), None);
    }

    #[test]
    fn codes_match_stored_user_types() {
        assert_eq!("SUPER".parse::<Role>().unwrap(), Role::Super);
        assert_eq!("TEAML".parse::<Role>().unwrap(), Role::TeamLead);
        assert_eq!(Role::User.as_ref(), "RUSER");
        assert!("MANAGER".parse::<Role>().is_err());
    }

    #[test]
    fn permission_predicates() {
        // (role, sup_tl_or_admin, super_or_admin, admin_or_tl)
        let table = [
            (Role::Super, true, true, false),
            (Role::Admin, true, true, true),
            (Role::TeamLead, true, false, true),
            (Role::User, false, false, false),
        ];
        for (role, any_manager, sup_or_admin, admin_or_tl) in table {
            assert_eq!(role.sup_tl_or_admin(), any_manager, "{role}");
            assert_eq!(role.super_or_admin(), sup_or_admin, "{role}");
            assert_eq!(role.admin_or_tl(), admin_or_tl, "{role}");
        }
        assert!(Role::Super.is_super() && !Role::Admin.is_super());
        assert!(Role::TeamLead.is_tl() && Role::User.is_user());
    }
}
