//! Role derivation from identity-provider group membership.
//!
//! A user can belong to several groups. The client acts on the single highest-precedence role:
//! Admins > Labs > Doctors > Patients > Unknown. Enforcement stays server-side; the role only
//! decides which screen a user lands on and which commands make sense to offer.

use crate::constants::{GROUP_ADMINS, GROUP_DOCTORS, GROUP_LABS, GROUP_PATIENTS};
use crate::session::Session;
use crate::{CoreError, CoreResult};

/// Highest-precedence role held by a user.
///
/// Variants are declared in precedence order, so `Ord` ranks `Admins` highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Unknown,
    Patients,
    Doctors,
    Labs,
    Admins,
}

impl Role {
    /// Derive the role from a list of group names.
    ///
    /// Unrecognised groups are ignored; an empty or unrecognised list yields `Unknown`.
    pub fn from_groups<S: AsRef<str>>(groups: &[S]) -> Self {
        groups
            .iter()
            .filter_map(|g| Self::from_group_name(g.as_ref()))
            .max()
            .unwrap_or(Role::Unknown)
    }

    fn from_group_name(name: &str) -> Option<Self> {
        match name {
            GROUP_ADMINS => Some(Role::Admins),
            GROUP_LABS => Some(Role::Labs),
            GROUP_DOCTORS => Some(Role::Doctors),
            GROUP_PATIENTS => Some(Role::Patients),
            _ => None,
        }
    }

    /// The identity-provider group backing this role, if any.
    pub fn group_name(self) -> Option<&'static str> {
        match self {
            Role::Admins => Some(GROUP_ADMINS),
            Role::Labs => Some(GROUP_LABS),
            Role::Doctors => Some(GROUP_DOCTORS),
            Role::Patients => Some(GROUP_PATIENTS),
            Role::Unknown => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.group_name().unwrap_or("Unknown"))
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    /// Parse an assignable role. Accepts the group name case-insensitively, singular or plural.
    fn from_str(s: &str) -> CoreResult<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let singular = lowered.trim_end_matches('s');
        match singular {
            "admin" => Ok(Role::Admins),
            "lab" => Ok(Role::Labs),
            "doctor" => Ok(Role::Doctors),
            "patient" => Ok(Role::Patients),
            _ => Err(CoreError::UnknownRole(s.to_string())),
        }
    }
}

/// Screen a user lands on after the session check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Login / landing screen. Used whenever there is no valid session.
    Entry,
    Admin,
    Lab,
    Doctor,
    Patient,
}

impl Screen {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admins => Screen::Admin,
            Role::Labs => Screen::Lab,
            Role::Doctors => Screen::Doctor,
            Role::Patients => Screen::Patient,
            Role::Unknown => Screen::Entry,
        }
    }

    /// Route a possibly-missing session. `None` redirects to the entry screen.
    pub fn for_session(session: Option<&Session>) -> Self {
        session.map_or(Screen::Entry, |s| Self::for_role(s.role()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctors_outranks_patients() {
        let role = Role::from_groups(&["Patients", "Doctors"]);
        assert_eq!(role, Role::Doctors);
    }

    #[test]
    fn admins_outranks_everything() {
        let role = Role::from_groups(&["Doctors", "Patients", "Admins", "Labs"]);
        assert_eq!(role, Role::Admins);
    }

    #[test]
    fn labs_outranks_doctors() {
        assert_eq!(Role::from_groups(&["Doctors", "Labs"]), Role::Labs);
    }

    #[test]
    fn unrecognised_groups_are_unknown() {
        let empty: [&str; 0] = [];
        assert_eq!(Role::from_groups(&empty), Role::Unknown);
        assert_eq!(Role::from_groups(&["Nurses", "admins"]), Role::Unknown);
    }

    #[test]
    fn parses_assignable_roles() {
        assert_eq!("Doctors".parse::<Role>().unwrap(), Role::Doctors);
        assert_eq!("lab".parse::<Role>().unwrap(), Role::Labs);
        assert_eq!(" ADMIN ".parse::<Role>().unwrap(), Role::Admins);
        assert!("nurse".parse::<Role>().is_err());
    }

    #[test]
    fn screens_follow_role() {
        assert_eq!(Screen::for_role(Role::Labs), Screen::Lab);
        assert_eq!(Screen::for_role(Role::Unknown), Screen::Entry);
        assert_eq!(Screen::for_session(None), Screen::Entry);
    }
}
