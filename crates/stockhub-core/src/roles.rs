//! # Roles and Capabilities
//!
//! A closed set of roles, each mapped to a fixed set of capabilities.
//!
//! ```text
//! ┌──────────────────────────┬───────┬─────────┬───────┬──────────┐
//! │ capability               │ admin │ manager │ staff │ inactive │
//! ├──────────────────────────┼───────┼─────────┼───────┼──────────┤
//! │ ManageCatalog            │   ✓   │         │       │          │
//! │ SetupMasterStock         │   ✓   │         │       │          │
//! │ DistributeStock          │   ✓   │         │       │          │
//! │ ResetLedgers             │   ✓   │         │       │          │
//! │ ViewStockHub             │   ✓   │    ✓    │       │          │
//! │ ViewReports              │   ✓   │    ✓    │       │          │
//! │ OperateTerminal          │   ✓   │    ✓    │   ✓   │          │
//! └──────────────────────────┴───────┴─────────┴───────┴──────────┘
//! ```
//!
//! Terminal access for managers and staff is further pinned to the outlet
//! on their profile; see [`authorize_terminal`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Manager,
    Staff,
    /// Account kept for history, may not sign in or act.
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Create and edit outlets, menu items and user profiles.
    ManageCatalog,
    SetupMasterStock,
    DistributeStock,
    ResetLedgers,
    ViewStockHub,
    ViewReports,
    OperateTerminal,
}

impl Capability {
    fn describe(&self) -> &'static str {
        match self {
            Capability::ManageCatalog => "manage menu, outlets and users",
            Capability::SetupMasterStock => "set up master stock",
            Capability::DistributeStock => "distribute stock",
            Capability::ResetLedgers => "reset ledgers",
            Capability::ViewStockHub => "view the stock hub",
            Capability::ViewReports => "view reports",
            Capability::OperateTerminal => "operate a terminal",
        }
    }
}

impl Role {
    pub fn can(&self, capability: Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::Manager => matches!(
                capability,
                Capability::ViewStockHub | Capability::ViewReports | Capability::OperateTerminal
            ),
            Role::Staff => capability == Capability::OperateTerminal,
            Role::Inactive => false,
        }
    }

    /// Same as [`Role::can`] but as a `Forbidden` error.
    pub fn require(&self, capability: Capability) -> CoreResult<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "{} role cannot {}",
                self.as_str(),
                capability.describe()
            )))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Inactive => "inactive",
        }
    }
}

/// Checks that `role` may run the terminal of `requested_outlet`.
///
/// Admins may operate any outlet. Managers and staff may only operate the
/// outlet assigned on their profile.
pub fn authorize_terminal(
    role: Role,
    assigned_outlet: Option<&str>,
    requested_outlet: &str,
) -> CoreResult<()> {
    role.require(Capability::OperateTerminal)?;

    if role == Role::Admin {
        return Ok(());
    }

    match assigned_outlet {
        Some(outlet) if outlet == requested_outlet => Ok(()),
        Some(_) => Err(CoreError::Forbidden(
            "terminal is pinned to your assigned outlet".to_string(),
        )),
        None => Err(CoreError::Forbidden(
            "no outlet assigned to this profile".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Capability; 7] = [
        Capability::ManageCatalog,
        Capability::SetupMasterStock,
        Capability::DistributeStock,
        Capability::ResetLedgers,
        Capability::ViewStockHub,
        Capability::ViewReports,
        Capability::OperateTerminal,
    ];

    #[test]
    fn test_admin_has_everything_inactive_nothing() {
        for cap in ALL {
            assert!(Role::Admin.can(cap));
            assert!(!Role::Inactive.can(cap));
        }
    }

    #[test]
    fn test_manager_and_staff_capabilities() {
        assert!(Role::Manager.can(Capability::ViewStockHub));
        assert!(Role::Manager.can(Capability::ViewReports));
        assert!(Role::Manager.can(Capability::OperateTerminal));
        assert!(!Role::Manager.can(Capability::DistributeStock));
        assert!(!Role::Manager.can(Capability::ResetLedgers));

        assert!(Role::Staff.can(Capability::OperateTerminal));
        assert!(!Role::Staff.can(Capability::ViewReports));
        assert!(!Role::Staff.can(Capability::SetupMasterStock));
    }

    #[test]
    fn test_require_returns_forbidden() {
        let err = Role::Staff.require(Capability::ResetLedgers).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
        assert_eq!(err.to_string(), "Not permitted: staff role cannot reset ledgers");
    }

    #[test]
    fn test_terminal_pinned_to_assigned_outlet() {
        assert!(authorize_terminal(Role::Admin, None, "outlet-2").is_ok());
        assert!(authorize_terminal(Role::Staff, Some("outlet-1"), "outlet-1").is_ok());
        assert!(authorize_terminal(Role::Staff, Some("outlet-1"), "outlet-2").is_err());
        assert!(authorize_terminal(Role::Manager, None, "outlet-1").is_err());
        assert!(authorize_terminal(Role::Inactive, Some("outlet-1"), "outlet-1").is_err());
    }
}
