//! Route permission table.
//!
//! Every protected route family declares its allowed-role set here, in
//! one place, instead of matching on role strings inside handlers. An
//! empty set means any authenticated caller passes, whatever their
//! role.

/// Any authenticated caller, role-agnostic.
pub const AUTHENTICATED: &[&str] = &[];

/// Account administration: unlocking users, provisioning.
pub const MANAGE_ACCOUNTS: &[&str] = &["admin"];

/// Whether a caller holding `role` may pass a route declaring
/// `allowed`. A caller with no role assigned only passes the empty
/// set.
pub fn permits(allowed: &[&str], role: Option<&str>) -> bool {
    allowed.is_empty() || role.map_or(false, |r| allowed.contains(&r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_admits_any_authenticated_caller() {
        assert!(permits(AUTHENTICATED, Some("sectorCoordinator")));
        assert!(permits(AUTHENTICATED, None));
    }

    #[test]
    fn named_set_admits_members_only() {
        assert!(permits(MANAGE_ACCOUNTS, Some("admin")));
        assert!(!permits(MANAGE_ACCOUNTS, Some("sectorCoordinator")));
        assert!(!permits(MANAGE_ACCOUNTS, Some("districtAdministrator")));
    }

    #[test]
    fn roleless_caller_never_passes_a_named_set() {
        assert!(!permits(MANAGE_ACCOUNTS, None));
    }
}
