//! Database users.

use super::{Rule, RuleCategory, RuleInfo, Violation, detect::Detections};
use crate::script::Script;

/// Flags new database users, including the legacy access grants
pub struct NoCreateUser;

impl Rule for NoCreateUser {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "S014",
            name:     "NoCreateUser",
            category: RuleCategory::Users
        }
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("CREATE", &["USER"])
            .procedures(&["sp_adduser", "sp_grantdbaccess"])
            .finish()
    }
}

pub struct NoDropUser;

impl Rule for NoDropUser {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "S015",
            name:     "NoDropUser",
            category: RuleCategory::Users
        }
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("DROP", &["USER"])
            .procedures(&["sp_dropuser", "sp_revokedbaccess"])
            .finish()
    }
}

/// Flags user changes, remapping to logins and conversion to contained users
pub struct NoAlterUser;

impl Rule for NoAlterUser {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "S016",
            name:     "NoAlterUser",
            category: RuleCategory::Users
        }
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("ALTER", &["USER"])
            .procedures(&["sp_change_users_login", "sp_migrate_user_to_contained"])
            .finish()
    }
}
