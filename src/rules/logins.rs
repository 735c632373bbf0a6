//! Server login management.

use super::{Rule, RuleCategory, RuleInfo, Violation, detect::Detections};
use crate::script::Script;

/// Flags creation of server logins
///
/// Covers `CREATE LOGIN` and the legacy procedures that add logins.
pub struct NoCreateLogin;

impl Rule for NoCreateLogin {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "S001",
            name:     "NoCreateLogin",
            category: RuleCategory::Logins
        }
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("CREATE", &["LOGIN"])
            .procedures(&["sp_grantlogin", "sp_addlogin", "sp_addremotelogin"])
            .finish()
    }
}

/// Flags removal of server logins
pub struct NoDropLogin;

impl Rule for NoDropLogin {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "S002",
            name:     "NoDropLogin",
            category: RuleCategory::Logins
        }
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("DROP", &["LOGIN"])
            .procedures(&["sp_droplogin", "sp_dropremotelogin", "sp_revokelogin"])
            .finish()
    }
}

/// Flags changes to server logins: passwords, default database and language,
/// access denial and user remapping
pub struct NoAlterLogin;

impl Rule for NoAlterLogin {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "S003",
            name:     "NoAlterLogin",
            category: RuleCategory::Logins
        }
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("ALTER", &["LOGIN"])
            .procedures(&[
                "sp_denylogin",
                "sp_change_users_login",
                "sp_password",
                "sp_defaultdb",
                "sp_defaultlanguage"
            ])
            .finish()
    }
}
