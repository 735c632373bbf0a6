//! Server, database and application roles.
//!
//! The three role families are told apart by the words after the DDL verb:
//! `SERVER ROLE`, `APPLICATION ROLE` or plain `ROLE` for database roles. A
//! statement therefore matches at most one family.

use super::{Rule, RuleCategory, RuleInfo, Violation, detect::Detections};
use crate::script::Script;

const SERVER_ROLE: &[&str] = &["SERVER", "ROLE"];
const DATABASE_ROLE: &[&str] = &["ROLE"];
const APPLICATION_ROLE: &[&str] = &["APPLICATION", "ROLE"];

fn role_rule(id: &'static str, name: &'static str) -> RuleInfo {
    RuleInfo {
        id,
        name,
        category: RuleCategory::Roles
    }
}

pub struct NoCreateServerRole;

impl Rule for NoCreateServerRole {
    fn info(&self) -> RuleInfo {
        role_rule("S004", "NoCreateServerRole")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("CREATE", SERVER_ROLE)
            .finish()
    }
}

pub struct NoDropServerRole;

impl Rule for NoDropServerRole {
    fn info(&self) -> RuleInfo {
        role_rule("S005", "NoDropServerRole")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("DROP", SERVER_ROLE)
            .finish()
    }
}

/// Flags changes to server role membership
pub struct NoAlterServerRole;

impl Rule for NoAlterServerRole {
    fn info(&self) -> RuleInfo {
        role_rule("S006", "NoAlterServerRole")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("ALTER", SERVER_ROLE)
            .procedures(&["sp_addsrvrolemember", "sp_dropsrvrolemember"])
            .finish()
    }
}

pub struct NoCreateDatabaseRole;

impl Rule for NoCreateDatabaseRole {
    fn info(&self) -> RuleInfo {
        role_rule("S007", "NoCreateDatabaseRole")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("CREATE", DATABASE_ROLE)
            .procedures(&["sp_addrole"])
            .finish()
    }
}

pub struct NoDropDatabaseRole;

impl Rule for NoDropDatabaseRole {
    fn info(&self) -> RuleInfo {
        role_rule("S008", "NoDropDatabaseRole")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("DROP", DATABASE_ROLE)
            .procedures(&["sp_droprole"])
            .finish()
    }
}

/// Flags changes to database role membership
pub struct NoAlterDatabaseRole;

impl Rule for NoAlterDatabaseRole {
    fn info(&self) -> RuleInfo {
        role_rule("S009", "NoAlterDatabaseRole")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("ALTER", DATABASE_ROLE)
            .procedures(&["sp_addrolemember", "sp_droprolemember"])
            .finish()
    }
}

pub struct NoCreateAppRole;

impl Rule for NoCreateAppRole {
    fn info(&self) -> RuleInfo {
        role_rule("S010", "NoCreateAppRole")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("CREATE", APPLICATION_ROLE)
            .procedures(&["sp_addapprole"])
            .finish()
    }
}

pub struct NoDropAppRole;

impl Rule for NoDropAppRole {
    fn info(&self) -> RuleInfo {
        role_rule("S011", "NoDropAppRole")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("DROP", APPLICATION_ROLE)
            .procedures(&["sp_dropapprole"])
            .finish()
    }
}

/// Flags application role changes, including password resets
pub struct NoAlterAppRole;

impl Rule for NoAlterAppRole {
    fn info(&self) -> RuleInfo {
        role_rule("S012", "NoAlterAppRole")
    }

    fn check(&self, script: &Script) -> Vec<Violation> {
        Detections::new(self.info(), script)
            .ddl("ALTER", APPLICATION_ROLE)
            .procedures(&["sp_approlepassword"])
            .finish()
    }
}
