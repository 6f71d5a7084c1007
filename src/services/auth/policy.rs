/*
 * Responsibility
 * - 静的な認可テーブル: role が route + method を呼べるか
 * - 組み込みテーブル or JSON ファイルから読み込み
 */
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Pure lookup; no state is owned by the caller.
pub trait AuthorizationPolicy: Send + Sync {
    fn check(&self, role: &str, route: &str, method: &str) -> bool;
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid policy json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One allow rule.
///
/// - `path` is a route pattern as registered with the router
///   (`/api/v1/announce/{id}`); a trailing `*` makes it a prefix match.
/// - `method` is an HTTP method name or `*`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PolicyRule {
    pub role: String,
    pub path: String,
    pub method: String,
}

impl PolicyRule {
    pub fn new(role: &str, path: &str, method: &str) -> Self {
        Self {
            role: role.to_string(),
            path: path.to_string(),
            method: method.to_string(),
        }
    }

    fn matches(&self, role: &str, route: &str, method: &str) -> bool {
        if self.role != role {
            return false;
        }
        if self.method != "*" && !self.method.eq_ignore_ascii_case(method) {
            return false;
        }
        match self.path.strip_suffix('*') {
            Some(prefix) => route.starts_with(prefix),
            None => self.path == route,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    rules: Vec<PolicyRule>,
}

const ALL_ROLES: [&str; 4] = ["user", "auditor", "admin", "root"];
const MANAGERS: [&str; 2] = ["admin", "root"];

impl PolicyTable {
    /// Rules shipped with the server.
    pub fn builtin() -> Self {
        let mut rules = Vec::new();

        for role in ALL_ROLES {
            rules.push(PolicyRule::new(role, "/api/v1/auth/logout", "POST"));
            rules.push(PolicyRule::new(role, "/api/v1/user/me", "GET"));
        }
        for role in MANAGERS {
            rules.push(PolicyRule::new(role, "/api/v1/announce", "POST"));
            rules.push(PolicyRule::new(role, "/api/v1/announce/{id}", "DELETE"));
        }

        Self { rules }
    }

    /// Parse a JSON array of `{ "role", "path", "method" }`.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let rules: Vec<PolicyRule> = serde_json::from_str(json)?;
        Ok(Self { rules })
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl AuthorizationPolicy for PolicyTable {
    fn check(&self, role: &str, route: &str, method: &str) -> bool {
        self.rules.iter().any(|r| r.matches(role, route, method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lets_everyone_log_out() {
        let table = PolicyTable::builtin();
        for role in ALL_ROLES {
            assert!(table.check(role, "/api/v1/auth/logout", "POST"));
        }
        assert!(!table.check("user", "/api/v1/auth/logout", "GET"));
    }

    #[test]
    fn builtin_restricts_announcements_to_managers() {
        let table = PolicyTable::builtin();

        assert!(table.check("admin", "/api/v1/announce", "POST"));
        assert!(table.check("root", "/api/v1/announce/{id}", "DELETE"));
        assert!(!table.check("user", "/api/v1/announce", "POST"));
        assert!(!table.check("auditor", "/api/v1/announce/{id}", "DELETE"));
    }

    #[test]
    fn unknown_role_is_denied() {
        assert!(!PolicyTable::builtin().check("guest", "/api/v1/user/me", "GET"));
    }

    #[test]
    fn wildcards_in_json_rules() {
        let table = PolicyTable::from_json(
            r#"[
                {"role": "root", "path": "/api/v1/*", "method": "*"},
                {"role": "user", "path": "/api/v1/user/me", "method": "get"}
            ]"#,
        )
        .unwrap();

        assert_eq!(table.rule_count(), 2);
        assert!(table.check("root", "/api/v1/anything/{id}", "PATCH"));
        assert!(table.check("user", "/api/v1/user/me", "GET"));
        assert!(!table.check("user", "/api/v1/user/me", "POST"));
        assert!(!table.check("root", "/health", "GET"));
    }

    #[test]
    fn bad_json_is_rejected() {
        assert!(matches!(
            PolicyTable::from_json("{\"role\": 1}"),
            Err(PolicyError::Parse(_))
        ));
    }
}
