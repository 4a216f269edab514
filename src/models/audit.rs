//! Audit log models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::null_as_default;

/// The kind of operation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Read,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i64,

    #[serde(rename = "usuario_id")]
    pub user_id: Option<i64>,

    #[serde(rename = "usuario_email", default)]
    pub user_email: Option<String>,

    #[serde(rename = "usuario_rol", default)]
    pub user_role: Option<String>,

    #[serde(rename = "accion")]
    pub action: AuditAction,

    #[serde(rename = "tabla_afectada")]
    pub table: String,

    #[serde(rename = "registro_id", default)]
    pub record_id: Option<i64>,

    #[serde(rename = "datos_anteriores", default)]
    pub before: Option<Value>,

    #[serde(rename = "datos_nuevos", default)]
    pub after: Option<Value>,

    #[serde(rename = "descripcion", default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default)]
    pub ip_address: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,
}

/// Filters for the auditor listing. Empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    /// Exact match on the acting user's email.
    pub user_email: Option<String>,
    pub table: Option<String>,
    pub action: Option<AuditAction>,
    pub search: Option<String>,
}

impl AuditFilter {
    /// Query parameters for the non-empty filters.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: Option<&str>| {
            if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        };
        push("usuario_email_exact", self.user_email.as_deref());
        push("tabla_afectada", self.table.as_deref());
        push("accion", self.action.map(AuditAction::as_str));
        push("searchTerm", self.search.as_deref());
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_skips_blank_values() {
        let filter = AuditFilter {
            user_email: Some(" ana@example.com ".into()),
            table: Some("".into()),
            action: Some(AuditAction::Delete),
            search: None,
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("usuario_email_exact", "ana@example.com".to_string()),
                ("accion", "DELETE".to_string()),
            ]
        );
    }

    #[test]
    fn test_audit_log_from_wire() {
        let log: AuditLog = serde_json::from_str(
            r#"{"id":1,"usuario_id":2,"accion":"UPDATE","tabla_afectada":"productos",
                "datos_nuevos":{"stock":3},"descripcion":"stock ajustado"}"#,
        )
        .unwrap();
        assert_eq!(log.action, AuditAction::Update);
        assert_eq!(log.after.unwrap()["stock"], 3);
    }
}
