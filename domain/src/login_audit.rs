//! Login audit document kept in the site repository.
//!
//! The document is a single JSON object keyed by provider login handle:
//!
//! ```json
//! {
//!   "octocat": {
//!     "name": "The Octocat",
//!     "avatarUrl": "https://avatars.githubusercontent.com/u/583231",
//!     "loginCount": 3,
//!     "lastLogin": "2024-05-01T12:00:00.000Z"
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use log::*;
use serde::{Deserialize, Serialize};

use crate::content_store::ContentStore;
use crate::error::Error;
use crate::gateway::oauth::UserInfo;

/// Per-user entry of the audit document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginAuditRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub login_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    /// Fields written by other tools are carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The whole audit document. Ordered so rewrites produce stable diffs.
pub type LoginAudit = BTreeMap<String, LoginAuditRecord>;

pub fn commit_message(login: &str) -> String {
    format!("chore(cms): update login for {login}")
}

/// Parse the stored document. An empty file is treated as an empty mapping.
pub fn parse_audit(content: &[u8]) -> Result<LoginAudit, Error> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(LoginAudit::new());
    }
    Ok(serde_json::from_slice(content)?)
}

pub fn render_audit(audit: &LoginAudit) -> Result<Vec<u8>, Error> {
    let mut content = serde_json::to_vec_pretty(audit)?;
    content.push(b'\n');
    Ok(content)
}

/// Upsert the entry for `user` and return the updated record.
///
/// `loginCount` goes up by one and `lastLogin` is overwritten. Profile values win for
/// `name`/`avatarUrl`; when the provider omits them the previous values are kept.
pub fn apply_login(
    audit: &mut LoginAudit,
    user: &UserInfo,
    now: DateTime<Utc>,
) -> LoginAuditRecord {
    let record = audit.entry(user.login.clone()).or_default();

    if let Some(name) = &user.name {
        record.name = name.clone();
    } else if record.name.is_empty() {
        record.name = user.login.clone();
    }
    if let Some(avatar_url) = &user.avatar_url {
        record.avatar_url = avatar_url.clone();
    }
    record.login_count += 1;
    record.last_login = Some(now.to_rfc3339_opts(SecondsFormat::Millis, true));

    record.clone()
}

/// Record a successful login in the audit document at `path`.
///
/// Performs read, upsert and conditional write. When the write is rejected because
/// another writer updated the file first, the whole cycle is repeated from a fresh read,
/// for at most `max_attempts` attempts in total.
pub async fn record_login(
    store: &dyn ContentStore,
    path: &str,
    user: &UserInfo,
    max_attempts: u32,
    now: DateTime<Utc>,
) -> Result<LoginAuditRecord, Error> {
    let max_attempts = max_attempts.max(1);
    let message = commit_message(&user.login);
    let mut attempt = 1;

    loop {
        let (mut audit, revision) = match store.fetch(path).await? {
            Some(file) => (parse_audit(&file.content)?, Some(file.revision)),
            None => {
                debug!("No audit document at {}, starting a new one", path);
                (LoginAudit::new(), None)
            }
        };

        let record = apply_login(&mut audit, user, now);
        let content = render_audit(&audit)?;

        match store
            .compare_and_swap(path, &content, revision.as_deref(), &message)
            .await
        {
            Ok(new_revision) => {
                info!(
                    "Recorded login #{} for {} (revision {})",
                    record.login_count, user.login, new_revision
                );
                return Ok(record);
            }
            Err(err) if err.is_conflict() && attempt < max_attempts => {
                info!(
                    "Audit document changed concurrently, retrying ({}/{})",
                    attempt, max_attempts
                );
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_store::memory::MemoryContentStore;
    use chrono::TimeZone;
    use serde_json::json;

    const PATH: &str = "data/user-logins.json";

    fn octocat() -> UserInfo {
        UserInfo::from_json(json!({
            "login": "octocat",
            "name": "The Octocat",
            "avatar_url": "https://avatars.example.com/octocat",
            "email": null
        }))
        .unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_apply_login_new_user() {
        let mut audit = LoginAudit::new();
        let record = apply_login(&mut audit, &octocat(), at(12));

        assert_eq!(record.login_count, 1);
        assert_eq!(record.name, "The Octocat");
        assert_eq!(record.avatar_url, "https://avatars.example.com/octocat");
        assert_eq!(record.last_login.as_deref(), Some("2024-05-01T12:00:00.000Z"));
        assert_eq!(audit.len(), 1);
    }

    #[test]
    fn test_apply_login_keeps_previous_values_when_profile_omits_them() {
        let mut audit: LoginAudit = serde_json::from_value(json!({
            "octocat": {"name": "Mona", "avatarUrl": "https://old/avatar", "loginCount": 4}
        }))
        .unwrap();
        let user = UserInfo::from_json(json!({"login": "octocat"})).unwrap();

        let record = apply_login(&mut audit, &user, at(9));

        assert_eq!(record.name, "Mona");
        assert_eq!(record.avatar_url, "https://old/avatar");
        assert_eq!(record.login_count, 5);
    }

    #[test]
    fn test_apply_login_falls_back_to_login_handle() {
        let mut audit = LoginAudit::new();
        let user = UserInfo::from_json(json!({"login": "ghost", "name": ""})).unwrap();

        let record = apply_login(&mut audit, &user, at(9));

        assert_eq!(record.name, "ghost");
        assert_eq!(record.avatar_url, "");
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_audit(b"").unwrap().is_empty());
        assert!(parse_audit(b"  \n").unwrap().is_empty());
        assert!(parse_audit(b"[1, 2]").is_err());
    }

    #[test]
    fn test_render_uses_camel_case_and_two_space_indent() {
        let mut audit = LoginAudit::new();
        apply_login(&mut audit, &octocat(), at(12));

        let rendered = String::from_utf8(render_audit(&audit).unwrap()).unwrap();

        assert!(rendered.starts_with("{\n  \"octocat\": {\n    \"name\""));
        assert!(rendered.contains("\"avatarUrl\""));
        assert!(rendered.contains("\"loginCount\": 1"));
        assert!(rendered.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_record_login_creates_missing_document() {
        let store = MemoryContentStore::default();

        let record = record_login(&store, PATH, &octocat(), 1, at(12))
            .await
            .unwrap();

        assert_eq!(record.login_count, 1);
        let audit = parse_audit(store.content(PATH).unwrap().as_bytes()).unwrap();
        assert_eq!(audit["octocat"], record);
        assert_eq!(
            store.messages.lock().unwrap().as_slice(),
            ["chore(cms): update login for octocat".to_string()]
        );
    }

    #[tokio::test]
    async fn test_replayed_login_increments_once_per_call() {
        let store = MemoryContentStore::default();

        record_login(&store, PATH, &octocat(), 1, at(12))
            .await
            .unwrap();
        let second = record_login(&store, PATH, &octocat(), 1, at(13))
            .await
            .unwrap();

        assert_eq!(second.login_count, 2);
        assert_eq!(second.last_login.as_deref(), Some("2024-05-01T13:00:00.000Z"));
        let audit = parse_audit(store.content(PATH).unwrap().as_bytes()).unwrap();
        assert_eq!(audit.len(), 1);
    }

    #[tokio::test]
    async fn test_record_login_preserves_other_entries_and_fields() {
        let store = MemoryContentStore::with_file(
            PATH,
            r#"{"hubot": {"name": "Hubot", "avatarUrl": "", "loginCount": 7, "lastLogin": "2023-01-01T00:00:00.000Z", "role": "bot"}}"#,
        );

        record_login(&store, PATH, &octocat(), 1, at(12))
            .await
            .unwrap();

        let document: serde_json::Value =
            serde_json::from_str(&store.content(PATH).unwrap()).unwrap();
        assert_eq!(document["hubot"]["loginCount"], 7);
        assert_eq!(document["hubot"]["role"], "bot");
        assert_eq!(document["octocat"]["loginCount"], 1);
    }

    #[tokio::test]
    async fn test_conflict_without_retry_is_returned() {
        let store = MemoryContentStore::with_file(PATH, "{}");
        *store.conflicts_to_inject.lock().unwrap() = 1;

        let err = record_login(&store, PATH, &octocat(), 1, at(12))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(store.content(PATH).as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_conflict_is_retried_from_a_fresh_read() {
        let store = MemoryContentStore::with_file(PATH, r#"{"octocat": {"loginCount": 2}}"#);
        *store.conflicts_to_inject.lock().unwrap() = 1;

        let record = record_login(&store, PATH, &octocat(), 2, at(12))
            .await
            .unwrap();

        assert_eq!(record.login_count, 3);
        assert_eq!(store.messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_read_failure_is_returned() {
        let store = MemoryContentStore::unreachable();

        assert!(record_login(&store, PATH, &octocat(), 3, at(12))
            .await
            .is_err());
        assert!(store.content(PATH).is_none());
    }
}
