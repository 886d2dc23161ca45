use bson::{Bson, Document};
use esshub_db::models::{NotificationRule, RecipientSource};
use tracing::warn;
use validator::ValidateEmail;

use crate::condition;
use crate::dao::base::DaoResult;
use crate::dao::{DeviceDao, UserDao};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecipient {
    pub user: String,
    pub token: String,
}

/// Resolves a rule's recipient specifications against one record into the
/// final device set. Users without a registered device drop out silently;
/// the result is deduplicated by token.
pub async fn resolve(
    rule: &NotificationRule,
    doc: &Document,
    doc_json: &serde_json::Value,
    users: &UserDao,
    devices: &DeviceDao,
) -> DaoResult<Vec<ResolvedRecipient>> {
    let mut addresses: Vec<String> = Vec::new();

    for spec in &rule.recipients {
        if let Some(ref cond) = spec.condition {
            match condition::evaluate(cond, doc_json) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(rule = %rule.name, %e, "Recipient condition failed, skipping");
                    continue;
                }
            }
        }

        match &spec.source {
            RecipientSource::DirectField { field } => {
                if let Some(Bson::String(raw)) = doc.get(field) {
                    addresses.extend(split_addresses(raw));
                }
            }
            RecipientSource::ChildTableField { field, column } => {
                if let Ok(rows) = doc.get_array(field) {
                    for row in rows {
                        if let Bson::Document(row) = row {
                            if let Some(Bson::String(value)) = row.get(column) {
                                addresses.extend(split_addresses(value));
                            }
                        }
                    }
                }
            }
            RecipientSource::Role { role } => {
                addresses.extend(users.emails_with_role(role).await?);
            }
        }
    }

    let addresses = dedup(addresses);
    if addresses.is_empty() {
        return Ok(Vec::new());
    }

    let registrations = devices.registrations_for_users(&addresses).await?;
    let mut seen_tokens = std::collections::HashSet::new();
    let mut resolved = Vec::new();
    for registration in registrations {
        let Some(token) = registration.token else {
            continue;
        };
        if seen_tokens.insert(token.clone()) {
            resolved.push(ResolvedRecipient {
                user: registration.user,
                token,
            });
        }
    }
    Ok(resolved)
}

/// A direct field may hold one address or several joined by commas or
/// newlines; anything that is not a valid address is discarded.
pub fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter(|part| part.validate_email())
        .map(str::to_string)
        .collect()
}

/// Order-preserving dedup of the address set.
pub fn dedup(addresses: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    addresses
        .into_iter()
        .filter(|addr| seen.insert(addr.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_comma_and_newline_joined_addresses() {
        let parts = split_addresses("a@test.com, b@test.com\nc@test.com");
        assert_eq!(parts, vec!["a@test.com", "b@test.com", "c@test.com"]);
    }

    #[test]
    fn discards_invalid_addresses() {
        let parts = split_addresses("a@test.com, not-an-email, ");
        assert_eq!(parts, vec!["a@test.com"]);
    }

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        let addresses = vec![
            "a@test.com".to_string(),
            "b@test.com".to_string(),
            "a@test.com".to_string(),
        ];
        assert_eq!(dedup(addresses), vec!["a@test.com", "b@test.com"]);
    }
}
