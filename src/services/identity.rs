use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::models::{DialogueSlots, SlotName};

/// Metadata keys that may carry the user id, in priority order.
const METADATA_KEYS: [&str; 2] = ["usuarioId", "user_id"];

/// Finds the user id for a session: first from channel metadata, then from the
/// digits that end the sender tag (`user-123`, `u_45`, `123`). Never invents one.
pub fn resolve_user_id(metadata: &Map<String, Value>, sender_id: &str) -> Option<String> {
    METADATA_KEYS
        .iter()
        .find_map(|key| metadata.get(*key).and_then(numeric_id))
        .or_else(|| trailing_digits(sender_id))
}

/// Resolves the id and stores it in the session. An unresolved id leaves the
/// slot as it was.
pub fn apply_user_id(
    slots: &mut DialogueSlots,
    metadata: &Map<String, Value>,
    sender_id: &str,
) -> Option<String> {
    let resolved = resolve_user_id(metadata, sender_id)?;
    tracing::info!(sender = sender_id, usuario_id = %resolved, "resolved user id");
    slots.set(SlotName::UsuarioId, Some(resolved.clone()));
    Some(resolved)
}

fn numeric_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.is_u64() => Some(n.to_string()),
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty() && s.chars().all(|c| c.is_ascii_digit())).then(|| s.to_string())
        }
        _ => None,
    }
}

fn trailing_digits(sender_id: &str) -> Option<String> {
    static TRAILING_DIGITS_RE: OnceLock<Regex> = OnceLock::new();
    let re = TRAILING_DIGITS_RE
        .get_or_init(|| Regex::new(r"(\d+)$").expect("trailing digits regex must compile"));
    re.captures(sender_id.trim_end_matches('\n'))
        .map(|caps| caps[1].to_string())
}
