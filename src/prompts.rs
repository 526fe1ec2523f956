//! Therapist persona and structured payload building
//!
//! Outgoing user payloads are wrapped in an MCP-style JSON envelope so the
//! model sees the rolling context, the current message, and how far into
//! the session the conversation is.

use crate::session::Turn;

/// System instruction for per-turn therapeutic responses
pub const SYSTEM_PROMPT: &str = "You are a professional therapist using the Model Context \
Protocol (MCP) for structured therapeutic interactions. Your patients are crew members of an \
isolated habitat analog mission, disconnected from their families and the outside world. They \
live in a small shared space with network delays and limited bandwidth that simulate a long \
duration deep-space mission, so they cannot access the internet or use any strategy that \
requires being online. They may be facing psychological challenges from isolation and \
frustration from confined living. Maintain a supportive, insightful, and empathetic \
therapeutic presence. Focus on evidence-based approaches and maintain professional \
consistency in your responses. Most of all, be concise!";

/// System instruction for the end-of-session summary
pub const SUMMARY_PROMPT: &str = "You are a professional therapist creating a session summary. \
Analyze the session and provide: \
1. A comprehensive summary of the session \
2. Key psychological insights about the client \
3. Specific action items or recommendations \
Format your response as a valid JSON object with these exact keys: \
{\"summary\": \"detailed session summary here\", \
\"key_insights\": [\"insight 1\", \"insight 2\"], \
\"action_items\": [\"action 1\", \"action 2\"]}";

/// Build the per-turn request payload: recent context, the new message,
/// and the count of prior interactions in the session
#[must_use]
pub fn interaction_payload(context: &[Turn], message: &str, history_len: usize) -> String {
    serde_json::json!({
        "protocol": "MCP-1.0",
        "type": "therapy_interaction",
        "data": {
            "context": context,
            "current_message": message,
            "session_history": history_len,
        },
    })
    .to_string()
}

/// Build the summary request payload from the session's user messages only
#[must_use]
pub fn summary_payload(user_messages: &[String]) -> String {
    let interactions: Vec<serde_json::Value> = user_messages
        .iter()
        .map(|m| serde_json::json!({ "role": "user", "content": m }))
        .collect();

    serde_json::json!({
        "protocol": "MCP-1.0",
        "type": "session_summary_request",
        "data": { "interactions": interactions },
    })
    .to_string()
}

/// Locate the first `{` .. last `}` span in completion output.
///
/// The remote side enforces no schema, so the JSON object may be wrapped
/// in prose on either side. Returns `None` if no such span exists.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_finds_bare_object() {
        assert_eq!(extract_json_object(r#"{"a":1}"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn extract_strips_surrounding_prose() {
        let text = r#"Here you go: {"summary":"ok"} hope that helps"#;
        assert_eq!(extract_json_object(text), Some(r#"{"summary":"ok"}"#));
    }

    #[test]
    fn extract_spans_nested_objects() {
        let text = r#"note {"a":{"b":2}} end"#;
        assert_eq!(extract_json_object(text), Some(r#"{"a":{"b":2}}"#));
    }

    #[test]
    fn extract_rejects_missing_braces() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("only open {"), None);
        assert_eq!(extract_json_object("only close }"), None);
    }

    #[test]
    fn extract_rejects_reversed_braces() {
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn interaction_payload_carries_context_and_count() {
        let context = vec![Turn {
            user: "hello".to_string(),
            assistant: "hi there".to_string(),
        }];
        let payload = interaction_payload(&context, "how are you", 5);
        let v: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(v["protocol"], "MCP-1.0");
        assert_eq!(v["type"], "therapy_interaction");
        assert_eq!(v["data"]["current_message"], "how are you");
        assert_eq!(v["data"]["session_history"], 5);
        assert_eq!(v["data"]["context"][0]["user"], "hello");
        assert_eq!(v["data"]["context"][0]["assistant"], "hi there");
    }

    #[test]
    fn summary_payload_is_user_role_only() {
        let messages = vec!["first".to_string(), "second".to_string()];
        let payload = summary_payload(&messages);
        let v: serde_json::Value = serde_json::from_str(&payload).unwrap();

        let interactions = v["data"]["interactions"].as_array().unwrap();
        assert_eq!(interactions.len(), 2);
        for i in interactions {
            assert_eq!(i["role"], "user");
        }
        assert_eq!(interactions[1]["content"], "second");
    }
}
