//! Wire types for the shootout leaderboard
//!
//! Uses postcard for the compact realtime push payload and serde_json for
//! rows and change notifications coming back from the hosted store.

use postcard::{from_bytes, to_allocvec};
use serde::{Deserialize, Serialize};

// ============================================================================
// Teams
// ============================================================================

/// Which side a player shoots for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    TeamA,
    TeamB,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::TeamA => "teamA",
            Side::TeamB => "teamB",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "teamA" => Some(Side::TeamA),
            "teamB" => Some(Side::TeamB),
            _ => None,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Side::TeamA => Side::TeamB,
            Side::TeamB => Side::TeamA,
        }
    }
}

// ============================================================================
// Leaderboard rows
// ============================================================================

/// A persisted round result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub side: Side,
    /// Milliseconds since the unix epoch, assigned by the store.
    #[serde(default)]
    pub created_at: u64,
}

/// Payload written at the end of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub name: String,
    pub score: u32,
    pub side: Side,
    pub event_tag: String,
}

impl NewEntry {
    pub fn into_entry(self, created_at: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            name: self.name,
            score: self.score,
            side: self.side,
            created_at,
        }
    }
}

/// Result of leniently decoding a batch of backend rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRows {
    pub entries: Vec<LeaderboardEntry>,
    pub dropped: usize,
}

/// Decode a JSON array of rows, skipping any row that does not form a valid
/// entry (missing name, negative or fractional score, unknown side).
pub fn parse_rows(json: &str) -> Result<ParsedRows, serde_json::Error> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut parsed = ParsedRows::default();

    for row in rows {
        match serde_json::from_value::<LeaderboardEntry>(row) {
            Ok(entry) => parsed.entries.push(entry),
            Err(_) => parsed.dropped += 1,
        }
    }

    Ok(parsed)
}

// ============================================================================
// Realtime push
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardPush {
    /// Another client persisted a round
    EntryInserted {
        event_tag: String,
        entry: LeaderboardEntry,
    },
    /// The store was cleared for an event
    Reset { event_tag: String },
}

impl LeaderboardPush {
    pub fn event_tag(&self) -> &str {
        match self {
            LeaderboardPush::EntryInserted { event_tag, .. } => event_tag,
            LeaderboardPush::Reset { event_tag } => event_tag,
        }
    }

    /// Serialize push message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec(self)
    }

    /// Deserialize push message from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        from_bytes(bytes)
    }

    /// Parse a hosted-store change notification,
    /// `{ "eventType": "INSERT", "new": row }` or a `DELETE` carrying `old`.
    /// Rows hold the usual entry fields plus `event_tag`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        use serde::de::Error;

        let change: ChangePayload = serde_json::from_str(json)?;
        match change.event_type.as_str() {
            "INSERT" => {
                let row = change
                    .new
                    .ok_or_else(|| serde_json::Error::custom("INSERT without a new row"))?;
                let event_tag = row_event_tag(&row)?;
                let entry = serde_json::from_value(row)?;
                Ok(LeaderboardPush::EntryInserted { event_tag, entry })
            }
            "DELETE" => {
                let row = change
                    .old
                    .ok_or_else(|| serde_json::Error::custom("DELETE without an old row"))?;
                Ok(LeaderboardPush::Reset {
                    event_tag: row_event_tag(&row)?,
                })
            }
            other => Err(serde_json::Error::custom(format!(
                "unsupported change type {other}"
            ))),
        }
    }
}

#[derive(Deserialize)]
struct ChangePayload {
    #[serde(rename = "eventType")]
    event_type: String,
    #[serde(default)]
    new: Option<serde_json::Value>,
    #[serde(default)]
    old: Option<serde_json::Value>,
}

fn row_event_tag(row: &serde_json::Value) -> Result<String, serde_json::Error> {
    use serde::de::Error;

    row.get("event_tag")
        .and_then(|tag| tag.as_str())
        .map(str::to_string)
        .ok_or_else(|| serde_json::Error::custom("row has no event_tag"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_wire_names() {
        assert_eq!(Side::parse("teamA"), Some(Side::TeamA));
        assert_eq!(Side::parse("teamB"), Some(Side::TeamB));
        assert_eq!(Side::parse("neutral"), None);
        assert_eq!(Side::TeamA.other(), Side::TeamB);
        let json = serde_json::to_string(&Side::TeamB).expect("Serialization should succeed");
        assert_eq!(json, "\"teamB\"");
    }

    #[test]
    fn test_parse_rows_drops_malformed() {
        let json = r#"[
            {"name": "Asha", "score": 3, "side": "teamA", "created_at": 10},
            {"name": "Ravi", "score": -2, "side": "teamB"},
            {"name": "Ben", "score": 4, "side": "neutral"},
            {"score": 4, "side": "teamA"},
            {"name": "Lee", "score": 2.5, "side": "teamA"},
            {"name": "Mo", "score": 7, "side": "teamB"}
        ]"#;
        let parsed = parse_rows(json).expect("Array should parse");
        assert_eq!(parsed.entries.len(), 2, "Only well-formed rows survive");
        assert_eq!(parsed.dropped, 4);
        assert_eq!(parsed.entries[0].name, "Asha");
        assert_eq!(parsed.entries[0].created_at, 10);
        assert_eq!(parsed.entries[1].created_at, 0, "Missing timestamp defaults");
    }

    #[test]
    fn test_parse_rows_rejects_non_array() {
        assert!(parse_rows("{\"name\": 1}").is_err());
    }

    #[test]
    fn test_push_serialization() {
        let msg = LeaderboardPush::EntryInserted {
            event_tag: "wedding".to_string(),
            entry: LeaderboardEntry {
                name: "Asha".to_string(),
                score: 3,
                side: Side::TeamA,
                created_at: 1_700_000_000_000,
            },
        };
        let bytes = msg.to_bytes().expect("Serialization should succeed");
        let decoded = LeaderboardPush::from_bytes(&bytes).expect("Deserialization should succeed");
        assert_eq!(decoded.event_tag(), "wedding");
        match decoded {
            LeaderboardPush::EntryInserted { entry, .. } => {
                assert_eq!(entry.score, 3);
                assert_eq!(entry.side, Side::TeamA);
            }
            _ => panic!("Message type mismatch"),
        }
    }

    #[test]
    fn test_push_from_change_notification() {
        let insert = r#"{
            "eventType": "INSERT",
            "new": {"name": "Mo", "score": 7, "side": "teamB", "event_tag": "wedding", "created_at": 5}
        }"#;
        match LeaderboardPush::from_json(insert).expect("Insert should parse") {
            LeaderboardPush::EntryInserted { event_tag, entry } => {
                assert_eq!(event_tag, "wedding");
                assert_eq!(entry.name, "Mo");
                assert_eq!(entry.side, Side::TeamB);
            }
            _ => panic!("Message type mismatch"),
        }

        let delete = r#"{"eventType": "DELETE", "old": {"event_tag": "wedding"}}"#;
        assert_eq!(
            LeaderboardPush::from_json(delete).expect("Delete should parse"),
            LeaderboardPush::Reset { event_tag: "wedding".to_string() }
        );
    }

    #[test]
    fn test_push_from_json_rejects_incomplete_changes() {
        assert!(LeaderboardPush::from_json(r#"{"eventType": "INSERT"}"#).is_err());
        assert!(LeaderboardPush::from_json(
            r#"{"eventType": "INSERT", "new": {"name": "Mo", "score": 7, "side": "teamB"}}"#
        )
        .is_err());
        assert!(LeaderboardPush::from_json(r#"{"eventType": "UPDATE", "new": {}}"#).is_err());
    }
}
