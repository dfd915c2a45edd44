use serde::{Deserialize, Deserializer, Serialize};

use crate::dossier::snapshot::PlayerSnapshot;

/// Server-wide statistics; every field falls back to zero when missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerStats {
    pub cpu_percent: f64,
    pub memory_bytes: u64,
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
    pub players_online: u32,
    pub uptime_seconds: u64,
    pub world_day: u64,
    pub world_time: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub world_seed: String,
    pub loaded_chunks: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub difficulty: String,
    pub is_raining: bool,
    pub disk_bytes: u64,
    pub tps: f64,
    pub mspt: f64,
    pub heap_used_bytes: u64,
    pub heap_max_bytes: u64,
}

/// Players currently online
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerList {
    pub players: Vec<PlayerSnapshot>,
}

impl PlayerList {
    /// Find a player by name, ignoring ASCII case
    pub fn find(&self, name: &str) -> Option<&PlayerSnapshot> {
        self.players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Seeds and difficulties arrive either as strings or as numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}
