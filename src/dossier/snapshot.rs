//! Player snapshot types as reported by the metrics service

use serde::{Deserialize, Deserializer, Serialize};

/// One stack of items in a numbered inventory slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub slot: i32,
}

fn default_count() -> u32 {
    1
}

/// Point-in-time inventory, equipment and vitals of one player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub uuid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub armor: Vec<Option<ItemRef>>,
    #[serde(default)]
    pub off_hand: Option<ItemRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_inventory: Vec<Option<ItemRef>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hotbar: Vec<Option<ItemRef>>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub health: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub food: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub saturation: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub level: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub gamemode: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub ping: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dimension: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub z: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub online_seconds: f64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Numbers, numeric strings and null; anything else reads as zero
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn find_slot(items: &[Option<ItemRef>], slot: i32) -> Option<&ItemRef> {
    items.iter().flatten().find(|item| item.slot == slot)
}

impl PlayerSnapshot {
    /// Equipped armor piece in `slot` (36 boots .. 39 helmet)
    pub fn armor_in_slot(&self, slot: i32) -> Option<&ItemRef> {
        find_slot(&self.armor, slot)
    }

    /// Main inventory stack in `slot` (9..=35)
    pub fn inventory_in_slot(&self, slot: i32) -> Option<&ItemRef> {
        find_slot(&self.main_inventory, slot)
    }

    /// Hotbar stack in `slot` (0..=8)
    pub fn hotbar_in_slot(&self, slot: i32) -> Option<&ItemRef> {
        find_slot(&self.hotbar, slot)
    }
}
