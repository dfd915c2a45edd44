//! Text rendering of server statistics

use crate::dossier::snapshot::PlayerSnapshot;
use crate::metrics::stats::ServerStats;

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

const HEAP_BAR_CELLS: usize = 10;
const FILLED_CELL: char = '█';
const EMPTY_CELL: char = '░';

pub const OFFLINE_MESSAGE: &str = "ExoMetric - Offline\nThe Minecraft server is not responding.";

/// Format a byte count with 1024-based units and two decimals
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size > 1024.0 && unit < BYTE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, BYTE_UNITS[unit])
}

pub fn format_uptime(seconds: u64) -> String {
    if seconds < 3600 {
        format!("{}m", seconds / 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

/// In-game time of day as `HH:MM`; tick 0 is 06:00
pub fn world_clock(ticks: u64) -> String {
    let hours = (ticks / 1000 + 6) % 24;
    let minutes = (ticks % 1000) * 60 / 1000;
    format!("{:02}:{:02}", hours, minutes)
}

/// Ten-cell usage bar followed by the percentage
pub fn heap_bar(used: u64, max: u64) -> String {
    let percent = used as f64 / max.max(1) as f64 * 100.0;
    let filled = ((percent / 10.0) as usize).min(HEAP_BAR_CELLS);

    let mut bar = String::with_capacity(HEAP_BAR_CELLS * FILLED_CELL.len_utf8());
    bar.extend(std::iter::repeat_n(FILLED_CELL, filled));
    bar.extend(std::iter::repeat_n(EMPTY_CELL, HEAP_BAR_CELLS - filled));
    format!("{} ({:.1}%)", bar, percent)
}

/// Multi-line status summary, or the offline notice when no stats are known
pub fn format_status(stats: Option<&ServerStats>) -> String {
    let Some(stats) = stats else {
        return OFFLINE_MESSAGE.to_string();
    };

    let weather = if stats.is_raining { "Raining" } else { "Clear" };
    let difficulty = if stats.difficulty.is_empty() {
        "NORMAL".to_string()
    } else {
        stats.difficulty.to_uppercase()
    };

    [
        "ExoMetric - Online".to_string(),
        format!(
            "CPU: {}%  RAM: {}",
            stats.cpu_percent,
            format_bytes(stats.memory_bytes)
        ),
        format!(
            "Network: in {}/s  out {}/s",
            format_bytes(stats.network_rx_bytes),
            format_bytes(stats.network_tx_bytes)
        ),
        format!("Players: {}", stats.players_online),
        format!("Uptime: {}", format_uptime(stats.uptime_seconds)),
        format!(
            "World: day {}  {}  {}  {}",
            stats.world_day,
            world_clock(stats.world_time),
            weather,
            difficulty
        ),
        format!(
            "Chunks: {}  Disk: {}",
            stats.loaded_chunks,
            format_bytes(stats.disk_bytes)
        ),
        format!("Seed: {}", stats.world_seed),
        format!("TPS: {:.2}  MSPT: {:.2}ms", stats.tps, stats.mspt),
        format!(
            "Heap: {}  {} / {}",
            heap_bar(stats.heap_used_bytes, stats.heap_max_bytes),
            format_bytes(stats.heap_used_bytes),
            format_bytes(stats.heap_max_bytes)
        ),
    ]
    .join("\n")
}

/// First letter upper case, the rest lower case
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `minecraft:the_nether` reads as `The nether`
fn dimension_name(dimension: &str) -> String {
    let name = dimension.rsplit(':').next().unwrap_or(dimension);
    capitalize(&name.replace('_', " "))
}

/// Vitals, attributes and location of one player
pub fn format_player(player: &PlayerSnapshot) -> String {
    let gamemode = capitalize(player.gamemode.as_deref().unwrap_or("SURVIVAL"));
    let dimension = dimension_name(player.dimension.as_deref().unwrap_or("???"));

    [
        format!("Dossier: {}", player.name),
        format!(
            "Health: {:.1}/20  Food: {}/20  Saturation: {:.1}",
            player.health, player.food, player.saturation
        ),
        format!(
            "Level: {}  Mode: {}  Ping: {}ms",
            player.level, gamemode, player.ping
        ),
        format!(
            "Dimension: {}  X:{} Y:{} Z:{}",
            dimension, player.x as i64, player.y as i64, player.z as i64
        ),
        format!("Online: {}", format_uptime(player.online_seconds as u64)),
    ]
    .join("\n")
}
