//! Canvas geometry of the dossier image
//!
//! Every coordinate here is in base pixels of the 176×166 inventory texture;
//! [`SlotPosition::canvas_origin`] converts to output pixels.

use crate::icons::fetcher::SlotKind;

/// Integer upscale applied to the base texture
pub const SCALE: u32 = 4;

pub const BASE_WIDTH: u32 = 176;
pub const BASE_HEIGHT: u32 = 166;

pub const CANVAS_WIDTH: u32 = BASE_WIDTH * SCALE;
pub const CANVAS_HEIGHT: u32 = BASE_HEIGHT * SCALE;

/// Distance between neighbouring slots
pub const SLOT_STEP: u32 = 18;

/// Edge length of an item icon
pub const ICON_SIZE: u32 = 16;

/// Edge length of an item icon on the output canvas
pub const CANVAS_ICON_SIZE: u32 = ICON_SIZE * SCALE;

/// Fill colour used when no background texture is available
pub const FALLBACK_BACKGROUND: [u8; 4] = [60, 60, 60, 255];

/// Box the body portrait is centered in
pub const CHARACTER_BOX: BaseRect = BaseRect {
    x: 26,
    y: 8,
    width: 51,
    height: 72,
};

/// Share of the character box height taken by the body portrait
pub const BODY_HEIGHT_RATIO: f32 = 0.95;

/// Armor slot ids with the silhouette shown while empty, top to bottom
pub const ARMOR_SLOTS: [(i32, SlotKind); 4] = [
    (39, SlotKind::Helmet),
    (38, SlotKind::Chestplate),
    (37, SlotKind::Leggings),
    (36, SlotKind::Boots),
];

pub const OFF_HAND: SlotPosition = SlotPosition { x: 77, y: 62 };

const GRID_LEFT: u32 = 8;
const INVENTORY_TOP: u32 = 84;
const HOTBAR_TOP: u32 = 142;
const INVENTORY_ROWS: u32 = 3;
const COLUMNS: u32 = 9;

/// First main inventory slot id; hotbar slots are 0..9
const FIRST_INVENTORY_SLOT: i32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BaseRect {
    /// The rectangle in output pixels
    pub fn scaled(&self) -> BaseRect {
        BaseRect {
            x: self.x * SCALE,
            y: self.y * SCALE,
            width: self.width * SCALE,
            height: self.height * SCALE,
        }
    }
}

/// Top-left corner of a slot in base pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPosition {
    pub x: u32,
    pub y: u32,
}

impl SlotPosition {
    pub fn canvas_origin(&self) -> (i64, i64) {
        (i64::from(self.x * SCALE), i64::from(self.y * SCALE))
    }
}

/// Position of an armor slot; 39 is the topmost (helmet) slot
pub fn armor_position(slot_id: i32) -> SlotPosition {
    let row = (39 - slot_id).clamp(0, 3) as u32;
    SlotPosition {
        x: GRID_LEFT,
        y: 8 + row * SLOT_STEP,
    }
}

/// Main inventory slot ids with their positions, row by row
pub fn inventory_slots() -> impl Iterator<Item = (i32, SlotPosition)> {
    (0..INVENTORY_ROWS).flat_map(|row| {
        (0..COLUMNS).map(move |col| {
            (
                FIRST_INVENTORY_SLOT + (row * COLUMNS + col) as i32,
                SlotPosition {
                    x: GRID_LEFT + col * SLOT_STEP,
                    y: INVENTORY_TOP + row * SLOT_STEP,
                },
            )
        })
    })
}

/// Hotbar slot ids with their positions, left to right
pub fn hotbar_slots() -> impl Iterator<Item = (i32, SlotPosition)> {
    (0..COLUMNS).map(|col| {
        (
            col as i32,
            SlotPosition {
                x: GRID_LEFT + col * SLOT_STEP,
                y: HOTBAR_TOP,
            },
        )
    })
}
