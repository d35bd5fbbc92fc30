//! Military units and their per-kind stat tables.

use serde::{Deserialize, Serialize};

use crate::game::{Age, Coord, PlayerId};

/// Seconds between strikes once a unit has attacked.
pub const ATTACK_COOLDOWN: f64 = 0.7;

/// Kind of military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Cheap ground unit.
    Infantry,
    /// Heavy ground unit, slowest of the three.
    Tank,
    /// Fast air unit with the longest reach.
    Helicopter,
}

impl UnitKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 3] = [Self::Infantry, Self::Tank, Self::Helicopter];

    /// Hit points of a fresh unit.
    #[must_use]
    pub const fn max_hp(self) -> u32 {
        match self {
            Self::Infantry => 40,
            Self::Tank => 120,
            Self::Helicopter => 70,
        }
    }

    /// Movement speed in tiles per second.
    #[must_use]
    pub const fn speed(self) -> f64 {
        match self {
            Self::Infantry => 2.4,
            Self::Tank => 2.1,
            Self::Helicopter => 3.0,
        }
    }

    /// Maximum Euclidean strike distance in tiles.
    #[must_use]
    pub const fn attack_range(self) -> f64 {
        match self {
            Self::Infantry => 2.2,
            Self::Tank => 3.0,
            Self::Helicopter => 3.6,
        }
    }

    /// Destruction gauge added per strike.
    #[must_use]
    pub const fn damage(self) -> f64 {
        match self {
            Self::Infantry => 4.0,
            Self::Tank => 12.0,
            Self::Helicopter => 8.0,
        }
    }

    /// Training cost.
    #[must_use]
    pub const fn cost(self) -> f64 {
        match self {
            Self::Infantry => 60.0,
            Self::Tank => 600.0,
            Self::Helicopter => 220.0,
        }
    }

    /// Population capacity consumed.
    #[must_use]
    pub const fn pop_cost(self) -> u32 {
        match self {
            Self::Infantry => 1,
            Self::Tank => 3,
            Self::Helicopter => 2,
        }
    }

    /// Minimum tier required to train this kind.
    #[must_use]
    pub const fn required_age(self) -> Age {
        match self {
            Self::Infantry => Age::First,
            Self::Helicopter => Age::Second,
            Self::Tank => Age::Third,
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Infantry => "infantry",
            Self::Tank => "tank",
            Self::Helicopter => "helicopter",
        };
        f.write_str(name)
    }
}

/// Globally unique, owner-stamped unit identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    /// Settlement that trained the unit.
    pub owner: PlayerId,
    /// Match-wide serial number.
    pub serial: u32,
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}-u{}", self.owner, self.serial)
    }
}

/// What a unit is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnitOrder {
    /// Standing still.
    #[default]
    Idle,
    /// Walking to a tile.
    Move {
        /// Destination tile.
        target: Coord,
    },
    /// Closing in on and striking a structure.
    Attack {
        /// Tile of the targeted structure.
        target: Coord,
        /// Owner of the structure when the order was issued.
        target_owner: Option<PlayerId>,
    },
}

impl UnitOrder {
    /// Target tile of a move or attack order.
    #[must_use]
    pub const fn target(&self) -> Option<Coord> {
        match self {
            Self::Idle => None,
            Self::Move { target } | Self::Attack { target, .. } => Some(*target),
        }
    }
}

/// A military unit on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilitaryUnit {
    /// Unique id.
    pub id: UnitId,
    /// Owning settlement.
    pub owner: PlayerId,
    /// Unit kind.
    pub kind: UnitKind,
    /// Current tile.
    pub tile: Coord,
    /// Fractional advancement toward the next waypoint, in [0, 1).
    pub progress: f64,
    /// Waypoints from the tile the order was issued on.
    pub path: Vec<Coord>,
    /// Index of the waypoint the unit currently stands on.
    pub path_index: usize,
    /// Current order.
    pub order: UnitOrder,
    /// Remaining hit points.
    pub hp: u32,
    /// Hit points when fresh.
    pub max_hp: u32,
    /// Seconds until the unit may strike again.
    pub attack_cooldown: f64,
}

impl MilitaryUnit {
    /// Create an idle unit at `tile`.
    #[must_use]
    pub fn new(id: UnitId, kind: UnitKind, tile: Coord) -> Self {
        Self {
            id,
            owner: id.owner,
            kind,
            tile,
            progress: 0.0,
            path: Vec::new(),
            path_index: 0,
            order: UnitOrder::Idle,
            hp: kind.max_hp(),
            max_hp: kind.max_hp(),
            attack_cooldown: 0.0,
        }
    }

    /// Drop any route and fractional progress.
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.path_index = 0;
        self.progress = 0.0;
    }

    /// Drop the current order and route.
    pub fn go_idle(&mut self) {
        self.order = UnitOrder::Idle;
        self.clear_path();
    }

    /// Whether the unit still has waypoints ahead of it.
    #[must_use]
    pub fn has_route(&self) -> bool {
        self.path.len() > 1 && self.path_index + 1 < self.path.len()
    }
}
