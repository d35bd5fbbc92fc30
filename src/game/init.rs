//! Match initialization: anchors, base placement and starter bases.

use tracing::{info, warn};

use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::game::{
    generate_terrain, recompute_derived, BuildingKind, Coord, Map, MatchState, PlayerId,
    Settlement, UnitKind, HUMAN_PLAYER,
};

/// Smallest map that fits the corner layout.
pub const MIN_MAP_SIZE: u16 = 32;

/// Largest ring searched for buildable land around an anchor.
pub const BASE_SEARCH_RADIUS: i32 = 12;

/// Infantry every settlement starts with.
const STARTER_INFANTRY: usize = 2;

/// Starter base layout as `(dx, dy, kind)` offsets from the anchor.
const STARTER_LAYOUT: [(i32, i32, BuildingKind); 9] = [
    (0, 0, BuildingKind::CityHall),
    (0, 2, BuildingKind::Road),
    (1, 2, BuildingKind::Road),
    (2, 2, BuildingKind::Road),
    (3, 2, BuildingKind::Road),
    (2, 0, BuildingKind::HouseSmall),
    (2, 1, BuildingKind::HouseSmall),
    (0, 3, BuildingKind::Factory),
    (2, 3, BuildingKind::Barracks),
];

const AI_NAMES: [&str; 3] = ["Crimson Pact", "Verdant League", "Amber Dominion"];

/// Create a match on freshly generated terrain.
///
/// Uses `config.seed`, or 0 when absent; hosts that want a random match pick
/// the seed themselves.
///
/// # Errors
///
/// Returns an error if the opponent count or map size is unsupported.
pub fn create_match(config: &MatchConfig) -> Result<MatchState, MatchError> {
    check_setup(config.map_size, config.opponents)?;
    let seed = config.seed.unwrap_or(0);
    let map = generate_terrain(config.map_size, seed).ok_or(MatchError::MapTooSmall {
        size: config.map_size,
        min: MIN_MAP_SIZE,
    })?;
    create_match_on_map(map, config)
}

/// Create a match on a host-provided map.
///
/// # Errors
///
/// Returns an error if the opponent count is unsupported or the map is not a
/// `map_size` square.
pub fn create_match_on_map(mut map: Map, config: &MatchConfig) -> Result<MatchState, MatchError> {
    check_setup(config.map_size, config.opponents)?;
    if map.width() != config.map_size || map.height() != config.map_size {
        return Err(MatchError::MapSizeMismatch {
            width: map.width(),
            height: map.height(),
            expected: config.map_size,
        });
    }

    let anchors = anchor_points(config.map_size, config.opponents);
    let mut players = Vec::with_capacity(anchors.len());

    for (slot, anchor) in anchors.into_iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let id = slot as PlayerId + HUMAN_PLAYER;
        let base = resolve_base_tile(&map, anchor);
        stamp_starter_base(&mut map, base, id);

        let mut player = if id == HUMAN_PLAYER {
            Settlement::new(id, "You", false, base)
        } else {
            Settlement::new(id, AI_NAMES[slot - 1], true, base)
        };
        player.money = config.starting_money;
        players.push(player);
    }

    let mut state = MatchState::new(map, players, HUMAN_PLAYER, config.seed.unwrap_or(0));
    let homes: Vec<(PlayerId, Coord)> = state.players.iter().map(|p| (p.id, p.base)).collect();
    for (id, base) in homes {
        let spawn = spawn_tile(&state.map, base);
        for _ in 0..STARTER_INFANTRY {
            state.spawn_unit(id, UnitKind::Infantry, spawn);
        }
    }

    recompute_derived(&mut state);
    info!(
        map_size = config.map_size,
        players = state.players.len(),
        seed = state.seed,
        "match created"
    );
    Ok(state)
}

fn check_setup(map_size: u16, opponents: usize) -> Result<(), MatchError> {
    if opponents < 1 {
        return Err(MatchError::TooFewOpponents(opponents));
    }
    if opponents > 3 {
        return Err(MatchError::TooManyOpponents(opponents));
    }
    if map_size < MIN_MAP_SIZE {
        return Err(MatchError::MapTooSmall {
            size: map_size,
            min: MIN_MAP_SIZE,
        });
    }
    Ok(())
}

/// Edge margin for anchors: `max(12, 0.12 * size)`.
#[must_use]
pub fn anchor_margin(size: u16) -> u16 {
    // 12% computed in integers: floor(size * 12 / 100).
    #[allow(clippy::cast_possible_truncation)]
    let proportional = (u32::from(size) * 12 / 100) as u16;
    proportional.max(12)
}

/// Anchor tiles for the human (first) and `opponents` AI settlements.
///
/// The human always takes the top-left corner.
#[must_use]
pub fn anchor_points(size: u16, opponents: usize) -> Vec<Coord> {
    let m = anchor_margin(size);
    let far = size.saturating_sub(1).saturating_sub(m);
    let top_left = Coord::new(m, m);
    let top_right = Coord::new(far, m);
    let bottom_left = Coord::new(m, far);
    let bottom_right = Coord::new(far, far);
    let bottom_center = Coord::new(size / 2, far);

    match opponents {
        1 => vec![top_left, bottom_right],
        2 => vec![top_left, top_right, bottom_center],
        _ => vec![top_left, top_right, bottom_left, bottom_right],
    }
}

/// Resolve an anchor to the nearest buildable tile.
///
/// Searches rings of radius 1 to [`BASE_SEARCH_RADIUS`], perimeter cells
/// only. Falls back to the anchor itself when nothing is found.
#[must_use]
pub fn resolve_base_tile(map: &Map, anchor: Coord) -> Coord {
    if map.is_buildable(anchor) {
        return anchor;
    }

    for radius in 1..=BASE_SEARCH_RADIUS {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                if let Some(candidate) = anchor.offset(dx, dy)
                    && map.is_buildable(candidate)
                {
                    return candidate;
                }
            }
        }
    }

    warn!(%anchor, "no buildable land near anchor, placing base anyway");
    anchor
}

/// Stamp the starter base for `owner` at `base`.
///
/// Placements that would leave the map are skipped.
pub fn stamp_starter_base(map: &mut Map, base: Coord, owner: PlayerId) {
    for (dx, dy, kind) in STARTER_LAYOUT {
        if let Some(coord) = base.offset(dx, dy) {
            map.place_building(coord, kind, Some(owner));
        }
    }
}

/// Tile new units appear on: one step down-right of the base, clamped.
#[must_use]
pub fn spawn_tile(map: &Map, base: Coord) -> Coord {
    map.clamp(Coord::new(base.x.saturating_add(1), base.y.saturating_add(1)))
}
