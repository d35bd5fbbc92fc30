//! Game layer for Skirmish.
//!
//! Implements the competitive simulation on a shared tile grid:
//! - Map with multi-tile structures and a destruction gauge
//! - Settlements with money, age and population capacity
//! - Military units, orders and greedy direct pathing
//! - Economy, AI opponents, combat and win detection
//! - The per-tick orchestrator tying it together

mod ai;
mod combat;
mod commands;
mod economy;
mod init;
mod invariants;
mod map;
mod mapgen;
mod movement;
mod player;
mod state;
mod tick;
mod unit;

pub use ai::{
    activation_rng, decide, pick_target, run_ai_phase, AiTurn, ARMY_POP_LIMIT, ATTACK_THRESHOLD,
};
pub use combat::{resolve_attack, AttackOutcome, StructureDestroyed};
pub use commands::{compute_direct_path, Command, MAX_PATH_STEPS};
pub use economy::{
    apply_income, income_of, passive_income, pop_cap, recompute_derived, score,
    tally_structures, SettlementTally, BASE_INCOME, BASE_POP_CAP,
};
pub use init::{
    anchor_margin, anchor_points, create_match, create_match_on_map, resolve_base_tile,
    spawn_tile, stamp_starter_base, BASE_SEARCH_RADIUS, MIN_MAP_SIZE,
};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use map::{
    Building, BuildingKind, Coord, Map, Tile, DESTRUCTION_THRESHOLD, ORIGIN_SEARCH_RADIUS,
};
pub use mapgen::generate_terrain;
pub use movement::advance_unit;
pub use player::{default_color, Age, PlayerId, Settlement, HUMAN_PLAYER};
pub use state::{MatchState, MatchStatus};
pub use tick::{check_eliminations, simulate_tick, TickEvents};
pub use unit::{MilitaryUnit, UnitId, UnitKind, UnitOrder, ATTACK_COOLDOWN};
