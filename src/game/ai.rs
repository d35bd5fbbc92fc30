//! Built-in opponent policy.
//!
//! A greedy three-step routine run whenever a settlement's wake-up tick has
//! elapsed: advance the age when comfortably affordable, top up the army, and
//! once the army is large enough send every idle or marching unit at the
//! target settlement's base.
//!
//! All decisions go through the ordinary command API, so the same policy can
//! drive the human slot in headless matches.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::game::{
    Age, Command, Coord, MatchState, PlayerId, UnitId, UnitKind, UnitOrder,
};

/// Money kept in reserve after advancing to the second age.
const AGE_TWO_BUFFER: f64 = 300.0;

/// Money kept in reserve after advancing to the third age.
const AGE_THREE_BUFFER: f64 = 500.0;

/// Upper bound on population the AI spends on its army.
pub const ARMY_POP_LIMIT: u32 = 14;

/// Units needed before the AI commits to an attack.
pub const ATTACK_THRESHOLD: usize = 3;

/// Chance of picking a helicopter over infantry in the second age.
const HELICOPTER_CHANCE: f64 = 0.35;

/// Shortest and longest wait between activations, in ticks.
const REARM_MIN: u64 = 6;
const REARM_MAX: u64 = 12;

/// What one activation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiTurn {
    /// Commands that were accepted, in the order they were applied.
    pub commands: Vec<Command>,
    /// Units trained during the activation.
    pub trained: Vec<UnitId>,
}

/// Deterministic generator for one settlement's activation on one tick.
#[must_use]
pub fn activation_rng(seed: u64, tick: u64, player: PlayerId) -> ChaCha8Rng {
    let mixed = seed
        ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ u64::from(player).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    ChaCha8Rng::seed_from_u64(mixed)
}

/// Run one activation of the policy for `player`.
///
/// Rejected commands are dropped silently; only accepted ones are returned.
pub fn decide<R: Rng>(state: &mut MatchState, player: PlayerId, rng: &mut R) -> AiTurn {
    let mut turn = AiTurn::default();
    if !state.is_alive(player) {
        return turn;
    }

    advance_age(state, player, &mut turn);
    produce(state, player, rng, &mut turn);
    commit_army(state, player, &mut turn);

    turn
}

fn advance_age(state: &mut MatchState, player: PlayerId, turn: &mut AiTurn) {
    let Some(settlement) = state.get_player(player) else {
        return;
    };
    let buffer = match settlement.age {
        Age::First => AGE_TWO_BUFFER,
        Age::Second => AGE_THREE_BUFFER,
        Age::Third => return,
    };
    let Some(next) = settlement.age.next() else {
        return;
    };
    if settlement.money < next.upgrade_cost() + buffer {
        return;
    }

    let command = Command::UpgradeAge { player };
    if state.apply(&command).is_ok() {
        debug!(player, age = next.number(), "ai advanced age");
        turn.commands.push(command);
    }
}

fn produce<R: Rng>(state: &mut MatchState, player: PlayerId, rng: &mut R, turn: &mut AiTurn) {
    let Some(settlement) = state.get_player(player) else {
        return;
    };
    let army_limit = settlement.pop_cap.min(ARMY_POP_LIMIT);
    if state.population_used(player) >= army_limit {
        return;
    }

    let kind = match settlement.age {
        Age::First => UnitKind::Infantry,
        Age::Second if rng.gen_bool(HELICOPTER_CHANCE) => UnitKind::Helicopter,
        Age::Second => UnitKind::Infantry,
        Age::Third => UnitKind::Tank,
    };

    if let Ok(id) = state.train_unit(player, kind) {
        turn.commands.push(Command::TrainUnit { player, kind });
        turn.trained.push(id);
    }
}

fn commit_army(state: &mut MatchState, player: PlayerId, turn: &mut AiTurn) {
    if state.units_of(player).count() < ATTACK_THRESHOLD {
        return;
    }
    let Some(target) = pick_target(state, player) else {
        return;
    };

    let units: Vec<UnitId> = state
        .units_of(player)
        .filter(|u| matches!(u.order, UnitOrder::Idle | UnitOrder::Move { .. }))
        .map(|u| u.id)
        .collect();
    if units.is_empty() {
        return;
    }

    let order = UnitOrder::Attack {
        target,
        target_owner: None,
    };
    state.issue_order(&units, order);
    debug!(player, %target, units = units.len(), "ai ordered attack");

    // Record the order as resolved so a replay reproduces it exactly.
    let resolved = state
        .get_unit(units[0])
        .map_or(order, |unit| unit.order);
    turn.commands.push(Command::IssueOrder {
        units,
        order: resolved,
    });
}

/// Base of the settlement to attack: the local player if alive, else the
/// first other live settlement.
#[must_use]
pub fn pick_target(state: &MatchState, player: PlayerId) -> Option<Coord> {
    let local = state.local_player;
    if local != player
        && let Some(human) = state.get_player(local)
        && human.is_alive()
    {
        return Some(human.base);
    }

    state
        .alive_players()
        .find(|p| p.id != player)
        .map(|p| p.base)
}

/// Run every AI settlement whose wake-up tick has elapsed.
///
/// Each activation re-arms the settlement `6..=12` ticks ahead. Returns the
/// units trained across all activations.
pub fn run_ai_phase(state: &mut MatchState) -> Vec<UnitId> {
    let tick = state.tick;
    let due: Vec<PlayerId> = state
        .players
        .iter()
        .filter(|p| p.is_ai && p.is_alive())
        .filter(|p| p.ai_next_action_tick.is_some_and(|next| next <= tick))
        .map(|p| p.id)
        .collect();

    let mut trained = Vec::new();
    for player in due {
        let mut rng = activation_rng(state.seed, tick, player);
        let wait = rng.gen_range(REARM_MIN..=REARM_MAX);
        if let Some(settlement) = state.get_player_mut(player) {
            settlement.ai_next_action_tick = Some(tick + wait);
        }

        let turn = decide(state, player, &mut rng);
        trained.extend(turn.trained);
    }
    trained
}
