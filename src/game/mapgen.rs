//! Deterministic terrain generation.
//!
//! Stands in for the host's grid subsystem when no map is supplied: grass
//! with a handful of random-walk lakes and scattered trees.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::{BuildingKind, Coord, Map, Tile};

/// Share of grass tiles that become trees.
const TREE_DENSITY: f64 = 0.06;

/// Steps in each lake's random walk.
const LAKE_STEPS: u32 = 40;

/// Generate a `size` x `size` map from `seed`.
///
/// Returns `None` if `size` is zero.
#[must_use]
pub fn generate_terrain(size: u16, seed: u64) -> Option<Map> {
    let mut map = Map::new(size, size)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let lakes = (size / 16).max(1);
    for _ in 0..lakes {
        carve_lake(&mut map, &mut rng);
    }
    scatter_trees(&mut map, &mut rng);

    Some(map)
}

/// Random-walk a blob of water from a random start.
fn carve_lake(map: &mut Map, rng: &mut ChaCha8Rng) {
    let mut cursor = Coord::new(
        rng.gen_range(0..map.width()),
        rng.gen_range(0..map.height()),
    );

    for _ in 0..LAKE_STEPS {
        map.set(cursor, Tile::water());
        // Widen the walk into a blob.
        for (dx, dy) in [(1, 0), (0, 1)] {
            if let Some(next) = cursor.offset(dx, dy) {
                map.set(next, Tile::water());
            }
        }

        let dx = rng.gen_range(-1..=1);
        let dy = rng.gen_range(-1..=1);
        if let Some(next) = cursor.offset(dx, dy)
            && map.in_bounds(next)
        {
            cursor = next;
        }
    }
}

/// Turn a fraction of the remaining grass into trees.
fn scatter_trees(map: &mut Map, rng: &mut ChaCha8Rng) {
    for y in 0..map.height() {
        for x in 0..map.width() {
            let coord = Coord::new(x, y);
            let is_grass = map
                .get(coord)
                .is_some_and(|t| t.kind() == BuildingKind::Grass);
            if is_grass && rng.gen_bool(TREE_DENSITY) {
                map.set(coord, Tile::tree());
            }
        }
    }
}
