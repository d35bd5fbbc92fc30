//! Map, tile and building types.
//!
//! The grid is a flat arena of tiles in row-major order. Every tile carries a
//! [`Building`], including terrain-like payloads (grass, water, road, trees),
//! so ownership and the destruction gauge live in one place.

use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// How far back/up [`Map::find_origin`] looks for the anchor of a structure.
pub const ORIGIN_SEARCH_RADIUS: u16 = 4;

/// Destruction gauge value at which a structure is cleared.
pub const DESTRUCTION_THRESHOLD: f64 = 100.0;

/// A coordinate on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Offset this coordinate, returning `None` if it would go negative or
    /// overflow.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = u16::try_from(i32::from(self.x) + dx).ok()?;
        let y = u16::try_from(i32::from(self.y) + dy).ok()?;
        Some(Self { x, y })
    }

    /// Euclidean distance in tiles.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Type identifier of the building payload on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Empty buildable land.
    Grass,
    /// Open water, never buildable.
    Water,
    /// Road segment.
    Road,
    /// Rail segment.
    Rail,
    /// Vegetation.
    Tree,
    /// Housing tier 1.
    HouseSmall,
    /// Housing tier 2.
    HouseMedium,
    /// Housing tier 3.
    Apartment,
    /// Housing tier 4.
    Tower,
    /// Production building.
    Factory,
    /// Commerce building (retail).
    Shop,
    /// Commerce building (offices).
    Office,
    /// Transport hub.
    TrainStation,
    /// Command structure. Losing the last one eliminates a settlement.
    CityHall,
    /// Military depot stamped into every starter base. Unit kinds are gated
    /// by age alone; the depot counts toward structures and score only.
    Barracks,
}

impl BuildingKind {
    /// Footprint size `(width, height)` in tiles.
    #[must_use]
    pub const fn footprint(self) -> (u16, u16) {
        match self {
            Self::CityHall | Self::Factory | Self::TrainStation => (2, 2),
            _ => (1, 1),
        }
    }

    /// Whether this kind counts as a structure (for score and combat).
    ///
    /// Terrain, roads, rail, vegetation and empty land never count.
    #[must_use]
    pub const fn is_structure(self) -> bool {
        !matches!(
            self,
            Self::Grass | Self::Water | Self::Road | Self::Rail | Self::Tree
        )
    }

    /// Whether a new structure may be placed over this kind.
    #[must_use]
    pub const fn is_buildable(self) -> bool {
        matches!(self, Self::Grass | Self::Tree)
    }

    /// Population capacity provided by a housing tier, zero otherwise.
    #[must_use]
    pub const fn housing_capacity(self) -> u32 {
        match self {
            Self::HouseSmall => 5,
            Self::HouseMedium => 10,
            Self::Apartment => 20,
            Self::Tower => 40,
            _ => 0,
        }
    }

    /// Residents a freshly placed building of this kind holds.
    #[must_use]
    pub const fn default_population(self) -> u32 {
        match self {
            Self::HouseSmall => 4,
            Self::HouseMedium => 8,
            Self::Apartment => 16,
            Self::Tower => 30,
            _ => 0,
        }
    }

    /// Passive income bonus per simulated second.
    #[must_use]
    pub const fn income_bonus(self) -> f64 {
        match self {
            Self::CityHall => 8.0,
            Self::Factory => 6.0,
            Self::Shop => 4.0,
            Self::Office => 5.0,
            Self::TrainStation => 10.0,
            _ => 0.0,
        }
    }
}

/// Building payload of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Type of the building.
    pub kind: BuildingKind,
    /// Owning settlement (None = neutral).
    pub owner: Option<PlayerId>,
    /// Residents (only meaningful for housing).
    pub population: u32,
    /// Destruction gauge, 0-100. Only accumulated on origin tiles.
    pub damage: f64,
    /// Whether this tile is the top-left anchor of its footprint.
    pub origin: bool,
}

impl Building {
    /// Create a neutral, undamaged single-tile payload.
    #[must_use]
    pub const fn new(kind: BuildingKind) -> Self {
        Self {
            kind,
            owner: None,
            population: 0,
            damage: 0.0,
            origin: true,
        }
    }
}

/// A single tile on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// The building payload.
    pub building: Building,
}

impl Tile {
    /// Create a tile holding a neutral building of the given kind.
    #[must_use]
    pub const fn new(kind: BuildingKind) -> Self {
        Self {
            building: Building::new(kind),
        }
    }

    /// Create an empty grass tile.
    #[must_use]
    pub const fn grass() -> Self {
        Self::new(BuildingKind::Grass)
    }

    /// Create a water tile.
    #[must_use]
    pub const fn water() -> Self {
        Self::new(BuildingKind::Water)
    }

    /// Create a tree tile.
    #[must_use]
    pub const fn tree() -> Self {
        Self::new(BuildingKind::Tree)
    }

    /// Kind of the building on this tile.
    #[must_use]
    pub const fn kind(&self) -> BuildingKind {
        self.building.kind
    }

    /// Owner of the building on this tile.
    #[must_use]
    pub const fn owner(&self) -> Option<PlayerId> {
        self.building.owner
    }
}

/// The shared tile grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    /// Width of the map in tiles.
    width: u16,
    /// Height of the map in tiles.
    height: u16,
    /// Tiles stored in row-major order.
    tiles: Vec<Tile>,
}

impl Map {
    /// Create a new map filled with grass.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            tiles: vec![Tile::grass(); size],
        })
    }

    /// Get the width of the map.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the height of the map.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Raw tiles in row-major order.
    #[must_use]
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Check if a coordinate is within the map bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Clamp a coordinate into the map bounds.
    #[must_use]
    pub fn clamp(&self, coord: Coord) -> Coord {
        Coord::new(
            coord.x.min(self.width - 1),
            coord.y.min(self.height - 1),
        )
    }

    fn coord_to_index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
        } else {
            None
        }
    }

    /// Get a reference to the tile at the given coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.coord_to_index(coord).map(|idx| &self.tiles[idx])
    }

    /// Get a mutable reference to the tile at the given coordinate.
    #[must_use]
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.coord_to_index(coord).map(|idx| &mut self.tiles[idx])
    }

    /// Set the tile at the given coordinate.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set(&mut self, coord: Coord, tile: Tile) -> bool {
        if let Some(idx) = self.coord_to_index(coord) {
            self.tiles[idx] = tile;
            true
        } else {
            false
        }
    }

    /// Iterate over all coordinates and tiles.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        let width = usize::from(self.width);
        self.tiles.iter().enumerate().map(move |(idx, tile)| {
            #[allow(clippy::cast_possible_truncation)]
            let coord = Coord::new((idx % width) as u16, (idx / width) as u16);
            (coord, tile)
        })
    }

    /// Iterate over origin tiles of structures owned by a player.
    pub fn structures_owned_by(&self, player: PlayerId) -> impl Iterator<Item = (Coord, &Tile)> {
        self.iter().filter(move |(_, tile)| {
            tile.building.origin
                && tile.building.owner == Some(player)
                && tile.building.kind.is_structure()
        })
    }

    /// Whether a structure could be placed on this tile.
    #[must_use]
    pub fn is_buildable(&self, coord: Coord) -> bool {
        self.get(coord)
            .is_some_and(|tile| tile.building.kind.is_buildable())
    }

    /// Place a building with its full footprint, anchored at `coord`.
    ///
    /// Returns `false` (and leaves the map untouched) if any footprint tile
    /// is out of bounds.
    pub fn place_building(
        &mut self,
        coord: Coord,
        kind: BuildingKind,
        owner: Option<PlayerId>,
    ) -> bool {
        let (w, h) = kind.footprint();
        let far_corner = Coord::new(
            coord.x.saturating_add(w - 1),
            coord.y.saturating_add(h - 1),
        );
        if !self.in_bounds(coord) || !self.in_bounds(far_corner) {
            return false;
        }

        for dy in 0..h {
            for dx in 0..w {
                let building = Building {
                    kind,
                    owner,
                    population: if dx == 0 && dy == 0 {
                        kind.default_population()
                    } else {
                        0
                    },
                    damage: 0.0,
                    origin: dx == 0 && dy == 0,
                };
                self.set(Coord::new(coord.x + dx, coord.y + dy), Tile { building });
            }
        }
        true
    }

    /// Resolve the origin tile of the structure covering `coord`.
    ///
    /// Scans up to [`ORIGIN_SEARCH_RADIUS`] tiles back and up, nearest first,
    /// for a structural origin whose footprint covers `coord`.
    #[must_use]
    pub fn find_origin(&self, coord: Coord) -> Option<Coord> {
        if !self.in_bounds(coord) {
            return None;
        }

        for reach in 0..=2 * ORIGIN_SEARCH_RADIUS {
            for dy in 0..=reach.min(ORIGIN_SEARCH_RADIUS) {
                let dx = reach - dy;
                if dx > ORIGIN_SEARCH_RADIUS || dx > coord.x || dy > coord.y {
                    continue;
                }
                let candidate = Coord::new(coord.x - dx, coord.y - dy);
                let Some(tile) = self.get(candidate) else {
                    continue;
                };
                let building = &tile.building;
                let (w, h) = building.kind.footprint();
                if building.origin && building.kind.is_structure() && dx < w && dy < h {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Convert the structure anchored at `origin` into neutral grass.
    ///
    /// Returns the kind and owner that were cleared, or `None` if `origin`
    /// does not hold a structural origin.
    pub fn clear_structure(&mut self, origin: Coord) -> Option<(BuildingKind, Option<PlayerId>)> {
        let building = self.get(origin)?.building;
        if !building.origin || !building.kind.is_structure() {
            return None;
        }

        let (w, h) = building.kind.footprint();
        for dy in 0..h {
            for dx in 0..w {
                let coord = Coord::new(origin.x + dx, origin.y + dy);
                if let Some(tile) = self.get_mut(coord)
                    && tile.building.kind == building.kind
                    && tile.building.owner == building.owner
                {
                    *tile = Tile::grass();
                }
            }
        }
        Some((building.kind, building.owner))
    }

    /// Whether a player still owns a command structure.
    #[must_use]
    pub fn has_command_structure(&self, player: PlayerId) -> bool {
        self.structures_owned_by(player)
            .any(|(_, tile)| tile.building.kind == BuildingKind::CityHall)
    }
}
