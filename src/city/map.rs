use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use slab::Slab;
use smallvec::SmallVec;

use super::{
    Building, BuildingKind, BuildingStore, Climate, Figure, FigureAction, FigureKind,
    FigureStore, ScenarioInfo, TerrainFlags, TerrainStore,
};
use crate::{
    log,
    utils::{
        Size,
        coords::{self, Cell, GridOffset, GRID_SIZE},
    },
};

// ----------------------------------------------
// Constants
// ----------------------------------------------

const GRID_CELL_COUNT: usize = (GRID_SIZE * GRID_SIZE) as usize;
const MAX_BUILDING_SIZE: u8 = 5;

// Most cells hold at most a couple of walkers.
type CellFigures = SmallVec<[Figure; 2]>;

pub type BuildingKey = usize;

// ----------------------------------------------
// CityMap
// ----------------------------------------------

// Grid-backed city state, indexed by grid offset.
pub struct CityMap {
    map_size: Size,
    map_start: Cell,
    climate: Climate,

    terrain: Vec<TerrainFlags>,
    random: Vec<u8>,

    buildings: Slab<Building>,
    building_ids: Vec<Option<BuildingKey>>,
    draw_tiles: Vec<bool>,
    footprint_sizes: Vec<u8>,

    figures: Vec<CellFigures>,
}

impl CityMap {
    pub fn new(map_size: Size, climate: Climate) -> Self {
        let map_size = Size::new(
            map_size.width.clamp(0, GRID_SIZE),
            map_size.height.clamp(0, GRID_SIZE),
        );

        Self {
            map_size,
            map_start: coords::map_start_cell(map_size),
            climate,
            terrain: vec![TerrainFlags::empty(); GRID_CELL_COUNT],
            random: vec![0; GRID_CELL_COUNT],
            buildings: Slab::new(),
            building_ids: vec![None; GRID_CELL_COUNT],
            draw_tiles: vec![false; GRID_CELL_COUNT],
            footprint_sizes: vec![0; GRID_CELL_COUNT],
            figures: vec![CellFigures::new(); GRID_CELL_COUNT],
        }
    }

    #[inline]
    pub fn map_size(&self) -> Size {
        self.map_size
    }

    #[inline]
    pub fn set_climate(&mut self, climate: Climate) {
        self.climate = climate;
    }

    // Grid offset of a cell given in map-relative coordinates.
    pub fn map_cell(&self, x: i32, y: i32) -> Option<GridOffset> {
        if x < 0 || y < 0 || x >= self.map_size.width || y >= self.map_size.height {
            return None;
        }
        GridOffset::from_cell(Cell::new(self.map_start.x + x, self.map_start.y + y))
    }

    // ----------------------
    // Terrain:
    // ----------------------

    #[inline]
    pub fn set_terrain(&mut self, grid_offset: GridOffset, flags: TerrainFlags) {
        self.terrain[grid_offset.index()] = flags;
    }

    #[inline]
    pub fn add_terrain(&mut self, grid_offset: GridOffset, flags: TerrainFlags) {
        self.terrain[grid_offset.index()] |= flags;
    }

    #[inline]
    pub fn set_random(&mut self, grid_offset: GridOffset, value: u8) {
        self.random[grid_offset.index()] = value;
    }

    // ----------------------
    // Buildings:
    // ----------------------

    // Places a building with its top cell at `base` covering `size x size` cells.
    // The footprint's leftmost cell, (base.x, base.y + size - 1), becomes the
    // draw tile. Returns None if the footprint leaves the grid or overlaps
    // another building.
    pub fn add_building(&mut self, kind: BuildingKind, base: GridOffset, house_size: u8) -> Option<BuildingKey> {
        let size = kind.default_size().clamp(1, MAX_BUILDING_SIZE);
        let base_cell = base.to_cell();

        let mut footprint: SmallVec<[GridOffset; 25]> = SmallVec::new();
        for dy in 0..size as i32 {
            for dx in 0..size as i32 {
                let offset = GridOffset::from_cell(Cell::new(base_cell.x + dx, base_cell.y + dy))?;
                if self.building_ids[offset.index()].is_some() {
                    log::warn!(log::channel!("city"), "Cannot place {kind} at {base_cell}: cell {offset} is occupied.");
                    return None;
                }
                footprint.push(offset);
            }
        }

        let key = self.buildings.insert(Building { kind, house_size, size });
        let draw_tile = GridOffset::from_cell(Cell::new(base_cell.x, base_cell.y + size as i32 - 1));

        for offset in footprint {
            let index = offset.index();
            self.building_ids[index] = Some(key);
            self.footprint_sizes[index] = size;
            self.draw_tiles[index] = Some(offset) == draw_tile;
            self.terrain[index] |= TerrainFlags::Building;
        }

        Some(key)
    }

    pub fn remove_building(&mut self, key: BuildingKey) -> bool {
        if self.buildings.try_remove(key).is_none() {
            return false;
        }

        for index in 0..GRID_CELL_COUNT {
            if self.building_ids[index] == Some(key) {
                self.building_ids[index] = None;
                self.footprint_sizes[index] = 0;
                self.draw_tiles[index] = false;
                self.terrain[index].remove(TerrainFlags::Building);
            }
        }

        true
    }

    #[inline]
    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    // ----------------------
    // Figures:
    // ----------------------

    #[inline]
    pub fn add_figure(&mut self, grid_offset: GridOffset, figure: Figure) {
        self.figures[grid_offset.index()].push(figure);
    }

    #[inline]
    pub fn clear_figures(&mut self, grid_offset: GridOffset) {
        self.figures[grid_offset.index()].clear();
    }

    // ----------------------
    // Sample city:
    // ----------------------

    // Builds a deterministic sample city for the given seed.
    pub fn generate(seed: u64, map_size: Size, climate: Climate) -> Self {
        let mut city = Self::new(map_size, climate);
        let mut rng = Pcg64::seed_from_u64(seed);
        let size = city.map_size;

        for y in 0..size.height {
            for x in 0..size.width {
                if let Some(offset) = city.map_cell(x, y) {
                    city.set_random(offset, rng.random());
                }
            }
        }

        // Natural features, as blobs of terrain.
        let features = [
            (TerrainFlags::Water,     3, 8),
            (TerrainFlags::Tree,      6, 5),
            (TerrainFlags::Scrub,     4, 3),
            (TerrainFlags::Rock,      4, 3),
            (TerrainFlags::Elevation, 2, 4),
            (TerrainFlags::Meadow,    5, 4),
        ];

        for (flags, count, radius) in features {
            for _ in 0..count {
                let cx = rng.random_range(0..size.width.max(1));
                let cy = rng.random_range(0..size.height.max(1));
                city.stamp_blob(cx, cy, radius, flags);
            }
        }

        // A road grid every 8 cells, plus an aqueduct and wall line.
        for y in 0..size.height {
            for x in 0..size.width {
                let Some(offset) = city.map_cell(x, y) else { continue };
                let terrain = city.terrain[offset.index()];
                if !terrain.is_empty() {
                    continue;
                }
                if x % 8 == 0 || y % 8 == 0 {
                    city.set_terrain(offset, TerrainFlags::Road);
                } else if y == size.height / 3 {
                    city.set_terrain(offset, TerrainFlags::Aqueduct);
                } else if x == size.width - 2 {
                    city.set_terrain(offset, TerrainFlags::Wall);
                }
            }
        }

        // Buildings on free land between the roads.
        let kinds = [
            BuildingKind::House,
            BuildingKind::House,
            BuildingKind::House,
            BuildingKind::Market,
            BuildingKind::Prefecture,
            BuildingKind::Reservoir,
            BuildingKind::Granary,
            BuildingKind::Temple,
            BuildingKind::Fort,
            BuildingKind::FortGround,
            BuildingKind::Senate,
        ];

        for block_y in (1..size.height - 5).step_by(8) {
            for block_x in (1..size.width - 5).step_by(8) {
                let kind = kinds[rng.random_range(0..kinds.len())];
                if !city.is_free_land(block_x, block_y, kind.default_size()) {
                    continue;
                }
                let Some(base) = city.map_cell(block_x, block_y) else { continue };
                let house_size = if kind == BuildingKind::House { 1 } else { 0 };
                city.add_building(kind, base, house_size);
            }
        }

        // Walkers.
        let walkers = [
            Figure::new(FigureKind::Citizen, FigureAction::Roaming),
            Figure::new(FigureKind::FortLegionary, FigureAction::Idle),
            Figure::new(FigureKind::EnemyBarbarian, FigureAction::Fighting),
            Figure::new(FigureKind::IndigenousNative, FigureAction::NativeAttacking),
            Figure::new(FigureKind::Wolf, FigureAction::Roaming),
        ];

        for _ in 0..(size.width * size.height / 40).max(1) {
            let x = rng.random_range(0..size.width.max(1));
            let y = rng.random_range(0..size.height.max(1));
            if let Some(offset) = city.map_cell(x, y) {
                city.add_figure(offset, walkers[rng.random_range(0..walkers.len())]);
            }
        }

        log::info!(log::channel!("city"), "Generated sample city {size} with {} buildings (seed: {seed}).",
                   city.building_count());
        city
    }

    fn stamp_blob(&mut self, cx: i32, cy: i32, radius: i32, flags: TerrainFlags) {
        for y in (cy - radius)..=(cy + radius) {
            for x in (cx - radius)..=(cx + radius) {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                if let Some(offset) = self.map_cell(x, y) {
                    self.set_terrain(offset, flags);
                }
            }
        }
    }

    // Map-relative check that a footprint only covers untouched land.
    fn is_free_land(&self, x: i32, y: i32, size: u8) -> bool {
        for dy in 0..size as i32 {
            for dx in 0..size as i32 {
                let Some(offset) = self.map_cell(x + dx, y + dy) else {
                    return false;
                };
                if !self.terrain[offset.index()].is_empty() {
                    return false;
                }
            }
        }
        true
    }
}

// ----------------------------------------------
// Store implementations
// ----------------------------------------------

impl TerrainStore for CityMap {
    #[inline]
    fn terrain_at(&self, grid_offset: GridOffset) -> TerrainFlags {
        self.terrain[grid_offset.index()]
    }

    #[inline]
    fn random_at(&self, grid_offset: GridOffset) -> u8 {
        self.random[grid_offset.index()]
    }
}

impl BuildingStore for CityMap {
    #[inline]
    fn building_at(&self, grid_offset: GridOffset) -> Option<&Building> {
        self.building_ids[grid_offset.index()].and_then(|key| self.buildings.get(key))
    }

    #[inline]
    fn is_draw_tile(&self, grid_offset: GridOffset) -> bool {
        self.draw_tiles[grid_offset.index()]
    }

    #[inline]
    fn footprint_size(&self, grid_offset: GridOffset) -> u8 {
        self.footprint_sizes[grid_offset.index()]
    }
}

impl FigureStore for CityMap {
    fn for_each_figure_at<F>(&self, grid_offset: GridOffset, mut visitor_fn: F)
        where F: FnMut(&Figure)
    {
        for figure in &self.figures[grid_offset.index()] {
            visitor_fn(figure);
        }
    }
}

impl ScenarioInfo for CityMap {
    #[inline]
    fn climate(&self) -> Climate {
        self.climate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_footprint_stamping() {
        let mut city = CityMap::new(Size::new(40, 40), Climate::Central);
        let base = city.map_cell(10, 10).unwrap();
        let key = city.add_building(BuildingKind::Reservoir, base, 0).unwrap();

        let mut draw_tiles = 0;
        for dy in 0..3 {
            for dx in 0..3 {
                let offset = city.map_cell(10 + dx, 10 + dy).unwrap();
                assert!(city.terrain_at(offset).contains(TerrainFlags::Building));
                assert_eq!(city.footprint_size(offset), 3);
                assert_eq!(city.building_at(offset).unwrap().kind, BuildingKind::Reservoir);
                if city.is_draw_tile(offset) {
                    draw_tiles += 1;
                    // Leftmost footprint cell.
                    assert_eq!((dx, dy), (0, 2));
                }
            }
        }
        assert_eq!(draw_tiles, 1);

        // Overlapping placement is rejected.
        let overlap = city.map_cell(11, 11).unwrap();
        assert!(city.add_building(BuildingKind::Market, overlap, 0).is_none());

        assert!(city.remove_building(key));
        assert!(city.building_at(base).is_none());
        assert!(!city.terrain_at(base).contains(TerrainFlags::Building));
        assert!(!city.remove_building(key));
    }

    #[test]
    fn test_figures_per_cell() {
        let mut city = CityMap::new(Size::new(40, 40), Climate::Northern);
        let offset = city.map_cell(5, 5).unwrap();
        city.add_figure(offset, Figure::new(FigureKind::Wolf, FigureAction::Roaming));
        city.add_figure(offset, Figure::new(FigureKind::Citizen, FigureAction::Idle));
        city.add_figure(offset, Figure::new(FigureKind::FortMounted, FigureAction::Idle));

        let mut kinds = Vec::new();
        city.for_each_figure_at(offset, |figure| kinds.push(figure.kind));
        assert_eq!(kinds, [FigureKind::Wolf, FigureKind::Citizen, FigureKind::FortMounted]);

        city.clear_figures(offset);
        let mut count = 0;
        city.for_each_figure_at(offset, |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = CityMap::generate(1234, Size::new(64, 48), Climate::Desert);
        let b = CityMap::generate(1234, Size::new(64, 48), Climate::Desert);

        assert_eq!(a.building_count(), b.building_count());
        for y in 0..48 {
            for x in 0..64 {
                let offset = a.map_cell(x, y).unwrap();
                assert_eq!(a.terrain_at(offset), b.terrain_at(offset));
                assert_eq!(a.random_at(offset), b.random_at(offset));
            }
        }
        assert_eq!(a.climate(), Climate::Desert);
    }
}
