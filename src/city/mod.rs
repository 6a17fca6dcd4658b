use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::{
    bitflags_with_display,
    utils::{Size, coords::{GridOffset, ViewTile}},
};

pub mod map;
pub mod view;

pub use map::CityMap;
pub use view::CityView;

// ----------------------------------------------
// TerrainFlags
// ----------------------------------------------

bitflags_with_display! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TerrainFlags: u16 {
        const Tree           = 1 << 0;
        const Rock           = 1 << 1;
        const Water          = 1 << 2;
        const Building       = 1 << 3;
        const Scrub          = 1 << 4;
        const Garden         = 1 << 5;
        const Road           = 1 << 6;
        const ReservoirRange = 1 << 7;
        const Aqueduct       = 1 << 8;
        const Elevation      = 1 << 9;
        const AccessRamp     = 1 << 10;
        const Meadow         = 1 << 11;
        const Rubble         = 1 << 12;
        const FountainRange  = 1 << 13;
        const Wall           = 1 << 14;
        const Gatehouse      = 1 << 15;
    }
}

// ----------------------------------------------
// Buildings
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Reservoir,
    Fountain,
    Well,
    Prefecture,
    Market,
    Granary,
    Warehouse,
    Temple,
    Forum,
    Senate,
    Farm,
    Fort,
    FortGround,
}

impl BuildingKind {
    // Footprint edge length in cells.
    pub fn default_size(self) -> u8 {
        match self {
            Self::House | Self::Fountain | Self::Well | Self::Prefecture => 1,
            Self::Market | Self::Temple | Self::Forum => 2,
            Self::Reservoir | Self::Granary | Self::Warehouse | Self::Farm | Self::Fort => 3,
            Self::FortGround => 4,
            Self::Senate => 5,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Building {
    pub kind: BuildingKind,
    // Non-zero for population buildings only.
    pub house_size: u8,
    // Footprint edge length, 1..=5.
    pub size: u8,
}

impl Building {
    #[inline]
    pub fn is_house(&self) -> bool {
        self.house_size != 0
    }
}

// ----------------------------------------------
// Figures
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum FigureKind {
    // Civilians:
    Citizen,
    Prefect,
    Engineer,
    CartPusher,
    // Legions:
    FortLegionary,
    FortJavelin,
    FortMounted,
    // Invaders:
    EnemyBarbarian,
    EnemyArcher,
    EnemyCamel,
    EnemyElephant,
    EnemyChariot,
    EnemyCaesarLegionary,
    // Natives & wildlife:
    IndigenousNative,
    Wolf,
    Sheep,
}

impl FigureKind {
    #[inline]
    pub fn is_legion(self) -> bool {
        matches!(self, Self::FortLegionary | Self::FortJavelin | Self::FortMounted)
    }

    #[inline]
    pub fn is_enemy(self) -> bool {
        matches!(self,
            Self::EnemyBarbarian
            | Self::EnemyArcher
            | Self::EnemyCamel
            | Self::EnemyElephant
            | Self::EnemyChariot
            | Self::EnemyCaesarLegionary)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum FigureAction {
    #[default]
    Idle,
    Roaming,
    Fighting,
    NativeAttacking,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Figure {
    pub kind: FigureKind,
    pub action: FigureAction,
}

impl Figure {
    #[inline]
    pub const fn new(kind: FigureKind, action: FigureAction) -> Self {
        Self { kind, action }
    }
}

// ----------------------------------------------
// Scenario
// ----------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Climate {
    #[default]
    Central,
    Northern,
    Desert,
}

// ----------------------------------------------
// Collaborator Traits
// ----------------------------------------------

// Read-only queries by grid offset. Callers only pass offsets of cells
// inside the playable map.

pub trait TerrainStore {
    fn terrain_at(&self, grid_offset: GridOffset) -> TerrainFlags;

    // Stable per-cell pseudo-random value, fixed at map creation.
    fn random_at(&self, grid_offset: GridOffset) -> u8;
}

pub trait BuildingStore {
    fn building_at(&self, grid_offset: GridOffset) -> Option<&Building>;

    // True for the single cell of a footprint its sprite is anchored to.
    fn is_draw_tile(&self, grid_offset: GridOffset) -> bool;

    // Footprint size of the building covering the cell, 0 if none.
    fn footprint_size(&self, grid_offset: GridOffset) -> u8;
}

pub trait FigureStore {
    fn for_each_figure_at<F>(&self, grid_offset: GridOffset, visitor_fn: F)
        where F: FnMut(&Figure);
}

pub trait ScenarioInfo {
    fn climate(&self) -> Climate;
}

// Everything the minimap reads from the city.
pub trait CityData: TerrainStore + BuildingStore + FigureStore + ScenarioInfo {}
impl<T> CityData for T where T: TerrainStore + BuildingStore + FigureStore + ScenarioInfo {}

// Main city viewport (camera), in view tile units.
pub trait CityViewport {
    fn map_size(&self) -> Size;
    fn scroll_origin(&self) -> ViewTile;
    fn visible_extent(&self) -> Size;
    fn view_to_grid_offset(&self, view_tile: ViewTile) -> Option<GridOffset>;
    fn go_to_grid_offset(&mut self, grid_offset: GridOffset);
}
