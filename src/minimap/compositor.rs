use super::projector::MinimapTile;
use crate::{
    city::{BuildingKind, CityData, Climate, Figure, FigureAction, FigureKind, TerrainFlags},
    config::MinimapConfigs,
    render::{RenderSystem, SpriteAtlas, SpriteGroup, SpriteId},
    utils::{Color, coords::{GridOffset, PixelPoint}},
};

// Largest building footprint with a minimap sprite (5x5).
pub const MAX_FOOTPRINT_SIZE: u8 = 5;

// ----------------------------------------------
// FigureMarker
// ----------------------------------------------

// Figures that show up on the minimap as a 2-pixel colored line.
// Variants are declared in ascending priority.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FigureMarker {
    WildAnimal,
    Hostile,
    Soldier,
}

impl FigureMarker {
    pub fn for_figure(figure: &Figure) -> Option<Self> {
        if figure.kind.is_legion() {
            Some(Self::Soldier)
        } else if figure.kind.is_enemy()
            || (figure.kind == FigureKind::IndigenousNative && figure.action == FigureAction::NativeAttacking) {
            Some(Self::Hostile)
        } else if figure.kind == FigureKind::Wolf {
            Some(Self::WildAnimal)
        } else {
            None
        }
    }
}

// Marker colors resolved once per draw (enemy color depends on climate).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MarkerColors {
    pub soldier: Color,
    pub hostile: Color,
    pub wild_animal: Color,
}

impl MarkerColors {
    pub fn new(configs: &MinimapConfigs, climate: Climate) -> Self {
        Self {
            soldier: configs.soldier_color,
            hostile: configs.enemy_color(climate),
            wild_animal: configs.wild_animal_color,
        }
    }

    #[inline]
    pub fn color_for(&self, marker: FigureMarker) -> Color {
        match marker {
            FigureMarker::Soldier    => self.soldier,
            FigureMarker::Hostile    => self.hostile,
            FigureMarker::WildAnimal => self.wild_animal,
        }
    }
}

// Highest priority marker among all figures on the cell, independent of
// the order they are stored in.
pub fn figure_marker_at<C>(city: &C, grid_offset: GridOffset) -> Option<FigureMarker>
    where C: CityData + ?Sized
{
    let mut best: Option<FigureMarker> = None;
    city.for_each_figure_at(grid_offset, |figure| {
        if let Some(marker) = FigureMarker::for_figure(figure) {
            best = best.max(Some(marker));
        }
    });
    best
}

// ----------------------------------------------
// TerrainCategory
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TerrainCategory {
    Water,
    Scrub,
    Tree,
    Rock,
    Elevation,
    Road,
    Aqueduct,
    Wall,
    Meadow,
    EmptyLand,
}

impl TerrainCategory {
    // First matching flag wins.
    pub fn from_flags(terrain: TerrainFlags) -> Self {
        const PRECEDENCE: [(TerrainFlags, TerrainCategory); 9] = [
            (TerrainFlags::Water,     TerrainCategory::Water),
            (TerrainFlags::Scrub,     TerrainCategory::Scrub),
            (TerrainFlags::Tree,      TerrainCategory::Tree),
            (TerrainFlags::Rock,      TerrainCategory::Rock),
            (TerrainFlags::Elevation, TerrainCategory::Elevation),
            (TerrainFlags::Road,      TerrainCategory::Road),
            (TerrainFlags::Aqueduct,  TerrainCategory::Aqueduct),
            (TerrainFlags::Wall,      TerrainCategory::Wall),
            (TerrainFlags::Meadow,    TerrainCategory::Meadow),
        ];

        PRECEDENCE.iter()
            .find(|(flag, _)| terrain.intersects(*flag))
            .map_or(Self::EmptyLand, |(_, category)| *category)
    }

    pub fn sprite_group(self) -> SpriteGroup {
        match self {
            Self::Water => SpriteGroup::MinimapWater,
            Self::Scrub | Self::Tree => SpriteGroup::MinimapTree,
            Self::Rock | Self::Elevation => SpriteGroup::MinimapRock,
            Self::Road => SpriteGroup::MinimapRoad,
            Self::Aqueduct => SpriteGroup::MinimapAqueduct,
            Self::Wall => SpriteGroup::MinimapWall,
            Self::Meadow => SpriteGroup::MinimapMeadow,
            Self::EmptyLand => SpriteGroup::MinimapEmptyLand,
        }
    }

    // Mask applied to the per-cell random value to pick a variant.
    pub fn variant_mask(self) -> u8 {
        match self {
            Self::Water | Self::Scrub | Self::Tree | Self::Rock | Self::Elevation | Self::Meadow => 3,
            Self::EmptyLand => 7,
            Self::Road | Self::Aqueduct | Self::Wall => 0,
        }
    }
}

// ----------------------------------------------
// BuildingSprite
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuildingSprite {
    House,
    // Reservoirs sit just before the aqueduct group.
    Reservoir,
    Other,
}

impl BuildingSprite {
    pub fn base_sprite<A: SpriteAtlas + ?Sized>(self, atlas: &A) -> SpriteId {
        match self {
            Self::House => atlas.group_base(SpriteGroup::MinimapHouse),
            Self::Reservoir => atlas.group_base(SpriteGroup::MinimapAqueduct).offset(-1),
            Self::Other => atlas.group_base(SpriteGroup::MinimapBuilding),
        }
    }
}

// ----------------------------------------------
// TileVisual
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileVisual {
    // Outside the playable map.
    OffMap,
    Figure(FigureMarker),
    // Draw tile of a building footprint.
    Building { sprite: BuildingSprite, size: u8 },
    // Any other cell of a building footprint, covered by the draw tile sprite.
    FootprintCell,
    Terrain { category: TerrainCategory, variant: u8 },
}

pub fn classify_tile<C>(city: &C, grid_offset: Option<GridOffset>) -> TileVisual
    where C: CityData + ?Sized
{
    let Some(grid_offset) = grid_offset else {
        return TileVisual::OffMap;
    };

    if let Some(marker) = figure_marker_at(city, grid_offset) {
        return TileVisual::Figure(marker);
    }

    let mut terrain = city.terrain_at(grid_offset);

    // Fort ground shows as plain land.
    if terrain.intersects(TerrainFlags::Building) {
        if let Some(building) = city.building_at(grid_offset) {
            if building.kind == BuildingKind::FortGround {
                terrain = TerrainFlags::empty();
            }
        }
    }

    if terrain.intersects(TerrainFlags::Building) {
        if !city.is_draw_tile(grid_offset) {
            return TileVisual::FootprintCell;
        }

        let sprite = match city.building_at(grid_offset) {
            Some(building) if building.is_house() => BuildingSprite::House,
            Some(building) if building.kind == BuildingKind::Reservoir => BuildingSprite::Reservoir,
            _ => BuildingSprite::Other,
        };

        return TileVisual::Building { sprite, size: city.footprint_size(grid_offset) };
    }

    let category = TerrainCategory::from_flags(terrain);
    let variant = city.random_at(grid_offset) & category.variant_mask();
    TileVisual::Terrain { category, variant }
}

// ----------------------------------------------
// Drawing
// ----------------------------------------------

pub fn draw_tile<R, A>(render_sys: &mut R,
                       atlas: &A,
                       colors: &MarkerColors,
                       tile: &MinimapTile,
                       visual: TileVisual)
    where R: RenderSystem + ?Sized,
          A: SpriteAtlas + ?Sized
{
    let PixelPoint { x, y } = tile.screen;

    match visual {
        TileVisual::OffMap => {
            render_sys.draw_sprite(atlas.group_base(SpriteGroup::MinimapBlack), x, y);
        }
        TileVisual::Figure(marker) => {
            render_sys.draw_line(tile.screen, PixelPoint::new(x + 1, y), colors.color_for(marker));
        }
        TileVisual::Building { sprite, size } => {
            // Multi-tile sprites are anchored at the draw tile and extend upwards.
            if (1..=MAX_FOOTPRINT_SIZE).contains(&size) {
                let rows_above = (size - 1) as i32;
                let sprite_id = sprite.base_sprite(atlas).offset(rows_above);
                render_sys.draw_sprite(sprite_id, x, y - rows_above);
            }
        }
        TileVisual::FootprintCell => {}
        TileVisual::Terrain { category, variant } => {
            let sprite_id = atlas.group_base(category.sprite_group()).offset(variant as i32);
            render_sys.draw_sprite(sprite_id, x, y);
        }
    }
}
