use crate::{
    log,
    city::{CityData, CityViewport},
    config::MinimapConfigs,
    render::{ClipRectScope, RenderSystem, SpriteAtlas},
    utils::{Size, PixelRect, coords::{GridOffset, PixelPoint}},
};

pub mod bounds;
pub mod compositor;
pub mod indicator;
pub mod input;
pub mod projector;

pub use bounds::MinimapBounds;
pub use input::{ButtonState, MouseEvent};

use compositor::{MarkerColors, TileVisual};


// ----------------------------------------------
// MinimapDrawStats
// ----------------------------------------------

// What the last draw pass did, tile by tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MinimapDrawStats {
    pub tiles_visited: u32,
    pub off_map_tiles: u32,
    pub figure_markers: u32,
    pub building_sprites: u32,
    pub terrain_sprites: u32,
}

impl MinimapDrawStats {
    fn record(&mut self, visual: TileVisual) {
        self.tiles_visited += 1;
        match visual {
            TileVisual::OffMap => self.off_map_tiles += 1,
            TileVisual::Figure(_) => self.figure_markers += 1,
            TileVisual::Building { size, .. } => {
                if (1..=compositor::MAX_FOOTPRINT_SIZE).contains(&size) {
                    self.building_sprites += 1;
                }
            }
            TileVisual::FootprintCell => {}
            TileVisual::Terrain { .. } => self.terrain_sprites += 1,
        }
    }
}

// ----------------------------------------------
// Minimap
// ----------------------------------------------

#[derive(Default)]
pub struct Minimap {
    configs: MinimapConfigs,
    // Computed on every draw and used by pointer input in between.
    bounds: MinimapBounds,
    last_draw_stats: MinimapDrawStats,
    // Set when the main view moves because of a minimap click.
    need_update: bool,
}

impl Minimap {
    pub fn new(configs: MinimapConfigs) -> Self {
        Self {
            configs,
            bounds: MinimapBounds::default(),
            last_draw_stats: MinimapDrawStats::default(),
            need_update: true,
        }
    }

    #[inline]
    pub fn configs(&self) -> &MinimapConfigs {
        &self.configs
    }

    #[inline]
    pub fn bounds(&self) -> &MinimapBounds {
        &self.bounds
    }

    #[inline]
    pub fn last_draw_stats(&self) -> MinimapDrawStats {
        self.last_draw_stats
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.need_update
    }

    #[inline]
    pub fn invalidate(&mut self) {
        self.need_update = true;
    }

    // Recomputes the displayed window without drawing.
    pub fn set_bounds<V>(&mut self, view: &V, position: PixelPoint, size_in_tiles: Size) -> MinimapBounds
        where V: CityViewport + ?Sized
    {
        self.bounds = MinimapBounds::compute(position, size_in_tiles, view);
        log::verbose!(log::channel!("minimap"), "Bounds: {}", self.bounds);
        self.bounds
    }

    // Draws the minimap at the screen position, `width_tiles` x `height_tiles`
    // view tiles in size (2 pixels per tile horizontally), followed by the
    // main viewport outline. All drawing is clipped to the minimap area.
    pub fn draw<C, V, R, A>(&mut self,
                            city: &C,
                            view: &V,
                            render_sys: &mut R,
                            atlas: &A,
                            x_offset: i32,
                            y_offset: i32,
                            width_tiles: i32,
                            height_tiles: i32) -> MinimapDrawStats
        where C: CityData + ?Sized,
              V: CityViewport + ?Sized,
              R: RenderSystem + ?Sized,
              A: SpriteAtlas + ?Sized
    {
        let bounds = self.set_bounds(view, PixelPoint::new(x_offset, y_offset), Size::new(width_tiles, height_tiles));
        self.last_draw_stats = MinimapDrawStats::default();

        if !bounds.is_valid() {
            log::verbose!(log::channel!("minimap"), "Skipping draw, empty minimap bounds: {bounds}");
            return self.last_draw_stats;
        }

        let colors = MarkerColors::new(&self.configs, city.climate());
        let padding = self.configs.tile_padding;
        let mut stats = MinimapDrawStats::default();

        {
            let mut render_sys = ClipRectScope::new(render_sys, bounds.pixel_rect());

            projector::for_each_visible_tile(&bounds, padding, view, |tile| {
                let visual = compositor::classify_tile(city, tile.grid_offset);
                compositor::draw_tile(&mut *render_sys, atlas, &colors, tile, visual);
                stats.record(visual);
            });

            let indicator_rect = indicator::viewport_indicator_rect(&bounds, view);
            render_sys.draw_wireframe_rect(indicator_rect, self.configs.viewport_indicator_color);
        }

        self.need_update = false;
        self.last_draw_stats = stats;
        stats
    }

    // Returns true if the event was consumed, in which case the main view
    // has been centered on the clicked map cell.
    pub fn handle_pointer_event<V>(&mut self, view: &mut V, event: &MouseEvent) -> bool
        where V: CityViewport + ?Sized
    {
        let Some(grid_offset) =
            input::navigation_target(&self.bounds, self.configs.tile_padding, view, event) else {
            return false;
        };

        view.go_to_grid_offset(grid_offset);
        self.invalidate();

        log::info!(log::channel!("minimap"), "Clicked {}, moving view to {grid_offset}.", event.position());
        true
    }

    // Map cell under a screen point, using the bounds of the last draw.
    pub fn grid_offset_at<V>(&self, view: &V, x: i32, y: i32) -> Option<GridOffset>
        where V: CityViewport + ?Sized
    {
        if !self.bounds.contains_pixel(x, y) {
            return None;
        }
        projector::unproject(&self.bounds, self.configs.tile_padding, view, PixelPoint::new(x, y))
    }

    #[inline]
    pub fn viewport_indicator_rect<V>(&self, view: &V) -> PixelRect
        where V: CityViewport + ?Sized
    {
        indicator::viewport_indicator_rect(&self.bounds, view)
    }
}
