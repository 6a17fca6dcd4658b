use super::CityViewport;
use crate::{
    log,
    utils::{
        Size,
        coords::{self, Cell, GridOffset, ViewTile, GRID_SIZE, VIEW_X_MAX, VIEW_Y_MAX},
    },
};

// ----------------------------------------------
// ViewLookup
// ----------------------------------------------

// Two-way table between view tiles and grid offsets of playable cells.
struct ViewLookup {
    view_to_grid: Vec<Option<GridOffset>>, // VIEW_X_MAX * VIEW_Y_MAX
    grid_to_view: Vec<Option<ViewTile>>,   // GRID_SIZE * GRID_SIZE
}

impl ViewLookup {
    fn new(map_start: Cell, map_size: Size) -> Self {
        let mut lookup = Self {
            view_to_grid: vec![None; (VIEW_X_MAX * VIEW_Y_MAX) as usize],
            grid_to_view: vec![None; (GRID_SIZE * GRID_SIZE) as usize],
        };

        for y in 0..map_size.height {
            for x in 0..map_size.width {
                let cell = Cell::new(map_start.x + x, map_start.y + y);
                let Some(grid_offset) = GridOffset::from_cell(cell) else {
                    continue;
                };

                let view_tile = cell.to_view_tile();
                debug_assert!(view_tile.is_within_view());

                lookup.view_to_grid[Self::view_index(view_tile)] = Some(grid_offset);
                lookup.grid_to_view[grid_offset.index()] = Some(view_tile);
            }
        }

        lookup
    }

    #[inline]
    fn view_index(view_tile: ViewTile) -> usize {
        (view_tile.x + view_tile.y * VIEW_X_MAX) as usize
    }

    #[inline]
    fn grid_offset(&self, view_tile: ViewTile) -> Option<GridOffset> {
        if !view_tile.is_within_view() {
            return None;
        }
        self.view_to_grid[Self::view_index(view_tile)]
    }

    #[inline]
    fn view_tile(&self, grid_offset: GridOffset) -> Option<ViewTile> {
        self.grid_to_view.get(grid_offset.index()).copied().flatten()
    }
}

// ----------------------------------------------
// CityView
// ----------------------------------------------

/*
Camera over the rotated city view. The scroll origin is the view tile at
the top-left corner of the main viewport and its y is always even so that
rows keep their stagger alignment. The playable map is centered inside the
grid, which puts it in the middle of view space as well.
*/
pub struct CityView {
    map_size: Size,
    map_start: Cell,
    origin: ViewTile,
    extent: Size,
    lookup: ViewLookup,
}

impl CityView {
    pub fn new(map_size: Size, visible_extent: Size) -> Self {
        let map_size = Size::new(
            map_size.width.clamp(0, GRID_SIZE),
            map_size.height.clamp(0, GRID_SIZE),
        );

        let map_start = coords::map_start_cell(map_size);

        let mut view = Self {
            map_size,
            map_start,
            origin: ViewTile::default(),
            extent: visible_extent,
            lookup: ViewLookup::new(map_start, map_size),
        };

        view.scroll_to(ViewTile::new(
            (VIEW_X_MAX - visible_extent.width)  / 2,
            (VIEW_Y_MAX - visible_extent.height) / 2,
        ));

        view
    }

    // Top-left playable cell in grid space.
    #[inline]
    pub fn map_start(&self) -> Cell {
        self.map_start
    }

    // Grid offset of a cell given in map-relative coordinates.
    pub fn map_cell_to_grid_offset(&self, x: i32, y: i32) -> Option<GridOffset> {
        if x < 0 || y < 0 || x >= self.map_size.width || y >= self.map_size.height {
            return None;
        }
        GridOffset::from_cell(Cell::new(self.map_start.x + x, self.map_start.y + y))
    }

    #[inline]
    pub fn grid_offset_to_view(&self, grid_offset: GridOffset) -> Option<ViewTile> {
        self.lookup.view_tile(grid_offset)
    }

    // Moves the camera origin, clamped to the map's view-space bounds.
    pub fn scroll_to(&mut self, origin: ViewTile) {
        self.origin = origin;
        self.clamp_to_map_bounds();
    }

    fn clamp_to_map_bounds(&mut self) {
        let x_min = (VIEW_X_MAX - self.map_size.width) / 2;
        let y_min = (VIEW_Y_MAX - 2 * self.map_size.height) / 2;

        let x_max = VIEW_X_MAX - x_min - self.extent.width;
        let y_max = VIEW_Y_MAX - y_min - self.extent.height;

        // Upper limit last: it wins when the map is narrower than the viewport.
        if self.origin.x < x_min - 1 {
            self.origin.x = x_min - 1;
        }
        if self.origin.x > x_max {
            self.origin.x = x_max;
        }
        if self.origin.y < y_min {
            self.origin.y = y_min;
        }
        if self.origin.y > y_max {
            self.origin.y = y_max;
        }

        self.origin.y &= !1;
    }
}

impl CityViewport for CityView {
    #[inline]
    fn map_size(&self) -> Size {
        self.map_size
    }

    #[inline]
    fn scroll_origin(&self) -> ViewTile {
        self.origin
    }

    #[inline]
    fn visible_extent(&self) -> Size {
        self.extent
    }

    #[inline]
    fn view_to_grid_offset(&self, view_tile: ViewTile) -> Option<GridOffset> {
        self.lookup.grid_offset(view_tile)
    }

    fn go_to_grid_offset(&mut self, grid_offset: GridOffset) {
        let Some(view_tile) = self.lookup.view_tile(grid_offset) else {
            log::warn!(log::channel!("city_view"), "Cannot center view on off-map cell {grid_offset}.");
            return;
        };

        let mut origin = ViewTile::new(
            view_tile.x - self.extent.width  / 2,
            view_tile.y - self.extent.height / 2,
        );
        origin.y &= !1;

        self.scroll_to(origin);

        log::verbose!(log::channel!("city_view"), "Centered view on {grid_offset} {view_tile}, origin: {}", self.origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_covers_playable_map_only() {
        let view = CityView::new(Size::new(40, 30), Size::new(20, 30));
        let start = view.map_start();
        assert_eq!(start, Cell::new(61, 66));

        let inside = GridOffset::from_cell(start).unwrap();
        let tile = view.grid_offset_to_view(inside).unwrap();
        assert_eq!(view.view_to_grid_offset(tile), Some(inside));

        // One cell left of the map is not playable.
        let outside = GridOffset::from_cell(Cell::new(start.x - 1, start.y)).unwrap();
        assert_eq!(view.grid_offset_to_view(outside), None);
        assert_eq!(view.view_to_grid_offset(Cell::new(start.x - 1, start.y).to_view_tile()), None);

        // Out of view space entirely.
        assert_eq!(view.view_to_grid_offset(ViewTile::new(-1, 5)), None);
        assert_eq!(view.view_to_grid_offset(ViewTile::new(5, VIEW_Y_MAX)), None);
    }

    #[test]
    fn test_map_cell_to_grid_offset() {
        let view = CityView::new(Size::new(40, 30), Size::new(20, 30));
        let offset = view.map_cell_to_grid_offset(0, 0).unwrap();
        assert_eq!(offset.to_cell(), view.map_start());
        assert!(view.map_cell_to_grid_offset(40, 0).is_none());
        assert!(view.map_cell_to_grid_offset(0, -1).is_none());
    }

    #[test]
    fn test_go_to_grid_offset_centers_and_clamps() {
        let mut view = CityView::new(Size::new(100, 100), Size::new(20, 30));

        // Map center: camera centered on it, y kept even.
        let center = view.map_cell_to_grid_offset(50, 50).unwrap();
        view.go_to_grid_offset(center);
        let tile = view.grid_offset_to_view(center).unwrap();
        let origin = view.scroll_origin();
        assert_eq!(origin.x, tile.x - 10);
        assert_eq!(origin.y & 1, 0);
        assert!((origin.y - (tile.y - 15)).abs() <= 1);

        // Top corner of the map: clamped to the top bound.
        let corner = view.map_cell_to_grid_offset(0, 0).unwrap();
        view.go_to_grid_offset(corner);
        assert_eq!(view.scroll_origin().y, (VIEW_Y_MAX - 200) / 2);

        // Off-map cells leave the camera alone.
        let before = view.scroll_origin();
        view.go_to_grid_offset(GridOffset::new(0));
        assert_eq!(view.scroll_origin(), before);
    }

    #[test]
    fn test_scroll_origin_always_even() {
        let mut view = CityView::new(Size::new(120, 80), Size::new(30, 41));
        for y in 60..200 {
            view.scroll_to(ViewTile::new(70, y));
            assert_eq!(view.scroll_origin().y & 1, 0);
        }
    }
}
