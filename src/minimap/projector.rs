use super::bounds::MinimapBounds;
use crate::{
    city::CityViewport,
    utils::coords::{GridOffset, PixelPoint, ViewTile},
};

// ----------------------------------------------
// MinimapTile
// ----------------------------------------------

// A view tile visited by the minimap traversal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MinimapTile {
    pub view_tile: ViewTile,
    // Left pixel of the tile; it also covers `screen.x + 1`.
    pub screen: PixelPoint,
    // None for view tiles outside the playable map.
    pub grid_offset: Option<GridOffset>,
}

// ----------------------------------------------
// View tile <-> minimap pixel
// ----------------------------------------------

#[inline]
pub fn view_tile_to_screen(bounds: &MinimapBounds, view_tile: ViewTile) -> PixelPoint {
    let top_left = bounds.top_left_tile();
    // Odd rows are shifted one pixel left (half a tile).
    let stagger = if view_tile.is_odd_row() { 1 } else { 0 };
    PixelPoint::new(
        bounds.x_offset + 2 * (view_tile.x - top_left.x) - stagger,
        bounds.y_offset + (view_tile.y - top_left.y),
    )
}

// View tile whose 2-pixel cell covers the screen point. No range checks.
#[inline]
pub fn screen_to_view_tile(bounds: &MinimapBounds, point: PixelPoint) -> ViewTile {
    let y = bounds.absolute_y + (point.y - bounds.y_offset);
    let stagger = y & 1;
    let x = bounds.absolute_x + (point.x - bounds.x_offset + stagger).div_euclid(2);
    ViewTile::new(x, y)
}

// Is the view tile visited by `for_each_visible_tile()`?
#[inline]
pub fn is_in_traversal_window(bounds: &MinimapBounds, padding: i32, view_tile: ViewTile) -> bool {
    let top_left = bounds.top_left_tile();
    let x_rel = view_tile.x - top_left.x;
    let y_rel = view_tile.y - top_left.y;
    view_tile.is_within_view()
        && x_rel >= -padding && x_rel < bounds.width_tiles  + padding
        && y_rel >= -padding && y_rel < bounds.height_tiles + padding
}

// ----------------------------------------------
// Grid offset <-> minimap pixel
// ----------------------------------------------

#[inline]
pub fn project(bounds: &MinimapBounds, grid_offset: GridOffset) -> PixelPoint {
    view_tile_to_screen(bounds, grid_offset.to_cell().to_view_tile())
}

// Closed-form inverse of the traversal: same answer as matching the point
// against every visited tile, without the walk.
pub fn unproject<V>(bounds: &MinimapBounds, padding: i32, view: &V, point: PixelPoint) -> Option<GridOffset>
    where V: CityViewport + ?Sized
{
    let view_tile = screen_to_view_tile(bounds, point);
    if !is_in_traversal_window(bounds, padding, view_tile) {
        return None;
    }
    view.view_to_grid_offset(view_tile)
}

// ----------------------------------------------
// Traversal
// ----------------------------------------------

// Visits every view tile of the minimap window plus `padding` tiles on each
// side, row by row, top to bottom and left to right. Tiles outside view
// space are skipped; tiles outside the playable map are still visited with
// `grid_offset = None`.
pub fn for_each_visible_tile<V, F>(bounds: &MinimapBounds, padding: i32, view: &V, mut visitor_fn: F)
    where V: CityViewport + ?Sized,
          F: FnMut(&MinimapTile)
{
    let top_left = bounds.top_left_tile();
    for y_rel in -padding..(bounds.height_tiles + padding) {
        for x_rel in -padding..(bounds.width_tiles + padding) {
            let view_tile = ViewTile::new(top_left.x + x_rel, top_left.y + y_rel);
            if !view_tile.is_within_view() {
                continue;
            }

            visitor_fn(&MinimapTile {
                view_tile,
                screen: view_tile_to_screen(bounds, view_tile),
                grid_offset: view.view_to_grid_offset(view_tile),
            });
        }
    }
}
