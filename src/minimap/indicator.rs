use super::bounds::MinimapBounds;
use crate::{
    city::CityViewport,
    utils::PixelRect,
};

// Outline of the main city viewport on the minimap, in screen pixels.
// Pulled 2 pixels left of the viewport origin and kept from crossing the
// minimap's left edge. If it would cross the right edge it shifts back 2
// pixels but may still overflow; the clip rect takes care of the rest.
pub fn viewport_indicator_rect<V>(bounds: &MinimapBounds, view: &V) -> PixelRect
    where V: CityViewport + ?Sized
{
    let origin = view.scroll_origin();
    let extent = view.visible_extent();

    let width  = 2 * extent.width + 4;
    let height = extent.height - 4;

    let mut x = bounds.x_offset + 2 * (origin.x - bounds.absolute_x) - 2;
    if x < bounds.x_offset {
        x = bounds.x_offset;
    }
    if x + width > bounds.x_offset + bounds.width {
        x -= 2;
    }

    let y = bounds.y_offset + (origin.y - bounds.absolute_y) + 2;

    PixelRect::new(x, y, width, height)
}
