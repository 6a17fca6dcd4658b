use super::{bounds::MinimapBounds, projector};
use crate::{
    city::CityViewport,
    utils::coords::{GridOffset, PixelPoint},
};

// ----------------------------------------------
// Mouse input
// ----------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub is_down: bool,
    pub went_down: bool,
    pub went_up: bool,
}

impl ButtonState {
    pub const fn pressed() -> Self {
        Self { is_down: true, went_down: true, went_up: false }
    }

    pub const fn released() -> Self {
        Self { is_down: false, went_down: false, went_up: false }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MouseEvent {
    pub x: i32,
    pub y: i32,
    pub left: ButtonState,
    pub right: ButtonState,
}

impl MouseEvent {
    pub const fn left_click(x: i32, y: i32) -> Self {
        Self { x, y, left: ButtonState::pressed(), right: ButtonState::released() }
    }

    pub const fn right_click(x: i32, y: i32) -> Self {
        Self { x, y, left: ButtonState::released(), right: ButtonState::pressed() }
    }

    #[inline]
    pub fn position(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    #[inline]
    pub fn any_button_went_down(&self) -> bool {
        self.left.went_down || self.right.went_down
    }
}

// ----------------------------------------------
// Click resolution
// ----------------------------------------------

// Result of matching a screen point against the traversal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TileUnderCursor {
    // No visited tile covers the point.
    #[default]
    Nothing,
    // Covered by a tile outside the playable map.
    OffMap,
    OnMap(GridOffset),
}

impl TileUnderCursor {
    #[inline]
    pub fn grid_offset(self) -> Option<GridOffset> {
        match self {
            Self::OnMap(grid_offset) => Some(grid_offset),
            _ => None,
        }
    }
}

// Walks the same tiles the draw pass visits and picks the one whose
// 2-pixel cell covers the point. The last match wins.
pub fn resolve_tile_under_cursor<V>(bounds: &MinimapBounds,
                                    padding: i32,
                                    view: &V,
                                    point: PixelPoint) -> TileUnderCursor
    where V: CityViewport + ?Sized
{
    let mut result = TileUnderCursor::Nothing;

    projector::for_each_visible_tile(bounds, padding, view, |tile| {
        if tile.screen.y == point.y && (tile.screen.x == point.x || tile.screen.x + 1 == point.x) {
            result = match tile.grid_offset {
                Some(grid_offset) => TileUnderCursor::OnMap(grid_offset),
                None => TileUnderCursor::OffMap,
            };
        }
    });

    result
}

// Grid offset to navigate to, if the event is a fresh press over a
// navigable map cell of the minimap.
pub fn navigation_target<V>(bounds: &MinimapBounds,
                            padding: i32,
                            view: &V,
                            event: &MouseEvent) -> Option<GridOffset>
    where V: CityViewport + ?Sized
{
    if !event.any_button_went_down() || !bounds.contains_pixel(event.x, event.y) {
        return None;
    }

    resolve_tile_under_cursor(bounds, padding, view, event.position())
        .grid_offset()
        .filter(|grid_offset| grid_offset.is_navigable())
}
