use crate::{
    city::CityViewport,
    utils::{
        PixelRect, Size,
        coords::{PixelPoint, ViewTile, VIEW_X_MAX, VIEW_Y_MAX},
    },
};

// ----------------------------------------------
// MinimapBounds
// ----------------------------------------------

/*
Window of view space shown by the minimap. Every view tile is 2 pixels
wide and 1 pixel tall on the minimap, so `width = 2 * width_tiles` and
`height = height_tiles`. `absolute_x/y` is the view tile at the top-left
corner; `absolute_y` is always even so row stagger matches view space.
*/
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MinimapBounds {
    pub x_offset: i32,
    pub y_offset: i32,
    pub width_tiles: i32,
    pub height_tiles: i32,
    pub width: i32,
    pub height: i32,
    pub absolute_x: i32,
    pub absolute_y: i32,
}

impl MinimapBounds {
    // Starts centered in view space, then slides the window just enough
    // to keep the main viewport inside it when the map is larger than
    // the minimap.
    pub fn compute<V>(position: PixelPoint, size_in_tiles: Size, view: &V) -> Self
        where V: CityViewport + ?Sized
    {
        let width_tiles  = size_in_tiles.width;
        let height_tiles = size_in_tiles.height;

        let mut absolute_x = (VIEW_X_MAX - width_tiles)  / 2;
        let mut absolute_y = (VIEW_Y_MAX - height_tiles) / 2;

        let map_size = view.map_size();
        let origin = view.scroll_origin();
        let extent = view.visible_extent();

        if (map_size.width - width_tiles) / 2 > 0 {
            if origin.x < absolute_x {
                absolute_x = origin.x;
            } else if origin.x > width_tiles + absolute_x - extent.width {
                absolute_x = extent.width + origin.x - width_tiles;
            }
        }

        // View rows are half a tile tall, hence the 2x on map height.
        let follow_y = (2 * map_size.height - height_tiles) / 2 > 0;
        if follow_y {
            if origin.y < absolute_y {
                absolute_y = origin.y;
            } else if origin.y > height_tiles + absolute_y - extent.height {
                absolute_y = extent.height + origin.y - height_tiles;
            }
        }

        // Snap to an even row. Round up when rounding down would cut off the
        // viewport's bottom row; its origin is even, so the top row stays in.
        absolute_y = if follow_y
            && (absolute_y & 1) != 0
            && origin.y + extent.height > (absolute_y & !1) + height_tiles
        {
            absolute_y + 1
        } else {
            absolute_y & !1
        };

        Self {
            x_offset: position.x,
            y_offset: position.y,
            width_tiles,
            height_tiles,
            width: 2 * width_tiles,
            height: height_tiles,
            absolute_x,
            absolute_y,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width_tiles > 0 && self.height_tiles > 0
    }

    // Area of the screen the minimap draws into.
    #[inline]
    pub fn pixel_rect(&self) -> PixelRect {
        PixelRect::new(self.x_offset, self.y_offset, self.width, self.height)
    }

    #[inline]
    pub fn contains_pixel(&self, x: i32, y: i32) -> bool {
        self.pixel_rect().contains_point(x, y)
    }

    #[inline]
    pub fn top_left_tile(&self) -> ViewTile {
        ViewTile::new(self.absolute_x, self.absolute_y)
    }

    // True if the view-space rectangle at `origin` of `extent` tiles is
    // entirely inside the displayed window.
    pub fn contains_view_rect(&self, origin: ViewTile, extent: Size) -> bool {
        origin.x >= self.absolute_x
        && origin.y >= self.absolute_y
        && origin.x + extent.width  <= self.absolute_x + self.width_tiles
        && origin.y + extent.height <= self.absolute_y + self.height_tiles
    }
}

impl std::fmt::Display for MinimapBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "(P:[{},{}], Tiles:[{},{}], Abs:[{},{}])",
               self.x_offset, self.y_offset,
               self.width_tiles, self.height_tiles,
               self.absolute_x, self.absolute_y)
    }
}
