use std::path::Path;

use image::{Rgba, RgbaImage};
use strum::{EnumCount, IntoEnumIterator};

use super::{RenderStats, RenderSystem, SpriteAtlas, SpriteGroup, SpriteId};
use crate::{
    log,
    utils::{Color, PixelRect, Size, coords::PixelPoint},
};

// ----------------------------------------------
// PaletteSprite
// ----------------------------------------------

// Flat colored isometric diamond covering a `size x size` footprint:
// `2 * size` pixels wide, `2 * size - 1` rows tall.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PaletteSprite {
    pub color: Color,
    pub size: u8,
}

impl PaletteSprite {
    const fn tile(rgb: u32) -> Self {
        Self { color: Color::from_rgb(rgb), size: 1 }
    }

    const fn footprint(rgb: u32, size: u8) -> Self {
        Self { color: Color::from_rgb(rgb), size }
    }
}

// ----------------------------------------------
// PaletteAtlas
// ----------------------------------------------

// Minimap sprite atlas built from flat colors. Layout follows the usual
// minimap sprite sheet: terrain groups hold their variants back to back,
// house/building groups hold one sprite per footprint size (1..=5), and the
// aqueduct group is followed by the reservoir sprite, which is addressed
// as `base(Aqueduct) - 1 + (size - 1)`.
pub struct PaletteAtlas {
    sprites: Vec<PaletteSprite>,
    group_bases: [SpriteId; SpriteGroup::COUNT],
}

impl PaletteAtlas {
    pub fn new() -> Self {
        let mut sprites = Vec::new();
        let mut group_bases = [SpriteId::new(0); SpriteGroup::COUNT];

        for group in SpriteGroup::iter() {
            group_bases[u8::from(group) as usize] = SpriteId::new(sprites.len() as i32);
            sprites.extend_from_slice(&Self::group_sprites(group));
        }

        Self { sprites, group_bases }
    }

    fn group_sprites(group: SpriteGroup) -> Vec<PaletteSprite> {
        match group {
            SpriteGroup::MinimapBlack => vec![PaletteSprite::tile(0x000000)],
            SpriteGroup::MinimapWater => Self::variants(&[0x1e6473, 0x206a7a, 0x1b5e6b, 0x23707f]),
            SpriteGroup::MinimapTree  => Self::variants(&[0x0a7319, 0x0c6b1a, 0x0e7a1e, 0x086315]),
            SpriteGroup::MinimapRock  => Self::variants(&[0x46413c, 0x504a44, 0x3c3833, 0x4b4540]),
            SpriteGroup::MinimapMeadow => Self::variants(&[0x8c9a3c, 0x94a240, 0x869238, 0x909e3e]),
            SpriteGroup::MinimapEmptyLand => Self::variants(&[
                0x707d37, 0x6c7935, 0x748139, 0x6a7733,
                0x76833b, 0x6e7b36, 0x727f38, 0x687531,
            ]),
            SpriteGroup::MinimapRoad => vec![PaletteSprite::tile(0x6e4123)],
            SpriteGroup::MinimapWall => vec![PaletteSprite::tile(0xb4aa96)],
            SpriteGroup::MinimapAqueduct => vec![
                PaletteSprite::tile(0x3c8cc8),
                PaletteSprite::footprint(0x2878b4, 3), // Reservoir.
            ],
            SpriteGroup::MinimapHouse => Self::footprints(0xe1c814),
            SpriteGroup::MinimapBuilding => Self::footprints(0xdcdcdc),
        }
    }

    fn variants(colors: &[u32]) -> Vec<PaletteSprite> {
        colors.iter().map(|&rgb| PaletteSprite::tile(rgb)).collect()
    }

    fn footprints(rgb: u32) -> Vec<PaletteSprite> {
        (1..=5).map(|size| PaletteSprite::footprint(rgb, size)).collect()
    }

    #[inline]
    pub fn sprite(&self, id: SpriteId) -> Option<&PaletteSprite> {
        usize::try_from(id.value()).ok().and_then(|index| self.sprites.get(index))
    }

    #[inline]
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    // Which group a sprite belongs to.
    pub fn group_of(&self, id: SpriteId) -> Option<SpriteGroup> {
        self.sprite(id)?;
        (0..SpriteGroup::COUNT as u8)
            .rev()
            .filter_map(|index| SpriteGroup::try_from(index).ok())
            .find(|group| self.group_base(*group) <= id)
    }
}

impl Default for PaletteAtlas {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteAtlas for PaletteAtlas {
    #[inline]
    fn group_base(&self, group: SpriteGroup) -> SpriteId {
        self.group_bases[u8::from(group) as usize]
    }
}

// ----------------------------------------------
// SoftwareRenderer
// ----------------------------------------------

// CPU rasterizer drawing into an RGBA image. Everything outside the image
// or the current clip rectangle is discarded. Sprite ids are resolved
// against the borrowed atlas, which must be the one handed to the minimap
// so sprite ids and group bases agree.
pub struct SoftwareRenderer<'atlas> {
    image: RgbaImage,
    clip_rect: Option<PixelRect>,
    atlas: &'atlas PaletteAtlas,
    stats: RenderStats,
}

impl<'atlas> SoftwareRenderer<'atlas> {
    pub fn new(size: Size, clear_color: Color, atlas: &'atlas PaletteAtlas) -> Self {
        let width  = size.width.max(0) as u32;
        let height = size.height.max(0) as u32;
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(clear_color.to_array())),
            clip_rect: None,
            atlas,
            stats: RenderStats::default(),
        }
    }

    #[inline]
    pub fn atlas(&self) -> &'atlas PaletteAtlas {
        self.atlas
    }

    #[inline]
    pub fn image_rect(&self) -> PixelRect {
        PixelRect::new(0, 0, self.image.width() as i32, self.image.height() as i32)
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    #[inline]
    pub fn clip_rect(&self) -> Option<PixelRect> {
        self.clip_rect
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 {
            return None;
        }
        self.image
            .get_pixel_checked(x as u32, y as u32)
            .map(|px| Color::new(px[0], px[1], px[2], px[3]))
    }

    pub fn save_png<P>(&self, path: P) -> Result<(), String>
        where P: AsRef<Path>
    {
        self.image.save(path.as_ref()).map_err(|err| {
            format!("Failed to write image {:?}: {err}", path.as_ref())
        })
    }

    #[inline]
    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(clip) = self.clip_rect {
            if !clip.contains_point(x, y) {
                return;
            }
        }
        if x < 0 || y < 0 || x >= self.image.width() as i32 || y >= self.image.height() as i32 {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, Rgba(color.to_array()));
    }

    fn fill_span(&mut self, x: i32, y: i32, width: i32, color: Color) {
        for px in x..(x + width) {
            self.put_pixel(px, y, color);
        }
    }
}

impl RenderSystem for SoftwareRenderer<'_> {
    fn set_clip_rect(&mut self, rect: PixelRect) {
        self.clip_rect = Some(rect.intersection(&self.image_rect()));
    }

    fn reset_clip_rect(&mut self) {
        self.clip_rect = None;
    }

    fn draw_sprite(&mut self, sprite: SpriteId, x: i32, y: i32) {
        let Some(&PaletteSprite { color, size }) = self.atlas.sprite(sprite) else {
            if self.stats.missing_sprites == 0 {
                log::warn!(log::channel!("render"), "Sprite {sprite} is not in the atlas.");
            }
            self.stats.missing_sprites += 1;
            return;
        };

        let size = size as i32;
        let rows = 2 * size - 1;
        for row in 0..rows {
            let cells = row.min(rows - 1 - row) + 1;
            self.fill_span(x + size - cells, y + row, 2 * cells, color);
        }

        self.stats.sprites_drawn += 1;
    }

    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color) {
        // Bresenham, all octants.
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let step_x = if from.x < to.x { 1 } else { -1 };
        let step_y = if from.y < to.y { 1 } else { -1 };

        let (mut x, mut y) = (from.x, from.y);
        let mut err = dx + dy;

        loop {
            self.put_pixel(x, y, color);
            if x == to.x && y == to.y {
                break;
            }
            let err2 = 2 * err;
            if err2 >= dy {
                err += dy;
                x += step_x;
            }
            if err2 <= dx {
                err += dx;
                y += step_y;
            }
        }

        self.stats.lines_drawn += 1;
    }

    fn draw_wireframe_rect(&mut self, rect: PixelRect, color: Color) {
        if !rect.is_valid() {
            return;
        }

        let right  = rect.right()  - 1;
        let bottom = rect.bottom() - 1;

        self.fill_span(rect.x, rect.y,  rect.width, color);
        self.fill_span(rect.x, bottom,  rect.width, color);
        for y in rect.y..=bottom {
            self.put_pixel(rect.x, y, color);
            self.put_pixel(right,  y, color);
        }

        self.stats.rects_drawn += 1;
    }

    #[inline]
    fn stats(&self) -> RenderStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ClipRectScope;

    #[test]
    fn test_atlas_layout() {
        let atlas = PaletteAtlas::new();
        let aqueduct = atlas.group_base(SpriteGroup::MinimapAqueduct);

        // Reservoir: base(Aqueduct) - 1 + (3 - 1).
        let reservoir = atlas.sprite(aqueduct.offset(1)).unwrap();
        assert_eq!(reservoir.size, 3);

        // One sprite per footprint size.
        let building = atlas.group_base(SpriteGroup::MinimapBuilding);
        for size in 1..=5 {
            assert_eq!(atlas.sprite(building.offset(size - 1)).unwrap().size, size as u8);
        }

        assert_eq!(atlas.group_of(atlas.group_base(SpriteGroup::MinimapEmptyLand).offset(7)),
                   Some(SpriteGroup::MinimapEmptyLand));
        assert_eq!(atlas.group_of(SpriteId::new(-1)), None);
        assert_eq!(atlas.group_of(SpriteId::new(atlas.sprite_count() as i32)), None);
    }

    #[test]
    fn test_sprite_diamond_shape() {
        let atlas = PaletteAtlas::new();
        let mut renderer = SoftwareRenderer::new(Size::new(16, 16), Color::transparent(), &atlas);
        let house = renderer.atlas().group_base(SpriteGroup::MinimapHouse);

        // Size 2: rows of 2, 4, 2 pixels.
        renderer.draw_sprite(house.offset(1), 4, 4);
        let filled: Vec<usize> = (4..8)
            .map(|y| (0..16).filter(|&x| renderer.pixel(x, y) != Some(Color::transparent())).count())
            .collect();
        assert_eq!(filled, [2, 4, 2, 0]);
        assert_ne!(renderer.pixel(4, 5), Some(Color::transparent()));
        assert_eq!(renderer.pixel(4, 4), Some(Color::transparent()));

        renderer.draw_sprite(SpriteId::new(9999), 0, 0);
        assert_eq!(renderer.stats().missing_sprites, 1);
        assert_eq!(renderer.stats().sprites_drawn, 1);
    }

    #[test]
    fn test_clip_scope_restores_state() {
        let atlas = PaletteAtlas::new();
        let mut renderer = SoftwareRenderer::new(Size::new(8, 8), Color::black(), &atlas);
        {
            let mut scope = ClipRectScope::new(&mut renderer, PixelRect::new(2, 2, 2, 2));
            assert_eq!(scope.clip_rect(), Some(PixelRect::new(2, 2, 2, 2)));
            scope.draw_line(PixelPoint::new(0, 2), PixelPoint::new(7, 2), Color::white());
        }
        assert_eq!(renderer.clip_rect(), None);
        assert_eq!(renderer.pixel(1, 2), Some(Color::black()));
        assert_eq!(renderer.pixel(2, 2), Some(Color::white()));
        assert_eq!(renderer.pixel(3, 2), Some(Color::white()));
        assert_eq!(renderer.pixel(4, 2), Some(Color::black()));
    }

    #[test]
    fn test_clip_rect_is_limited_to_image() {
        let atlas = PaletteAtlas::new();
        let mut renderer = SoftwareRenderer::new(Size::new(8, 8), Color::black(), &atlas);

        renderer.set_clip_rect(PixelRect::new(-4, 6, 20, 20));
        assert_eq!(renderer.clip_rect(), Some(PixelRect::new(0, 6, 8, 2)));

        // No overlap leaves an empty clip rect, so nothing is drawn.
        renderer.set_clip_rect(PixelRect::new(10, 10, 4, 4));
        assert_eq!(renderer.clip_rect().map(|rect| rect.is_valid()), Some(false));
        renderer.draw_line(PixelPoint::new(0, 0), PixelPoint::new(7, 7), Color::white());
        assert_eq!(renderer.pixel(3, 3), Some(Color::black()));
    }

    #[test]
    fn test_sprites_resolve_against_borrowed_atlas() {
        let atlas = PaletteAtlas::new();
        let mut renderer = SoftwareRenderer::new(Size::new(8, 8), Color::black(), &atlas);
        assert!(std::ptr::eq(renderer.atlas(), &atlas));

        let road = atlas.group_base(SpriteGroup::MinimapRoad);
        renderer.draw_sprite(road, 2, 2);
        assert_eq!(renderer.pixel(2, 2), Some(atlas.sprite(road).unwrap().color));

        // Ids past the end of the given atlas are reported, not drawn.
        renderer.draw_sprite(SpriteId::new(atlas.sprite_count() as i32), 4, 4);
        assert_eq!(renderer.stats().missing_sprites, 1);
        assert_eq!(renderer.stats().sprites_drawn, 1);
    }

    #[test]
    fn test_wireframe_rect() {
        let atlas = PaletteAtlas::new();
        let mut renderer = SoftwareRenderer::new(Size::new(8, 8), Color::black(), &atlas);
        renderer.draw_wireframe_rect(PixelRect::new(1, 1, 4, 3), Color::yellow());
        assert_eq!(renderer.pixel(1, 1), Some(Color::yellow()));
        assert_eq!(renderer.pixel(4, 3), Some(Color::yellow()));
        assert_eq!(renderer.pixel(2, 2), Some(Color::black())); // hollow
        assert_eq!(renderer.pixel(5, 1), Some(Color::black()));
    }
}
