use std::ops::{Deref, DerefMut};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::utils::{Color, PixelRect, coords::PixelPoint};

pub mod software;

// ----------------------------------------------
// SpriteId / SpriteGroup
// ----------------------------------------------

// Index of a sprite in the atlas. Group members are contiguous, so
// variants are addressed as `base + n`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpriteId(i32);

impl SpriteId {
    #[inline]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn offset(self, delta: i32) -> Self {
        Self(self.0 + delta)
    }
}

impl std::fmt::Display for SpriteId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "sprite:{}", self.0)
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, IntoPrimitive, TryFromPrimitive)]
pub enum SpriteGroup {
    MinimapBlack,
    MinimapWater,
    MinimapTree,
    MinimapRock,
    MinimapMeadow,
    MinimapEmptyLand,
    MinimapRoad,
    MinimapWall,
    MinimapAqueduct,
    MinimapHouse,
    MinimapBuilding,
}

pub trait SpriteAtlas {
    fn group_base(&self, group: SpriteGroup) -> SpriteId;
}

// ----------------------------------------------
// RenderStats
// ----------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub sprites_drawn: u32,
    pub lines_drawn: u32,
    pub rects_drawn: u32,
    pub missing_sprites: u32,
}

// ----------------------------------------------
// RenderSystem
// ----------------------------------------------

// Pixel-level 2D drawing. Coordinates are whole screen pixels.
pub trait RenderSystem {
    // ----------------------
    // Clipping:
    // ----------------------

    fn set_clip_rect(&mut self, rect: PixelRect);
    fn reset_clip_rect(&mut self);

    // ----------------------
    // Draw commands:
    // ----------------------

    // `x,y` is the sprite's top-left corner.
    fn draw_sprite(&mut self, sprite: SpriteId, x: i32, y: i32);

    // Both end points are inclusive.
    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color);

    // Outline only, `rect.width x rect.height` pixels.
    fn draw_wireframe_rect(&mut self, rect: PixelRect, color: Color);

    fn stats(&self) -> RenderStats {
        RenderStats::default()
    }
}

// ----------------------------------------------
// ClipRectScope
// ----------------------------------------------

// Sets a clip rectangle for as long as the scope lives. Resetting happens
// on drop, so every exit path of a draw pass restores the clip state.
pub struct ClipRectScope<'a, R: RenderSystem + ?Sized> {
    render_sys: &'a mut R,
}

impl<'a, R: RenderSystem + ?Sized> ClipRectScope<'a, R> {
    pub fn new(render_sys: &'a mut R, rect: PixelRect) -> Self {
        render_sys.set_clip_rect(rect);
        Self { render_sys }
    }
}

impl<R: RenderSystem + ?Sized> Deref for ClipRectScope<'_, R> {
    type Target = R;

    #[inline]
    fn deref(&self) -> &R {
        self.render_sys
    }
}

impl<R: RenderSystem + ?Sized> DerefMut for ClipRectScope<'_, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut R {
        self.render_sys
    }
}

impl<R: RenderSystem + ?Sized> Drop for ClipRectScope<'_, R> {
    fn drop(&mut self) {
        self.render_sys.reset_clip_rect();
    }
}
