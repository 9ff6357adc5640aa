// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Dimensions, rectangles and frame rates used by node settings.

use serde::Deserialize;

/// Cartesian pixel dimension
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Size {
    /// horizontal dimension
    pub width: u32,
    /// vertical dimension
    pub height: u32,
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Size {
    /// Percentage based reference frame used by compose parts
    pub const PERCENT: Self = Self::new(100, 100);
    /// Lowest rung of the default ladder
    pub const LOW: Self = Self::new(320, 180);
    /// nHD
    pub const NHD: Self = Self::new(640, 360);
    /// HD (High Definition)
    pub const HD: Self = Self::new(1280, 720);
    /// Full HD (FHD)
    pub const FHD: Self = Self::new(1920, 1080);

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// true if one of both dimensions is zero
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rectangle within a reference resolution
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering the whole of `size`.
    #[must_use]
    pub const fn full(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// true if the rectangle lies completely within `size`
    #[must_use]
    pub fn fits(&self, size: Size) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(size.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(size.height)
    }
}

/// Frame rate as a fraction of `frames` per `seconds`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct FrameRate {
    pub frames: u32,
    pub seconds: u32,
}

impl FrameRate {
    pub const FPS_25: Self = Self::new(25, 1);

    #[must_use]
    pub const fn new(frames: u32, seconds: u32) -> Self {
        Self { frames, seconds }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.frames > 0 && self.seconds > 0
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_25
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.frames, self.seconds)
    }
}
