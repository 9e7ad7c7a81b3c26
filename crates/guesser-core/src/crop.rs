//! Crop region calculation.
//!
//! The patch is centred on the feature pixel, then shifted (never shrunk) to
//! lie fully inside the map. Boxes are not wrapped across the longitude seam:
//! a feature right at the seam yields a patch that is off-centre.

use serde::{Deserialize, Serialize};

use crate::coords::PixelCoord;
use crate::error::{GuesserError, Result};
use crate::planet::PlanetProfile;

/// Patch dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSize {
    pub width: u32,
    pub height: u32,
}

impl PatchSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }
}

impl Default for PatchSize {
    fn default() -> Self {
        Self::square(180)
    }
}

/// Pixel box `[left, right) × [top, bottom)` on the map image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRegion {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn contains(&self, p: PixelCoord) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }
}

/// Check once, at startup, that the patch fits the planet's map.
pub fn validate_patch(planet: &PlanetProfile, patch: PatchSize) -> Result<()> {
    if patch.width == 0 || patch.height == 0 {
        return Err(GuesserError::EmptyPatch {
            width: patch.width,
            height: patch.height,
        });
    }
    if patch.width > planet.map_width || patch.height > planet.map_height {
        return Err(GuesserError::PatchTooLarge {
            patch_width: patch.width,
            patch_height: patch.height,
            map_width: planet.map_width,
            map_height: planet.map_height,
        });
    }
    Ok(())
}

/// Shift `[start, start + len)` into `[0, limit)`. Requires `len <= limit`.
fn clamp_span(center: u32, len: u32, limit: u32) -> (u32, u32) {
    let start = i64::from(center) - i64::from(len / 2);
    let start = start.clamp(0, i64::from(limit - len)) as u32;
    (start, start + len)
}

/// Patch-sized box around `center`, shifted inside the map.
pub fn compute(planet: &PlanetProfile, center: PixelCoord, patch: PatchSize) -> Result<CropRegion> {
    validate_patch(planet, patch)?;
    let (left, right) = clamp_span(center.x, patch.width, planet.map_width);
    let (top, bottom) = clamp_span(center.y, patch.height, planet.map_height);
    Ok(CropRegion { left, top, right, bottom })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planet::Body;

    fn mars() -> PlanetProfile {
        PlanetProfile::builtin(Body::Mars)
    }

    #[test]
    fn corner_feature_shifts_patch_inside() {
        let r = compute(&mars(), PixelCoord::new(5, 5), PatchSize::square(20)).unwrap();
        assert_eq!(r, CropRegion { left: 0, top: 0, right: 20, bottom: 20 });
    }

    #[test]
    fn far_corner_shifts_left_and_up() {
        let r = compute(&mars(), PixelCoord::new(1023, 511), PatchSize::new(100, 60)).unwrap();
        assert_eq!(r, CropRegion { left: 924, top: 452, right: 1024, bottom: 512 });
    }

    #[test]
    fn interior_feature_is_centred() {
        let center = PixelCoord::new(392, 271);
        let r = compute(&mars(), center, PatchSize::square(100)).unwrap();
        assert_eq!(r, CropRegion { left: 342, top: 221, right: 442, bottom: 321 });
        assert!(r.contains(center));
    }

    #[test]
    fn oversize_patch_is_rejected() {
        let p = mars();
        for patch in [PatchSize::new(1025, 10), PatchSize::new(10, 513)] {
            let err = compute(&p, PixelCoord::new(10, 10), patch).unwrap_err();
            assert!(matches!(err, GuesserError::PatchTooLarge { .. }), "{patch:?}: {err:?}");
        }
    }

    #[test]
    fn zero_patch_is_rejected() {
        let err = validate_patch(&mars(), PatchSize::new(0, 10)).unwrap_err();
        assert!(matches!(err, GuesserError::EmptyPatch { .. }));
    }

    #[test]
    fn full_map_patch_covers_everything() {
        let r = compute(&mars(), PixelCoord::new(700, 3), PatchSize::new(1024, 512)).unwrap();
        assert_eq!(r, CropRegion { left: 0, top: 0, right: 1024, bottom: 512 });
    }

    #[test]
    fn seam_feature_is_clamped_not_wrapped() {
        let r = compute(&mars(), PixelCoord::new(0, 256), PatchSize::square(180)).unwrap();
        assert_eq!((r.left, r.right), (0, 180));
    }

    #[test]
    fn region_invariant_holds_across_map() {
        let p = mars();
        let patch = PatchSize::new(181, 97);
        for y in (0..p.map_height).step_by(13) {
            for x in (0..p.map_width).step_by(17) {
                let r = compute(&p, PixelCoord::new(x, y), patch).unwrap();
                assert!(r.left < r.right && r.right <= p.map_width);
                assert!(r.top < r.bottom && r.bottom <= p.map_height);
                assert_eq!((r.width(), r.height()), (181, 97));
                assert!(r.contains(PixelCoord::new(x, y)));
            }
        }
    }

    #[test]
    fn compute_is_pure() {
        let p = mars();
        let a = compute(&p, PixelCoord::new(640, 100), PatchSize::default());
        let b = compute(&p, PixelCoord::new(640, 100), PatchSize::default());
        assert_eq!(a.unwrap(), b.unwrap());
    }
}
