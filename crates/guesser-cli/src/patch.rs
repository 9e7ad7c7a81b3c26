//! Map image handling: the only place that touches pixel data.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use guesser_core::CropRegion;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use tracing::warn;

/// Grey used for the stand-in map when the real image is missing.
const PLACEHOLDER_GREY: [u8; 3] = [100, 100, 100];

/// Open the global map, or build a flat grey stand-in of `fallback` size.
pub fn load_map(path: &Path, fallback: (u32, u32)) -> Result<DynamicImage> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "map image not found, using {}x{} placeholder",
            fallback.0,
            fallback.1
        );
        let img = RgbImage::from_pixel(fallback.0, fallback.1, Rgb(PLACEHOLDER_GREY));
        return Ok(DynamicImage::ImageRgb8(img));
    }
    image::open(path).with_context(|| format!("Cannot decode map image {}", path.display()))
}

/// Cut `region` out of the map and enlarge it `upscale` times (Lanczos3).
pub fn extract_patch(map: &DynamicImage, region: CropRegion, upscale: u32) -> Result<DynamicImage> {
    let patch = map.crop_imm(region.left, region.top, region.width(), region.height());
    if upscale <= 1 {
        return Ok(patch);
    }
    let (Some(width), Some(height)) = (
        region.width().checked_mul(upscale),
        region.height().checked_mul(upscale),
    ) else {
        return Err(anyhow!(
            "upscale {upscale} is too large for a {}x{} patch",
            region.width(),
            region.height()
        ));
    };
    Ok(patch.resize_exact(width, height, FilterType::Lanczos3))
}

/// Write a round's patch as `round_NNNN.png` under `dir` (created if absent).
pub fn save_patch(patch: &DynamicImage, dir: &Path, round: u32) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    let path = dir.join(format!("round_{round:04}.png"));
    patch
        .save(&path)
        .with_context(|| format!("Write failed: {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn gradient_map() -> DynamicImage {
        let img = RgbImage::from_fn(64, 32, |x, y| Rgb([x as u8, y as u8, 0]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn extract_patch_takes_region_pixels() {
        let map = gradient_map();
        let region = CropRegion { left: 10, top: 4, right: 20, bottom: 12 };
        let patch = extract_patch(&map, region, 1).unwrap();
        assert_eq!(patch.dimensions(), (10, 8));
        assert_eq!(patch.get_pixel(0, 0).0[..3], [10, 4, 0]);
        assert_eq!(patch.get_pixel(9, 7).0[..3], [19, 11, 0]);
    }

    #[test]
    fn extract_patch_upscales() {
        let region = CropRegion { left: 0, top: 0, right: 16, bottom: 8 };
        let patch = extract_patch(&gradient_map(), region, 2).unwrap();
        assert_eq!(patch.dimensions(), (32, 16));
    }

    #[test]
    fn overflowing_upscale_is_an_error() {
        let region = CropRegion { left: 0, top: 0, right: 16, bottom: 8 };
        let err = extract_patch(&gradient_map(), region, u32::MAX).unwrap_err();
        assert!(err.to_string().contains("too large"), "got {err}");
    }

    #[test]
    fn missing_map_yields_placeholder() {
        let map = load_map(Path::new("/nonexistent/mars.jpg"), (128, 64)).unwrap();
        assert_eq!(map.dimensions(), (128, 64));
    }

    #[test]
    fn save_patch_writes_numbered_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("patches");
        let region = CropRegion { left: 0, top: 0, right: 8, bottom: 8 };
        let path = save_patch(&extract_patch(&gradient_map(), region, 1).unwrap(), &out, 3).unwrap();
        assert!(path.ends_with("round_0003.png"));
        assert!(path.exists());
    }
}
