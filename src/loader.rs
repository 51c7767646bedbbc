//! Picking and decoding the photo to measure.

use image::DynamicImage;
use std::path::{Path, PathBuf};

pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
pub const PNG_EXTENSIONS: &[&str] = &["png"];
// Upper-case variants for pickers that filter case-sensitively
pub const HEIF_EXTENSIONS: &[&str] = &["heif", "heic", "HEIF", "HEIC"];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("{0} is a HEIF image; rebuild with the `heif` feature to open it")]
    HeifUnsupported(PathBuf),
    #[error("failed to decode HEIF image {path}: {message}")]
    #[cfg_attr(not(feature = "heif"), allow(dead_code))]
    Heif { path: PathBuf, message: String },
}

/// Which decoder a file goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Raster,
    Heif,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Self {
        let is_heif = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("heif") || ext.eq_ignore_ascii_case("heic"));
        if is_heif {
            SourceKind::Heif
        } else {
            SourceKind::Raster
        }
    }
}

/// Native open dialog starting in the working directory. `None` when cancelled.
pub fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open a photo to measure")
        .set_directory(".")
        .add_filter("JPEG Files", JPEG_EXTENSIONS)
        .add_filter("PNG Files", PNG_EXTENSIONS)
        .add_filter("HEIF Files", HEIF_EXTENSIONS)
        .pick_file()
}

pub fn load_image(path: &Path) -> Result<DynamicImage, LoadError> {
    let img = match SourceKind::from_path(path) {
        SourceKind::Raster => load_raster(path)?,
        SourceKind::Heif => load_heif(path)?,
    };
    log::info!(
        "loaded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img)
}

/// Decoder is picked from the file's content, so a mislabelled extension still opens.
fn load_raster(path: &Path) -> Result<DynamicImage, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    image::ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?
        .decode()
        .map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(not(feature = "heif"))]
fn load_heif(path: &Path) -> Result<DynamicImage, LoadError> {
    Err(LoadError::HeifUnsupported(path.to_path_buf()))
}

#[cfg(feature = "heif")]
fn load_heif(path: &Path) -> Result<DynamicImage, LoadError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let heif_err = |err: libheif_rs::HeifError| LoadError::Heif {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let lib = LibHeif::new();
    let path_str = path.to_string_lossy();
    let ctx = HeifContext::read_from_file(&path_str).map_err(heif_err)?;
    let handle = ctx.primary_image_handle().map_err(heif_err)?;
    let decoded = lib
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(heif_err)?;

    let planes = decoded.planes();
    let layout_err = || LoadError::Heif {
        path: path.to_path_buf(),
        message: "decoder returned no interleaved RGBA plane".to_owned(),
    };
    let Some(plane) = planes.interleaved else {
        return Err(layout_err());
    };
    let (width, height) = (plane.width, plane.height);
    let row_len = width as usize * 4;
    // Rows may be padded beyond width * 4 bytes
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }
    image::RgbaImage::from_raw(width, height, pixels)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(layout_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heif_extensions_are_case_insensitive() {
        for name in ["a.heic", "a.HEIC", "a.heif", "a.HeIf"] {
            assert_eq!(SourceKind::from_path(Path::new(name)), SourceKind::Heif, "{name}");
        }
    }

    #[test]
    fn other_extensions_go_to_raster_decoder() {
        for name in ["a.jpg", "a.JPEG", "a.png", "no_extension"] {
            assert_eq!(SourceKind::from_path(Path::new(name)), SourceKind::Raster, "{name}");
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("digital-ruler-missing-photo.png");
        assert!(matches!(load_image(&path), Err(LoadError::Io { .. })));
    }

    #[test]
    fn png_with_jpeg_extension_still_decodes() {
        let path = std::env::temp_dir().join("digital-ruler-mislabelled.jpg");
        image::RgbaImage::from_pixel(5, 9, image::Rgba([200, 10, 10, 255]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        let img = load_image(&path).unwrap();
        assert_eq!((img.width(), img.height()), (5, 9));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn garbage_content_is_a_decode_error() {
        let path = std::env::temp_dir().join("digital-ruler-garbage.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(matches!(load_image(&path), Err(LoadError::Decode { .. })));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn decodes_png_written_to_disk() {
        let path = std::env::temp_dir().join("digital-ruler-loader-test.png");
        image::RgbaImage::from_pixel(7, 3, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        let img = load_image(&path).unwrap();
        assert_eq!((img.width(), img.height()), (7, 3));
        let _ = std::fs::remove_file(&path);
    }

    #[cfg(not(feature = "heif"))]
    #[test]
    fn heif_without_feature_is_reported() {
        let path = Path::new("photo.heic");
        assert!(matches!(load_image(path), Err(LoadError::HeifUnsupported(_))));
    }
}
