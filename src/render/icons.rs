//! Item icon resolution and caching
//!
//! Icons are addressed purely by item id. Any icon that fails to load is
//! replaced by the shared placeholder; that policy lives here and nowhere else.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};
use ratatui::style::Color;

use crate::catalog::ItemId;

/// Colour of the built-in swatch used when even the placeholder is missing
const BUILTIN_PLACEHOLDER_RGB: [u8; 3] = [70, 70, 80];
const BUILTIN_PLACEHOLDER_SIZE: u32 = 16;

/// Where icon files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconPaths {
    pub dir: PathBuf,
    pub extension: String,
    pub placeholder: PathBuf,
}

impl IconPaths {
    /// Primary image path for an item: `{dir}/{itemID}.{ext}`
    pub fn resolve_image_source(&self, id: &ItemId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, self.extension))
    }
}

impl Default for IconPaths {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("ICONS"),
            extension: "png".to_string(),
            placeholder: PathBuf::from("placeholder.png"),
        }
    }
}

/// Icon downsampled to terminal cells. Each cell carries the colours of the
/// upper and lower pixel it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub cols: u16,
    pub rows: u16,
    cells: Vec<(Color, Color)>,
}

impl Thumbnail {
    fn from_image(image: &DynamicImage, cols: u16, rows: u16) -> Self {
        let scaled = image
            .resize_exact(u32::from(cols), u32::from(rows) * 2, FilterType::Triangle)
            .to_rgba8();

        let mut cells = Vec::with_capacity(usize::from(cols) * usize::from(rows));
        for row in 0..u32::from(rows) {
            for col in 0..u32::from(cols) {
                let top = pixel_color(&scaled, col, row * 2);
                let bottom = pixel_color(&scaled, col, row * 2 + 1);
                cells.push((top, bottom));
            }
        }

        Self { cols, rows, cells }
    }

    /// (upper, lower) colour for a cell
    pub fn cell(&self, col: u16, row: u16) -> Option<(Color, Color)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells
            .get(usize::from(row) * usize::from(self.cols) + usize::from(col))
            .copied()
    }
}

/// Blend a pixel over black so transparent areas read as background
fn pixel_color(image: &RgbaImage, x: u32, y: u32) -> Color {
    let [r, g, b, a] = image.get_pixel(x, y).0;
    let scale = |c: u8| ((u16::from(c) * u16::from(a)) / 255) as u8;
    Color::Rgb(scale(r), scale(g), scale(b))
}

/// A decoded icon ready to draw
#[derive(Debug)]
pub struct Icon {
    image: Arc<DynamicImage>,
    /// True if this icon is standing in for a missing image
    pub is_placeholder: bool,
    average: Color,
    thumbnails: HashMap<(u16, u16), Thumbnail>,
    /// Kitty image ID once uploaded
    pub kitty_id: Option<u32>,
}

impl Icon {
    fn new(image: Arc<DynamicImage>, is_placeholder: bool) -> Self {
        let average = average_color(&image);
        Self {
            image,
            is_placeholder,
            average,
            thumbnails: HashMap::new(),
            kitty_id: None,
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Mean colour of the icon, used by the ASCII swatch
    pub fn average_color(&self) -> Color {
        self.average
    }

    /// Thumbnail for a cell box, computed once per size
    pub fn thumbnail(&mut self, cols: u16, rows: u16) -> &Thumbnail {
        let image = &self.image;
        self.thumbnails
            .entry((cols, rows))
            .or_insert_with(|| Thumbnail::from_image(image, cols, rows))
    }
}

fn average_color(image: &DynamicImage) -> Color {
    let tiny = image.resize_exact(1, 1, FilterType::Triangle).to_rgba8();
    pixel_color(&tiny, 0, 0)
}

fn builtin_placeholder() -> DynamicImage {
    let [r, g, b] = BUILTIN_PLACEHOLDER_RGB;
    let mut img = RgbaImage::new(BUILTIN_PLACEHOLDER_SIZE, BUILTIN_PLACEHOLDER_SIZE);
    for pixel in img.pixels_mut() {
        *pixel = image::Rgba([r, g, b, 255]);
    }
    DynamicImage::ImageRgba8(img)
}

/// Lazily decoded icons keyed by item id
#[derive(Debug)]
pub struct IconCache {
    paths: IconPaths,
    icons: HashMap<ItemId, Icon>,
    placeholder: Option<Arc<DynamicImage>>,
}

impl IconCache {
    pub fn new(paths: IconPaths) -> Self {
        Self {
            paths,
            icons: HashMap::new(),
            placeholder: None,
        }
    }

    /// Icon for an item: the item's own image if it decodes, otherwise the
    /// shared placeholder. Never fails.
    pub fn get_or_load(&mut self, id: &ItemId) -> &mut Icon {
        let Self { paths, icons, placeholder } = self;
        icons.entry(id.clone()).or_insert_with(|| {
            match open_image(&paths.resolve_image_source(id)) {
                Some(image) => Icon::new(Arc::new(image), false),
                None => {
                    let shared = placeholder.get_or_insert_with(|| {
                        Arc::new(open_image(&paths.placeholder).unwrap_or_else(builtin_placeholder))
                    });
                    Icon::new(Arc::clone(shared), true)
                }
            }
        })
    }
}

fn open_image(path: &Path) -> Option<DynamicImage> {
    let image = image::open(path).ok()?;
    // Zero-sized images cannot be scaled into cells
    if image.dimensions().0 == 0 || image.dimensions().1 == 0 {
        return None;
    }
    Some(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(r: u8, g: u8, b: u8) -> RgbaImage {
        let mut img = RgbaImage::new(4, 4);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgba([r, g, b, 255]);
        }
        img
    }

    fn paths_in(dir: &Path) -> IconPaths {
        IconPaths {
            dir: dir.join("ICONS"),
            extension: "png".to_string(),
            placeholder: dir.join("placeholder.png"),
        }
    }

    #[test]
    fn test_resolve_image_source_uses_item_id() {
        let paths = IconPaths::default();
        assert_eq!(
            paths.resolve_image_source(&ItemId::from(101)),
            PathBuf::from("ICONS").join("101.png")
        );
        assert_eq!(
            paths.resolve_image_source(&ItemId::from("0042")),
            PathBuf::from("ICONS").join("0042.png")
        );
    }

    #[test]
    fn test_existing_icon_is_used() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("ICONS")).unwrap();
        solid(255, 0, 0).save(dir.path().join("ICONS/101.png")).unwrap();

        let mut cache = IconCache::new(paths_in(dir.path()));
        let icon = cache.get_or_load(&ItemId::from(101));
        assert!(!icon.is_placeholder);
        assert_eq!(icon.average_color(), Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_missing_icon_falls_back_to_placeholder_file() {
        let dir = tempfile::tempdir().unwrap();
        solid(0, 0, 255).save(dir.path().join("placeholder.png")).unwrap();

        let mut cache = IconCache::new(paths_in(dir.path()));
        let icon = cache.get_or_load(&ItemId::from(999));
        assert!(icon.is_placeholder);
        assert_eq!(icon.average_color(), Color::Rgb(0, 0, 255));
    }

    #[test]
    fn test_missing_placeholder_uses_builtin_swatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = IconCache::new(paths_in(dir.path()));

        let icon = cache.get_or_load(&ItemId::from(1));
        assert!(icon.is_placeholder);
        let [r, g, b] = BUILTIN_PLACEHOLDER_RGB;
        assert_eq!(icon.average_color(), Color::Rgb(r, g, b));
    }

    #[test]
    fn test_corrupt_icon_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("ICONS")).unwrap();
        std::fs::write(dir.path().join("ICONS/5.png"), b"not a png").unwrap();

        let mut cache = IconCache::new(paths_in(dir.path()));
        assert!(cache.get_or_load(&ItemId::from(5)).is_placeholder);
    }

    #[test]
    fn test_thumbnail_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = IconCache::new(paths_in(dir.path()));
        let thumb = cache.get_or_load(&ItemId::from(1)).thumbnail(6, 3).clone();

        assert_eq!((thumb.cols, thumb.rows), (6, 3));
        assert!(thumb.cell(5, 2).is_some());
        assert!(thumb.cell(6, 0).is_none());
    }
}
