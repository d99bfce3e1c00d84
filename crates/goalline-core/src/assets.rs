//! Cube image lookup.
//!
//! A roll produces 24 cubes in four colors of six. Resource slot `i` holds a
//! cube of color `i / 6` showing face `cube_index[i]`; the image for it is
//! `{color}{face}.png`.

use std::collections::HashMap;

/// Faces per cube, and cubes per color.
pub const FACES: usize = 6;

/// Every cube image the client preloads.
pub const ASSET_NAMES: [&str; 24] = [
    "r0.png", "r1.png", "r2.png", "r3.png", "r4.png", "r5.png",
    "b0.png", "b1.png", "b2.png", "b3.png", "b4.png", "b5.png",
    "g0.png", "g1.png", "g2.png", "g3.png", "g4.png", "g5.png",
    "bk0.png", "bk1.png", "bk2.png", "bk3.png", "bk4.png", "bk5.png",
];

/// Cube colors, in resource-slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeColor {
    Red,
    Blue,
    Green,
    Black,
}

impl CubeColor {
    /// Color of the cube in a resource slot.
    pub fn for_slot(source_index: usize) -> Option<Self> {
        match source_index / FACES {
            0 => Some(CubeColor::Red),
            1 => Some(CubeColor::Blue),
            2 => Some(CubeColor::Green),
            3 => Some(CubeColor::Black),
            _ => None,
        }
    }

    /// Filename prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            CubeColor::Red => "r",
            CubeColor::Blue => "b",
            CubeColor::Green => "g",
            CubeColor::Black => "bk",
        }
    }
}

/// Image filename for the cube in `source_index` showing `face`.
///
/// Returns `None` for slots past the roll or faces outside `0..6`
/// (the server marks consumed slots with `-1`).
pub fn asset_name(source_index: usize, face: i32) -> Option<String> {
    let color = CubeColor::for_slot(source_index)?;
    if !(0..FACES as i32).contains(&face) {
        return None;
    }
    Some(format!("{}{}.png", color.prefix(), face))
}

/// Source of drawable cube images.
///
/// Implementations must hand out independent handles: a token may rotate or
/// highlight its copy without affecting other callers.
pub trait AssetProvider {
    type Image: Clone;

    /// Image for the cube in `source_index`, given the roll's face table.
    fn token_image(&self, cube_index: &[i32], source_index: usize) -> Option<Self::Image>;
}

/// Filename-keyed image cache.
#[derive(Debug, Clone)]
pub struct ImageCache<I> {
    images: HashMap<String, I>,
}

impl<I> Default for ImageCache<I> {
    fn default() -> Self {
        Self {
            images: HashMap::new(),
        }
    }
}

impl<I> ImageCache<I> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a downloaded image under its filename.
    pub fn insert(&mut self, name: impl Into<String>, image: I) {
        let name = name.into();
        log::debug!("Cached asset {}", name);
        self.images.insert(name, image);
    }

    pub fn get(&self, name: &str) -> Option<&I> {
        self.images.get(name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Names from [`ASSET_NAMES`] that have not been cached yet.
    pub fn missing(&self) -> impl Iterator<Item = &'static str> + '_ {
        ASSET_NAMES
            .iter()
            .copied()
            .filter(|name| !self.images.contains_key(*name))
    }
}

impl<I: Clone> AssetProvider for ImageCache<I> {
    type Image = I;

    fn token_image(&self, cube_index: &[i32], source_index: usize) -> Option<I> {
        let face = *cube_index.get(source_index)?;
        let name = asset_name(source_index, face)?;
        self.images.get(&name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_names() {
        assert_eq!(asset_name(0, 3).as_deref(), Some("r3.png"));
        assert_eq!(asset_name(7, 0).as_deref(), Some("b0.png"));
        assert_eq!(asset_name(13, 5).as_deref(), Some("g5.png"));
        assert_eq!(asset_name(23, 1).as_deref(), Some("bk1.png"));
        assert_eq!(asset_name(24, 1), None);
        assert_eq!(asset_name(2, -1), None);
        assert_eq!(asset_name(2, 6), None);
    }

    #[test]
    fn test_asset_names_cover_every_slot() {
        for slot in 0..24 {
            for face in 0..FACES as i32 {
                let name = asset_name(slot, face).unwrap();
                assert!(ASSET_NAMES.contains(&name.as_str()));
            }
        }
    }

    #[test]
    fn test_cache_lookup_clones() {
        let mut cache = ImageCache::new();
        cache.insert("g2.png", String::from("green two"));
        let mut faces = vec![0; 24];
        faces[14] = 2;

        let image = cache.token_image(&faces, 14).unwrap();
        assert_eq!(image, "green two");
        assert!(cache.token_image(&faces, 0).is_none());
        assert!(cache.token_image(&faces, 30).is_none());
    }

    #[test]
    fn test_missing_assets() {
        let mut cache = ImageCache::new();
        assert_eq!(cache.missing().count(), 24);
        cache.insert("r0.png", ());
        assert_eq!(cache.missing().count(), 23);
        assert!(!cache.missing().any(|name| name == "r0.png"));
    }
}
