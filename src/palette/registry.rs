use std::collections::HashMap;

use tracing::warn;

use crate::palette::{Palette, Rgb};

/// Name of the palette used for unknown pillars
pub const DEFAULT_PALETTE: &str = "default";

/// Registry of pillar palettes
///
/// Palettes are registered by name at startup and looked up by the pillar
/// tag of each run. Lookups never fail: an unknown pillar resolves to the
/// `default` palette.
pub struct PaletteRegistry {
    palettes: HashMap<String, Palette>,
}

impl PaletteRegistry {
    /// Create a new registry with all built-in palettes
    pub fn new() -> Self {
        let mut registry = Self {
            palettes: HashMap::new(),
        };

        registry.register_builtin_palettes();
        registry
    }

    fn register_builtin_palettes(&mut self) {
        // Money / profit
        self.register(Palette::new("wins", Rgb::new(0x1a, 0x4d, 0x2e)));

        // Technology
        self.register(Palette::new("tech", Rgb::new(0x1e, 0x3a, 0x8a)));

        // Future / vision
        self.register(Palette::new("vision", Rgb::new(0x58, 0x1c, 0x87)));

        self.register(Palette::new(DEFAULT_PALETTE, Rgb::new(0x1a, 0x1a, 0x1a)));
    }

    /// Register a palette, replacing any palette with the same name
    pub fn register(&mut self, mut palette: Palette) {
        palette.name = palette.name.trim().to_ascii_lowercase();
        self.palettes.insert(palette.name.clone(), palette);
    }

    /// Get a palette by pillar name (case-insensitive)
    pub fn get(&self, pillar: &str) -> Option<&Palette> {
        self.palettes.get(&pillar.trim().to_ascii_lowercase())
    }

    /// Resolve a pillar, falling back to the default palette
    pub fn resolve(&self, pillar: &str) -> Palette {
        if let Some(palette) = self.get(pillar) {
            return palette.clone();
        }

        warn!(pillar = %pillar, "Unknown pillar, using default palette");
        self.palettes
            .get(DEFAULT_PALETTE)
            .cloned()
            .unwrap_or_else(|| Palette::new(DEFAULT_PALETTE, Rgb::new(0x1a, 0x1a, 0x1a)))
    }

    /// All registered pillar names, sorted
    pub fn available_pillars(&self) -> Vec<String> {
        let mut names: Vec<String> = self.palettes.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_pillar(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }
}

impl Default for PaletteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
