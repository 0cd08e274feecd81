use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use tracing::{debug, warn};

use crate::speech::Language;

const ENGLISH_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Impact.ttf",
    "/Library/Fonts/Impact.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "C:\\Windows\\Fonts\\impact.ttf",
];

const ARABIC_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoNaskhArabic-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansArabic-Bold.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansArabic-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Tried after the language chain
const GENERIC_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Ordered font fallback chains, one per language
///
/// Loading never fails: paths that are missing or unparsable are skipped,
/// and a language may end up with an empty chain.
#[derive(Clone, Default)]
pub struct FontBook {
    english: Vec<Arc<Font>>,
    arabic: Vec<Arc<Font>>,
}

impl FontBook {
    /// Load the built-in chains, with `extra` paths tried first
    pub fn load(extra: &[PathBuf]) -> Self {
        let mut cache: HashMap<PathBuf, Option<Arc<Font>>> = HashMap::new();

        let english = Self::load_chain(&mut cache, extra, ENGLISH_FONTS);
        let arabic = Self::load_chain(&mut cache, extra, ARABIC_FONTS);

        if english.is_empty() {
            warn!("⚠️  No font found for English overlays, text will not be drawn");
        }
        if arabic.is_empty() {
            warn!("⚠️  No font found for Arabic overlays, text will not be drawn");
        }

        debug!(english = english.len(), arabic = arabic.len(), "Font chains loaded");

        Self { english, arabic }
    }

    /// Build a book from already loaded fonts
    pub fn from_fonts(english: Vec<Arc<Font>>, arabic: Vec<Arc<Font>>) -> Self {
        Self { english, arabic }
    }

    /// A book without fonts; overlays come out blank
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn chain(&self, language: Language) -> &[Arc<Font>] {
        match language {
            Language::English => &self.english,
            Language::Arabic => &self.arabic,
        }
    }

    pub fn has_fonts(&self, language: Language) -> bool {
        !self.chain(language).is_empty()
    }

    /// Index of the first font in the chain that has a glyph for `c`
    ///
    /// Falls back to the head of the chain so missing glyphs still advance.
    pub fn font_for(&self, language: Language, c: char) -> Option<usize> {
        let chain = self.chain(language);
        if chain.is_empty() {
            return None;
        }
        let found = chain.iter().position(|font| font.lookup_glyph_index(c) != 0);
        Some(found.unwrap_or(0))
    }

    fn load_chain(
        cache: &mut HashMap<PathBuf, Option<Arc<Font>>>,
        extra: &[PathBuf],
        language_paths: &[&str],
    ) -> Vec<Arc<Font>> {
        let candidates = extra
            .iter()
            .cloned()
            .chain(language_paths.iter().map(PathBuf::from))
            .chain(GENERIC_FONTS.iter().map(PathBuf::from));

        let mut seen = Vec::new();
        let mut chain = Vec::new();
        for path in candidates {
            if seen.contains(&path) {
                continue;
            }
            let font = cache.entry(path.clone()).or_insert_with(|| load_font(&path));
            if let Some(font) = font {
                chain.push(font.clone());
            }
            seen.push(path);
        }
        chain
    }
}

fn load_font(path: &Path) -> Option<Arc<Font>> {
    if !path.exists() {
        return None;
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot read font");
            return None;
        }
    };

    match Font::from_bytes(bytes, FontSettings::default()) {
        Ok(font) => {
            debug!(path = %path.display(), "Loaded font");
            Some(Arc::new(font))
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot parse font");
            None
        }
    }
}
