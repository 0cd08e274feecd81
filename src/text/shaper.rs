use std::fmt;

use ar_reshaper::ArabicReshaper;
use unicode_bidi::BidiInfo;

/// Turns logically ordered text into display-ordered glyphs
///
/// Shaping runs in two passes per line: Arabic letters are replaced by their
/// contextual presentation forms and ligatures, then the line is reordered
/// for left-to-right drawing with the Unicode bidirectional algorithm.
/// Digits and Latin runs inside right-to-left text keep their reading order.
///
/// The transform is total: characters the reshaper knows nothing about are
/// passed through, so shaping never rejects input. Harakat are dropped, as
/// the default reshaper configuration does.
pub struct TextShaper {
    reshaper: ArabicReshaper,
}

impl TextShaper {
    pub fn new() -> Self {
        Self {
            reshaper: ArabicReshaper::default(),
        }
    }

    /// Shape and reorder `text` for a surface that draws left to right
    pub fn shape(&self, text: &str) -> String {
        text.split('\n')
            .map(|line| self.shape_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn shape_line(&self, line: &str) -> String {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            return String::new();
        }

        let joined = self.reshaper.reshape(line);

        let bidi = BidiInfo::new(&joined, None);
        let mut visual = String::with_capacity(joined.len());
        for paragraph in &bidi.paragraphs {
            let range = paragraph.range.clone();
            visual.push_str(&bidi.reorder_line(paragraph, range));
        }
        visual
    }

    /// Whether any character needs right-to-left handling
    pub fn needs_shaping(text: &str) -> bool {
        text.chars().any(|c| {
            matches!(c,
                '\u{0590}'..='\u{08FF}'
                | '\u{FB1D}'..='\u{FDFF}'
                | '\u{FE70}'..='\u{FEFF}')
        })
    }
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextShaper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextShaper").finish_non_exhaustive()
    }
}
