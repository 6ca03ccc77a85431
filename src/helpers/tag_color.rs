//! Deterministic tag colors

use serde::Serialize;

/// A palette entry: background/text pairs for light and dark presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagColor {
    pub name: &'static str,
    pub bg: &'static str,
    pub text: &'static str,
    pub dark_bg: &'static str,
    pub dark_text: &'static str,
}

impl TagColor {
    const fn new(
        name: &'static str,
        bg: &'static str,
        text: &'static str,
        dark_bg: &'static str,
        dark_text: &'static str,
    ) -> Self {
        Self {
            name,
            bg,
            text,
            dark_bg,
            dark_text,
        }
    }

    /// Inline CSS custom properties consumed by the `.tag-color` class
    pub fn css_vars(&self) -> String {
        format!(
            "--tag-bg-light: {}; --tag-text-light: {}; --tag-bg-dark: {}; --tag-text-dark: {};",
            self.bg, self.text, self.dark_bg, self.dark_text
        )
    }
}

/// The fixed tag palette
pub const TAG_COLORS: [TagColor; 8] = [
    TagColor::new("amber", "#fef3c7", "#92400e", "#451a03", "#fcd34d"),
    TagColor::new("terracotta", "#fee2e2", "#991b1b", "#450a0a", "#fca5a5"),
    TagColor::new("sage", "#ecfccb", "#3f6212", "#1a2e05", "#bef264"),
    TagColor::new("slate", "#e2e8f0", "#334155", "#1e293b", "#94a3b8"),
    TagColor::new("copper", "#ffedd5", "#9a3412", "#431407", "#fdba74"),
    TagColor::new("ocean", "#cffafe", "#155e75", "#164e63", "#67e8f9"),
    TagColor::new("plum", "#ede9fe", "#5b21b6", "#2e1065", "#c4b5fd"),
    TagColor::new("sand", "#fef9c3", "#854d0e", "#422006", "#fde047"),
];

/// Multiply-by-31 rolling hash over the UTF-16 code units of `tag`.
///
/// The shift works on the 32-bit truncation of the running value while the
/// subtraction does not, which is how browsers evaluate
/// `hash = code + ((hash << 5) - hash)`. Colors therefore match the ones
/// rendered by the client-side chips.
pub fn tag_hash(tag: &str) -> i64 {
    let mut hash: i64 = 0;
    for unit in tag.encode_utf16() {
        let shifted = (hash as i32).wrapping_shl(5) as i64;
        hash = (unit as i64).wrapping_add(shifted.wrapping_sub(hash));
    }
    hash
}

/// Resolve the palette entry for a tag
pub fn resolve(tag: &str) -> &'static TagColor {
    let index = tag_hash(tag).unsigned_abs() % TAG_COLORS.len() as u64;
    &TAG_COLORS[index as usize]
}
