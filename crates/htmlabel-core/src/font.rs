//! Font descriptors, the interning registry, and the cascading font stack.
//!
//! Fonts are resolved by merging each pushed attribute set over the enclosing font and then
//! interned by value, so two text items with the same effective style share one [`FontId`].

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::ops::{BitOr, BitOrAssign};

/// Text style bits. Values match the flag layout renderers already expect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontFlags(u8);

impl FontFlags {
    pub const ITALIC: Self = Self(1 << 0);
    pub const BOLD: Self = Self(1 << 1);
    pub const UNDERLINE: Self = Self(1 << 2);
    pub const SUPERSCRIPT: Self = Self(1 << 3);
    pub const SUBSCRIPT: Self = Self(1 << 4);
    pub const STRIKE: Self = Self(1 << 5);
    pub const OVERLINE: Self = Self(1 << 6);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x7f)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for FontFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for FontFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// A font descriptor. Every attribute is optional; unset attributes inherit from the enclosing
/// font when pushed onto a [`FontStack`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextFont {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub flags: FontFlags,
}

impl TextFont {
    pub fn with_flags(flags: FontFlags) -> Self {
        Self {
            flags,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Fills every unset attribute from `parent` and unions the style flags.
    pub fn inherit_from(mut self, parent: &TextFont) -> Self {
        if self.name.is_none() {
            self.name = parent.name.clone();
        }
        if self.size.is_none() {
            self.size = parent.size;
        }
        if self.color.is_none() {
            self.color = parent.color.clone();
        }
        self.flags |= parent.flags;
        self
    }

    fn size_bits(&self) -> Option<u64> {
        self.size.map(f64::to_bits)
    }
}

// Sizes compare bitwise so that interning stays a total equivalence.
impl PartialEq for TextFont {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.size_bits() == other.size_bits()
            && self.color == other.color
            && self.flags == other.flags
    }
}

impl Eq for TextFont {}

impl Hash for TextFont {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size_bits().hash(state);
        self.color.hash(state);
        self.flags.hash(state);
    }
}

/// Handle to an interned font. It does not own the descriptor; resolve it through the registry
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontId(u32);

impl FontId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The interning table owned by the host (typically the graphics context). It outlives any
/// single parse and is append-only while a parse runs.
pub trait FontRegistry {
    /// Returns the handle of the descriptor equal to `font`, inserting it if needed.
    fn intern(&mut self, font: TextFont) -> FontId;

    fn font(&self, id: FontId) -> Option<&TextFont>;
}

#[derive(Debug, Clone, Default)]
pub struct FontTable {
    fonts: IndexSet<TextFont, FxBuildHasher>,
}

impl FontTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FontId, &TextFont)> {
        self.fonts
            .iter()
            .enumerate()
            .map(|(idx, font)| (FontId(idx as u32), font))
    }
}

impl FontRegistry for FontTable {
    fn intern(&mut self, font: TextFont) -> FontId {
        let (idx, _) = self.fonts.insert_full(font);
        FontId(idx as u32)
    }

    fn font(&self, id: FontId) -> Option<&TextFont> {
        self.fonts.get_index(id.index())
    }
}

#[derive(Debug, Clone)]
struct ActiveFont {
    id: FontId,
    font: TextFont,
}

/// Cascading font context of a single parse.
///
/// The bottom entry is the base font (all attributes unset) and is never popped.
#[derive(Debug, Clone)]
pub struct FontStack {
    entries: Vec<ActiveFont>,
}

impl FontStack {
    pub fn new(registry: &mut dyn FontRegistry) -> Self {
        let base = TextFont::default();
        let id = registry.intern(base.clone());
        Self {
            entries: vec![ActiveFont { id, font: base }],
        }
    }

    /// Merges `attrs` over the active font, interns the result and makes it active.
    pub fn push(&mut self, attrs: TextFont, registry: &mut dyn FontRegistry) -> FontId {
        let merged = attrs.inherit_from(&self.top().font);
        let id = registry.intern(merged.clone());
        self.entries.push(ActiveFont { id, font: merged });
        id
    }

    /// Pops the active font.
    ///
    /// # Panics
    ///
    /// Panics when only the base entry is left; balanced markup never gets there.
    pub fn pop(&mut self) {
        assert!(self.entries.len() > 1, "popped the base font entry");
        self.entries.pop();
    }

    pub fn current(&self) -> FontId {
        self.top().id
    }

    pub fn current_font(&self) -> &TextFont {
        &self.top().font
    }

    /// Number of entries above the base.
    pub fn depth(&self) -> usize {
        self.entries.len() - 1
    }

    /// Drops every entry above the base.
    pub fn reset(&mut self) {
        self.entries.truncate(1);
    }

    fn top(&self) -> &ActiveFont {
        // `entries` always holds the base entry.
        &self.entries[self.entries.len() - 1]
    }
}
