//! Palettes and color selection.
//!
//! Each style pairs an `on` palette (shapes classified as foreground) with an
//! `off` palette (background). [`ColorSelector::select`] draws uniformly from the
//! palette picked by the classification. Duplicate palette entries are kept and
//! weight the draw.
use std::fmt;
use std::str::FromStr;

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sampling::rand_index;

/// An opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` literal.
    pub const fn from_u32(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(s.to_owned()));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| Error::InvalidColor(s.to_owned()))?;
        Ok(Color::from_u32(value))
    }
}

/// The two palettes of one style.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StylePalettes {
    pub name: String,
    pub on: Vec<Color>,
    pub off: Vec<Color>,
}

impl StylePalettes {
    pub fn new(name: impl Into<String>, on: Vec<Color>, off: Vec<Color>) -> Self {
        Self {
            name: name.into(),
            on,
            off,
        }
    }

    fn from_hex(name: &str, on: &[u32], off: &[u32]) -> Self {
        Self::new(
            name,
            on.iter().copied().map(Color::from_u32).collect(),
            off.iter().copied().map(Color::from_u32).collect(),
        )
    }

    /// Palette used for a classification.
    pub fn palette(&self, classification: bool) -> &[Color] {
        if classification {
            &self.on
        } else {
            &self.off
        }
    }
}

/// Ordered table of styles addressed by index.
///
/// Deserialization goes through [`PaletteTable::new`], so a loaded table obeys
/// the same non-empty rules as one built in code.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<StylePalettes>", into = "Vec<StylePalettes>")
)]
pub struct PaletteTable {
    styles: Vec<StylePalettes>,
}

impl PaletteTable {
    /// Creates a table, rejecting empty tables and empty palettes.
    pub fn new(styles: Vec<StylePalettes>) -> Result<Self> {
        if styles.is_empty() {
            return Err(Error::InvalidConfig("palette table has no styles".into()));
        }
        for style in &styles {
            if style.on.is_empty() || style.off.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "style '{}' has an empty palette",
                    style.name
                )));
            }
        }
        Ok(Self { styles })
    }

    /// The seven reference styles.
    pub fn reference() -> Self {
        let styles = vec![
            StylePalettes::from_hex(
                "General 1",
                &[0xF9BB82, 0xEBA170, 0xFCCD84],
                &[0x9CA594, 0xACB4A5, 0xBBB964, 0xD7DAAA, 0xE5D57D, 0xD1D6AF],
            ),
            StylePalettes::from_hex(
                "General 2",
                &[0x89B270, 0x7AA45E, 0xB6C674, 0x7AA45E, 0xB6C674],
                &[0xF49427, 0xC9785D, 0xE88C6A, 0xF1B081],
            ),
            StylePalettes::from_hex(
                "General 3",
                &[0x89B270, 0x7AA45E, 0xB6C674, 0x7AA45E, 0xB6C674, 0xFECB05],
                &[0xF49427, 0xC9785D, 0xE88C6A, 0xF1B081, 0xFFCE00],
            ),
            StylePalettes::from_hex(
                "Protanopia",
                &[0xE96B6C, 0xF7989C],
                &[0x635A4A, 0x817865, 0x9C9C84],
            ),
            StylePalettes::from_hex(
                "Protanomaly",
                &[0xAD5277, 0xF7989C],
                &[0x635A4A, 0x817865, 0x9C9C84],
            ),
            StylePalettes::from_hex("Viewable by all", &[0xFF934F], &[0x9C9C9C]),
            StylePalettes::from_hex(
                "Colorblind only",
                &[0xA8AA00, 0x83BE28],
                &[0x828200, 0x669A1B, 0x828200, 0x669A1B, 0xED6311],
            ),
        ];
        Self { styles }
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn get(&self, style: usize) -> Option<&StylePalettes> {
        self.styles.get(style)
    }

    /// Finds a style index by its display name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.styles.iter().position(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StylePalettes> {
        self.styles.iter()
    }
}

impl TryFrom<Vec<StylePalettes>> for PaletteTable {
    type Error = Error;

    fn try_from(styles: Vec<StylePalettes>) -> Result<Self> {
        Self::new(styles)
    }
}

impl From<PaletteTable> for Vec<StylePalettes> {
    fn from(table: PaletteTable) -> Self {
        table.styles
    }
}

impl Default for PaletteTable {
    fn default() -> Self {
        Self::reference()
    }
}

/// Maps a classification and style index to a random palette color.
#[derive(Clone, Debug, Default)]
pub struct ColorSelector {
    table: PaletteTable,
}

impl ColorSelector {
    pub fn new(table: PaletteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PaletteTable {
        &self.table
    }

    /// Returns an error if `style` does not name a table entry with two
    /// non-empty palettes.
    pub fn check_style(&self, style: usize) -> Result<()> {
        let Some(palettes) = self.table.get(style) else {
            return Err(Error::InvalidConfig(format!(
                "style {style} out of range; palette table has {} styles",
                self.table.len()
            )));
        };
        if palettes.on.is_empty() || palettes.off.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "style '{}' has an empty palette",
                palettes.name
            )));
        }
        Ok(())
    }

    /// Picks a uniformly random color from the style's `on` palette when
    /// `classification` is true, from its `off` palette otherwise.
    ///
    /// Returns `None` for an unknown style or an empty palette; neither passes
    /// [`check_style`](Self::check_style).
    pub fn select(
        &self,
        classification: bool,
        style: usize,
        rng: &mut dyn Rng,
    ) -> Option<Color> {
        let palette = self.table.get(style)?.palette(classification);
        if palette.is_empty() {
            return None;
        }
        palette.get(rand_index(rng, palette.len())).copied()
    }
}
