//! Soil-type colours.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Warning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Self = Self(0, 0, 0);

    #[must_use]
    pub const fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(arr: [u8; 3]) -> Self {
        Self(arr[0], arr[1], arr[2])
    }
}

/// CSS notation, e.g. `rgb(255,255,0)`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.0, self.1, self.2)
    }
}

const STANDARD: &[(&str, Rgb)] = &[
    ("SM-ML", Rgb(255, 255, 0)),
    ("SC", Rgb(210, 180, 140)),
    ("CI", Rgb(0, 128, 0)),
    ("SM/SM-ML", Rgb(255, 215, 0)),
    ("ROCK", Rgb(139, 69, 19)),
    ("SM", Rgb(255, 255, 224)),
    ("GP-GM", Rgb(128, 128, 128)),
    ("CH", Rgb(0, 100, 0)),
    ("ML-SM", Rgb(255, 192, 203)),
    ("CL", Rgb(135, 206, 250)),
    ("GM", Rgb(169, 169, 169)),
    ("GC", Rgb(112, 128, 144)),
    ("ML", Rgb(255, 228, 181)),
    ("SP", Rgb(255, 222, 173)),
    ("CHAR", Rgb(47, 79, 79)),
    ("SOIL", Rgb(255, 255, 0)),
    ("RM", Rgb(128, 128, 128)),
];

/// Immutable soil-type → colour lookup. Labels match exactly and
/// case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoilPalette {
    colors: BTreeMap<String, Rgb>,
}

impl SoilPalette {
    #[must_use]
    pub fn standard() -> Self {
        Self::from_entries(STANDARD.iter().map(|(label, rgb)| ((*label).to_owned(), *rgb)))
    }

    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Rgb)>,
    {
        Self {
            colors: entries.into_iter().collect(),
        }
    }

    /// A new palette with `overrides` added on top of this one.
    #[must_use]
    pub fn with_overrides<'a, I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Rgb)>,
    {
        let mut colors = self.colors.clone();
        colors.extend(overrides.into_iter().map(|(k, v)| (k.clone(), *v)));
        Self { colors }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<Rgb> {
        self.colors.get(label).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Entries sorted by label.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for SoilPalette {
    fn default() -> Self {
        Self::standard()
    }
}

/// Resolves labels against a palette for the duration of one render.
///
/// Unknown labels resolve to black. The first miss of each label yields a
/// [`Warning::UnmappedSoilType`]; later misses of the same label do not.
#[derive(Debug)]
pub struct SoilColorResolver<'p> {
    palette: &'p SoilPalette,
    reported: HashSet<String>,
}

impl<'p> SoilColorResolver<'p> {
    #[must_use]
    pub fn new(palette: &'p SoilPalette) -> Self {
        Self {
            palette,
            reported: HashSet::new(),
        }
    }

    pub fn resolve(&mut self, soil_type: &str) -> (Rgb, Option<Warning>) {
        if let Some(rgb) = self.palette.get(soil_type) {
            return (rgb, None);
        }

        let warning = self
            .reported
            .insert(soil_type.to_owned())
            .then(|| Warning::UnmappedSoilType {
                label: soil_type.to_owned(),
            });
        (Rgb::BLACK, warning)
    }

    /// Labels that have missed so far in this render.
    pub fn unmapped(&self) -> impl Iterator<Item = &str> {
        self.reported.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_palette_matches_known_labels() {
        let palette = SoilPalette::standard();
        assert_eq!(palette.get("SM"), Some(Rgb(255, 255, 224)));
        assert_eq!(palette.get("CL"), Some(Rgb(135, 206, 250)));
        assert_eq!(palette.get("CHAR"), Some(Rgb(47, 79, 79)));
        assert_eq!(palette.get("SM/SM-ML"), Some(Rgb(255, 215, 0)));
        assert_eq!(palette.len(), 17);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let palette = SoilPalette::standard();
        assert_eq!(palette.get("sm"), None);
        assert_eq!(palette.get(" SM"), None);
    }

    #[test]
    fn unknown_label_warns_once_per_render() {
        let palette = SoilPalette::standard();
        let mut resolver = SoilColorResolver::new(&palette);

        let mut warnings = Vec::new();
        for _ in 0..5 {
            let (rgb, warning) = resolver.resolve("XYZ");
            assert_eq!(rgb, Rgb::BLACK);
            warnings.extend(warning);
        }

        assert_eq!(
            warnings,
            vec![Warning::UnmappedSoilType {
                label: "XYZ".to_owned()
            }]
        );
        assert_eq!(resolver.unmapped().collect::<Vec<_>>(), vec!["XYZ"]);
    }

    #[test]
    fn new_resolver_forgets_previous_render() {
        let palette = SoilPalette::standard();
        let mut first = SoilColorResolver::new(&palette);
        assert!(first.resolve("XYZ").1.is_some());

        let mut second = SoilColorResolver::new(&palette);
        assert!(second.resolve("XYZ").1.is_some());
    }

    #[test]
    fn overrides_extend_without_mutating_base() {
        let base = SoilPalette::standard();
        let extra: BTreeMap<String, Rgb> =
            [("PEAT".to_owned(), Rgb(60, 40, 20)), ("SM".to_owned(), Rgb(1, 2, 3))]
                .into_iter()
                .collect();
        let merged = base.with_overrides(&extra);

        assert_eq!(merged.get("PEAT"), Some(Rgb(60, 40, 20)));
        assert_eq!(merged.get("SM"), Some(Rgb(1, 2, 3)));
        assert_eq!(base.get("SM"), Some(Rgb(255, 255, 224)));
        assert_eq!(base.get("PEAT"), None);
    }

    #[test]
    fn css_notation() {
        assert_eq!(Rgb(135, 206, 250).to_string(), "rgb(135,206,250)");
    }
}
