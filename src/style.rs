//! What the word-cloud renderer gets: weighted words with colors already
//! picked, plus canvas, font and mask settings.

use clap::ValueEnum;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::data_models::TopKResult;
use crate::notice::{Notice, Notifier};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 400;
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";
const FALLBACK_COLOR: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorStyle {
    Single(String),
    Palette(Vec<String>),
}

impl ColorStyle {
    pub fn palette(palette: NamedPalette) -> Self {
        Self::Palette(palette.colors().iter().map(|c| c.to_string()).collect())
    }

    pub fn pick(&self) -> &str {
        self.pick_with(&mut rand::thread_rng())
    }

    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        match self {
            ColorStyle::Single(color) => color,
            ColorStyle::Palette(colors) => colors
                .choose(rng)
                .map(String::as_str)
                .unwrap_or(FALLBACK_COLOR),
        }
    }
}

impl Default for ColorStyle {
    fn default() -> Self {
        Self::palette(NamedPalette::Pastel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamedPalette {
    Pastel,
    Dark,
    Bright,
    Signature,
}

impl NamedPalette {
    pub fn colors(self) -> &'static [&'static str] {
        match self {
            NamedPalette::Pastel => &[
                "#F1B2B2", "#F1D7B2", "#F1F1B2", "#B2F1B2", "#B2F1D7", "#E0B0FF",
            ],
            NamedPalette::Dark => &["#8B0000", "#006400", "#B22222", "#483D8B", "#D2691E"],
            NamedPalette::Bright => &[
                "#FF0000", "#DAA520", "#00FF00", "#0000FF", "#9400D3", "#00FFFF",
            ],
            NamedPalette::Signature => &[
                "#A54040", "#B96E6E", "#CD9C9C", "#98C665", "#B0D28A", "#C7DDAD", "#A57865",
                "#BA988A",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Font {
    #[default]
    Roboto,
    Ubuntu,
    Montserrat,
}

impl Font {
    pub fn file(self) -> &'static str {
        match self {
            Font::Roboto => "fonts/Roboto-Regular.ttf",
            Font::Ubuntu => "fonts/Ubuntu-Regular.ttf",
            Font::Montserrat => "fonts/Montserrat-Medium.ttf",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MaskShape {
    #[default]
    Rectangle,
    Star,
    Bird,
}

impl MaskShape {
    pub fn file(self) -> Option<&'static str> {
        match self {
            MaskShape::Rectangle => None,
            MaskShape::Star => Some("masks/star.png"),
            MaskShape::Bird => Some("masks/bird.png"),
        }
    }

    /// Mask image under `assets_dir`, or `None` for a plain rectangle.
    /// A missing file is reported and falls back to the rectangle.
    pub fn resolve(self, assets_dir: &Path, notifier: &Notifier) -> Option<PathBuf> {
        let path = assets_dir.join(self.file()?);
        if path.is_file() {
            Some(path)
        } else {
            notifier.notify(Notice::MaskUnavailable {
                path: path.display().to_string(),
            });
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct CloudStyle {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub color: ColorStyle,
    pub font: Font,
    pub mask: MaskShape,
}

impl Default for CloudStyle {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: DEFAULT_BACKGROUND.to_string(),
            color: ColorStyle::default(),
            font: Font::default(),
            mask: MaskShape::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloudWord {
    pub text: String,
    pub weight: usize,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloudSpec {
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub font: PathBuf,
    pub mask: Option<PathBuf>,
    pub words: Vec<CloudWord>,
}

impl CloudSpec {
    pub fn build(
        top: &TopKResult,
        style: &CloudStyle,
        assets_dir: &Path,
        notifier: &Notifier,
    ) -> Self {
        Self::build_with(top, style, assets_dir, notifier, &mut rand::thread_rng())
    }

    pub fn build_with<R: Rng + ?Sized>(
        top: &TopKResult,
        style: &CloudStyle,
        assets_dir: &Path,
        notifier: &Notifier,
        rng: &mut R,
    ) -> Self {
        let words = top
            .entries()
            .iter()
            .map(|entry| CloudWord {
                text: entry.term.clone(),
                weight: entry.count,
                color: style.color.pick_with(rng).to_string(),
            })
            .collect();
        Self {
            width: style.width,
            height: style.height,
            background: style.background.clone(),
            font: assets_dir.join(style.font.file()),
            mask: style.mask.resolve(assets_dir, notifier),
            words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::TermFrequency;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_single_color_always_wins() {
        let style = ColorStyle::Single("#123456".into());
        assert!((0..20).all(|_| style.pick() == "#123456"));
    }

    #[test]
    fn test_palette_pick_stays_in_palette() {
        let style = ColorStyle::palette(NamedPalette::Dark);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let color = style.pick_with(&mut rng);
            assert!(NamedPalette::Dark.colors().contains(&color));
        }
        assert_eq!(ColorStyle::Palette(vec![]).pick(), FALLBACK_COLOR);
    }

    #[test]
    fn test_missing_mask_falls_back_to_rectangle() {
        let dir = Path::new("/nonexistent-assets");
        assert_eq!(MaskShape::Rectangle.resolve(dir, &Notifier::silent()), None);
        assert_eq!(MaskShape::Star.resolve(dir, &Notifier::silent()), None);
    }

    #[test]
    fn test_cloud_spec_json() {
        let top = TopKResult::new(vec![
            TermFrequency::new("Море", 3),
            TermFrequency::new("Горный", 1),
        ]);
        let style = CloudStyle {
            color: ColorStyle::Single("#000000".into()),
            ..CloudStyle::default()
        };
        let spec = CloudSpec::build(&top, &style, Path::new("assets"), &Notifier::silent());
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["width"], 800);
        assert_eq!(json["font"], "assets/fonts/Roboto-Regular.ttf");
        assert!(json["mask"].is_null());
        assert_eq!(json["words"][0]["text"], "Море");
        assert_eq!(json["words"][0]["weight"], 3);
        assert_eq!(json["words"][1]["color"], "#000000");
    }
}
