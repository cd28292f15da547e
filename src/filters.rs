//! Vision conditions and their visual-accessibility treatments
//!
//! Each condition maps to a CSS block injected into the page and a zoom
//! factor. Color-blindness conditions additionally get WCAG contrast
//! overrides; photophobia adds a full-page dimming overlay. Complete and
//! partial blindness have no visual treatment - they switch the user to
//! voice-first interaction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "Blurry Vision")]
    BlurryVision,
    #[serde(rename = "Reduced Vision")]
    ReducedVision,
    #[serde(rename = "Photophobia")]
    Photophobia,
    #[serde(rename = "Red-Green Color Blindness")]
    RedGreenColorBlindness,
    #[serde(rename = "Blue-Yellow Color Blindness")]
    BlueYellowColorBlindness,
    #[serde(rename = "Total Color Blindness")]
    TotalColorBlindness,
    #[serde(rename = "Complete Blindness")]
    CompleteBlindness,
    #[serde(rename = "Partial Blindness")]
    PartialBlindness,
}

/// High-contrast inverted rendering for blurry/reduced vision.
const CONTRAST_CSS: &str = "\
html {
  filter: invert(100%) contrast(200%) !important;
  background-color: white !important;
  transition: none !important;
}
img, video, [role=\"img\"], [data-image], [aria-label*=\"image\"] {
  filter: invert(100%) !important;
}
";

/// Dark inverted rendering plus a dimming overlay for photophobia.
const PHOTOPHOBIA_CSS: &str = "\
html {
  filter: invert(1) hue-rotate(180deg) contrast(90%) brightness(90%) !important;
  background: black !important;
  transition: none !important;
}
img, video, [role=\"img\"], [data-image], [aria-label*=\"image\"] {
  filter: invert(1) hue-rotate(180deg) !important;
}
#eye-comfort-overlay {
  position: fixed !important;
  top: 0 !important;
  left: 0 !important;
  width: 100% !important;
  height: 100% !important;
  background: rgba(0,0,0,0.3) !important;
  z-index: 2147483647 !important;
  pointer-events: none !important;
}
";

const PROTANOPIA_FILTER: &str = "url(\"data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg'><filter id='protanopia'><feColorMatrix type='matrix' values='0.567,0.433,0,0,0 0.558,0.442,0,0,0 0,0.242,0.758,0,0 0,0,0,1,0'/></filter></svg>#protanopia\")";
const TRITANOPIA_FILTER: &str = "hue-rotate(180deg) saturate(2.5)";
const ACHROMATOPSIA_FILTER: &str = "grayscale(100%)";

/// Contrast overrides applied alongside every color-blindness filter.
const WCAG_CONTRAST_CSS: &str = "\
body {
  background-color: white !important;
  color: black !important;
}
a {
  color: #0066cc !important;
  text-decoration: underline !important;
}
button, [role=\"button\"] {
  background-color: #f0f0f0 !important;
  color: #000 !important;
  border: 2px solid #000 !important;
}
";

impl Condition {
    pub const ALL: &'static [Condition] = &[
        Condition::BlurryVision,
        Condition::ReducedVision,
        Condition::Photophobia,
        Condition::RedGreenColorBlindness,
        Condition::BlueYellowColorBlindness,
        Condition::TotalColorBlindness,
        Condition::CompleteBlindness,
        Condition::PartialBlindness,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Condition::BlurryVision => "Blurry Vision",
            Condition::ReducedVision => "Reduced Vision",
            Condition::Photophobia => "Photophobia",
            Condition::RedGreenColorBlindness => "Red-Green Color Blindness",
            Condition::BlueYellowColorBlindness => "Blue-Yellow Color Blindness",
            Condition::TotalColorBlindness => "Total Color Blindness",
            Condition::CompleteBlindness => "Complete Blindness",
            Condition::PartialBlindness => "Partial Blindness",
        }
    }

    pub fn is_color_blindness(&self) -> bool {
        matches!(
            self,
            Condition::RedGreenColorBlindness
                | Condition::BlueYellowColorBlindness
                | Condition::TotalColorBlindness
        )
    }

    /// Conditions where the page is navigated by voice rather than sight.
    pub fn is_voice_first(&self) -> bool {
        matches!(self, Condition::CompleteBlindness | Condition::PartialBlindness)
    }

    /// CSS to inject for this condition, if any.
    pub fn css(&self) -> Option<String> {
        match self {
            Condition::BlurryVision | Condition::ReducedVision => Some(CONTRAST_CSS.to_string()),
            Condition::Photophobia => Some(PHOTOPHOBIA_CSS.to_string()),
            Condition::RedGreenColorBlindness => Some(color_filter_css(PROTANOPIA_FILTER)),
            Condition::BlueYellowColorBlindness => Some(color_filter_css(TRITANOPIA_FILTER)),
            Condition::TotalColorBlindness => Some(color_filter_css(ACHROMATOPSIA_FILTER)),
            Condition::CompleteBlindness | Condition::PartialBlindness => None,
        }
    }

    /// Page zoom factor for this condition.
    pub fn zoom(&self) -> f64 {
        match self {
            Condition::BlurryVision | Condition::ReducedVision => 1.4,
            Condition::Photophobia => 1.2,
            _ => 1.0,
        }
    }

    /// Whether this condition needs the fixed dimming overlay element.
    pub fn needs_overlay(&self) -> bool {
        matches!(self, Condition::Photophobia)
    }
}

fn color_filter_css(filter: &str) -> String {
    format!(
        "html {{\n  filter: contrast(1.5) {} !important;\n}}\n{}",
        filter, WCAG_CONTRAST_CSS
    )
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown vision condition: {:?}", s))
    }
}
