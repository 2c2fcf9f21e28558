use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{MonsetupError, ValidationError};

/// xrandr output name, e.g. `eDP-1` or `HDMI-1`.
pub type MonitorId = String;

/// Used whenever a resolution is neither configured nor detectable.
pub const FALLBACK_RESOLUTION: Resolution = Resolution::new(1920, 1080);

/// Desktops every session ends up with, in the order bspwm declares them.
pub const CANONICAL_DESKTOPS: [u8; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 0];

/// Number of live desktops moved onto the main monitor in dual mode.
pub const MAIN_DESKTOP_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 4K-class displays and dense laptop panels (2560x1600 and up).
    pub fn is_hidpi(&self) -> bool {
        self.width >= 3840 || self.height >= 2160 || (self.width >= 2560 && self.height >= 1600)
    }

    /// Scales both dimensions by `factor`, truncating toward zero. Neither
    /// dimension drops below 1.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |dimension: u32| ((f64::from(dimension) * factor) as u32).max(1);
        Self {
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = MonsetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            MonsetupError::Validation(ValidationError::InvalidResolution {
                value: s.to_string(),
            })
        };

        let (width, height) = s.trim().split_once('x').ok_or_else(invalid)?;
        let width: u32 = width.parse().map_err(|_| invalid())?;
        let height: u32 = height.parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Normal,
    Left,
    Right,
    Inverted,
}

impl Rotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::Normal => "normal",
            Rotation::Left => "left",
            Rotation::Right => "right",
            Rotation::Inverted => "inverted",
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of the secondary monitor relative to the main one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    #[default]
    Right,
    Above,
    Below,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Left => "left",
            Position::Right => "right",
            Position::Above => "above",
            Position::Below => "below",
        }
    }

    /// The xrandr placement flag. xrandr spells the vertical ones without `-of`.
    pub fn xrandr_flag(&self) -> &'static str {
        match self {
            Position::Left => "--left-of",
            Position::Right => "--right-of",
            Position::Above => "--above",
            Position::Below => "--below",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bspwm desktop name, restricted to a single digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DesktopToken(u8);

impl DesktopToken {
    pub fn new(digit: u8) -> Option<Self> {
        (digit <= 9).then_some(Self(digit))
    }

    pub fn digit(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for DesktopToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DesktopToken {
    type Err = MonsetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next().and_then(|c| c.to_digit(10)), chars.next()) {
            (Some(digit), None) => Ok(Self(digit as u8)),
            _ => Err(MonsetupError::Validation(ValidationError::InvalidDesktop {
                value: s.to_string(),
            })),
        }
    }
}

impl Serialize for DesktopToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DesktopToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Config files written for bspwm mix `workspaces = [1, 2]` and `["1", "2"]`.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => u8::try_from(n)
                .ok()
                .and_then(DesktopToken::new)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid desktop token: {}", n))),
            Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

fn tokens(digits: &[u8]) -> Vec<DesktopToken> {
    digits.iter().map(|&d| DesktopToken(d)).collect()
}

/// `1 2 3 4 5 6 7 8 9 0`
pub fn canonical_desktops() -> Vec<DesktopToken> {
    tokens(&CANONICAL_DESKTOPS)
}

/// `1 2 3 4 5`, owned by the main monitor.
pub fn main_desktops() -> Vec<DesktopToken> {
    tokens(&CANONICAL_DESKTOPS[..MAIN_DESKTOP_COUNT])
}

/// `6 7 8 9 0`, owned by the secondary monitor or a built-in panel.
pub fn secondary_desktops() -> Vec<DesktopToken> {
    tokens(&CANONICAL_DESKTOPS[MAIN_DESKTOP_COUNT..])
}

/// True when `a` and `b` are disjoint and together cover every canonical desktop.
pub fn partitions_canonical(a: &[DesktopToken], b: &[DesktopToken]) -> bool {
    let mut seen = [false; 10];
    for token in a.iter().chain(b) {
        let slot = &mut seen[token.digit() as usize];
        if *slot {
            return false;
        }
        *slot = true;
    }
    seen.iter().all(|&s| s)
}

/// True when no desktop name appears in both sets.
pub fn disjoint(a: &[DesktopToken], b: &[DesktopToken]) -> bool {
    !a.iter().any(|token| b.contains(token))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Main,
    Secondary,
    /// Nothing is known about the monitor; the planner decides.
    Unassigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileSource {
    Configured,
    AutoDetected,
    Fallback,
}

/// Settings resolved for one connected monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorProfile {
    pub resolution: Resolution,
    pub rotation: Rotation,
    pub role: Role,
    pub position: Option<Position>,
    pub desktops: Vec<DesktopToken>,
    pub source: ProfileSource,
}

impl MonitorProfile {
    /// Explicit main claim coming from the configuration file, as opposed to
    /// the role guessed for an auto-detected external display.
    pub fn claims_main(&self) -> bool {
        self.source == ProfileSource::Configured && self.role == Role::Main
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorMode {
    Single,
    Dual,
}

impl fmt::Display for MonitorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorMode::Single => f.write_str("single"),
            MonitorMode::Dual => f.write_str("dual"),
        }
    }
}
