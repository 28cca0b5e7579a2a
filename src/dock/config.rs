use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::config::DockSettings;
use crate::common::parse::validate_number;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DockPosition {
    Left,
    Right,
    Top,
    Bottom,
}

impl DockPosition {
    pub fn opposite(self) -> Self {
        match self {
            DockPosition::Left => DockPosition::Right,
            DockPosition::Right => DockPosition::Left,
            DockPosition::Top => DockPosition::Bottom,
            DockPosition::Bottom => DockPosition::Top,
        }
    }

    /// Left and right docks span the height of the screen.
    pub fn is_vertical(self) -> bool { matches!(self, DockPosition::Left | DockPosition::Right) }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive
)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
pub enum HDockAlignment {
    #[default]
    Center = 0,
    Left = 1,
    Right = 2,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive
)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
pub enum VDockAlignment {
    #[default]
    Center = 0,
    Top = 1,
    Bottom = 2,
}

/// Where the edge gap goes relative to the screen edge.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive
)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
pub enum EdgeAlignment {
    #[default]
    Outside = 0,
    Middle = 1,
    Inside = 2,
}

/// Sizing and alignment of a dock. Heights and widths are percentages of the
/// working area, gaps are pixels.
///
/// `h_*` applies to top and bottom docks, `v_*` to left and right docks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DockCfg {
    pub h_height: f64,
    pub h_wide: f64,
    pub h_edge_gap: f64,
    pub h_gap: f64,
    pub h_alignment: HDockAlignment,
    pub h_edge_alignment: EdgeAlignment,
    pub v_height: f64,
    pub v_wide: f64,
    pub v_edge_gap: f64,
    pub v_gap: f64,
    pub v_alignment: VDockAlignment,
    pub v_edge_alignment: EdgeAlignment,
}

impl Default for DockCfg {
    fn default() -> Self { Self::from_settings(&DockSettings::default()) }
}

impl DockCfg {
    /// Global dock values. Anything out of range falls back with a warning.
    pub fn from_settings(settings: &DockSettings) -> Self {
        Self {
            h_height: checked("h_height", settings.h_height, 1.0, 50.0, 25.0),
            h_wide: checked("h_wide", settings.h_wide, 1.0, 100.0, 100.0),
            h_edge_gap: checked("h_edge_gap", settings.h_edge_gap, 0.0, f64::MAX, 0.0),
            h_gap: checked("h_gap", settings.h_gap, 0.0, f64::MAX, 0.0),
            h_alignment: settings.h_alignment,
            h_edge_alignment: settings.h_edge_alignment,
            v_height: checked("v_height", settings.v_height, 1.0, 100.0, 100.0),
            v_wide: checked("v_wide", settings.v_wide, 1.0, 50.0, 25.0),
            v_edge_gap: checked("v_edge_gap", settings.v_edge_gap, 0.0, f64::MAX, 0.0),
            v_gap: checked("v_gap", settings.v_gap, 0.0, f64::MAX, 0.0),
            v_alignment: settings.v_alignment,
            v_edge_alignment: settings.v_edge_alignment,
        }
    }
}

fn checked(name: &str, value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    match validate_number(value, Some(min), Some(max)) {
        Ok(value) => value,
        Err(err) => {
            warn!("dock.{name}: {err}, using {fallback}");
            fallback
        }
    }
}
