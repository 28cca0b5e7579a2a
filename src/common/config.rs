use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dock::config::{EdgeAlignment, HDockAlignment, VDockAlignment};
use crate::layout_engine::WindRose;
use crate::layout_engine::systems::LayoutKind;

const MAX_LAYOUT_ORDER: u8 = 12;

pub fn config_file() -> Option<PathBuf> { dirs::home_dir().map(|home| home.join(".tessella.toml")) }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub gaps: GapSettings,
    #[serde(default)]
    pub dock: DockSettings,
    #[serde(default)]
    pub behavior: BehaviorSettings,
    #[serde(default)]
    pub rules: RuleSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Position of each layout in the cycle. 0 leaves a layout out.
    #[serde(default)]
    pub order: LayoutOrder,
    /// `output[:activity][:desktop]:layout` lines picking the first layout
    /// of matching surfaces.
    #[serde(default)]
    pub screen_default_layout: Vec<String>,
    #[serde(default)]
    pub tile_initial_angle: WindRose,
    #[serde(default)]
    pub columns_initial_angle: WindRose,
    #[serde(default)]
    pub columns_balanced: bool,
    /// Stair windows share the left edge instead of the right one.
    #[serde(default)]
    pub stair_reverse: bool,
    /// Reset quarter splits when a window leaves.
    #[serde(default = "yes")]
    pub quarter_layout_reset: bool,
    #[serde(default = "yes")]
    pub monocle_maximize: bool,
    #[serde(default = "full_percent")]
    pub sole_window_width: f64,
    #[serde(default = "full_percent")]
    pub sole_window_height: f64,
    #[serde(default)]
    pub sole_window_no_gaps: bool,
    /// Maximum tile width as a multiple of the working area height. 0 disables.
    #[serde(default)]
    pub limit_tile_width_ratio: f64,
    /// Float tiles whose minimum size does not fit their slot.
    #[serde(default)]
    pub unfit_greater: bool,
    /// Float tiles whose maximum size is below their slot.
    #[serde(default)]
    pub unfit_less: bool,
    #[serde(default = "yes")]
    pub layout_per_activity: bool,
    #[serde(default = "yes")]
    pub layout_per_desktop: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LayoutOrder {
    #[serde(default = "order_tile")]
    pub tile: u8,
    #[serde(default = "order_monocle")]
    pub monocle: u8,
    #[serde(default = "order_three_column")]
    pub three_column: u8,
    #[serde(default = "order_spiral")]
    pub spiral: u8,
    #[serde(default = "order_quarter")]
    pub quarter: u8,
    #[serde(default = "order_stacked")]
    pub stacked: u8,
    #[serde(default = "order_columns")]
    pub columns: u8,
    #[serde(default = "order_spread")]
    pub spread: u8,
    #[serde(default = "order_floating")]
    pub floating: u8,
    #[serde(default = "order_stair")]
    pub stair: u8,
    #[serde(default = "order_btree")]
    pub btree: u8,
    #[serde(default = "order_cascade")]
    pub cascade: u8,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    #[serde(default)]
    pub left: i32,
    #[serde(default)]
    pub right: i32,
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub bottom: i32,
    /// Space between neighbouring tiles.
    #[serde(default)]
    pub between: i32,
    /// `output:cfg` or `output:activity:desktop:cfg` lines.
    #[serde(default)]
    pub overrides: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct DockSettings {
    #[serde(default)]
    pub order: DockOrder,
    #[serde(default = "default_dock_h_height")]
    pub h_height: f64,
    #[serde(default = "full_percent")]
    pub h_wide: f64,
    #[serde(default)]
    pub h_gap: f64,
    #[serde(default)]
    pub h_edge_gap: f64,
    #[serde(default)]
    pub h_alignment: HDockAlignment,
    #[serde(default)]
    pub h_edge_alignment: EdgeAlignment,
    #[serde(default = "full_percent")]
    pub v_height: f64,
    #[serde(default = "default_dock_v_wide")]
    pub v_wide: f64,
    #[serde(default)]
    pub v_gap: f64,
    #[serde(default)]
    pub v_edge_gap: f64,
    #[serde(default)]
    pub v_alignment: VDockAlignment,
    #[serde(default)]
    pub v_edge_alignment: EdgeAlignment,
    /// `output:activity:desktop:cfg` lines.
    #[serde(default)]
    pub surfaces: Vec<String>,
    /// `class:flags:cfg` lines.
    #[serde(default)]
    pub window_classes: Vec<String>,
}

/// Processing order of the dock slots. 0 disables a slot.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct DockOrder {
    #[serde(default = "dock_order_left")]
    pub left: u8,
    #[serde(default = "dock_order_top")]
    pub top: u8,
    #[serde(default = "dock_order_right")]
    pub right: u8,
    #[serde(default = "dock_order_bottom")]
    pub bottom: u8,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct BehaviorSettings {
    /// Feed interactive resizes back into the layout.
    #[serde(default = "yes")]
    pub adjust_layout: bool,
    /// Adjust on every resize step rather than once at the end.
    #[serde(default = "yes")]
    pub adjust_layout_live: bool,
    #[serde(default = "yes")]
    pub keep_tiling_on_drag: bool,
    #[serde(default)]
    pub new_window_position: NewWindowPosition,
    #[serde(default)]
    pub directional_key_mode: DirectionalKeyMode,
    #[serde(default)]
    pub float_default: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct RuleSettings {
    #[serde(default)]
    pub floating_class: Vec<String>,
    #[serde(default)]
    pub floating_title: Vec<String>,
    #[serde(default)]
    pub ignore_class: Vec<String>,
    #[serde(default)]
    pub ignore_title: Vec<String>,
    /// With `tile_nothing`, only these classes are tiled.
    #[serde(default)]
    pub tiling_class: Vec<String>,
    #[serde(default)]
    pub tile_nothing: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case", try_from = "NumberOrName")]
pub enum NewWindowPosition {
    #[default]
    Append,
    Prepend,
    BesideFirst,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrName {
    Number(u8),
    Name(String),
}

impl TryFrom<NumberOrName> for NewWindowPosition {
    type Error = String;

    fn try_from(value: NumberOrName) -> Result<Self, Self::Error> {
        match value {
            NumberOrName::Number(0) => Ok(Self::Append),
            NumberOrName::Number(1) => Ok(Self::Prepend),
            NumberOrName::Number(2) => Ok(Self::BesideFirst),
            NumberOrName::Name(name) if name == "append" => Ok(Self::Append),
            NumberOrName::Name(name) if name == "prepend" => Ok(Self::Prepend),
            NumberOrName::Name(name) if name == "beside_first" => Ok(Self::BesideFirst),
            NumberOrName::Number(n) => Err(format!("unknown new_window_position {n}")),
            NumberOrName::Name(name) => Err(format!("unknown new_window_position {name:?}")),
        }
    }
}

/// What the directional shortcuts do.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum DirectionalKeyMode {
    /// Move focus between neighbouring tiles.
    #[default]
    Focus,
    /// Up/down walk the window order, left/right move the master split.
    Dwm,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            order: LayoutOrder::default(),
            screen_default_layout: Vec::new(),
            tile_initial_angle: WindRose::North,
            columns_initial_angle: WindRose::North,
            columns_balanced: false,
            stair_reverse: false,
            quarter_layout_reset: true,
            monocle_maximize: true,
            sole_window_width: full_percent(),
            sole_window_height: full_percent(),
            sole_window_no_gaps: false,
            limit_tile_width_ratio: 0.0,
            unfit_greater: false,
            unfit_less: false,
            layout_per_activity: true,
            layout_per_desktop: true,
        }
    }
}

impl Default for LayoutOrder {
    fn default() -> Self {
        Self {
            tile: order_tile(),
            monocle: order_monocle(),
            three_column: order_three_column(),
            spiral: order_spiral(),
            quarter: order_quarter(),
            stacked: order_stacked(),
            columns: order_columns(),
            spread: order_spread(),
            floating: order_floating(),
            stair: order_stair(),
            btree: order_btree(),
            cascade: order_cascade(),
        }
    }
}

impl Default for DockSettings {
    fn default() -> Self {
        Self {
            order: DockOrder::default(),
            h_height: default_dock_h_height(),
            h_wide: full_percent(),
            h_gap: 0.0,
            h_edge_gap: 0.0,
            h_alignment: HDockAlignment::default(),
            h_edge_alignment: EdgeAlignment::default(),
            v_height: full_percent(),
            v_wide: default_dock_v_wide(),
            v_gap: 0.0,
            v_edge_gap: 0.0,
            v_alignment: VDockAlignment::default(),
            v_edge_alignment: EdgeAlignment::default(),
            surfaces: Vec::new(),
            window_classes: Vec::new(),
        }
    }
}

impl Default for DockOrder {
    fn default() -> Self {
        Self {
            left: dock_order_left(),
            top: dock_order_top(),
            right: dock_order_right(),
            bottom: dock_order_bottom(),
        }
    }
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            adjust_layout: true,
            adjust_layout_live: true,
            keep_tiling_on_drag: true,
            new_window_position: NewWindowPosition::default(),
            directional_key_mode: DirectionalKeyMode::default(),
            float_default: false,
        }
    }
}

impl LayoutOrder {
    fn entries(&self) -> [(LayoutKind, u8); 12] {
        [
            (LayoutKind::Tile, self.tile),
            (LayoutKind::Monocle, self.monocle),
            (LayoutKind::ThreeColumn, self.three_column),
            (LayoutKind::Spiral, self.spiral),
            (LayoutKind::Quarter, self.quarter),
            (LayoutKind::Stacked, self.stacked),
            (LayoutKind::Columns, self.columns),
            (LayoutKind::Spread, self.spread),
            (LayoutKind::Floating, self.floating),
            (LayoutKind::Stair, self.stair),
            (LayoutKind::BTree, self.btree),
            (LayoutKind::Cascade, self.cascade),
        ]
    }

    /// Enabled layouts sorted by their order number. Falls back to the tile
    /// layout when everything is disabled.
    pub fn enabled(&self) -> Vec<LayoutKind> {
        let mut entries: Vec<_> = self
            .entries()
            .into_iter()
            .filter(|&(_, order)| order > 0 && order <= MAX_LAYOUT_ORDER)
            .collect();
        entries.sort_by_key(|&(_, order)| order);
        if entries.is_empty() {
            return vec![LayoutKind::Tile];
        }
        entries.into_iter().map(|(kind, _)| kind).collect()
    }

    pub fn validate(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|&(_, order)| order > MAX_LAYOUT_ORDER)
            .map(|(kind, order)| {
                format!("layout order for {kind} must be at most {MAX_LAYOUT_ORDER}, got {order}")
            })
            .collect()
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let defaults = LayoutOrder::default();
        let mut fixes = 0;
        for (value, default) in [
            (&mut self.tile, defaults.tile),
            (&mut self.monocle, defaults.monocle),
            (&mut self.three_column, defaults.three_column),
            (&mut self.spiral, defaults.spiral),
            (&mut self.quarter, defaults.quarter),
            (&mut self.stacked, defaults.stacked),
            (&mut self.columns, defaults.columns),
            (&mut self.spread, defaults.spread),
            (&mut self.floating, defaults.floating),
            (&mut self.stair, defaults.stair),
            (&mut self.btree, defaults.btree),
            (&mut self.cascade, defaults.cascade),
        ] {
            if *value > MAX_LAYOUT_ORDER {
                *value = default;
                fixes += 1;
            }
        }
        fixes
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.order.validate();

        for (name, value) in [
            ("sole_window_width", self.sole_window_width),
            ("sole_window_height", self.sole_window_height),
        ] {
            if !(0.0..=100.0).contains(&value) {
                issues.push(format!("{name} must be between 0 and 100, got {value}"));
            }
        }
        if self.limit_tile_width_ratio < 0.0 {
            issues.push(format!(
                "limit_tile_width_ratio must be non-negative, got {}",
                self.limit_tile_width_ratio
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = self.order.auto_fix_values();

        if !(0.0..=100.0).contains(&self.sole_window_width) {
            self.sole_window_width = full_percent();
            fixes += 1;
        }
        if !(0.0..=100.0).contains(&self.sole_window_height) {
            self.sole_window_height = full_percent();
            fixes += 1;
        }
        if self.limit_tile_width_ratio < 0.0 {
            self.limit_tile_width_ratio = 0.0;
            fixes += 1;
        }

        fixes
    }
}

impl GapSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (name, value) in self.values() {
            if value < 0 {
                issues.push(format!("gaps.{name} must be non-negative, got {value}"));
            }
        }
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;
        for value in [
            &mut self.left,
            &mut self.right,
            &mut self.top,
            &mut self.bottom,
            &mut self.between,
        ] {
            if *value < 0 {
                *value = 0;
                fixes += 1;
            }
        }
        fixes
    }

    fn values(&self) -> [(&'static str, i32); 5] {
        [
            ("left", self.left),
            ("right", self.right),
            ("top", self.top),
            ("bottom", self.bottom),
            ("between", self.between),
        ]
    }
}

impl DockSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (name, value, max) in self.extents() {
            if !(1.0..=max).contains(&value) {
                issues.push(format!("dock.{name} must be between 1 and {max}, got {value}"));
            }
        }
        for (name, value) in [
            ("h_gap", self.h_gap),
            ("h_edge_gap", self.h_edge_gap),
            ("v_gap", self.v_gap),
            ("v_edge_gap", self.v_edge_gap),
        ] {
            if value < 0.0 {
                issues.push(format!("dock.{name} must be non-negative, got {value}"));
            }
        }
        issues
    }

    /// Out of range extents fall back to the values a fresh dock would use.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;
        for (value, max, fallback) in [
            (&mut self.h_height, 50.0, 25.0),
            (&mut self.h_wide, 100.0, 100.0),
            (&mut self.v_height, 100.0, 100.0),
            (&mut self.v_wide, 50.0, 25.0),
        ] {
            if !(1.0..=max).contains(value) {
                *value = fallback;
                fixes += 1;
            }
        }
        for value in [
            &mut self.h_gap,
            &mut self.h_edge_gap,
            &mut self.v_gap,
            &mut self.v_edge_gap,
        ] {
            if *value < 0.0 {
                *value = 0.0;
                fixes += 1;
            }
        }
        fixes
    }

    fn extents(&self) -> [(&'static str, f64, f64); 4] {
        [
            ("h_height", self.h_height, 50.0),
            ("h_wide", self.h_wide, 100.0),
            ("v_height", self.v_height, 100.0),
            ("v_wide", self.v_wide, 50.0),
        ]
    }
}

fn yes() -> bool { true }
fn full_percent() -> f64 { 100.0 }
fn default_dock_h_height() -> f64 { 15.0 }
fn default_dock_v_wide() -> f64 { 15.0 }
fn order_tile() -> u8 { 1 }
fn order_monocle() -> u8 { 2 }
fn dock_order_left() -> u8 { 1 }
fn dock_order_top() -> u8 { 2 }
fn dock_order_right() -> u8 { 3 }
fn dock_order_bottom() -> u8 { 4 }
fn order_three_column() -> u8 { 3 }
fn order_spiral() -> u8 { 4 }
fn order_quarter() -> u8 { 5 }
fn order_stacked() -> u8 { 6 }
fn order_columns() -> u8 { 7 }
fn order_spread() -> u8 { 8 }
fn order_floating() -> u8 { 9 }
fn order_stair() -> u8 { 10 }
fn order_btree() -> u8 { 11 }
fn order_cascade() -> u8 { 12 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// Commented settings file shipped with the binary.
    pub fn default_file() -> &'static str { include_str!("../../tessella.default.toml") }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.layout.validate());
        issues.extend(self.gaps.validate());
        issues.extend(self.dock.validate());
        issues
    }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        self.layout.auto_fix_values() + self.gaps.auto_fix_values() + self.dock.auto_fix_values()
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(Config::default_file()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::parse("[layout]\nanimate = true\n").is_err());
    }

    #[test]
    fn enabled_layouts_follow_order() {
        let mut order = LayoutOrder::default();
        assert_eq!(
            order.enabled(),
            vec![
                LayoutKind::Tile,
                LayoutKind::Monocle,
                LayoutKind::ThreeColumn,
                LayoutKind::Spiral,
                LayoutKind::Quarter,
                LayoutKind::Stacked,
                LayoutKind::Columns,
                LayoutKind::Spread,
                LayoutKind::Floating,
                LayoutKind::Stair,
                LayoutKind::BTree,
                LayoutKind::Cascade,
            ]
        );

        order.btree = 0;
        order.columns = 1;
        order.tile = 3;
        order.three_column = 0;
        order.spiral = 0;
        assert_eq!(order.enabled()[..3], [LayoutKind::Columns, LayoutKind::Monocle, LayoutKind::Tile]);

        let none = LayoutOrder {
            tile: 0,
            monocle: 0,
            three_column: 0,
            spiral: 0,
            quarter: 0,
            stacked: 0,
            columns: 0,
            spread: 0,
            floating: 0,
            stair: 0,
            btree: 0,
            cascade: 0,
        };
        assert_eq!(none.enabled(), vec![LayoutKind::Tile]);
    }

    #[test]
    fn new_window_position_accepts_numbers() {
        let config = Config::parse("[behavior]\nnew_window_position = 2\n").unwrap();
        assert_eq!(config.behavior.new_window_position, NewWindowPosition::BesideFirst);
        let config = Config::parse("[behavior]\nnew_window_position = \"prepend\"\n").unwrap();
        assert_eq!(config.behavior.new_window_position, NewWindowPosition::Prepend);
        assert!(Config::parse("[behavior]\nnew_window_position = 7\n").is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_empty());

        config.dock.h_height = 70.0;
        config.gaps.between = -4;
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("gaps.between must be non-negative"));
        assert!(issues[1].contains("dock.h_height must be between 1 and 50"));

        assert_eq!(config.auto_fix_values(), 2);
        assert_eq!(config.dock.h_height, 25.0);
        assert_eq!(config.gaps.between, 0);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tessella.toml");
        let mut config = Config::default();
        config.layout.columns_initial_angle = WindRose::East;
        config.gaps.overrides.push("HDMI-1:l=10".into());
        config.save(&path).unwrap();
        assert_eq!(Config::read(&path).unwrap(), config);
    }
}
