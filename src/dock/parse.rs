//! Dock override lines.
//!
//! Surface lines are `output:activity:desktop:cfg`, window class lines are
//! `class:flags:cfg`. `cfg` is a comma separated list of `key=value` pairs:
//!
//! | key   | field              | value                          |
//! |-------|--------------------|--------------------------------|
//! | `hh`  | `h_height`         | 1..=50                         |
//! | `hw`  | `h_wide`           | 1..=100                        |
//! | `hgv` | `h_edge_gap`       | number                         |
//! | `hgh` | `h_gap`            | number                         |
//! | `ha`  | `h_alignment`      | `c`/`l`/`r`, names or `0..=2`  |
//! | `he`  | `h_edge_alignment` | `o`/`m`/`i`, names or `0..=2`  |
//! | `vh`  | `v_height`         | 1..=100                        |
//! | `vw`  | `v_wide`           | 1..=50                         |
//! | `vgh` | `v_edge_gap`       | number                         |
//! | `vgv` | `v_gap`            | number                         |
//! | `va`  | `v_alignment`      | `c`/`t`/`b`, names or `0..=2`  |
//! | `ve`  | `v_edge_alignment` | `o`/`m`/`i`, names or `0..=2`  |

use tracing::warn;

use crate::common::collections::HashSet;
use crate::common::parse::{
    KeyValue, OverrideError, OverrideErrors, OverrideLineError, SurfaceSelector, key_values,
    split_fields,
};
use crate::dock::Dock;
use crate::dock::config::{DockCfg, DockPosition, EdgeAlignment, HDockAlignment, VDockAlignment};

/// Priority given by the `pin` flag.
pub const PINNED_PRIORITY: u32 = 5;

/// Dock values for the surfaces a selector matches.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDockCfg {
    pub selector: SurfaceSelector,
    pub cfg: DockCfg,
}

/// Applies a `key=value,...` body on top of `base`, collecting every problem.
pub fn parse_cfg(body: &str, base: &DockCfg) -> Result<DockCfg, OverrideErrors> {
    let mut cfg = *base;
    let mut seen = HashSet::default();
    let mut errors = Vec::new();

    for item in key_values(body) {
        let item = match item {
            Ok(item) => item,
            Err(err) => {
                errors.push(err);
                continue;
            }
        };
        if !seen.insert(item.key.clone()) {
            errors.push(OverrideError::Duplicate(item.part.to_string()));
            continue;
        }
        if let Err(err) = apply_key(&mut cfg, &item) {
            errors.push(err);
        }
    }

    if errors.is_empty() { Ok(cfg) } else { Err(OverrideErrors(errors)) }
}

fn apply_key(cfg: &mut DockCfg, item: &KeyValue<'_>) -> Result<(), OverrideError> {
    match item.key.as_str() {
        "hh" => cfg.h_height = item.number(Some(1.0), Some(50.0))?,
        "hw" => cfg.h_wide = item.number(Some(1.0), Some(100.0))?,
        "hgv" => cfg.h_edge_gap = item.number(None, None)?,
        "hgh" => cfg.h_gap = item.number(None, None)?,
        "vh" => cfg.v_height = item.number(Some(1.0), Some(100.0))?,
        "vw" => cfg.v_wide = item.number(Some(1.0), Some(50.0))?,
        "vgh" => cfg.v_edge_gap = item.number(None, None)?,
        "vgv" => cfg.v_gap = item.number(None, None)?,
        "he" => cfg.h_edge_alignment = edge_alignment(item)?,
        "ve" => cfg.v_edge_alignment = edge_alignment(item)?,
        "ha" => {
            cfg.h_alignment = match item.value.as_str() {
                "center" | "c" | "0" => HDockAlignment::Center,
                "left" | "l" | "1" => HDockAlignment::Left,
                "right" | "r" | "2" => HDockAlignment::Right,
                _ => return Err(bad_value(item, "c, l or r, center, left, right or 0, 1, 2")),
            }
        }
        "va" => {
            cfg.v_alignment = match item.value.as_str() {
                "center" | "c" | "0" => VDockAlignment::Center,
                "top" | "t" | "1" => VDockAlignment::Top,
                "bottom" | "b" | "2" => VDockAlignment::Bottom,
                _ => return Err(bad_value(item, "c, t or b, center, top, bottom or 0, 1, 2")),
            }
        }
        _ => return Err(OverrideError::UnknownKey(item.part.to_string())),
    }
    Ok(())
}

fn edge_alignment(item: &KeyValue<'_>) -> Result<EdgeAlignment, OverrideError> {
    match item.value.as_str() {
        "outside" | "o" | "0" => Ok(EdgeAlignment::Outside),
        "middle" | "m" | "1" => Ok(EdgeAlignment::Middle),
        "inside" | "i" | "2" => Ok(EdgeAlignment::Inside),
        _ => Err(bad_value(item, "o, m or i, outside, middle, inside or 0, 1, 2")),
    }
}

fn bad_value(item: &KeyValue<'_>, expected: &'static str) -> OverrideError {
    OverrideError::Value { part: item.part.to_string(), expected }
}

/// Parses `output:activity:desktop:cfg`. An empty body yields `None`.
pub fn parse_surface_line(
    line: &str,
    base: &DockCfg,
) -> Result<Option<SurfaceDockCfg>, OverrideLineError> {
    let fields = split_fields(line);
    let [output, activity, desktop, body] = fields[..] else {
        return Err(OverrideLineError::Fields { line: line.to_string(), expected: "4" });
    };
    if body.is_empty() {
        return Ok(None);
    }
    let cfg = parse_cfg(body, base)
        .map_err(|errors| OverrideLineError::Override { line: line.to_string(), errors })?;
    Ok(Some(SurfaceDockCfg {
        selector: SurfaceSelector::new(output, activity, desktop),
        cfg,
    }))
}

/// Parses `class:flags:cfg` into the class name and its dock template.
/// Unknown flags are reported and ignored.
pub fn parse_class_line(line: &str, base: &DockCfg) -> Result<(String, Dock), OverrideLineError> {
    let fields = split_fields(line);
    let [class, flags, body] = fields[..] else {
        return Err(OverrideLineError::Fields { line: line.to_string(), expected: "3" });
    };
    let cfg = if body.is_empty() {
        *base
    } else {
        parse_cfg(body, base)
            .map_err(|errors| OverrideLineError::Override { line: line.to_string(), errors })?
    };

    let mut dock = Dock::new(cfg);
    for flag in flags.split(',').map(|f| f.trim().to_lowercase()).filter(|f| !f.is_empty()) {
        match flag.as_str() {
            "pin" | "p" => dock.priority = PINNED_PRIORITY,
            "left" | "l" => dock.position = Some(DockPosition::Left),
            "right" | "r" => dock.position = Some(DockPosition::Right),
            "top" | "t" => dock.position = Some(DockPosition::Top),
            "bottom" | "b" => dock.position = Some(DockPosition::Bottom),
            _ => warn!("dock class {class:?}: unknown flag {flag:?}"),
        }
    }
    Ok((class.to_string(), dock))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::parse::ParseNumberError;

    #[test]
    fn body_overrides_selected_fields() {
        let base = DockCfg::default();
        let cfg = parse_cfg("hh=20, HA=left, ve=i, vgv=4", &base).unwrap();
        assert_eq!(cfg.h_height, 20.0);
        assert_eq!(cfg.h_alignment, HDockAlignment::Left);
        assert_eq!(cfg.v_edge_alignment, EdgeAlignment::Inside);
        assert_eq!(cfg.v_gap, 4.0);
        assert_eq!(cfg.h_wide, base.h_wide);
    }

    #[test]
    fn every_error_in_a_body_is_reported() {
        let err = parse_cfg("hh=60,hh=2,xx=1,va=up,hgv=abc", &DockCfg::default()).unwrap_err();
        assert_eq!(
            err.0,
            vec![
                OverrideError::Number {
                    part: "hh=60".into(),
                    source: ParseNumberError::TooLarge(50.0),
                },
                OverrideError::Duplicate("hh=2".into()),
                OverrideError::UnknownKey("xx=1".into()),
                OverrideError::Value {
                    part: "va=up".into(),
                    expected: "c, t or b, center, top, bottom or 0, 1, 2",
                },
                OverrideError::Number {
                    part: "hgv=abc".into(),
                    source: ParseNumberError::Invalid,
                },
            ]
        );
    }

    #[test]
    fn surface_lines_need_four_fields() {
        let base = DockCfg::default();
        let parsed = parse_surface_line("HDMI-1:::vw=30", &base).unwrap().unwrap();
        assert_eq!(parsed.selector, SurfaceSelector::new("HDMI-1", "", ""));
        assert_eq!(parsed.cfg.v_wide, 30.0);
        assert_eq!(parse_surface_line("HDMI-1:::", &base), Ok(None));
        assert_eq!(
            parse_surface_line("HDMI-1:vw=30", &base),
            Err(OverrideLineError::Fields { line: "HDMI-1:vw=30".into(), expected: "4" })
        );
    }

    #[test_log::test]
    fn class_flags_set_priority_and_position() {
        let base = DockCfg::default();
        let (class, dock) = parse_class_line("konsole:p,b,zz:hh=30", &base).unwrap();
        assert_eq!(class, "konsole");
        assert_eq!(dock.priority, PINNED_PRIORITY);
        assert_eq!(dock.position, Some(DockPosition::Bottom));
        assert_eq!(dock.cfg.h_height, 30.0);

        let (_, plain) = parse_class_line("yakuake::", &base).unwrap();
        assert_eq!(plain.priority, 0);
        assert_eq!(plain.position, None);
        assert!(parse_class_line("a:b", &base).is_err());
        assert!(matches!(
            parse_class_line("a::hh=0", &base),
            Err(OverrideLineError::Override { .. })
        ));
    }
}
