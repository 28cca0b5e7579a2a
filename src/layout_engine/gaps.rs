//! Outer margins and the space between tiles, per surface.
//!
//! Override lines are `output:cfg` or `output:activity:desktop:cfg`, where
//! `cfg` is a comma separated list of `l|left`, `r|right`, `t|top`,
//! `b|bottom` and `e|between` assignments. The first line whose selector
//! matches a surface wins; other surfaces use the configured defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::collections::HashSet;
use crate::common::config::GapSettings;
use crate::common::parse::{
    KeyValue, OverrideError, OverrideErrors, OverrideLineError, SurfaceSelector, key_values,
    split_fields,
};
use crate::sys::driver::Surface;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gaps {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub between: i32,
}

impl Gaps {
    pub const fn none() -> Self { Self { left: 0, right: 0, top: 0, bottom: 0, between: 0 } }

    /// Reads the defaults. Negative values are reported and dropped to 0.
    pub fn from_settings(settings: &GapSettings) -> Self {
        Self {
            left: non_negative("left", settings.left),
            right: non_negative("right", settings.right),
            top: non_negative("top", settings.top),
            bottom: non_negative("bottom", settings.bottom),
            between: non_negative("between", settings.between),
        }
    }
}

fn non_negative(name: &str, value: i32) -> i32 {
    if value < 0 {
        warn!("gap {name} must be at least 0, got {value}; using 0");
        return 0;
    }
    value
}

#[derive(Debug, Clone, PartialEq)]
struct SurfaceGaps {
    selector: SurfaceSelector,
    gaps: Gaps,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapsStore {
    default: Gaps,
    surfaces: Vec<SurfaceGaps>,
}

impl GapsStore {
    pub fn new(settings: &GapSettings) -> Self {
        let default = Gaps::from_settings(settings);
        let mut surfaces = Vec::new();
        for line in &settings.overrides {
            match parse_line(line, &default) {
                Ok(Some(entry)) => surfaces.push(entry),
                Ok(None) => {}
                Err(err) => warn!("invalid gaps override: {err}"),
            }
        }
        Self { default, surfaces }
    }

    pub fn default_gaps(&self) -> Gaps { self.default }

    pub fn gaps_for(&self, surface: &Surface) -> Gaps {
        self.surfaces
            .iter()
            .find(|s| s.selector.matches(&surface.output, &surface.activity, &surface.desktop))
            .map_or(self.default, |s| s.gaps)
    }
}

fn parse_line(line: &str, base: &Gaps) -> Result<Option<SurfaceGaps>, OverrideLineError> {
    let fields = split_fields(line);
    let (selector, body) = match fields[..] {
        [output, body] => (SurfaceSelector::new(output, "", ""), body),
        [output, activity, desktop, body] => {
            (SurfaceSelector::new(output, activity, desktop), body)
        }
        _ => return Err(OverrideLineError::Fields { line: line.to_string(), expected: "2 or 4" }),
    };
    if body.is_empty() {
        return Ok(None);
    }
    let gaps = parse_body(body, base)
        .map_err(|errors| OverrideLineError::Override { line: line.to_string(), errors })?;
    Ok(Some(SurfaceGaps { selector, gaps }))
}

fn parse_body(body: &str, base: &Gaps) -> Result<Gaps, OverrideErrors> {
    let mut gaps = *base;
    let mut seen = HashSet::default();
    let mut errors = Vec::new();

    for item in key_values(body) {
        let result = item.and_then(|item| {
            let field = field_name(&item)?;
            if !seen.insert(field) {
                return Err(OverrideError::Duplicate(item.part.to_string()));
            }
            let value = item.number(None, None)? as i32;
            match field {
                "left" => gaps.left = value,
                "right" => gaps.right = value,
                "top" => gaps.top = value,
                "bottom" => gaps.bottom = value,
                _ => gaps.between = value,
            }
            Ok(())
        });
        if let Err(err) = result {
            errors.push(err);
        }
    }

    if errors.is_empty() { Ok(gaps) } else { Err(OverrideErrors(errors)) }
}

fn field_name(item: &KeyValue<'_>) -> Result<&'static str, OverrideError> {
    match item.key.as_str() {
        "l" | "left" => Ok("left"),
        "r" | "right" => Ok("right"),
        "t" | "top" => Ok("top"),
        "b" | "bottom" => Ok("bottom"),
        "e" | "between" => Ok("between"),
        _ => Err(OverrideError::UnknownKey(item.part.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::parse::ParseNumberError;
    use crate::sys::geometry::Rect;
    use crate::sys::headless::test_surface;

    fn settings(overrides: &[&str]) -> GapSettings {
        GapSettings {
            left: 4,
            right: 4,
            top: 2,
            bottom: 2,
            between: 6,
            overrides: overrides.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test_log::test]
    fn first_matching_line_wins() {
        let store = GapsStore::new(&settings(&[
            "HDMI-1:l=10,e=0",
            "HDMI-1:work:2:top=30",
            ":work::b=1",
        ]));
        let hdmi = test_surface("HDMI-1", Rect::new(0, 0, 100, 100));
        assert_eq!(
            store.gaps_for(&hdmi),
            Gaps { left: 10, right: 4, top: 2, bottom: 2, between: 0 }
        );

        let mut dp = test_surface("DP-1", Rect::new(0, 0, 100, 100));
        assert_eq!(store.gaps_for(&dp), store.default_gaps());
        dp.activity = "work".into();
        assert_eq!(store.gaps_for(&dp).bottom, 1);
    }

    #[test_log::test]
    fn broken_lines_are_skipped() {
        let store = GapsStore::new(&settings(&["a:b:c", "HDMI-1:x=1", "HDMI-1:"]));
        let hdmi = test_surface("HDMI-1", Rect::new(0, 0, 100, 100));
        assert_eq!(store.gaps_for(&hdmi), store.default_gaps());
    }

    #[test]
    fn body_errors_are_collected() {
        let err = parse_body("l=1,left=2,q=3,t=x", &Gaps::none()).unwrap_err();
        assert_eq!(
            err.0,
            vec![
                OverrideError::Duplicate("left=2".into()),
                OverrideError::UnknownKey("q=3".into()),
                OverrideError::Number { part: "t=x".into(), source: ParseNumberError::Invalid },
            ]
        );
    }

    #[test_log::test]
    fn negative_defaults_fall_back_to_zero() {
        let gaps = Gaps::from_settings(&GapSettings { left: -3, between: 5, ..Default::default() });
        assert_eq!(gaps, Gaps { left: 0, right: 0, top: 0, bottom: 0, between: 5 });
    }
}
