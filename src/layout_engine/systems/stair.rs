use crate::common::config::LayoutSettings;
use crate::layout_engine::LayoutCommand;
use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutSystem};
use crate::model::{Window, WindowState};
use crate::sys::geometry::Rect;

const DEFAULT_SPACE: i32 = 24;
const MIN_SPACE: i32 = 16;
const MAX_SPACE: i32 = 160;
const SPACE_STEP: i32 = 8;

/// Overlapping windows, each one a step lower and further out than the
/// one before. The first window is at the top.
#[derive(Debug, Clone)]
pub struct StairLayoutSystem {
    space: i32,
    /// Windows share the left edge instead of the right one.
    reverse: bool,
}

impl StairLayoutSystem {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self { space: DEFAULT_SPACE, reverse: settings.stair_reverse }
    }

    pub fn space(&self) -> i32 { self.space }
}

impl LayoutSystem for StairLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::Stair }

    fn apply(&mut self, _ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, _gap: i32) {
        let n = tiles.len() as i32;
        // Many windows squeeze the stairs so every one keeps half the area.
        let space = self.space.min(area.width.min(area.height) / (2 * n.max(1)));
        for (i, tile) in tiles.iter_mut().enumerate() {
            let i = i as i32;
            let dx = space * (n - i - 1);
            let dy = space * i;
            let x = if self.reverse { area.x } else { area.x + dx };
            tile.set_state(WindowState::Tiled);
            tile.geometry = Rect::new(x, area.y + dy, area.width - dx, area.height - dy);
        }
    }

    fn handle_shortcut(&mut self, _ctx: &mut LayoutContext, command: &LayoutCommand) -> bool {
        match command {
            LayoutCommand::Decrease => self.space = (self.space - SPACE_STEP).max(MIN_SPACE),
            LayoutCommand::Increase => self.space = (self.space + SPACE_STEP).min(MAX_SPACE),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::systems::test_support::*;

    const AREA: Rect = Rect::new(0, 0, 1000, 800);

    fn run(layout: &mut StairLayoutSystem, n: u64) -> Vec<Rect> {
        let mut ws = windows(n);
        let mut ctx = LayoutContext::default();
        layout.apply(&mut ctx, &mut refs(&mut ws), AREA, 0);
        geometries(&ws)
    }

    #[test]
    fn windows_step_down_to_the_right() {
        let mut layout = StairLayoutSystem::new(&LayoutSettings::default());
        assert_eq!(
            run(&mut layout, 3),
            vec![
                Rect::new(48, 0, 952, 800),
                Rect::new(24, 24, 976, 776),
                Rect::new(0, 48, 1000, 752),
            ]
        );
    }

    #[test]
    fn reversed_stairs_stay_on_the_left() {
        let settings = LayoutSettings { stair_reverse: true, ..LayoutSettings::default() };
        let mut layout = StairLayoutSystem::new(&settings);
        assert_eq!(run(&mut layout, 2), vec![Rect::new(0, 0, 976, 800), Rect::new(0, 24, 1000, 776)]);
    }

    #[test]
    fn step_size_is_bounded() {
        let mut layout = StairLayoutSystem::new(&LayoutSettings::default());
        let mut ctx = LayoutContext::default();
        for _ in 0..3 {
            assert!(layout.handle_shortcut(&mut ctx, &LayoutCommand::Decrease));
        }
        assert_eq!(layout.space(), MIN_SPACE);
        for _ in 0..30 {
            layout.handle_shortcut(&mut ctx, &LayoutCommand::Increase);
        }
        assert_eq!(layout.space(), MAX_SPACE);
        assert!(!layout.handle_shortcut(&mut ctx, &LayoutCommand::Rotate));
    }
}
