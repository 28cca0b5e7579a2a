use crate::layout_engine::LayoutCommand;
use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutRequest, LayoutSystem};
use crate::model::{Window, WindowState};
use crate::sys::geometry::Rect;

/// Every tile covers the whole area; only the focused one is seen.
#[derive(Debug, Clone, Default)]
pub struct MonocleLayoutSystem;

impl LayoutSystem for MonocleLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::Monocle }

    fn apply(&mut self, _ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, _gap: i32) {
        for tile in tiles.iter_mut() {
            tile.set_state(WindowState::Tiled);
            tile.geometry = area;
        }
    }

    fn handle_shortcut(&mut self, ctx: &mut LayoutContext, command: &LayoutCommand) -> bool {
        let step = match command {
            LayoutCommand::FocusUp | LayoutCommand::FocusLeft => -1,
            LayoutCommand::FocusDown | LayoutCommand::FocusRight => 1,
            _ => return false,
        };
        ctx.requests.push(LayoutRequest::CycleFocus(step));
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::systems::test_support::*;

    #[test]
    fn all_tiles_fill_the_area() {
        let area = Rect::new(10, 10, 500, 400);
        let mut ws = windows(3);
        let mut ctx = LayoutContext::default();
        MonocleLayoutSystem.apply(&mut ctx, &mut refs(&mut ws), area, 8);
        assert_eq!(geometries(&ws), vec![area; 3]);
    }

    #[test]
    fn directional_focus_cycles() {
        let mut ctx = LayoutContext::default();
        let mut layout = MonocleLayoutSystem;
        assert!(layout.handle_shortcut(&mut ctx, &LayoutCommand::FocusLeft));
        assert!(layout.handle_shortcut(&mut ctx, &LayoutCommand::FocusDown));
        assert!(!layout.handle_shortcut(&mut ctx, &LayoutCommand::Rotate));
        assert_eq!(
            ctx.requests,
            vec![LayoutRequest::CycleFocus(-1), LayoutRequest::CycleFocus(1)]
        );
    }
}
