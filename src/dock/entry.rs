use std::cmp::Ordering;

use tracing::debug;

use crate::common::config::DockOrder;
use crate::dock::config::{DockCfg, DockPosition, EdgeAlignment, HDockAlignment, VDockAlignment};
use crate::dock::{Dock, DockSlot};
use crate::layout_engine::LayoutCommand;
use crate::layout_engine::utils::clip;
use crate::model::{Window, WindowId, WindowState};
use crate::sys::driver::SurfaceId;
use crate::sys::geometry::Rect;

/// Largest share of the screen two opposing docks may take together.
const MAX_SIZE: f64 = 50.0;
const MIN_SIZE: f64 = 5.0;
/// Gaps are capped at this share of the working area.
const MAX_GAP_RATIO: f64 = 0.05;

/// Dock slots of one surface.
#[derive(Debug, Clone)]
pub struct DockEntry {
    id: SurfaceId,
    /// Values for docks first seen on this surface.
    cfg: DockCfg,
    slots: Vec<DockSlot>,
}

/// The inner region left over while docks are placed.
struct Frame {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

impl DockEntry {
    pub fn new(id: SurfaceId, cfg: DockCfg, order: &DockOrder) -> Self {
        Self { id, cfg, slots: DockSlot::from_order(order) }
    }

    pub fn id(&self) -> &SurfaceId { &self.id }

    pub fn slots(&self) -> &[DockSlot] { &self.slots }

    pub fn remove(&mut self, window: WindowId) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.window == Some(window)) {
            slot.window = None;
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.window = None;
        }
    }

    /// Places every docked window and returns what is left for the layout.
    pub fn arrange(&mut self, docked: &mut [&mut Window], working_area: Rect, now: u64) -> Rect {
        self.arrange_slots(docked);
        self.assign_sizes(docked, working_area);

        let mut frame = Frame {
            left: working_area.x,
            top: working_area.y,
            width: working_area.width,
            height: working_area.height,
        };
        let order = if working_area.width > working_area.height {
            [DockPosition::Left, DockPosition::Right, DockPosition::Top, DockPosition::Bottom]
        } else {
            [DockPosition::Top, DockPosition::Bottom, DockPosition::Left, DockPosition::Right]
        };
        for position in order {
            let Some(idx) = self.occupant(position, docked) else { continue };
            let window = &mut *docked[idx];
            let Some(dock) = window.dock.as_mut() else { continue };
            let (init, whole) = place(&mut frame, position, &dock.cfg, working_area);
            window.geometry = align(init, position, &dock.cfg, whole);
            dock.rendered_time = Some(now);
            dock.rendered_surface = Some(self.id.clone());
        }

        Rect::new(frame.left, frame.top, frame.width, frame.height)
    }

    /// Moves a docked window to another free edge.
    pub fn handle_shortcut(&mut self, window: &mut Window, command: &LayoutCommand) -> bool {
        if !window.is_docked() {
            return false;
        }
        let Some(current) = self
            .slots
            .iter()
            .find(|slot| slot.window == Some(window.id))
            .map(|slot| slot.position)
        else {
            return false;
        };
        let desired = match command {
            LayoutCommand::SwapLeft => DockPosition::Left,
            LayoutCommand::SwapUp => DockPosition::Top,
            LayoutCommand::SwapRight => DockPosition::Right,
            LayoutCommand::SwapDown => DockPosition::Bottom,
            _ => return false,
        };
        if current == desired {
            return false;
        }
        let free = self.slots.iter().any(|slot| slot.position == desired && slot.window.is_none());
        match window.dock.as_mut() {
            Some(dock) if free => {
                dock.position = Some(desired);
                true
            }
            _ => false,
        }
    }

    /// Index of the window holding `position`, if it still wants to be there.
    fn occupant(&self, position: DockPosition, docked: &[&mut Window]) -> Option<usize> {
        let slot = self.slots.iter().find(|slot| slot.position == position)?;
        let id = slot.window?;
        docked.iter().position(|w| {
            w.id == id
                && w.state() == WindowState::Docked
                && w.dock.as_ref().is_some_and(|d| d.position == Some(position))
        })
    }

    /// Hands each slot to the best contender. Windows that win nothing go
    /// back to tiling.
    fn arrange_slots(&mut self, docked: &mut [&mut Window]) {
        let cfg = self.cfg;
        let mut pending: Vec<usize> = (0..docked.len()).collect();
        let mut contenders: Vec<usize> = Vec::new();

        for slot in &mut self.slots {
            if pending.is_empty() && contenders.is_empty() {
                slot.window = None;
                continue;
            }
            let position = slot.position;
            let mut waiting = Vec::new();
            for idx in pending.drain(..) {
                let dock = docked[idx].dock.get_or_insert_with(|| Dock::new(cfg));
                if dock.position.is_none() || dock.position == Some(position) {
                    contenders.push(idx);
                } else {
                    waiting.push(idx);
                }
            }
            pending = waiting;

            contenders.sort_by(|&a, &b| match (&docked[a].dock, &docked[b].dock) {
                (Some(a), Some(b)) => rank(a, b, position, &self.id),
                _ => Ordering::Equal,
            });
            let Some(winner) = contenders.pop() else {
                slot.window = None;
                continue;
            };
            slot.window = Some(docked[winner].id);
            if let Some(dock) = docked[winner].dock.as_mut() {
                dock.position = Some(position);
            }
        }

        for idx in contenders.into_iter().chain(pending) {
            debug!(window = %docked[idx].id, surface = %self.id, "no dock slot left");
            docked[idx].set_state(WindowState::Tiled);
        }
    }

    /// Keeps opposing docks from overlapping and gaps from eating the screen.
    fn assign_sizes(&self, docked: &mut [&mut Window], working_area: Rect) {
        let mut done = Vec::new();
        for slot in &self.slots {
            if done.contains(&slot.position) {
                continue;
            }
            let Some(idx) = self.occupant(slot.position, docked) else { continue };
            let Some(mut cfg) = docked[idx].dock.as_ref().map(|d| d.cfg) else { continue };
            let vertical = slot.position.is_vertical();
            let max_gap = if vertical {
                f64::from(working_area.width) * MAX_GAP_RATIO
            } else {
                f64::from(working_area.height) * MAX_GAP_RATIO
            };

            let opposite = self.occupant(slot.position.opposite(), docked);
            let mut opposite_cfg = opposite.and_then(|o| docked[o].dock.as_ref().map(|d| d.cfg));
            normalize(
                Extent::of(&mut cfg, vertical),
                opposite_cfg.as_mut().map(|c| Extent::of(c, vertical)),
                max_gap,
            );

            if let Some(dock) = docked[idx].dock.as_mut() {
                dock.cfg = cfg;
            }
            if let (Some(o), Some(c)) = (opposite, opposite_cfg) {
                if let Some(dock) = docked[o].dock.as_mut() {
                    dock.cfg = c;
                }
                done.push(slot.position.opposite());
            }
        }
    }
}

/// Winner sorts last.
fn rank(a: &Dock, b: &Dock, position: DockPosition, surface: &SurfaceId) -> Ordering {
    let prefers = |d: &Dock| d.position == Some(position);
    let here = |d: &Dock| d.rendered_surface.as_ref() == Some(surface);
    prefers(a)
        .cmp(&prefers(b))
        .then(a.priority.cmp(&b.priority))
        .then_with(|| match (a.rendered_time, b.rendered_time) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(ta), Some(tb)) => here(a).cmp(&here(b)).then(tb.cmp(&ta)),
        })
}

/// The size fields of one dock axis.
struct Extent<'a> {
    /// How far the dock reaches into the screen.
    thickness: &'a mut f64,
    /// How much of its edge it covers.
    length: &'a mut f64,
    gap: &'a mut f64,
    edge_gap: &'a mut f64,
}

impl<'a> Extent<'a> {
    fn of(cfg: &'a mut DockCfg, vertical: bool) -> Self {
        if vertical {
            Extent {
                thickness: &mut cfg.v_wide,
                length: &mut cfg.v_height,
                gap: &mut cfg.v_gap,
                edge_gap: &mut cfg.v_edge_gap,
            }
        } else {
            Extent {
                thickness: &mut cfg.h_height,
                length: &mut cfg.h_wide,
                gap: &mut cfg.h_gap,
                edge_gap: &mut cfg.h_edge_gap,
            }
        }
    }

    fn clamp_own(&mut self, max_gap: f64) {
        *self.thickness = self.thickness.max(MIN_SIZE);
        *self.length = clip(*self.length, MIN_SIZE, 100.0);
        *self.gap = self.gap.min(max_gap);
        *self.edge_gap = self.edge_gap.min(max_gap);
    }
}

fn normalize(mut own: Extent<'_>, opposite: Option<Extent<'_>>, max_gap: f64) {
    own.clamp_own(max_gap);
    let Some(mut opposite) = opposite else {
        *own.thickness = own.thickness.min(MAX_SIZE);
        return;
    };
    opposite.clamp_own(max_gap);

    let half = MAX_SIZE / 2.0;
    if *own.thickness + *opposite.thickness > MAX_SIZE {
        if *own.thickness > half && *opposite.thickness > half {
            *own.thickness = half;
            *opposite.thickness = half;
        } else if *own.thickness > half {
            *own.thickness = MAX_SIZE - *opposite.thickness;
        } else {
            *opposite.thickness = MAX_SIZE - *own.thickness;
        }
    }
}

fn percent(total: i32, share: f64) -> i32 { (f64::from(total) * share / 100.0).floor() as i32 }

/// Carves the band for `position` out of `frame`. Returns the band and the
/// length it may be aligned within.
fn place(frame: &mut Frame, position: DockPosition, cfg: &DockCfg, area: Rect) -> (Rect, i32) {
    match position {
        DockPosition::Left | DockPosition::Right => {
            let width = percent(area.width, cfg.v_wide);
            let height = percent(area.height, cfg.v_height).min(frame.height);
            let x = if position == DockPosition::Left {
                frame.left
            } else {
                area.x + area.width - width
            };
            if position == DockPosition::Left {
                frame.left += width;
            }
            frame.width -= width;
            (Rect::new(x, frame.top, width, height), frame.height)
        }
        DockPosition::Top | DockPosition::Bottom => {
            let width = percent(area.width, cfg.h_wide).min(frame.width);
            let height = percent(area.height, cfg.h_height);
            let y = if position == DockPosition::Top {
                frame.top
            } else {
                area.y + area.height - height
            };
            if position == DockPosition::Top {
                frame.top += height;
            }
            frame.height -= height;
            (Rect::new(frame.left, y, width, height), frame.width)
        }
    }
}

fn align(init: Rect, position: DockPosition, cfg: &DockCfg, whole: i32) -> Rect {
    let Rect { mut x, mut y, mut width, mut height } = init;
    if position.is_vertical() {
        (width, x) = align_edge(width, x, cfg.v_edge_gap as i32, position, cfg.v_edge_alignment);
        let gap = cfg.v_gap as i32;
        if 2 * gap < height {
            if whole - height < 2 * gap {
                y += gap;
                height -= 2 * gap;
            } else {
                y += match cfg.v_alignment {
                    VDockAlignment::Top => gap,
                    VDockAlignment::Center => (whole - height) / 2,
                    VDockAlignment::Bottom => whole - height - gap,
                };
            }
        }
    } else {
        (height, y) = align_edge(height, y, cfg.h_edge_gap as i32, position, cfg.h_edge_alignment);
        let gap = cfg.h_gap as i32;
        if 2 * gap < width {
            if whole - width < 2 * gap {
                x += gap;
                width -= 2 * gap;
            } else {
                x += match cfg.h_alignment {
                    HDockAlignment::Left => gap,
                    HDockAlignment::Center => (whole - width) / 2,
                    HDockAlignment::Right => whole - width - gap,
                };
            }
        }
    }
    Rect::new(x, y, width, height)
}

/// Applies the edge gap across the dock. Returns the new extent and border.
fn align_edge(
    extent: i32,
    border: i32,
    gap: i32,
    position: DockPosition,
    alignment: EdgeAlignment,
) -> (i32, i32) {
    if 2 * gap > extent {
        return (extent, border);
    }
    let far_edge = matches!(position, DockPosition::Right | DockPosition::Bottom);
    match alignment {
        EdgeAlignment::Outside if far_edge => (extent - gap, border + gap),
        EdgeAlignment::Outside => (extent - gap, border),
        EdgeAlignment::Middle => (extent - 2 * gap, border + gap),
        EdgeAlignment::Inside if far_edge => (extent - gap, border),
        EdgeAlignment::Inside => (extent - gap, border + gap),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::systems::test_support::*;

    const WIDE: Rect = Rect::new(0, 0, 1000, 500);

    fn entry(order: DockOrder) -> DockEntry {
        DockEntry::new(SurfaceId::new("out"), DockCfg::default(), &order)
    }

    fn all_slots() -> DockOrder { DockOrder::default() }

    fn left_only() -> DockOrder { DockOrder { left: 1, top: 0, right: 0, bottom: 0 } }

    fn dock_all(windows: &mut [Window], position: Option<DockPosition>) {
        for w in windows {
            w.set_state(WindowState::Docked);
            let mut dock = Dock::new(DockCfg::default());
            dock.position = position;
            w.dock = Some(dock);
        }
    }

    fn dock_of(w: &Window) -> &Dock { w.dock.as_ref().unwrap() }

    #[test]
    fn left_dock_narrows_working_area() {
        let mut entry = entry(all_slots());
        let mut ws = windows(1);
        dock_all(&mut ws, None);
        let rest = entry.arrange(&mut refs(&mut ws), WIDE, 7);
        assert_eq!(ws[0].geometry, Rect::new(0, 0, 150, 500));
        assert_eq!(rest, Rect::new(150, 0, 850, 500));
        assert_eq!(dock_of(&ws[0]).position, Some(DockPosition::Left));
        assert_eq!(dock_of(&ws[0]).rendered_time, Some(7));
        assert_eq!(entry.slots()[0].window, Some(id(1)));
    }

    #[test]
    fn contenders_spill_into_later_slots() {
        let mut entry = entry(all_slots());
        let mut ws = windows(3);
        dock_all(&mut ws, None);
        let rest = entry.arrange(&mut refs(&mut ws), WIDE, 1);
        let positions: Vec<_> = ws.iter().map(|w| dock_of(w).position).collect();
        assert!(positions.iter().all(Option::is_some));
        assert!(ws.iter().all(|w| w.state() == WindowState::Docked));
        // Left, then top, then right.
        assert_eq!(rest, Rect::new(150, 75, 700, 425));
    }

    #[test]
    fn higher_priority_wins_and_loser_tiles() {
        let mut entry = entry(left_only());
        let mut ws = windows(2);
        dock_all(&mut ws, Some(DockPosition::Left));
        ws[1].dock.as_mut().unwrap().priority = 5;
        entry.arrange(&mut refs(&mut ws), WIDE, 1);
        assert_eq!(ws[1].state(), WindowState::Docked);
        assert_eq!(ws[0].state(), WindowState::Tiled);
        assert_eq!(entry.slots()[0].window, Some(id(2)));
    }

    #[test]
    fn earlier_render_on_this_surface_wins_ties() {
        let mut entry = entry(left_only());
        let mut ws = windows(3);
        dock_all(&mut ws, Some(DockPosition::Left));
        let here = SurfaceId::new("out");
        for (w, (time, surface)) in ws.iter_mut().zip([
            (20, here.clone()),
            (10, here.clone()),
            (5, SurfaceId::new("elsewhere")),
        ]) {
            let dock = w.dock.as_mut().unwrap();
            dock.rendered_time = Some(time);
            dock.rendered_surface = Some(surface);
        }
        entry.arrange(&mut refs(&mut ws), WIDE, 30);
        assert_eq!(entry.slots()[0].window, Some(id(2)));
        assert_eq!(ws[0].state(), WindowState::Tiled);
        assert_eq!(ws[2].state(), WindowState::Tiled);
    }

    #[test]
    fn preferred_slot_beats_priority() {
        let a = Dock { position: Some(DockPosition::Top), priority: 9, ..Dock::new(DockCfg::default()) };
        let b = Dock { position: Some(DockPosition::Left), ..Dock::new(DockCfg::default()) };
        let fresh = Dock::new(DockCfg::default());
        let seen = Dock { rendered_time: Some(1), ..Dock::new(DockCfg::default()) };
        let srf = SurfaceId::new("out");
        assert_eq!(rank(&a, &b, DockPosition::Left, &srf), Ordering::Less);
        assert_eq!(rank(&fresh, &seen, DockPosition::Left, &srf), Ordering::Greater);
    }

    #[test]
    fn equal_contenders_go_to_the_earliest_render() {
        let dock = |time: u64, surface: &str| Dock {
            position: Some(DockPosition::Left),
            rendered_time: Some(time),
            rendered_surface: Some(SurfaceId::new(surface)),
            ..Dock::new(DockCfg::default())
        };
        let srf = SurfaceId::new("out");
        let ranked = |a: Dock, b: Dock| rank(&a, &b, DockPosition::Left, &srf);
        assert_eq!(ranked(dock(10, "out"), dock(20, "out")), Ordering::Greater);
        assert_eq!(ranked(dock(20, "out"), dock(10, "out")), Ordering::Less);
        assert_eq!(ranked(dock(10, "out"), dock(10, "out")), Ordering::Equal);
        // Having been shown here counts before being shown first.
        assert_eq!(ranked(dock(20, "out"), dock(10, "other")), Ordering::Greater);
    }

    #[test]
    fn opposing_top_and_bottom_share_half_the_screen() {
        for ((top, bottom), expected) in [
            ((40.0, 30.0), (25.0, 25.0)),
            ((3.0, 60.0), (MIN_SIZE, 45.0)),
            ((60.0, 10.0), (40.0, 10.0)),
            ((30.0, 10.0), (30.0, 10.0)),
        ] {
            let mut entry = entry(all_slots());
            let mut ws = windows(2);
            dock_all(&mut ws, None);
            ws[0].dock.as_mut().unwrap().position = Some(DockPosition::Top);
            ws[0].dock.as_mut().unwrap().cfg.h_height = top;
            ws[1].dock.as_mut().unwrap().position = Some(DockPosition::Bottom);
            ws[1].dock.as_mut().unwrap().cfg.h_height = bottom;
            let rest = entry.arrange(&mut refs(&mut ws), WIDE, 1);

            let got = (dock_of(&ws[0]).cfg.h_height, dock_of(&ws[1]).cfg.h_height);
            assert_eq!(got, expected, "{top}/{bottom}");
            assert!(ws[0].geometry.max_y() <= ws[1].geometry.y);
            assert_eq!(rest.y, ws[0].geometry.max_y());
        }
    }

    #[test]
    fn opposing_docks_never_overlap() {
        for (left, right) in [(40.0, 40.0), (45.0, 10.0), (10.0, 45.0), (1.0, 80.0), (20.0, 20.0)] {
            let mut entry = entry(all_slots());
            let mut ws = windows(2);
            dock_all(&mut ws, None);
            ws[0].dock.as_mut().unwrap().position = Some(DockPosition::Left);
            ws[0].dock.as_mut().unwrap().cfg.v_wide = left;
            ws[1].dock.as_mut().unwrap().position = Some(DockPosition::Right);
            ws[1].dock.as_mut().unwrap().cfg.v_wide = right;
            entry.arrange(&mut refs(&mut ws), WIDE, 1);

            let (l, r) = (dock_of(&ws[0]).cfg.v_wide, dock_of(&ws[1]).cfg.v_wide);
            assert!(l + r <= MAX_SIZE, "{left}/{right} -> {l}/{r}");
            assert!(l >= MIN_SIZE && r >= MIN_SIZE, "{left}/{right} -> {l}/{r}");
            assert!(ws[0].geometry.max_x() <= ws[1].geometry.x);
        }
    }

    #[test]
    fn lone_dock_is_capped_at_half_the_screen() {
        let mut entry = entry(all_slots());
        let mut ws = windows(1);
        dock_all(&mut ws, Some(DockPosition::Top));
        ws[0].dock.as_mut().unwrap().cfg.h_height = 70.0;
        ws[0].dock.as_mut().unwrap().cfg.h_wide = 0.5;
        entry.arrange(&mut refs(&mut ws), WIDE, 1);
        let cfg = dock_of(&ws[0]).cfg;
        assert_eq!((cfg.h_height, cfg.h_wide), (MAX_SIZE, MIN_SIZE));
    }

    #[test]
    fn tall_screens_place_top_and_bottom_first() {
        let mut entry = entry(all_slots());
        let mut ws = windows(2);
        dock_all(&mut ws, None);
        ws[0].dock.as_mut().unwrap().position = Some(DockPosition::Top);
        ws[1].dock.as_mut().unwrap().position = Some(DockPosition::Left);
        let area = Rect::new(0, 0, 500, 1000);
        let rest = entry.arrange(&mut refs(&mut ws), area, 1);
        assert_eq!(ws[0].geometry, Rect::new(0, 0, 500, 150));
        assert_eq!(ws[1].geometry, Rect::new(0, 150, 75, 850));
        assert_eq!(rest, Rect::new(75, 150, 425, 850));
    }

    #[test]
    fn alignment_and_edge_gap() {
        let mut entry = entry(all_slots());
        let mut ws = windows(1);
        dock_all(&mut ws, Some(DockPosition::Top));
        {
            let cfg = &mut ws[0].dock.as_mut().unwrap().cfg;
            cfg.h_wide = 50.0;
            cfg.h_gap = 10.0;
            cfg.h_alignment = HDockAlignment::Left;
            cfg.h_edge_gap = 5.0;
            cfg.h_edge_alignment = EdgeAlignment::Middle;
        }
        entry.arrange(&mut refs(&mut ws), WIDE, 1);
        assert_eq!(ws[0].geometry, Rect::new(10, 5, 500, 65));

        ws[0].dock.as_mut().unwrap().cfg.h_alignment = HDockAlignment::Right;
        ws[0].dock.as_mut().unwrap().cfg.h_edge_alignment = EdgeAlignment::Outside;
        entry.arrange(&mut refs(&mut ws), WIDE, 2);
        assert_eq!(ws[0].geometry, Rect::new(490, 0, 500, 70));
    }

    #[test]
    fn full_width_dock_bleeds_past_alignment() {
        assert_eq!(
            align(
                Rect::new(0, 0, 1000, 50),
                DockPosition::Bottom,
                &DockCfg { h_gap: 10.0, ..DockCfg::default() },
                1000,
            ),
            Rect::new(10, 0, 980, 50)
        );
    }

    #[test]
    fn swap_moves_to_free_edge_only() {
        let mut entry = entry(all_slots());
        let mut ws = windows(2);
        dock_all(&mut ws, None);
        entry.arrange(&mut refs(&mut ws), WIDE, 1);
        assert_eq!(dock_of(&ws[1]).position, Some(DockPosition::Left));
        assert_eq!(dock_of(&ws[0]).position, Some(DockPosition::Top));

        assert!(!entry.handle_shortcut(&mut ws[1], &LayoutCommand::SwapUp));
        assert!(!entry.handle_shortcut(&mut ws[1], &LayoutCommand::SwapLeft));
        assert!(entry.handle_shortcut(&mut ws[1], &LayoutCommand::SwapRight));
        entry.arrange(&mut refs(&mut ws), WIDE, 2);
        assert_eq!(ws[1].geometry, Rect::new(850, 0, 150, 500));
        assert_eq!(ws[0].geometry, Rect::new(0, 0, 850, 75));
    }

    #[test]
    fn remove_frees_the_slot() {
        let mut entry = entry(all_slots());
        let mut ws = windows(1);
        dock_all(&mut ws, None);
        entry.arrange(&mut refs(&mut ws), WIDE, 1);
        entry.remove(id(1));
        assert!(entry.slots().iter().all(|s| s.window.is_none()));
    }
}
