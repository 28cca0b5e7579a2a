//! Scripted sessions against the headless host.
//!
//! A [`Scenario`] describes screens, the windows present at start and a list
//! of [`Step`]s performed by the "user". Replaying it drives the reactor the
//! same way a real host would and reports where every window ended up.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::actor::reactor::{Event, Reactor, ReactorError};
use crate::common::collections::BTreeMap;
use crate::common::config::Config;
use crate::layout_engine::LayoutCommand;
use crate::model::{WindowId, WindowState};
use crate::sys::driver::{DriverContext, DriverWindow, ScheduledTask};
use crate::sys::geometry::{Point, Rect};
use crate::sys::headless::{HeadlessContext, HeadlessWindow, WindowRules, WindowSpec, surface};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSpec {
    pub output: String,
    pub working_area: Rect,
    #[serde(default)]
    pub ignore: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub screens: Vec<ScreenSpec>,
    #[serde(default)]
    pub activity: String,
    #[serde(default = "first_desktop")]
    pub desktop: String,
    #[serde(default)]
    pub windows: Vec<WindowSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn first_desktop() -> String { "1".to_string() }

impl Scenario {
    pub fn parse(buf: &str) -> anyhow::Result<Scenario> { Ok(ron::from_str(buf)?) }

    pub fn read(path: &Path) -> anyhow::Result<Scenario> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::parse(&buf).with_context(|| format!("parsing scenario {}", path.display()))
    }
}

/// Something the user or the host does between two arranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Add(WindowSpec),
    Remove(u64),
    Focus(u64),
    Minimize(u64, bool),
    Maximize(u64, bool),
    /// Drag the window to `to`, releasing it with the cursor at `cursor`.
    Drag {
        window: u64,
        to: Rect,
        #[serde(default)]
        cursor: Option<Point>,
    },
    /// Resize the window by its border.
    Resize { window: u64, to: Rect },
    /// The application moved its own window.
    Move { window: u64, to: Rect },
    DesktopChanged(u64),
    /// Make the screen on `output` the current one.
    Switch(String),
    Shortcut(LayoutCommand),
    /// Let `millis` pass, running whatever became due.
    Wait(u64),
}

/// Final placement of one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: u64,
    pub class: String,
    pub state: WindowState,
    pub output: Option<String>,
    pub geometry: Rect,
}

struct Replay {
    reactor: Reactor,
    ctx: HeadlessContext,
    hosts: BTreeMap<WindowId, HeadlessWindow>,
    rules: WindowRules,
    /// Scheduled tasks with the clock value they are due at.
    pending: Vec<(u64, ScheduledTask)>,
}

impl Replay {
    fn new(config: &Config, scenario: &Scenario) -> Self {
        let screens = scenario
            .screens
            .iter()
            .map(|screen| {
                let mut srf = surface(
                    &screen.output,
                    &scenario.activity,
                    &scenario.desktop,
                    screen.working_area,
                    &config.layout,
                );
                srf.ignore = screen.ignore;
                srf
            })
            .collect();
        Self {
            reactor: Reactor::new(config),
            ctx: HeadlessContext::new(screens),
            hosts: BTreeMap::new(),
            rules: WindowRules::new(&config.rules),
            pending: Vec::new(),
        }
    }

    fn send(&mut self, event: Event) -> Result<(), ReactorError> {
        self.reactor.handle_event(&mut self.ctx, event)?;
        let now = self.ctx.now();
        let due = self.ctx.timeouts.drain(..).map(|(delay, task)| (now + delay.as_millis() as u64, task));
        self.pending.extend(due);
        Ok(())
    }

    fn host(&self, id: u64) -> Result<HeadlessWindow, ReactorError> {
        self.hosts.get(&WindowId(id)).cloned().ok_or(ReactorError::UnknownWindow(WindowId(id)))
    }

    fn run(&mut self, step: Step) -> Result<(), ReactorError> {
        let _span = info_span!("step", ?step).entered();
        match step {
            Step::Add(mut spec) => {
                self.rules.apply(&mut spec);
                let output = std::mem::take(&mut spec.output);
                let mut host = HeadlessWindow::new(spec);
                if !output.is_empty() {
                    let srf = self
                        .ctx
                        .surface_for_output(&output)
                        .cloned()
                        .ok_or(ReactorError::UnknownOutput(output))?;
                    host.set_surface(&srf);
                }
                let id = host.id();
                if self.hosts.contains_key(&id) {
                    return Err(ReactorError::DuplicateWindow(id));
                }
                self.hosts.insert(id, host.clone());
                self.send(Event::WindowAdded(Box::new(host)))?;
            }
            Step::Remove(id) => {
                self.hosts.remove(&WindowId(id)).ok_or(ReactorError::UnknownWindow(WindowId(id)))?;
                self.send(Event::WindowRemoved(WindowId(id)))?;
            }
            Step::Focus(id) => {
                self.host(id)?;
                self.ctx.set_current_window(WindowId(id));
                self.send(Event::Focused(WindowId(id)))?;
            }
            Step::Minimize(id, minimized) => {
                self.host(id)?.set_minimized(minimized);
                self.send(Event::WindowChanged { window: WindowId(id), unminimized: !minimized })?;
            }
            Step::Maximize(id, maximized) => {
                self.host(id)?.set_maximized(maximized);
                self.send(Event::MaximizeChanged(WindowId(id)))?;
            }
            Step::Drag { window, to, cursor } => {
                let host = self.host(window)?;
                let id = WindowId(window);
                self.send(Event::MoveStart(id))?;
                host.move_to(to);
                self.ctx.cursor = cursor;
                self.send(Event::Move(id))?;
                self.send(Event::MoveOver(id))?;
                self.ctx.cursor = None;
            }
            Step::Resize { window, to } => {
                let host = self.host(window)?;
                let id = WindowId(window);
                self.send(Event::ResizeStart(id))?;
                host.move_to(to);
                self.send(Event::Resize(id))?;
                self.send(Event::ResizeOver(id))?;
            }
            Step::Move { window, to } => {
                self.host(window)?.move_to(to);
                self.send(Event::GeometryChanged(WindowId(window)))?;
            }
            Step::DesktopChanged(id) => {
                self.host(id)?;
                self.send(Event::DesktopsChanged(WindowId(id)))?;
            }
            Step::Switch(output) => {
                let srf = self
                    .ctx
                    .surface_for_output(&output)
                    .cloned()
                    .ok_or(ReactorError::UnknownOutput(output))?;
                self.ctx.set_current_surface(&srf);
                self.send(Event::CurrentSurfaceChanged)?;
            }
            Step::Shortcut(command) => self.send(Event::Shortcut(command))?,
            Step::Wait(millis) => {
                self.ctx.advance(millis);
                let now = self.ctx.now();
                let (due, later) = std::mem::take(&mut self.pending)
                    .into_iter()
                    .partition::<Vec<_>, _>(|(at, _)| *at <= now);
                self.pending = later;
                for (_, task) in due {
                    debug!(?task, "running scheduled task");
                    self.send(Event::Scheduled(task))?;
                }
            }
        }
        Ok(())
    }

    fn placements(&self) -> Vec<Placement> {
        let windows = &self.reactor.engine().windows;
        self.hosts
            .iter()
            .map(|(&id, host)| Placement {
                id: id.0,
                class: host.class().to_string(),
                state: windows.get(id).map_or(WindowState::Unmanaged, |w| w.state()),
                output: host.surface().map(|s| s.output),
                geometry: host.geometry(),
            })
            .collect()
    }
}

/// Plays `scenario` from an empty session and returns the placement of
/// every window that is still open at the end, ordered by id.
pub fn replay(config: &Config, scenario: Scenario) -> Result<Vec<Placement>, ReactorError> {
    let mut replay = Replay::new(config, &scenario);
    replay.send(Event::SurfaceUpdate)?;
    for spec in scenario.windows {
        replay.run(Step::Add(spec))?;
    }
    for step in scenario.steps {
        replay.run(step)?;
    }
    Ok(replay.placements())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SCENARIO: &str = r#"
        Scenario(
            screens: [
                (output: "DP-1", working_area: (x: 0, y: 0, width: 1000, height: 800)),
                (output: "DP-2", working_area: (x: 1000, y: 0, width: 800, height: 600)),
            ],
            windows: [
                (id: 1, class: "konsole", geometry: (x: 0, y: 0, width: 300, height: 300)),
                (id: 2, class: "dolphin", geometry: (x: 0, y: 0, width: 300, height: 300)),
                (id: 3, class: "firefox", output: "DP-2", geometry: (x: 1000, y: 0, width: 300, height: 300)),
            ],
            steps: [
                Focus(2),
                Shortcut(set_master),
                Add((id: 4, class: "kdialog", geometry: (x: 10, y: 10, width: 200, height: 100))),
            ],
        )
    "#;

    fn geometry(placements: &[Placement], id: u64) -> Rect {
        placements.iter().find(|p| p.id == id).map(|p| p.geometry).unwrap()
    }

    #[test_log::test]
    fn scenario_runs_to_completion() {
        let mut config = Config::default();
        config.rules.floating_class = vec!["kdialog".into()];
        let scenario = Scenario::parse(SCENARIO).unwrap();
        let placements = replay(&config, scenario).unwrap();

        assert_eq!(placements.len(), 4);
        assert_eq!(geometry(&placements, 2), Rect::new(0, 0, 500, 800));
        assert_eq!(geometry(&placements, 1), Rect::new(500, 0, 500, 800));
        assert_eq!(geometry(&placements, 3), Rect::new(1000, 0, 800, 600));
        assert_eq!(placements[2].output.as_deref(), Some("DP-2"));
        assert_eq!(placements[3].state, WindowState::Floating);
        assert_eq!(geometry(&placements, 4), Rect::new(10, 10, 200, 100));
    }

    #[test]
    fn unknown_windows_and_outputs_are_errors() {
        let base = Scenario::parse(SCENARIO).unwrap();

        let mut scenario = base.clone();
        scenario.steps.push(Step::Remove(9));
        assert_eq!(replay(&Config::default(), scenario), Err(ReactorError::UnknownWindow(WindowId(9))));

        let mut scenario = base;
        scenario.steps.push(Step::Switch("HDMI-1".into()));
        assert_eq!(
            replay(&Config::default(), scenario),
            Err(ReactorError::UnknownOutput("HDMI-1".into()))
        );
    }

    #[test]
    fn waiting_runs_scheduled_tasks() {
        let mut config = Config::default();
        config.behavior.adjust_layout = false;
        let mut scenario = Scenario::parse(SCENARIO).unwrap();
        scenario.steps = vec![
            Step::Move { window: 1, to: Rect::new(3, 3, 30, 30) },
            Step::Wait(5),
        ];
        let placements = replay(&config, scenario.clone()).unwrap();
        assert_eq!(geometry(&placements, 1), Rect::new(3, 3, 30, 30));

        scenario.steps.push(Step::Wait(5));
        let placements = replay(&config, scenario).unwrap();
        assert_eq!(geometry(&placements, 1), Rect::new(0, 0, 500, 800));
    }
}
