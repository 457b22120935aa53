//! Event dispatch to external listeners
//!
//! Two independent listener lists: clicks (raw canvas-relative input routed
//! in from outside) and touches (one call per touched ball per frame).
//! Listeners cannot reach the registries directly. They queue [`Command`]s
//! that the simulation applies once the whole dispatch pass is over.
//!
//! Every listener runs on every dispatch. A listener returning `Err` is
//! logged and counted; it never stops the others.

use std::fmt;

use glam::Vec2;

use super::state::{BallSpec, Touch};

pub type ClickListener = Box<dyn FnMut(Vec2, &mut Commands) -> anyhow::Result<()>>;
pub type TouchListener = Box<dyn FnMut(&Touch, &mut Commands) -> anyhow::Result<()>>;

/// Handle returned on registration, used for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A deferred mutation requested by a listener
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Explode { pos: Vec2, max_radius: f32 },
    AddBall(BallSpec),
    RemoveBall(String),
}

/// Queue of deferred mutations, applied in order after dispatch
#[derive(Debug, Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn explode(&mut self, x: f32, y: f32, max_radius: f32) {
        self.push(Command::Explode {
            pos: Vec2::new(x, y),
            max_radius,
        });
    }

    pub fn add_ball(&mut self, spec: BallSpec) {
        self.push(Command::AddBall(spec));
    }

    pub fn remove_ball(&mut self, id: impl Into<String>) {
        self.push(Command::RemoveBall(id.into()));
    }

    pub(crate) fn push(&mut self, command: Command) {
        self.queue.push(command);
    }

    pub(crate) fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.queue)
    }
}

/// Outcome of one dispatch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listener invocations
    pub calls: usize,
    /// Invocations that returned an error
    pub failures: usize,
}

impl DispatchReport {
    fn record(&mut self, result: anyhow::Result<()>, kind: &str, id: ListenerId) {
        self.calls += 1;
        if let Err(err) = result {
            self.failures += 1;
            log::warn!("{} listener {:?} failed: {:#}", kind, id, err);
        }
    }
}

/// Registered click and touch listeners
#[derive(Default)]
pub struct Dispatcher {
    next_id: u64,
    click: Vec<(ListenerId, ClickListener)>,
    touch: Vec<(ListenerId, TouchListener)>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("click_listeners", &self.click.len())
            .field("touch_listeners", &self.touch.len())
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn on_click<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(Vec2, &mut Commands) -> anyhow::Result<()> + 'static,
    {
        let id = self.allocate_id();
        self.click.push((id, Box::new(listener)));
        id
    }

    pub fn on_touch<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Touch, &mut Commands) -> anyhow::Result<()> + 'static,
    {
        let id = self.allocate_id();
        self.touch.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener of either kind; false if unknown
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.click.len() + self.touch.len();
        self.click.retain(|(lid, _)| *lid != id);
        self.touch.retain(|(lid, _)| *lid != id);
        before != self.click.len() + self.touch.len()
    }

    pub fn click_listener_count(&self) -> usize {
        self.click.len()
    }

    pub fn touch_listener_count(&self) -> usize {
        self.touch.len()
    }

    /// Call every click listener with the click position
    pub fn dispatch_click(&mut self, pos: Vec2, commands: &mut Commands) -> DispatchReport {
        let mut report = DispatchReport::default();
        for (id, listener) in self.click.iter_mut() {
            report.record(listener(pos, commands), "Click", *id);
        }
        report
    }

    /// For each touched ball, call every touch listener
    pub fn dispatch_touches(&mut self, touches: &[Touch], commands: &mut Commands) -> DispatchReport {
        let mut report = DispatchReport::default();
        for touch in touches {
            for (id, listener) in self.touch.iter_mut() {
                report.record(listener(touch, commands), "Touch", *id);
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn touch(id: &str) -> Touch {
        Touch {
            pos: Vec2::new(1.0, 2.0),
            ball_id: id.to_string(),
        }
    }

    #[test]
    fn test_click_failure_does_not_stop_others() {
        let mut dispatcher = Dispatcher::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        dispatcher.on_click(|_, _| anyhow::bail!("boom"));
        let log = seen.clone();
        dispatcher.on_click(move |pos, _| {
            log.borrow_mut().push(pos);
            Ok(())
        });

        let mut commands = Commands::new();
        let report = dispatcher.dispatch_click(Vec2::new(3.0, 4.0), &mut commands);
        assert_eq!(report, DispatchReport { calls: 2, failures: 1 });
        assert_eq!(*seen.borrow(), vec![Vec2::new(3.0, 4.0)]);
    }

    #[test]
    fn test_touch_dispatch_order() {
        let mut dispatcher = Dispatcher::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = seen.clone();
            dispatcher.on_touch(move |t, _| {
                log.borrow_mut().push(format!("{}:{}", tag, t.ball_id));
                Ok(())
            });
        }

        let mut commands = Commands::new();
        let report = dispatcher.dispatch_touches(&[touch("a"), touch("b")], &mut commands);
        assert_eq!(report.calls, 4);
        assert_eq!(
            *seen.borrow(),
            vec!["first:a", "second:a", "first:b", "second:b"]
        );
    }

    #[test]
    fn test_touch_failure_keeps_going() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.on_touch(|t, _| {
            if t.ball_id == "a" {
                anyhow::bail!("bad ball");
            }
            Ok(())
        });
        dispatcher.on_touch(|t, cmds| {
            cmds.remove_ball(t.ball_id.clone());
            Ok(())
        });

        let mut commands = Commands::new();
        let report = dispatcher.dispatch_touches(&[touch("a"), touch("b")], &mut commands);
        assert_eq!(report, DispatchReport { calls: 4, failures: 1 });
        assert_eq!(
            commands.take(),
            vec![
                Command::RemoveBall("a".to_string()),
                Command::RemoveBall("b".to_string())
            ]
        );
    }

    #[test]
    fn test_remove_listener() {
        let mut dispatcher = Dispatcher::new();
        let click = dispatcher.on_click(|_, _| Ok(()));
        let touch_id = dispatcher.on_touch(|_, _| Ok(()));
        assert_ne!(click, touch_id);

        assert!(dispatcher.remove(click));
        assert!(!dispatcher.remove(click));
        assert_eq!(dispatcher.click_listener_count(), 0);
        assert_eq!(dispatcher.touch_listener_count(), 1);
    }
}
