//! Screen module.

pub(crate) mod utils;
pub(crate) mod widgets;

use std::ops::{Deref, DerefMut};

use tuirealm::{
    tui::prelude::{Constraint, Direction, Layout, Rect},
    Frame,
};

use self::widgets::command_pallet;
use super::form::{Form, FormController};
use crate::{
    backend::{AppState, Task},
    Event,
};

/// Screen is the unit of navigation and representation in the TUI.
/// It consists of two blocks:
/// 1. an info block that represents help, optionally scrollable data or error,
///    replaced by a form while one is active,
/// 2. a command pallet: a table of keystrokes for commands that acts like
///    a help
///
/// Because all the screens are the same thing to draw it's one generic type,
/// however, they're different about what keys to show and how to process them,
/// so we use a generic [ScreenController] here.
pub(crate) struct Screen<C: ScreenController> {
    controller: C,
}

impl<C: ScreenController> Screen<C> {
    pub(super) fn new(controller: C) -> Self {
        Screen { controller }
    }

    pub(super) fn view(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        form: Option<&mut Form<Box<dyn FormController>>>,
    ) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Max(6)].as_ref())
            .split(area);

        if let Some(form) = form {
            form.view(frame, layout[0]);
        } else {
            self.controller.view(frame, layout[0]);
        }
        command_pallet::view(frame, layout[1], &self.controller);
    }

    pub(super) fn name(&self) -> &'static str {
        self.controller.name()
    }

    pub(super) fn on_event(&mut self, event: Event) -> ScreenFeedback {
        self.controller.on_event(event)
    }

    pub(super) fn on_mount(&mut self) -> Option<Task> {
        self.controller.on_mount()
    }

    pub(super) fn accept_task(&mut self, task: &Task) -> bool {
        self.controller.accept_task(task)
    }
}

/// A screen controller is responsible for providing keystrokes information as
/// well as for dispatching keypress events. This is used as generic parameter
/// for [Screen] and it makes a difference between one screen or another.
pub(crate) trait ScreenController {
    fn view(&mut self, frame: &mut Frame, area: Rect);

    fn name(&self) -> &'static str;

    fn command_keys(&self) -> &[ScreenCommandKey];

    /// Process key event, returning details on what's needed to be updated on
    /// UI.
    fn on_event(&mut self, event: Event) -> ScreenFeedback;

    /// Task to run right after the screen is shown.
    fn on_mount(&mut self) -> Option<Task> {
        None
    }

    /// Called before a task produced by this screen or its form is executed,
    /// `false` drops the task.
    fn accept_task(&mut self, _task: &Task) -> bool {
        true
    }
}

impl ScreenController for Box<dyn ScreenController> {
    fn view(&mut self, frame: &mut Frame, area: Rect) {
        self.deref_mut().view(frame, area)
    }

    fn name(&self) -> &'static str {
        self.deref().name()
    }

    fn command_keys(&self) -> &[ScreenCommandKey] {
        self.deref().command_keys()
    }

    fn on_event(&mut self, event: Event) -> ScreenFeedback {
        self.deref_mut().on_event(event)
    }

    fn on_mount(&mut self) -> Option<Task> {
        self.deref_mut().on_mount()
    }

    fn accept_task(&mut self, task: &Task) -> bool {
        self.deref_mut().accept_task(task)
    }
}

type Keybinding = &'static str;

#[derive(Clone)]
pub(crate) struct ScreenCommandKey {
    pub keybinding: Keybinding,
    pub description: &'static str,
}

impl ScreenCommandKey {
    pub(crate) const fn new(keybinding: Keybinding, description: &'static str) -> Self {
        ScreenCommandKey {
            keybinding,
            description,
        }
    }
}

pub(crate) enum ScreenFeedback {
    NextScreen(ScreenControllerBuilder),
    PreviousScreen(ScreenControllerBuilder),
    Form(Box<dyn FormController>),
    Task { task: Task, block: bool },
    Redraw,
    Quit,
    None,
}

pub(crate) type ScreenControllerBuilder = Box<dyn FnOnce(&AppState) -> Box<dyn ScreenController>>;
