//! UI definitions.
//!
//! The [Ui] holds a stack of breadcrumbs in the status bar, the current screen
//! and an optional form drawn on top of it. It knows nothing about the backend
//! apart from [Task]s it asks to execute and [BackendEvent]s it receives back.

mod form;
pub mod routes;
mod screen;
mod status_bar;
mod views;

use tuirealm::{
    tui::prelude::{Constraint, Direction, Layout},
    Frame,
};

use self::{
    form::{Form, FormController, FormStatus},
    routes::Route,
    screen::{Screen, ScreenController, ScreenFeedback},
    status_bar::StatusBarState,
};
use crate::{
    backend::{AppState, AppStateUpdate, BackendEvent, Task},
    Event,
};

/// What the application loop has to do after the UI processed an event.
pub enum UiFeedback {
    Quit,
    ExecuteTask { task: Task, block: bool },
    Redraw,
    None,
}

pub struct Ui {
    status_bar_state: StatusBarState,
    screen: Screen<Box<dyn ScreenController>>,
    form: Option<Form<Box<dyn FormController>>>,
    blocked: bool,
}

impl Ui {
    /// Builds the UI showing the screen of `route`, screens leading to it
    /// are only reflected in breadcrumbs.
    pub fn new(app_state: &AppState, route: Route) -> Self {
        let mut status_bar_state = StatusBarState::new(app_state);

        for parent in route.parents() {
            status_bar_state.add_child(parent.builder()(app_state).name());
        }
        let controller = route.builder()(app_state);
        status_bar_state.add_child(controller.name());

        Ui {
            status_bar_state,
            screen: Screen::new(controller),
            form: None,
            blocked: false,
        }
    }

    /// Lets the current screen start its initial task.
    pub fn mount(&mut self) -> UiFeedback {
        match self.screen.on_mount() {
            Some(task) => self.execute_task(task, true),
            None => UiFeedback::Redraw,
        }
    }

    pub fn view(&mut self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Max(3), Constraint::Min(10)].as_ref())
            .split(frame.size());

        self.status_bar_state.view(frame, layout[0]);
        self.screen.view(frame, layout[1], self.form.as_mut());
    }

    /// Called once a blocking task has finished.
    pub fn unblock(&mut self) {
        self.blocked = false;
        self.status_bar_state.unblock();
    }

    pub fn on_event(&mut self, app_state: &AppState, event: Event) -> UiFeedback {
        match event {
            // Keys are ignored while a blocking task is running
            Event::Key(_) if self.blocked => UiFeedback::None,
            Event::Key(key_event) => {
                if let Some(form) = &mut self.form {
                    match form.on_event(key_event) {
                        FormStatus::Done { task, block } => {
                            self.form = None;
                            match self.execute_task(task, block) {
                                UiFeedback::None => UiFeedback::Redraw,
                                feedback => feedback,
                            }
                        }
                        FormStatus::Redraw => UiFeedback::Redraw,
                        FormStatus::None => UiFeedback::None,
                        FormStatus::Exit => {
                            self.form = None;
                            UiFeedback::Redraw
                        }
                    }
                } else {
                    let feedback = self.screen.on_event(Event::Key(key_event));
                    self.apply_screen_feedback(app_state, feedback)
                }
            }
            Event::Backend(backend_event) => {
                if let BackendEvent::TaskCompletedStateChange {
                    app_state_update: AppStateUpdate::DeployedAddress(address),
                    ..
                } = &backend_event
                {
                    self.status_bar_state.update_deployed_address(*address);
                }
                let feedback = self.screen.on_event(Event::Backend(backend_event));
                match self.apply_screen_feedback(app_state, feedback) {
                    // Results are always shown
                    UiFeedback::None => UiFeedback::Redraw,
                    feedback => feedback,
                }
            }
        }
    }

    fn apply_screen_feedback(&mut self, app_state: &AppState, feedback: ScreenFeedback) -> UiFeedback {
        match feedback {
            ScreenFeedback::NextScreen(builder) => {
                let controller = builder(app_state);
                self.status_bar_state.add_child(controller.name());
                self.switch_screen(controller)
            }
            ScreenFeedback::PreviousScreen(builder) => {
                self.status_bar_state.to_parent();
                self.switch_screen(builder(app_state))
            }
            ScreenFeedback::Form(controller) => {
                self.form = Some(Form::new(controller));
                UiFeedback::Redraw
            }
            ScreenFeedback::Task { task, block } => self.execute_task(task, block),
            ScreenFeedback::Redraw => UiFeedback::Redraw,
            ScreenFeedback::Quit => UiFeedback::Quit,
            ScreenFeedback::None => UiFeedback::None,
        }
    }

    fn switch_screen(&mut self, controller: Box<dyn ScreenController>) -> UiFeedback {
        tracing::debug!(screen = controller.name(), "switching screen");
        self.form = None;
        self.screen = Screen::new(controller);
        self.mount()
    }

    fn execute_task(&mut self, task: Task, block: bool) -> UiFeedback {
        if !self.screen.accept_task(&task) {
            tracing::warn!(?task, "task refused by {}", self.screen.name());
            return UiFeedback::None;
        }
        if block {
            self.blocked = true;
            self.status_bar_state.block();
        }
        UiFeedback::ExecuteTask { task, block }
    }
}
