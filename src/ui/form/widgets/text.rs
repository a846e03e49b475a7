//! Simple text input component.

use std::{marker::PhantomData, str::FromStr};

use tuirealm::{
    command::{Cmd, Direction},
    event::{Key, KeyEvent, KeyModifiers},
    props::{BorderSides, Borders, Color, Style},
    tui::prelude::Rect,
    AttrValue, Attribute, Frame, MockComponent,
};

use crate::ui::form::{Input, InputStatus};

pub(crate) struct TextInput<V> {
    input: tui_realm_stdlib::Input,
    _value_type: PhantomData<V>,
}

impl<V> TextInput<V> {
    pub(crate) fn new(placeholder: &'static str) -> Self {
        let mut input = tui_realm_stdlib::Input::default()
            .borders(Borders::default().sides(BorderSides::NONE))
            .placeholder(placeholder, Style::default().fg(Color::Gray));
        input.attr(Attribute::Focus, AttrValue::Flag(true));

        TextInput {
            input,
            _value_type: PhantomData,
        }
    }
}

impl<V: FromStr> Input for TextInput<V> {
    type Output = V;

    fn on_event(&mut self, event: KeyEvent) -> InputStatus<Self::Output> {
        match event {
            KeyEvent {
                code: Key::Enter,
                modifiers: KeyModifiers::NONE,
            } => match self.input.state().unwrap_one().unwrap_string().parse() {
                Ok(value) => InputStatus::Done(value),
                Err(_) => {
                    self.input
                        .attr(Attribute::Foreground, AttrValue::Color(Color::Red));
                    InputStatus::Redraw
                }
            },
            KeyEvent {
                code: Key::Char('q'),
                modifiers: KeyModifiers::CONTROL,
            }
            | KeyEvent { code: Key::Esc, .. } => InputStatus::Exit,
            KeyEvent {
                code: Key::Char(c),
                modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT,
            } => {
                self.input
                    .attr(Attribute::Foreground, AttrValue::Color(Color::Reset));
                self.input.perform(Cmd::Type(c));
                InputStatus::Redraw
            }
            KeyEvent {
                code: Key::Left,
                modifiers: KeyModifiers::NONE,
            } => {
                self.input.perform(Cmd::Move(Direction::Left));
                InputStatus::Redraw
            }
            KeyEvent {
                code: Key::Right,
                modifiers: KeyModifiers::NONE,
            } => {
                self.input.perform(Cmd::Move(Direction::Right));
                InputStatus::Redraw
            }
            KeyEvent {
                code: Key::Backspace,
                modifiers: KeyModifiers::NONE,
            } => {
                self.input.perform(Cmd::Delete);
                self.input
                    .attr(Attribute::Foreground, AttrValue::Color(Color::Reset));
                InputStatus::Redraw
            }
            _ => InputStatus::None,
        }
    }

    fn view(&mut self, frame: &mut Frame, area: Rect) {
        self.input.view(frame, area);
    }
}

/// Value of an input that may be left empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Optional<T>(pub Option<T>);

impl<T: FromStr> FromStr for Optional<T> {
    type Err = T::Err;

    /// Blank input is `None`. Anything else is parsed as typed, and only
    /// retried trimmed if that fails, so text values keep their spacing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            Ok(Optional(None))
        } else {
            s.parse()
                .or_else(|err| s.trim().parse().map_err(|_| err))
                .map(|value| Optional(Some(value)))
        }
    }
}

/// Text kept exactly as typed, but required to be non-blank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Required(pub String);

#[derive(Debug)]
pub(crate) struct BlankInput;

impl FromStr for Required {
    type Err = BlankInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            Err(BlankInput)
        } else {
            Ok(Required(s.to_owned()))
        }
    }
}
