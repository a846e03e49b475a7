//! Command pallet definitions.

use itertools::Itertools;
use tui_realm_stdlib::Table;
use tuirealm::{props::TextSpan, tui::prelude::Rect, Frame, MockComponent};

use crate::ui::screen::ScreenController;

const KEYS_PER_ROW: usize = 3;

pub(crate) fn view(frame: &mut Frame, area: Rect, controller: &impl ScreenController) {
    let table_vec: Vec<Vec<TextSpan>> = controller
        .command_keys()
        .iter()
        .map(|c| TextSpan::new(format!("{} - {}", c.keybinding, c.description)))
        .chunks(KEYS_PER_ROW)
        .into_iter()
        .map(|row| row.collect())
        .collect();

    Table::default().table(table_vec).view(frame, area);
}
