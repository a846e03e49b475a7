//! Status bar component definitions.

use std::fmt::{self, Display};

use alloy_primitives::Address;
use tui_realm_stdlib::Label;
use tuirealm::{
    props::BorderSides,
    tui::{
        prelude::{Constraint, Direction, Layout, Rect},
        widgets::Block,
    },
    Frame, MockComponent,
};

use crate::backend::AppState;

pub(crate) struct StatusBarState {
    breadcrumbs: Vec<&'static str>,
    blocked: bool,
    account: Address,
    deployed: DeployedContractStatus,
}

#[derive(Default)]
enum DeployedContractStatus {
    #[default]
    NotDeployed,
    Deployed(Address),
}

impl Display for DeployedContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployedContractStatus::NotDeployed => write!(f, "No deployment"),
            DeployedContractStatus::Deployed(address) => write!(f, "Deployed: {address}"),
        }
    }
}

impl StatusBarState {
    pub(crate) fn new(app_state: &AppState) -> Self {
        StatusBarState {
            breadcrumbs: Vec::new(),
            blocked: false,
            account: app_state.account,
            deployed: app_state
                .deployed_address()
                .map(DeployedContractStatus::Deployed)
                .unwrap_or_default(),
        }
    }

    pub(crate) fn update_deployed_address(&mut self, address: Address) {
        self.deployed = DeployedContractStatus::Deployed(address);
    }

    pub(crate) fn block(&mut self) {
        self.blocked = true;
    }

    pub(crate) fn unblock(&mut self) {
        self.blocked = false;
    }

    pub(crate) fn add_child(&mut self, name: &'static str) {
        self.breadcrumbs.push(name);
    }

    pub(crate) fn to_parent(&mut self) {
        self.breadcrumbs.pop();
    }

    pub(crate) fn view(&self, frame: &mut Frame, area: Rect) {
        let block = Block::new().borders(BorderSides::ALL);

        let layout = Layout::default()
            .horizontal_margin(1)
            .direction(Direction::Horizontal)
            .constraints(
                [
                    Constraint::Min(20),
                    Constraint::Max(52),
                    Constraint::Max(54),
                ]
                .as_ref(),
            )
            .split(block.inner(area));

        let breadcrumbs_str = self.breadcrumbs.join(" / ");

        if self.blocked {
            Label::default().text("Executing a task, please wait")
        } else {
            Label::default().text(&breadcrumbs_str)
        }
        .view(frame, layout[0]);

        Label::default()
            .text(&format!("Account: {}", self.account))
            .view(frame, layout[1]);

        Label::default()
            .text(&self.deployed.to_string())
            .view(frame, layout[2]);

        frame.render_widget(block, area);
    }
}
