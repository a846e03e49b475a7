//! Contract management screen, the root of the navigation.

use tuirealm::{
    event::{Key, KeyEvent, KeyModifiers},
    tui::prelude::Rect,
    Frame,
};

use super::deploy::DeployScreenController;
use crate::{
    backend::{
        actions::{ActionKind, ContractAction},
        management::{ManagementSession, Panel, Selection},
        AppState, AppStateUpdate, BackendEvent, ManagementTask, StoredContractRef, Task,
    },
    ui::{
        form::{
            ComposedInput, Field, FormController, FormStatus, Input, InputStatus, Required,
            TextInput,
        },
        screen::{
            utils::impl_builder, widgets::info::Info, ScreenCommandKey, ScreenController,
            ScreenFeedback,
        },
    },
    Event,
};

const OWNER_COMMANDS: [ScreenCommandKey; 4] = [
    ScreenCommandKey::new("f", "Add farmer"),
    ScreenCommandKey::new("d", "Add distributor"),
    ScreenCommandKey::new("r", "Add retailer"),
    ScreenCommandKey::new("k", "Kill contract"),
];

const FETCH_COMMANDS: [ScreenCommandKey; 2] = [
    ScreenCommandKey::new("p", "Fetch product"),
    ScreenCommandKey::new("h", "Fetch product history"),
];

#[memoize::memoize]
fn join_commands(
    contract_found: bool,
    manual_entry: bool,
    owner: bool,
    fetch: bool,
) -> &'static [ScreenCommandKey] {
    let mut commands = vec![
        ScreenCommandKey::new("q", "Quit"),
        ScreenCommandKey::new("i", "Deploy a contract"),
    ];

    if contract_found {
        commands.push(ScreenCommandKey::new("u", "Use stored contract"));
        commands.push(ScreenCommandKey::new("x", "Clear stored contract"));
    }
    if manual_entry {
        commands.push(ScreenCommandKey::new("m", "Enter contract manually"));
    }
    if owner {
        commands.extend_from_slice(&OWNER_COMMANDS);
    }
    if fetch {
        commands.extend_from_slice(&FETCH_COMMANDS);
    }

    commands.leak()
}

pub(crate) struct ManageScreenController {
    info: Info,
    session: ManagementSession,
    last_result: Option<Result<String, String>>,
}

impl_builder!(ManageScreenController);

impl ManageScreenController {
    pub(crate) fn new(_app_state: &AppState) -> Self {
        let mut controller = ManageScreenController {
            info: Info::new_fixed(""),
            session: ManagementSession::new(),
            last_result: None,
        };
        controller.refresh_info();
        controller
    }

    fn has_panel(&self, panel: Panel) -> bool {
        self.session.panels().contains(&panel)
    }

    fn refresh_info(&mut self) {
        let mut sections = Vec::new();

        if let Some(contract) = self.session.contract() {
            if self.session.selection() != Selection::None {
                sections.push(format!("Contract: {}", contract.address));
            }
        }
        if let Some(role) = self.session.role() {
            sections.push(format!("Role: {role}"));
        }

        for panel in self.session.panels() {
            sections.push(match panel {
                Panel::ContractFound => format!(
                    "Contract Found\nA contract is saved in local storage at address {}.\n\
                     Use it (u) or clear it (x).",
                    self.session
                        .contract()
                        .map(|c| c.address.as_str())
                        .unwrap_or_default()
                ),
                Panel::Error => "Error\nError encountered. Check console for details.".to_owned(),
                Panel::ManualEntry => {
                    "Manage Contract\nEnter a contract ABI and address to manage (m).".to_owned()
                }
                Panel::Owner => "Owner\nAdd a farmer (f), a distributor (d) or a retailer (r), \
                                 or kill the contract (k)."
                    .to_owned(),
                Panel::FetchProduct => "Fetch a product by UPC (p).".to_owned(),
                Panel::FetchProductHistory => "Fetch a product history by UPC (h).".to_owned(),
                Panel::Loading => "Loading...".to_owned(),
            });
        }

        if let Some(result) = &self.last_result {
            match result {
                Ok(message) | Err(message) => sections.push(message.clone()),
            }
        }

        let text = sections.join("\n\n");
        self.info = if self.session.has_error() || matches!(self.last_result, Some(Err(_))) {
            Info::new_error(&text)
        } else {
            Info::new_scrollable(&text)
        };
    }

    fn action_form(&self, kind: ActionKind) -> ScreenFeedback {
        match self.session.working_contract() {
            Some(contract) if self.session.available_actions().contains(&kind) => {
                ScreenFeedback::Form(Box::new(ActionFormController::new(kind, contract.clone())))
            }
            _ => ScreenFeedback::None,
        }
    }
}

impl ScreenController for ManageScreenController {
    fn view(&mut self, frame: &mut Frame, area: Rect) {
        self.info.view(frame, area)
    }

    fn name(&self) -> &'static str {
        "Management"
    }

    fn command_keys(&self) -> &[ScreenCommandKey] {
        let panels = self.session.panels();
        join_commands(
            panels.contains(&Panel::ContractFound),
            panels.contains(&Panel::ManualEntry),
            panels.contains(&Panel::Owner),
            panels.contains(&Panel::FetchProduct),
        )
    }

    fn on_mount(&mut self) -> Option<Task> {
        Some(Task::Management(ManagementTask::LoadStoredContract))
    }

    fn on_event(&mut self, event: Event) -> ScreenFeedback {
        match event {
            Event::Key(KeyEvent {
                code: Key::Char('q'),
                modifiers: KeyModifiers::NONE,
            }) => ScreenFeedback::Quit,

            Event::Key(KeyEvent {
                code: Key::Char('i'),
                modifiers: KeyModifiers::NONE,
            }) => ScreenFeedback::NextScreen(DeployScreenController::builder()),

            Event::Key(KeyEvent {
                code: Key::Char('u'),
                modifiers: KeyModifiers::NONE,
            }) if self.has_panel(Panel::ContractFound) => match self.session.use_stored() {
                Some(contract) => {
                    self.refresh_info();
                    ScreenFeedback::Task {
                        task: Task::Management(ManagementTask::ResolveRole(contract)),
                        block: false,
                    }
                }
                None => ScreenFeedback::None,
            },

            Event::Key(KeyEvent {
                code: Key::Char('x'),
                modifiers: KeyModifiers::NONE,
            }) if self.has_panel(Panel::ContractFound) => ScreenFeedback::Task {
                task: Task::Management(ManagementTask::ClearStoredContract),
                block: true,
            },

            Event::Key(KeyEvent {
                code: Key::Char('m'),
                modifiers: KeyModifiers::NONE,
            }) if self.has_panel(Panel::ManualEntry) => {
                ScreenFeedback::Form(Box::new(ManualEntryFormController::new()))
            }

            Event::Key(KeyEvent {
                code: Key::Char('f'),
                modifiers: KeyModifiers::NONE,
            }) => self.action_form(ActionKind::AddFarmer),

            Event::Key(KeyEvent {
                code: Key::Char('d'),
                modifiers: KeyModifiers::NONE,
            }) => self.action_form(ActionKind::AddDistributor),

            Event::Key(KeyEvent {
                code: Key::Char('r'),
                modifiers: KeyModifiers::NONE,
            }) => self.action_form(ActionKind::AddRetailer),

            Event::Key(KeyEvent {
                code: Key::Char('k'),
                modifiers: KeyModifiers::NONE,
            }) => match self.session.working_contract() {
                Some(contract)
                    if self
                        .session
                        .available_actions()
                        .contains(&ActionKind::KillContract) =>
                {
                    ScreenFeedback::Task {
                        task: Task::Management(ManagementTask::Action {
                            contract: contract.clone(),
                            action: ContractAction::KillContract,
                        }),
                        block: false,
                    }
                }
                _ => ScreenFeedback::None,
            },

            Event::Key(KeyEvent {
                code: Key::Char('p'),
                modifiers: KeyModifiers::NONE,
            }) => self.action_form(ActionKind::FetchProduct),

            Event::Key(KeyEvent {
                code: Key::Char('h'),
                modifiers: KeyModifiers::NONE,
            }) => self.action_form(ActionKind::FetchProductHistory),

            Event::Key(key_event) => {
                if self.info.on_event(key_event) {
                    ScreenFeedback::Redraw
                } else {
                    ScreenFeedback::None
                }
            }

            Event::Backend(BackendEvent::StoredContractLoaded(stored)) => {
                self.session.load_stored(stored);
                self.refresh_info();
                ScreenFeedback::Redraw
            }

            Event::Backend(BackendEvent::RoleResolved { contract, role }) => {
                if self.session.resolve_role(&contract, role) {
                    self.refresh_info();
                    ScreenFeedback::Redraw
                } else {
                    tracing::debug!(address = %contract.address, "dropped stale role lookup result");
                    ScreenFeedback::None
                }
            }

            Event::Backend(BackendEvent::ContractEntered(Ok(contract))) => {
                let lookup = self.session.use_entered(contract);
                self.last_result = None;
                self.refresh_info();
                match lookup {
                    Some(contract) => ScreenFeedback::Task {
                        task: Task::Management(ManagementTask::ResolveRole(contract)),
                        block: false,
                    },
                    None => ScreenFeedback::Redraw,
                }
            }

            Event::Backend(BackendEvent::ContractEntered(Err(error))) => {
                self.last_result = Some(Err(error));
                self.refresh_info();
                ScreenFeedback::Redraw
            }

            // The stored contract may have been replaced along with a new deployment
            Event::Backend(BackendEvent::TaskCompletedStateChange {
                app_state_update: AppStateUpdate::DeployedAddress(_),
                ..
            }) => ScreenFeedback::Task {
                task: Task::Management(ManagementTask::LoadStoredContract),
                block: true,
            },

            Event::Backend(BackendEvent::TaskCompleted {
                task: Task::Management(ManagementTask::ClearStoredContract),
                execution_result,
            }) => {
                if execution_result.is_ok() {
                    self.session.clear_stored();
                }
                self.last_result = Some(execution_result);
                self.refresh_info();
                ScreenFeedback::Redraw
            }

            Event::Backend(BackendEvent::TaskCompleted {
                task: Task::Management(_),
                execution_result,
            }) => {
                self.last_result = Some(execution_result);
                self.refresh_info();
                ScreenFeedback::Redraw
            }

            _ => ScreenFeedback::None,
        }
    }
}

/// Single value form of a role action: a participant address or a UPC.
struct ActionFormController {
    kind: ActionKind,
    contract: StoredContractRef,
    input: TextInput<Required>,
}

impl ActionFormController {
    fn new(kind: ActionKind, contract: StoredContractRef) -> Self {
        let placeholder = match kind {
            ActionKind::AddFarmer => "Farmer Address",
            ActionKind::AddDistributor => "Distributor Address",
            ActionKind::AddRetailer => "Retailer Address",
            _ => "UPC",
        };
        ActionFormController {
            kind,
            contract,
            input: TextInput::new(placeholder),
        }
    }
}

impl FormController for ActionFormController {
    fn on_event(&mut self, event: KeyEvent) -> FormStatus {
        match self.input.on_event(event) {
            InputStatus::Done(Required(value)) => FormStatus::Done {
                task: Task::Management(ManagementTask::Action {
                    contract: self.contract.clone(),
                    action: ContractAction::new(self.kind, value.trim().to_owned()),
                }),
                block: false,
            },
            status => status.into(),
        }
    }

    fn form_name(&self) -> &'static str {
        match self.kind {
            ActionKind::AddFarmer => "Add farmer",
            ActionKind::AddDistributor => "Add distributor",
            ActionKind::AddRetailer => "Add retailer",
            ActionKind::KillContract => "Kill contract",
            ActionKind::FetchProduct => "Fetch product",
            ActionKind::FetchProductHistory => "Fetch product history",
        }
    }

    fn step_view(&mut self, frame: &mut Frame, area: Rect) {
        self.input.view(frame, area)
    }

    fn step_name(&self) -> &'static str {
        if self.kind.owner_only() {
            "Address"
        } else {
            "UPC"
        }
    }

    fn step_index(&self) -> u8 {
        0
    }

    fn steps_number(&self) -> u8 {
        1
    }
}

struct ManualEntryFormController {
    input: ComposedInput<(Field<TextInput<Required>>, Field<TextInput<Required>>)>,
}

impl ManualEntryFormController {
    fn new() -> Self {
        ManualEntryFormController {
            input: ComposedInput::new((
                Field::new("ABI", TextInput::new("Contract ABI (JSON)")),
                Field::new("Address", TextInput::new("Contract Address")),
            )),
        }
    }
}

impl FormController for ManualEntryFormController {
    fn on_event(&mut self, event: KeyEvent) -> FormStatus {
        match self.input.on_event(event) {
            InputStatus::Done((Required(abi), Required(address))) => FormStatus::Done {
                task: Task::Management(ManagementTask::EnterContract { abi, address }),
                block: false,
            },
            status => status.into(),
        }
    }

    fn form_name(&self) -> &'static str {
        "Manage contract"
    }

    fn step_view(&mut self, frame: &mut Frame, area: Rect) {
        self.input.view(frame, area)
    }

    fn step_name(&self) -> &'static str {
        self.input.step_name()
    }

    fn step_index(&self) -> u8 {
        self.input.step_index()
    }

    fn steps_number(&self) -> u8 {
        self.input.steps_number()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::backend::Role;

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(Key::Char(c), KeyModifiers::NONE))
    }

    fn stored() -> StoredContractRef {
        StoredContractRef {
            abi: json!([]),
            address: "0x1000000000000000000000000000000000000001".to_owned(),
        }
    }

    fn loaded() -> ManageScreenController {
        let mut controller = ManageScreenController::new(&AppState::default());
        controller.on_event(Event::Backend(BackendEvent::StoredContractLoaded(Some(
            stored(),
        ))));
        controller
    }

    fn resolved(role: Role) -> ManageScreenController {
        let mut controller = loaded();
        controller.on_event(key('u'));
        controller.on_event(Event::Backend(BackendEvent::RoleResolved {
            contract: stored(),
            role: Ok(role),
        }));
        controller
    }

    #[test]
    fn stored_contract_keys_need_a_found_contract() {
        let mut empty = ManageScreenController::new(&AppState::default());
        assert!(matches!(
            empty.on_mount(),
            Some(Task::Management(ManagementTask::LoadStoredContract))
        ));
        assert!(matches!(empty.on_event(key('u')), ScreenFeedback::None));
        assert!(matches!(empty.on_event(key('x')), ScreenFeedback::None));

        let mut controller = loaded();
        assert!(matches!(
            controller.on_event(key('x')),
            ScreenFeedback::Task {
                task: Task::Management(ManagementTask::ClearStoredContract),
                block: true,
            }
        ));
        assert!(matches!(
            controller.on_event(key('u')),
            ScreenFeedback::Task {
                task: Task::Management(ManagementTask::ResolveRole(contract)),
                block: false,
            } if contract == stored()
        ));

        // Once selected neither the lookup nor clearing is offered again
        assert!(matches!(controller.on_event(key('u')), ScreenFeedback::None));
        assert!(matches!(controller.on_event(key('x')), ScreenFeedback::None));
    }

    #[test]
    fn owner_keys_only_for_owner() {
        let mut farmer = resolved(Role::Farmer);
        assert!(matches!(farmer.on_event(key('f')), ScreenFeedback::None));
        assert!(matches!(farmer.on_event(key('k')), ScreenFeedback::None));
        assert!(matches!(farmer.on_event(key('p')), ScreenFeedback::Form(_)));
        assert!(matches!(farmer.on_event(key('h')), ScreenFeedback::Form(_)));

        let mut owner = resolved(Role::Owner);
        assert!(matches!(owner.on_event(key('f')), ScreenFeedback::Form(_)));
        assert!(matches!(
            owner.on_event(key('k')),
            ScreenFeedback::Task {
                task: Task::Management(ManagementTask::Action {
                    action: ContractAction::KillContract,
                    ..
                }),
                block: false,
            }
        ));
    }

    #[test]
    fn action_keys_wait_for_the_role() {
        let mut controller = loaded();
        controller.on_event(key('u'));

        assert!(matches!(controller.on_event(key('p')), ScreenFeedback::None));
        assert!(matches!(controller.on_event(key('k')), ScreenFeedback::None));
    }

    #[test]
    fn clearing_hides_stored_contract() {
        let mut controller = loaded();

        controller.on_event(Event::Backend(BackendEvent::TaskCompleted {
            task: Task::Management(ManagementTask::ClearStoredContract),
            execution_result: Ok("Stored contract cleared".to_owned()),
        }));

        assert!(matches!(controller.on_event(key('u')), ScreenFeedback::None));
        assert!(!controller
            .command_keys()
            .iter()
            .any(|key| key.description == "Use stored contract"));
        assert!(matches!(controller.on_event(key('m')), ScreenFeedback::Form(_)));
    }

    #[test]
    fn stale_role_result_is_ignored() {
        let mut controller = loaded();
        controller.on_event(key('u'));

        let feedback = controller.on_event(Event::Backend(BackendEvent::RoleResolved {
            contract: StoredContractRef {
                address: "0x2000000000000000000000000000000000000002".to_owned(),
                ..stored()
            },
            role: Ok(Role::Owner),
        }));

        assert!(matches!(feedback, ScreenFeedback::None));
        assert!(matches!(controller.on_event(key('f')), ScreenFeedback::None));
    }
}
