//! Contract deployment screen, mounted under `/init`.

use tuirealm::{
    event::{Key, KeyEvent, KeyModifiers},
    tui::prelude::Rect,
    Frame,
};

use super::manage::ManageScreenController;
use crate::{
    backend::{
        deployment::{DeploymentBanner, DeploymentForm, SharedDeploymentSession},
        AppState, BackendEvent, DeploymentTask, Task,
    },
    ui::{
        form::{
            ComposedInput, Field, FormController, FormStatus, Input, InputStatus, Optional,
            TextInput,
        },
        screen::{
            utils::impl_builder, widgets::info::Info, ScreenCommandKey, ScreenController,
            ScreenFeedback,
        },
    },
    Event,
};

const ERROR_BANNER: &str = "Error encountered. Check console for details.";

const DEPLOYMENT_HELP: &str = r#"Deploying a Contract

The account this console is connected with becomes the owner of the deployed
supply chain contract. The owner cannot be the farmer, distributor or retailer.

The contract is initialized with one farmer, one distributor and one retailer.
Gas and gas price are optional, defaults are 5000000 and 90000000000. Adjust
them only if the defaults do not work.

Roles

Owner: adds farmers, distributors and retailers, may kill the contract.
Farmer: harvests a product (origin farm name, information, latitude, longitude
and product name), processes, packs and adds it to a palette.
Distributor: buys a palette and ships it to a retailer.
Retailer: receives a palette and initializes a sale to a consumer, granting
the consumer role.
Consumer: buys a product.

You must have access to the farmer, distributor and retailer addresses to use
their role based actions."#;

#[memoize::memoize]
fn join_commands(submitting: bool, deployed: bool) -> &'static [ScreenCommandKey] {
    let mut commands = vec![ScreenCommandKey::new("q", "Back to management")];

    if submitting {
        commands.push(ScreenCommandKey::new("d", "Deploying..."));
    } else {
        commands.push(ScreenCommandKey::new("d", "Deploy contract"));
    }

    if deployed {
        commands.push(ScreenCommandKey::new("s", "Save address to local storage"));
        commands.push(ScreenCommandKey::new("c", "Save contract to local storage"));
    }

    commands.leak()
}

pub(crate) struct DeployScreenController {
    info: Info,
    session: SharedDeploymentSession,
    contract_abi: String,
    notice: Option<Result<String, String>>,
}

impl_builder!(DeployScreenController);

impl DeployScreenController {
    pub(crate) fn new(app_state: &AppState) -> Self {
        let mut controller = DeployScreenController {
            info: Info::new_fixed(""),
            session: app_state.deployment().clone(),
            contract_abi: app_state.contract_abi.clone(),
            notice: None,
        };
        controller.refresh_info();
        controller
    }

    fn refresh_info(&mut self) {
        let session = self.session.get();
        let mut text = String::new();

        if session.is_submitting() {
            text.push_str("Deploying...\n\n");
        }
        match session.banner() {
            Some(DeploymentBanner::Success(address)) => text.push_str(&format!(
                "Contract was successfully deployed at address: {address}\n\n"
            )),
            Some(DeploymentBanner::Error) => text.push_str(&format!("{ERROR_BANNER}\n\n")),
            None => {}
        }
        match &self.notice {
            Some(Ok(notice)) | Some(Err(notice)) => text.push_str(&format!("{notice}\n\n")),
            None => {}
        }
        text.push_str(DEPLOYMENT_HELP);
        text.push_str("\n\nSupply chain contract ABI\n\n");
        text.push_str(&self.contract_abi);

        self.info = match (session.banner(), &self.notice) {
            (Some(DeploymentBanner::Error), _) | (_, Some(Err(_))) => Info::new_error(&text),
            (Some(DeploymentBanner::Success(_)), _) => Info::new_success(&text),
            _ => Info::new_scrollable(&text),
        };
    }
}

impl ScreenController for DeployScreenController {
    fn view(&mut self, frame: &mut Frame, area: Rect) {
        self.info.view(frame, area)
    }

    fn name(&self) -> &'static str {
        "Deployment"
    }

    fn command_keys(&self) -> &[ScreenCommandKey] {
        let session = self.session.get();
        join_commands(session.is_submitting(), session.address().is_some())
    }

    fn on_event(&mut self, event: Event) -> ScreenFeedback {
        match event {
            Event::Key(KeyEvent {
                code: Key::Char('q'),
                modifiers: KeyModifiers::NONE,
            }) => ScreenFeedback::PreviousScreen(ManageScreenController::builder()),

            Event::Key(KeyEvent {
                code: Key::Char('d'),
                modifiers: KeyModifiers::NONE,
            }) if !self.session.get().is_submitting() => {
                ScreenFeedback::Form(Box::new(DeployFormController::new()))
            }

            Event::Key(KeyEvent {
                code: Key::Char('s'),
                modifiers: KeyModifiers::NONE,
            }) => match self.session.get().address() {
                Some(address) => ScreenFeedback::Task {
                    task: Task::Deployment(DeploymentTask::SaveAddress(address)),
                    block: true,
                },
                None => ScreenFeedback::None,
            },

            Event::Key(KeyEvent {
                code: Key::Char('c'),
                modifiers: KeyModifiers::NONE,
            }) => match self.session.get().address() {
                Some(address) => ScreenFeedback::Task {
                    task: Task::Deployment(DeploymentTask::SaveContract(address)),
                    block: true,
                },
                None => ScreenFeedback::None,
            },

            Event::Key(key_event) => {
                if self.info.on_event(key_event) {
                    ScreenFeedback::Redraw
                } else {
                    ScreenFeedback::None
                }
            }

            // The backend has already recorded the outcome in the shared session
            Event::Backend(BackendEvent::TaskCompletedStateChange {
                task: Task::Deployment(DeploymentTask::Deploy(_)),
                ..
            })
            | Event::Backend(BackendEvent::TaskCompleted {
                task: Task::Deployment(DeploymentTask::Deploy(_)),
                ..
            }) => {
                self.refresh_info();
                ScreenFeedback::Redraw
            }

            Event::Backend(BackendEvent::TaskCompleted {
                task: Task::Deployment(_),
                execution_result,
            }) => {
                self.notice = Some(execution_result);
                self.refresh_info();
                ScreenFeedback::Redraw
            }

            _ => ScreenFeedback::None,
        }
    }

    fn accept_task(&mut self, task: &Task) -> bool {
        match task {
            Task::Deployment(DeploymentTask::Deploy(_)) => {
                if !self.session.begin_submit() {
                    return false;
                }
                self.notice = None;
                self.refresh_info();
                true
            }
            _ => true,
        }
    }
}

struct DeployFormController {
    input: ComposedInput<(
        Field<TextInput<String>>,
        Field<TextInput<String>>,
        Field<TextInput<String>>,
        Field<TextInput<Optional<u64>>>,
        Field<TextInput<Optional<String>>>,
    )>,
}

impl DeployFormController {
    fn new() -> Self {
        DeployFormController {
            input: ComposedInput::new((
                Field::new(
                    "Farmer ID",
                    TextInput::new("Enter originFarmerID (initialFarmer)"),
                ),
                Field::new(
                    "Distributor ID",
                    TextInput::new("Enter distributorID (initialDistributor)"),
                ),
                Field::new(
                    "Retailer ID",
                    TextInput::new("Enter retailerID (initialRetailer)"),
                ),
                Field::new("Gas", TextInput::new("Optional gas (default 5000000)")),
                Field::new(
                    "Gas price",
                    TextInput::new("Optional gas price (default 90000000000)"),
                ),
            )),
        }
    }
}

impl FormController for DeployFormController {
    fn on_event(&mut self, event: KeyEvent) -> FormStatus {
        match self.input.on_event(event) {
            InputStatus::Done((
                farmer_id,
                distributor_id,
                retailer_id,
                Optional(gas),
                Optional(gas_price),
            )) => FormStatus::Done {
                task: Task::Deployment(DeploymentTask::Deploy(DeploymentForm {
                    farmer_id,
                    distributor_id,
                    retailer_id,
                    gas,
                    gas_price,
                })),
                block: false,
            },
            status => status.into(),
        }
    }

    fn form_name(&self) -> &'static str {
        "Deploy a supply chain contract"
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
    use alloy_primitives::Address;

    use super::*;

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(Key::Char(c), KeyModifiers::NONE))
    }

    fn deploy_task() -> Task {
        Task::Deployment(DeploymentTask::Deploy(DeploymentForm::default()))
    }

    fn descriptions(controller: &DeployScreenController) -> Vec<&'static str> {
        controller
            .command_keys()
            .iter()
            .map(|key| key.description)
            .collect()
    }

    #[test]
    fn guard_holds_across_screen_instances() {
        let state = AppState::new(Address::ZERO, "[]".to_owned());

        let mut first = DeployScreenController::new(&state);
        assert!(first.accept_task(&deploy_task()));

        // Navigating away and back builds a new controller
        let mut second = DeployScreenController::new(&state);
        assert!(!second.accept_task(&deploy_task()));
        assert!(descriptions(&second).contains(&"Deploying..."));
        assert!(matches!(second.on_event(key('d')), ScreenFeedback::None));
    }

    #[test]
    fn failure_reenables_deploy() {
        let state = AppState::new(Address::ZERO, "[]".to_owned());
        let mut screen = DeployScreenController::new(&state);
        assert!(screen.accept_task(&deploy_task()));

        state.deployment().fail();
        let feedback = screen.on_event(Event::Backend(BackendEvent::TaskCompleted {
            task: deploy_task(),
            execution_result: Err("transaction reverted".to_owned()),
        }));

        assert!(matches!(feedback, ScreenFeedback::Redraw));
        assert!(descriptions(&screen).contains(&"Deploy contract"));
        assert!(!descriptions(&screen).contains(&"Save address to local storage"));
        assert!(matches!(screen.on_event(key('d')), ScreenFeedback::Form(_)));
        assert!(screen.accept_task(&deploy_task()));
    }

    #[test]
    fn rebuilt_screen_keeps_deployed_address() {
        let address = Address::repeat_byte(0xde);
        let mut state = AppState::new(Address::ZERO, "[]".to_owned());
        state.set_deployed_address(address);

        let mut screen = DeployScreenController::new(&state);

        assert!(descriptions(&screen).contains(&"Save address to local storage"));
        assert!(matches!(
            screen.on_event(key('s')),
            ScreenFeedback::Task {
                task: Task::Deployment(DeploymentTask::SaveAddress(saved)),
                block: true,
            } if saved == address
        ));
        assert!(matches!(
            screen.on_event(key('c')),
            ScreenFeedback::Task {
                task: Task::Deployment(DeploymentTask::SaveContract(saved)),
                block: true,
            } if saved == address
        ));
    }

    #[test]
    fn nothing_to_save_before_deployment() {
        let state = AppState::new(Address::ZERO, "[]".to_owned());
        let mut screen = DeployScreenController::new(&state);

        assert!(matches!(screen.on_event(key('s')), ScreenFeedback::None));
        assert!(matches!(screen.on_event(key('c')), ScreenFeedback::None));
    }
}
