use std::{fs::File, panic, sync::Arc};

use clap::Parser;
use crossterm::event::{Event as TerminalEvent, EventStream, KeyEventKind};
use futures::{select, stream::FuturesUnordered, FutureExt, StreamExt};
use supply_chain_tui::{
    backend::{client::RpcContractClient, Backend, ContractArtifact, LocalStorage},
    config::Config,
    ui::{routes::Route, Ui, UiFeedback},
    Event,
};
use tracing_subscriber::EnvFilter;
use tuirealm::terminal::TerminalBridge;

#[derive(Parser, Debug)]
#[command(version, about = "Deploy and manage supply chain contracts")]
struct Args {
    #[arg(
        short,
        long,
        default_value = "/",
        help = "Start route, `/init` opens the deployment screen"
    )]
    path: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logger, the terminal belongs to the UI
    let log_file = File::create("supply-chain.log").expect("create log file");

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    // Log panics
    let default_panic_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown");

        let location = panic_info
            .location()
            .unwrap_or_else(|| panic::Location::caller());

        tracing::error!(%location, "Panic occurred: {}", message);

        default_panic_hook(panic_info);
    }));

    // Load configuration
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(?err, "cannot start without configuration");
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    // Setup backend
    let client = RpcContractClient::new(&config.rpc_url, &config.private_key)
        .expect("cannot setup contract client");
    let artifact = ContractArtifact::load(&config.artifact_path).expect("cannot load artifact");
    let storage = LocalStorage::open(&config.storage_path).expect("cannot open local storage");

    tracing::info!(wiring = %config.wiring, path = %args.path, "starting");

    let backend = Backend::new(Arc::new(client), artifact, storage, config.wiring);

    // Setup UI
    let route = Route::from_path(&args.path);
    let mut ui = Ui::new(&backend.state(), route);

    let mut terminal = TerminalBridge::new().expect("cannot initialize terminal");
    terminal
        .enter_alternate_screen()
        .expect("cannot enter alternate screen");
    terminal.enable_raw_mode().expect("cannot enable raw mode");

    let mut terminal_events = EventStream::new().fuse();
    let mut backend_tasks = FuturesUnordered::new();

    let mut feedback = ui.mount();

    loop {
        match feedback {
            UiFeedback::Quit => break,
            UiFeedback::ExecuteTask { task, block } => {
                backend_tasks.push(backend.run_task(task).map(move |event| (block, event)));
                redraw(&mut terminal, &mut ui);
            }
            UiFeedback::Redraw => redraw(&mut terminal, &mut ui),
            UiFeedback::None => {}
        }

        let event = select! {
            terminal_event = terminal_events.select_next_some() => match terminal_event {
                Ok(TerminalEvent::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                    Some(Event::Key(key_event.into()))
                }
                Ok(TerminalEvent::Resize(..)) => {
                    redraw(&mut terminal, &mut ui);
                    None
                }
                Ok(_) => None,
                Err(err) => {
                    tracing::error!(?err, "terminal event error");
                    None
                }
            },
            (block, backend_event) = backend_tasks.select_next_some() => {
                if block {
                    ui.unblock();
                }
                Some(Event::Backend(backend_event))
            },
            complete => break,
        };

        feedback = match event {
            Some(event) => ui.on_event(&backend.state(), event),
            None => UiFeedback::None,
        };
    }

    let _ = terminal.leave_alternate_screen();
    let _ = terminal.disable_raw_mode();
    let _ = terminal.clear_screen();
}

fn redraw(terminal: &mut TerminalBridge, ui: &mut Ui) {
    if let Err(err) = terminal.raw_mut().draw(|frame| ui.view(frame)) {
        tracing::error!(?err, "failed to draw");
    }
}
