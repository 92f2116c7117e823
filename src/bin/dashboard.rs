// Console dashboard - Pick a waterjet and date, watch its fault probability
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use waterjet_monitor::application::dashboard_machine::Event;
use waterjet_monitor::application::dashboard_session::DashboardSession;
use waterjet_monitor::infrastructure::config::load_dashboard_config;
use waterjet_monitor::infrastructure::dashboard_client::HttpDashboardApi;
use waterjet_monitor::infrastructure::logging::init_tracing;
use waterjet_monitor::presentation::console::{Command, HELP, parse_command, render};
use waterjet_monitor::presentation::view_state::DashboardView;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_dashboard_config()?;
    let offset = config.display.offset()?;
    let api = HttpDashboardApi::new(&config.api.base_url)?;
    tracing::info!("Using dashboard API at {}", config.api.base_url);

    let mut session = DashboardSession::new(Arc::new(api), offset, config.api.timeout());
    let (quit_tx, mut quit_rx) = oneshot::channel();
    tokio::spawn(read_commands(session.sender(), quit_tx));

    println!("{}", HELP);
    session.dispatch(Event::Activated);
    print_view(&session);

    loop {
        let progressed = tokio::select! {
            progressed = session.next() => progressed,
            _ = &mut quit_rx => false,
        };
        if !progressed {
            break;
        }
        print_view(&session);
    }

    Ok(())
}

fn print_view(session: &DashboardSession) {
    println!("\n{}", render(&DashboardView::from_state(session.state())));
}

/// Forward stdin commands to the session until `quit` or end of input.
async fn read_commands(events: mpsc::UnboundedSender<Event>, quit: oneshot::Sender<()>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Ok(Command::Dispatch(event)) => {
                    if events.send(event).is_err() {
                        break;
                    }
                }
                Ok(Command::Help) => println!("{}", HELP),
                Ok(Command::Quit) => break,
                Err(message) => println!("{}", message),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        }
    }
    let _ = quit.send(());
}
