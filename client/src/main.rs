use clap::Parser;
use client::config::ClientConfig;
use client::error::NetworkError;
use client::game::GameSnapshot;
use client::input::{InputEvents, InputManager};
use client::rendering::{GameView, Renderer, SoundBank};
use client::retry::RetryPolicy;
use client::session::Session;
use log::{error, info};
use macroquad::prelude::{is_quit_requested, next_frame, prevent_quit};
use macroquad::window::Conf;
use shared::{
    Command, DEFAULT_HOST, DEFAULT_PORT, READ_TIMEOUT_MS, RETRY_DELAY_MS, WORLD_HEIGHT,
    WORLD_WIDTH, WRITE_TIMEOUT_MS,
};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server host to connect to (no short -h, it belongs to --help)
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Socket read timeout in milliseconds
    #[arg(long, default_value_t = READ_TIMEOUT_MS)]
    read_timeout_ms: u64,

    /// Give up on sending a command after this many milliseconds
    #[arg(long, default_value_t = WRITE_TIMEOUT_MS)]
    write_timeout_ms: u64,

    /// Delay between connection attempts in milliseconds
    #[arg(long, default_value_t = RETRY_DELAY_MS)]
    retry_delay_ms: u64,

    /// Stop after this many connection attempts instead of retrying forever
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Terminate commands with a newline (must match the server)
    #[arg(long)]
    newline: bool,
}

impl Args {
    fn config(&self) -> ClientConfig {
        let delay = Duration::from_millis(self.retry_delay_ms);
        let retry = match self.max_attempts {
            Some(attempts) => RetryPolicy::limited(delay, attempts),
            None => RetryPolicy::forever(delay),
        };

        ClientConfig::new(self.host.clone(), self.port)
            .with_read_timeout(Duration::from_millis(self.read_timeout_ms))
            .with_write_timeout(Duration::from_millis(self.write_timeout_ms))
            .with_retry(retry)
            .with_append_newline(self.newline)
    }
}

enum Screen {
    Menu,
    Connecting(JoinHandle<Result<Session, NetworkError>>),
    Playing(Session),
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Ping-Pong".to_owned(),
        window_width: WORLD_WIDTH as i32,
        window_height: WORLD_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let config = args.config();

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            return;
        }
    };

    info!("Server: {}", config.address());
    info!("Controls: W/S or Up/Down to move, R to restart, Esc for menu");

    prevent_quit();
    let sounds = SoundBank::load().await;
    let mut renderer = Renderer::new(WORLD_WIDTH as usize, WORLD_HEIGHT as usize);
    let mut input = InputManager::new();
    let mut screen = Screen::Menu;

    loop {
        let events = input.update();
        let mut quit = is_quit_requested();

        screen = match screen {
            Screen::Menu => {
                renderer.draw_menu();
                if events.back {
                    quit = true;
                    Screen::Menu
                } else if events.confirm {
                    info!("Starting game");
                    Screen::Connecting(runtime.spawn(Session::start(config.clone())))
                } else {
                    Screen::Menu
                }
            }

            Screen::Connecting(task) => {
                if task.is_finished() {
                    match runtime.block_on(task) {
                        Ok(Ok(session)) if events.back => {
                            info!("Connection attempt cancelled");
                            runtime.block_on(session.shutdown());
                            Screen::Menu
                        }
                        Ok(Ok(session)) => Screen::Playing(session),
                        Ok(Err(e)) => {
                            error!("Could not connect: {}", e);
                            Screen::Menu
                        }
                        Err(e) => {
                            error!("Connect task failed: {}", e);
                            Screen::Menu
                        }
                    }
                } else if events.back {
                    info!("Connection attempt cancelled");
                    task.abort();
                    Screen::Menu
                } else {
                    renderer.draw_connecting(&config.address());
                    Screen::Connecting(task)
                }
            }

            Screen::Playing(session) => {
                if events.back {
                    runtime.block_on(session.shutdown());
                    Screen::Menu
                } else {
                    let snapshot = runtime.block_on(session.snapshot().read());
                    renderer.render(&snapshot, session.player_id());
                    handle_game_input(&runtime, &session, &snapshot, &events, &sounds);
                    Screen::Playing(session)
                }
            }
        };

        if quit {
            break;
        }
        next_frame().await;
    }

    match screen {
        Screen::Playing(session) => {
            runtime.block_on(session.shutdown());
        }
        Screen::Connecting(task) => task.abort(),
        Screen::Menu => {}
    }
}

/// Sends this frame's commands and plays the pending sound event.
fn handle_game_input(
    runtime: &Runtime,
    session: &Session,
    snapshot: &GameSnapshot,
    events: &InputEvents,
    sounds: &SoundBank,
) {
    if events.restart && snapshot.winner.is_some() {
        let _ = runtime.block_on(session.send(Command::Restart));
    }

    match GameView::of(snapshot) {
        GameView::Playing => {
            if let Some(event) = runtime.block_on(session.snapshot().take_sound_event()) {
                sounds.play(&event);
            }
        }
        GameView::Waiting if snapshot.disconnected => return,
        GameView::Waiting => {}
        GameView::Countdown | GameView::Winner => return,
    }

    if let Some(command) = events.movement {
        let _ = runtime.block_on(session.send(command));
    }
}
