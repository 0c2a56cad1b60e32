use winit::event_loop::{ControlFlow, EventLoop};

use nocturne::theme::Theme;
use nocturne::window::App;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Optional theme argument overrides the stored preference for this run.
    let theme = std::env::args().nth(1);
    if let Some(name) = &theme {
        if Theme::lookup(name).is_err() {
            eprintln!(
                "unknown theme '{}'; available: {}",
                name,
                Theme::names().join(", ")
            );
            std::process::exit(2);
        }
    }

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(theme);
    event_loop.run_app(&mut app).unwrap();
}
