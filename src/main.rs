mod console;
#[cfg(feature = "gui")]
mod ui;

use bark_translator::config::Config;

fn main() {
    env_logger::init();
    log::info!("BarkGPT starting");

    let config = Config::load();
    log::debug!("Config: {config:?}");

    let console_requested = std::env::args().skip(1).any(|arg| arg == "--console");

    #[cfg(feature = "gui")]
    if !console_requested {
        ui::run(config);
        return;
    }

    #[cfg(not(feature = "gui"))]
    if !console_requested {
        log::info!("Built without the gui feature, using the console front end");
    }
    console::run(config);
}
