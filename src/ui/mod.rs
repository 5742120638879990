mod window;

use gtk4::glib;
use gtk4::prelude::*;

use bark_translator::app::{AppEvent, Controller};
use bark_translator::config::Config;
use bark_translator::random::ThreadRandom;
use bark_translator::scheduler::TokioScheduler;
use bark_translator::speech::CommandSpeech;

/// Run the GTK front end until the window closes.
pub fn run(config: Config) {
    let application = libadwaita::Application::builder()
        .application_id("com.github.barkgpt.bark-translator")
        .build();

    application.connect_activate(move |app| on_activate(app, &config));
    // Command-line flags are ours, not GTK's.
    application.run_with_args::<&str>(&[]);
}

fn on_activate(app: &libadwaita::Application, config: &Config) {
    let tokio_rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to create tokio runtime: {e}");
            return;
        }
    };

    // Gestures and timer firings share one channel into the main thread.
    let (sender, receiver) = async_channel::unbounded::<AppEvent>();

    let widgets = window::build_window(app, sender.clone());
    let scheduler = TokioScheduler::new(tokio_rt.handle().clone(), sender);
    let speech = CommandSpeech::new(&config.speech, tokio_rt.handle().clone());
    let mut controller = Controller::new(
        config,
        Box::new(scheduler),
        Box::new(ThreadRandom),
        Box::new(speech),
    );

    window::render(&widgets, controller.state());
    widgets.window.present();

    glib::spawn_future_local(async move {
        while let Ok(event) = receiver.recv().await {
            if controller.handle_event(event) {
                window::render(&widgets, controller.state());
            }
            if event == AppEvent::Shutdown {
                break;
            }
        }
        drop(controller);
        tokio_rt.shutdown_background();
        log::info!("Translator window closed");
    });
}
