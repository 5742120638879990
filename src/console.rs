use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use bark_translator::app::{AppEvent, Controller, Phase, SessionState};
use bark_translator::config::Config;
use bark_translator::random::ThreadRandom;
use bark_translator::scheduler::TokioScheduler;
use bark_translator::speech::CommandSpeech;

const HELP: &str = "\
Commands:
  click        tap the record button (start / stop)
  hold <ms>    press the record button, hold for <ms>, release
  down | up    press / release the record button
  stop         press \"Stop Recording\"
  speak        read the translation aloud
  new          generate a new translation
  help         show this message
  quit         exit";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Events(Vec<AppEvent>),
    Hold(Duration),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(Command::Events(vec![AppEvent::Click]));
    };
    let cmd = match word.to_ascii_lowercase().as_str() {
        "c" | "click" => Command::Events(vec![AppEvent::Click]),
        "d" | "down" => Command::Events(vec![AppEvent::PointerDown]),
        "u" | "up" => Command::Events(vec![AppEvent::PointerUp]),
        "s" | "stop" => Command::Events(vec![AppEvent::StopClicked]),
        "p" | "speak" => Command::Events(vec![AppEvent::SpeakClicked]),
        "n" | "new" => Command::Events(vec![AppEvent::GenerateNew]),
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "hold" => {
            let ms = parts
                .next()
                .ok_or("hold needs a duration in milliseconds")?
                .parse::<u64>()
                .map_err(|e| format!("bad duration: {e}"))?;
            Command::Hold(Duration::from_millis(ms))
        }
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(cmd)
}

/// Read commands from stdin and post the matching gestures.
async fn read_commands(sender: async_channel::Sender<AppEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::warn!("Failed to read stdin: {e}");
                break;
            }
        };
        let events = match parse_command(&line) {
            Ok(Command::Events(events)) => events,
            // down, wait, up, then the click a pointer release produces
            Ok(Command::Hold(duration)) => {
                if sender.send(AppEvent::PointerDown).await.is_err() {
                    return;
                }
                tokio::time::sleep(duration).await;
                vec![AppEvent::PointerUp, AppEvent::Click]
            }
            Ok(Command::Help) => {
                println!("{HELP}");
                continue;
            }
            Ok(Command::Quit) => break,
            Err(e) => {
                println!("{e} (try \"help\")");
                continue;
            }
        };
        for event in events {
            if sender.send(event).await.is_err() {
                return;
            }
        }
    }
    let _ = sender.send(AppEvent::Shutdown).await;
}

fn render(before: &SessionState, after: &SessionState) {
    let phase_changed = before.phase() != after.phase();
    match after.phase() {
        Phase::Recording => {
            print!("\r{}", after.recording_caption());
            let _ = std::io::stdout().flush();
        }
        Phase::Analyzing => {
            if phase_changed {
                println!();
            }
            let message = after.status_message();
            if !message.is_empty() && (message != before.status_message() || phase_changed) {
                println!("  {message}");
            }
        }
        Phase::Result => {
            println!(
                "\n  \"{}\"  [{}]\n",
                after.translation().unwrap_or_default(),
                after.personality().unwrap_or_default()
            );
        }
        Phase::Idle => println!("{}", after.recording_caption()),
    }
}

/// Run the translator against stdin until EOF or `quit`.
pub fn run(config: Config) {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to create tokio runtime: {e}");
            return;
        }
    };
    let (sender, receiver) = async_channel::unbounded::<AppEvent>();

    let scheduler = TokioScheduler::new(rt.handle().clone(), sender.clone());
    let speech = CommandSpeech::new(&config.speech, rt.handle().clone());
    let mut controller = Controller::new(
        &config,
        Box::new(scheduler),
        Box::new(ThreadRandom),
        Box::new(speech),
    );

    println!("BarkGPT - the world's most accurate* dog translator");
    println!("*100% scientifically inaccurate\n");
    println!("{HELP}\n");

    rt.spawn(read_commands(sender));

    rt.block_on(async move {
        while let Ok(event) = receiver.recv().await {
            let before = controller.state().clone();
            if controller.handle_event(event) {
                render(&before, controller.state());
            }
            if event == AppEvent::Shutdown {
                break;
            }
        }
    });
    rt.shutdown_background();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_is_a_click() {
        assert_eq!(parse_command("  "), Ok(Command::Events(vec![AppEvent::Click])));
    }

    #[test]
    fn aliases() {
        assert_eq!(parse_command("S"), Ok(Command::Events(vec![AppEvent::StopClicked])));
        assert_eq!(parse_command("new"), Ok(Command::Events(vec![AppEvent::GenerateNew])));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn hold_parses_duration() {
        assert_eq!(
            parse_command("hold 600"),
            Ok(Command::Hold(Duration::from_millis(600)))
        );
        assert!(parse_command("hold").is_err());
        assert!(parse_command("hold soon").is_err());
    }

    #[test]
    fn unknown_word_is_an_error() {
        assert!(parse_command("bark").is_err());
    }
}
