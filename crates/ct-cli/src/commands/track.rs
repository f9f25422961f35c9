//! Foreground tracking session.
//!
//! Host triggers (the periodic timer, stdin control lines) are messages
//! on a channel drained by a single consumer loop, so the engine is
//! only ever touched from one logical thread. Every tick prints the
//! status line, saves the month document, and refreshes the overview.

use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, Utc};

use ct_core::{Overview, SessionContext, Tracker};
use ct_store::{JsonStore, MonthKey, Store, StoreError};

/// A host trigger delivered to the session loop.
#[derive(Debug, PartialEq, Eq)]
enum HostEvent {
    /// The periodic timer fired.
    Tick,
    /// The active language changed (`None`: could not be determined).
    LanguageChanged(Option<String>),
    /// Explicit save request.
    Save,
    /// End the session, saving first.
    Quit,
}

pub fn run(
    store: &JsonStore,
    project: Option<String>,
    language: Option<String>,
    interval: Duration,
) -> Result<()> {
    let today = Local::now().date_naive();
    let month_key = MonthKey::for_date(today);

    let prior = if store.month_exists(month_key) {
        Some(store.load_month(month_key, "session startup")?)
    } else {
        None
    };

    let context = SessionContext::from_host(project, language);
    let mut tracker = Tracker::new(context, prior, today, Utc::now());

    // Seed the on-disk document so a fresh month exists from the start.
    persist(store, &mut tracker, month_key, "session startup")
        .context("failed to write the initial month document")?;

    println!(
        "tracking project {} in {} (saving every {}s)",
        tracker.active_project(),
        tracker.active_language(),
        interval.as_secs()
    );
    println!("commands: lang <id>, save, quit");

    let (sender, receiver) = mpsc::channel();
    spawn_ticker(sender.clone(), interval);
    spawn_stdin_reader(sender);

    loop {
        match receiver.recv().context("session event channel closed")? {
            HostEvent::Tick => {
                println!("{}", tracker.formatted_today(Utc::now()));
                if let Err(error) = persist(store, &mut tracker, month_key, "periodic save") {
                    // Today's increment may be lost; the next cycle
                    // rewrites the full document.
                    tracing::warn!(%error, "periodic save failed");
                }
            }
            HostEvent::LanguageChanged(language) => {
                tracker.language_changed(language.as_deref(), Utc::now());
                println!("now tracking {}", tracker.active_language());
            }
            HostEvent::Save => {
                persist(store, &mut tracker, month_key, "save command")
                    .context("explicit save failed")?;
                println!("saved");
            }
            HostEvent::Quit => {
                persist(store, &mut tracker, month_key, "session shutdown")
                    .context("final save failed")?;
                break;
            }
        }
    }

    Ok(())
}

/// Saves the month document, then recomputes and saves the overview
/// entry for the session's day.
fn persist(
    store: &JsonStore,
    tracker: &mut Tracker,
    key: MonthKey,
    context: &'static str,
) -> Result<(), StoreError> {
    let now = Utc::now();
    store.save_month(key, tracker.snapshot(now), context)?;

    let mut overview = if store.overview_exists() {
        store.load_overview(context)?
    } else {
        Overview::default()
    };
    let hours = tracker.hours_today(now);
    overview.record(tracker.active_date(), hours);
    store.save_overview(&overview, context)
}

fn spawn_ticker(sender: mpsc::Sender<HostEvent>, interval: Duration) {
    thread::spawn(move || {
        loop {
            thread::sleep(interval);
            if sender.send(HostEvent::Tick).is_err() {
                return;
            }
        }
    });
}

fn spawn_stdin_reader(sender: mpsc::Sender<HostEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_command(line) {
                Some(event) => {
                    let quit = matches!(event, HostEvent::Quit);
                    if sender.send(event).is_err() || quit {
                        return;
                    }
                }
                None => eprintln!("commands: lang <id>, save, quit"),
            }
        }
        // stdin closed: end the session cleanly.
        let _ = sender.send(HostEvent::Quit);
    });
}

/// Parses a control line typed into the session.
fn parse_command(line: &str) -> Option<HostEvent> {
    match line.split_once(char::is_whitespace) {
        Some(("lang", id)) => {
            let id = id.trim();
            Some(HostEvent::LanguageChanged(
                (!id.is_empty()).then(|| id.to_string()),
            ))
        }
        Some(_) => None,
        None => match line {
            "lang" => Some(HostEvent::LanguageChanged(None)),
            "save" => Some(HostEvent::Save),
            "quit" => Some(HostEvent::Quit),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_recognizes_controls() {
        assert_eq!(parse_command("save"), Some(HostEvent::Save));
        assert_eq!(parse_command("quit"), Some(HostEvent::Quit));
        assert_eq!(
            parse_command("lang rust"),
            Some(HostEvent::LanguageChanged(Some("rust".to_string())))
        );
        // A bare `lang` is the could-not-determine case.
        assert_eq!(parse_command("lang"), Some(HostEvent::LanguageChanged(None)));
        assert_eq!(parse_command("lang   "), Some(HostEvent::LanguageChanged(None)));
        assert_eq!(parse_command("unknown"), None);
        assert_eq!(parse_command("saved again"), None);
    }

    #[test]
    fn persist_writes_month_and_single_overview_entry() {
        let temp = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp.path());

        let today = Local::now().date_naive();
        let key = MonthKey::for_date(today);
        let mut tracker = Tracker::new(
            SessionContext::new("ct", "rust"),
            None,
            today,
            Utc::now(),
        );

        persist(&store, &mut tracker, key, "test").unwrap();
        assert!(store.month_exists(key));

        // Exporting the same day again replaces, never appends.
        persist(&store, &mut tracker, key, "test").unwrap();
        let overview = store.load_overview("test").unwrap();
        assert_eq!(overview.len(), 1);
        assert_eq!(overview.entries()[0].0, tracker.active_date());
    }
}
