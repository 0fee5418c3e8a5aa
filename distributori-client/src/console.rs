use std::fmt::Write;
use std::sync::Arc;

use crate::command::{Command, HELP_TEXT};
use crate::map::{MapSurface, MarkerSet};
use crate::notify::Notice;
use crate::session::{Refresh, Session};

/// What the console loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Handle one console line. Local commands answer right away; operations
/// that hit the API run as their own task, so slow requests never block the
/// prompt and concurrent ones race as they would in a browser.
pub async fn dispatch<M: MapSurface>(session: &Arc<Session<M>>, line: &str) -> Flow {
    if line.trim().is_empty() {
        return Flow::Continue;
    }

    match Command::parse(line) {
        Command::Quit => return Flow::Quit,
        Command::Help => println!("{}", HELP_TEXT),
        Command::Markers => println!("{}", session.with_markers(describe_markers).await),
        Command::Invalid(reason) => session.notify(Notice::error(reason)),
        command => {
            let session = session.clone();
            tokio::spawn(async move {
                execute(&session, command).await;
            });
        }
    }
    Flow::Continue
}

/// Run an API-backed command. Failures have already been shown to the user
/// by the session, so only successful renders are echoed here.
pub async fn execute<M: MapSurface>(session: &Session<M>, command: Command) {
    let refresh = match command {
        Command::Load => session.load_all().await.ok(),
        Command::Search(text) => session.search(&text).await.ok(),
        Command::Add(form) => {
            let _ = session.create_distributor(&form).await;
            None
        }
        Command::Prices {
            provincia,
            benzina,
            diesel,
        } => {
            let _ = session
                .update_prices_for_province(&provincia, benzina, diesel)
                .await;
            None
        }
        other => {
            tracing::debug!("Command {:?} has no remote side", other);
            None
        }
    };

    if let Some(Refresh { rendered: true, .. }) = refresh {
        println!("{}", session.with_markers(describe_markers).await);
    }
}

/// One line per marker plus the current view.
pub fn describe_markers<M: MapSurface>(set: &MarkerSet<M>) -> String {
    let viewport = set.viewport();
    let mut out = format!(
        "{} distributor(s) on the map, view ({:.4}, {:.4}) zoom {}",
        set.len(),
        viewport.center.lat,
        viewport.center.lon,
        viewport.zoom
    );
    for marker in set.markers() {
        let d = marker.record();
        let _ = write!(
            out,
            "\n  #{} {} ({}) at ({}, {}) benzina €{:.2} diesel €{:.2}",
            d.id, d.citta, d.provincia, d.lat, d.lon, d.prezzo_benzina, d.prezzo_diesel
        );
    }
    out
}
