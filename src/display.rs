//! Terminal rendering of the current ticker view

use tokio::sync::watch;
use tracing::debug;

use crate::core::{Direction, DisplayConfig, Result};
use crate::engine::ViewState;

const NOTICE: &str = "Sorry! We could not maintain a connection with the server.\n\
Restart tickwatch to try again. If this error continues, please contact support.";

fn glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "▲",
        Direction::Down => "▼",
        Direction::Unchanged => "·",
    }
}

/// Render the view as a fixed-width table. Pure function, no I/O.
pub fn render_table(state: &ViewState) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<10} {:>12}  {:<3} {:>8}\n",
        "SYMBOL", "PRICE", "", "UPDATED"
    ));

    for row in &state.rows {
        out.push_str(&format!(
            "{:<10} {:>12.2}  {:<3} {:>8}\n",
            row.symbol.as_str(),
            row.price,
            glyph(row.direction),
            row.updated_at.format("%H:%M:%S"),
        ));
    }

    if let Some(reason) = &state.feed_notice {
        out.push('\n');
        out.push_str(NOTICE);
        out.push_str(&format!("\n({})\n", reason));
    }

    out
}

/// Redraw on every published view until the engine goes away.
pub async fn run_display(
    mut snapshots: watch::Receiver<ViewState>,
    config: DisplayConfig,
) -> Result<()> {
    while snapshots.changed().await.is_ok() {
        let state = snapshots.borrow_and_update().clone();

        if config.clear_screen {
            // ANSI clear + home
            print!("\x1b[2J\x1b[H");
        }
        print!("{}", render_table(&state));

        if state.feed_notice.is_some() {
            debug!("Feed is down, display frozen on last view");
        }
    }

    Ok(())
}
