//! Line-oriented phone console.
//!
//! Stands in for the phone UI: each input line is one command, parsed with
//! clap and executed against the shared [`SyncEngine`]. `click` and `tap`
//! drive the simulated glasses so the inbound path can be exercised by hand.
//!
//! While startup is running only read-only commands are accepted, matching
//! the disabled inputs on the phone during the splash.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use hubwire::{HubEvent, ListEvent};

use crate::bridge::simulator::{SimulatedBridge, render_page};
use crate::error::ErrorCode;
use crate::layout;
use crate::model::{CartList, ItemId};
use crate::sync::{SyncEngine, SyncOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "cart",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct ConsoleLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add an item to the end of the cart
    Add {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        name: Vec<String>,
    },
    /// Remove an item by id
    #[command(alias = "remove")]
    Rm { id: ItemId },
    /// Check or uncheck an item by id
    Toggle { id: ItemId },
    /// Remove every checked item
    Clear,
    /// Move the row at FROM to TO (zero-based)
    Move { from: usize, to: usize },
    /// Print the cart as the phone shows it
    #[command(alias = "ls")]
    List,
    /// Print what the simulated glasses are showing
    Show,
    /// Glasses connection, battery and startup phase
    Status,
    /// Simulate a glasses click on a row index
    #[command(allow_negative_numbers = true)]
    Click { index: i64 },
    /// Simulate a legacy click that carries only the row label
    Tap {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        label: Vec<String>,
    },
    /// Inject a raw hub event payload, e.g. {"listEvent":{"currentSelectItemIndex":0}}
    Event {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        json: Vec<String>,
    },
    /// Show this help
    Help,
    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

impl Command {
    /// Commands that never change the cart.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Help | Self::Quit | Self::Status | Self::Show)
    }
}

/// Parse one input line. A blank line is `Ok(None)`.
///
/// # Errors
///
/// Returns the clap error for unknown commands or bad arguments.
pub fn parse(line: &str) -> Result<Option<Command>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    ConsoleLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

#[must_use]
pub fn help_text() -> String {
    ConsoleLine::command().render_help().to_string()
}

pub struct Console {
    engine: Arc<SyncEngine>,
    simulator: Option<SimulatedBridge>,
}

impl Console {
    #[must_use]
    pub fn new(engine: Arc<SyncEngine>, simulator: Option<SimulatedBridge>) -> Self {
        Self { engine, simulator }
    }

    pub async fn prompt(&self) -> &'static str {
        if self.engine.is_live().await { "cart> " } else { "cart (starting, input disabled)> " }
    }

    /// Run one command and return the text to print.
    pub async fn execute(&self, command: Command) -> String {
        if !command.is_read_only() && !self.engine.is_live().await {
            return "input disabled until the glasses finish starting".to_owned();
        }

        match command {
            Command::Add { name } => describe(&self.engine.add(&name.join(" ")).await),
            Command::Rm { id } => match self.require_item(id).await {
                Some(missing) => missing,
                None => describe(&self.engine.remove(id).await),
            },
            Command::Toggle { id } => match self.require_item(id).await {
                Some(missing) => missing,
                None => describe(&self.engine.toggle(id).await),
            },
            Command::Clear => {
                if self.engine.snapshot().await.has_completed() {
                    describe(&self.engine.clear_completed().await)
                } else {
                    "nothing checked to clear".to_owned()
                }
            }
            Command::Move { from, to } => match self.engine.move_item(from, to).await {
                Ok(outcome) => describe(&outcome),
                Err(e) => e.to_string(),
            },
            Command::List => render_list(&self.engine.snapshot().await),
            Command::Show => match &self.simulator {
                Some(sim) => sim.last_page().map_or_else(|| "glasses are blank".to_owned(), |page| render_page(&page)),
                None => NO_SIMULATOR.to_owned(),
            },
            Command::Status => {
                let list = self.engine.snapshot().await;
                format!(
                    "glasses: {} | phase: {:?} | {}",
                    self.engine.device_status().await.badge(),
                    self.engine.phase().await,
                    list.summary()
                )
            }
            Command::Click { index } => self.emit(HubEvent::list_click(index)).await,
            Command::Tap { label } => {
                let event = HubEvent {
                    list_event: Some(ListEvent {
                        event_type: None,
                        current_select_item_index: None,
                        current_select_item_name: Some(label.join(" ")),
                    }),
                    ..HubEvent::default()
                };
                self.emit(event).await
            }
            Command::Event { json } => match &self.simulator {
                Some(sim) => match sim.emit_json(&json.join(" ")).await {
                    Ok(()) => "sent to glasses".to_owned(),
                    Err(e) => e.to_string(),
                },
                None => NO_SIMULATOR.to_owned(),
            },
            Command::Help => help_text(),
            Command::Quit => "bye".to_owned(),
        }
    }

    async fn require_item(&self, id: ItemId) -> Option<String> {
        let list = self.engine.snapshot().await;
        list.position(id).is_none().then(|| format!("no item with id {id}"))
    }

    async fn emit(&self, event: HubEvent) -> String {
        match &self.simulator {
            Some(sim) => {
                sim.emit(event).await;
                "sent to glasses".to_owned()
            }
            None => NO_SIMULATOR.to_owned(),
        }
    }
}

const NO_SIMULATOR: &str = "no simulated glasses attached";

fn describe(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Unchanged => "no change".to_owned(),
        SyncOutcome::LocalOnly => "saved locally (glasses not connected)".to_owned(),
        SyncOutcome::Synced { failures, .. } if failures.is_empty() => "synced to glasses".to_owned(),
        SyncOutcome::Synced { failures, .. } => {
            let reasons: Vec<String> = failures.iter().map(|e| format!("{} ({e})", e.error_code())).collect();
            format!("kept locally; sync incomplete: {}", reasons.join("; "))
        }
    }
}

/// The phone's list view: one row per item with its id, then the summary.
#[must_use]
pub fn render_list(list: &CartList) -> String {
    if list.is_empty() {
        return "cart is empty".to_owned();
    }
    let mut lines: Vec<String> =
        list.items().iter().map(|item| format!("{:>4}  {}", item.id, layout::row_label(item))).collect();
    lines.push(list.summary());
    lines.join("\n")
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
