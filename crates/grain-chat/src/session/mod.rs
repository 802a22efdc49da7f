//! # Client Session
//!
//! A cooperative read-evaluate loop over one [`ClusterClient`]. Each input line is parsed
//! into a [`Command`] and dispatched to the ChatRoom of the session's current channel or to
//! the singleton Ticker; the loop waits for the reply before it reads the next line.
//!
//! The session owns its connection and closes it on every exit path: `/exit`, end of
//! input, and console errors.

pub mod command;
pub mod error;
pub mod render;

pub use command::Command;
pub use error::SessionError;

use crate::chat_room::{ChatRoom, ChatRoomError};
use crate::clients::{ChatRoomClient, TickerClient};
use crate::model::ChatMessage;
use crate::ticker::{Ticker, TickerError, TICKER_ID};
use colored::Colorize;
use grain_framework::ClusterClient;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// What a session needs to know about its user and its workload.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub identity: String,
    pub default_channel: String,
    pub history_page: i64,
    pub batch_ticks: usize,
    pub units_per_tick: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            identity: "Alexey".to_string(),
            default_channel: "general".to_string(),
            history_page: 1000,
            batch_ticks: 100,
            units_per_tick: 10,
        }
    }
}

/// Outcome of one `/r` batch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchReport {
    pub attempts: usize,
    /// `(1-based tick number, error)` for every call that failed.
    pub failures: Vec<(usize, String)>,
    /// Work units that failed inside calls that otherwise succeeded.
    pub units_failed: u64,
}

/// Issues `ticks` sequential `Tick(units)` calls. A failed call is printed and the batch
/// moves on to the next one.
pub async fn run_batch<W: Write>(
    ticker: &TickerClient,
    ticks: usize,
    units: u32,
    out: &mut W,
) -> Result<BatchReport, SessionError> {
    let mut report = BatchReport::default();
    for tick in 1..=ticks {
        report.attempts += 1;
        match ticker.tick(units).await {
            Ok(result) => report.units_failed += u64::from(result.units_failed),
            Err(e) => {
                warn!(tick, error = %e, "Tick failed");
                writeln!(out, "{}", format!("Exception {}", e).red())?;
                report.failures.push((tick, e.to_string()));
            }
        }
    }
    info!(
        attempts = report.attempts,
        failed = report.failures.len(),
        units_failed = report.units_failed,
        "Task batch finished"
    );
    Ok(report)
}

enum Flow {
    Continue,
    Exit,
}

pub struct Session<W: Write> {
    client: ClusterClient,
    settings: SessionSettings,
    current_channel: String,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(client: ClusterClient, settings: SessionSettings, out: W) -> Self {
        let current_channel = settings.default_channel.clone();
        Self {
            client,
            settings,
            current_channel,
            out,
        }
    }

    pub fn current_channel(&self) -> &str {
        &self.current_channel
    }

    /// Runs the command loop until `/exit` or end of input, then closes the connection
    /// and hands back the output sink.
    pub async fn run<R>(mut self, input: R) -> Result<W, SessionError>
    where
        R: AsyncBufRead + Unpin,
    {
        let result = self.command_loop(input).await;
        self.client.close();
        let farewell = writeln!(self.out, "{}", "==== CLIENT: Shutting down ====".red());
        result?;
        farewell?;
        Ok(self.out)
    }

    async fn command_loop<R>(&mut self, input: R) -> Result<(), SessionError>
    where
        R: AsyncBufRead + Unpin,
    {
        writeln!(self.out, "{}", "==== CLIENT: Initialized ====".cyan())?;
        writeln!(self.out, "{}", "CLIENT: Write commands:".cyan())?;
        self.print_hints()?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(SessionError::Usage(usage)) => {
                    writeln!(self.out, "{}", format!("Usage: {}", usage).magenta())?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            if let Flow::Exit = self.execute(command).await? {
                return Ok(());
            }
        }
        info!("Input closed");
        Ok(())
    }

    fn print_hints(&mut self) -> Result<(), SessionError> {
        for hint in [
            "Type '/r' to run task",
            "Type '/j <channel>' to join specific channel",
            "Type '/l <channel>' to leave specific channel",
            "Type '<any text>' to send a message",
            "Type '/h' to re-read channel history",
            "Type '/exit' to exit client.",
        ] {
            writeln!(self.out, "{}", hint.magenta())?;
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<Flow, SessionError> {
        debug!(?command, channel = %self.current_channel, "Dispatching");
        match command {
            Command::Blank => {}
            Command::Exit => return Ok(Flow::Exit),
            Command::Join(channel) => self.join(channel).await?,
            Command::Leave(channel) => {
                let channel = channel.unwrap_or_else(|| self.current_channel.clone());
                self.leave(&channel).await?;
            }
            Command::History => self.show_history().await?,
            Command::RunTask => {
                match self.ticker() {
                    Ok(ticker) => {
                        run_batch(
                            &ticker,
                            self.settings.batch_ticks,
                            self.settings.units_per_tick,
                            &mut self.out,
                        )
                        .await?;
                    }
                    Err(e) => self.report(&e)?,
                }
            }
            Command::Message(text) => self.send_message(text).await?,
        }
        Ok(Flow::Continue)
    }

    fn room(&self, channel: &str) -> Result<ChatRoomClient, ChatRoomError> {
        self.client
            .get_grain::<ChatRoom>(channel.to_string())
            .map(ChatRoomClient::new)
            .map_err(ChatRoomError::from_invocation)
    }

    fn ticker(&self) -> Result<TickerClient, TickerError> {
        self.client
            .get_grain::<Ticker>(TICKER_ID)
            .map(TickerClient::new)
            .map_err(TickerError::from_invocation)
    }

    fn report(&mut self, error: &dyn std::error::Error) -> Result<(), SessionError> {
        warn!(error = %error, channel = %self.current_channel, "Command failed");
        writeln!(self.out, "{}", format!("Error: {}", error).red())?;
        Ok(())
    }

    async fn join(&mut self, channel: String) -> Result<(), SessionError> {
        writeln!(self.out, "Joining to channel {}", channel)?;
        self.current_channel = channel;
        let joined = match self.room(&self.current_channel) {
            Ok(room) => room.join(&self.settings.identity).await,
            Err(e) => Err(e),
        };
        if let Err(e) = joined {
            return self.report(&e);
        }
        self.show_history().await
    }

    async fn leave(&mut self, channel: &str) -> Result<(), SessionError> {
        writeln!(self.out, "Leaving channel {}", channel)?;
        let left = match self.room(channel) {
            Ok(room) => room.leave(&self.settings.identity).await,
            Err(e) => Err(e),
        };
        if let Err(e) = left {
            self.report(&e)?;
        }
        Ok(())
    }

    async fn send_message(&mut self, text: String) -> Result<(), SessionError> {
        let message = ChatMessage::new(self.settings.identity.clone(), text);
        let sent = match self.room(&self.current_channel) {
            Ok(room) => room.message(message).await,
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            self.report(&e)?;
        }
        Ok(())
    }

    async fn show_history(&mut self) -> Result<(), SessionError> {
        let history = match self.room(&self.current_channel) {
            Ok(room) => room.read_history(self.settings.history_page).await,
            Err(e) => Err(e),
        };
        let history = match history {
            Ok(history) => history,
            Err(e) => return self.report(&e),
        };

        writeln!(self.out, "{}", render::history_header(&self.current_channel))?;
        for message in &history {
            writeln!(
                self.out,
                "{}",
                render::render_message(message, &self.settings.identity)
            )?;
        }
        writeln!(self.out, "{}", render::history_footer())?;
        Ok(())
    }
}
