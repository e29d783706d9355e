use std::sync::Arc;

use nexus_ui::{run_cycle, CycleOutcome, Session, SessionConfig, SessionObserver};
use tracing::{info, warn};

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::providers::ChatProvider;

/// Anything that can show the session plus one-off status lines.
pub trait AppView: SessionObserver {
    fn notice(&mut self, text: &str);
}

impl<W: std::io::Write> AppView for crate::render::TerminalView<W> {
    fn notice(&mut self, text: &str) {
        crate::render::TerminalView::notice(self, text);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line.
    Ignored,
    Cycle(CycleOutcome),
    Command(SlashCommand),
    Exit,
}

pub struct App {
    session: Session,
    provider: Arc<dyn ChatProvider>,
    pub should_exit: bool,
}

impl App {
    pub fn new(provider: Arc<dyn ChatProvider>, config: SessionConfig) -> Self {
        Self {
            session: Session::new(config),
            provider,
            should_exit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// Handles one line of user input: a slash command or a chat prompt.
    pub async fn on_line<V: AppView>(&mut self, line: &str, view: &mut V) -> LineOutcome {
        if line.trim().is_empty() {
            return LineOutcome::Ignored;
        }

        if let Some(command) = parse_slash_command(line) {
            return self.on_command(command, view).await;
        }

        let outcome = run_cycle(&mut self.session, self.provider.transport(), line, view).await;
        match &outcome {
            CycleOutcome::Completed { diagnostics } if *diagnostics > 0 => {
                warn!(diagnostics, "cycle completed with dropped input");
            }
            CycleOutcome::Failed(error) => {
                warn!(provider = self.provider.id(), %error, "cycle failed");
            }
            _ => {}
        }
        LineOutcome::Cycle(outcome)
    }

    async fn on_command<V: AppView>(
        &mut self,
        command: SlashCommand,
        view: &mut V,
    ) -> LineOutcome {
        match &command {
            SlashCommand::Help => view.notice(HELP_TEXT),
            SlashCommand::Clear => {
                self.session.reset();
                view.on_update(&self.session);
            }
            SlashCommand::Health => match self.provider.health().await {
                Ok(status) => view.notice(&format!("Backend: {status}")),
                Err(error) => view.notice(&format!("Health check failed: {error}")),
            },
            SlashCommand::Quit => {
                info!("exit requested");
                self.should_exit = true;
                return LineOutcome::Exit;
            }
            SlashCommand::Unknown(name) => {
                view.notice(&format!("Unknown command: {name}. Type /help for commands."));
            }
        }
        LineOutcome::Command(command)
    }
}
