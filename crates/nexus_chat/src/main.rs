use std::io::{self, IsTerminal};

use nexus_chat::app::{App, LineOutcome};
use nexus_chat::config::client_config_from_env;
use nexus_chat::providers;
use nexus_chat::render::TerminalView;
use nexus_ui::{EnvConfig, SessionConfig, SessionObserver};
use tokio::io::{AsyncBufReadExt, BufReader};

fn main() -> io::Result<()> {
    let env = EnvConfig::from_env();
    nexus_ui::logging::init(&env).map_err(io::Error::other)?;

    let config = client_config_from_env().map_err(io::Error::other)?;
    let provider = providers::provider_from_config(&config).map_err(io::Error::other)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let stdout = io::stdout();
        let color = stdout.is_terminal();
        let mut view = TerminalView::new(stdout.lock())
            .with_color(color)
            .with_diagnostics(env.debug);
        let mut app = App::new(provider, SessionConfig::default());

        view.notice(&format!(
            "Connected via {} provider. Type /help for commands.",
            app.provider_id()
        ));
        view.on_update(app.session());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if app.on_line(&line, &mut view).await == LineOutcome::Exit {
                break;
            }
        }

        Ok::<(), io::Error>(())
    })
}
