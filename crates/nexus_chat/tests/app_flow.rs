mod support;

use std::sync::Arc;

use nexus_chat::app::{App, LineOutcome};
use nexus_chat::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use nexus_ui::session::{DEFAULT_CONNECTION_ERROR, DEFAULT_GREETING};
use nexus_ui::{Artifact, ChatTurn, CycleOutcome, Phase, Role, SessionConfig};
use pretty_assertions::assert_eq;

use support::{fast_mock, DroppingProvider, ViewSpy};

fn contents(app: &App) -> Vec<(Role, String)> {
    app.session()
        .transcript()
        .turns()
        .iter()
        .map(|turn| (turn.role, turn.content.clone()))
        .collect()
}

#[tokio::test]
async fn compare_prompt_fills_transcript_and_canvas() {
    let mut app = App::new(fast_mock(), SessionConfig::default());
    let mut view = ViewSpy::default();

    let outcome = app.on_line("Compare iPhone 16 vs Pixel 9", &mut view).await;

    assert_eq!(
        outcome,
        LineOutcome::Cycle(CycleOutcome::Completed { diagnostics: 0 })
    );
    assert_eq!(
        contents(&app),
        vec![
            (Role::Assistant, DEFAULT_GREETING.to_string()),
            (Role::User, "Compare iPhone 16 vs Pixel 9".to_string()),
            (
                Role::Assistant,
                "Here is how the iPhone 16 and Pixel 9 compare:".to_string()
            ),
        ]
    );
    match app.session().canvas().artifact() {
        Some(Artifact::Table(table)) => {
            assert_eq!(table.title, "iPhone 16 vs Pixel 9");
            assert_eq!(table.headers, vec!["Spec", "iPhone 16", "Pixel 9"]);
        }
        other => panic!("expected a table on the canvas, got {other:?}"),
    }
    assert_eq!(view.phases.first(), Some(&Phase::AwaitingFirstToken));
    assert_eq!(view.phases.last(), Some(&Phase::Settled));
}

#[tokio::test]
async fn second_prompt_replaces_canvas() {
    let mut app = App::new(fast_mock(), SessionConfig::default());
    let mut view = ViewSpy::default();

    app.on_line("compare phones", &mut view).await;
    app.on_line("chart the batteries", &mut view).await;

    assert!(matches!(
        app.session().canvas().artifact(),
        Some(Artifact::BarChart(chart)) if chart.series.len() == 3
    ));
    assert_eq!(app.session().transcript().len(), 5);
}

#[tokio::test]
async fn dropped_connection_appends_error_turn_and_recovers() {
    let provider = Arc::new(DroppingProvider {
        first: b"{\"type\":\"message\",\"content\":\"Partial answer\"}\n".to_vec(),
    });
    let mut app = App::new(provider, SessionConfig::default());
    let mut view = ViewSpy::default();

    let outcome = app.on_line("hello", &mut view).await;

    assert!(matches!(
        outcome,
        LineOutcome::Cycle(CycleOutcome::Failed(_))
    ));
    let turns = app.session().transcript().turns();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[2], ChatTurn::assistant("Partial answer"));
    assert_eq!(turns[3], ChatTurn::assistant(DEFAULT_CONNECTION_ERROR));
    assert_eq!(app.session().phase(), Phase::Settled);

    let retry = app.on_line("again", &mut view).await;
    assert!(matches!(retry, LineOutcome::Cycle(CycleOutcome::Failed(_))));
    assert_eq!(app.session().transcript().len(), 7);
}

#[tokio::test]
async fn clear_resets_to_greeting_and_empty_canvas() {
    let mut app = App::new(fast_mock(), SessionConfig::default());
    let mut view = ViewSpy::default();
    app.on_line("compare phones", &mut view).await;

    let outcome = app.on_line("/clear", &mut view).await;

    assert_eq!(outcome, LineOutcome::Command(SlashCommand::Clear));
    assert_eq!(
        contents(&app),
        vec![(Role::Assistant, DEFAULT_GREETING.to_string())]
    );
    assert!(app.session().canvas().is_empty());
    assert_eq!(app.session().phase(), Phase::Idle);
}

#[tokio::test]
async fn help_health_and_unknown_commands_report_notices() {
    let mut app = App::new(fast_mock(), SessionConfig::default());
    let mut view = ViewSpy::default();

    app.on_line("/help", &mut view).await;
    app.on_line("/health", &mut view).await;
    app.on_line("/nope now", &mut view).await;

    assert_eq!(
        view.notices,
        vec![
            HELP_TEXT.to_string(),
            "Backend: ok (scripted replay)".to_string(),
            "Unknown command: /nope. Type /help for commands.".to_string(),
        ]
    );
    assert_eq!(app.session().transcript().len(), 1);
}

#[tokio::test]
async fn failing_health_probe_is_reported() {
    let provider = Arc::new(DroppingProvider { first: Vec::new() });
    let mut app = App::new(provider, SessionConfig::default());
    let mut view = ViewSpy::default();

    app.on_line("/health", &mut view).await;

    assert_eq!(
        view.notices,
        vec!["Health check failed: connection refused".to_string()]
    );
}

#[tokio::test]
async fn quit_sets_exit_flag_and_blank_lines_are_ignored() {
    let mut app = App::new(fast_mock(), SessionConfig::default());
    let mut view = ViewSpy::default();

    assert_eq!(app.on_line("   ", &mut view).await, LineOutcome::Ignored);
    assert!(view.phases.is_empty());

    assert_eq!(app.on_line("/quit", &mut view).await, LineOutcome::Exit);
    assert!(app.should_exit);
}

#[tokio::test]
async fn custom_session_texts_flow_through() {
    let config = SessionConfig::default()
        .with_greeting("Welcome back.")
        .with_placeholder("See the canvas.");
    let provider = Arc::new(
        nexus_chat::providers::ScriptedProvider::with_messages(vec![
            "<UI_COMPONENT>{\"type\":\"table\",\"headers\":[\"A\"],\"rows\":[[1]]}</UI_COMPONENT>"
                .to_string(),
        ])
        .with_chunk_delay(std::time::Duration::ZERO),
    );
    let mut app = App::new(provider, config);
    let mut view = ViewSpy::default();

    app.on_line("anything", &mut view).await;

    assert_eq!(
        contents(&app),
        vec![
            (Role::Assistant, "Welcome back.".to_string()),
            (Role::User, "anything".to_string()),
            (Role::Assistant, "See the canvas.".to_string()),
        ]
    );
}

#[test]
fn parser_recognizes_known_and_unknown_slash_commands() {
    assert_eq!(parse_slash_command("plain prompt"), None);
    assert_eq!(parse_slash_command("/help"), Some(SlashCommand::Help));
    assert_eq!(parse_slash_command(" /clear "), Some(SlashCommand::Clear));
    assert_eq!(parse_slash_command("/health"), Some(SlashCommand::Health));
    assert_eq!(parse_slash_command("/quit"), Some(SlashCommand::Quit));
    assert_eq!(parse_slash_command("/exit"), Some(SlashCommand::Quit));
    assert_eq!(
        parse_slash_command("/nope extra args"),
        Some(SlashCommand::Unknown("/nope".to_string()))
    );
}
