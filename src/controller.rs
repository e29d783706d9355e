//! Drives one request/response cycle against a [`ChatTransport`].

use futures_util::StreamExt;
use tracing::debug;

use crate::session::{Diagnostic, Session};
use crate::transport::{ChatTransport, TransportError};

/// Receives consistent snapshots between chunks.
pub trait SessionObserver {
    /// Called after submission, after every chunk and once more at settle.
    fn on_update(&mut self, session: &Session);

    fn on_diagnostic(&mut self, _diagnostic: &Diagnostic) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Blank input or a cycle already active; nothing was sent.
    Skipped,
    Completed { diagnostics: usize },
    Failed(TransportError),
}

/// Submits `input`, streams the response into `session` and settles it.
///
/// Records are applied strictly in arrival order, one chunk per resumption.
/// A transport failure at any point settles the cycle with the connection
/// error turn; nothing is retried.
pub async fn run_cycle(
    session: &mut Session,
    transport: &dyn ChatTransport,
    input: &str,
    observer: &mut dyn SessionObserver,
) -> CycleOutcome {
    let Some(prompt) = session.submit(input) else {
        return CycleOutcome::Skipped;
    };
    observer.on_update(session);

    debug!(transport = transport.name(), "opening response stream");
    let mut chunks = match transport.open(&prompt).await {
        Ok(chunks) => chunks,
        Err(error) => return fail(session, observer, error),
    };

    let mut diagnostics = 0;
    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(bytes) => {
                let found = session.ingest_chunk(&bytes);
                diagnostics += report(observer, &found);
                observer.on_update(session);
            }
            Err(error) => return fail(session, observer, error),
        }
    }

    let found = session.complete();
    diagnostics += report(observer, &found);
    observer.on_update(session);

    CycleOutcome::Completed { diagnostics }
}

fn fail(
    session: &mut Session,
    observer: &mut dyn SessionObserver,
    error: TransportError,
) -> CycleOutcome {
    session.fail(&error);
    observer.on_update(session);
    CycleOutcome::Failed(error)
}

fn report(observer: &mut dyn SessionObserver, diagnostics: &[Diagnostic]) -> usize {
    for diagnostic in diagnostics {
        observer.on_diagnostic(diagnostic);
    }
    diagnostics.len()
}
