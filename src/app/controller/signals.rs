//! Signal handling for cooperative interruption
//!
//! Signals never interrupt a page. They only set a [`StopFlag`] that the run
//! controller reads between pages.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Shared request to stop after the current page
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create a flag that has not been raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop at the next safe point
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Signal handler that raises a [`StopFlag`]
pub struct SignalHandler {
    flag: StopFlag,
    confirm: bool,
}

impl SignalHandler {
    /// Create a new signal handler
    ///
    /// With `confirm` set and an interactive stdin, Ctrl-C asks the operator
    /// before raising the flag.
    pub fn new(flag: StopFlag, confirm: bool) -> Self {
        Self { flag, confirm }
    }

    /// Spawns the background task that listens for Ctrl-C and SIGTERM
    pub fn setup(self) -> JoinHandle<()> {
        let interactive = self.confirm && atty::is(atty::Stream::Stdin);

        tokio::spawn(async move {
            #[cfg(unix)]
            let mut terminate =
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(stream) => Some(stream),
                    Err(e) => {
                        warn!("Could not install SIGTERM handler: {}", e);
                        None
                    }
                };

            loop {
                #[cfg(unix)]
                let sigterm = async {
                    match terminate.as_mut() {
                        Some(stream) => {
                            stream.recv().await;
                        }
                        None => std::future::pending::<()>().await,
                    }
                };

                #[cfg(not(unix))]
                let sigterm = std::future::pending::<()>();

                tokio::select! {
                    result = signal::ctrl_c() => {
                        if let Err(e) = result {
                            warn!("Could not listen for Ctrl-C: {}", e);
                            return;
                        }
                        if !interactive || confirm_stop().await {
                            info!("Stopping after the current file...");
                            self.flag.request();
                            return;
                        }
                        info!("Continuing");
                    }
                    _ = sigterm => {
                        info!("SIGTERM received, stopping after the current file...");
                        self.flag.request();
                        return;
                    }
                }
            }
        })
    }
}

/// Asks the operator whether to stop
async fn confirm_stop() -> bool {
    tokio::task::spawn_blocking(|| {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "\n\nStop? y/n ");
        let _ = stdout.flush();

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    })
    .await
    .unwrap_or(false)
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
