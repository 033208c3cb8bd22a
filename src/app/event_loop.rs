use std::io::{BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use super::App;
use crate::channel::{HostMessage, Inbox, channel};
use crate::host::FileHost;
use crate::sync::SyncCoordinator;

impl App {
    /// Run the bridge on stdin and stdout until stdin closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or stdout cannot be
    /// written.
    pub fn run(&mut self) -> Result<()> {
        let input = std::io::BufReader::new(std::io::stdin());
        let stdout = std::io::stdout();
        self.run_with_io(input, stdout.lock())
    }

    /// Run the bridge over arbitrary line input and output.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_with_io(
        &mut self,
        input: impl BufRead + Send + 'static,
        mut output: impl Write,
    ) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let mut host = FileHost::new();
        let id = host.open(&self.file_path)?;
        if !host.is_watching(&id) {
            eprintln!(
                "[warn] Watch unavailable for {}; outside edits will not reload",
                self.file_path.display()
            );
        }
        let mut coordinator = SyncCoordinator::new(host, self.settings);
        let (outbox, inbox) = channel::<HostMessage>();
        coordinator.open(id.clone(), outbox);

        let lines = spawn_line_reader(input);
        let start = Instant::now();
        let poll_interval = Duration::from_millis(self.poll_interval_ms);

        loop {
            let now_ms = elapsed_ms(start);
            let wait = coordinator
                .next_deadline()
                .map_or(poll_interval, |deadline| {
                    Duration::from_millis(deadline.saturating_sub(now_ms)).min(poll_interval)
                });

            match lines.recv_timeout(wait) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        coordinator.handle_raw_message(&id, line, elapsed_ms(start));
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            let now_ms = elapsed_ms(start);
            coordinator.poll_host(now_ms);
            coordinator.tick(now_ms);
            flush_messages(&inbox, &mut output)?;
            for diagnostic in coordinator.take_diagnostics() {
                eprintln!("{diagnostic}");
            }
        }

        flush_messages(&inbox, &mut output)?;
        coordinator.close(&id);
        crate::perf::log_event("app.exit", format!("doc={id}"));
        Ok(())
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Read lines on a background thread; the receiver disconnects at EOF.
fn spawn_line_reader(input: impl BufRead + Send + 'static) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn flush_messages(inbox: &Inbox<HostMessage>, output: &mut impl Write) -> Result<()> {
    let messages = inbox.drain();
    if messages.is_empty() {
        return Ok(());
    }
    for message in messages {
        let line = serde_json::to_string(&message).context("Failed to encode host message")?;
        writeln!(output, "{line}").context("Failed to write host message")?;
    }
    output.flush().context("Failed to flush host messages")
}
