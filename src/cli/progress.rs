//! Progress display for the pipelines.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::status::dropped_line;
use crate::details::DetailEvent;

/// Spinner shown while a single long step runs.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Progress bar fed by detail fetcher events.
pub struct DetailProgress {
    bar: ProgressBar,
}

impl DetailProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Render events until the sender side is dropped.
    pub fn spawn(mut events: mpsc::Receiver<DetailEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let progress = Self::new();
            while let Some(event) = events.recv().await {
                progress.handle(event);
            }
            progress.bar.finish_and_clear();
        })
    }

    fn handle(&self, event: DetailEvent) {
        match event {
            DetailEvent::Loaded { total } => self.bar.set_length(total as u64),
            DetailEvent::Started { url, .. } => self.bar.set_message(url),
            DetailEvent::Skipped { .. } => self.bar.inc(1),
            DetailEvent::Saved { name, .. } => {
                self.bar.set_message(name);
                self.bar.inc(1);
            }
            DetailEvent::Failed { index, url, error } => {
                self.bar.println(dropped_line(index, &url, error));
                self.bar.inc(1);
            }
            DetailEvent::Finished { .. } => self.bar.set_message("done"),
        }
    }
}

impl Default for DetailProgress {
    fn default() -> Self {
        Self::new()
    }
}
