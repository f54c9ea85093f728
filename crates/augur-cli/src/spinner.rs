use owo_colors::OwoColorize;
use std::future::Future;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::output::OutputLevel;

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Progress indicator drawn on stderr while a request is in flight.
///
/// Shows the elapsed time, since video renders and retried calls can take
/// minutes. Silent in quiet mode and when stderr is not a terminal.
pub struct Spinner {
    task: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start(message: &str, output_level: OutputLevel) -> Self {
        if !output_level.show_user() || !atty::is(atty::Stream::Stderr) {
            return Self { task: None };
        }

        let message = message.to_string();
        let task = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = interval(Duration::from_millis(100));

            for frame in FRAMES.iter().cycle() {
                ticker.tick().await;
                eprint!(
                    "\r{} {} {}",
                    frame.cyan(),
                    message.magenta().bold(),
                    format_elapsed(started.elapsed()).dimmed()
                );
                io::stderr().flush().unwrap_or(());
            }
        });

        Self { task: Some(task) }
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Clear the line
            eprint!("\r\x1b[K");
            io::stderr().flush().unwrap_or(());
        }
    }

    /// Show the spinner while `future` runs
    pub async fn wrap<T>(
        message: &str,
        output_level: OutputLevel,
        future: impl Future<Output = T>,
    ) -> T {
        let mut spinner = Spinner::start(message, output_level);
        let result = future.await;
        spinner.stop();
        result
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    if seconds < 60 {
        format!("{seconds}s")
    } else {
        format!("{}m{:02}s", seconds / 60, seconds % 60)
    }
}
