use async_trait::async_trait;
use owo_colors::OwoColorize;
use ratebot_core::Sendable;

/// Standard output formatting for the CLI
#[derive(Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    /// Print a system/status message (indented)
    pub fn status(&self, message: &str) {
        println!("  {}", message.dimmed());
    }

    /// Print an info message (indented)
    pub fn info(&self, label: &str, value: &str) {
        println!("  {} {}", label.bright_blue(), value);
    }

    /// Print a success message (indented)
    pub fn success(&self, message: &str) {
        println!("  {} {}", "✓".bright_green(), message);
    }

    /// Print a warning message (indented)
    pub fn warning(&self, message: &str) {
        println!("  {} {}", "⚠".yellow(), message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
    }
}

/// Prints each message the bot would have sent, separated by a rule.
#[derive(Default)]
pub struct StdoutSink {
    output: Output,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            output: Output::new(),
        }
    }
}

#[async_trait]
impl Sendable for StdoutSink {
    async fn send(&self, content: &str) -> ratebot_core::Result<()> {
        println!("{content}");
        self.output.status(&"─".repeat(20));
        Ok(())
    }

    fn describe(&self) -> String {
        "stdout".to_string()
    }
}
