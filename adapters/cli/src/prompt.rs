//! Prompt providers answering the level controller's questions.

use std::io::{self, BufRead, Write};

use clap::ValueEnum;
use log::warn;
use switchback_system_level_flow::PromptProvider;

/// Scripted answer to the death prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OnDeath {
    /// Restart the current level with reset stats.
    Restart,
    /// End the session.
    Quit,
}

/// Prompt provider that prefers scripted answers and falls back to stdin.
///
/// Headless runs pass both answers up front; interactive runs leave them
/// unset and get asked on the terminal.
#[derive(Debug)]
pub(crate) struct CliPrompts {
    player_name: Option<String>,
    on_death: Option<OnDeath>,
}

impl CliPrompts {
    /// Creates a provider from the optional scripted answers.
    pub(crate) fn new(player_name: Option<String>, on_death: Option<OnDeath>) -> Self {
        Self {
            player_name,
            on_death,
        }
    }
}

impl PromptProvider for CliPrompts {
    fn request_name(&mut self, score: u32) -> Option<String> {
        if let Some(name) = &self.player_name {
            return Some(name.clone());
        }
        ask_line(&format!(
            "Score {score} makes the top ten! Name for the ledger (blank skips): "
        ))
        .filter(|name| !name.is_empty())
    }

    fn confirm_restart(&mut self) -> bool {
        match self.on_death {
            Some(OnDeath::Restart) => true,
            Some(OnDeath::Quit) => false,
            None => ask_line("You died. Restart the level? [y/N]: ")
                .is_some_and(|answer| matches!(answer.to_lowercase().as_str(), "y" | "yes")),
        }
    }
}

/// Prints a prompt and reads one trimmed line from stdin.
fn ask_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    if let Err(error) = io::stdout().flush() {
        warn!("could not flush the prompt: {error}");
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(0) => None,
        Ok(_) => Some(answer.trim().to_string()),
        Err(error) => {
            warn!("could not read a prompt answer: {error}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_answers_bypass_the_terminal() {
        let mut prompts = CliPrompts::new(Some("ada".to_string()), Some(OnDeath::Quit));
        assert_eq!(prompts.request_name(40), Some("ada".to_string()));
        assert!(!prompts.confirm_restart());

        let mut prompts = CliPrompts::new(Some("bob".to_string()), Some(OnDeath::Restart));
        assert!(prompts.confirm_restart());
    }
}
