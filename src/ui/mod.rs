//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling
//!
//! The orchestrator only talks to the [`Prompter`] trait, so a run can be
//! driven from the terminal, non-interactively, or from a script in tests.

use std::io::{self, Write};

use anyhow::Result;
use regex::Regex;

use crate::error::StamperError;

pub mod formatter;

pub use formatter::{
    display_change_report, display_error, display_magnitude, display_new_file,
    display_proposed_version, display_scan_report, display_status, display_success,
    display_warning,
};

/// What the user made of the proposed version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionChoice {
    Accept,
    Cancel,
    /// Manual version, kept exactly as typed
    Override(String),
}

/// Checks a manual version against `X.Y` or `X.Y.Z`.
pub fn validate_version_input(input: &str) -> crate::Result<()> {
    let re = Regex::new(r"^[0-9]+\.[0-9]+(\.[0-9]+)?$")?;
    if re.is_match(input) {
        Ok(())
    } else {
        Err(StamperError::version(format!(
            "invalid version format '{}': expected X.Y or X.Y.Z",
            input
        )))
    }
}

/// Interprets the answer to the version prompt.
///
/// Enter or `y` accepts the proposal, `n` cancels, a well-formed version
/// overrides it. Anything else is a malformed version.
///
/// # Examples
///
/// ```ignore
/// parse_version_choice("")     // Ok(Accept)
/// parse_version_choice("2.0")  // Ok(Override("2.0"))
/// parse_version_choice("abc")  // Err(Version parsing error)
/// ```
pub fn parse_version_choice(input: &str) -> crate::Result<VersionChoice> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "" | "y" | "yes" => Ok(VersionChoice::Accept),
        "n" | "no" => Ok(VersionChoice::Cancel),
        _ => {
            validate_version_input(input)?;
            Ok(VersionChoice::Override(input.to_string()))
        }
    }
}

/// Every question a run may ask
pub trait Prompter {
    /// False when nobody is there to answer
    fn is_interactive(&self) -> bool;

    /// Yes/no question; `default` is the answer for a bare Enter
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Offer an untracked file for inclusion; `preview` holds its first lines
    fn include_new_file(&mut self, path: &str, preview: &[String]) -> Result<bool>;

    /// Raw answer to the version prompt, parsed with [`parse_version_choice`]
    fn version_input(&mut self, current: &str, proposed: &str) -> Result<String>;
}

fn read_answer() -> Result<String> {
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompts on stdin/stdout
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn is_interactive(&self) -> bool {
        true
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        print!("\n{} ({}): ", prompt, hint);

        let response = read_answer()?.to_lowercase();
        Ok(match response.as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }

    fn include_new_file(&mut self, path: &str, preview: &[String]) -> Result<bool> {
        display_new_file(path, preview);
        self.confirm(&format!("Include '{}' in the repository?", path), false)
    }

    fn version_input(&mut self, current: &str, proposed: &str) -> Result<String> {
        print!(
            "\nVersion options:\n  (press Enter to use {})\n  (enter a version such as 3.4 or 3.4.0)\n  (enter 'n' to cancel)\n\nNew version for {} [{}]: ",
            proposed, current, proposed
        );
        read_answer()
    }
}

/// Answers every question with its default: proposals are accepted, new
/// files are left alone and risky confirmations are declined
pub struct NonInteractivePrompter;

impl Prompter for NonInteractivePrompter {
    fn is_interactive(&self) -> bool {
        false
    }

    fn confirm(&mut self, _prompt: &str, default: bool) -> Result<bool> {
        Ok(default)
    }

    fn include_new_file(&mut self, _path: &str, _preview: &[String]) -> Result<bool> {
        Ok(false)
    }

    fn version_input(&mut self, _current: &str, _proposed: &str) -> Result<String> {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_version_input() {
        assert!(validate_version_input("2.0").is_ok());
        assert!(validate_version_input("10.20.30").is_ok());
        assert!(validate_version_input("abc").is_err());
        assert!(validate_version_input("1").is_err());
        assert!(validate_version_input("1.2.3.4").is_err());
        assert!(validate_version_input("v1.2").is_err());
        assert!(validate_version_input("1.2 ").is_err());
    }

    #[test]
    fn test_parse_version_choice_accept_and_cancel() {
        assert_eq!(parse_version_choice("").unwrap(), VersionChoice::Accept);
        assert_eq!(parse_version_choice("Y").unwrap(), VersionChoice::Accept);
        assert_eq!(parse_version_choice("no").unwrap(), VersionChoice::Cancel);
    }

    #[test]
    fn test_parse_version_choice_override_is_verbatim() {
        assert_eq!(
            parse_version_choice(" 2.0\n").unwrap(),
            VersionChoice::Override("2.0".to_string())
        );
    }

    #[test]
    fn test_parse_version_choice_rejects_garbage() {
        let err = parse_version_choice("abc").unwrap_err();
        assert!(matches!(err, StamperError::Version(_)));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_non_interactive_prompter_defaults() {
        let mut prompter = NonInteractivePrompter;
        assert!(!prompter.is_interactive());
        assert!(prompter.confirm("Proceed?", true).unwrap());
        assert!(!prompter.confirm("Downgrade?", false).unwrap());
        assert!(!prompter.include_new_file("notes.md", &[]).unwrap());
        assert_eq!(prompter.version_input("3.3", "3.3.1").unwrap(), "");
    }
}
