//! CLI argument parsing and the interactive input grammar.

use clap::{Parser, Subcommand};
use shared::RelayKey;

use crate::panel::PanelEvent;

#[derive(Parser)]
#[command(name = "panel")]
#[command(about = "Relay control panel: live relay state with confirmed switch-off")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect, show relay state and read actions from stdin [default]
    Run {
        /// Relay key to place on the panel (repeatable). Without any,
        /// relays are added as they appear in pushed updates.
        #[arg(long = "relay", value_name = "KEY")]
        relays: Vec<String>,
    },

    /// Print the endpoints derived from the environment and exit
    CheckConfig,
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Event(PanelEvent),
    Quit,
}

/// Parse one action: `click <key>`, `confirm`, `cancel`, `mount <key>`,
/// `unmount <key>`, `show` or `quit`.
pub fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let verb = words.next()?;
    let arg = words.next();
    if words.next().is_some() {
        return None;
    }
    let input = match (verb, arg) {
        ("click", Some(key)) => Input::Event(PanelEvent::Click(RelayKey::from(key))),
        ("confirm", None) => Input::Event(PanelEvent::Confirm),
        ("cancel", None) => Input::Event(PanelEvent::Cancel),
        ("mount", Some(key)) => Input::Event(PanelEvent::Mount(RelayKey::from(key))),
        ("unmount", Some(key)) => Input::Event(PanelEvent::Unmount(RelayKey::from(key))),
        ("show", None) => Input::Event(PanelEvent::Refresh),
        ("quit", None) | ("exit", None) => Input::Quit,
        _ => return None,
    };
    Some(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_actions() {
        assert_eq!(
            parse_input("click 7"),
            Some(Input::Event(PanelEvent::Click(RelayKey::from("7"))))
        );
        assert_eq!(parse_input("  confirm "), Some(Input::Event(PanelEvent::Confirm)));
        assert_eq!(parse_input("cancel"), Some(Input::Event(PanelEvent::Cancel)));
        assert_eq!(
            parse_input("mount r2"),
            Some(Input::Event(PanelEvent::Mount(RelayKey::from("r2"))))
        );
        assert_eq!(
            parse_input("unmount r2"),
            Some(Input::Event(PanelEvent::Unmount(RelayKey::from("r2"))))
        );
        assert_eq!(parse_input("show"), Some(Input::Event(PanelEvent::Refresh)));
        assert_eq!(parse_input("quit"), Some(Input::Quit));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_input(""), None);
        assert_eq!(parse_input("click"), None);
        assert_eq!(parse_input("click 1 2"), None);
        assert_eq!(parse_input("unmount"), None);
        assert_eq!(parse_input("confirm now"), None);
        assert_eq!(parse_input("toggle 1"), None);
    }

    #[test]
    fn run_collects_relays() {
        let cli = Cli::parse_from(["panel", "run", "--relay", "r1", "--relay", "r2"]);
        match cli.command {
            Some(Commands::Run { relays }) => assert_eq!(relays, vec!["r1", "r2"]),
            _ => panic!("expected run"),
        }
    }
}
