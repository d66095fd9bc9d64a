//! Confirmation gate between a relay click and the outgoing command.
//!
//! A click on a relay whose snapshot carries `confirmOff` does not send
//! anything. It opens a [`ConfirmationSession`] in the single dialog slot
//! and the command only leaves on an explicit confirm for that session.

use std::fmt;

use shared::{PluginCommand, RelayKey, RelayUpdate};
use uuid::Uuid;

use crate::surface::Surface;

/// Receives commands the panel decides to issue.
pub trait CommandSink {
    fn issue(&mut self, command: PluginCommand);
}

/// Recording sink.
impl CommandSink for Vec<PluginCommand> {
    fn issue(&mut self, command: PluginCommand) {
        self.push(command);
    }
}

/// Identity of one dialog interaction. Dialog controls carry the id they
/// were bound to, so a control left over from a replaced session cannot
/// act on the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One open confirmation dialog, scoped to one relay and one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationSession {
    pub id: SessionId,
    pub key: RelayKey,
    pub label: String,
    pub command: PluginCommand,
}

impl ConfirmationSession {
    fn new(key: RelayKey, label: String, command: PluginCommand) -> Self {
        Self {
            id: SessionId::new(),
            key,
            label,
            command,
        }
    }

    pub fn title(&self) -> String {
        format!("Turning {} off", self.label)
    }

    pub fn body(&self) -> String {
        format!("Are you sure you want to turn the {} off?", self.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    AwaitingConfirmation,
}

/// What a click resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Command issued right away.
    Issued,
    /// Dialog opened; nothing issued yet.
    AwaitingConfirmation(SessionId),
    /// Confirmation required but no dialog on the page; nothing issued.
    Suppressed,
}

/// What a dialog control resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Confirmed(RelayKey),
    Cancelled(RelayKey),
    /// The control addressed a session that is no longer open.
    Stale,
}

#[derive(Debug)]
pub struct ConfirmationGate {
    plugin: String,
    session: Option<ConfirmationSession>,
}

impl ConfirmationGate {
    /// `plugin` is the command namespace commands are issued under.
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            session: None,
        }
    }

    pub fn state(&self) -> GateState {
        if self.session.is_some() {
            GateState::AwaitingConfirmation
        } else {
            GateState::Idle
        }
    }

    pub fn pending(&self) -> Option<&ConfirmationSession> {
        self.session.as_ref()
    }

    pub fn handle_click<S, C>(
        &mut self,
        key: &RelayKey,
        update: &RelayUpdate,
        surface: &mut S,
        sink: &mut C,
    ) -> ClickOutcome
    where
        S: Surface + ?Sized,
        C: CommandSink + ?Sized,
    {
        let command = PluginCommand::update(self.plugin.clone(), key.clone());
        if !update.requires_confirmation() {
            tracing::debug!(pin = %key, "issuing command");
            sink.issue(command);
            return ClickOutcome::Issued;
        }

        if !surface.has_dialog() {
            tracing::warn!(pin = %key, "confirmation dialog missing; command not sent");
            return ClickOutcome::Suppressed;
        }

        if let Some(previous) = self.teardown() {
            tracing::debug!(pin = %previous.key, session = %previous.id, "replacing pending confirmation");
        }

        let label = update
            .label_text
            .clone()
            .unwrap_or_else(|| key.to_string());
        let session = ConfirmationSession::new(key.clone(), label, command);
        let id = session.id;
        surface.show_dialog(id, &session.title(), &session.body());
        tracing::debug!(pin = %key, session = %id, "awaiting confirmation");
        self.session = Some(session);
        ClickOutcome::AwaitingConfirmation(id)
    }

    /// Confirm control pressed on a dialog bound to `id`.
    pub fn confirm<S, C>(&mut self, id: SessionId, surface: &mut S, sink: &mut C) -> Resolution
    where
        S: Surface + ?Sized,
        C: CommandSink + ?Sized,
    {
        let Some(session) = self.claim(id) else {
            return Resolution::Stale;
        };
        tracing::info!(pin = %session.key, "confirmed");
        sink.issue(session.command);
        surface.hide_dialog();
        Resolution::Confirmed(session.key)
    }

    /// Cancel control pressed on a dialog bound to `id`.
    pub fn cancel<S>(&mut self, id: SessionId, surface: &mut S) -> Resolution
    where
        S: Surface + ?Sized,
    {
        let Some(session) = self.claim(id) else {
            return Resolution::Stale;
        };
        tracing::debug!(pin = %session.key, "cancelled");
        surface.hide_dialog();
        Resolution::Cancelled(session.key)
    }

    /// Close the dialog without issuing anything if its session belongs to
    /// `key`. Used when the relay's control leaves the page.
    pub fn discard<S>(&mut self, key: &RelayKey, surface: &mut S) -> Option<ConfirmationSession>
    where
        S: Surface + ?Sized,
    {
        if !self.session.as_ref().is_some_and(|s| &s.key == key) {
            return None;
        }
        let session = self.session.take()?;
        tracing::debug!(pin = %key, session = %session.id, "discarding pending confirmation");
        surface.hide_dialog();
        Some(session)
    }

    /// Take the open session if `id` still names it.
    fn claim(&mut self, id: SessionId) -> Option<ConfirmationSession> {
        if self.session.as_ref().is_some_and(|s| s.id == id) {
            return self.session.take();
        }
        tracing::debug!(session = %id, "ignoring control of a closed session");
        None
    }

    /// Empty the slot. The caller rebinds the dialog right after.
    fn teardown(&mut self) -> Option<ConfirmationSession> {
        self.session.take()
    }
}
