//! The panel: single owner of the page, the reconciler and the gate.
//!
//! Every push message and every user action becomes a [`PanelEvent`];
//! [`Panel::handle`] runs each one to completion before the next is looked
//! at, so a click always sees the state of the last fully applied batch.

use shared::{PluginMessage, RelayKey};
use tokio::sync::mpsc;

use crate::gate::{ClickOutcome, CommandSink, ConfirmationGate, Resolution};
use crate::reconciler::RelayStateReconciler;
use crate::session::LoginState;
use crate::surface::PanelView;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    Push(PluginMessage),
    Click(RelayKey),
    /// Confirm control of the open dialog.
    Confirm,
    /// Cancel control of the open dialog.
    Cancel,
    Mount(RelayKey),
    Unmount(RelayKey),
    Login(LoginState),
    /// No state change; the caller re-renders.
    Refresh,
}

pub struct Panel<C> {
    view: PanelView,
    reconciler: RelayStateReconciler,
    gate: ConfirmationGate,
    login: LoginState,
    sink: C,
    auto_mount: bool,
}

impl<C: CommandSink> Panel<C> {
    pub fn new(identity: &str, view: PanelView, login: LoginState, sink: C) -> Self {
        Self {
            view,
            reconciler: RelayStateReconciler::new(identity),
            gate: ConfirmationGate::new(identity),
            login,
            sink,
            auto_mount: false,
        }
    }

    /// Mount a control for every relay key seen in a batch addressed to us.
    pub fn with_auto_mount(mut self, auto_mount: bool) -> Self {
        self.auto_mount = auto_mount;
        self
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    pub fn gate(&self) -> &ConfirmationGate {
        &self.gate
    }

    pub fn sink(&self) -> &C {
        &self.sink
    }

    pub fn handle(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::Push(msg) => self.on_push(msg),
            PanelEvent::Click(key) => self.on_click(&key),
            PanelEvent::Confirm => {
                if let Some(id) = self.view.dialog_session() {
                    if let Resolution::Confirmed(key) =
                        self.gate.confirm(id, &mut self.view, &mut self.sink)
                    {
                        tracing::debug!(pin = %key, "confirmation resolved");
                    }
                }
            }
            PanelEvent::Cancel => {
                if let Some(id) = self.view.dialog_session() {
                    self.gate.cancel(id, &mut self.view);
                }
            }
            PanelEvent::Mount(key) => self.view.mount(key),
            PanelEvent::Unmount(key) => {
                self.gate.discard(&key, &mut self.view);
                self.view.unmount(&key);
                self.reconciler.forget(&key);
            }
            PanelEvent::Login(state) => self.login = state,
            PanelEvent::Refresh => {}
        }
    }

    fn on_push(&mut self, msg: PluginMessage) {
        if msg.plugin != self.reconciler.identity() {
            tracing::debug!(plugin = %msg.plugin, "ignoring message for another plugin");
            return;
        }
        let decoded = match msg.batch() {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!("malformed relay batch: {}", e);
                return;
            }
        };
        for (key, e) in &decoded.rejected {
            tracing::warn!(pin = %key, "malformed relay update, skipped: {}", e);
        }
        let batch = decoded.updates;
        if self.auto_mount {
            for key in batch.keys() {
                self.view.mount(key.clone());
            }
        }
        self.reconciler.on_update(&msg.plugin, &batch, &mut self.view);
    }

    fn on_click(&mut self, key: &RelayKey) {
        if !self.login.can_act() {
            tracing::debug!(pin = %key, "click ignored, not logged in");
            return;
        }
        let Some(binding) = self.reconciler.binding(key) else {
            tracing::debug!(pin = %key, "click on relay without handler");
            return;
        };
        if binding.click(&mut self.gate, &mut self.view, &mut self.sink) == ClickOutcome::Suppressed {
            tracing::debug!(pin = %key, "click suppressed");
        }
    }

    /// Process events in arrival order until every sender is gone,
    /// calling `render` after each one.
    pub async fn run<F>(mut self, mut events: mpsc::UnboundedReceiver<PanelEvent>, mut render: F)
    where
        F: FnMut(&PanelView),
    {
        render(&self.view);
        while let Some(event) = events.recv().await {
            self.handle(event);
            render(&self.view);
        }
        tracing::info!("panel event stream closed");
    }
}
