//! Applies pushed relay state to the page and rebinds relay click handlers.

use std::collections::HashMap;

use shared::{RelayKey, RelayUpdate, UpdateBatch};

use crate::gate::{ClickOutcome, CommandSink, ConfirmationGate};
use crate::surface::Surface;

/// Click handler of one relay control, holding its own copy of the update
/// it was bound from. A later batch replaces the binding; it never mutates
/// one already handed out.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickBinding {
    key: RelayKey,
    snapshot: RelayUpdate,
}

impl ClickBinding {
    pub fn new(key: RelayKey, snapshot: RelayUpdate) -> Self {
        Self { key, snapshot }
    }

    pub fn key(&self) -> &RelayKey {
        &self.key
    }

    pub fn snapshot(&self) -> &RelayUpdate {
        &self.snapshot
    }

    pub fn click<S, C>(
        &self,
        gate: &mut ConfirmationGate,
        surface: &mut S,
        sink: &mut C,
    ) -> ClickOutcome
    where
        S: Surface + ?Sized,
        C: CommandSink + ?Sized,
    {
        gate.handle_click(&self.key, &self.snapshot, surface, sink)
    }
}

#[derive(Debug)]
pub struct RelayStateReconciler {
    identity: String,
    bindings: HashMap<RelayKey, ClickBinding>,
}

impl RelayStateReconciler {
    /// `identity` is the plugin name messages must be addressed to.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            bindings: HashMap::new(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn on_update<S>(&mut self, source_plugin: &str, batch: &UpdateBatch, surface: &mut S)
    where
        S: Surface + ?Sized,
    {
        if source_plugin != self.identity {
            tracing::debug!(plugin = %source_plugin, "ignoring message for another plugin");
            return;
        }
        for (key, update) in batch {
            if !surface.has_control(key) {
                tracing::debug!(pin = %key, "no control on page, skipping");
                continue;
            }
            apply(key, update, surface);
            self.bindings
                .insert(key.clone(), ClickBinding::new(key.clone(), update.clone()));
        }
    }

    /// The handler currently bound to `key`'s control.
    pub fn binding(&self, key: &RelayKey) -> Option<&ClickBinding> {
        self.bindings.get(key)
    }

    /// Drop the handler of a control that left the page.
    pub fn forget(&mut self, key: &RelayKey) -> Option<ClickBinding> {
        self.bindings.remove(key)
    }
}

fn apply<S>(key: &RelayKey, update: &RelayUpdate, surface: &mut S)
where
    S: Surface + ?Sized,
{
    if let Some(active) = &update.active {
        surface.set_visible(key, active.is_on());
    }
    if let Some(icon) = &update.icon_text {
        surface.set_icon_html(key, icon);
    }
    if let Some(label) = &update.label_text {
        surface.set_icon_title(key, label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{PanelView, RelayControl};
    use shared::{ActiveFlag, PluginCommand};

    const ID: &str = "octorelay";

    fn view_with(keys: &[&str]) -> PanelView {
        let mut view = PanelView::new();
        for key in keys {
            view.mount(RelayKey::from(*key));
        }
        view
    }

    fn batch(entries: Vec<(&str, RelayUpdate)>) -> UpdateBatch {
        entries
            .into_iter()
            .map(|(k, u)| (RelayKey::from(k), u))
            .collect()
    }

    fn full(active: bool, label: &str, confirm_off: bool) -> RelayUpdate {
        RelayUpdate {
            active: Some(ActiveFlag::from(active)),
            icon_text: Some(format!("<img alt=\"{}\">", label)),
            label_text: Some(label.to_string()),
            confirm_off: Some(confirm_off),
        }
    }

    #[test]
    fn foreign_plugin_is_ignored() {
        let mut reconciler = RelayStateReconciler::new(ID);
        let mut view = view_with(&["1"]);
        reconciler.on_update("psucontrol", &batch(vec![("1", full(true, "Lamp", false))]), &mut view);
        assert_eq!(view.control(&RelayKey::from("1")), Some(&RelayControl::default()));
        assert!(reconciler.binding(&RelayKey::from("1")).is_none());
    }

    #[test]
    fn applies_present_fields() {
        let mut reconciler = RelayStateReconciler::new(ID);
        let mut view = view_with(&["1"]);
        reconciler.on_update(ID, &batch(vec![("1", full(true, "Lamp", false))]), &mut view);
        let control = view.control(&RelayKey::from("1")).unwrap();
        assert!(control.visible);
        assert_eq!(control.icon_html, "<img alt=\"Lamp\">");
        assert_eq!(control.title.as_deref(), Some("Lamp"));
    }

    #[test]
    fn absent_fields_leave_state_stale() {
        let mut reconciler = RelayStateReconciler::new(ID);
        let mut view = view_with(&["1"]);
        reconciler.on_update(ID, &batch(vec![("1", full(true, "Lamp", false))]), &mut view);
        let before = view.control(&RelayKey::from("1")).cloned();

        reconciler.on_update(ID, &batch(vec![("1", RelayUpdate::default())]), &mut view);
        assert_eq!(view.control(&RelayKey::from("1")).cloned(), before);

        let off = RelayUpdate {
            active: Some(ActiveFlag::off()),
            ..RelayUpdate::default()
        };
        reconciler.on_update(ID, &batch(vec![("1", off)]), &mut view);
        let control = view.control(&RelayKey::from("1")).unwrap();
        assert!(!control.visible);
        assert_eq!(control.title.as_deref(), Some("Lamp"));
    }

    #[test]
    fn missing_control_skips_only_that_key() {
        let mut reconciler = RelayStateReconciler::new(ID);
        let mut view = view_with(&["2"]);
        reconciler.on_update(
            ID,
            &batch(vec![("1", full(true, "Lamp", false)), ("2", full(true, "Fan", false))]),
            &mut view,
        );
        assert!(view.control(&RelayKey::from("1")).is_none());
        assert!(reconciler.binding(&RelayKey::from("1")).is_none());
        assert!(view.control(&RelayKey::from("2")).unwrap().visible);
        assert!(reconciler.binding(&RelayKey::from("2")).is_some());
    }

    #[test]
    fn same_batch_twice_is_idempotent() {
        let b = batch(vec![("1", full(true, "Lamp", true)), ("2", full(false, "Fan", false))]);
        let mut once = view_with(&["1", "2"]);
        let mut twice = once.clone();
        let mut r1 = RelayStateReconciler::new(ID);
        let mut r2 = RelayStateReconciler::new(ID);

        r1.on_update(ID, &b, &mut once);
        r2.on_update(ID, &b, &mut twice);
        r2.on_update(ID, &b, &mut twice);

        let first: Vec<_> = once.controls().map(|(k, c)| (k.clone(), c.clone())).collect();
        let second: Vec<_> = twice.controls().map(|(k, c)| (k.clone(), c.clone())).collect();
        assert_eq!(first, second);
        let key = RelayKey::from("1");
        assert_eq!(r1.binding(&key), r2.binding(&key));
    }

    #[test]
    fn rebinding_uses_latest_snapshot_only() {
        let mut reconciler = RelayStateReconciler::new(ID);
        let mut gate = ConfirmationGate::new(ID);
        let mut view = view_with(&["k"]);
        let mut sent: Vec<PluginCommand> = Vec::new();
        let key = RelayKey::from("k");

        reconciler.on_update(ID, &batch(vec![("k", full(true, "Heater", true))]), &mut view);
        let earlier = reconciler.binding(&key).cloned().unwrap();

        reconciler.on_update(ID, &batch(vec![("k", full(true, "Heater", false))]), &mut view);
        let outcome = reconciler
            .binding(&key)
            .unwrap()
            .click(&mut gate, &mut view, &mut sent);
        assert_eq!(outcome, ClickOutcome::Issued);
        assert_eq!(sent.len(), 1);
        assert_eq!(view.dialog_session(), None);

        // A binding handed out earlier keeps its own snapshot.
        assert_eq!(earlier.key(), &key);
        assert_eq!(earlier.snapshot().confirm_off, Some(true));
    }

    #[test]
    fn forget_drops_binding() {
        let mut reconciler = RelayStateReconciler::new(ID);
        let mut view = view_with(&["1"]);
        reconciler.on_update(ID, &batch(vec![("1", full(true, "Lamp", false))]), &mut view);
        assert!(reconciler.forget(&RelayKey::from("1")).is_some());
        assert!(reconciler.binding(&RelayKey::from("1")).is_none());
    }
}
