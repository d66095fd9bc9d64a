//! UI surface the reconciler and the confirmation gate write to.
//!
//! [`Surface`] is the rendering contract: one visibility control and one
//! icon element per relay, plus a single shared confirmation dialog.
//! [`PanelView`] is the in-memory implementation rendered by the binary.

use std::collections::BTreeMap;

use shared::RelayKey;

use crate::gate::SessionId;

pub trait Surface {
    /// Whether a control for `key` is present on the page.
    fn has_control(&self, key: &RelayKey) -> bool;
    fn set_visible(&mut self, key: &RelayKey, visible: bool);
    /// Replace the icon content with `html` (markup, not escaped text).
    fn set_icon_html(&mut self, key: &RelayKey, html: &str);
    fn set_icon_title(&mut self, key: &RelayKey, title: &str);

    /// Whether the shared confirmation dialog is present on the page.
    fn has_dialog(&self) -> bool;
    /// Fill the dialog, point its cancel/confirm controls at `session`
    /// (dropping whatever they pointed at before) and show it.
    fn show_dialog(&mut self, session: SessionId, title: &str, body: &str);
    /// Hide the dialog and detach its controls.
    fn hide_dialog(&mut self);
}

/// Display state of one relay control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayControl {
    pub visible: bool,
    pub icon_html: String,
    pub title: Option<String>,
}

/// Display state of the shared confirmation dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogView {
    pub title: String,
    pub body: String,
    pub open: bool,
    /// Session the dialog's cancel/confirm controls are bound to.
    pub bound: Option<SessionId>,
}

/// In-memory page: mounted relay controls and an optional dialog.
#[derive(Debug, Clone)]
pub struct PanelView {
    controls: BTreeMap<RelayKey, RelayControl>,
    dialog: Option<DialogView>,
}

impl Default for PanelView {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelView {
    /// A page with the confirmation dialog and no relay controls yet.
    pub fn new() -> Self {
        Self {
            controls: BTreeMap::new(),
            dialog: Some(DialogView::default()),
        }
    }

    /// A page whose template lacks the confirmation dialog.
    pub fn without_dialog() -> Self {
        Self {
            controls: BTreeMap::new(),
            dialog: None,
        }
    }

    /// Add a control for `key`. Mounting an existing key keeps its state.
    pub fn mount(&mut self, key: RelayKey) {
        self.controls.entry(key).or_default();
    }

    pub fn unmount(&mut self, key: &RelayKey) -> bool {
        self.controls.remove(key).is_some()
    }

    pub fn control(&self, key: &RelayKey) -> Option<&RelayControl> {
        self.controls.get(key)
    }

    pub fn controls(&self) -> impl Iterator<Item = (&RelayKey, &RelayControl)> {
        self.controls.iter()
    }

    pub fn dialog(&self) -> Option<&DialogView> {
        self.dialog.as_ref()
    }

    /// Session the open dialog's controls are bound to, if any.
    pub fn dialog_session(&self) -> Option<SessionId> {
        self.dialog
            .as_ref()
            .filter(|d| d.open)
            .and_then(|d| d.bound)
    }
}

impl Surface for PanelView {
    fn has_control(&self, key: &RelayKey) -> bool {
        self.controls.contains_key(key)
    }

    fn set_visible(&mut self, key: &RelayKey, visible: bool) {
        if let Some(control) = self.controls.get_mut(key) {
            control.visible = visible;
        }
    }

    fn set_icon_html(&mut self, key: &RelayKey, html: &str) {
        if let Some(control) = self.controls.get_mut(key) {
            control.icon_html = html.to_string();
        }
    }

    fn set_icon_title(&mut self, key: &RelayKey, title: &str) {
        if let Some(control) = self.controls.get_mut(key) {
            control.title = Some(title.to_string());
        }
    }

    fn has_dialog(&self) -> bool {
        self.dialog.is_some()
    }

    fn show_dialog(&mut self, session: SessionId, title: &str, body: &str) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.title = title.to_string();
            dialog.body = body.to_string();
            dialog.bound = Some(session);
            dialog.open = true;
        }
    }

    fn hide_dialog(&mut self) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.open = false;
            dialog.bound = None;
        }
    }
}
