//! Plain-text rendering of the panel view.

use std::fmt::Write;

use crate::surface::PanelView;

pub fn render_view(view: &PanelView) -> String {
    let mut out = String::new();
    for (key, control) in view.controls() {
        let state = if control.visible { "on " } else { "off" };
        let _ = write!(out, "[{}] {:<8} {}", state, key, control.icon_html);
        if let Some(title) = &control.title {
            let _ = write!(out, " ({})", title);
        }
        out.push('\n');
    }
    if let Some(dialog) = view.dialog().filter(|d| d.open) {
        let _ = writeln!(out, "== {} ==", dialog.title);
        let _ = writeln!(out, "{}", dialog.body);
        out.push_str("   confirm | cancel\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::SessionId;
    use crate::surface::Surface;
    use shared::RelayKey;

    #[test]
    fn renders_controls_and_open_dialog() {
        let mut view = PanelView::new();
        let lamp = RelayKey::from("5");
        let pump = RelayKey::from("7");
        view.mount(lamp.clone());
        view.mount(pump.clone());
        view.set_visible(&lamp, true);
        view.set_icon_html(&lamp, "<b>L</b>");
        view.set_icon_title(&lamp, "Lamp");
        view.show_dialog(SessionId::new(), "Turning Pump off", "Sure?");

        let text = render_view(&view);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "[on ] 5        <b>L</b> (Lamp)");
        assert_eq!(lines[1], "[off] 7        ");
        assert_eq!(lines[2], "== Turning Pump off ==");
        assert_eq!(lines[3], "Sure?");
    }

    #[test]
    fn closed_dialog_is_not_rendered() {
        let mut view = PanelView::new();
        view.show_dialog(SessionId::new(), "t", "b");
        view.hide_dialog();
        assert_eq!(render_view(&view), "");
    }
}
