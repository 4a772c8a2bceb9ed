use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{Box as GtkBox, Button, Entry, Orientation, Revealer, RevealerTransitionType};

use super::MemeRuntime;

/// Inline text editor shown while a layer is being edited.
pub(super) struct EditPanel {
    revealer: Revealer,
    entry: Entry,
    done: Button,
    delete: Button,
}

impl EditPanel {
    pub(super) fn new() -> Self {
        let revealer = Revealer::new();
        revealer.set_transition_type(RevealerTransitionType::SlideDown);
        revealer.set_reveal_child(false);

        let row = GtkBox::new(Orientation::Horizontal, 6);
        row.set_margin_top(6);
        let entry = Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Meme text"));
        let done = Button::with_label("Done");
        done.add_css_class("suggested-action");
        let delete = Button::with_label("Delete");
        delete.add_css_class("destructive-action");
        row.append(&entry);
        row.append(&done);
        row.append(&delete);
        revealer.set_child(Some(&row));

        Self {
            revealer,
            entry,
            done,
            delete,
        }
    }

    pub(super) fn widget(&self) -> &Revealer {
        &self.revealer
    }

    pub(super) fn open(&self, text: &str) {
        self.entry.set_text(text);
        self.revealer.set_reveal_child(true);
        self.entry.grab_focus();
        self.entry.select_region(0, -1);
    }

    pub(super) fn close(&self) {
        self.revealer.set_reveal_child(false);
    }
}

pub(super) fn connect_edit_panel(runtime: &Rc<MemeRuntime>) {
    let panel = &runtime.edit_panel;

    let changed_runtime = runtime.clone();
    panel.entry.connect_changed(move |entry| {
        let changed = changed_runtime
            .session
            .borrow_mut()
            .edit_active_text(entry.text().as_str());
        if changed {
            changed_runtime.rerender();
        }
    });

    let done_runtime = runtime.clone();
    let finish = move || {
        let outcome = done_runtime
            .session
            .borrow_mut()
            .finish_editing(&done_runtime.metrics);
        done_runtime.apply_outcome(outcome);
    };
    let finish = Rc::new(finish);
    {
        let finish = finish.clone();
        panel.done.connect_clicked(move |_| finish());
    }
    panel.entry.connect_activate(move |_| finish());

    let delete_runtime = runtime.clone();
    panel.delete.connect_clicked(move |_| {
        let outcome = delete_runtime
            .session
            .borrow_mut()
            .delete_active(&delete_runtime.metrics);
        delete_runtime.apply_outcome(outcome);
    });
}
