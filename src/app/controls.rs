use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{
    gdk, Box as GtkBox, Button, ColorDialog, ColorDialogButton, DrawingArea, DropDown, FlowBox,
    Label, Orientation, Scale, SelectionMode,
};

use super::MemeRuntime;
use crate::editor::{FontFamily, FONT_SIZE_MAX, FONT_SIZE_MIN};
use crate::export::{ShareOutcome, ShareRequest};
use crate::geometry::Color;
use crate::notification;
use crate::template::Template;

const COLOR_PRESETS: [(&str, Color); 8] = [
    ("White", Color::WHITE),
    ("Black", Color::BLACK),
    ("Red", Color::new(0xef, 0x44, 0x44)),
    ("Orange", Color::new(0xf9, 0x73, 0x16)),
    ("Yellow", Color::new(0xfa, 0xcc, 0x15)),
    ("Green", Color::new(0x22, 0xc5, 0x5e)),
    ("Blue", Color::new(0x3b, 0x82, 0xf6)),
    ("Purple", Color::new(0xa8, 0x55, 0xf7)),
];

fn control_label(text: &str) -> Label {
    let label = Label::new(Some(text));
    label.set_xalign(0.0);
    label.add_css_class("dim-label");
    label
}

pub(super) fn build_style_controls(runtime: &Rc<MemeRuntime>) -> GtkBox {
    let defaults = runtime.session.borrow().default_style();
    let column = GtkBox::new(Orientation::Vertical, 6);

    column.append(&control_label("Font"));
    let names: Vec<&str> = FontFamily::ALL.iter().map(|family| family.name()).collect();
    let font_dropdown = DropDown::from_strings(&names);
    if let Some(index) = FontFamily::ALL
        .iter()
        .position(|family| *family == defaults.font_family)
    {
        font_dropdown.set_selected(u32::try_from(index).unwrap_or(0));
    }
    let font_runtime = runtime.clone();
    font_dropdown.connect_selected_notify(move |dropdown| {
        let Some(family) = usize::try_from(dropdown.selected())
            .ok()
            .and_then(|index| FontFamily::ALL.get(index).copied())
        else {
            return;
        };
        let changed = font_runtime.session.borrow_mut().set_font_family(family);
        tracing::debug!(font = %family, "font family selected");
        if changed {
            font_runtime.rerender();
        }
    });
    column.append(&font_dropdown);

    let size_label = control_label(&format!("Size: {}px", defaults.font_size));
    column.append(&size_label);
    let size_scale = Scale::with_range(
        Orientation::Horizontal,
        f64::from(FONT_SIZE_MIN),
        f64::from(FONT_SIZE_MAX),
        1.0,
    );
    size_scale.set_value(f64::from(defaults.font_size));
    let size_runtime = runtime.clone();
    size_scale.connect_value_changed(move |scale| {
        let size = scale.value().round().clamp(0.0, f64::from(u32::MAX)) as u32;
        let changed = size_runtime.session.borrow_mut().set_font_size(size);
        let applied = size_runtime.session.borrow().default_style().font_size;
        size_label.set_text(&format!("Size: {applied}px"));
        if changed {
            size_runtime.rerender();
        }
    });
    column.append(&size_scale);

    column.append(&control_label("Color"));
    column.append(&build_color_row(runtime, defaults.color));
    column
}

fn color_swatch(color: Color) -> DrawingArea {
    let swatch = DrawingArea::new();
    swatch.set_content_width(18);
    swatch.set_content_height(18);
    swatch.set_can_target(false);
    let (r, g, b) = color.unit_rgb();
    swatch.set_draw_func(move |_, context, width, height| {
        let radius = (f64::from(width.min(height)) / 2.0) - 1.2;
        context.save().ok();
        context.arc(
            f64::from(width) / 2.0,
            f64::from(height) / 2.0,
            radius.max(1.0),
            0.0,
            std::f64::consts::TAU,
        );
        context.set_source_rgb(r, g, b);
        let _ = context.fill_preserve();
        context.set_source_rgba(0.5, 0.5, 0.5, 0.6);
        context.set_line_width(1.0);
        let _ = context.stroke();
        context.restore().ok();
    });
    swatch
}

fn to_gdk_rgba(color: Color) -> gdk::RGBA {
    let (r, g, b) = color.unit_rgb();
    gdk::RGBA::new(r as f32, g as f32, b as f32, 1.0)
}

fn from_gdk_rgba(rgba: &gdk::RGBA) -> Color {
    Color::from_unit_rgb(
        f64::from(rgba.red()),
        f64::from(rgba.green()),
        f64::from(rgba.blue()),
    )
}

fn highlight_chip(chips: &[(Color, Button)], selected: Color) {
    for (candidate, button) in chips {
        if *candidate == selected {
            button.add_css_class("suggested-action");
        } else {
            button.remove_css_class("suggested-action");
        }
    }
}

fn apply_color(runtime: &MemeRuntime, color: Color) {
    let changed = runtime.session.borrow_mut().set_color(color);
    tracing::debug!(color = %color, "text color selected");
    if changed {
        runtime.rerender();
    }
}

fn build_color_row(runtime: &Rc<MemeRuntime>, initial: Color) -> GtkBox {
    let row = GtkBox::new(Orientation::Horizontal, 4);
    let chips = Rc::new(RefCell::new(Vec::<(Color, Button)>::new()));

    let dialog = ColorDialog::new();
    dialog.set_title("Text color");
    dialog.set_with_alpha(false);
    let chooser = ColorDialogButton::new(Some(dialog));
    chooser.set_tooltip_text(Some("Custom color"));
    chooser.set_rgba(&to_gdk_rgba(initial));

    for (label, color) in COLOR_PRESETS {
        let chip = Button::new();
        chip.set_focus_on_click(false);
        chip.set_tooltip_text(Some(label));
        chip.add_css_class("flat");
        chip.set_size_request(30, 30);
        chip.set_child(Some(&color_swatch(color)));
        row.append(&chip);
        chips.borrow_mut().push((color, chip.clone()));

        let chips = chips.clone();
        let chooser = chooser.clone();
        let runtime = runtime.clone();
        chip.connect_clicked(move |_| {
            highlight_chip(&chips.borrow(), color);
            apply_color(&runtime, color);
            chooser.set_rgba(&to_gdk_rgba(color));
        });
    }
    highlight_chip(&chips.borrow(), initial);

    let chooser_runtime = runtime.clone();
    chooser.connect_rgba_notify(move |button| {
        let color = from_gdk_rgba(&button.rgba());
        highlight_chip(&chips.borrow(), color);
        apply_color(&chooser_runtime, color);
    });
    row.append(&chooser);
    row
}

pub(super) fn build_template_strip() -> FlowBox {
    let strip = FlowBox::new();
    strip.set_selection_mode(SelectionMode::None);
    strip.set_max_children_per_line(6);
    strip.set_min_children_per_line(2);
    strip.set_row_spacing(4);
    strip.set_column_spacing(4);
    strip
}

pub(super) fn populate_template_strip(runtime: &Rc<MemeRuntime>, templates: &[Template]) {
    while let Some(child) = runtime.template_strip.first_child() {
        runtime.template_strip.remove(&child);
    }
    for (index, template) in templates.iter().enumerate() {
        let button = Button::with_label(&template.name);
        button.set_tooltip_text(Some(template.name.as_str()));
        if let Some(label) = button.child().and_downcast::<Label>() {
            label.set_ellipsize(gtk4::pango::EllipsizeMode::End);
            label.set_max_width_chars(14);
        }
        let runtime_for_click = runtime.clone();
        button.connect_clicked(move |_| {
            let ticket = runtime_for_click.session.borrow_mut().select_template(index);
            if let Some(ticket) = ticket {
                runtime_for_click.template_changed(ticket);
            }
        });
        runtime.template_strip.insert(&button, -1);
    }
}

pub(super) fn build_action_row(runtime: &Rc<MemeRuntime>) -> GtkBox {
    let row = GtkBox::new(Orientation::Horizontal, 6);

    let random = Button::with_label("Random Meme");
    let random_runtime = runtime.clone();
    random.connect_clicked(move |_| {
        let ticket = random_runtime
            .session
            .borrow_mut()
            .select_random_template(random_index);
        if let Some(ticket) = ticket {
            random_runtime.template_changed(ticket);
        }
    });

    let download = Button::with_label("Download");
    download.add_css_class("suggested-action");
    let download_runtime = runtime.clone();
    download.connect_clicked(move |_| {
        let result = download_runtime
            .export
            .download(&mut *download_runtime.compositor.borrow_mut());
        match result {
            Ok(path) => {
                download_runtime.set_status(&format!("Saved {}", path.display()));
                notification::send(format!("Meme saved to {}", path.display()));
            }
            Err(err) => tracing::warn!(?err, "meme download failed"),
        }
    });

    let share = Button::with_label("Share");
    let share_runtime = runtime.clone();
    share.connect_clicked(move |_| {
        share_runtime.share(&ShareRequest::LocalCanvas);
    });

    row.append(&random);
    row.append(&download);
    row.append(&share);
    row
}

/// Uniform pick in `0..count`.
fn random_index(count: usize) -> usize {
    let upper = i32::try_from(count).unwrap_or(i32::MAX);
    usize::try_from(gtk4::glib::random_int_range(0, upper)).unwrap_or(0)
}

pub(super) fn share_status(outcome: ShareOutcome) -> &'static str {
    match outcome {
        ShareOutcome::Shared => "Copied to clipboard for sharing",
        ShareOutcome::OpenedInViewer => "Opened in viewer",
    }
}
