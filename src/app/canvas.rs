use std::cell::Cell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::DrawingArea;

use super::MemeRuntime;
use crate::geometry::CanvasPoint;
use crate::state::PointerEvent;

pub(super) fn build_canvas() -> DrawingArea {
    let canvas = DrawingArea::new();
    canvas.set_halign(gtk4::Align::Center);
    canvas.set_valign(gtk4::Align::Start);
    canvas.set_content_width(1);
    canvas.set_content_height(1);
    canvas.set_focusable(true);
    canvas
}

pub(super) fn connect_canvas_draw(runtime: &Rc<MemeRuntime>) {
    let draw_runtime = runtime.clone();
    runtime
        .canvas
        .set_draw_func(move |_, context, width, height| {
            if width <= 0 || height <= 0 {
                return;
            }
            let compositor = draw_runtime.compositor.borrow();
            let Some(surface) = compositor.surface() else {
                return;
            };
            if let Err(err) = context.set_source_surface(surface, 0.0, 0.0) {
                tracing::warn!(?err, "failed to use canvas surface");
                return;
            }
            if let Err(err) = context.paint() {
                tracing::warn!(?err, "failed to paint canvas");
            }
            // Release the surface so export can read its pixels.
            context.set_source_rgb(0.0, 0.0, 0.0);
        });
}

/// Press, drag and release come from the drag gesture; double clicks from the click gesture.
pub(super) fn connect_canvas_gestures(runtime: &Rc<MemeRuntime>) {
    let drag_start = Rc::new(Cell::new(CanvasPoint::default()));
    let drag = gtk4::GestureDrag::new();
    drag.set_button(gtk4::gdk::BUTTON_PRIMARY);

    let begin_runtime = runtime.clone();
    let begin_start = drag_start.clone();
    drag.connect_drag_begin(move |_, start_x, start_y| {
        let start = CanvasPoint::new(start_x, start_y);
        begin_start.set(start);
        begin_runtime.canvas.grab_focus();
        begin_runtime.handle_pointer(PointerEvent::Down(start));
    });

    let update_runtime = runtime.clone();
    let update_start = drag_start.clone();
    drag.connect_drag_update(move |_, offset_x, offset_y| {
        let start = update_start.get();
        update_runtime.handle_pointer(PointerEvent::Move(CanvasPoint::new(
            start.x + offset_x,
            start.y + offset_y,
        )));
    });

    let end_runtime = runtime.clone();
    drag.connect_drag_end(move |_, offset_x, offset_y| {
        let start = drag_start.get();
        end_runtime.handle_pointer(PointerEvent::Up(CanvasPoint::new(
            start.x + offset_x,
            start.y + offset_y,
        )));
    });
    runtime.canvas.add_controller(drag);

    let click = gtk4::GestureClick::new();
    click.set_button(gtk4::gdk::BUTTON_PRIMARY);
    let click_runtime = runtime.clone();
    click.connect_pressed(move |_, n_press, x, y| {
        if n_press == 2 {
            click_runtime.handle_pointer(PointerEvent::DoubleClick(CanvasPoint::new(x, y)));
        }
    });
    runtime.canvas.add_controller(click);
}
