use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{
    Application, ApplicationWindow, Box as GtkBox, DrawingArea, FlowBox, Frame, Label,
    Orientation, ScrolledWindow,
};

use crate::compositor::{CairoTextMetrics, Compositor, TemplateImage};
use crate::config::{load_app_config, AppConfig};
use crate::editor::MemeSession;
use crate::error::{AppError, AppResult};
use crate::export::{ExportAdapter, ShareRequest, WlCopyShare};
use crate::net::HttpFetcher;
use crate::state::{InteractionOutcome, PointerEvent};
use crate::storage::DownloadStorage;
use crate::template::{LoadTicket, TemplateSource};

mod canvas;
mod controls;
mod edit_panel;
mod gallery_panel;
mod worker;

use self::canvas::{build_canvas, connect_canvas_draw, connect_canvas_gestures};
use self::controls::{
    build_action_row, build_style_controls, build_template_strip, populate_template_strip,
    share_status,
};
use self::edit_panel::{connect_edit_panel, EditPanel};
use self::gallery_panel::{connect_gallery_panel, GalleryPanel};
use self::worker::spawn_worker_action;

const APPLICATION_ID: &str = "io.github.memeforge.Memeforge";
const WINDOW_TITLE: &str = "Meme Generator";

/// State shared by every widget callback of the main window.
pub(crate) struct MemeRuntime {
    config: AppConfig,
    session: RefCell<MemeSession>,
    compositor: RefCell<Compositor>,
    template_image: RefCell<Option<TemplateImage>>,
    metrics: CairoTextMetrics,
    export: ExportAdapter<DownloadStorage, WlCopyShare>,
    fetcher: Option<HttpFetcher>,
    alive: Rc<Cell<bool>>,
    window: ApplicationWindow,
    canvas: DrawingArea,
    template_strip: FlowBox,
    status: Label,
    edit_panel: EditPanel,
    gallery: GalleryPanel,
}

impl MemeRuntime {
    fn rerender(&self) {
        let viewport = self.config.viewport_for_width(self.window.width());
        let image = self.template_image.borrow();
        if let Some(image) = image.as_ref() {
            let session = self.session.borrow();
            let rendered =
                self.compositor
                    .borrow_mut()
                    .render(image, session.store().layers(), viewport);
            match rendered {
                Ok(size) => {
                    self.canvas
                        .set_content_width(i32::try_from(size.width).unwrap_or(i32::MAX));
                    self.canvas
                        .set_content_height(i32::try_from(size.height).unwrap_or(i32::MAX));
                }
                Err(err) => tracing::warn!(?err, "canvas render failed"),
            }
        }
        self.canvas.queue_draw();
    }

    fn handle_pointer(&self, event: PointerEvent) {
        if self.template_image.borrow().is_none() {
            return;
        }
        let outcome = self.session.borrow_mut().pointer(event, &self.metrics);
        self.apply_outcome(outcome);
    }

    fn apply_outcome(&self, outcome: InteractionOutcome) {
        match &outcome {
            InteractionOutcome::OpenEditor { layer, text } => {
                tracing::debug!(layer, "editing text layer");
                self.edit_panel.open(text);
            }
            InteractionOutcome::CloseEditor => self.edit_panel.close(),
            InteractionOutcome::CapacityReached { limit } => {
                self.set_status(&format!("Layer limit of {limit} reached"));
            }
            InteractionOutcome::Unchanged | InteractionOutcome::Redraw => {}
        }
        if outcome.needs_redraw() {
            self.rerender();
        }
    }

    fn set_status(&self, message: &str) {
        self.status.set_text(message);
    }

    fn share(&self, request: &ShareRequest) {
        let result = self
            .export
            .share(request, &mut *self.compositor.borrow_mut());
        match result {
            Ok(outcome) => self.set_status(share_status(outcome)),
            Err(err) => tracing::warn!(?err, ?request, "share failed"),
        }
    }

    /// A new template was chosen; layers are already gone.
    fn template_changed(self: &Rc<Self>, ticket: LoadTicket) {
        self.edit_panel.close();
        self.rerender();
        self.load_template_image(ticket);
    }

    fn load_templates(self: &Rc<Self>) {
        let Some(fetcher) = self.fetcher.clone() else {
            self.set_status("Templates unavailable offline");
            return;
        };
        let url = self.config.template_api_url.clone();
        let limit = self.config.template_limit;
        let runtime = self.clone();
        self.set_status("Loading templates…");
        spawn_worker_action(
            &self.alive,
            move || TemplateSource::new(fetcher, url, limit).fetch_templates(),
            move |result| match result {
                Ok(templates) => {
                    populate_template_strip(&runtime, &templates);
                    let ticket = runtime.session.borrow_mut().set_templates(templates);
                    runtime.set_status("Click the image to add text");
                    if let Some(ticket) = ticket {
                        runtime.template_changed(ticket);
                    }
                }
                Err(err) => {
                    tracing::warn!(?err, "template list fetch failed");
                    runtime.set_status("Could not load templates");
                }
            },
        );
    }

    fn load_template_image(self: &Rc<Self>, ticket: LoadTicket) {
        let Some(fetcher) = self.fetcher.clone() else {
            return;
        };
        let Some(template) = self.session.borrow().selected_template().cloned() else {
            return;
        };
        let url = self.config.template_api_url.clone();
        let limit = self.config.template_limit;
        let runtime = self.clone();
        spawn_worker_action(
            &self.alive,
            move || TemplateSource::new(fetcher, url, limit).fetch_image(&template),
            move |result| {
                if !runtime.session.borrow().accepts_load(&ticket) {
                    tracing::debug!(
                        template = ticket.template_id(),
                        "discarding superseded template image"
                    );
                    return;
                }
                let image = result.map_err(AppError::from).and_then(|pixels| {
                    TemplateImage::from_rgba(ticket.template_id(), pixels).map_err(AppError::from)
                });
                match image {
                    Ok(image) => {
                        runtime.template_image.replace(Some(image));
                        runtime.rerender();
                    }
                    Err(err) => {
                        tracing::warn!(?err, template = ticket.template_id(), "template image unavailable; render skipped");
                    }
                }
            },
        );
    }

    fn close(&self) {
        self.alive.set(false);
        self.session.borrow_mut().close();
        tracing::info!("meme window closed");
    }
}

fn download_storage(config: &AppConfig) -> DownloadStorage {
    DownloadStorage::with_default_paths(config.download_dir.as_deref()).unwrap_or_else(|err| {
        tracing::warn!(?err, "download directory unavailable; using temp dir");
        let fallback = std::env::temp_dir().join("memeforge");
        DownloadStorage::with_paths(fallback.clone(), fallback)
    })
}

fn build_window(app: &Application, config: AppConfig) -> AppResult<Rc<MemeRuntime>> {
    let metrics = CairoTextMetrics::new().map_err(|source| crate::compositor::RenderError::Cairo {
        operation: "creating text metrics",
        source,
    })?;
    let fetcher = HttpFetcher::new()
        .map_err(|err| tracing::warn!(?err, "http client unavailable; running offline"))
        .ok();

    let window = ApplicationWindow::builder()
        .application(app)
        .title(WINDOW_TITLE)
        .default_width(900)
        .default_height(760)
        .build();

    let runtime = Rc::new(MemeRuntime {
        export: ExportAdapter::new(download_storage(&config), WlCopyShare),
        session: RefCell::new(MemeSession::new(config.session_settings())),
        config,
        compositor: RefCell::new(Compositor::new()),
        template_image: RefCell::new(None),
        metrics,
        fetcher,
        alive: Rc::new(Cell::new(true)),
        window,
        canvas: build_canvas(),
        template_strip: build_template_strip(),
        status: Label::new(None),
        edit_panel: EditPanel::new(),
        gallery: GalleryPanel::new(),
    });

    let editor_column = GtkBox::new(Orientation::Vertical, 8);
    editor_column.set_hexpand(true);
    editor_column.append(&runtime.template_strip);
    let canvas_frame = Frame::new(None);
    canvas_frame.set_child(Some(&runtime.canvas));
    canvas_frame.set_halign(gtk4::Align::Center);
    editor_column.append(&canvas_frame);
    editor_column.append(runtime.edit_panel.widget());
    editor_column.append(&build_style_controls(&runtime));
    editor_column.append(&build_action_row(&runtime));
    runtime.status.set_xalign(0.0);
    runtime.status.add_css_class("dim-label");
    editor_column.append(&runtime.status);

    let editor_scroller = ScrolledWindow::new();
    editor_scroller.set_hexpand(true);
    editor_scroller.set_child(Some(&editor_column));

    let root = GtkBox::new(Orientation::Horizontal, 12);
    root.set_margin_top(12);
    root.set_margin_bottom(12);
    root.set_margin_start(12);
    root.set_margin_end(12);
    root.append(&editor_scroller);
    root.append(runtime.gallery.widget());
    runtime.window.set_child(Some(&root));

    connect_canvas_draw(&runtime);
    connect_canvas_gestures(&runtime);
    connect_edit_panel(&runtime);
    connect_gallery_panel(&runtime);

    let resize_runtime = runtime.clone();
    runtime
        .window
        .connect_default_width_notify(move |_| resize_runtime.rerender());
    let close_runtime = runtime.clone();
    runtime.window.connect_close_request(move |_| {
        close_runtime.close();
        gtk4::glib::Propagation::Proceed
    });

    Ok(runtime)
}

pub struct App {
    config: AppConfig,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let config = load_app_config();
        tracing::info!(
            template_limit = config.template_limit,
            max_layers = config.max_layers,
            "loaded app config"
        );
        Self { config }
    }

    pub fn start(&self) -> AppResult<()> {
        tracing::info!("starting gtk runtime");
        let application = Application::new(
            Some(APPLICATION_ID),
            gtk4::gio::ApplicationFlags::NON_UNIQUE,
        );

        let config = self.config.clone();
        let activate_once = Rc::new(Cell::new(false));
        application.connect_activate(move |app| {
            if activate_once.replace(true) {
                tracing::debug!("ignoring duplicate gtk activate signal");
                return;
            }
            match build_window(app, config.clone()) {
                Ok(runtime) => {
                    runtime.window.present();
                    runtime.load_templates();
                }
                Err(err) => {
                    tracing::error!(?err, "failed to build meme window");
                    app.quit();
                }
            }
        });

        let gtk_args: [&str; 1] = ["memeforge"];
        application.run_with_args(&gtk_args);
        Ok(())
    }
}
