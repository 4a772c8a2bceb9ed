use std::cell::Cell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{
    gdk, glib, Box as GtkBox, Button, ContentFit, DropDown, Label, ListBox, Orientation, Picture,
    SelectionMode,
};
use image::RgbaImage;

use super::worker::spawn_worker_action;
use super::MemeRuntime;
use crate::export::{ExportAdapter, ShareRequest, WlCopyShare};
use crate::gallery::{Gallery, GalleryFilter, GalleryPost, THUMBNAIL_MAX_SIDE};
use crate::notification;

pub(super) struct GalleryPanel {
    root: GtkBox,
    filter: DropDown,
    list: ListBox,
    generation: Cell<u64>,
}

impl GalleryPanel {
    pub(super) fn new() -> Self {
        let root = GtkBox::new(Orientation::Vertical, 6);
        root.set_width_request(280);

        let title = Label::new(Some("Programming Memes"));
        title.add_css_class("title-4");
        title.set_xalign(0.0);

        let labels: Vec<&str> = GalleryFilter::ALL.iter().map(|filter| filter.label()).collect();
        let filter = DropDown::from_strings(&labels);

        let list = ListBox::new();
        list.set_selection_mode(SelectionMode::None);
        list.add_css_class("boxed-list");
        let scroller = gtk4::ScrolledWindow::new();
        scroller.set_vexpand(true);
        scroller.set_child(Some(&list));

        root.append(&title);
        root.append(&filter);
        root.append(&scroller);

        Self {
            root,
            filter,
            list,
            generation: Cell::new(0),
        }
    }

    pub(super) fn widget(&self) -> &GtkBox {
        &self.root
    }

    fn selected_filter(&self) -> GalleryFilter {
        usize::try_from(self.filter.selected())
            .ok()
            .and_then(|index| GalleryFilter::ALL.get(index).copied())
            .unwrap_or_default()
    }

    fn show_message(&self, message: &str) {
        self.clear();
        let label = Label::new(Some(message));
        label.add_css_class("dim-label");
        label.set_margin_top(12);
        label.set_margin_bottom(12);
        self.list.append(&label);
    }

    fn clear(&self) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
    }
}

pub(super) fn connect_gallery_panel(runtime: &Rc<MemeRuntime>) {
    let filter_runtime = runtime.clone();
    runtime.gallery.filter.connect_selected_notify(move |_| {
        load_gallery(&filter_runtime);
    });
    load_gallery(runtime);
}

fn load_gallery(runtime: &Rc<MemeRuntime>) {
    let panel = &runtime.gallery;
    let generation = panel.generation.get().wrapping_add(1);
    panel.generation.set(generation);
    let filter = panel.selected_filter();

    let Some(fetcher) = runtime.fetcher.clone() else {
        panel.show_message("Gallery unavailable offline");
        return;
    };
    panel.show_message("Loading…");
    let subreddit = runtime.config.gallery_subreddit.clone();
    let runtime_for_result = runtime.clone();
    spawn_worker_action(
        &runtime.alive,
        move || Gallery::new(fetcher, subreddit).fetch_posts(filter),
        move |result| {
            let panel = &runtime_for_result.gallery;
            if panel.generation.get() != generation {
                tracing::debug!(filter = %filter, "discarding superseded gallery listing");
                return;
            }
            match result {
                Ok(posts) if posts.is_empty() => panel.show_message("No memes found"),
                Ok(posts) => {
                    panel.clear();
                    for post in posts {
                        panel
                            .list
                            .append(&gallery_row(&runtime_for_result, post, generation));
                    }
                }
                Err(err) => {
                    tracing::warn!(?err, filter = %filter, "gallery fetch failed");
                    panel.show_message("Could not load memes");
                }
            }
        },
    );
}

fn gallery_row(runtime: &Rc<MemeRuntime>, post: GalleryPost, generation: u64) -> GtkBox {
    let row = GtkBox::new(Orientation::Vertical, 4);
    row.set_margin_top(6);
    row.set_margin_bottom(6);
    row.set_margin_start(6);
    row.set_margin_end(6);

    let preview = Picture::new();
    preview.set_content_fit(ContentFit::Contain);
    preview.set_can_shrink(true);
    preview.set_size_request(-1, i32::try_from(THUMBNAIL_MAX_SIDE).unwrap_or(160));
    row.append(&preview);
    load_thumbnail(runtime, &post, &preview, generation);

    let title = Label::new(Some(post.title.as_str()));
    title.set_wrap(true);
    title.set_xalign(0.0);
    title.set_tooltip_text(Some(post.discussion_url().as_str()));
    row.append(&title);

    let buttons = GtkBox::new(Orientation::Horizontal, 4);
    let share = Button::with_label("Share");
    let share_runtime = runtime.clone();
    let share_url = post.url.clone();
    share.connect_clicked(move |_| {
        share_runtime.share(&ShareRequest::RemoteUrl(share_url.clone()));
    });

    let download = Button::with_label("Download");
    let download_runtime = runtime.clone();
    download.connect_clicked(move |_| {
        download_remote(&download_runtime, post.url.clone());
    });

    buttons.append(&share);
    buttons.append(&download);
    row.append(&buttons);
    row
}

fn load_thumbnail(
    runtime: &Rc<MemeRuntime>,
    post: &GalleryPost,
    preview: &Picture,
    generation: u64,
) {
    let Some(fetcher) = runtime.fetcher.clone() else {
        preview.set_visible(false);
        return;
    };
    let subreddit = runtime.config.gallery_subreddit.clone();
    let post = post.clone();
    let preview = preview.clone();
    let runtime_for_result = runtime.clone();
    spawn_worker_action(
        &runtime.alive,
        move || Gallery::new(fetcher, subreddit).fetch_thumbnail(&post),
        move |result| {
            if runtime_for_result.gallery.generation.get() != generation {
                return;
            }
            match result {
                Ok(thumbnail) => preview.set_paintable(Some(&thumbnail_texture(thumbnail))),
                Err(err) => {
                    tracing::debug!(?err, "gallery thumbnail unavailable");
                    preview.set_visible(false);
                }
            }
        },
    );
}

fn thumbnail_texture(thumbnail: RgbaImage) -> gdk::MemoryTexture {
    let (width, height) = thumbnail.dimensions();
    let stride = width as usize * 4;
    gdk::MemoryTexture::new(
        i32::try_from(width).unwrap_or(i32::MAX),
        i32::try_from(height).unwrap_or(i32::MAX),
        gdk::MemoryFormat::R8g8b8a8,
        &glib::Bytes::from_owned(thumbnail.into_raw()),
        stride,
    )
}

fn download_remote(runtime: &Rc<MemeRuntime>, url: String) {
    let Some(fetcher) = runtime.fetcher.clone() else {
        return;
    };
    let storage = runtime.export.storage().clone();
    let runtime_for_result = runtime.clone();
    spawn_worker_action(
        &runtime.alive,
        move || ExportAdapter::new(storage, WlCopyShare).download_remote(&fetcher, &url),
        move |result| match result {
            Ok(path) => {
                runtime_for_result.set_status(&format!("Saved {}", path.display()));
                notification::send(format!("Meme saved to {}", path.display()));
            }
            Err(err) => tracing::warn!(?err, "gallery download failed"),
        },
    );
}
