use crate::api::models::SenderRole;
use crate::files::FileKind;
use crate::panels::transcript::{Body, MediaView, MessageView};
use crate::panels::Viewer;
use crate::utils::resolve_media_url;
use gtk4 as gtk;
use gtk4::gio;
use gtk4::prelude::*;

pub struct ChatView {
    root: gtk::Box,
    header: gtk::Label,
    spinner: gtk::Spinner,
    status: gtk::Label,
    scroller: gtk::ScrolledWindow,
    messages_box: gtk::Box,
    origin: String,
    viewer: Viewer,
}

impl ChatView {
    pub fn new(viewer: &Viewer, origin: &str) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_hexpand(true);

        let title = gtk::Label::new(Some("Mensagens"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let header = gtk::Label::new(None);
        header.add_css_class("dim-label");
        header.set_halign(gtk::Align::Start);
        root.append(&header);

        let spinner = gtk::Spinner::new();
        spinner.set_visible(false);
        root.append(&spinner);

        let status = gtk::Label::new(None);
        status.add_css_class("dim-label");
        root.append(&status);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .build();
        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 8);
        scroller.set_child(Some(&messages_box));
        root.append(&scroller);

        Self {
            root,
            header,
            spinner,
            status,
            scroller,
            messages_box,
            origin: origin.to_string(),
            viewer: viewer.clone(),
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn refresh(&self) {
        let state = self.viewer.transcript();
        self.header.set_label(&state.header().unwrap_or_default());
        self.spinner.set_visible(state.loading);
        self.spinner.set_spinning(state.loading);

        match (state.error, state.placeholder()) {
            (Some(err), _) => {
                self.status.set_label(err);
                self.status.set_visible(true);
            }
            (None, Some(text)) => {
                self.status.set_label(text);
                self.status.set_visible(true);
            }
            (None, None) => self.status.set_visible(false),
        }

        while let Some(child) = self.messages_box.first_child() {
            self.messages_box.remove(&child);
        }
        for view in state.views() {
            self.messages_box.append(&self.bubble(&view));
        }
        let adj = self.scroller.vadjustment();
        adj.set_value(adj.lower());
    }

    fn bubble(&self, view: &MessageView) -> gtk::Widget {
        let bubble = gtk::Box::new(gtk::Orientation::Vertical, 4);
        bubble.add_css_class("card");
        bubble.set_margin_start(6);
        bubble.set_margin_end(6);
        let inner = gtk::Box::new(gtk::Orientation::Vertical, 4);
        inner.set_margin_top(8);
        inner.set_margin_bottom(8);
        inner.set_margin_start(10);
        inner.set_margin_end(10);
        bubble.append(&inner);

        match view.role {
            SenderRole::Attendant => bubble.set_halign(gtk::Align::End),
            SenderRole::Contact => bubble.set_halign(gtk::Align::Start),
        }

        if let Some(sender) = &view.sender {
            let name = gtk::Label::new(Some(sender));
            name.add_css_class("caption-heading");
            name.set_halign(gtk::Align::Start);
            inner.append(&name);
        }

        inner.append(&self.body(&view.body));

        if !view.meta.is_empty() {
            let meta = gtk::Label::new(Some(&view.meta));
            meta.add_css_class("caption");
            meta.add_css_class("dim-label");
            meta.set_halign(gtk::Align::End);
            inner.append(&meta);
        }

        bubble.upcast()
    }

    fn body(&self, body: &Body) -> gtk::Widget {
        match body {
            Body::Text(text) => text_label(text).upcast(),
            Body::Raw(raw) => {
                let label = text_label(raw);
                label.add_css_class("monospace");
                label.upcast()
            }
            Body::Parts(parts) => {
                let column = gtk::Box::new(gtk::Orientation::Vertical, 2);
                for part in parts {
                    column.append(&text_label(part));
                }
                column.upcast()
            }
            Body::Card { title, options } => {
                let column = gtk::Box::new(gtk::Orientation::Vertical, 2);
                if !title.is_empty() {
                    let heading = text_label(title);
                    heading.add_css_class("heading");
                    column.append(&heading);
                }
                for option in options {
                    column.append(&text_label(&format!("• {option}")));
                }
                column.upcast()
            }
            Body::Media(media) => self.media(media),
        }
    }

    fn media(&self, media: &MediaView) -> gtk::Widget {
        let url = resolve_media_url(&self.origin, &media.url);
        let file = gio::File::for_uri(&url);
        let column = gtk::Box::new(gtk::Orientation::Vertical, 4);

        match media.kind {
            FileKind::Image => {
                let picture = gtk::Picture::for_file(&file);
                picture.set_can_shrink(true);
                picture.set_size_request(280, 200);
                column.append(&picture);
                column.append(&caption(&media.name, None, &url, "Baixar imagem"));
            }
            FileKind::Audio => {
                column.append(&caption(
                    &format!("{} {}", media.icon, media.name),
                    Some(media.size.as_str()),
                    &url,
                    "Baixar áudio",
                ));
                let stream = gtk::MediaFile::for_file(&file);
                let controls = gtk::MediaControls::new(Some(&stream));
                column.append(&controls);
            }
            FileKind::Video => {
                let video = gtk::Video::for_file(Some(&file));
                video.set_size_request(320, 180);
                column.append(&video);
                column.append(&caption(&media.name, None, &url, "Baixar vídeo"));
            }
            _ => {
                column.append(&caption(
                    &format!("{} {}", media.icon, media.name),
                    Some(media.size.as_str()),
                    &url,
                    "Baixar",
                ));
            }
        }
        column.upcast()
    }
}

fn text_label(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.set_wrap(true);
    label.set_selectable(true);
    label.set_xalign(0.0);
    label.set_max_width_chars(60);
    label
}

/// Name, optional size and a download link.
fn caption(name: &str, size: Option<&str>, url: &str, tooltip: &str) -> gtk::Box {
    let line = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    let text = gtk::Box::new(gtk::Orientation::Vertical, 0);
    text.set_hexpand(true);
    let name = text_label(name);
    text.append(&name);
    if let Some(size) = size.filter(|s| !s.is_empty()) {
        let size = gtk::Label::new(Some(size));
        size.add_css_class("caption");
        size.add_css_class("dim-label");
        size.set_halign(gtk::Align::Start);
        text.append(&size);
    }
    line.append(&text);
    let download = gtk::LinkButton::with_label(url, "⬇️");
    download.set_tooltip_text(Some(tooltip));
    line.append(&download);
    line
}
