use crate::api::models::Contact;
use crate::panels::directory::ContactRow;
use crate::panels::Viewer;
use gtk4 as gtk;
use gtk4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Contact list with the search box.
pub struct Sidebar {
    root: gtk::Box,
    list: gtk::ListBox,
    spinner: gtk::Spinner,
    status: gtk::Label,
    contacts: Rc<RefCell<Vec<Contact>>>,
    viewer: Viewer,
}

impl Sidebar {
    pub fn new(viewer: &Viewer) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_width_request(300);

        let title = gtk::Label::new(Some("Contatos"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let search = gtk::Entry::new();
        search.set_placeholder_text(Some("Buscar por nome ou telefone..."));
        search.set_icon_from_icon_name(gtk::EntryIconPosition::Primary, Some("system-search-symbolic"));
        root.append(&search);

        let spinner = gtk::Spinner::new();
        spinner.set_visible(false);
        root.append(&spinner);

        let status = gtk::Label::new(None);
        status.add_css_class("dim-label");
        status.set_wrap(true);
        root.append(&status);

        let list = gtk::ListBox::new();
        list.add_css_class("navigation-sidebar");
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hscrollbar_policy(gtk::PolicyType::Never)
            .child(&list)
            .build();
        root.append(&scroller);

        {
            let viewer = viewer.clone();
            search.connect_changed(move |entry| viewer.set_search(&entry.text()));
        }

        let contacts: Rc<RefCell<Vec<Contact>>> = Rc::new(RefCell::new(Vec::new()));
        {
            let viewer = viewer.clone();
            let contacts = contacts.clone();
            list.connect_row_activated(move |_, row| {
                let picked = usize::try_from(row.index())
                    .ok()
                    .and_then(|idx| contacts.borrow().get(idx).cloned());
                if let Some(contact) = picked {
                    viewer.select_contact(contact);
                }
            });
        }

        Self {
            root,
            list,
            spinner,
            status,
            contacts,
            viewer: viewer.clone(),
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn refresh(&self) {
        let state = self.viewer.directory();
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

        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        for row_data in state.rows() {
            let row = contact_row(&row_data);
            self.list.append(&row);
            if row_data.active {
                self.list.select_row(Some(&row));
            }
        }
        *self.contacts.borrow_mut() = state.contacts;
    }
}

fn contact_row(data: &ContactRow) -> gtk::ListBoxRow {
    let row = gtk::ListBoxRow::new();
    let line = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    line.set_margin_top(6);
    line.set_margin_bottom(6);
    line.set_margin_start(6);
    line.set_margin_end(6);

    let avatar = gtk::Label::new(Some(&data.initial));
    avatar.add_css_class("title-4");
    avatar.set_width_request(32);
    line.append(&avatar);

    let text = gtk::Box::new(gtk::Orientation::Vertical, 2);
    text.set_hexpand(true);
    let title = gtk::Label::new(Some(&data.title));
    title.set_halign(gtk::Align::Start);
    title.add_css_class("heading");
    let subtitle = gtk::Label::new(Some(&data.subtitle));
    subtitle.set_halign(gtk::Align::Start);
    subtitle.add_css_class("dim-label");
    text.append(&title);
    text.append(&subtitle);
    line.append(&text);

    let badge = gtk::Label::new(Some(&data.badge));
    badge.add_css_class("caption");
    badge.set_valign(gtk::Align::Center);
    line.append(&badge);

    row.set_child(Some(&line));
    row
}
