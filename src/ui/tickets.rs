use crate::api::models::Ticket;
use crate::calendar::{year_options, MONTH_NAMES, WEEKDAY_NAMES};
use crate::panels::tickets::{TicketRow, TicketState};
use crate::panels::Viewer;
use chrono::{Datelike, Local};
use gtk4 as gtk;
use gtk4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Ticket list with the protocol search and the date-range calendar.
pub struct TicketsPanel {
    root: gtk::Box,
    header: gtk::Label,
    filters: gtk::Box,
    protocol: gtk::Entry,
    chip: gtk::Box,
    chip_label: gtk::Label,
    calendar_btn: gtk::Button,
    revealer: gtk::Revealer,
    month: gtk::DropDown,
    year: gtk::DropDown,
    years: Vec<i32>,
    grid: gtk::Grid,
    list: gtk::ListBox,
    spinner: gtk::Spinner,
    status: gtk::Label,
    tickets: Rc<RefCell<Vec<Ticket>>>,
    // Set while widgets are synced from state, so their signals are ignored.
    syncing: Rc<Cell<bool>>,
    viewer: Viewer,
}

impl TicketsPanel {
    pub fn new(viewer: &Viewer) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_width_request(340);

        let title = gtk::Label::new(Some("Atendimentos"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let header = gtk::Label::new(None);
        header.add_css_class("dim-label");
        header.set_halign(gtk::Align::Start);
        root.append(&header);

        let filters = gtk::Box::new(gtk::Orientation::Vertical, 6);
        let bar = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let protocol = gtk::Entry::new();
        protocol.set_placeholder_text(Some("Buscar por protocolo..."));
        protocol.set_hexpand(true);
        let calendar_btn = gtk::Button::with_label("📅");
        calendar_btn.set_tooltip_text(Some("Filtrar por data"));
        bar.append(&protocol);
        bar.append(&calendar_btn);
        filters.append(&bar);

        let chip = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let chip_label = gtk::Label::new(None);
        chip_label.set_hexpand(true);
        chip_label.set_halign(gtk::Align::Start);
        let chip_clear = gtk::Button::with_label("✕");
        chip_clear.add_css_class("flat");
        chip.append(&chip_label);
        chip.append(&chip_clear);
        chip.set_visible(false);
        filters.append(&chip);

        let today = Local::now().date_naive();
        let years = year_options(today.year());
        let year_labels: Vec<String> = years.iter().map(|y| y.to_string()).collect();
        let year_refs: Vec<&str> = year_labels.iter().map(String::as_str).collect();
        let month = gtk::DropDown::from_strings(&MONTH_NAMES);
        let year = gtk::DropDown::from_strings(&year_refs);

        let calendar = gtk::Box::new(gtk::Orientation::Vertical, 6);
        let selectors = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        month.set_hexpand(true);
        selectors.append(&month);
        selectors.append(&year);
        calendar.append(&selectors);

        let weekdays = gtk::Grid::new();
        weekdays.set_column_homogeneous(true);
        for (col, name) in WEEKDAY_NAMES.iter().enumerate() {
            let label = gtk::Label::new(Some(name));
            label.add_css_class("caption-heading");
            weekdays.attach(&label, col as i32, 0, 1, 1);
        }
        calendar.append(&weekdays);

        let grid = gtk::Grid::new();
        grid.set_column_homogeneous(true);
        grid.set_row_spacing(2);
        grid.set_column_spacing(2);
        calendar.append(&grid);

        let footer = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        footer.set_halign(gtk::Align::End);
        let clear_btn = gtk::Button::with_label("Limpar");
        let close_btn = gtk::Button::with_label("Fechar");
        close_btn.add_css_class("suggested-action");
        footer.append(&clear_btn);
        footer.append(&close_btn);
        calendar.append(&footer);

        let revealer = gtk::Revealer::new();
        revealer.set_child(Some(&calendar));
        filters.append(&revealer);
        filters.set_visible(false);
        root.append(&filters);

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

        let panel = Rc::new(Self {
            root,
            header,
            filters,
            protocol: protocol.clone(),
            chip,
            chip_label,
            calendar_btn: calendar_btn.clone(),
            revealer,
            month: month.clone(),
            year: year.clone(),
            years,
            grid,
            list: list.clone(),
            spinner,
            status,
            tickets: Rc::new(RefCell::new(Vec::new())),
            syncing: Rc::new(Cell::new(false)),
            viewer: viewer.clone(),
        });

        {
            let viewer = viewer.clone();
            let syncing = panel.syncing.clone();
            protocol.connect_changed(move |entry| {
                if !syncing.get() {
                    viewer.set_protocol(&entry.text());
                }
            });
        }
        {
            let viewer = viewer.clone();
            calendar_btn.connect_clicked(move |_| {
                viewer.toggle_calendar();
            });
        }
        {
            let viewer = viewer.clone();
            chip_clear.connect_clicked(move |_| viewer.clear_date_filter());
        }
        {
            let viewer = viewer.clone();
            clear_btn.connect_clicked(move |_| {
                viewer.clear_date_filter();
                viewer.close_calendar();
            });
        }
        {
            let viewer = viewer.clone();
            close_btn.connect_clicked(move |_| viewer.close_calendar());
        }
        for dropdown in [&month, &year] {
            let weak = Rc::downgrade(&panel);
            dropdown.connect_selected_notify(move |_| {
                if let Some(panel) = weak.upgrade() {
                    panel.on_month_picked();
                }
            });
        }
        {
            let viewer = viewer.clone();
            let tickets = panel.tickets.clone();
            list.connect_row_activated(move |_, row| {
                let picked = usize::try_from(row.index())
                    .ok()
                    .and_then(|idx| tickets.borrow().get(idx).cloned());
                if let Some(ticket) = picked {
                    viewer.select_ticket(ticket);
                }
            });
        }

        panel
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    fn on_month_picked(&self) {
        if self.syncing.get() {
            return;
        }
        let month = self.month.selected() + 1;
        if let Some(year) = self.years.get(self.year.selected() as usize) {
            self.viewer.show_month(*year, month);
        }
    }

    /// Syncs the filter widgets and the calendar with the panel state.
    pub fn refresh_filters(&self) {
        let state = self.viewer.tickets();
        self.syncing.set(true);

        self.header.set_label(&state.header().unwrap_or_default());
        self.filters.set_visible(state.contact.is_some());
        if self.protocol.text().as_str() != state.protocol {
            self.protocol.set_text(&state.protocol);
        }

        match state.filter_label() {
            Some(label) => {
                self.chip_label.set_label(&label);
                self.chip.set_visible(true);
            }
            None => self.chip.set_visible(false),
        }

        let open = state.picker.is_open();
        self.revealer.set_reveal_child(open);
        if open {
            self.calendar_btn.add_css_class("suggested-action");
        } else {
            self.calendar_btn.remove_css_class("suggested-action");
        }

        self.month.set_selected(state.picker.month() - 1);
        if let Some(pos) = self.years.iter().position(|y| *y == state.picker.year()) {
            self.year.set_selected(pos as u32);
        }
        self.fill_grid(&state);

        self.syncing.set(false);
    }

    fn fill_grid(&self, state: &TicketState) {
        while let Some(child) = self.grid.first_child() {
            self.grid.remove(&child);
        }
        for (idx, cell) in state.picker.grid().iter().enumerate() {
            let button = gtk::Button::with_label(&cell.day().to_string());
            button.add_css_class("flat");
            if !cell.in_month {
                button.add_css_class("dim-label");
                button.set_sensitive(false);
            } else {
                if state.picker.is_highlighted(cell.date) {
                    button.add_css_class("suggested-action");
                }
                let viewer = self.viewer.clone();
                let cell = *cell;
                button.connect_clicked(move |_| {
                    viewer.click_calendar_cell(&cell);
                });
            }
            self.grid.attach(&button, (idx % 7) as i32, (idx / 7) as i32, 1, 1);
        }
    }

    pub fn refresh_list(&self) {
        let state = self.viewer.tickets();
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
        for data in state.rows() {
            let row = ticket_row(&data);
            self.list.append(&row);
            if data.active {
                self.list.select_row(Some(&row));
            }
        }
        *self.tickets.borrow_mut() = state.tickets;
    }
}

fn ticket_row(data: &TicketRow) -> gtk::ListBoxRow {
    let row = gtk::ListBoxRow::new();
    let line = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    line.set_margin_top(6);
    line.set_margin_bottom(6);
    line.set_margin_start(6);
    line.set_margin_end(6);

    let text = gtk::Box::new(gtk::Orientation::Vertical, 2);
    text.set_hexpand(true);
    let title = gtk::Label::new(Some(&data.title));
    title.set_halign(gtk::Align::Start);
    title.add_css_class("heading");
    text.append(&title);
    let started = gtk::Label::new(Some(&data.started));
    started.set_halign(gtk::Align::Start);
    started.add_css_class("dim-label");
    text.append(&started);
    if let Some(ended) = &data.ended {
        let ended = gtk::Label::new(Some(ended));
        ended.set_halign(gtk::Align::Start);
        ended.add_css_class("dim-label");
        text.append(&ended);
    }
    line.append(&text);

    let status = gtk::Label::new(Some(&data.status_label));
    status.add_css_class("caption");
    status.set_valign(gtk::Align::Center);
    match data.status_code.as_str() {
        "A" => status.add_css_class("success"),
        "E" => status.add_css_class("warning"),
        "T" => status.add_css_class("accent"),
        _ => {}
    }
    line.append(&status);

    row.set_child(Some(&line));
    row
}
