//! View-model controllers for the three panels. The widgets only read
//! snapshots and forward user input; every load goes through here.

pub mod directory;
pub mod tickets;
pub mod transcript;

use crate::api::client::ApiClient;
use crate::api::models::{Contact, Ticket};
use crate::app::Settings;
use crate::calendar::{ClickOutcome, DayCell};
use crate::debounce::{Debouncer, Sequence};
use chrono::{Local, NaiveDate};
use directory::{DirectoryState, CONTACTS_ERROR};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tickets::{TicketState, TICKETS_ERROR};
use tokio::runtime::Handle;
use transcript::{TranscriptState, MESSAGES_ERROR};

/// Which part of the view needs a redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Contacts,
    Tickets,
    Filters,
    Messages,
}

pub type Notify = Arc<dyn Fn(Change) + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub debounce: Duration,
    pub calendar_close: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            calendar_close: Duration::from_millis(300),
        }
    }
}

impl From<&Settings> for Timing {
    fn from(settings: &Settings) -> Self {
        Self {
            debounce: settings.debounce(),
            calendar_close: settings.calendar_close_delay(),
        }
    }
}

struct Inner {
    client: ApiClient,
    runtime: Handle,
    timing: Timing,
    notify: Notify,
    directory: Mutex<DirectoryState>,
    tickets: Mutex<TicketState>,
    transcript: Mutex<TranscriptState>,
    contact_seq: Sequence,
    ticket_seq: Sequence,
    message_seq: Sequence,
    contact_timer: Debouncer,
    ticket_timer: Debouncer,
    message_timer: Debouncer,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Shared handle to the panel state; clones drive the same view.
#[derive(Clone)]
pub struct Viewer {
    inner: Arc<Inner>,
}

impl Viewer {
    pub fn new(client: ApiClient, runtime: Handle, timing: Timing, notify: Notify) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                timing,
                notify,
                directory: Mutex::new(DirectoryState::default()),
                tickets: Mutex::new(TicketState::new(today())),
                transcript: Mutex::new(TranscriptState::default()),
                contact_seq: Sequence::default(),
                ticket_seq: Sequence::default(),
                message_seq: Sequence::default(),
                contact_timer: Debouncer::new(runtime.clone()),
                ticket_timer: Debouncer::new(runtime.clone()),
                message_timer: Debouncer::new(runtime.clone()),
                runtime,
            }),
        }
    }

    pub fn directory(&self) -> DirectoryState {
        lock(&self.inner.directory).clone()
    }

    pub fn tickets(&self) -> TicketState {
        lock(&self.inner.tickets).clone()
    }

    pub fn transcript(&self) -> TranscriptState {
        lock(&self.inner.transcript).clone()
    }

    fn notify(&self, change: Change) {
        (self.inner.notify)(change);
    }

    // ---- directory ----

    /// Immediate contact load with the current search term.
    pub fn load_contacts(&self) {
        let seq = self.inner.contact_seq.next();
        let this = self.clone();
        self.inner.contact_timer.run_now(async move { this.fetch_contacts(seq).await });
    }

    pub fn set_search(&self, term: &str) {
        {
            let mut dir = lock(&self.inner.directory);
            if dir.search == term {
                return;
            }
            dir.search = term.to_string();
        }
        let seq = self.inner.contact_seq.next();
        let this = self.clone();
        self.inner
            .contact_timer
            .schedule(self.inner.timing.debounce, async move { this.fetch_contacts(seq).await });
    }

    async fn fetch_contacts(&self, seq: u64) {
        let search = {
            let mut dir = lock(&self.inner.directory);
            dir.loading = true;
            dir.error = None;
            dir.search.clone()
        };
        self.notify(Change::Contacts);

        let result = self.inner.client.contacts(&search).await;
        if !self.inner.contact_seq.is_current(seq) {
            log::warn!("discarding stale contact response for {search:?}");
            return;
        }
        {
            let mut dir = lock(&self.inner.directory);
            dir.loading = false;
            match result {
                Ok(contacts) => dir.contacts = contacts,
                Err(e) => {
                    log::error!("{CONTACTS_ERROR}: {e}");
                    dir.error = Some(CONTACTS_ERROR);
                }
            }
        }
        self.notify(Change::Contacts);
    }

    /// Makes `contact` current: clears ticket, message and filter state and
    /// loads its tickets right away.
    pub fn select_contact(&self, contact: Contact) {
        log::debug!("selecting contact {}", contact.id);
        lock(&self.inner.directory).selected = Some(contact.id.clone());
        lock(&self.inner.tickets).reset_for(Some(contact), today());
        self.clear_transcript();
        self.notify(Change::Contacts);
        self.notify(Change::Filters);

        let seq = self.inner.ticket_seq.next();
        let this = self.clone();
        self.inner.ticket_timer.run_now(async move { this.fetch_tickets(seq).await });
    }

    // ---- tickets ----

    pub fn set_protocol(&self, protocol: &str) {
        {
            let mut state = lock(&self.inner.tickets);
            if state.protocol == protocol {
                return;
            }
            state.protocol = protocol.to_string();
        }
        self.schedule_tickets();
    }

    /// Sets the committed bounds directly (`YYYY-MM-DD` or empty).
    pub fn set_date_bounds(&self, start: &str, end: &str) {
        {
            let mut state = lock(&self.inner.tickets);
            if state.date_start == start && state.date_end == end {
                return;
            }
            state.date_start = start.to_string();
            state.date_end = end.to_string();
        }
        self.notify(Change::Filters);
        self.schedule_tickets();
    }

    pub fn toggle_calendar(&self) -> bool {
        let open = lock(&self.inner.tickets).picker.toggle();
        self.notify(Change::Filters);
        open
    }

    pub fn close_calendar(&self) {
        lock(&self.inner.tickets).picker.set_open(false);
        self.notify(Change::Filters);
    }

    pub fn show_month(&self, year: i32, month: u32) {
        lock(&self.inner.tickets).picker.show_month(year, month);
        self.notify(Change::Filters);
    }

    /// Feeds a click on a grid cell to the range picker. A completed range
    /// is committed and the calendar closes shortly after.
    pub fn click_calendar_cell(&self, cell: &DayCell) -> ClickOutcome {
        let outcome = lock(&self.inner.tickets).picker.click_cell(cell);
        match outcome {
            ClickOutcome::Completed(range) => {
                let (start, end) = range.api_bounds();
                self.set_date_bounds(&start, &end);
                let this = self.clone();
                let delay = self.inner.timing.calendar_close;
                self.inner.runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    this.close_calendar();
                });
            }
            ClickOutcome::Started(_) => self.notify(Change::Filters),
            ClickOutcome::Ignored => {}
        }
        outcome
    }

    pub fn clear_date_filter(&self) {
        let changed = {
            let mut state = lock(&self.inner.tickets);
            let changed = !state.date_start.is_empty() || !state.date_end.is_empty();
            state.clear_dates(today());
            changed
        };
        self.notify(Change::Filters);
        if changed {
            self.schedule_tickets();
        }
    }

    fn schedule_tickets(&self) {
        if lock(&self.inner.tickets).contact.is_none() {
            return;
        }
        let seq = self.inner.ticket_seq.next();
        let this = self.clone();
        self.inner
            .ticket_timer
            .schedule(self.inner.timing.debounce, async move { this.fetch_tickets(seq).await });
    }

    async fn fetch_tickets(&self, seq: u64) {
        let (contact_id, filter) = {
            let mut state = lock(&self.inner.tickets);
            let Some(contact) = state.contact.as_ref() else {
                return;
            };
            let id = contact.id.clone();
            state.loading = true;
            state.error = None;
            (id, state.filter())
        };
        self.notify(Change::Tickets);

        let result = self.inner.client.tickets(&contact_id, &filter).await;
        if !self.inner.ticket_seq.is_current(seq) {
            log::warn!("discarding stale ticket response for contact {contact_id}");
            return;
        }
        {
            let mut state = lock(&self.inner.tickets);
            state.loading = false;
            match result {
                Ok(tickets) => state.tickets = tickets,
                Err(e) => {
                    log::error!("{TICKETS_ERROR}: {e}");
                    state.error = Some(TICKETS_ERROR);
                }
            }
        }
        self.notify(Change::Tickets);
    }

    // ---- transcript ----

    pub fn select_ticket(&self, ticket: Ticket) {
        log::debug!("selecting ticket {}", ticket.id);
        lock(&self.inner.tickets).selected = Some(ticket.id.clone());
        {
            let mut t = lock(&self.inner.transcript);
            t.ticket = Some(ticket);
            t.messages.clear();
            t.error = None;
        }
        self.notify(Change::Tickets);

        let seq = self.inner.message_seq.next();
        let this = self.clone();
        self.inner.message_timer.run_now(async move { this.fetch_messages(seq).await });
    }

    async fn fetch_messages(&self, seq: u64) {
        let ticket_id = {
            let mut t = lock(&self.inner.transcript);
            let Some(ticket) = t.ticket.as_ref() else {
                return;
            };
            let id = ticket.id.clone();
            t.loading = true;
            id
        };
        self.notify(Change::Messages);

        let result = self.inner.client.messages(&ticket_id).await;
        if !self.inner.message_seq.is_current(seq) {
            log::warn!("discarding stale messages for ticket {ticket_id}");
            return;
        }
        {
            let mut t = lock(&self.inner.transcript);
            t.loading = false;
            match result {
                Ok(messages) => {
                    log::debug!("{} messages for ticket {ticket_id}", messages.len());
                    t.messages = messages;
                }
                Err(e) => {
                    log::error!("{MESSAGES_ERROR}: {e}");
                    t.error = Some(MESSAGES_ERROR);
                }
            }
        }
        self.notify(Change::Messages);
    }

    fn clear_transcript(&self) {
        self.inner.message_timer.cancel();
        self.inner.message_seq.invalidate();
        *lock(&self.inner.transcript) = TranscriptState::default();
        self.notify(Change::Messages);
    }

    /// Drops everything, e.g. on logout.
    pub fn reset(&self) {
        self.inner.contact_timer.cancel();
        self.inner.ticket_timer.cancel();
        self.inner.contact_seq.invalidate();
        self.inner.ticket_seq.invalidate();
        *lock(&self.inner.directory) = DirectoryState::default();
        *lock(&self.inner.tickets) = TicketState::new(today());
        self.clear_transcript();
        self.notify(Change::Contacts);
        self.notify(Change::Filters);
        self.notify(Change::Tickets);
    }
}
