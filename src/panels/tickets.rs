use crate::api::client::TicketFilter;
use crate::api::models::{Contact, Ticket};
use crate::calendar::{describe_filter, RangePicker};
use crate::format::{format_phone, format_timestamp};
use chrono::NaiveDate;

pub const TICKETS_ERROR: &str = "Erro ao carregar atendimentos";
pub const NO_CONTACT_SELECTED: &str = "Selecione um contato para ver os atendimentos";
pub const NO_TICKETS: &str = "Nenhum atendimento encontrado";

#[derive(Debug, Clone)]
pub struct TicketState {
    pub contact: Option<Contact>,
    pub tickets: Vec<Ticket>,
    pub selected: Option<String>,
    pub protocol: String,
    /// Committed bounds, `YYYY-MM-DD` or empty.
    pub date_start: String,
    pub date_end: String,
    pub picker: RangePicker,
    pub loading: bool,
    pub error: Option<&'static str>,
}

impl TicketState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            contact: None,
            tickets: Vec::new(),
            selected: None,
            protocol: String::new(),
            date_start: String::new(),
            date_end: String::new(),
            picker: RangePicker::new(today),
            loading: false,
            error: None,
        }
    }

    /// Back to a blank panel for a newly selected contact.
    pub fn reset_for(&mut self, contact: Option<Contact>, today: NaiveDate) {
        *self = Self::new(today);
        self.contact = contact;
    }

    pub fn filter(&self) -> TicketFilter {
        TicketFilter {
            protocol: self.protocol.clone(),
            start: self.date_start.clone(),
            end: self.date_end.clone(),
        }
    }

    pub fn clear_dates(&mut self, today: NaiveDate) {
        self.date_start.clear();
        self.date_end.clear();
        self.picker.clear(today);
    }

    pub fn filter_label(&self) -> Option<String> {
        describe_filter(&self.date_start, &self.date_end)
    }

    /// `nome - telefone` line under the panel title.
    pub fn header(&self) -> Option<String> {
        self.contact
            .as_ref()
            .map(|c| format!("{} - {}", c.display_name(), format_phone(&c.phone)))
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        if self.contact.is_none() {
            Some(NO_CONTACT_SELECTED)
        } else if !self.loading && self.tickets.is_empty() {
            Some(NO_TICKETS)
        } else {
            None
        }
    }

    pub fn rows(&self) -> Vec<TicketRow> {
        self.tickets
            .iter()
            .map(|t| TicketRow::new(t, self.selected.as_deref() == Some(t.id.as_str())))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRow {
    pub id: String,
    pub title: String,
    pub started: String,
    pub ended: Option<String>,
    pub status_code: String,
    pub status_label: String,
    pub active: bool,
}

impl TicketRow {
    pub fn new(ticket: &Ticket, active: bool) -> Self {
        Self {
            id: ticket.id.clone(),
            title: format!("Protocolo: {}", ticket.protocol),
            started: ticket.started_at.as_deref().map(format_timestamp).unwrap_or_default(),
            ended: ticket
                .ended_at
                .as_deref()
                .map(|e| format!("Fim: {}", format_timestamp(e))),
            status_code: ticket.status.code().to_string(),
            status_label: ticket.status.label().to_string(),
            active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::TicketStatus;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn placeholders_follow_selection() {
        let mut state = TicketState::new(today());
        assert_eq!(state.placeholder(), Some(NO_CONTACT_SELECTED));
        state.contact = Some(Contact {
            id: "1".into(),
            name: None,
            phone: "5511987654321".into(),
            total_tickets: 0,
        });
        assert_eq!(state.placeholder(), Some(NO_TICKETS));
        assert_eq!(state.header().as_deref(), Some("Sem nome - +55 (11) 98765-4321"));
    }

    #[test]
    fn rows_and_filter() {
        let mut state = TicketState::new(today());
        state.tickets.push(Ticket {
            id: "t1".into(),
            protocol: "2024-77".into(),
            status: TicketStatus::Waiting,
            started_at: Some("2024-06-01T09:30:00".into()),
            ended_at: None,
        });
        state.selected = Some("t1".into());
        state.protocol = "77".into();
        state.date_start = "2024-06-01".into();

        let row = &state.rows()[0];
        assert_eq!(row.title, "Protocolo: 2024-77");
        assert_eq!(row.started, "01/06/2024 09:30");
        assert_eq!(row.status_label, "Em espera");
        assert!(row.active);

        let filter = state.filter();
        assert_eq!(filter.protocol, "77");
        assert_eq!(filter.end, "");
        assert_eq!(state.filter_label().as_deref(), Some("A partir de 01/06/2024"));

        state.clear_dates(today());
        assert_eq!(state.filter_label(), None);
    }
}
