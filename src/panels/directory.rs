use crate::api::models::Contact;
use crate::format::format_phone;

pub const CONTACTS_ERROR: &str = "Erro ao carregar contatos";
pub const NO_CONTACTS: &str = "Nenhum contato encontrado";

#[derive(Debug, Clone, Default)]
pub struct DirectoryState {
    pub search: String,
    pub contacts: Vec<Contact>,
    pub selected: Option<String>,
    pub loading: bool,
    pub error: Option<&'static str>,
}

impl DirectoryState {
    pub fn is_selected(&self, contact: &Contact) -> bool {
        self.selected.as_deref() == Some(contact.id.as_str())
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        (!self.loading && self.contacts.is_empty()).then_some(NO_CONTACTS)
    }

    pub fn rows(&self) -> Vec<ContactRow> {
        self.contacts
            .iter()
            .map(|c| ContactRow::new(c, self.is_selected(c)))
            .collect()
    }
}

/// One line of the contact list, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub id: String,
    pub initial: String,
    pub title: String,
    pub subtitle: String,
    pub badge: String,
    pub active: bool,
}

impl ContactRow {
    pub fn new(contact: &Contact, active: bool) -> Self {
        Self {
            id: contact.id.clone(),
            initial: contact.initial(),
            title: contact.display_name().to_string(),
            subtitle: format_phone(&contact.phone),
            badge: contact.total_tickets.to_string(),
            active,
        }
    }
}
