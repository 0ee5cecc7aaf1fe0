use crate::api::models::{Attachment, Message, MessageContent, SenderRole, Ticket};
use crate::files::FileKind;
use crate::format::{format_file_size, format_timestamp};

pub const MESSAGES_ERROR: &str = "Erro ao carregar mensagens";
pub const NO_TICKET_SELECTED: &str = "Selecione um atendimento para ver as mensagens";
pub const NO_MESSAGES: &str = "Nenhuma mensagem encontrada";

#[derive(Debug, Clone, Default)]
pub struct TranscriptState {
    pub ticket: Option<Ticket>,
    pub messages: Vec<Message>,
    pub loading: bool,
    pub error: Option<&'static str>,
}

impl TranscriptState {
    pub fn header(&self) -> Option<String> {
        self.ticket.as_ref().map(|t| format!("Protocolo: {}", t.protocol))
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        if self.ticket.is_none() {
            Some(NO_TICKET_SELECTED)
        } else if !self.loading && self.messages.is_empty() {
            Some(NO_MESSAGES)
        } else {
            None
        }
    }

    pub fn views(&self) -> Vec<MessageView> {
        self.messages.iter().map(MessageView::from).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaView {
    pub kind: FileKind,
    pub name: String,
    pub url: String,
    pub size: String,
    pub icon: &'static str,
}

impl From<&Attachment> for MediaView {
    fn from(a: &Attachment) -> Self {
        let kind = FileKind::of(a);
        Self {
            kind,
            name: a.name.clone(),
            url: a.url.clone(),
            size: format_file_size(a.size),
            icon: kind.icon(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    /// Each element shown on its own.
    Parts(Vec<String>),
    Card { title: String, options: Vec<String> },
    Media(MediaView),
    /// Unrecognized structure, serialized.
    Raw(String),
}

impl From<&MessageContent> for Body {
    fn from(content: &MessageContent) -> Self {
        match content {
            MessageContent::Text(text) => Body::Text(text.clone()),
            MessageContent::Parts(parts) => Body::Parts(parts.clone()),
            MessageContent::OptionList { title, options } => Body::Card {
                title: title.clone(),
                options: options.clone(),
            },
            MessageContent::Media(a) => Body::Media(a.into()),
            MessageContent::Unknown(raw) => Body::Raw(raw.to_string()),
        }
    }
}

/// A transcript bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub id: String,
    pub role: SenderRole,
    pub sender: Option<String>,
    pub body: Body,
    pub meta: String,
}

impl From<&Message> for MessageView {
    fn from(m: &Message) -> Self {
        let mut meta = m.timestamp.as_deref().map(format_timestamp).unwrap_or_default();
        if let Some(status) = &m.delivery_status {
            meta.push_str(" • ");
            meta.push_str(status);
        }
        Self {
            id: m.id.clone(),
            role: m.role,
            sender: m.sender_name.clone(),
            body: Body::from(&m.content),
            meta,
        }
    }
}
