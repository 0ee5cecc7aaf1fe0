use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: String,
    pub name: Option<String>,
    pub phone: String,
    pub total_tickets: u64,
}

impl Contact {
    /// Builds a contact from one element of the `/contatos` payload. Null or
    /// missing fields fall back to empty values; only the id is required.
    pub fn from_value(item: &Value) -> Option<Self> {
        let id = item.get("id").and_then(value_id)?;
        let phone = item
            .get("telefone")
            .map(|v| match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => String::new(),
            })
            .unwrap_or_default();
        Some(Self {
            id,
            name: str_field(item, "nome"),
            phone,
            total_tickets: item.get("totalAtendimentos").and_then(count).unwrap_or(0),
        })
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => "Sem nome",
        }
    }

    pub fn initial(&self) -> String {
        self.name
            .as_deref()
            .and_then(|n| n.chars().next())
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

fn value_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(value_id),
        _ => None,
    }
}

fn str_field(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Non-negative count sent as a number or a numeric string.
fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TicketStatus {
    Active,
    Finished,
    Waiting,
    Transferred,
    Other(String),
}

impl TicketStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "A" => Self::Active,
            "F" => Self::Finished,
            "E" => Self::Waiting,
            "T" => Self::Transferred,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Active => "A",
            Self::Finished => "F",
            Self::Waiting => "E",
            Self::Transferred => "T",
            Self::Other(code) => code,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Active => "Ativo",
            Self::Finished => "Finalizado",
            Self::Waiting => "Em espera",
            Self::Transferred => "Transferido",
            Self::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub id: String,
    pub protocol: String,
    pub status: TicketStatus,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

impl Ticket {
    /// Builds a ticket from one element of the `/atendimentos` payload.
    /// Returns `None` when no usable id is present.
    pub fn from_value(item: &Value) -> Option<Self> {
        let id = item
            .get("_id")
            .and_then(value_id)
            .or_else(|| item.get("id").and_then(value_id))?;
        let protocol = item
            .get("protocolo")
            .map(|v| match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        let status = TicketStatus::from_code(item.get("status").and_then(|v| v.as_str()).unwrap_or(""));
        Some(Self {
            id,
            protocol,
            status,
            started_at: str_field(item, "date"),
            ended_at: str_field(item, "fim").filter(|s| !s.is_empty()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Attendant,
    Contact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
    pub mime: Option<String>,
    pub size: Option<u64>,
}

impl Attachment {
    /// Reads an `arquivo` descriptor. Only a non-empty `url` is required.
    pub fn from_value(file: &Value) -> Option<Self> {
        let url = str_field(file, "url").filter(|u| !u.is_empty())?;
        Some(Self {
            name: str_field(file, "nome").unwrap_or_default(),
            url,
            mime: str_field(file, "tipo").filter(|t| !t.is_empty()),
            size: file.get("size").and_then(count),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<String>),
    OptionList { title: String, options: Vec<String> },
    Media(Attachment),
    Unknown(Value),
}

impl MessageContent {
    /// Classifies a raw message payload once, at ingestion.
    pub fn from_message(item: &Value) -> Self {
        if item.get("tipo").and_then(|v| v.as_str()) == Some("midia") {
            if let Some(attachment) = item.get("arquivo").and_then(Attachment::from_value) {
                return Self::Media(attachment);
            }
        }

        let raw = ["mensagem", "texto", "message", "objeto"]
            .iter()
            .filter_map(|key| item.get(*key))
            .find(|v| !is_blank(v));
        match raw {
            None => Self::Text(String::new()),
            Some(value) => Self::from_raw(value),
        }
    }

    pub fn from_raw(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::Parts(items.iter().map(part_text).collect()),
            Value::Object(map) if map.get("titulo").is_some_and(has_title) => {
                let title = map.get("titulo").map(part_text).unwrap_or_default();
                let options = map
                    .get("opcoes")
                    .and_then(|o| o.as_array())
                    .map(|ops| ops.iter().map(part_text).collect())
                    .unwrap_or_default();
                Self::OptionList { title, options }
            }
            other => Self::Unknown(other.clone()),
        }
    }
}

// An empty string still counts as a title; null, false and zero do not.
fn has_title(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn part_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: String,
    pub timestamp: Option<String>,
    pub sender_name: Option<String>,
    pub role: SenderRole,
    pub content: MessageContent,
    pub delivery_status: Option<String>,
}

impl Message {
    pub fn from_value(item: &Value) -> Self {
        let id = item
            .get("_id")
            .and_then(value_id)
            .or_else(|| item.get("id").and_then(value_id))
            .unwrap_or_else(|| item.to_string());
        let timestamp = str_field(item, "data")
            .or_else(|| str_field(item, "createdAt"))
            .or_else(|| str_field(item, "date"));
        let sender_name = str_field(item, "atendenteNome").filter(|n| !n.is_empty());
        let role = item
            .get("senderRole")
            .and_then(|v| serde_json::from_value::<SenderRole>(v.clone()).ok())
            .unwrap_or(if sender_name.is_some() {
                SenderRole::Attendant
            } else {
                SenderRole::Contact
            });
        let delivery_status = item
            .get("statusEnvio")
            .and_then(|s| s.get("status"))
            .and_then(|s| s.as_str())
            .map(str::to_string);
        Self {
            id,
            timestamp,
            sender_name,
            role,
            content: MessageContent::from_message(item),
            delivery_status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contact_from_wire_names() {
        let contact = Contact::from_value(&json!({
            "id": 42,
            "nome": "joão silva",
            "telefone": "5511987654321",
            "totalAtendimentos": 3
        }))
        .unwrap();
        assert_eq!(contact.id, "42");
        assert_eq!(contact.display_name(), "joão silva");
        assert_eq!(contact.initial(), "J");
        assert_eq!(contact.total_tickets, 3);
    }

    #[test]
    fn contact_without_name() {
        let contact = Contact::from_value(&json!({"id": "c1", "telefone": "123"})).unwrap();
        assert_eq!(contact.display_name(), "Sem nome");
        assert_eq!(contact.initial(), "?");
    }

    #[test]
    fn contact_tolerates_null_fields() {
        let contact = Contact::from_value(&json!({
            "id": "c2",
            "nome": null,
            "telefone": null,
            "totalAtendimentos": null
        }))
        .unwrap();
        assert_eq!(contact.name, None);
        assert_eq!(contact.phone, "");
        assert_eq!(contact.total_tickets, 0);

        let contact = Contact::from_value(&json!({"id": 3, "telefone": 5511999, "totalAtendimentos": "4"})).unwrap();
        assert_eq!(contact.phone, "5511999");
        assert_eq!(contact.total_tickets, 4);

        assert!(Contact::from_value(&json!({"nome": "sem id"})).is_none());
    }

    #[test]
    fn ticket_accepts_oid_and_plain_ids() {
        let t = Ticket::from_value(&json!({
            "_id": {"$oid": "65f0"},
            "protocolo": "2024000123",
            "status": "F",
            "date": "2024-03-01T12:00:00Z",
            "fim": "2024-03-01T12:30:00Z"
        }))
        .unwrap();
        assert_eq!(t.id, "65f0");
        assert_eq!(t.status, TicketStatus::Finished);
        assert_eq!(t.status.label(), "Finalizado");
        assert_eq!(t.ended_at.as_deref(), Some("2024-03-01T12:30:00Z"));

        let t = Ticket::from_value(&json!({"id": "t-9", "protocolo": 77, "status": "X"})).unwrap();
        assert_eq!(t.id, "t-9");
        assert_eq!(t.protocol, "77");
        assert_eq!(t.status.label(), "X");

        assert!(Ticket::from_value(&json!({"protocolo": "1"})).is_none());
    }

    #[test]
    fn content_variants() {
        assert_eq!(
            MessageContent::from_message(&json!({"mensagem": "olá"})),
            MessageContent::Text("olá".into())
        );
        assert_eq!(
            MessageContent::from_message(&json!({"texto": ["a", {"b": 1}]})),
            MessageContent::Parts(vec!["a".into(), "{\"b\":1}".into()])
        );
        assert_eq!(
            MessageContent::from_message(&json!({"objeto": {"titulo": "Menu", "opcoes": ["1 - Suporte", 2]}})),
            MessageContent::OptionList {
                title: "Menu".into(),
                options: vec!["1 - Suporte".into(), "2".into()]
            }
        );
        assert_eq!(
            MessageContent::from_message(&json!({"message": {"foo": "bar"}})),
            MessageContent::Unknown(json!({"foo": "bar"}))
        );
        assert_eq!(MessageContent::from_message(&json!({})), MessageContent::Text(String::new()));
    }

    #[test]
    fn media_requires_url() {
        let media = MessageContent::from_message(&json!({
            "tipo": "midia",
            "arquivo": {"nome": "foto.png", "url": "/arquivos/foto.png", "tipo": "image/png", "size": 2048}
        }));
        match media {
            MessageContent::Media(a) => {
                assert_eq!(a.name, "foto.png");
                assert_eq!(a.size, Some(2048));
            }
            other => panic!("expected media, got {other:?}"),
        }

        let no_url = MessageContent::from_message(&json!({
            "tipo": "midia",
            "arquivo": {"nome": "foto.png"},
            "mensagem": "legenda"
        }));
        assert_eq!(no_url, MessageContent::Text("legenda".into()));
    }

    #[test]
    fn media_with_null_name_or_string_size() {
        let media = MessageContent::from_message(&json!({
            "tipo": "midia",
            "arquivo": {"nome": null, "url": "/arquivos/x.png", "tipo": "image/png"}
        }));
        match media {
            MessageContent::Media(a) => {
                assert_eq!(a.name, "");
                assert_eq!(a.url, "/arquivos/x.png");
                assert_eq!(a.mime.as_deref(), Some("image/png"));
                assert_eq!(a.size, None);
            }
            other => panic!("expected media, got {other:?}"),
        }

        let media = MessageContent::from_message(&json!({
            "tipo": "midia",
            "arquivo": {"nome": "a.png", "url": "/arquivos/a.png", "size": "2048"}
        }));
        match media {
            MessageContent::Media(a) => assert_eq!(a.size, Some(2048)),
            other => panic!("expected media, got {other:?}"),
        }

        let media = MessageContent::from_message(&json!({
            "tipo": "midia",
            "arquivo": {"nome": "a.bin", "url": "/arquivos/a.bin", "size": "grande"}
        }));
        assert!(matches!(media, MessageContent::Media(Attachment { size: None, .. })));
    }

    #[test]
    fn falsy_title_is_not_an_option_list() {
        assert_eq!(
            MessageContent::from_raw(&json!({"titulo": 0, "opcoes": ["a"]})),
            MessageContent::Unknown(json!({"titulo": 0, "opcoes": ["a"]}))
        );
        assert_eq!(
            MessageContent::from_raw(&json!({"titulo": null})),
            MessageContent::Unknown(json!({"titulo": null}))
        );
        assert_eq!(
            MessageContent::from_raw(&json!({"titulo": "", "opcoes": []})),
            MessageContent::OptionList {
                title: String::new(),
                options: vec![]
            }
        );
    }

    #[test]
    fn sender_role_prefers_explicit_field() {
        let m = Message::from_value(&json!({"_id": "m1", "atendenteNome": "Ana", "mensagem": "oi"}));
        assert_eq!(m.role, SenderRole::Attendant);

        let m = Message::from_value(&json!({"_id": "m2", "atendenteNome": "", "mensagem": "oi"}));
        assert_eq!(m.role, SenderRole::Contact);
        assert_eq!(m.sender_name, None);

        let m = Message::from_value(&json!({
            "_id": "m3",
            "atendenteNome": "Bruno",
            "senderRole": "contact",
            "createdAt": "2024-01-01T10:00:00Z",
            "statusEnvio": {"status": "lida"}
        }));
        assert_eq!(m.role, SenderRole::Contact);
        assert_eq!(m.timestamp.as_deref(), Some("2024-01-01T10:00:00Z"));
        assert_eq!(m.delivery_status.as_deref(), Some("lida"));
    }
}
