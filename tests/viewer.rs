use maischat_viewer::api::models::{Contact, Ticket, TicketStatus};
use maischat_viewer::api::ApiClient;
use maischat_viewer::calendar::{ClickOutcome, DayCell};
use maischat_viewer::panels::directory::CONTACTS_ERROR;
use maischat_viewer::panels::{Change, Notify, Timing, Viewer};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEBOUNCE: Duration = Duration::from_millis(200);

fn viewer_for(server: &MockServer) -> Viewer {
    let client = ApiClient::new(&format!("{}/api", server.uri())).unwrap();
    client.set_bearer(Some("tok".into()));
    let notify: Notify = Arc::new(|_: Change| {});
    let timing = Timing {
        debounce: DEBOUNCE,
        calendar_close: Duration::from_millis(50),
    };
    Viewer::new(client, Handle::current(), timing, notify)
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

fn contact(id: &str) -> Contact {
    Contact {
        id: id.to_string(),
        name: Some(format!("Contato {id}")),
        phone: "5511987654321".to_string(),
        total_tickets: 1,
    }
}

fn ticket(id: &str) -> Ticket {
    Ticket {
        id: id.to_string(),
        protocol: format!("P-{id}"),
        status: TicketStatus::Finished,
        started_at: None,
        ended_at: None,
    }
}

fn day_cell(viewer: &Viewer, day: u32) -> DayCell {
    viewer
        .tickets()
        .picker
        .grid()
        .into_iter()
        .find(|c| c.in_month && c.day() == day)
        .unwrap()
}

async fn requests_to(server: &MockServer, route: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == route)
        .collect()
}

async fn wait_for_requests(server: &MockServer, route: &str, count: usize) {
    for _ in 0..500 {
        if requests_to(server, route).await.len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {count} requests to {route}");
}

#[tokio::test]
async fn test_search_debounces_to_single_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contatos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "c1", "nome": "João", "telefone": "5511987654321", "totalAtendimentos": 3}]
        })))
        .mount(&server)
        .await;

    let viewer = viewer_for(&server);
    for term in ["j", "jo", "joã", "joão"] {
        viewer.set_search(term);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    wait_until(|| !viewer.directory().contacts.is_empty()).await;
    tokio::time::sleep(DEBOUNCE * 2).await;

    let requests = requests_to(&server, "/api/contatos").await;
    assert_eq!(requests.len(), 1);
    let search: Vec<String> = requests[0]
        .url
        .query_pairs()
        .filter(|(k, _)| k == "search")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(search, vec!["joão".to_string()]);

    let state = viewer.directory();
    assert_eq!(state.contacts[0].id, "c1");
    assert!(!state.loading);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_failed_contact_load_keeps_list_and_sets_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contatos"))
        .and(query_param("search", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "c1", "telefone": "1", "totalAtendimentos": 0}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/contatos"))
        .and(query_param("search", "x"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let viewer = viewer_for(&server);
    viewer.load_contacts();
    wait_until(|| viewer.directory().contacts.len() == 1).await;

    viewer.set_search("x");
    wait_until(|| viewer.directory().error.is_some()).await;
    let state = viewer.directory();
    assert_eq!(state.error, Some(CONTACTS_ERROR));
    assert_eq!(state.contacts.len(), 1);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_selecting_contact_resets_filters_before_loading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contatos/a/atendimentos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"_id": "ta", "protocolo": "111", "status": "F"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/contatos/b/atendimentos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"_id": "tb", "protocolo": "222", "status": "A"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/atendimentos/ta/mensagens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"_id": "m1", "mensagem": "oi"}]
        })))
        .mount(&server)
        .await;

    let viewer = viewer_for(&server);
    viewer.select_contact(contact("a"));
    wait_until(|| viewer.tickets().tickets.len() == 1).await;
    viewer.select_ticket(ticket("ta"));
    wait_until(|| viewer.transcript().messages.len() == 1).await;
    // Pending debounced reload, superseded by the next selection.
    viewer.set_protocol("111");
    viewer.set_date_bounds("2024-01-01", "2024-01-31");

    viewer.select_contact(contact("b"));
    let tickets = viewer.tickets();
    assert_eq!(tickets.contact.as_ref().map(|c| c.id.as_str()), Some("b"));
    assert!(tickets.tickets.is_empty());
    assert_eq!(tickets.selected, None);
    assert_eq!(tickets.protocol, "");
    assert_eq!(tickets.date_start, "");
    assert_eq!(tickets.date_end, "");
    let transcript = viewer.transcript();
    assert!(transcript.ticket.is_none());
    assert!(transcript.messages.is_empty());

    wait_until(|| viewer.tickets().tickets.first().map(|t| t.id.as_str() == "tb").unwrap_or(false)).await;
    let requests = requests_to(&server, "/api/contatos/b/atendimentos").await;
    assert_eq!(requests.len(), 1);
    let keys: Vec<String> = requests[0].url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    assert_eq!(keys, vec!["limit".to_string()]);
}

#[tokio::test]
async fn test_newer_ticket_load_wins_over_slow_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contatos/slow/atendimentos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"_id": "old", "protocolo": "1", "status": "F"}]}))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/contatos/fast/atendimentos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"_id": "new", "protocolo": "2", "status": "A"}]
        })))
        .mount(&server)
        .await;

    let viewer = viewer_for(&server);
    viewer.select_contact(contact("slow"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    viewer.select_contact(contact("fast"));
    wait_until(|| !viewer.tickets().tickets.is_empty()).await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    let state = viewer.tickets();
    assert_eq!(state.tickets.len(), 1);
    assert_eq!(state.tickets[0].id, "new");
    assert!(!state.loading);
}

#[tokio::test]
async fn test_calendar_range_commits_reloads_and_closes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contatos/c/atendimentos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let viewer = viewer_for(&server);
    viewer.select_contact(contact("c"));
    wait_for_requests(&server, "/api/contatos/c/atendimentos", 1).await;
    wait_until(|| !viewer.tickets().loading).await;

    assert!(viewer.toggle_calendar());
    viewer.show_month(2024, 3);
    let outside = viewer.tickets().picker.grid()[0];
    assert!(!outside.in_month);
    assert_eq!(viewer.click_calendar_cell(&outside), ClickOutcome::Ignored);
    assert!(matches!(viewer.click_calendar_cell(&day_cell(&viewer, 20)), ClickOutcome::Started(_)));
    assert!(matches!(viewer.click_calendar_cell(&day_cell(&viewer, 5)), ClickOutcome::Completed(_)));

    let state = viewer.tickets();
    assert_eq!(state.date_start, "2024-03-05");
    assert_eq!(state.date_end, "2024-03-20");
    assert_eq!(state.filter_label().as_deref(), Some("De 05/03/2024 até 20/03/2024"));

    wait_until(|| !viewer.tickets().picker.is_open()).await;
    wait_for_requests(&server, "/api/contatos/c/atendimentos", 2).await;
    tokio::time::sleep(DEBOUNCE).await;

    let requests = requests_to(&server, "/api/contatos/c/atendimentos").await;
    assert_eq!(requests.len(), 2);
    let last = requests.last().unwrap();
    let pairs: Vec<(String, String)> = last
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(pairs.contains(&("dataInicio".to_string(), "2024-03-05".to_string())));
    assert!(pairs.contains(&("dataFim".to_string(), "2024-03-20".to_string())));

    viewer.clear_date_filter();
    let state = viewer.tickets();
    assert_eq!(state.date_start, "");
    assert_eq!(state.filter_label(), None);
}

#[tokio::test]
async fn test_filters_without_contact_do_not_request() {
    let server = MockServer::start().await;
    let viewer = viewer_for(&server);
    viewer.set_protocol("123");
    tokio::time::sleep(DEBOUNCE * 2).await;
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reset_clears_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/contatos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "c1", "telefone": "1", "totalAtendimentos": 0}]
        })))
        .mount(&server)
        .await;

    let viewer = viewer_for(&server);
    viewer.load_contacts();
    wait_until(|| !viewer.directory().contacts.is_empty()).await;
    viewer.reset();
    assert!(viewer.directory().contacts.is_empty());
    assert!(viewer.tickets().contact.is_none());
    assert!(viewer.transcript().ticket.is_none());
}
