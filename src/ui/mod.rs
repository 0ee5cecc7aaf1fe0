pub mod chat_view;
pub mod login;
pub mod main_window;
pub mod sidebar;
pub mod tickets;

use crate::api::ApiClient;
use crate::app::Settings;
use crate::session::Session;
use crate::storage::LocalStore;
use adw::prelude::*;
use adw::Application;
use std::cell::RefCell;
use std::rc::Rc;

pub type SharedSession = Rc<RefCell<Session>>;

fn open_session(settings: &Settings) -> Result<Session, String> {
    let client = ApiClient::with_timeout(&settings.api_base(), settings.request_timeout())
        .map_err(|e| e.to_string())?;
    let store = LocalStore::open_default().map_err(|e| e.to_string())?;
    Ok(Session::new(client, store))
}

/// Shows the main window when a stored session exists, the login form
/// otherwise.
pub fn build_ui(app: &Application) {
    let settings = Settings::load();
    log::info!("api base: {}", settings.api_base());
    let mut session = match open_session(&settings) {
        Ok(s) => s,
        Err(err) => {
            log::error!("startup failed: {err}");
            show_startup_error(app, &err);
            return;
        }
    };
    let authenticated = session.restore();
    let session = Rc::new(RefCell::new(session));
    if authenticated {
        main_window::show_main_window(app, session, settings);
    } else {
        login::show_login_window(app, session, settings);
    }
}

fn show_startup_error(app: &Application, err: &str) {
    let page = adw::StatusPage::builder()
        .icon_name("dialog-error-symbolic")
        .title("Não foi possível iniciar")
        .description(err)
        .build();
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Mais Chat - Viewer")
        .default_width(480)
        .default_height(320)
        .build();
    window.set_content(Some(&page));
    window.present();
}
