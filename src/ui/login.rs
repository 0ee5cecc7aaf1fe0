use crate::app::Settings;
use crate::ui::SharedSession;
use adw::prelude::*;
use adw::Application;
use gtk4 as gtk;
use std::rc::Rc;

pub fn show_login_window(app: &Application, session: SharedSession, settings: Settings) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Mais Chat - Viewer")
        .default_width(420)
        .default_height(320)
        .resizable(false)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some("Mais Chat - Viewer"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    let subtitle = gtk::Label::new(Some("Faça login para acessar"));
    subtitle.add_css_class("dim-label");
    subtitle.set_halign(gtk::Align::Start);
    root.append(&subtitle);

    let user_entry = gtk::Entry::new();
    user_entry.set_placeholder_text(Some("Digite seu usuário"));
    user_entry.set_hexpand(true);

    let pass_entry = gtk::PasswordEntry::new();
    pass_entry.set_show_peek_icon(true);
    pass_entry.set_hexpand(true);

    let form = gtk::Box::new(gtk::Orientation::Vertical, 8);
    form.append(&gtk::Label::builder().label("Usuário").halign(gtk::Align::Start).build());
    form.append(&user_entry);
    form.append(&gtk::Label::builder().label("Senha").halign(gtk::Align::Start).build());
    form.append(&pass_entry);
    root.append(&form);

    let status = gtk::Label::new(None);
    status.add_css_class("error");
    status.set_halign(gtk::Align::Start);
    root.append(&status);

    let login_btn = gtk::Button::with_label("Entrar");
    login_btn.add_css_class("suggested-action");
    login_btn.set_halign(gtk::Align::End);
    root.append(&login_btn);

    toast_overlay.set_child(Some(&root));
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    container.append(&header);
    container.append(&toast_overlay);
    window.set_content(Some(&container));

    let in_flight = crate::utils::InFlight::default();
    let on_connect = {
        let app = app.clone();
        let window = window.clone();
        let overlay = toast_overlay.clone();
        let user_entry = user_entry.clone();
        let pass_entry = pass_entry.clone();
        let login_btn = login_btn.clone();
        move || {
            let username = user_entry.text().to_string();
            let password = pass_entry.text().to_string();
            if username.trim().is_empty() || password.is_empty() {
                overlay.add_toast(adw::Toast::new("Informe usuário e senha."));
                return;
            }

            // Enter in either field must not start a second exchange.
            let Some(guard) = in_flight.begin() else {
                return;
            };
            status.set_label("");
            login_btn.set_sensitive(false);
            login_btn.set_label("Entrando...");

            // The session travels to the I/O runtime and comes back with the outcome.
            let mut pending = session.borrow().clone();
            let session = session.clone();
            let settings = settings.clone();
            let app = app.clone();
            let window = window.clone();
            let status = status.clone();
            let login_btn = login_btn.clone();
            crate::utils::run_async_to_main(
                async move {
                    let result = pending.authenticate(&username, &password).await;
                    (pending, result)
                },
                move |(updated, result)| {
                    drop(guard);
                    *session.borrow_mut() = updated;
                    login_btn.set_sensitive(true);
                    login_btn.set_label("Entrar");
                    match result {
                        Ok(()) => {
                            crate::ui::main_window::show_main_window(&app, session, settings);
                            window.close();
                        }
                        Err(err) => status.set_label(err.user_message()),
                    }
                },
            );
        }
    };

    let on_connect: Rc<dyn Fn()> = Rc::new(on_connect);
    {
        let on_connect = on_connect.clone();
        login_btn.connect_clicked(move |_| (on_connect)());
    }
    {
        let on_connect = on_connect.clone();
        user_entry.connect_activate(move |_| (on_connect)());
    }
    {
        let on_connect = on_connect.clone();
        pass_entry.connect_activate(move |_| (on_connect)());
    }

    window.present();
}
