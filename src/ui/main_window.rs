use crate::app::Settings;
use crate::panels::{Change, Notify, Timing, Viewer};
use crate::ui::chat_view::ChatView;
use crate::ui::sidebar::Sidebar;
use crate::ui::tickets::TicketsPanel;
use crate::ui::SharedSession;
use adw::prelude::*;
use adw::Application;
use std::sync::Arc;

pub fn show_main_window(app: &Application, session: SharedSession, settings: Settings) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Mais Chat - Viewer")
        .default_width(1280)
        .default_height(760)
        .build();

    // Panel changes are produced on the I/O runtime and drawn here.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Change>();
    let notify: Notify = Arc::new(move |change: Change| {
        let _ = tx.send(change);
    });
    let client = session.borrow().client().clone();
    let viewer = Viewer::new(
        client,
        crate::utils::RUNTIME.handle().clone(),
        Timing::from(&settings),
        notify,
    );

    let sidebar = Sidebar::new(&viewer);
    let tickets = TicketsPanel::new(&viewer);
    let chat = ChatView::new(&viewer, &settings.origin);

    let panels = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
    panels.append(&sidebar.widget());
    panels.append(&gtk4::Separator::new(gtk4::Orientation::Vertical));
    panels.append(&tickets.widget());
    panels.append(&gtk4::Separator::new(gtk4::Orientation::Vertical));
    panels.append(&chat.widget());

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = adw::WindowTitle::new("Mais Chat - Viewer", "Visualizador de Atendimentos");
    header.set_title_widget(Some(&title));
    let logout_btn = gtk4::Button::with_label("Sair");
    logout_btn.add_css_class("destructive-action");
    header.pack_end(&logout_btn);
    container.append(&header);
    container.append(&panels);
    window.set_content(Some(&container));

    sidebar.refresh();
    tickets.refresh_filters();
    tickets.refresh_list();
    chat.refresh();
    window.present();

    {
        let window = window.downgrade();
        glib::MainContext::default().spawn_local(async move {
            while let Some(change) = rx.recv().await {
                if window.upgrade().is_none() {
                    break;
                }
                match change {
                    Change::Contacts => sidebar.refresh(),
                    Change::Filters => tickets.refresh_filters(),
                    Change::Tickets => tickets.refresh_list(),
                    Change::Messages => chat.refresh(),
                }
            }
        });
    }

    {
        let app = app.clone();
        let window = window.clone();
        let viewer = viewer.clone();
        logout_btn.connect_clicked(move |_| {
            viewer.reset();
            session.borrow_mut().logout();
            crate::ui::login::show_login_window(&app, session.clone(), settings.clone());
            window.close();
        });
    }

    viewer.load_contacts();
}
