use adw::prelude::*;
use adw::Application;

fn main() -> glib::ExitCode {
    env_logger::init();
    let app = Application::builder()
        .application_id("br.com.maischat.Viewer")
        .build();
    app.connect_activate(|app| {
        maischat_viewer::ui::build_ui(app);
    });
    app.run()
}
