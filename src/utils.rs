use once_cell::sync::Lazy;
use std::cell::Cell;
use std::rc::Rc;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("maischat-io")
        .build()
        .expect("Failed to build Tokio runtime")
});

pub fn spawn_async<F>(fut: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    RUNTIME.spawn(fut);
}

/// Runs `fut` on the I/O runtime and hands its output to `on_done` on the
/// GLib main context.
#[cfg(feature = "gui")]
pub fn run_async_to_main<T, Fut, F>(fut: Fut, on_done: F)
where
    T: Send + 'static,
    Fut: std::future::Future<Output = T> + Send + 'static,
    F: FnOnce(T) + 'static,
{
    let (tx, rx) = tokio::sync::oneshot::channel::<T>();
    spawn_async(async move {
        let _ = tx.send(fut.await);
    });
    glib::MainContext::default().spawn_local(async move {
        if let Ok(value) = rx.await {
            on_done(value);
        }
    });
}

/// Main-thread flag for an action that must not run twice at once.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Rc<Cell<bool>>);

impl InFlight {
    /// `None` while a previous guard is alive.
    pub fn begin(&self) -> Option<InFlightGuard> {
        if self.0.replace(true) {
            None
        } else {
            Some(InFlightGuard(self.0.clone()))
        }
    }

    pub fn is_active(&self) -> bool {
        self.0.get()
    }
}

/// Clears its [`InFlight`] when dropped.
#[derive(Debug)]
pub struct InFlightGuard(Rc<Cell<bool>>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Collapses repeated slashes that do not follow a `:` (so `http://` survives).
pub fn normalize_url(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c == '/' && out.ends_with('/') {
            let before = out[..out.len() - 1].chars().next_back();
            if matches!(before, Some(p) if p != ':') {
                continue;
            }
        }
        out.push(c);
    }
    out
}

pub fn ensure_scheme(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Media links may come relative to the server (`/arquivos/...`).
pub fn resolve_media_url(origin: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }
    url::Url::parse(&ensure_scheme(origin))
        .and_then(|base| base.join(link))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| link.to_string())
}
