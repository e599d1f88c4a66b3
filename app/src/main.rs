mod config;
mod hud;

use adw::prelude::*;
use gtk::glib;
use std::cell::RefCell;
use std::rc::Rc;

use engine::{EngineProbe, PageProbe, PlainEngine};
use memory::{HeapSampleReceiver, ProcessRssSource};
use report::Monitor;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use hud::Hud;

const APP_ID: &str = "io.kestrel.Monitor";
const APP_TITLE: &str = "Kestrel";
const PANE_POSITION: i32 = 920;
const SEARCH_URL: &str = "https://duckduckgo.com/?q=";

fn main() -> glib::ExitCode {
    init_tracing();
    let app = adw::Application::builder().application_id(APP_ID).build();
    app.connect_activate(build_ui);
    app.run()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_ui(app: &adw::Application) {
    let style_manager = adw::StyleManager::default();
    style_manager.set_color_scheme(adw::ColorScheme::Default);

    let config = AppConfig::load();
    let monitor = Rc::new(RefCell::new(Monitor::new()));

    let monitor_for_events = Rc::clone(&monitor);
    let engine: Rc<dyn EngineProbe<View = webkit6::WebView>> =
        match PageProbe::attach(move |event| {
            monitor_for_events.borrow_mut().apply_page_event(event);
        }) {
            Some(probe) => Rc::new(probe),
            None => Rc::new(PlainEngine::new()),
        };

    let view = engine.create_view();
    view.set_hexpand(true);
    view.set_vexpand(true);
    engine.load_uri(&view, &config.default_uri);

    let hud = Hud::new();

    let paned = gtk::Paned::new(gtk::Orientation::Horizontal);
    paned.set_start_child(Some(&view));
    paned.set_end_child(Some(hud.root()));
    paned.set_position(PANE_POSITION);

    let header = adw::HeaderBar::new();
    header.set_show_start_title_buttons(true);
    header.set_show_end_title_buttons(true);

    let address = gtk::Entry::new();
    address.set_placeholder_text(Some("Enter a URL or search"));
    address.set_width_chars(40);
    header.pack_start(&address);

    let pause_button = gtk::ToggleButton::with_label("Pause sampling");
    header.pack_end(&pause_button);

    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.append(&header);
    root.append(&paned);

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title(APP_TITLE)
        .default_width(1280)
        .default_height(800)
        .content(&root)
        .build();
    window.present();

    let tick_handle = Rc::new(RefCell::new(Some(start_frame_sampling(&view, &monitor))));

    let monitor_for_toggle = Rc::clone(&monitor);
    let view_for_toggle = view.clone();
    let tick_handle_for_toggle = Rc::clone(&tick_handle);
    pause_button.connect_toggled(move |button| {
        if button.is_active() {
            if let Some(id) = tick_handle_for_toggle.borrow_mut().take() {
                id.remove();
            }
            monitor_for_toggle.borrow_mut().pause_frames();
        } else if tick_handle_for_toggle.borrow().is_none() {
            let id = start_frame_sampling(&view_for_toggle, &monitor_for_toggle);
            *tick_handle_for_toggle.borrow_mut() = Some(id);
        }
    });

    let engine_for_nav = Rc::clone(&engine);
    let view_for_nav = view.clone();
    address.connect_activate(move |entry| {
        if let Some(uri) = normalize_url(&entry.text()) {
            engine_for_nav.load_uri(&view_for_nav, &uri);
        }
    });

    let heap = HeapSampleReceiver::start(ProcessRssSource::new(), config.heap_sample_interval());

    let monitor_for_poll = Rc::clone(&monitor);
    let hud_for_poll = hud.clone();
    glib::timeout_add_local(config.hud_refresh_interval(), move || {
        let mut monitor = monitor_for_poll.borrow_mut();
        heap.drain_into(monitor.trend_mut());

        let summary = monitor.summary();
        let metrics = monitor.vitals_metrics();
        let grades = monitor.vitals_grades();
        let leak = monitor.detect_leaks();
        monitor.track_render("hud.refresh", || {
            hud_for_poll.update(&summary, &metrics, &grades, &leak);
        });

        if let Ok(snapshot) = serde_json::to_string(&summary) {
            debug!(%snapshot, "hud refresh");
        }
        glib::ControlFlow::Continue
    });
}

fn start_frame_sampling(
    view: &webkit6::WebView,
    monitor: &Rc<RefCell<Monitor>>,
) -> gtk::TickCallbackId {
    let monitor = Rc::clone(monitor);
    view.add_tick_callback(move |_, clock| {
        // Frame clock reports microseconds on a monotonic scale.
        monitor
            .borrow_mut()
            .record_frame(clock.frame_time() as f64 / 1000.0);
        glib::ControlFlow::Continue
    })
}

fn normalize_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.contains("://") || trimmed.starts_with("about:") {
        Some(trimmed.to_string())
    } else if trimmed.contains(' ') || !trimmed.contains('.') {
        Some(format!("{SEARCH_URL}{}", urlencoding::encode(trimmed)))
    } else {
        Some(format!("https://{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_url;

    #[test]
    fn full_urls_pass_through() {
        assert_eq!(
            normalize_url(" https://gnome.org "),
            Some("https://gnome.org".to_string())
        );
        assert_eq!(
            normalize_url("about:blank"),
            Some("about:blank".to_string())
        );
    }

    #[test]
    fn bare_hosts_gain_a_scheme() {
        assert_eq!(
            normalize_url("webkitgtk.org"),
            Some("https://webkitgtk.org".to_string())
        );
    }

    #[test]
    fn free_text_becomes_an_encoded_search() {
        assert_eq!(
            normalize_url("layout shift demo"),
            Some("https://duckduckgo.com/?q=layout%20shift%20demo".to_string())
        );
    }

    #[test]
    fn empty_input_is_ignored() {
        assert_eq!(normalize_url("   "), None);
    }
}
