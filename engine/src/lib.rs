use tracing::{debug, warn};
use webkit6::prelude::*;

use bridge::PageEvent;

/// Interface to the embedding web engine.
pub trait EngineProbe {
    type View;

    /// Creates a new view instance.
    fn create_view(&self) -> Self::View;

    /// Loads a URI into the provided view.
    fn load_uri(&self, view: &Self::View, uri: &str);
}

/// WebKitGTK probe that instruments every view it creates.
///
/// The probe owns a `UserContentManager` carrying the observer script and
/// the script-message handler, so instrumentation travels with each view
/// built through it.
pub struct PageProbe {
    manager: webkit6::UserContentManager,
}

impl PageProbe {
    /// Registers the script-message handler, injects the observer script,
    /// and routes decoded events to `handler`.
    ///
    /// Returns `None` when the handler cannot be registered; callers fall
    /// back to an uninstrumented engine and the page simply reports no data.
    pub fn attach<F: Fn(PageEvent) + 'static>(handler: F) -> Option<Self> {
        let manager = webkit6::UserContentManager::new();
        if !manager.register_script_message_handler(bridge::MESSAGE_HANDLER, None) {
            warn!("script message handler registration failed; page instrumentation disabled");
            return None;
        }

        manager.connect_script_message_received(Some(bridge::MESSAGE_HANDLER), move |_, value| {
            let raw = value.to_str();
            match bridge::decode(&raw) {
                Ok(event) => handler(event),
                Err(err) => warn!(%err, "dropped page event"),
            }
        });

        let script = webkit6::UserScript::new(
            bridge::OBSERVER_SCRIPT,
            webkit6::UserContentInjectedFrames::TopFrame,
            webkit6::UserScriptInjectionTime::Start,
            &[],
            &[],
        );
        manager.add_script(&script);
        debug!("page instrumentation attached");

        Some(Self { manager })
    }
}

impl EngineProbe for PageProbe {
    type View = webkit6::WebView;

    fn create_view(&self) -> Self::View {
        webkit6::WebView::builder()
            .settings(&settings())
            .user_content_manager(&self.manager)
            .build()
    }

    fn load_uri(&self, view: &Self::View, uri: &str) {
        view.load_uri(uri);
    }
}

/// Uninstrumented engine for hosts where the probe cannot attach.
#[derive(Debug, Default)]
pub struct PlainEngine;

impl PlainEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EngineProbe for PlainEngine {
    type View = webkit6::WebView;

    fn create_view(&self) -> Self::View {
        webkit6::WebView::builder().settings(&settings()).build()
    }

    fn load_uri(&self, view: &Self::View, uri: &str) {
        view.load_uri(uri);
    }
}

fn settings() -> webkit6::Settings {
    webkit6::Settings::builder()
        .enable_javascript(true)
        .build()
}
