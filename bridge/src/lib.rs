use serde::Deserialize;
use thiserror::Error;

/// Script-message handler name the observer script posts through.
pub const MESSAGE_HANDLER: &str = "kestrel";

/// Performance event reported by the instrumented page.
///
/// The page posts each event as a JSON string through the `kestrel` script
/// message handler; field names follow the performance-entry attributes they
/// are read from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PageEvent {
    /// A paint-timing entry (`first-paint`, `first-contentful-paint`).
    #[serde(rename_all = "camelCase")]
    Paint { name: String, start_time: f64 },

    /// A largest-contentful-paint candidate.
    #[serde(rename_all = "camelCase")]
    LargestContentfulPaint { start_time: f64 },

    /// A layout-shift entry with its recent-input flag.
    #[serde(rename_all = "camelCase")]
    LayoutShift { value: f64, had_recent_input: bool },

    /// First-input delay (processing start minus input start).
    FirstInput { delay: f64 },

    /// An event-timing entry for a slow user interaction.
    Event {
        name: String,
        target: String,
        duration: f64,
    },

    /// A user-timing measure emitted by page components.
    Measure { name: String, duration: f64 },
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("malformed page event: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Decodes one raw script-message payload.
pub fn decode(raw: &str) -> Result<PageEvent, BridgeError> {
    Ok(serde_json::from_str(raw)?)
}

/// Injected at document start into every monitored page.
///
/// Every capability is probed individually: no observer support means no
/// events at all, and an entry type the engine cannot observe is skipped
/// while the rest keep reporting. Payloads are posted as JSON strings so
/// the host sees plain text regardless of the page's object model.
pub const OBSERVER_SCRIPT: &str = r#"
(function () {
    if (!window.webkit || !window.webkit.messageHandlers ||
        !window.webkit.messageHandlers.kestrel) {
        return;
    }
    var post = function (event) {
        try {
            window.webkit.messageHandlers.kestrel.postMessage(JSON.stringify(event));
        } catch (e) {}
    };
    if (typeof PerformanceObserver === 'undefined') {
        return;
    }
    var observe = function (type, handle) {
        try {
            new PerformanceObserver(function (list) {
                list.getEntries().forEach(handle);
            }).observe({ type: type, buffered: true });
        } catch (e) {}
    };
    observe('paint', function (entry) {
        post({ kind: 'paint', name: entry.name, startTime: entry.startTime });
    });
    observe('largest-contentful-paint', function (entry) {
        post({
            kind: 'largest-contentful-paint',
            startTime: entry.renderTime || entry.loadTime
        });
    });
    observe('layout-shift', function (entry) {
        post({
            kind: 'layout-shift',
            value: entry.value,
            hadRecentInput: !!entry.hadRecentInput
        });
    });
    observe('first-input', function (entry) {
        post({
            kind: 'first-input',
            delay: entry.processingStart - entry.startTime
        });
    });
    observe('event', function (entry) {
        post({
            kind: 'event',
            name: entry.name,
            target: entry.target && entry.target.tagName ? entry.target.tagName : 'unknown',
            duration: entry.duration
        });
    });
    observe('measure', function (entry) {
        post({ kind: 'measure', name: entry.name, duration: entry.duration });
    });
})();
"#;
