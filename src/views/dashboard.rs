//! Authenticated dashboard.
//!
//! Fetches the backend status over HTTP and keeps a live event stream over
//! the derived WebSocket URL. The stream authenticates with the stored token
//! as its first message and reconnects with capped exponential backoff.

use crate::app::Session;
use crate::theme::{theme, with_alpha, ThemeColors};
use crate::ui::tokens::{RADIUS_LG, RADIUS_STD, SPACE_LG, SPACE_MD, SPACE_SM, SPACE_XL, TEXT_MD, TEXT_MS, TEXT_SM, TEXT_XL};
use crate::views::components::button;
use crate::views::toast::ToastManager;
use gpui::prelude::*;
use gpui::*;
use portico_core::api::PanelStatus;
use portico_core::client::{ws_base_url, ApiError};
use portico_core::settings::{ConnectionSettings, SettingsRepo};
use portico_core::ws::{WsInbound, WsOutbound};
use std::sync::Arc;
use tokio_tungstenite::tungstenite;

/// Oldest events are dropped past this count.
const MAX_EVENTS: usize = 100;

/// Give up reconnecting after this many consecutive failures.
const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Ceiling for the reconnect backoff.
const MAX_BACKOFF_SECS: u64 = 30;

/// Timeout for the WebSocket auth handshake.
const AUTH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Status of the event stream connection.
#[derive(Clone, Debug, PartialEq, Eq)]
enum StreamStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Error(String),
}

impl StreamStatus {
    fn label(&self) -> String {
        match self {
            StreamStatus::Disconnected => "disconnected".into(),
            StreamStatus::Connecting => "connecting…".into(),
            StreamStatus::Connected => "connected".into(),
            StreamStatus::Reconnecting { attempt } => format!("reconnecting ({})", attempt),
            StreamStatus::Error(_) => "error".into(),
        }
    }

    fn color(&self, t: &ThemeColors) -> u32 {
        match self {
            StreamStatus::Connected => t.success,
            StreamStatus::Connecting | StreamStatus::Reconnecting { .. } => t.warning,
            StreamStatus::Error(_) => t.error,
            StreamStatus::Disconnected => t.text_muted,
        }
    }
}

/// One rendered event line.
#[derive(Clone, Debug)]
struct PanelEvent {
    level: String,
    message: String,
}

/// Results of background work, pumped back onto the UI thread.
enum DashboardTask {
    Status(Result<PanelStatus, ApiError>),
    Stream(StreamStatus),
    Event(PanelEvent),
    LogExported(Result<std::path::PathBuf, String>),
}

/// Failures inside one stream session, split by whether retrying can help.
enum StreamError {
    /// Token or configuration problem — reconnecting will not fix it.
    Fatal(String),
    /// Network problem — retry with backoff.
    Transient(String),
}

pub enum DashboardPageEvent {
    LoggedOut,
}

impl EventEmitter<DashboardPageEvent> for DashboardPage {}

pub struct DashboardPage {
    session: Arc<Session>,
    focus_handle: FocusHandle,
    status: Option<PanelStatus>,
    status_error: Option<String>,
    stream: StreamStatus,
    events: Vec<PanelEvent>,
    exporting_log: bool,
    task_tx: async_channel::Sender<DashboardTask>,
    ws_abort: Option<tokio::task::AbortHandle>,
}

impl DashboardPage {
    pub fn new(session: Arc<Session>, cx: &mut Context<Self>) -> Self {
        let (task_tx, task_rx) = async_channel::bounded::<DashboardTask>(64);

        // Pump background task results back into this entity.
        cx.spawn(async move |this: WeakEntity<Self>, cx| {
            while let Ok(task) = task_rx.recv().await {
                let alive = this
                    .update(cx, |this, cx| {
                        this.handle_task(task, cx);
                    })
                    .is_ok();
                if !alive {
                    break;
                }
            }
        })
        .detach();

        // Status fetch
        {
            let api = session.api.clone();
            let task_tx = task_tx.clone();
            session.runtime.spawn(async move {
                let result = api.panel_status().await;
                let _ = task_tx.send(DashboardTask::Status(result)).await;
            });
        }

        // Event stream
        let ws_task = {
            let repo = session.repo.clone();
            let task_tx = task_tx.clone();
            session
                .runtime
                .spawn(async move { run_event_stream(repo, task_tx).await })
        };

        Self {
            session,
            focus_handle: cx.focus_handle(),
            status: None,
            status_error: None,
            stream: StreamStatus::Connecting,
            events: Vec::new(),
            exporting_log: false,
            task_tx,
            ws_abort: Some(ws_task.abort_handle()),
        }
    }

    /// Download the backend log (raw octet stream) next to the user's other
    /// downloads.
    fn export_log(&mut self, cx: &mut Context<Self>) {
        if self.exporting_log {
            return;
        }
        self.exporting_log = true;
        cx.notify();

        let api = self.session.api.clone();
        let task_tx = self.task_tx.clone();
        self.session.runtime.spawn(async move {
            let outcome = match api.export_log().await {
                Ok(bytes) => {
                    let path = dirs::download_dir()
                        .unwrap_or_else(std::env::temp_dir)
                        .join("panel.log");
                    match std::fs::write(&path, &bytes) {
                        Ok(()) => Ok(path),
                        Err(e) => Err(format!("Failed to write {}: {}", path.display(), e)),
                    }
                }
                Err(e) => Err(e.to_string()),
            };
            let _ = task_tx.send(DashboardTask::LogExported(outcome)).await;
        });
    }

    fn handle_task(&mut self, task: DashboardTask, cx: &mut Context<Self>) {
        match task {
            DashboardTask::Status(Ok(status)) => {
                self.status = Some(status);
                self.status_error = None;
            }
            DashboardTask::Status(Err(error)) => {
                // An Unauthorized envelope has already cleared the token and
                // notified the session channel; everything else is shown.
                self.status_error = Some(error.to_string());
            }
            DashboardTask::Stream(status) => {
                self.stream = status;
            }
            DashboardTask::Event(event) => {
                self.events.push(event);
                if self.events.len() > MAX_EVENTS {
                    self.events.remove(0);
                }
            }
            DashboardTask::LogExported(outcome) => {
                self.exporting_log = false;
                match outcome {
                    Ok(path) => {
                        ToastManager::success(format!("Log saved to {}", path.display()), cx)
                    }
                    Err(message) => ToastManager::error(message, cx),
                }
            }
        }
        cx.notify();
    }

    fn logout(&mut self, cx: &mut Context<Self>) {
        ConnectionSettings::clear_token(self.session.repo.as_ref());
        cx.emit(DashboardPageEvent::LoggedOut);
    }
}

impl Drop for DashboardPage {
    fn drop(&mut self) {
        if let Some(handle) = self.ws_abort.take() {
            handle.abort();
        }
    }
}

// ─── Event stream task ──────────────────────────────────────────────────────

/// Reconnect delay before `attempt` (1-based): 1s, 2s, 4s, ... capped.
fn reconnect_backoff_secs(attempt: u32) -> u64 {
    std::cmp::min(
        1u64.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1))),
        MAX_BACKOFF_SECS,
    )
}

async fn run_event_stream(
    repo: Arc<dyn SettingsRepo>,
    task_tx: async_channel::Sender<DashboardTask>,
) {
    let mut attempt: u32 = 0;

    loop {
        match event_stream_session(&repo, &task_tx).await {
            Ok(()) => {
                log::info!("Event stream closed by backend");
                let _ = task_tx
                    .send(DashboardTask::Stream(StreamStatus::Disconnected))
                    .await;
                return;
            }
            Err(StreamError::Fatal(message)) => {
                log::warn!("Event stream stopped: {}", message);
                let _ = task_tx
                    .send(DashboardTask::Stream(StreamStatus::Error(message)))
                    .await;
                return;
            }
            Err(StreamError::Transient(message)) => {
                attempt += 1;
                if attempt > MAX_RECONNECT_ATTEMPTS {
                    let message = format!(
                        "Connection lost after {} attempts (last error: {})",
                        MAX_RECONNECT_ATTEMPTS, message
                    );
                    log::error!("{}", message);
                    let _ = task_tx
                        .send(DashboardTask::Stream(StreamStatus::Error(message)))
                        .await;
                    return;
                }

                let backoff = reconnect_backoff_secs(attempt);
                log::warn!(
                    "Event stream lost: {}. Reconnecting in {}s (attempt {}/{})",
                    message,
                    backoff,
                    attempt,
                    MAX_RECONNECT_ATTEMPTS
                );
                let _ = task_tx
                    .send(DashboardTask::Stream(StreamStatus::Reconnecting { attempt }))
                    .await;
                tokio::time::sleep(std::time::Duration::from_secs(backoff)).await;
            }
        }
    }
}

/// One WebSocket session: connect, authenticate, stream events.
/// `Ok(())` means the backend closed cleanly; no reconnect.
async fn event_stream_session(
    repo: &Arc<dyn SettingsRepo>,
    task_tx: &async_channel::Sender<DashboardTask>,
) -> Result<(), StreamError> {
    let base = ws_base_url(repo.as_ref());
    if base.is_empty() {
        return Err(StreamError::Fatal("backend address is not configured".into()));
    }
    let token = ConnectionSettings::load(repo.as_ref())
        .token
        .ok_or_else(|| StreamError::Fatal("not signed in".into()))?;

    let _ = task_tx
        .send(DashboardTask::Stream(StreamStatus::Connecting))
        .await;

    let url = format!("{}/events", base);
    let (ws_stream, _response) = tokio_tungstenite::connect_async(&url)
        .await
        .map_err(|e| StreamError::Transient(format!("WebSocket connect failed: {}", e)))?;

    let (mut ws_write, mut ws_read) = futures::StreamExt::split(ws_stream);

    // Step 1: authenticate
    let auth_msg = serde_json::to_string(&WsInbound::Auth {
        token: token.clone(),
    })
    .map_err(|e| StreamError::Fatal(format!("Failed to encode auth: {}", e)))?;
    futures::SinkExt::send(&mut ws_write, tungstenite::Message::Text(auth_msg.into()))
        .await
        .map_err(|e| StreamError::Transient(format!("Failed to send auth: {}", e)))?;

    // Step 2: wait for the verdict
    let auth_response = tokio::time::timeout(AUTH_TIMEOUT, futures::StreamExt::next(&mut ws_read))
        .await
        .map_err(|_| StreamError::Transient("Auth response timeout".into()))?
        .ok_or_else(|| StreamError::Transient("WebSocket closed before auth response".into()))?
        .map_err(|e| StreamError::Transient(format!("WebSocket read error: {}", e)))?;

    match &auth_response {
        tungstenite::Message::Text(text) => {
            match serde_json::from_str::<WsOutbound>(text) {
                Ok(WsOutbound::AuthOk) => {
                    log::info!("Event stream authenticated");
                }
                Ok(WsOutbound::AuthFailed { error }) => {
                    return Err(StreamError::Fatal(format!("Auth failed: {}", error)));
                }
                Ok(other) => {
                    return Err(StreamError::Transient(format!(
                        "Unexpected auth response: {:?}",
                        other
                    )));
                }
                Err(e) => {
                    return Err(StreamError::Transient(format!("Invalid JSON: {}", e)));
                }
            }
        }
        _ => {
            return Err(StreamError::Transient(
                "Expected text message for auth response".into(),
            ));
        }
    }

    let _ = task_tx
        .send(DashboardTask::Stream(StreamStatus::Connected))
        .await;

    // Step 3: stream events
    loop {
        match futures::StreamExt::next(&mut ws_read).await {
            Some(Ok(tungstenite::Message::Text(text))) => {
                match serde_json::from_str::<WsOutbound>(&text) {
                    Ok(WsOutbound::Event { level, message }) => {
                        let _ = task_tx
                            .send(DashboardTask::Event(PanelEvent { level, message }))
                            .await;
                    }
                    Ok(WsOutbound::Pong) => {}
                    Ok(WsOutbound::Error { error }) => {
                        log::warn!("Backend event stream error: {}", error);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("Failed to parse event stream message: {}", e);
                    }
                }
            }
            Some(Ok(tungstenite::Message::Ping(_))) | Some(Ok(tungstenite::Message::Pong(_))) => {}
            Some(Ok(tungstenite::Message::Close(_))) => {
                return Ok(());
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                return Err(StreamError::Transient(format!("WebSocket error: {}", e)));
            }
            None => {
                return Err(StreamError::Transient("WebSocket stream ended".into()));
            }
        }
    }
}

/// "3d 4h" / "2h 05m" / "7m" / "42s"
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

// ─── Render ─────────────────────────────────────────────────────────────────

impl DashboardPage {
    fn render_status_card(&self, t: &ThemeColors) -> Div {
        let card = div()
            .bg(rgb(t.bg_secondary))
            .border_1()
            .border_color(rgb(t.border))
            .rounded(RADIUS_LG)
            .p(SPACE_XL)
            .flex()
            .flex_col()
            .gap(SPACE_MD)
            .child(
                div()
                    .text_size(TEXT_MS)
                    .text_color(rgb(t.text_secondary))
                    .child("Backend"),
            );

        if let Some(status) = &self.status {
            let row = |label: &str, value: String| {
                div()
                    .flex()
                    .gap(SPACE_MD)
                    .child(
                        div()
                            .w(px(70.0))
                            .text_size(TEXT_MD)
                            .text_color(rgb(t.text_muted))
                            .child(label.to_string()),
                    )
                    .child(
                        div()
                            .text_size(TEXT_MD)
                            .text_color(rgb(t.text_primary))
                            .child(value),
                    )
            };
            card.child(row("Name", status.name.clone()))
                .child(row("Version", status.version.clone()))
                .child(row("Uptime", format_uptime(status.uptime_secs)))
        } else if let Some(error) = &self.status_error {
            card.child(
                div()
                    .text_size(TEXT_MD)
                    .text_color(rgb(t.error))
                    .child(format!("Status unavailable: {}", error)),
            )
        } else {
            card.child(
                div()
                    .text_size(TEXT_MD)
                    .text_color(rgb(t.text_muted))
                    .child("Loading status…"),
            )
        }
    }

    fn render_events_card(&self, t: &ThemeColors) -> Div {
        let mut list = div()
            .id("dashboard-events")
            .flex_1()
            .overflow_y_scroll()
            .flex()
            .flex_col()
            .gap(SPACE_SM);

        if self.events.is_empty() {
            list = list.child(
                div()
                    .text_size(TEXT_MD)
                    .text_color(rgb(t.text_muted))
                    .child("No events yet"),
            );
        } else {
            list = list.children(self.events.iter().rev().map(|event| {
                let level_color = match event.level.as_str() {
                    "error" => t.error,
                    "warn" | "warning" => t.warning,
                    _ => t.text_secondary,
                };
                div()
                    .flex()
                    .gap(SPACE_MD)
                    .child(
                        div()
                            .w(px(44.0))
                            .flex_shrink_0()
                            .text_size(TEXT_SM)
                            .text_color(rgb(level_color))
                            .child(event.level.clone()),
                    )
                    .child(
                        div()
                            .text_size(TEXT_MD)
                            .text_color(rgb(t.text_primary))
                            .child(event.message.clone()),
                    )
            }));
        }

        div()
            .flex_1()
            .bg(rgb(t.bg_secondary))
            .border_1()
            .border_color(rgb(t.border))
            .rounded(RADIUS_LG)
            .p(SPACE_XL)
            .flex()
            .flex_col()
            .gap(SPACE_MD)
            .child(
                div()
                    .text_size(TEXT_MS)
                    .text_color(rgb(t.text_secondary))
                    .child("Events"),
            )
            .child(list)
    }
}

impl Render for DashboardPage {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let t = theme(cx);
        let stream_color = self.stream.color(&t);
        let stream_label = self.stream.label();
        let stream_detail = match &self.stream {
            StreamStatus::Error(message) => Some(message.clone()),
            _ => None,
        };

        div()
            .size_full()
            .flex()
            .flex_col()
            .bg(rgb(t.bg_primary))
            .track_focus(&self.focus_handle)
            // Header bar
            .child(
                div()
                    .px(SPACE_XL)
                    .py(SPACE_MD)
                    .bg(rgb(t.bg_header))
                    .border_b_1()
                    .border_color(rgb(t.border))
                    .flex()
                    .items_center()
                    .justify_between()
                    .child(
                        div()
                            .text_size(TEXT_XL)
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_color(rgb(t.text_primary))
                            .child("Portico"),
                    )
                    .child(
                        div()
                            .flex()
                            .items_center()
                            .gap(SPACE_LG)
                            // Stream status badge
                            .child(
                                div()
                                    .px(SPACE_MD)
                                    .py(px(2.0))
                                    .rounded(RADIUS_STD)
                                    .bg(with_alpha(stream_color, 0.15))
                                    .text_size(TEXT_MS)
                                    .text_color(rgb(stream_color))
                                    .child(stream_label),
                            )
                            .child(
                                button(
                                    "dashboard-export-log",
                                    if self.exporting_log {
                                        "Saving…"
                                    } else {
                                        "Save Log"
                                    },
                                    &t,
                                )
                                .on_click(cx.listener(|this, _, _window, cx| {
                                    this.export_log(cx);
                                })),
                            )
                            .child(
                                button("dashboard-logout", "Log Out", &t).on_click(cx.listener(
                                    |this, _, _window, cx| {
                                        this.logout(cx);
                                    },
                                )),
                            ),
                    ),
            )
            // Content
            .child(
                div()
                    .flex_1()
                    .p(SPACE_XL)
                    .flex()
                    .flex_col()
                    .gap(SPACE_LG)
                    .when_some(stream_detail, |d, detail| {
                        d.child(
                            div()
                                .text_size(TEXT_MS)
                                .text_color(rgb(t.error))
                                .child(detail),
                        )
                    })
                    .child(self.render_status_card(&t))
                    .child(self.render_events_card(&t)),
            )
    }
}

impl_focusable!(DashboardPage);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(reconnect_backoff_secs(1), 1);
        assert_eq!(reconnect_backoff_secs(2), 2);
        assert_eq!(reconnect_backoff_secs(3), 4);
        assert_eq!(reconnect_backoff_secs(6), 30);
        assert_eq!(reconnect_backoff_secs(20), MAX_BACKOFF_SECS);
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(7 * 60), "7m");
        assert_eq!(format_uptime(2 * 3600 + 5 * 60), "2h 05m");
        assert_eq!(format_uptime(3 * 86400 + 4 * 3600), "3d 4h");
    }

    #[test]
    fn stream_status_labels() {
        assert_eq!(StreamStatus::Connected.label(), "connected");
        assert_eq!(
            StreamStatus::Reconnecting { attempt: 3 }.label(),
            "reconnecting (3)"
        );
        assert_eq!(StreamStatus::Error("x".into()).label(), "error");
    }
}
