//! Login page.
//!
//! On entry the page probes for a passkey and signs in automatically when one
//! is available; any failure on that path falls through silently to the
//! manual form (protocol/host/port/token). A full panel link can be pasted
//! into the quick-fill field to populate the endpoint fields in one go.

use crate::app::Session;
use crate::theme::{theme, theme_entity, with_alpha, ThemeMode};
use crate::ui::tokens::{RADIUS_LG, RADIUS_STD, SPACE_LG, SPACE_MD, SPACE_SM, SPACE_XL, TEXT_MD, TEXT_MS, TEXT_SM, WIDTH_MODAL_MD};
use crate::views::components::{
    button_primary, input_container, labeled_input, modal_backdrop, modal_content, modal_header,
    SimpleInput, SimpleInputState,
};
use crate::views::toast::{Toast, ToastManager};
use gpui::prelude::*;
use gpui::*;
use portico_core::client::ApiError;
use portico_core::keys::SettingKey;
use portico_core::settings::{ConnectionSettings, Protocol, SettingsRepo};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Toast shown when a login network failure coincides with the secure-page /
/// insecure-backend mismatch.
const MIXED_CONTENT_MESSAGE: &str =
    "Connection failed: mixed content blocked (HTTPS page, HTTP backend). See \"Network errors?\" for fixes";

/// Longer TTL for the mixed-content diagnosis so the pointer to the help
/// dialog is not gone before the user reads it.
const MIXED_CONTENT_TOAST_TTL: Duration = Duration::from_secs(8);

// ─── Panel links ────────────────────────────────────────────────────────────

/// A parsed panel link (CLI argument or quick-fill paste).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLink {
    pub protocol: Protocol,
    pub host: String,
    pub port: Option<String>,
    pub token: Option<String>,
}

/// Launch-link context carried into the first login page: the scheme the
/// panel was reached over, and an optional token that skips the passkey
/// probe entirely.
#[derive(Debug, Clone)]
pub struct EntryLink {
    pub secure: bool,
    pub token: Option<String>,
}

/// Parse a full panel link of the form
/// `scheme://host[:port][/path[?query]]`. Anything else returns `None` — a
/// partial or invalid paste is left alone with no side effects.
pub fn parse_panel_link(input: &str) -> Option<PanelLink> {
    static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = LINK_REGEX.get_or_init(|| {
        Regex::new(r"^(https?)://([^/:]+)(?::(\d+))?(/.*)?$")
            .expect("panel link regex should compile")
    });

    let caps = regex.captures(input.trim())?;
    let protocol = Protocol::parse(&caps[1]);
    let host = caps[2].to_string();
    let port = caps.get(3).map(|m| m.as_str().to_string());
    let token = caps.get(4).and_then(|m| token_query_param(m.as_str()));

    Some(PanelLink {
        protocol,
        host,
        port,
        token,
    })
}

/// Extract a non-empty `token` query parameter from a link path.
fn token_query_param(path: &str) -> Option<String> {
    let (_, query) = path.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if key == "token" && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Persist the endpoint parts of a panel link. A link without an explicit
/// port keeps the currently stored port. The token is deliberately not
/// persisted here — it only becomes durable after a successful login.
pub fn apply_panel_link(repo: &dyn SettingsRepo, link: &PanelLink) {
    let port = link
        .port
        .clone()
        .unwrap_or_else(|| ConnectionSettings::load(repo).port);
    ConnectionSettings::save_endpoint(repo, link.protocol, &link.host, &port);
}

// ─── Form validation ────────────────────────────────────────────────────────

/// The field a validation failure points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Host,
    Port,
    Token,
}

impl FieldError {
    pub fn message(self) -> &'static str {
        match self {
            FieldError::Host => "Backend host is required",
            FieldError::Port => "Backend port is required",
            FieldError::Token => "Token is required",
        }
    }
}

/// Check the manual form. No network call is made while this fails.
pub fn validate_form(host: &str, port: &str, token: &str) -> Result<(), FieldError> {
    if host.trim().is_empty() {
        return Err(FieldError::Host);
    }
    if port.trim().is_empty() {
        return Err(FieldError::Port);
    }
    if token.trim().is_empty() {
        return Err(FieldError::Token);
    }
    Ok(())
}

/// The hazard behind browser mixed-content blocking: the panel page was
/// reached over HTTPS while the backend is configured for plain HTTP.
pub fn mixed_content_risk(entry_secure: bool, protocol: Protocol) -> bool {
    entry_secure && protocol == Protocol::Http
}

// ─── Login page ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginState {
    /// Probing for a passkey; the form is shown but inert.
    CheckingPasskey,
    Form,
    Submitting,
}

/// Results of background login work, pumped back onto the UI thread.
enum LoginTask {
    /// `Some(token)` when the passkey round-trip succeeded; `None` falls
    /// through to the form without any user-visible error.
    PasskeyOutcome(Option<String>),
    SubmitOutcome(Result<String, ApiError>),
}

pub enum LoginPageEvent {
    /// Token persisted; switch to the authenticated area.
    Authenticated,
}

impl EventEmitter<LoginPageEvent> for LoginPage {}

pub struct LoginPage {
    session: Arc<Session>,
    focus_handle: FocusHandle,
    quick_fill_input: Entity<SimpleInputState>,
    host_input: Entity<SimpleInputState>,
    port_input: Entity<SimpleInputState>,
    token_input: Entity<SimpleInputState>,
    protocol: Protocol,
    state: LoginState,
    entry_secure: bool,
    help_open: bool,
    /// Mixed-content hazard captured at submit time, so the diagnosis uses
    /// the configuration the failed request actually ran with.
    submit_had_mixed_risk: bool,
    task_tx: async_channel::Sender<LoginTask>,
    initial_focus_done: bool,
    _subscriptions: Vec<Subscription>,
}

impl LoginPage {
    pub fn new(session: Arc<Session>, entry: Option<EntryLink>, cx: &mut Context<Self>) -> Self {
        let settings = ConnectionSettings::load(session.repo.as_ref());
        let entry_secure = entry.as_ref().map(|e| e.secure).unwrap_or(false);
        let entry_token = entry.and_then(|e| e.token);

        let quick_fill_input = cx.new(|cx| {
            SimpleInputState::new(cx)
                .placeholder("Paste a full panel link, e.g. http://127.0.0.1:6099/panel?token=xxx")
        });
        let host_input =
            cx.new(|cx| SimpleInputState::new(cx).placeholder("localhost").default_value(&settings.host));
        let port_input =
            cx.new(|cx| SimpleInputState::new(cx).placeholder("6099").default_value(&settings.port));
        let token_input = cx.new(|cx| {
            let state = SimpleInputState::new(cx).placeholder("Login token").masked();
            match &entry_token {
                Some(token) => state.default_value(token),
                None => state,
            }
        });

        let mut subscriptions = Vec::new();
        subscriptions.push(cx.subscribe(
            &quick_fill_input,
            |this: &mut Self, _input, _event: &crate::views::components::simple_input::InputChangedEvent, cx| {
                this.handle_quick_fill(cx);
            },
        ));
        for input in [&host_input, &port_input, &token_input] {
            subscriptions.push(cx.subscribe(
                input,
                |this: &mut Self, _input, _event: &crate::views::components::simple_input::InputSubmitEvent, cx| {
                    this.submit(cx);
                },
            ));
        }

        let (task_tx, task_rx) = async_channel::bounded::<LoginTask>(8);

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

        let mut this = Self {
            session,
            focus_handle: cx.focus_handle(),
            quick_fill_input,
            host_input,
            port_input,
            token_input,
            protocol: settings.protocol,
            state: LoginState::Form,
            entry_secure,
            help_open: false,
            submit_had_mixed_risk: false,
            task_tx,
            initial_focus_done: false,
            _subscriptions: subscriptions,
        };

        // A token in the launch link wins over the passkey probe: submit it
        // directly. Otherwise try passkey sign-in before showing the form.
        if entry_token.is_some() {
            this.submit(cx);
        } else {
            this.start_passkey_probe(cx);
        }

        this
    }

    // ── Passkey probe ──

    fn start_passkey_probe(&mut self, cx: &mut Context<Self>) {
        self.state = LoginState::CheckingPasskey;
        cx.notify();

        let api = self.session.api.clone();
        let authenticator = self.session.authenticator.clone();
        let task_tx = self.task_tx.clone();

        self.session.runtime.spawn(async move {
            let outcome = async {
                let options = api.passkey_authentication_options().await?;
                let assertion = authenticator.get_assertion(&options)?;
                let token = api.verify_passkey_authentication(&assertion).await?;
                anyhow::Ok(token)
            }
            .await;

            let outcome = match outcome {
                Ok(token) => Some(token),
                Err(e) => {
                    // Whatever went wrong (no credential, cancelled, network),
                    // the user just gets the form.
                    log::debug!("Passkey sign-in unavailable: {:#}", e);
                    None
                }
            };
            let _ = task_tx.send(LoginTask::PasskeyOutcome(outcome)).await;
        });
    }

    // ── Manual submit ──

    fn submit(&mut self, cx: &mut Context<Self>) {
        // One in-flight attempt at a time; the passkey probe also counts.
        if self.state != LoginState::Form {
            return;
        }

        let host = self.host_input.read(cx).value().to_string();
        let port = self.port_input.read(cx).value().to_string();
        let token = self.token_input.read(cx).value().to_string();

        if let Err(field) = validate_form(&host, &port, &token) {
            ToastManager::error(field.message(), cx);
            return;
        }

        // Persist the endpoint first: the request layer resolves its target
        // from the store.
        ConnectionSettings::save_endpoint(self.session.repo.as_ref(), self.protocol, &host, &port);

        self.submit_had_mixed_risk = mixed_content_risk(self.entry_secure, self.protocol);
        self.state = LoginState::Submitting;
        cx.notify();

        let api = self.session.api.clone();
        let task_tx = self.task_tx.clone();
        let token = token.trim().to_string();

        self.session.runtime.spawn(async move {
            let result = api.login_with_token(&token).await;
            let _ = task_tx.send(LoginTask::SubmitOutcome(result)).await;
        });
    }

    fn handle_task(&mut self, task: LoginTask, cx: &mut Context<Self>) {
        match task {
            LoginTask::PasskeyOutcome(Some(token)) => self.finish_login(token, cx),
            LoginTask::PasskeyOutcome(None) => {
                self.state = LoginState::Form;
                cx.notify();
            }
            LoginTask::SubmitOutcome(Ok(token)) => self.finish_login(token, cx),
            LoginTask::SubmitOutcome(Err(error)) => {
                self.state = LoginState::Form;
                if self.submit_had_mixed_risk && error.is_network() {
                    ToastManager::post(
                        Toast::error(MIXED_CONTENT_MESSAGE).with_ttl(MIXED_CONTENT_TOAST_TTL),
                        cx,
                    );
                    self.help_open = true;
                } else {
                    ToastManager::error(error.to_string(), cx);
                }
                cx.notify();
            }
        }
    }

    fn finish_login(&mut self, token: String, cx: &mut Context<Self>) {
        ConnectionSettings::store_token(self.session.repo.as_ref(), &token);
        cx.emit(LoginPageEvent::Authenticated);
    }

    // ── Quick fill ──

    fn handle_quick_fill(&mut self, cx: &mut Context<Self>) {
        let value = self.quick_fill_input.read(cx).value().to_string();
        let Some(link) = parse_panel_link(&value) else {
            // Partial or invalid paste: free text, no side effects.
            return;
        };

        self.protocol = link.protocol;
        self.host_input.update(cx, |input, cx| {
            input.set_value(link.host.clone(), cx);
        });
        if let Some(port) = &link.port {
            self.port_input.update(cx, |input, cx| {
                input.set_value(port.clone(), cx);
            });
        }
        if let Some(token) = &link.token {
            self.token_input.update(cx, |input, cx| {
                input.set_value(token.clone(), cx);
            });
        }
        apply_panel_link(self.session.repo.as_ref(), &link);

        // Clearing re-enters this handler with an empty value, which parses
        // to nothing and returns above.
        self.quick_fill_input.update(cx, |input, cx| {
            input.set_value("", cx);
        });
        ToastManager::success("Panel address applied", cx);
        cx.notify();
    }

    // ── Theme ──

    fn cycle_theme(&mut self, cx: &mut Context<Self>) {
        let entity = theme_entity(cx);
        let next = match entity.read(cx).mode {
            ThemeMode::Auto => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Auto,
        };
        self.session.repo.set(SettingKey::Theme, next.as_str());
        entity.update(cx, |theme, cx| {
            theme.set_mode(next);
            cx.notify();
        });
        cx.notify();
    }

    // ── Render helpers ──

    fn render_protocol_toggle(&self, busy: bool, cx: &mut Context<Self>) -> impl IntoElement {
        let t = theme(cx);
        let mut container = div()
            .flex()
            .rounded(RADIUS_STD)
            .bg(rgb(t.bg_secondary))
            .p(px(2.0));

        for (i, protocol) in [Protocol::Http, Protocol::Https].into_iter().enumerate() {
            let is_active = self.protocol == protocol;
            let mut option = div()
                .id(ElementId::Name(format!("protocol-{}", protocol.as_str()).into()))
                .px(SPACE_MD)
                .py(px(3.0))
                .rounded(px(3.0))
                .text_size(TEXT_MS)
                .cursor_pointer();

            if is_active {
                option = option.bg(rgb(t.bg_primary)).text_color(rgb(t.text_primary));
            } else {
                option = option.text_color(rgb(t.text_muted));
            }

            if !busy {
                option = option.on_mouse_down(
                    MouseButton::Left,
                    cx.listener(move |this, _, _, cx| {
                        this.protocol = protocol;
                        let host = this.host_input.read(cx).value().to_string();
                        let port = this.port_input.read(cx).value().to_string();
                        ConnectionSettings::save_endpoint(
                            this.session.repo.as_ref(),
                            protocol,
                            &host,
                            &port,
                        );
                        cx.notify();
                    }),
                );
            }

            if i > 0 {
                container = container.child(div().w(px(2.0)));
            }
            container = container.child(option.child(protocol.as_str().to_string()));
        }

        container
    }

    fn render_help_modal(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let t = theme(cx);

        let paragraph = |text: &str| {
            div()
                .text_size(TEXT_MD)
                .text_color(rgb(t.text_primary))
                .child(text.to_string())
        };
        let bullet = |text: &str| {
            div()
                .flex()
                .gap(SPACE_SM)
                .child(div().text_size(TEXT_MD).text_color(rgb(t.text_muted)).child("•"))
                .child(
                    div()
                        .text_size(TEXT_MD)
                        .text_color(rgb(t.text_secondary))
                        .child(text.to_string()),
                )
        };

        modal_backdrop("login-help-backdrop", &t)
            .items_center()
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, _, cx| {
                    this.help_open = false;
                    cx.notify();
                }),
            )
            .child(
                modal_content("login-help-modal", &t)
                    .w(px(520.0))
                    .child(modal_header(
                        "Network errors?",
                        Some("Why the backend may be unreachable"),
                        &t,
                        cx.listener(|this, _, _, cx| {
                            this.help_open = false;
                            cx.notify();
                        }),
                    ))
                    .child(
                        div()
                            .p(SPACE_XL)
                            .flex()
                            .flex_col()
                            .gap(SPACE_LG)
                            .child(
                                div()
                                    .p(SPACE_LG)
                                    .rounded(RADIUS_STD)
                                    .bg(with_alpha(t.warning, 0.12))
                                    .border_1()
                                    .border_color(with_alpha(t.warning, 0.4))
                                    .child(paragraph(
                                        "Browsers refuse to let an HTTPS page call an HTTP \
                                         backend (mixed content). If you opened the panel over \
                                         HTTPS but the backend itself runs plain HTTP, the login \
                                         request is blocked before it leaves the page.",
                                    )),
                            )
                            .child(paragraph("Ways to fix it:"))
                            .child(bullet(
                                "Allow insecure content for the panel site in your browser's \
                                 site settings, then retry",
                            ))
                            .child(bullet("Open the panel over plain HTTP instead of HTTPS"))
                            .child(bullet("Configure a TLS certificate for the backend"))
                            .child(bullet(
                                "Put a reverse proxy in front of both so page and backend share \
                                 one scheme",
                            ))
                            .child(
                                div()
                                    .text_size(TEXT_SM)
                                    .text_color(rgb(t.text_muted))
                                    .child(
                                        "Plain connection failures (wrong host or port, backend \
                                         not running, firewall) show up the same way — check the \
                                         address above first.",
                                    ),
                            ),
                    ),
            )
    }
}

impl Render for LoginPage {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let t = theme(cx);
        let busy = matches!(
            self.state,
            LoginState::CheckingPasskey | LoginState::Submitting
        );
        let show_hazard = mixed_content_risk(self.entry_secure, self.protocol);

        if !self.initial_focus_done && self.state == LoginState::Form {
            self.initial_focus_done = true;
            self.token_input.update(cx, |input, cx| {
                input.focus(window, cx);
            });
        }

        let submit_label = match self.state {
            LoginState::Submitting => "Signing in…",
            _ => "Sign In",
        };

        div()
            .size_full()
            .flex()
            .items_center()
            .justify_center()
            .bg(rgb(t.bg_primary))
            .track_focus(&self.focus_handle)
            .child(
                div()
                    .relative()
                    .w(WIDTH_MODAL_MD + px(30.0))
                    .bg(rgb(t.bg_secondary))
                    .border_1()
                    .border_color(rgb(t.border))
                    .rounded(RADIUS_LG)
                    .shadow_xl()
                    .p(SPACE_XL)
                    .flex()
                    .flex_col()
                    .gap(SPACE_LG)
                    // Header
                    .child(
                        div()
                            .flex()
                            .items_center()
                            .justify_between()
                            .child(
                                div()
                                    .flex()
                                    .flex_col()
                                    .gap(px(2.0))
                                    .child(
                                        div()
                                            .text_size(px(18.0))
                                            .font_weight(FontWeight::SEMIBOLD)
                                            .text_color(rgb(t.text_primary))
                                            .child("Panel Login"),
                                    )
                                    .child(
                                        div()
                                            .text_size(TEXT_MS)
                                            .text_color(rgb(t.text_muted))
                                            .child("Sign in to the control panel backend"),
                                    ),
                            )
                            .child(
                                div()
                                    .id("theme-toggle")
                                    .cursor_pointer()
                                    .px(SPACE_MD)
                                    .py(px(3.0))
                                    .rounded(RADIUS_STD)
                                    .text_size(TEXT_SM)
                                    .text_color(rgb(t.text_muted))
                                    .hover(|s| s.bg(rgb(t.bg_hover)))
                                    .child(format!("theme: {}", theme_entity(cx).read(cx).mode.as_str()))
                                    .on_mouse_down(
                                        MouseButton::Left,
                                        cx.listener(|this, _, _, cx| this.cycle_theme(cx)),
                                    ),
                            ),
                    )
                    // Passkey probe indicator
                    .when(self.state == LoginState::CheckingPasskey, |d| {
                        d.child(
                            div()
                                .text_size(TEXT_MS)
                                .text_color(rgb(t.text_secondary))
                                .child("Checking for a passkey…"),
                        )
                    })
                    // Quick fill
                    .child(
                        labeled_input("Quick fill", &t)
                            .child(
                                input_container(&t).child(
                                    SimpleInput::new(&self.quick_fill_input).text_size(TEXT_MD),
                                ),
                            )
                            .child(
                                div()
                                    .text_size(TEXT_SM)
                                    .text_color(rgb(t.text_muted))
                                    .child(
                                        "Paste the full address printed by the backend; protocol, \
                                         host, port and token are filled in automatically",
                                    ),
                            ),
                    )
                    // Endpoint row
                    .child(
                        div()
                            .flex()
                            .items_end()
                            .gap(SPACE_MD)
                            .child(
                                labeled_input("Protocol", &t)
                                    .child(self.render_protocol_toggle(busy, cx)),
                            )
                            .child(
                                labeled_input("Host", &t).flex_1().child(
                                    input_container(&t)
                                        .child(SimpleInput::new(&self.host_input).text_size(TEXT_MD)),
                                ),
                            )
                            .child(
                                labeled_input("Port", &t).w(px(90.0)).child(
                                    input_container(&t)
                                        .child(SimpleInput::new(&self.port_input).text_size(TEXT_MD)),
                                ),
                            ),
                    )
                    .child(
                        div()
                            .text_size(TEXT_SM)
                            .text_color(rgb(t.text_muted))
                            .child("The /api path is appended automatically"),
                    )
                    // Mixed-content hazard warning
                    .when(show_hazard, |d| {
                        d.child(
                            div()
                                .id("mixed-content-warning")
                                .cursor_pointer()
                                .text_size(TEXT_SM)
                                .text_color(rgb(t.warning))
                                .child(
                                    "⚠ HTTPS page connecting to an HTTP backend — requests may \
                                     be blocked. Click for fixes",
                                )
                                .on_mouse_down(
                                    MouseButton::Left,
                                    cx.listener(|this, _, _, cx| {
                                        this.help_open = true;
                                        cx.notify();
                                    }),
                                ),
                        )
                    })
                    // Token
                    .child(
                        labeled_input("Token", &t)
                            .child(
                                input_container(&t)
                                    .child(SimpleInput::new(&self.token_input).text_size(TEXT_MD)),
                            )
                            .child(
                                div()
                                    .text_size(TEXT_SM)
                                    .text_color(rgb(t.text_muted))
                                    .child("The login token is printed in the backend startup log"),
                            ),
                    )
                    // Help link
                    .child(
                        div().flex().justify_center().child(
                            div()
                                .id("network-help-link")
                                .cursor_pointer()
                                .text_size(TEXT_MS)
                                .text_color(rgb(t.warning))
                                .hover(|s| s.text_color(rgb(t.text_primary)))
                                .child("Network errors?")
                                .on_mouse_down(
                                    MouseButton::Left,
                                    cx.listener(|this, _, _, cx| {
                                        this.help_open = true;
                                        cx.notify();
                                    }),
                                ),
                        ),
                    )
                    // Submit
                    .child(
                        div().flex().justify_center().child(
                            if busy {
                                div()
                                    .px(px(14.0))
                                    .py(px(5.0))
                                    .rounded(RADIUS_STD)
                                    .bg(with_alpha(t.button_primary_bg, 0.5))
                                    .text_size(TEXT_MD)
                                    .text_color(rgb(t.button_primary_fg))
                                    .child(submit_label.to_string())
                                    .into_any_element()
                            } else {
                                button_primary("login-submit", submit_label, &t)
                                    .on_click(cx.listener(|this, _, _window, cx| {
                                        this.submit(cx);
                                    }))
                                    .into_any_element()
                            },
                        ),
                    )
                    // Input shield while a request is outstanding
                    .when(busy, |d| {
                        d.child(
                            div()
                                .absolute()
                                .inset_0()
                                .occlude()
                                .rounded(RADIUS_LG)
                                .bg(with_alpha(t.bg_primary, 0.35)),
                        )
                    }),
            )
            .when(self.help_open, |d| d.child(self.render_help_modal(cx)))
    }
}

impl_focusable!(LoginPage);

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::settings::MemorySettingsRepo;

    #[test]
    fn parse_full_link_with_token() {
        let link = parse_panel_link("http://127.0.0.1:6099/webui?token=abc123").unwrap();
        assert_eq!(link.protocol, Protocol::Http);
        assert_eq!(link.host, "127.0.0.1");
        assert_eq!(link.port.as_deref(), Some("6099"));
        assert_eq!(link.token.as_deref(), Some("abc123"));
    }

    #[test]
    fn parse_link_without_port_or_path() {
        let link = parse_panel_link("https://panel.example.com").unwrap();
        assert_eq!(link.protocol, Protocol::Https);
        assert_eq!(link.host, "panel.example.com");
        assert!(link.port.is_none());
        assert!(link.token.is_none());
    }

    #[test]
    fn parse_link_with_other_query_params() {
        let link = parse_panel_link("http://host:1234/p?lang=en&token=t0k&x=1").unwrap();
        assert_eq!(link.token.as_deref(), Some("t0k"));
    }

    #[test]
    fn parse_rejects_free_text() {
        assert!(parse_panel_link("not a url").is_none());
        assert!(parse_panel_link("").is_none());
        assert!(parse_panel_link("ftp://host:21").is_none());
        assert!(parse_panel_link("localhost:6099").is_none());
    }

    #[test]
    fn parse_ignores_empty_token_param() {
        let link = parse_panel_link("http://host:1/p?token=").unwrap();
        assert!(link.token.is_none());
    }

    #[test]
    fn apply_link_without_port_keeps_stored_port() {
        let repo = MemorySettingsRepo::new();
        ConnectionSettings::save_endpoint(&repo, Protocol::Http, "old-host", "7000");

        let link = parse_panel_link("https://new-host/panel").unwrap();
        apply_panel_link(&repo, &link);

        let settings = ConnectionSettings::load(&repo);
        assert_eq!(settings.protocol, Protocol::Https);
        assert_eq!(settings.host, "new-host");
        assert_eq!(settings.port, "7000");
    }

    #[test]
    fn apply_link_does_not_persist_token() {
        let repo = MemorySettingsRepo::new();
        let link = parse_panel_link("http://h:1/p?token=secret").unwrap();
        apply_panel_link(&repo, &link);
        assert!(ConnectionSettings::load(&repo).token.is_none());
    }

    #[test]
    fn validation_reports_first_blank_field() {
        assert_eq!(validate_form("", "6099", "tok"), Err(FieldError::Host));
        assert_eq!(validate_form("   ", "6099", "tok"), Err(FieldError::Host));
        assert_eq!(validate_form("h", "", "tok"), Err(FieldError::Port));
        assert_eq!(validate_form("h", "6099", "  "), Err(FieldError::Token));
        assert_eq!(validate_form("h", "6099", "tok"), Ok(()));
    }

    #[test]
    fn mixed_content_requires_secure_page_and_insecure_backend() {
        assert!(mixed_content_risk(true, Protocol::Http));
        assert!(!mixed_content_risk(true, Protocol::Https));
        assert!(!mixed_content_risk(false, Protocol::Http));
        assert!(!mixed_content_risk(false, Protocol::Https));
    }
}
