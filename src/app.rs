//! Application root: owns the session (settings + backend client + runtime)
//! and swaps between the login page and the dashboard.

use crate::settings::device_key_path;
use crate::views::dashboard::{DashboardPage, DashboardPageEvent};
use crate::views::login::{EntryLink, LoginPage, LoginPageEvent};
use crate::views::toast::{ToastManager, ToastOverlay};
use gpui::prelude::*;
use gpui::*;
use portico_core::client::{ApiClient, SessionEvent};
use portico_core::passkey::{Authenticator, DeviceKeyAuthenticator};
use portico_core::settings::SettingsRepo;
use std::sync::Arc;

/// Long-lived services shared by every page: the settings store, the backend
/// client pair, the passkey source, and the tokio runtime all network work
/// runs on.
pub struct Session {
    pub repo: Arc<dyn SettingsRepo>,
    pub api: Arc<ApiClient>,
    pub authenticator: Arc<dyn Authenticator>,
    pub runtime: Arc<tokio::runtime::Runtime>,
}

impl Session {
    pub fn new(
        repo: Arc<dyn SettingsRepo>,
    ) -> anyhow::Result<(Arc<Self>, async_channel::Receiver<SessionEvent>)> {
        let runtime = Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .thread_name("panel-client")
                .build()?,
        );
        let (api, session_events) = ApiClient::new(repo.clone())?;
        let authenticator: Arc<dyn Authenticator> =
            Arc::new(DeviceKeyAuthenticator::new(device_key_path()));

        Ok((
            Arc::new(Self {
                repo,
                api: Arc::new(api),
                authenticator,
                runtime,
            }),
            session_events,
        ))
    }
}

enum Stage {
    Login(Entity<LoginPage>),
    Dashboard(Entity<DashboardPage>),
}

pub struct PorticoApp {
    session: Arc<Session>,
    stage: Stage,
    toast_overlay: Entity<ToastOverlay>,
    _stage_subscription: Subscription,
}

impl PorticoApp {
    pub fn new(
        session: Arc<Session>,
        entry: Option<EntryLink>,
        session_events: async_channel::Receiver<SessionEvent>,
        cx: &mut Context<Self>,
    ) -> Self {
        let toast_overlay = cx.new(ToastOverlay::new);

        // The launch link applies to the first login page only; later logins
        // (logout, expired session) start clean.
        let login = cx.new(|cx| LoginPage::new(session.clone(), entry, cx));
        let stage_subscription = cx.subscribe(&login, Self::on_login_event);

        // Session events arrive from the request layer's tokio tasks.
        cx.spawn(async move |this: WeakEntity<Self>, cx| {
            while let Ok(event) = session_events.recv().await {
                let alive = this
                    .update(cx, |this, cx| {
                        this.handle_session_event(event, cx);
                    })
                    .is_ok();
                if !alive {
                    break;
                }
            }
        })
        .detach();

        Self {
            session,
            stage: Stage::Login(login),
            toast_overlay,
            _stage_subscription: stage_subscription,
        }
    }

    fn on_login_event(
        &mut self,
        _login: Entity<LoginPage>,
        event: &LoginPageEvent,
        cx: &mut Context<Self>,
    ) {
        match event {
            LoginPageEvent::Authenticated => self.show_dashboard(cx),
        }
    }

    fn on_dashboard_event(
        &mut self,
        _dashboard: Entity<DashboardPage>,
        event: &DashboardPageEvent,
        cx: &mut Context<Self>,
    ) {
        match event {
            DashboardPageEvent::LoggedOut => self.show_login(cx),
        }
    }

    /// Replace the login page with the dashboard. The login entity is
    /// dropped, so there is no way back short of logging out.
    fn show_dashboard(&mut self, cx: &mut Context<Self>) {
        let dashboard = cx.new(|cx| DashboardPage::new(self.session.clone(), cx));
        self._stage_subscription = cx.subscribe(&dashboard, Self::on_dashboard_event);
        self.stage = Stage::Dashboard(dashboard);
        cx.notify();
    }

    /// Drop all authenticated state and show a fresh login page.
    fn show_login(&mut self, cx: &mut Context<Self>) {
        let login = cx.new(|cx| LoginPage::new(self.session.clone(), None, cx));
        self._stage_subscription = cx.subscribe(&login, Self::on_login_event);
        self.stage = Stage::Login(login);
        cx.notify();
    }

    fn handle_session_event(&mut self, event: SessionEvent, cx: &mut Context<Self>) {
        match event {
            SessionEvent::Unauthorized => {
                // Token already cleared by the request layer. If we were in
                // the authenticated area, fall back to a fresh login page.
                if matches!(self.stage, Stage::Dashboard(_)) {
                    ToastManager::warning("Session expired, please sign in again", cx);
                    self.show_login(cx);
                }
            }
        }
    }
}

impl Render for PorticoApp {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        div()
            .size_full()
            .relative()
            .child(match &self.stage {
                Stage::Login(page) => page.clone().into_any_element(),
                Stage::Dashboard(page) => page.clone().into_any_element(),
            })
            .child(self.toast_overlay.clone())
    }
}
