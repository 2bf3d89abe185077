#[macro_use]
mod macros;

mod app;
mod settings;
mod theme;
mod ui;
mod views;

use gpui::*;
use std::sync::Arc;

use crate::app::{PorticoApp, Session};
use crate::settings::FileSettingsRepo;
use crate::theme::{AppTheme, GlobalTheme, ThemeMode};
use crate::views::login::{apply_panel_link, parse_panel_link, EntryLink};
use crate::views::toast::ToastManager;
use portico_core::keys::SettingKey;
use portico_core::settings::{Protocol, SettingsRepo};

fn main() {
    env_logger::init();

    let repo: Arc<dyn SettingsRepo> = Arc::new(FileSettingsRepo::open_default());

    // An optional panel link on the command line pre-fills the endpoint the
    // same way a quick-fill paste would; a token parameter signs in directly.
    let entry = std::env::args().nth(1).and_then(|arg| {
        match parse_panel_link(&arg) {
            Some(link) => {
                apply_panel_link(repo.as_ref(), &link);
                Some(EntryLink {
                    secure: link.protocol == Protocol::Https,
                    token: link.token,
                })
            }
            None => {
                log::warn!("Ignoring argument that is not a panel link: {}", arg);
                None
            }
        }
    });

    let theme_mode = repo
        .get(SettingKey::Theme)
        .map(|v| ThemeMode::parse(&v))
        .unwrap_or_default();

    let (session, session_events) =
        Session::new(repo).expect("Failed to initialize backend client");

    Application::new().run(move |cx: &mut App| {
        let theme_entity = cx.new(|_cx| AppTheme::new(theme_mode, true));
        cx.set_global(GlobalTheme(theme_entity.clone()));
        cx.set_global(ToastManager::new());

        cx.open_window(
            WindowOptions {
                titlebar: Some(TitlebarOptions {
                    title: Some("Portico".into()),
                    ..Default::default()
                }),
                window_bounds: Some(WindowBounds::Windowed(Bounds {
                    origin: Point::default(),
                    size: size(px(960.0), px(680.0)),
                })),
                is_resizable: true,
                window_decorations: Some(WindowDecorations::Server),
                window_min_size: Some(Size {
                    width: px(480.0),
                    height: px(420.0),
                }),
                app_id: Some("portico".to_string()),
                ..Default::default()
            },
            |window, cx| {
                // Track the system appearance for the auto theme mode
                let is_dark = matches!(
                    window.appearance(),
                    WindowAppearance::Dark | WindowAppearance::VibrantDark
                );
                theme_entity.update(cx, |theme, _cx| {
                    theme.set_system_appearance(is_dark);
                });

                let theme_for_observer = theme_entity.clone();
                window
                    .observe_window_appearance(move |window: &mut Window, cx: &mut App| {
                        let is_dark = matches!(
                            window.appearance(),
                            WindowAppearance::Dark | WindowAppearance::VibrantDark
                        );
                        theme_for_observer.update(cx, |theme, cx| {
                            theme.set_system_appearance(is_dark);
                            cx.notify();
                        });
                    })
                    .detach();

                cx.new(|cx| PorticoApp::new(session.clone(), entry.clone(), session_events.clone(), cx))
            },
        )
        .unwrap();
    });
}
