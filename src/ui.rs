use crate::config::{THEME_STORAGE_KEY, WidgetConfig};
use crate::platform::{self, Capabilities, MediaSchemeProbe};
use crate::theme::{ThemeController, ThemeSurface, theme_definition};
use crate::types::ThemeMode;
use crate::views::ChatView;
use dioxus::prelude::*;
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
type PrefStore = crate::storage::FileStore;
#[cfg(target_arch = "wasm32")]
type PrefStore = platform::WebStore;

const PARLEY_CSS: Asset = asset!("/assets/parley.css");

#[component]
pub fn App() -> Element {
    let config = use_hook(|| {
        Rc::new(WidgetConfig::from_env().unwrap_or_else(|err| {
            tracing::warn!("falling back to default config: {err}");
            WidgetConfig::default()
        }))
    });
    let theme = use_signal(|| Option::<ThemeMode>::None);
    let themes = use_theme_controller(&config, theme);
    let capabilities = use_resource(Capabilities::probe);

    let on_toggle = move |_: ()| {
        let themes = themes.clone();
        spawn(async move {
            themes.toggle().await;
        });
    };

    rsx! {
        ThemeStyles { theme: theme().unwrap_or_default() }
        div { class: "page",
            AppHeader { theme: theme().unwrap_or_default(), on_toggle }
            {match capabilities() {
                Some(capabilities) => rsx! {
                    ChatView { config: config.clone(), capabilities }
                },
                None => rsx! {
                    div { class: "messages", id: "messages" }
                },
            }}
        }
    }
}

fn use_theme_controller(
    config: &WidgetConfig,
    theme: Signal<Option<ThemeMode>>,
) -> Rc<ThemeController<PrefStore, SignalSurface>> {
    let themes = use_hook(|| {
        #[cfg(not(target_arch = "wasm32"))]
        let store = crate::storage::FileStore::in_data_dir(&config.app_dir);
        #[cfg(target_arch = "wasm32")]
        let store = platform::WebStore;
        Rc::new(ThemeController::new(
            store,
            SignalSurface(theme),
            THEME_STORAGE_KEY,
        ))
    });

    let init_themes = themes.clone();
    use_hook(move || {
        spawn(async move {
            init_themes.init(&MediaSchemeProbe).await;
        });
    });

    themes
}

/// Theme surface backed by a signal plus the root `data-theme` attribute.
#[derive(Clone, Copy)]
pub struct SignalSurface(Signal<Option<ThemeMode>>);

impl ThemeSurface for SignalSurface {
    fn apply(&self, mode: ThemeMode) {
        let mut signal = self.0;
        signal.set(Some(mode));
        platform::set_theme_attribute(mode);
    }

    fn current(&self) -> Option<ThemeMode> {
        *self.0.peek()
    }
}

#[component]
fn ThemeStyles(theme: ThemeMode) -> Element {
    let definition = theme_definition(theme);
    rsx! {
        document::Link { rel: "stylesheet", href: PARLEY_CSS }
        style { dangerous_inner_html: "{definition.css}" }
    }
}

#[component]
fn AppHeader(theme: ThemeMode, on_toggle: EventHandler<()>) -> Element {
    let definition = theme_definition(theme);
    rsx! {
        div { class: "header",
            h1 { class: "header-title", "Parley" }
            button {
                id: "theme-toggle",
                class: "btn btn-ghost",
                r#type: "button",
                title: "Toggle theme",
                onclick: move |_| on_toggle.call(()),
                span { class: format_args!("icon icon-{}", definition.toggle_icon) }
            }
        }
    }
}
