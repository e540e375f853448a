#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use dioxus::logger::tracing::{info, Level};
use dioxus::prelude::*;

use ui::components::{register_nav, use_active_language, AppNavbar, NavBuilder};
use ui::views::{
    BasketballStandings, BasketballTeam, ConfTourney, FootballConfWins, FootballStandings,
    FootballTeam, Home,
};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Shell)]
    #[route("/")]
    Home {},
    #[route("/basketball/standings")]
    BasketballStandings {},
    #[route("/basketball/team/:team")]
    BasketballTeam { team: String },
    #[route("/basketball/conf-tourney/:conference")]
    ConfTourney { conference: String },
    #[route("/football/standings")]
    FootballStandings {},
    #[route("/football/team/:team")]
    FootballTeam { team: String },
    #[route("/football/team/:team/conf-wins")]
    FootballConfWins { team: String },
}

const THEME_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

#[cfg(feature = "desktop")]
fn main() {
    init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "starting desktop shell");
    LaunchBuilder::desktop().with_cfg(window::config()).launch(App);
}

#[cfg(all(feature = "server", not(feature = "desktop")))]
fn main() {
    init_logging();
    LaunchBuilder::server().launch(App);
}

fn init_logging() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    if let Err(err) = dioxus::logger::init(level) {
        eprintln!("logger already initialised: {err}");
    }
}

#[cfg(feature = "desktop")]
mod window {
    use std::path::PathBuf;

    use dioxus::desktop::{tao::window::WindowBuilder, Config};

    pub fn config() -> Config {
        let title = format!("Seedline v{}", env!("CARGO_PKG_VERSION"));
        Config::new()
            .with_window(WindowBuilder::new().with_title(title).with_maximized(true))
            .with_resource_directory(resource_dir())
    }

    /// Bundled assets sit next to the executable in release builds.
    fn resource_dir() -> PathBuf {
        if cfg!(debug_assertions) {
            return PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"));
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("assets")))
            .unwrap_or_else(|| PathBuf::from("assets"))
    }
}

#[component]
fn App() -> Element {
    ui::i18n::init();
    let lang = use_active_language();

    register_nav(NavBuilder {
        home: |label| rsx!(Link { class: "navbar__link", to: Route::Home {}, "{label}" }),
        basketball: |label| {
            rsx!(Link { class: "navbar__link", to: Route::BasketballStandings {}, "{label}" })
        },
        football: |label| {
            rsx!(Link { class: "navbar__link", to: Route::FootballStandings {}, "{label}" })
        },
    });

    rsx! {
        document::Style { "{THEME_CSS}" }
        // Remount routed pages so their labels pick up a language switch.
        div { key: "{lang}", Router::<Route> {} }
    }
}

#[component]
fn Shell() -> Element {
    rsx! {
        AppNavbar {}
        main { Outlet::<Route> {} }
    }
}
