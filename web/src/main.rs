use dioxus::logger::tracing::Level;
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
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

const THEME_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

fn main() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    if let Err(err) = dioxus::logger::init(level) {
        eprintln!("logger already initialised: {err}");
    }
    dioxus::launch(App);
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

/// Deep links the router does not know land back on the home page.
#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    use_effect(move || {
        dioxus::logger::tracing::debug!(%path, "unknown route");
    });
    rsx! { Home {} }
}
