mod conf_tourney;
mod home;
mod standings;
mod team_history;

pub use conf_tourney::ConfTourney;
pub use home::Home;
pub use standings::{BasketballStandings, FootballStandings};
pub use team_history::{BasketballTeam, FootballConfWins, FootballTeam};
