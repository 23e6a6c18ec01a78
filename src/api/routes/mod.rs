pub mod admin;
pub mod compare;
pub mod episodes;
pub mod leaderboards;
pub mod overview;
pub mod players;
pub mod records;
pub mod search;
