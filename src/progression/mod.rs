pub mod data;
pub mod decay;
pub mod endpoints;
pub mod engine;
pub mod helpers;
pub mod leaderboard;
pub mod league;
pub mod service;
