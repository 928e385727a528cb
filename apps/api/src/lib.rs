//! SkillSync API: maps coursework onto career paths through an AI gateway
//! and keeps the results as shareable skill profiles.

pub mod analysis;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod state;
