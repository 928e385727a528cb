// Coursework analysis: request validation, prompt templating, the gateway call,
// and persistence of results. All gateway calls go through llm_client.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod service;
pub mod store;
