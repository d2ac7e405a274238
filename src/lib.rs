use axum::extract::State;
use std::sync::Arc;

use crate::domain::auth::TokenSigner;

pub mod api;
pub mod app_env;
pub mod client;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;

#[cfg(test)]
mod integration_test;

/// Application state shared across request handlers.
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub token_signer: TokenSigner,
}

pub type AppState = State<Arc<SharedData>>;
