pub mod api;
pub mod b64url;
pub mod keys;
pub mod passkey;
pub mod settings;
pub mod ws;

#[cfg(feature = "client")]
pub mod client;
