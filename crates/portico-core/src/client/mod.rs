mod endpoints;
mod request;

pub use request::{
    base_url, ws_base_url, ApiClient, ApiError, HttpBudget, SessionEvent, CONTROL_TIMEOUT,
    GENERAL_TIMEOUT,
};
