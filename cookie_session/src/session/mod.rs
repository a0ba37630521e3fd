mod errors;
mod main;
mod store;
mod types;

pub use errors::SessionError;
pub use main::Session;
pub use store::SessionStore;
pub use types::{
    BindingDimension, CANARY_KEY, DOMAIN_BINDING_KEY, EXPIRY_KEY, PATH_BINDING_KEY,
    SessionOptions,
};

