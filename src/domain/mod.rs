pub mod callback;

pub use callback::{CallbackVerdict, GatewayCallback};
