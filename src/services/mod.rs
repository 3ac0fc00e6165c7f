pub mod reconciler;
pub mod translator;

pub use reconciler::{ReconcileOutcome, Reconciler};
pub use translator::TranslationService;
