//! Translation of cursor rows into the typed table.

mod cancel;
mod translator;

pub use cancel::CancelToken;
pub use translator::{Translation, Translator};
