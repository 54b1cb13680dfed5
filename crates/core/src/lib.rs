//! Core domain types, configuration, reflow policy and the translator
//! capability for layout-preserving slide-deck translation.

pub mod config;
pub mod error;
pub mod progress;
pub mod reflow;
pub mod translator;
pub mod types;

pub use config::{EngineConfig, GlossaryItem, ProviderConfig, TranslationOptions};
pub use error::{Error, Result, TranslateError};
pub use progress::Progress;
pub use reflow::{visual_width, ReflowPolicy};
pub use translator::{FnTranslator, Translator};
pub use types::{FontProgressEvent, Phase, PresentationFormat, ProgressEvent, Stats, Summary};
