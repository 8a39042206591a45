#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod config;
pub mod editor_service;
pub mod error;
pub mod quiz_service;
pub mod reveal;
pub mod signal;

pub use quiz_core::Clock;

pub use api::{ApiBody, ApiResponse, QuestionsApi};
pub use app_services::AppServices;
pub use config::{RemoteMode, StoreConfig};
pub use editor_service::EditorService;
pub use error::{ApiError, AppServicesError, EditorError, QuizError};
pub use quiz_service::QuizService;
pub use reveal::{REVEAL_TICK, RevealAnimator};
pub use signal::UpdateSignal;
