//! Application layer with use cases, services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Link scanning, encoding and filtering services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{ConversionFilters, InsertMode, InsertOutcome, InsertRequest, InsertSettings, ResizePolicy};
pub use use_cases::{
    ConvertLinkUseCase, ConvertScopeUseCase, EmbedToBase64UseCase, ExportBase64UseCase,
    InsertImageUseCase,
};
