//! Use case implementations.

mod convert_link_use_case;
mod convert_scope_use_case;
mod embed_to_base64_use_case;
mod export_base64_use_case;
mod insert_image_use_case;

pub use convert_link_use_case::ConvertLinkUseCase;
pub use convert_scope_use_case::ConvertScopeUseCase;
pub use embed_to_base64_use_case::EmbedToBase64UseCase;
pub use export_base64_use_case::{ExportBase64UseCase, ExportOutcome};
pub use insert_image_use_case::InsertImageUseCase;
