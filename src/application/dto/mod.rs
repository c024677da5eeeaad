//! Data transfer objects for the application layer.

mod conversion_dto;

pub use conversion_dto::{
    ConversionFilters, InsertMode, InsertOutcome, InsertRequest, InsertSettings, LinkConversion,
    ResizePolicy, ThresholdPolicy,
};
