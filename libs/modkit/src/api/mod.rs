//! REST building blocks shared by modules: the type-safe operation builder,
//! RFC 9457 problem responses and the validating JSON extractor.

pub mod operation_builder;
pub mod problem;
pub mod validated_json;

pub use operation_builder::{
    ensure_schema, state, Missing, OpenApiRegistry, OperationBuilder, OperationSpec,
    ParamLocation, ParamSpec, Present, RequestBodySpec, ResponseSpec, SchemaCollection,
};
pub use validated_json::ValidatedJson;
