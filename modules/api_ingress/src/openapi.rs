//! Assembles the OpenAPI 3.1 document from registered operation specs.

use modkit::api::{OperationSpec, ParamLocation, ResponseSpec};
use std::collections::BTreeMap;
use utoipa::openapi::{
    path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder},
    request_body::RequestBodyBuilder,
    schema::{ArrayBuilder, ObjectBuilder, Schema, Type},
    ComponentsBuilder, ContentBuilder, InfoBuilder, OpenApi, OpenApiBuilder, PathsBuilder, Ref,
    RefOr, Required, ResponseBuilder,
};

pub const TITLE: &str = "Skopei API";

fn http_method(m: &axum::http::Method) -> Option<HttpMethod> {
    Some(match m.as_str() {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        "PATCH" => HttpMethod::Patch,
        "HEAD" => HttpMethod::Head,
        "OPTIONS" => HttpMethod::Options,
        _ => return None,
    })
}

/// `$ref` to a known component, or a minimal inline schema for the content type.
fn schema_for(
    components: &BTreeMap<String, RefOr<Schema>>,
    content_type: &str,
    schema_name: Option<&str>,
    is_array: bool,
) -> RefOr<Schema> {
    let item: RefOr<Schema> = match schema_name {
        Some(name) if components.contains_key(name) => Ref::from_schema_name(name).into(),
        _ if content_type == "text/plain" => {
            RefOr::T(ObjectBuilder::new().schema_type(Type::String).build().into())
        }
        _ => RefOr::T(ObjectBuilder::new().schema_type(Type::Object).build().into()),
    };
    if is_array {
        RefOr::T(Schema::Array(ArrayBuilder::new().items(item).build()))
    } else {
        item
    }
}

fn response_of(
    components: &BTreeMap<String, RefOr<Schema>>,
    r: &ResponseSpec,
) -> utoipa::openapi::Response {
    let mut b = ResponseBuilder::new().description(&r.description);
    if let Some(ct) = r.content_type {
        let schema = schema_for(components, ct, r.schema_name.as_deref(), r.is_array);
        b = b.content(ct, ContentBuilder::new().schema(Some(schema)).build());
    }
    b.build()
}

pub fn build(
    specs: &[OperationSpec],
    components: &BTreeMap<String, RefOr<Schema>>,
) -> OpenApi {
    // path -> method -> spec, so output order is stable
    let mut by_path: BTreeMap<&str, Vec<&OperationSpec>> = BTreeMap::new();
    for spec in specs {
        by_path.entry(spec.path.as_str()).or_default().push(spec);
    }

    let mut paths = PathsBuilder::new();
    for (path, ops) in by_path {
        let mut item = PathItemBuilder::new();
        for spec in ops {
            let Some(method) = http_method(&spec.method) else {
                tracing::warn!(method = %spec.method, path, "method not representable in OpenAPI; skipped");
                continue;
            };

            let mut op = OperationBuilder::new()
                .operation_id(Some(
                    spec.operation_id
                        .clone()
                        .unwrap_or_else(|| spec.handler_id.clone()),
                ))
                .summary(spec.summary.clone())
                .description(spec.description.clone());
            if !spec.tags.is_empty() {
                op = op.tags(Some(spec.tags.clone()));
            }

            for p in &spec.params {
                let location = match p.location {
                    ParamLocation::Path => ParameterIn::Path,
                    ParamLocation::Query => ParameterIn::Query,
                };
                let required = if p.location == ParamLocation::Path || p.required {
                    Required::True
                } else {
                    Required::False
                };
                let ty = match p.param_type.as_str() {
                    "integer" => Type::Integer,
                    "number" => Type::Number,
                    "boolean" => Type::Boolean,
                    _ => Type::String,
                };
                op = op.parameter(
                    ParameterBuilder::new()
                        .name(&p.name)
                        .parameter_in(location)
                        .required(required)
                        .description(p.description.clone())
                        .schema(Some(RefOr::T(Schema::Object(
                            ObjectBuilder::new().schema_type(ty).build(),
                        ))))
                        .build(),
                );
            }

            if let Some(rb) = &spec.request_body {
                let schema = schema_for(components, rb.content_type, rb.schema_name.as_deref(), false);
                op = op.request_body(Some(
                    RequestBodyBuilder::new()
                        .description(rb.description.clone())
                        .content(rb.content_type, ContentBuilder::new().schema(Some(schema)).build())
                        .required(Some(if rb.required {
                            Required::True
                        } else {
                            Required::False
                        }))
                        .build(),
                ));
            }

            for r in &spec.responses {
                op = op.response(r.status.to_string(), response_of(components, r));
            }

            item = item.operation(method, op.build());
        }
        paths = paths.path(path, item.build());
    }

    let mut comps = ComponentsBuilder::new();
    for (name, schema) in components {
        comps = comps.schema(name.clone(), schema.clone());
    }

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(TITLE)
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("CRUD API for users and products"))
                .build(),
        )
        .paths(paths.build())
        .components(Some(comps.build()))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use modkit::api::ParamSpec;

    fn spec(method: Method, path: &str) -> OperationSpec {
        OperationSpec {
            method: method.clone(),
            path: path.to_string(),
            operation_id: None,
            summary: Some("summary".into()),
            description: None,
            tags: vec!["Users".into()],
            params: vec![],
            request_body: None,
            responses: vec![ResponseSpec {
                status: 200,
                content_type: Some("application/json"),
                description: "ok".into(),
                schema_name: Some("UserDto".into()),
                is_array: true,
            }],
            handler_id: format!("{}:{}", method.as_str().to_lowercase(), path),
        }
    }

    #[test]
    fn paths_group_methods_and_reference_components() {
        let mut components = BTreeMap::new();
        components.insert(
            "UserDto".to_string(),
            RefOr::T(ObjectBuilder::new().schema_type(Type::Object).build().into()),
        );

        let mut by_id = spec(Method::GET, "/api/user/{id}");
        by_id.params.push(ParamSpec {
            name: "id".into(),
            location: ParamLocation::Path,
            required: true,
            description: Some("User id".into()),
            param_type: "integer".into(),
        });
        let specs = vec![spec(Method::GET, "/api/user"), spec(Method::POST, "/api/user"), by_id];

        let doc = serde_json::to_value(build(&specs, &components)).unwrap();

        assert!(doc["openapi"].as_str().unwrap().starts_with("3.1"));
        assert_eq!(doc["info"]["title"], TITLE);
        let list = &doc["paths"]["/api/user"];
        assert!(list.get("get").is_some());
        assert!(list.get("post").is_some());
        assert_eq!(list["get"]["operationId"], "get:/api/user");
        assert_eq!(
            list["get"]["responses"]["200"]["content"]["application/json"]["schema"]["items"]["$ref"],
            "#/components/schemas/UserDto"
        );

        let param = &doc["paths"]["/api/user/{id}"]["get"]["parameters"][0];
        assert_eq!(param["in"], "path");
        assert_eq!(param["required"], true);
        assert_eq!(param["schema"]["type"], "integer");
        assert!(doc["components"]["schemas"].get("UserDto").is_some());
    }

    #[test]
    fn unknown_schema_falls_back_to_inline_object() {
        let mut s = spec(Method::GET, "/x");
        s.responses[0].is_array = false;
        let doc = serde_json::to_value(build(&[s], &BTreeMap::new())).unwrap();
        assert_eq!(
            doc["paths"]["/x"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]["type"],
            "object"
        );
    }
}
