//! OpenAPI export of the collected route metadata.
//!
//! Every callback route becomes one operation: `path` and `query` tagged
//! request fields become parameters, remaining request fields form the JSON
//! body (for verbs that carry one) and the response tree is the `200` schema.

use std::path::Path;

use tracing::info;
use utoipa::openapi::{
    Content, ContentBuilder, Info, InfoBuilder, OpenApi, OpenApiBuilder, Paths, RefOr, Required,
    ResponseBuilder, Schema,
    path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn},
    request_body::RequestBodyBuilder,
    schema::{ArrayBuilder, KnownFormat, ObjectBuilder, SchemaFormat, Type},
};

use crate::{
    Result,
    error::AppError,
    introspect::FieldInfo,
    metadata::{ApiRoute, ApiRoutes},
    naming::HttpVerb,
    route::axum_path,
};

const JSON: &str = "application/json";

/// Title and version with which [`document`] labels the API.
pub fn info(title: impl Into<String>, version: impl Into<String>) -> Info {
    InfoBuilder::new().title(title).version(version).build()
}

/// Builds the document for every route in `routes`.
pub fn document(info: Info, routes: &ApiRoutes) -> OpenApi {
    let mut paths = Paths::new();
    for (path, records) in routes.iter() {
        for route in records {
            let Ok(verb) = route.http_method.parse::<HttpVerb>() else {
                continue;
            };
            paths.add_path_operation(
                axum_path(path),
                vec![http_method(verb)],
                operation(route, verb),
            );
        }
    }
    OpenApiBuilder::new().info(info).paths(paths).build()
}

/// Writes `openapi` as YAML to `path`.
pub fn write_yaml(openapi: &OpenApi, path: &Path) -> Result<()> {
    let yaml = openapi
        .to_yaml()
        .map_err(|e| AppError::InternalServerError(format!("failed to render OpenAPI YAML: {e}")))?;
    std::fs::write(path, yaml).map_err(|e| {
        AppError::InternalServerError(format!("failed to write {}: {e}", path.display()))
    })?;
    info!("📄 OpenAPI written to {}", path.display());
    Ok(())
}

fn http_method(verb: HttpVerb) -> HttpMethod {
    match verb {
        HttpVerb::Get => HttpMethod::Get,
        HttpVerb::Post => HttpMethod::Post,
        HttpVerb::Put => HttpMethod::Put,
        HttpVerb::Delete => HttpMethod::Delete,
        HttpVerb::Patch => HttpMethod::Patch,
        HttpVerb::Head => HttpMethod::Head,
        HttpVerb::Options => HttpMethod::Options,
    }
}

fn operation(route: &ApiRoute, verb: HttpVerb) -> utoipa::openapi::path::Operation {
    let mut builder = OperationBuilder::new().summary(Some(route.method_name.clone()));
    let mut body = Vec::new();

    for field in &route.req_params.info {
        if let Some(key) = field.tags.path_param() {
            builder = builder.parameter(parameter(field, key, ParameterIn::Path, Required::True));
        } else if let Some(key) = field.tags.query_param() {
            builder = builder.parameter(parameter(field, key, ParameterIn::Query, Required::False));
        } else if !verb.is_bodyless() && field.tags.body_key != "-" {
            body.push(field.clone());
        }
    }

    if !body.is_empty() {
        builder = builder.request_body(Some(
            RequestBodyBuilder::new()
                .content(JSON, json_content(object(&route.req_params.name, &body)))
                .required(Some(Required::True))
                .build(),
        ));
    }

    let response = ResponseBuilder::new()
        .description("Successful response")
        .content(
            JSON,
            json_content(object(&route.resp_params.name, &route.resp_params.info)),
        )
        .build();
    builder.response("200", response).build()
}

fn parameter(
    field: &FieldInfo,
    key: &str,
    location: ParameterIn,
    required: Required,
) -> utoipa::openapi::path::Parameter {
    ParameterBuilder::new()
        .name(key)
        .parameter_in(location)
        .required(required)
        .description(non_empty(&field.tags.desc))
        .schema(Some(RefOr::T(field_schema(field))))
        .build()
}

fn json_content(schema: Schema) -> Content {
    ContentBuilder::new().schema(Some(RefOr::T(schema))).build()
}

fn object(title: &str, fields: &[FieldInfo]) -> Schema {
    let mut builder = ObjectBuilder::new()
        .schema_type(Type::Object)
        .title(non_empty(title));
    for field in fields {
        builder = builder.property(field.wire_name(), RefOr::T(field_schema(field)));
        if !is_optional(&field.type_name) {
            builder = builder.required(field.wire_name());
        }
    }
    Schema::Object(builder.build())
}

fn field_schema(field: &FieldInfo) -> Schema {
    let element = if field.info.is_empty() && !field.recursive {
        scalar(field)
    } else {
        let mut schema = object(&field.child_type, &field.info);
        if let Schema::Object(object) = &mut schema {
            object.description = non_empty(&field.tags.desc);
        }
        schema
    };

    if is_sequence(&field.type_name) {
        Schema::Array(ArrayBuilder::new().items(RefOr::T(element)).build())
    } else {
        element
    }
}

fn scalar(field: &FieldInfo) -> Schema {
    let (ty, known) = match field.child_type.as_str() {
        "bool" => (Type::Boolean, None),
        "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => (Type::Integer, Some(KnownFormat::Int32)),
        "i64" | "i128" | "isize" | "u64" | "u128" | "usize" => {
            (Type::Integer, Some(KnownFormat::Int64))
        }
        "f32" => (Type::Number, Some(KnownFormat::Float)),
        "f64" => (Type::Number, Some(KnownFormat::Double)),
        "Uuid" => (Type::String, Some(KnownFormat::Uuid)),
        "Value" => (Type::Object, None),
        other if other.starts_with("HashMap<") || other.starts_with("BTreeMap<") => {
            (Type::Object, None)
        }
        // Unit-variant enums and other opaque scalars render as strings.
        _ => (Type::String, None),
    };
    let format = match field.tags.format.as_str() {
        "" => known.map(SchemaFormat::KnownFormat),
        custom => Some(SchemaFormat::Custom(custom.to_string())),
    };

    Schema::Object(
        ObjectBuilder::new()
            .schema_type(ty)
            .format(format)
            .title(non_empty(&field.tags.title))
            .description(non_empty(&field.tags.desc))
            .build(),
    )
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn strip_wrappers(mut type_name: &str) -> &str {
    loop {
        let stripped = ["Option<", "Box<", "Arc<", "Rc<"]
            .iter()
            .find_map(|wrapper| type_name.strip_prefix(wrapper))
            .or_else(|| type_name.strip_prefix('&'));
        match stripped {
            Some(inner) => type_name = inner,
            None => return type_name,
        }
    }
}

fn is_sequence(type_name: &str) -> bool {
    let inner = strip_wrappers(type_name);
    ["Vec<", "VecDeque<", "HashSet<", "BTreeSet<", "["]
        .iter()
        .any(|seq| inner.starts_with(seq))
}

fn is_optional(type_name: &str) -> bool {
    type_name.starts_with("Option<")
}
