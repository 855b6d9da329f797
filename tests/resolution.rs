mod common;

use std::sync::Arc;

use common::{Api, Items, Widget};
use eywa_autoroute::{
    Capabilities, Controller, ControllerFields, EywaApp, FieldDescriptor, Handler, HttpVerb,
    Introspect, MethodDescriptor, PrefixRule, RequestContext, Result, RouteGroup, controller,
    resolver::{Resolver, ResolverSettings},
};
use serde::{Deserialize, Serialize};

fn routes(app: EywaApp) -> Vec<(HttpVerb, String)> {
    app.build().unwrap().registrations
}

fn has(routes: &[(HttpVerb, String)], verb: HttpVerb, path: &str) -> bool {
    routes.iter().any(|(v, p)| *v == verb && p == path)
}

#[test]
fn test_callback_route_with_path_param() {
    let routes = routes(EywaApp::new().controller(Widget));

    assert!(has(&routes, HttpVerb::Get, "/widget/detail/:id"));
    assert!(!has(&routes, HttpVerb::Get, "/widget/detail"));
    assert!(has(&routes, HttpVerb::Post, "/widget/create"));
    assert!(has(&routes, HttpVerb::Get, "/widget/status"));
}

#[test]
fn test_private_and_unroutable_methods_are_excluded() {
    let routes = routes(EywaApp::new().controller(Widget));

    assert!(!has(&routes, HttpVerb::Get, "/widget/secret"));
    assert!(!has(&routes, HttpVerb::Get, "/widget/draft"));
    assert!(routes.iter().all(|(_, p)| !p.contains("describe")));
    assert_eq!(routes.len(), 3);
}

#[test]
fn test_explicit_base_path() {
    let routes = routes(EywaApp::new().controller(Items));
    assert_eq!(routes, vec![(HttpVerb::Get, "/v1/items/list".to_string())]);
}

#[test]
fn test_global_base_path() {
    let routes = routes(EywaApp::new().base_path("/api/v2/").controller(Items));
    assert_eq!(
        routes,
        vec![(HttpVerb::Get, "/api/v2/v1/items/list".to_string())]
    );
}

#[test]
fn test_nested_and_embedded_controllers() {
    let routes = routes(EywaApp::new().controller(Api::default()));

    // Own method shadows the embedded one, the embedded rest is promoted.
    assert!(has(&routes, HttpVerb::Get, "/api/status"));
    assert!(has(&routes, HttpVerb::Get, "/api/version"));
    assert!(!has(&routes, HttpVerb::Get, "/api/common/version"));
    assert!(!has(&routes, HttpVerb::Get, "/api/common/status"));

    assert!(has(&routes, HttpVerb::Get, "/api/widget/detail/:id"));
    assert!(has(&routes, HttpVerb::Post, "/api/widget/create"));

    assert!(routes.iter().all(|(_, p)| !p.contains("items")));
}

#[test]
fn test_prefix_remainder_must_not_be_empty() {
    #[derive(Default)]
    struct Bare;

    impl ControllerFields for Bare {
        fn type_name(&self) -> &'static str {
            "Bare"
        }
    }

    impl Controller for Bare {
        fn methods(self: Arc<Self>) -> Vec<MethodDescriptor> {
            vec![
                MethodDescriptor::pass_through("Update", || Handler::new(|_req| async { "" })),
                MethodDescriptor::pass_through("UpdateName", || Handler::new(|_req| async { "" })),
                MethodDescriptor::pass_through("internalHelper", || {
                    Handler::new(|_req| async { "" })
                }),
                MethodDescriptor::not_routable("GetConfig"),
            ]
        }
    }

    let app = EywaApp::new()
        .append_prefixes([PrefixRule::new("Update", HttpVerb::Put)])
        .controller(Bare);
    assert_eq!(routes(app), vec![(HttpVerb::Put, "/bare/name".to_string())]);
}

#[test]
fn test_replaced_prefix_table() {
    let app = EywaApp::new()
        .prefixes([PrefixRule::new("Post", HttpVerb::Patch)])
        .controller(Widget);
    assert_eq!(
        routes(app),
        vec![(HttpVerb::Patch, "/widget/create".to_string())]
    );
}

#[test]
fn test_custom_naming_rule() {
    let app = EywaApp::new()
        .naming_rule(|ident| ident.to_uppercase())
        .controller(Items);
    // An explicit base path is not run through the naming rule.
    assert_eq!(routes(app), vec![(HttpVerb::Get, "/v1/items/LIST".to_string())]);

    let app = EywaApp::new()
        .naming_rule(|ident| ident.to_lowercase())
        .controller(Widget);
    assert!(has(&routes(app), HttpVerb::Get, "/widget/detail/:id"));
}

#[test]
fn test_first_registration_wins() {
    let built = EywaApp::new()
        .controller(Widget)
        .controller(Widget)
        .build()
        .unwrap();
    assert_eq!(built.registrations.len(), 3);
    assert_eq!(built.api_routes.len(), 2);
}

#[derive(Debug, Deserialize, Introspect)]
pub struct ByIdReq {
    #[tag(path = "id")]
    pub id: u64,
}

#[derive(Debug, Deserialize, Introspect)]
pub struct ByKeyReq {
    #[tag(path = "key")]
    pub key: String,
}

#[derive(Debug, Serialize, Introspect)]
pub struct Done {
    pub ok: bool,
}

#[derive(Debug, Default, Controller)]
pub struct Thing;

#[controller]
impl Thing {
    pub fn get_detail(&self, _ctx: RequestContext, _req: ByIdReq) -> Result<Done> {
        Ok(Done { ok: true })
    }

    pub fn delete_detail(&self, _ctx: RequestContext, _req: ByKeyReq) -> Result<Done> {
        Ok(Done { ok: true })
    }

    pub fn put_detail(&self, _ctx: RequestContext, _req: ByIdReq) -> Result<Done> {
        Ok(Done { ok: true })
    }
}

#[test]
fn test_placeholder_name_conflict_is_skipped() {
    let built = EywaApp::new().controller(Thing).build().unwrap();

    assert_eq!(
        built.registrations,
        vec![
            (HttpVerb::Get, "/thing/detail/:id".to_string()),
            (HttpVerb::Put, "/thing/detail/:id".to_string()),
        ]
    );
    assert!(built.api_routes.get("/thing/detail/:key").is_none());
    assert_eq!(built.api_routes.get("/thing/detail/:id").unwrap().len(), 2);
}

#[test]
fn test_metadata_records() {
    let built = EywaApp::new().controller(Widget).build().unwrap();
    let records = built.api_routes.get("/widget/detail/:id").unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.http_method, "get");
    assert_eq!(record.method_name, "GetDetail");
    assert_eq!(record.req_params.name, "WidgetDetailReq");
    assert_eq!(record.req_params.info[0].tags.path_key, "id");
    assert_eq!(record.req_params.info[0].tags.desc, "Widget id");
    assert_eq!(record.req_params.info[1].tags.query_key, "verbose");
    assert_eq!(record.req_params.info[1].type_name, "Option<bool>");

    assert_eq!(record.resp_params.name, "WidgetDetailResp");
    let parts = &record.resp_params.info[2];
    assert_eq!(parts.type_name, "Vec<Part>");
    assert_eq!(parts.child_type, "Part");
    assert_eq!(parts.info[0].tags.title, "Part number");

    // Pass-through routes carry no metadata.
    assert!(built.api_routes.get("/widget/status").is_none());
}

#[test]
fn test_metadata_is_deterministic() {
    let first = EywaApp::new().controller(Api::default()).build().unwrap();
    let second = EywaApp::new().controller(Api::default()).build().unwrap();
    assert_eq!(first.api_routes, second.api_routes);
    assert_eq!(
        serde_json::to_string(&first.api_routes).unwrap(),
        serde_json::to_string(&second.api_routes).unwrap()
    );
}

#[test]
fn test_health_checks_ignore_base_path() {
    let routes = routes(EywaApp::new().base_path("/api").health_checks());
    assert_eq!(
        routes,
        vec![
            (HttpVerb::Get, "/health/live".to_string()),
            (HttpVerb::Get, "/health/ready".to_string()),
        ]
    );
}

#[test]
fn test_resolver_direct() {
    let mut root = RouteGroup::root("/", Vec::new());
    let mut resolver = Resolver::new(ResolverSettings::default());
    resolver.resolve(&mut root, Arc::new(Items), false);

    assert_eq!(
        root.registrations(),
        vec![(HttpVerb::Get, "/v1/items/list".to_string())]
    );
    assert_eq!(resolver.finish().len(), 1);
}

#[test]
fn test_manual_capabilities() {
    #[derive(Default)]
    struct Manual;

    impl ControllerFields for Manual {
        fn type_name(&self) -> &'static str {
            "Manual"
        }

        fn fields(&self) -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::controller::<Items>("Items", false),
                FieldDescriptor::plain("Name"),
            ]
        }
    }

    impl Controller for Manual {
        fn methods(self: Arc<Self>) -> Vec<MethodDescriptor> {
            Vec::new()
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::default().base_path("manual")
        }
    }

    let routes = routes(EywaApp::new().controller(Manual));
    assert_eq!(
        routes,
        vec![(HttpVerb::Get, "/manual/v1/items/list".to_string())]
    );
}
