//! Controller resolution: walks controller instances and builds the route
//! tree and the metadata table.
//!
//! For each controller:
//! 1. the base path comes from its explicit capability, or from the naming
//!    rule applied to its bare type name;
//! 2. a sub-group is opened at `inherited + base`, carrying the controller
//!    chain;
//! 3. unless re-entered for an embedded field, every public method (its own
//!    and those of its embedded fields) is matched against the prefix table,
//!    classified and registered;
//! 4. every public sub-controller field is instantiated fresh and resolved
//!    under the sub-group.
//!
//! Nothing here fails: methods and fields that do not fit are skipped with a
//! `debug!` line.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tracing::{debug, info, warn};

use crate::{
    classify::{Classified, MethodDescriptor, classify},
    handler::{Handler, Middleware},
    introspect::introspect_desc,
    metadata::{ApiRoute, ApiRoutes, Field},
    naming::{HttpVerb, NamingRule, PrefixRules, is_public, join_path},
    route::{RouteGroup, path_shape},
    traits::{Capabilities, Controller, FieldDescriptor},
};

/// Conventions the resolver applies.
#[derive(Debug, Clone, Default)]
pub struct ResolverSettings {
    pub naming: NamingRule,
    pub prefixes: PrefixRules,
}

/// Resolves controllers into a [`RouteGroup`] tree.
///
/// The first registration of a `(verb, path)` pair wins; later ones are
/// dropped with a warning. So are paths that only differ from an earlier one
/// in placeholder names.
#[derive(Debug)]
pub struct Resolver {
    settings: ResolverSettings,
    registered: HashSet<(HttpVerb, String)>,
    /// Path shape to the first concrete path registered with it.
    shapes: HashMap<String, String>,
    api_routes: ApiRoutes,
}

impl Resolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self {
            settings,
            registered: HashSet::new(),
            shapes: HashMap::new(),
            api_routes: ApiRoutes::new(),
        }
    }

    /// Resolves `controller` under `parent`.
    ///
    /// `skip_methods` is set when re-entering an embedded field whose methods
    /// were already merged into the embedding controller.
    pub fn resolve(
        &mut self,
        parent: &mut RouteGroup,
        controller: Arc<dyn Controller>,
        skip_methods: bool,
    ) {
        let type_name = controller.type_name();
        if !is_public(type_name) {
            debug!(controller = type_name, "skipping non-public controller");
            return;
        }

        let mut capabilities = controller.capabilities();
        let base_path = capabilities
            .base_path
            .clone()
            .unwrap_or_else(|| self.settings.naming.apply(type_name));
        let group = parent.group(&base_path, capabilities.middlewares.clone());
        let fields = controller.fields();

        if !skip_methods {
            let methods =
                merged_methods(&controller, &fields, &mut capabilities.method_middlewares);
            for method in methods {
                self.register_method(group, &capabilities, method);
            }
        }

        for field in &fields {
            if !is_public(&field.name) {
                continue;
            }
            let Some(sub_controller) = field.instantiate() else {
                continue;
            };
            self.resolve(group, sub_controller, field.embedded);
        }
    }

    /// Consumes the resolver, returning the collected metadata.
    pub fn finish(self) -> ApiRoutes {
        self.api_routes
    }

    fn register_method(
        &mut self,
        group: &mut RouteGroup,
        capabilities: &Capabilities,
        method: MethodDescriptor,
    ) {
        let MethodDescriptor { name, shape } = method;
        if !is_public(&name) {
            debug!(method = %name, "skipping non-public method");
            return;
        }
        let Some((verb, remainder)) = self.settings.prefixes.match_method(&name) else {
            debug!(method = %name, "no prefix rule produces a route");
            return;
        };
        let mut path = self.settings.naming.route_segment(remainder);
        let chain = capabilities.method_chain(&name).to_vec();

        match classify(shape) {
            Classified::PassThrough(handler) => {
                self.register(group, verb, &path, name, chain, handler);
            }
            Classified::Callback(route) => {
                let req_info = introspect_desc(route.request.clone());
                for field in &req_info {
                    if let Some(key) = field.tags.path_param() {
                        path = join_path(&path, &format!(":{key}"));
                    }
                }

                let full_path = join_path(&group.path, &path);
                if !self.claim(verb, &full_path, &name) {
                    return;
                }
                self.api_routes.push(ApiRoute {
                    path: full_path,
                    http_method: verb.as_lower().to_string(),
                    method_name: name.clone(),
                    req_params: Field {
                        name: route.request.clone().unwrap_indirection().name,
                        info: req_info.clone(),
                    },
                    resp_params: Field {
                        name: route.response.clone().unwrap_indirection().name,
                        info: introspect_desc(route.response.clone()),
                    },
                });

                let handler = route.into_handler(verb, req_info);
                self.log_route(verb, &group.path, &path, &name);
                group.handle(verb, &path, name, chain, handler);
            }
            Classified::NotRoutable => {
                debug!(method = %name, "signature is not routable");
            }
        }
    }

    fn register(
        &mut self,
        group: &mut RouteGroup,
        verb: HttpVerb,
        path: &str,
        name: String,
        chain: Vec<Middleware>,
        handler: Handler,
    ) {
        if !self.claim(verb, &join_path(&group.path, path), &name) {
            return;
        }
        self.log_route(verb, &group.path, path, &name);
        group.handle(verb, path, name, chain, handler);
    }

    fn claim(&mut self, verb: HttpVerb, full_path: &str, name: &str) -> bool {
        let shape = path_shape(full_path);
        if let Some(existing) = self.shapes.get(&shape) {
            if existing != full_path {
                warn!(
                    method = name,
                    "{} {} conflicts with {}, skipping", verb, full_path, existing
                );
                return false;
            }
        }
        if !self.registered.insert((verb, full_path.to_string())) {
            warn!(method = name, "{} {} already registered, skipping", verb, full_path);
            return false;
        }
        self.shapes.insert(shape, full_path.to_string());
        true
    }

    fn log_route(&self, verb: HttpVerb, group_path: &str, path: &str, name: &str) {
        info!("📍 {} {} [{}]", verb, join_path(group_path, path), name);
    }
}

/// The controller's own methods followed by those promoted from its public
/// embedded fields. An own method shadows a promoted one of the same name.
/// A promoted method brings its per-method chain along unless `chains`
/// already has one under that name.
fn merged_methods(
    controller: &Arc<dyn Controller>,
    fields: &[FieldDescriptor],
    chains: &mut HashMap<String, Vec<Middleware>>,
) -> Vec<MethodDescriptor> {
    let mut methods = Arc::clone(controller).methods();
    let mut seen: HashSet<String> = methods.iter().map(|m| m.name.clone()).collect();

    for field in fields.iter().filter(|f| f.embedded && is_public(&f.name)) {
        let Some(embedded) = field.instantiate() else {
            continue;
        };
        let embedded_fields = embedded.fields();
        let mut embedded_chains = embedded.capabilities().method_middlewares;
        for method in merged_methods(&embedded, &embedded_fields, &mut embedded_chains) {
            if !seen.insert(method.name.clone()) {
                continue;
            }
            if let Some(chain) = embedded_chains.remove(&method.name) {
                chains.entry(method.name.clone()).or_insert(chain);
            }
            methods.push(method);
        }
    }
    methods
}
