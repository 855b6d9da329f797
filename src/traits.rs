//! Common traits for convention controllers.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{classify::MethodDescriptor, handler::Middleware};

/// Structural side of a controller: its bare type name and its fields.
///
/// This trait is automatically implemented by `#[derive(Controller)]`.
pub trait ControllerFields {
    /// Bare type name, e.g. `"Widget"`.
    fn type_name(&self) -> &'static str;

    /// Member fields, in declaration order.
    fn fields(&self) -> Vec<FieldDescriptor> {
        Vec::new()
    }
}

/// A controller whose public methods become routes by convention.
///
/// This trait is automatically implemented by the `#[controller]` macro on an
/// `impl` block.
pub trait Controller: ControllerFields + Send + Sync + 'static {
    /// Describes every public method of the controller.
    fn methods(self: Arc<Self>) -> Vec<MethodDescriptor>;

    /// Optional capabilities: explicit base path, controller-wide chain and
    /// per-method chains.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }
}

/// Capabilities of one controller, resolved once per resolution pass.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub base_path: Option<String>,
    pub middlewares: Vec<Middleware>,
    pub method_middlewares: HashMap<String, Vec<Middleware>>,
}

impl Capabilities {
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn middlewares(mut self, middlewares: impl IntoIterator<Item = Middleware>) -> Self {
        self.middlewares.extend(middlewares);
        self
    }

    pub fn method_middlewares<I, K>(mut self, chains: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<Middleware>)>,
        K: Into<String>,
    {
        self.method_middlewares
            .extend(chains.into_iter().map(|(name, chain)| (name.into(), chain)));
        self
    }

    /// Chain registered for the exact method name, if any.
    pub fn method_chain(&self, method_name: &str) -> &[Middleware] {
        self.method_middlewares
            .get(method_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("base_path", &self.base_path)
            .field("middlewares", &self.middlewares.len())
            .field(
                "method_middlewares",
                &self.method_middlewares.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// One member field of a controller type.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    /// Embedded fields merge their methods into the embedding controller.
    pub embedded: bool,
    instantiate: Option<fn() -> Arc<dyn Controller>>,
}

impl FieldDescriptor {
    /// A field holding a sub-controller of type `T`.
    pub fn controller<T>(name: impl Into<String>, embedded: bool) -> Self
    where
        T: Controller + Default,
    {
        Self {
            name: name.into(),
            embedded,
            instantiate: Some(instantiate::<T>),
        }
    }

    /// A field that does not lead to a sub-controller.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            embedded: false,
            instantiate: None,
        }
    }

    /// A fresh, default-valued controller of the field's type.
    pub fn instantiate(&self) -> Option<Arc<dyn Controller>> {
        self.instantiate.map(|make| make())
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("embedded", &self.embedded)
            .field("controller", &self.instantiate.is_some())
            .finish()
    }
}

fn instantiate<T: Controller + Default>() -> Arc<dyn Controller> {
    Arc::new(T::default())
}
