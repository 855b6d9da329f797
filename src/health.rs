//! Health check endpoints for Kubernetes readiness and liveness probes.
//!
//! [`HealthController`] is an ordinary convention controller:
//! - `GET /health/live` - Liveness probe (always returns 200 OK)
//! - `GET /health/ready` - Readiness probe

use serde::{Deserialize, Serialize};

use crate::{Controller, Introspect, Result, controller, middleware::RequestContext};

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Introspect)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Probes take no input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Introspect)]
pub struct HealthRequest {}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, Introspect)]
pub struct HealthResponse {
    #[tag(desc = "Overall service status")]
    pub status: HealthStatus,
}

impl HealthResponse {
    fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
        }
    }
}

/// Liveness and readiness probes, mounted at `/health`.
#[derive(Debug, Default, Controller)]
pub struct HealthController;

#[controller]
impl HealthController {
    fn base_path(&self) -> &str {
        "health"
    }

    /// Checks if the service is alive. Kubernetes uses this to know if the
    /// container needs to be restarted.
    pub async fn get_live(
        &self,
        _ctx: RequestContext,
        _req: HealthRequest,
    ) -> Result<HealthResponse> {
        Ok(HealthResponse::healthy())
    }

    /// Checks if the service is ready to handle requests. Reaching this
    /// handler means the router is built and serving.
    pub async fn get_ready(
        &self,
        _ctx: RequestContext,
        _req: HealthRequest,
    ) -> Result<HealthResponse> {
        Ok(HealthResponse::healthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ControllerFields, introspect::introspect};

    #[test]
    fn test_health_response_serialization() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert_eq!(json, r#"{"status":"healthy"}"#);
    }

    #[test]
    fn test_health_status_is_scalar() {
        let info = introspect::<HealthResponse>();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].child_type, "HealthStatus");
        assert!(info[0].info.is_empty());
        assert_eq!(info[0].tags.desc, "Overall service status");
    }

    #[test]
    fn test_controller_surface() {
        let controller = HealthController;
        assert_eq!(controller.type_name(), "HealthController");
        assert_eq!(
            controller.capabilities().base_path.as_deref(),
            Some("health")
        );
    }
}
