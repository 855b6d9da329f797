#![allow(dead_code)]

use axum::{Router, body::Body};
use eywa_autoroute::{AppError, prelude::*};
use http_body_util::BodyExt;
use tower::ServiceExt;

#[derive(Debug, Deserialize, Introspect)]
pub struct WidgetDetailReq {
    #[tag(path = "id", desc = "Widget id")]
    pub id: u64,
    #[tag(query = "verbose")]
    pub verbose: Option<bool>,
}

#[derive(Debug, Serialize, Introspect)]
pub struct WidgetDetailResp {
    pub id: u64,
    pub name: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Introspect)]
pub struct Part {
    #[tag(title = "Part number")]
    pub sku: String,
}

#[derive(Debug, Deserialize, Introspect)]
pub struct CreateWidgetReq {
    pub name: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Controller)]
pub struct Widget;

#[controller]
impl Widget {
    pub async fn get_detail(
        &self,
        _ctx: RequestContext,
        req: WidgetDetailReq,
    ) -> Result<WidgetDetailResp> {
        if req.id == 0 {
            return Err(AppError::NotFound("widget 0".into()));
        }
        let name = match req.verbose {
            Some(true) => format!("widget number {}", req.id),
            _ => format!("widget-{}", req.id),
        };
        Ok(WidgetDetailResp {
            id: req.id,
            name,
            parts: Vec::new(),
        })
    }

    pub fn post_create(
        &self,
        _ctx: RequestContext,
        req: CreateWidgetReq,
    ) -> Result<WidgetDetailResp> {
        Ok(WidgetDetailResp {
            id: 1,
            name: req.name,
            parts: req.parts,
        })
    }

    pub fn get_status(&self) -> Handler {
        Handler::new(|_req| async { "up" })
    }

    fn get_secret(&self) -> Handler {
        Handler::new(|_req| async { "secret" })
    }

    pub fn _get_draft(&self) -> Handler {
        Handler::new(|_req| async { "draft" })
    }

    pub fn describe(&self, label: &str) -> String {
        format!("{label}: widget")
    }
}

#[derive(Debug, Deserialize, Introspect)]
pub struct ListReq {
    #[tag(query = "limit")]
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Controller)]
pub struct Items;

#[controller]
impl Items {
    fn base_path(&self) -> &str {
        "v1/items"
    }

    pub async fn get_list(&self, _ctx: RequestContext, req: ListReq) -> Result<Vec<Part>> {
        let limit = req.limit.unwrap_or(2);
        Ok((0..limit)
            .map(|i| Part {
                sku: format!("sku-{i}"),
            })
            .collect())
    }
}

#[derive(Debug, Default, Controller)]
pub struct Common;

#[controller]
impl Common {
    pub fn get_version(&self) -> Handler {
        Handler::new(|_req| async { "1.0.0" })
    }

    pub fn get_status(&self) -> Handler {
        Handler::new(|_req| async { "common" })
    }
}

/// Nests `Widget` under `/api/widget` and promotes `Common`'s methods.
#[derive(Debug, Default, Controller)]
pub struct Api {
    #[mount]
    pub widget: Widget,
    #[mount(embed)]
    pub common: Common,
    #[mount]
    hidden: Items,
    pub label: String,
}

#[controller]
impl Api {
    pub fn get_status(&self) -> Handler {
        Handler::new(|_req| async { "api" })
    }
}

#[derive(Debug, Deserialize, Introspect)]
pub struct EchoReq {}

#[derive(Debug, Serialize, Introspect)]
pub struct EchoResp {
    pub language: String,
    pub correlation_id: Uuid,
}

#[derive(Debug, Default, Controller)]
pub struct Echo;

#[controller]
impl Echo {
    pub async fn get_context(&self, ctx: RequestContext, _req: EchoReq) -> Result<EchoResp> {
        Ok(EchoResp {
            language: ctx.language,
            correlation_id: ctx.correlation_id,
        })
    }
}

pub async fn send(router: Router, method: &str, uri: &str, body: Option<&str>) -> (u16, String) {
    let request = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub fn parse_json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}
