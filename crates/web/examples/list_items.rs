use bytes::Bytes;
use http::{Request, Response};
use micro_qp::{query_params, QueryParams};
use micro_qp_web::extract::{FromRequest, Json, Query};
use micro_qp_web::{RequestContext, Responder};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[query_params]
#[derive(Debug)]
pub struct Pagination {
    /// Maximum number of items to return
    #[param(default = 100, ge = 0, le = 1000)]
    pub limit: u32,
    /// Number of items to skip
    #[param(default)]
    pub offset: u32,
}

#[query_params]
#[derive(Debug)]
pub struct DateRange {
    /// A date in the format YYYY-MM-DD
    pub since: Option<String>,
    /// A date in the format YYYY-MM-DD
    pub until: Option<String>,
}

#[query_params]
#[derive(Debug)]
pub struct ListItems {
    #[param(flatten)]
    pub page: Pagination,
    #[param(flatten)]
    pub range: DateRange,
}

#[derive(Serialize)]
struct Listed {
    limit: u32,
    offset: u32,
    since: Option<String>,
    until: Option<String>,
    next: Option<String>,
}

async fn list_items(req: &RequestContext<'_>) -> Response<Bytes> {
    let params = match Query::<ListItems>::from_request(req).await {
        Ok(params) => params,
        Err(e) => return e.response_to(req),
    };

    // link to the next page, keeping the caller's date range
    let mut next = vec![
        ("limit", params.page.limit.to_string()),
        ("offset", params.page.offset.saturating_add(params.page.limit).to_string()),
    ];
    next.extend(params.range.query_pairs());
    let next = ListItems::from_pairs(next).ok().and_then(|next| next.to_url()).map(|query| format!("/items{query}"));

    Json(Listed {
        limit: params.page.limit,
        offset: params.page.offset,
        since: params.range.since,
        until: params.range.until,
        next,
    })
    .response_to(req)
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let dependency = ListItems::dependency().expect("ListItems is a valid schema");
    for parameter in dependency.parameters() {
        info!(
            name = parameter.name(),
            ty = parameter.ty().type_name(),
            default = %parameter.default(),
            description = parameter.description().unwrap_or_default(),
            "query parameter"
        );
    }

    for uri in ["/items", "/items?since=2021-01-01&limit=10", "/items?limit=1001&offset=x"] {
        let (parts, ()) = Request::get(uri).body(()).expect("valid request").into_parts();
        let req = RequestContext::new(&parts);
        let response = list_items(&req).await;

        info!(%uri, status = %response.status(), body = %String::from_utf8_lossy(response.body()), "handled request");
    }
}
