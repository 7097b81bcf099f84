use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use chrono::{NaiveDate, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::middleware::RequestId;

use super::{run_catalog, ApiError, AppState};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const CHANGE_FREQ: &str = "weekly";
const PRIORITY: &str = "0.8";

pub(super) async fn sitemap(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    let identifiers = run_catalog(&state, &req_id.0, |catalog| catalog.all_urls()).await?;
    let lastmod = Utc::now().date_naive();

    match render_sitemap(&state.site_url, &identifiers, lastmod) {
        Ok(body) => Ok(([(header::CONTENT_TYPE, "text/xml")], body).into_response()),
        Err(e) => {
            tracing::error!(error = %e, "sitemap rendering failed");
            Err(ApiError::new(
                req_id.0,
                "internal_error",
                "sitemap rendering failed",
            ))
        }
    }
}

/// Renders a `<urlset>` with one `<url>` per product identifier.
pub(super) fn render_sitemap(
    site_url: &str,
    identifiers: &[String],
    lastmod: NaiveDate,
) -> anyhow::Result<String> {
    let lastmod = lastmod.format("%Y-%m-%d").to_string();
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
    ))?;

    for id in identifiers {
        let loc = format!("{site_url}/product/{id}");
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        writer
            .create_element("loc")
            .write_text_content(BytesText::new(&loc))?;
        writer
            .create_element("lastmod")
            .write_text_content(BytesText::new(&lastmod))?;
        writer
            .create_element("changefreq")
            .write_text_content(BytesText::new(CHANGE_FREQ))?;
        writer
            .create_element("priority")
            .write_text_content(BytesText::new(PRIORITY))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}
