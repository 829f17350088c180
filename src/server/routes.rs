use serde_json::json;

use crate::domain::{parse_region_slugs, parse_value_type_slug};
use crate::error::MetError;
use crate::series;
use crate::store::DataStore;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

pub fn route_request<S: DataStore + ?Sized>(method: &str, path: &str, store: &S) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    if method != "GET" {
        return error_response(405, "Method Not Allowed", "Only GET is supported");
    }

    if path == "/api/health" {
        return json_response(json!({ "status": "ok" }).to_string());
    }

    match time_series_slugs(path) {
        Some((value_type, regions)) => match time_series_payload(value_type, regions, store) {
            Ok(payload) => json_response(payload),
            Err(MetError::NotFound(message)) => error_response(404, "Not Found", &message),
            Err(err @ MetError::InvalidArgument { .. }) => {
                error_response(400, "Bad Request", &err.to_string())
            }
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        None => error_response(404, "Not Found", "Route not found"),
    }
}

/// Splits `/time-series/{value-type}/{regions}` into its two slugs.
fn time_series_slugs(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix("/time-series/")?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    let (value_type, regions) = rest.split_once('/')?;
    if value_type.is_empty() || regions.is_empty() || regions.contains('/') {
        return None;
    }
    Some((value_type, regions))
}

fn time_series_payload<S: DataStore + ?Sized>(
    value_type: &str,
    regions: &str,
    store: &S,
) -> Result<String, MetError> {
    let value_type = parse_value_type_slug(value_type)?;
    let regions = parse_region_slugs(regions)?;
    let series = series::assemble(value_type, &regions, store)?;
    serde_json::to_string(&series).map_err(|err| MetError::Store(err.to_string()))
}

fn json_response(body: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: "application/json",
        body,
    }
}

pub fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: json!({ "status": "error", "message": message }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_from_path() {
        assert_eq!(
            time_series_slugs("/time-series/maxtemp/scotland-england"),
            Some(("maxtemp", "scotland-england"))
        );
        assert_eq!(
            time_series_slugs("/time-series/maxtemp/wales/"),
            Some(("maxtemp", "wales"))
        );
        assert_eq!(time_series_slugs("/time-series/maxtemp"), None);
        assert_eq!(time_series_slugs("/time-series/maxtemp/uk/extra"), None);
    }
}
