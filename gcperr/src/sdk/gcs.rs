use std::io::{Write as _, stdout};

use anyhow::Result;
use http::Method;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;

use super::{Api, BasicRequest, execute, request_builder};
use crate::config::Settings;

/// Characters left as is in a path segment, everything else is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn object_url(bucket: &str, object: &str) -> String {
    format!(
        "https://storage.googleapis.com/storage/v1/b/{}/o/{}",
        utf8_percent_encode(bucket, SEGMENT),
        utf8_percent_encode(object, SEGMENT)
    )
}

/// `objects.get` with `alt=media`; the object content goes to stdout.
pub async fn get_object(client: &Client, settings: &Settings) -> Result<()> {
    let request = request_builder(BasicRequest {
        method: Method::GET,
        endpoint: object_url(&settings.bucket, &settings.object),
        query: vec![("alt", "media".to_string())],
        payload: None,
        settings,
    })?;
    let response = execute(client, request, Api::Gcs).await?;
    let content = response.bytes().await?;
    stdout().write_all(&content)?;
    Ok(())
}
