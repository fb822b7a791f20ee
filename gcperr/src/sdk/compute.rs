use anyhow::Result;
use http::Method;
use reqwest::Client;
use serde::Deserialize;

use super::{Api, BasicRequest, execute, request_builder};
use crate::config::Settings;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InstanceList {
    items: Vec<Instance>,
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Instance {
    name: String,
    status: String,
}

fn instances_url(project: &str, zone: &str) -> String {
    format!(
        "https://compute.googleapis.com/compute/v1/projects/{project}/zones/{zone}/instances"
    )
}

/// `instances.list`, following every page.
pub async fn list_instances(client: &Client, settings: &Settings) -> Result<()> {
    let endpoint = instances_url(&settings.project, &settings.zone);
    let mut page_token: Option<String> = None;
    loop {
        let request = request_builder(BasicRequest {
            method: Method::GET,
            endpoint: endpoint.clone(),
            query: page_token
                .take()
                .map(|token| vec![("pageToken", token)])
                .unwrap_or_default(),
            payload: None,
            settings,
        })?;
        let page: InstanceList =
            execute(client, request, Api::Compute).await?.json().await?;
        for instance in &page.items {
            println!("Instance {} ({})", instance.name, instance.status);
        }
        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => return Ok(()),
        }
    }
}
