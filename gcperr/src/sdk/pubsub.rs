use anyhow::Result;
use http::Method;
use reqwest::Client;
use serde::Deserialize;

use super::{Api, BasicRequest, execute, request_builder};
use crate::config::Settings;

const ENDPOINT: &str = "https://pubsub.googleapis.com/v1";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ListTopicsResponse {
    topics: Vec<Topic>,
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Topic {
    name: String,
}

fn topic_name(project: &str, topic: &str) -> String {
    format!("projects/{project}/topics/{topic}")
}

/// `topics.list` for the project, following every page.
pub async fn list_topics(client: &Client, settings: &Settings) -> Result<()> {
    let endpoint = format!("{ENDPOINT}/projects/{}/topics", settings.project);
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
        let page: ListTopicsResponse =
            execute(client, request, Api::PubSub).await?.json().await?;
        for topic in &page.topics {
            println!("Topic {}", topic.name);
        }
        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => return Ok(()),
        }
    }
}

/// `topics.create`. Creating a topic that already exists is the usual way
/// to get an `ALREADY_EXISTS` status back.
pub async fn create_topic(client: &Client, settings: &Settings) -> Result<()> {
    let name = topic_name(&settings.project, &settings.topic);
    let request = request_builder(BasicRequest {
        method: Method::PUT,
        endpoint: format!("{ENDPOINT}/{name}"),
        query: Vec::new(),
        payload: Some("{}".to_string()),
        settings,
    })?;
    let topic: Topic = execute(client, request, Api::PubSub).await?.json().await?;
    println!("Created topic {}", topic.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_topic_name() {
        assert_eq!(topic_name("p", "t"), "projects/p/topics/t");
    }

    #[test]
    fn list_response_parses() {
        let page: ListTopicsResponse = serde_json::from_str(
            r#"{"topics":[{"name":"projects/p/topics/a"},{"name":"projects/p/topics/b"}]}"#,
        )
        .unwrap();
        assert_eq!(page.topics.len(), 2);
        assert!(page.next_page_token.is_none());
    }
}
