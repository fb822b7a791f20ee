use anyhow::Result;
use http::Method;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{Api, BasicRequest, execute, request_builder};
use crate::config::Settings;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnalyzeIamPolicyResponse {
    main_analysis: Analysis,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Analysis {
    analysis_results: Vec<AnalysisResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnalysisResult {
    access_control_lists: Vec<AccessControlList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AccessControlList {
    resources: Vec<Value>,
    accesses: Vec<Value>,
}

fn analysis_query(settings: &Settings) -> Vec<(&'static str, String)> {
    vec![
        (
            "analysisQuery.resourceSelector.fullResourceName",
            settings.resource.clone(),
        ),
        (
            "analysisQuery.identitySelector.identity",
            settings.identity.clone(),
        ),
    ]
}

/// `analyzeIamPolicy` for one resource and one identity within the scope.
pub async fn analyze_iam_policy(
    client: &Client,
    settings: &Settings,
) -> Result<()> {
    let request = request_builder(BasicRequest {
        method: Method::GET,
        endpoint: format!(
            "https://cloudasset.googleapis.com/v1/{}:analyzeIamPolicy",
            settings.scope
        ),
        query: analysis_query(settings),
        payload: None,
        settings,
    })?;
    let response: AnalyzeIamPolicyResponse =
        execute(client, request, Api::Asset).await?.json().await?;
    for result in &response.main_analysis.analysis_results {
        for acl in &result.access_control_lists {
            println!("    AnalysisResults.Resources {:?}", acl.resources);
            println!("    AnalysisResults.Accesses {:?}", acl.accesses);
        }
    }
    Ok(())
}
