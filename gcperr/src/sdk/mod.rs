use std::fmt::{self, Display};

use anyhow::Result;
use gcperr_lib::{
    ClientKind,
    client::{Transport, check_response},
};
use http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use reqwest::{Client, Request, Response, Url};
use tracing::{debug, info};

use crate::config::Settings;

mod asset;
mod compute;
mod gcs;
mod pubsub;

/// Header naming the project billed for the request.
const USER_PROJECT_HEADER: &str = "x-goog-user-project";

/// The Google Cloud API the demo calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    Gcs,
    Compute,
    PubSub,
    Asset,
}

impl Api {
    pub const ALL: [Self; 4] = [Self::Gcs, Self::Compute, Self::PubSub, Self::Asset];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|api| api.name() == name)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Gcs => "gcs",
            Self::Compute => "compute",
            Self::PubSub => "pubsub",
            Self::Asset => "asset",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Gcs => "Read an object from Cloud Storage",
            Self::Compute => "List Compute Engine instances in a zone",
            Self::PubSub => "List Pub/Sub topics, then create one",
            Self::Asset => "Analyze IAM policy with Cloud Asset Inventory",
        }
    }

    pub const fn client_kind(self) -> ClientKind {
        match self {
            Self::Gcs => ClientKind::Storage,
            Self::Compute => ClientKind::Compute,
            Self::PubSub => ClientKind::PubSub,
            Self::Asset => ClientKind::Asset,
        }
    }

    /// GCS and Compute speak plain REST, Pub/Sub and Cloud Asset are RPC
    /// services exposed over HTTP/JSON.
    pub const fn transport(self) -> Transport {
        match self {
            Self::Gcs | Self::Compute => Transport::Rest,
            Self::PubSub | Self::Asset => Transport::Rpc,
        }
    }
}

impl Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run the calls configured in `settings`, printing what succeeds.
///
/// The first failed call is returned as the envelope built from its
/// response.
pub async fn run(client: &Client, settings: &Settings) -> Result<()> {
    info!(api = %settings.api, "calling API");
    match settings.api {
        Api::Gcs => gcs::get_object(client, settings).await,
        Api::Compute => compute::list_instances(client, settings).await,
        Api::PubSub => {
            pubsub::list_topics(client, settings).await?;
            pubsub::create_topic(client, settings).await
        }
        Api::Asset => asset::analyze_iam_policy(client, settings).await,
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BasicRequest<'a> {
    pub(crate) method: Method,
    pub(crate) endpoint: String,
    pub(crate) query: Vec<(&'static str, String)>,
    pub(crate) payload: Option<String>,

    pub(crate) settings: &'a Settings,
}

pub(crate) fn request_builder(basic_request: BasicRequest) -> Result<Request> {
    let settings = basic_request.settings;
    let mut url = Url::parse(&basic_request.endpoint)?;
    if !basic_request.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &basic_request.query {
            pairs.append_pair(key, value);
        }
    }

    let mut request = Request::new(basic_request.method, url);
    let headers = request.headers_mut();
    let mut authorization =
        HeaderValue::from_str(&format!("Bearer {}", settings.token))?;
    authorization.set_sensitive(true);
    headers.insert(AUTHORIZATION, authorization);
    if let Some(project) = &settings.quota_project {
        headers.insert(USER_PROJECT_HEADER, HeaderValue::from_str(project)?);
    }
    if let Some(payload) = basic_request.payload {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(payload.into());
    }
    Ok(request)
}

/// Send `request` and turn an unsuccessful response into the envelope
/// matching the API's transport.
pub(crate) async fn execute(
    client: &Client,
    request: Request,
    api: Api,
) -> Result<Response> {
    debug!(method = %request.method(), url = %request.url(), "sending request");
    let response = client.execute(request).await?;
    check_response(response, api.transport()).await
}
