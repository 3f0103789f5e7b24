//! The service's route table and its API handlers.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/health` | [`health`](crate::health::health) |
//! | GET | `{API_PREFIX}/info` | [`info`] |
//! | GET | `{API_PREFIX}/quote` | [`quote`] |

use serde::Serialize;

use crate::config::Config;
use crate::error::Error;
use crate::health::health;
use crate::quote::{self, Quote};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Name reported by `/info`.
pub const SERVICE_NAME: &str = "cicd-training-backend";

/// Builds the route table for `config`.
pub fn router(config: &Config) -> Result<Router, Error> {
    let prefix = &config.api_prefix;
    Router::new()
        .get("/health", health)?
        .get(&format!("{prefix}/info"), info)?
        .get(&format!("{prefix}/quote"), quote)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Info<'a> {
    name: &'static str,
    env: &'a str,
    version: &'a str,
    git_sha: &'a str,
    build_date: &'a str,
}

/// `GET {prefix}/info`: build metadata, straight from configuration.
pub async fn info(req: Request) -> Result<Response, Error> {
    let config = req.config();
    Response::json(&Info {
        name: SERVICE_NAME,
        env: &config.env,
        version: &config.version,
        git_sha: &config.git_sha,
        build_date: &config.build_date,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Meta<'a> {
    env: &'a str,
    version: &'a str,
    git_sha: &'a str,
}

#[derive(Serialize)]
struct QuoteBody<'a> {
    #[serde(flatten)]
    quote: &'static Quote,
    meta: Meta<'a>,
}

/// `GET {prefix}/quote`: one quote, picked uniformly at random.
pub async fn quote(req: Request) -> Result<Response, Error> {
    let config = req.config();
    let picked = quote::pick(&mut rand::thread_rng());
    Response::json(&QuoteBody {
        quote: picked,
        meta: Meta { env: &config.env, version: &config.version, git_sha: &config.git_sha },
    })
}
