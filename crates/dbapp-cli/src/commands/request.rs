use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use dbapp_core::api::ResponseBody;
use dbapp_core::AppContext;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl FromStr for HttpMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(anyhow!("Unsupported method: {}", other)),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Body for POST and PUT. Ignored for the other methods.
fn parse_body(method: HttpMethod, data: Option<&str>) -> Result<Option<Value>> {
    match (method, data) {
        (HttpMethod::Post | HttpMethod::Put, Some(raw)) => {
            let value = serde_json::from_str(raw).context("DATA is not valid JSON")?;
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}

pub async fn run(
    ctx: &AppContext,
    app_url: Option<&str>,
    endpoint: &str,
    method: &str,
    data: Option<&str>,
) -> Result<()> {
    let method: HttpMethod = method.parse()?;
    let body = parse_body(method, data)?;
    let client = ctx.app_client(app_url).await?;

    let response: ResponseBody = match method {
        HttpMethod::Get => client.get(endpoint).await?,
        HttpMethod::Post => client.post(endpoint, body.as_ref()).await?,
        HttpMethod::Put => client.put(endpoint, body.as_ref()).await?,
        HttpMethod::Delete => client.delete(endpoint).await?,
    };

    println!("{}", response.render());
    Ok(())
}
