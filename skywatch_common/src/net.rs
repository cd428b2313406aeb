/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

#![allow(unused)]

//! common utility functions for network operations

use std::time::Duration;
use reqwest::{header::{HeaderValue,ACCEPT}, Client, StatusCode, Response};
use url::Url;

use crate::define_error;

define_error!{ pub NetError =
    NotFoundError(String) : "not found {0}",
    RateLimited(String) : "rate limited: {0}",
    StatusError(u16,String) : "response status {0} for {1}",
    HttpError(#[from] reqwest::Error) : "http error: {0}",
    ParseError(String) : "parse error: {0}"
}

pub type Result<T> = std::result::Result<T, NetError>;

/// create the shared http client. Without `timeout` we rely on the transport default
pub fn build_client (timeout: Option<Duration>, user_agent: Option<&str>)->Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout { builder = builder.timeout(timeout); }
    if let Some(user_agent) = user_agent { builder = builder.user_agent(user_agent); }
    Ok( builder.build()? )
}

/// GET `url` and map the response status into a `NetError` unless it is a success
pub async fn get_checked (client: &Client, url: &str)->Result<Response> {
    let response = client.get(url)
        .header( ACCEPT, HeaderValue::from_static("application/json"))
        .send()
        .await?;

    check_status( response.status(), url)?;
    Ok(response)
}

pub fn check_status (status: StatusCode, url: &str)->Result<()> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::NOT_FOUND {
        Err( NetError::NotFoundError( url.to_string()))
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Err( NetError::RateLimited( url.to_string()))
    } else {
        Err( NetError::StatusError( status.as_u16(), url.to_string()))
    }
}

/// append (url encoded) query parameters to `base`
pub fn url_with_query (base: &str, params: &[(&str,&str)])->Result<String> {
    let url = Url::parse_with_params( base, params).map_err(|e| NetError::ParseError(format!("invalid url {base}: {e}")))?;
    Ok( url.to_string() )
}
