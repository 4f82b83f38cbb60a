use std::time::Duration;

use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue},
};

use crate::prelude::*;

/// Build a default client.
pub fn try_new() -> Result<Client> {
    let headers = HeaderMap::from_iter([(ACCEPT, HeaderValue::from_static("application/json"))]);
    Ok(Client::builder().timeout(Duration::from_secs(10)).default_headers(headers).build()?)
}
