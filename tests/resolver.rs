use client_ip_resolver::{Config, HttpSource, Resolver, TrustedProxies};
use http::{HeaderName, HeaderValue};
use rstest::*;
use serde::Deserialize;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct ConfigJson {
    trusted_proxies: Option<Vec<String>>,
    #[serde(default)]
    blanket: bool,
    header_precedence: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Expected {
    resolved: String,
}

#[rstest]
fn fixture(
    #[files("**/*.test")]
    #[base_dir = "tests/fixtures"]
    path: PathBuf,
) {
    let content = std::fs::read_to_string(&path).unwrap();
    let split = content
        .split("-----------------------\n")
        .collect::<Vec<&str>>();

    let peer_addr_str = split.get(0).expect("no peer address");
    let plain_http_request = split.get(1).expect("no plain http request");
    let config_str = split.get(2).expect("no config");
    let expected_str = split.get(3).expect("no expected");

    let mut headers = [httparse::EMPTY_HEADER; 64];
    let mut parsed_request = httparse::Request::new(&mut headers);

    parsed_request.parse(plain_http_request.as_bytes()).unwrap();

    let mut request = http::Request::new(());

    for header in parsed_request.headers.iter() {
        let header_name = HeaderName::from_bytes(header.name.as_bytes()).unwrap();
        let header_value = HeaderValue::from_bytes(header.value).unwrap();

        request.headers_mut().append(header_name, header_value);
    }

    let peer_addr = peer_addr_str.trim().parse::<IpAddr>().unwrap();
    let config_json = serde_json::from_str::<ConfigJson>(config_str).unwrap();
    let expected =
        serde_json::from_str::<Expected>(expected_str).expect("failed to parse expected");

    let mut config = Config::new();

    if config_json.blanket {
        config.set_trusted_proxies(TrustedProxies::Blanket);
    }

    if let Some(trusted_proxies) = config_json.trusted_proxies {
        for entry in trusted_proxies {
            config.add_trusted_proxy(&entry).unwrap();
        }
    }

    if let Some(header_precedence) = config_json.header_precedence {
        config.set_header_precedence(header_precedence);
    }

    let source = HttpSource::new(Some(peer_addr), &request);
    let mut resolver = Resolver::new(config);

    let resolved = resolver.resolve(&source).unwrap();

    assert_eq!(resolved, expected.resolved);
}
