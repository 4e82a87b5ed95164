//! Best-effort public lookups: postcodes, price trends, retailer logos and
//! budget QR codes.
//!
//! Network lookups return `None` on any failure. Nothing here is
//! authenticated and nothing is retried.

use std::collections::BTreeMap;
use std::time::Duration;

use nexus_core::{ConfigError, LlmError, NexusResult};
use once_cell::sync::Lazy;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

pub const DEFAULT_POSTCODE_BASE: &str = "https://api.zippopotam.us/za";
pub const DEFAULT_TRENDS_URL: &str = "https://api.coingecko.com/api/v3/simple/price?ids=laptop-computer,apple-ipad,samsung-electronics&vs_currencies=zar&include_24hr_change=true";
const LOGO_BASE: &str = "https://logo.clearbit.com";

static QR_ENDPOINT: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://api.qrserver.com/v1/create-qr-code/").expect("valid QR endpoint")
});

/// Retailer keys and domains, matched in this order.
const RETAILER_DOMAINS: &[(&str, &str)] = &[
    ("takealot", "takealot.com"),
    ("makro", "makro.co.za"),
    ("checkers", "checkers.co.za"),
    ("pep", "pepstores.com"),
    ("woolworths", "woolworths.co.za"),
    ("pnp", "pnp.co.za"),
    ("game", "game.co.za"),
    ("incredible", "incredible.co.za"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostcodePlace {
    #[serde(rename = "place name")]
    pub place_name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostcodeInfo {
    #[serde(rename = "post code")]
    pub post_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub places: Vec<PostcodePlace>,
}

/// Price in rand and its 24h change, when the upstream has them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendQuote {
    #[serde(default)]
    pub zar: Option<f64>,
    #[serde(default)]
    pub zar_24h_change: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct LookupEndpoints {
    pub postcode_base: String,
    pub trends_url: String,
}

impl Default for LookupEndpoints {
    fn default() -> Self {
        Self {
            postcode_base: DEFAULT_POSTCODE_BASE.to_string(),
            trends_url: DEFAULT_TRENDS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublicLookups {
    client: Client,
    postcode_base: Url,
    trends_url: Url,
}

fn endpoint(field: &str, raw: &str) -> NexusResult<Url> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".to_string()).into());
    }
    Ok(url)
}

impl PublicLookups {
    pub fn new(timeout: Duration) -> NexusResult<Self> {
        Self::with_endpoints(timeout, LookupEndpoints::default())
    }

    pub fn with_endpoints(timeout: Duration, endpoints: LookupEndpoints) -> NexusResult<Self> {
        let postcode_base = endpoint("lookups.postcode_base", &endpoints.postcode_base)?;
        let trends_url = endpoint("lookups.trends_url", &endpoints.trends_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport {
                provider: "public-lookups".to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            postcode_base,
            trends_url,
        })
    }

    /// The lookup URL for `code`, appended as a single encoded path segment.
    pub fn postcode_url(&self, code: &str) -> Url {
        let mut url = self.postcode_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(code.trim());
        }
        url
    }

    /// Resolve a South African postal code. Unknown codes yield `None`.
    pub async fn lookup_postcode(&self, code: &str) -> Option<PostcodeInfo> {
        if code.trim().is_empty() {
            return None;
        }
        self.get_json(self.postcode_url(code)).await
    }

    /// Current ZAR quotes keyed by upstream id.
    pub async fn tech_trends(&self) -> Option<BTreeMap<String, TrendQuote>> {
        self.get_json(self.trends_url.clone()).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Option<T> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Lookup request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(url = %url, status = response.status().as_u16(), "Lookup returned non-success");
            return None;
        }
        match response.json::<T>().await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Lookup body did not decode");
                None
            }
        }
    }
}

/// Logo URL for the first known retailer whose key appears in `name`.
pub fn retailer_logo(name: &str) -> Option<String> {
    let lowered = name.to_lowercase();
    RETAILER_DOMAINS
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map(|(_, domain)| format!("{}/{}", LOGO_BASE, domain))
}

/// QR code image URL encoding `data`, 200x200 in lime on black.
pub fn budget_qr_url(data: &str) -> String {
    let mut url = QR_ENDPOINT.clone();
    url.query_pairs_mut()
        .append_pair("size", "200x200")
        .append_pair("data", data)
        .append_pair("bgcolor", "000")
        .append_pair("color", "CCFF00");
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retailer_logo_matches_substring() {
        assert_eq!(
            retailer_logo("Takealot.com Online").as_deref(),
            Some("https://logo.clearbit.com/takealot.com")
        );
        assert_eq!(
            retailer_logo("PEP Stores").as_deref(),
            Some("https://logo.clearbit.com/pepstores.com")
        );
        assert_eq!(retailer_logo("Corner Cafe"), None);
    }

    #[test]
    fn test_retailer_logo_first_key_wins() {
        // "makro" precedes "game" in lookup order
        assert_eq!(
            retailer_logo("Makro vs Game").as_deref(),
            Some("https://logo.clearbit.com/makro.co.za")
        );
    }

    #[test]
    fn test_budget_qr_url_encodes_data() {
        let url = budget_qr_url("Total: R1 250 & counting");
        assert!(url.starts_with("https://api.qrserver.com/v1/create-qr-code/?size=200x200&data="));
        assert!(url.contains("data=Total%3A+R1+250+%26+counting"));
        assert!(url.ends_with("&bgcolor=000&color=CCFF00"));
    }

    #[test]
    fn test_postcode_payload_shape() {
        let info: PostcodeInfo = serde_json::from_str(
            r#"{"post code":"0002","country":"South Africa","country abbreviation":"ZA",
                "places":[{"place name":"Pretoria","longitude":"28.2","state":"Gauteng","state abbreviation":"GP","latitude":"-25.7"}]}"#,
        )
        .expect("parse");
        assert_eq!(info.post_code, "0002");
        assert_eq!(info.places[0].place_name, "Pretoria");
        assert_eq!(info.places[0].state, "Gauteng");
    }

    #[test]
    fn test_trend_quotes_tolerate_missing_fields() {
        let quotes: BTreeMap<String, TrendQuote> =
            serde_json::from_str(r#"{"apple-ipad":{"zar":9999.5,"zar_24h_change":-1.25},"laptop-computer":{}}"#)
                .expect("parse");
        assert_eq!(quotes["apple-ipad"].zar, Some(9999.5));
        assert_eq!(quotes["laptop-computer"], TrendQuote::default());
    }

    #[test]
    fn test_postcode_url_trims() {
        let lookups = PublicLookups::with_endpoints(
            Duration::from_secs(1),
            LookupEndpoints {
                postcode_base: "http://localhost:9/za/".to_string(),
                trends_url: "http://localhost:9/trends".to_string(),
            },
        )
        .expect("client");
        assert_eq!(lookups.postcode_url(" 8001 ").as_str(), "http://localhost:9/za/8001");
    }

    #[test]
    fn test_postcode_is_one_encoded_segment() {
        let lookups = PublicLookups::new(Duration::from_secs(1)).expect("client");

        let url = lookups.postcode_url("../x?y=1#frag");
        assert_eq!(url.host_str(), Some("api.zippopotam.us"));
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        let segments: Vec<&str> = url.path_segments().expect("segments").collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], "za");
        assert!(segments[1].contains("%2F"));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let err = PublicLookups::with_endpoints(
            Duration::from_secs(1),
            LookupEndpoints {
                postcode_base: "not a url".to_string(),
                trends_url: DEFAULT_TRENDS_URL.to_string(),
            },
        )
        .expect_err("invalid base");
        assert!(err.to_string().contains("lookups.postcode_base"));
    }

    #[tokio::test]
    async fn test_unreachable_lookup_is_none() {
        let lookups = PublicLookups::with_endpoints(
            Duration::from_millis(200),
            LookupEndpoints {
                postcode_base: "http://127.0.0.1:9/za".to_string(),
                trends_url: "http://127.0.0.1:9/trends".to_string(),
            },
        )
        .expect("client");
        assert_eq!(lookups.lookup_postcode("0002").await, None);
        assert_eq!(lookups.tech_trends().await, None);
        assert_eq!(lookups.lookup_postcode("   ").await, None);
    }
}
