//! postcodes.io HTTP adapter for reverse geocoding.

use rand::Rng;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::PlannerError;
use crate::generator::BoundingBox;
use crate::model::{ChargingPost, Geolocation};
use crate::traits::PostcodeLookup;

#[derive(Debug, Clone)]
pub struct PostcodesConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for PostcodesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.postcodes.io".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostcodesClient {
    config: PostcodesConfig,
    client: reqwest::blocking::Client,
}

impl PostcodesClient {
    pub fn new(config: PostcodesConfig) -> Result<Self, PlannerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn nearest<T>(&self, endpoint: &str, location: Geolocation) -> Result<Option<T>, PlannerError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let body = self
            .client
            .get(url)
            .query(&[
                ("lon", location.longitude.to_string()),
                ("lat", location.latitude.to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<LookupResponse<T>>())?;

        Ok(body.result.and_then(|results| results.into_iter().next()))
    }
}

impl PostcodeLookup for PostcodesClient {
    fn postcode_for(&self, location: Geolocation) -> Result<Option<String>, PlannerError> {
        let hit = self.nearest::<PostcodeResult>("postcodes", location)?;
        Ok(hit.map(|result| result.postcode))
    }

    fn outward_area_for(&self, location: Geolocation) -> Result<Option<String>, PlannerError> {
        let hit = self.nearest::<OutcodeResult>("outcodes", location)?;
        Ok(hit.and_then(|result| outward_area(&result.outcode)))
    }
}

/// Leading area letters of an outward code: "SW1A" → "SW", "E14" → "E".
pub fn outward_area(outcode: &str) -> Option<String> {
    let mut chars = outcode.chars();
    let first = chars.next()?;
    match chars.next() {
        Some(second) if second.is_ascii_alphabetic() => Some([first, second].iter().collect()),
        _ => Some(first.to_string()),
    }
}

/// Fill in `postcode` for every post that lacks one. Lookup failures are
/// logged and leave the post untouched. Returns how many posts were annotated.
pub fn annotate_posts<L>(lookup: &L, posts: &mut [ChargingPost]) -> usize
where
    L: PostcodeLookup + ?Sized,
{
    let mut annotated = 0;
    for post in posts.iter_mut().filter(|post| post.postcode.is_none()) {
        match lookup.postcode_for(post.location) {
            Ok(Some(postcode)) => {
                post.postcode = Some(postcode);
                annotated += 1;
            }
            Ok(None) => debug!(post = %post.id, "no postcode near post"),
            Err(err) => warn!(post = %post.id, error = %err, "postcode lookup failed"),
        }
    }
    annotated
}

/// Sample locations in `bounds` until one falls in outward `area`.
///
/// Gives up after `max_attempts` samples; lookup errors abort immediately.
pub fn sample_in_area<L, R>(
    lookup: &L,
    rng: &mut R,
    bounds: &BoundingBox,
    area: &str,
    max_attempts: usize,
) -> Result<Option<Geolocation>, PlannerError>
where
    L: PostcodeLookup + ?Sized,
    R: Rng + ?Sized,
{
    for _ in 0..max_attempts {
        let candidate = bounds.sample(rng);
        if lookup.outward_area_for(candidate)?.as_deref() == Some(area) {
            return Ok(Some(candidate));
        }
    }
    debug!(area, max_attempts, "no location found in area");
    Ok(None)
}

#[derive(Debug, Deserialize)]
struct LookupResponse<T> {
    result: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct PostcodeResult {
    postcode: String,
}

#[derive(Debug, Deserialize)]
struct OutcodeResult {
    outcode: String,
}
