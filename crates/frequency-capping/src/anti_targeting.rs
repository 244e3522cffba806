//! Anti-targeting: advertisers can ask not to be shown to users who
//! recently visited competitor sites.

use std::collections::{BTreeSet, HashMap};

use ads_core::{AdsError, AdsResult, CreativeAd};
use serde::Deserialize;
use url::Url;

use crate::rule::{ExclusionContext, ExclusionRule};

/// Sites to avoid, keyed by creative set id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AntiTargetingResource {
    #[serde(default)]
    sites: HashMap<String, BTreeSet<String>>,
}

impl AntiTargetingResource {
    pub fn new(sites: HashMap<String, BTreeSet<String>>) -> Self {
        Self { sites }
    }

    pub fn from_json(json: &str) -> AdsResult<Self> {
        serde_json::from_str(json).map_err(AdsError::from)
    }

    pub fn sites_for(&self, creative_set_id: &str) -> Option<&BTreeSet<String>> {
        self.sites.get(creative_set_id)
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Host of a URL, or the input itself when it is already a bare host.
fn host_of(site: &str) -> Option<String> {
    match Url::parse(site) {
        Ok(url) => url.host_str().map(str::to_ascii_lowercase),
        Err(_) if !site.is_empty() && !site.contains('/') => Some(site.to_ascii_lowercase()),
        Err(_) => None,
    }
}

fn same_domain_or_host(lhs: &str, rhs: &str) -> bool {
    lhs == rhs || lhs.ends_with(&format!(".{rhs}")) || rhs.ends_with(&format!(".{lhs}"))
}

pub struct AntiTargetingRule {
    resource: AntiTargetingResource,
}

impl AntiTargetingRule {
    pub fn new(resource: AntiTargetingResource) -> Self {
        Self { resource }
    }
}

impl ExclusionRule for AntiTargetingRule {
    fn name(&self) -> &'static str {
        "anti_targeting"
    }

    fn should_exclude(&self, ad: &CreativeAd, ctx: &ExclusionContext<'_>) -> bool {
        let Some(sites) = self.resource.sites_for(&ad.creative_set_id) else {
            return false;
        };

        let visited: Vec<String> = ctx
            .browsing_history
            .iter()
            .filter_map(|url| host_of(url))
            .collect();

        sites
            .iter()
            .filter_map(|site| host_of(site))
            .any(|site| visited.iter().any(|host| same_domain_or_host(host, &site)))
    }

    fn reason(&self, ad: &CreativeAd) -> String {
        format!(
            "creativeSetId {} excluded due to visiting an anti-targeted site",
            ad.creative_set_id
        )
    }
}
