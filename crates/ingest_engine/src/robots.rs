use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use texting_robots::Robot;
use url::Url;

use crate::fetch::DEFAULT_USER_AGENT;

pub const REASON_NO_RESTRICTIONS: &str = "No robots.txt restrictions found";
pub const REASON_ALLOWED: &str = "Allowed by robots.txt";
pub const REASON_DISALLOWED: &str = "Disallowed by robots.txt";
pub const REASON_CHECK_ERROR: &str = "Error checking robots.txt, proceeding with caution";

#[derive(Debug, Clone)]
pub struct RobotsSettings {
    /// Scheme used to reach `{domain}/robots.txt`.
    pub scheme: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for RobotsSettings {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Whether a locator may be fetched, with the reason surfaced in the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsDecision {
    pub allowed: bool,
    pub reason: String,
}

impl RobotsDecision {
    fn new(allowed: bool, reason: &str) -> Self {
        Self {
            allowed,
            reason: reason.to_string(),
        }
    }
}

enum RobotsPolicy {
    AllowAll,
    DisallowAll,
    Rules(Robot),
}

#[derive(Debug, thiserror::Error)]
enum RobotsCheckError {
    #[error("failed to build robots client: {0}")]
    Client(String),
    #[error("robots.txt request failed: {0}")]
    Request(String),
    #[error("unparsable robots.txt: {0}")]
    Parse(String),
}

/// Per-domain robots.txt cache.
///
/// Unreachable or unparsable robots files install an allow-all policy. The
/// cache lock is never held across the network fetch, so two workers racing
/// on a new domain may both fetch; the first insert wins.
pub struct PolitenessGate {
    settings: RobotsSettings,
    cache: Mutex<HashMap<String, Arc<RobotsPolicy>>>,
}

impl PolitenessGate {
    pub fn new(settings: RobotsSettings) -> Self {
        Self {
            settings,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn is_allowed(&self, locator: &str) -> RobotsDecision {
        let Some(domain) = domain_of(locator) else {
            engine_warn!("Error checking robots.txt for {}: no host", locator);
            return RobotsDecision::new(true, REASON_CHECK_ERROR);
        };

        let decision = match self.policy_for(&domain).await.as_ref() {
            RobotsPolicy::AllowAll => RobotsDecision::new(true, REASON_NO_RESTRICTIONS),
            RobotsPolicy::DisallowAll => RobotsDecision::new(false, REASON_DISALLOWED),
            RobotsPolicy::Rules(robot) => {
                if robot.allowed(locator) {
                    RobotsDecision::new(true, REASON_ALLOWED)
                } else {
                    RobotsDecision::new(false, REASON_DISALLOWED)
                }
            }
        };
        engine_info!("robots.txt decision for {}: {}", locator, decision.reason);
        decision
    }

    /// Number of domains with a cached policy.
    pub fn cached_domains(&self) -> usize {
        self.lock_cache().len()
    }

    async fn policy_for(&self, domain: &str) -> Arc<RobotsPolicy> {
        let cached = self.lock_cache().get(domain).cloned();
        if let Some(policy) = cached {
            return policy;
        }

        let policy = match self.fetch_policy(domain).await {
            Ok(policy) => {
                engine_info!("Successfully loaded robots.txt for {}", domain);
                policy
            }
            Err(err) => {
                engine_warn!("Could not load robots.txt for {}: {}", domain, err);
                RobotsPolicy::AllowAll
            }
        };

        self.lock_cache()
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(policy))
            .clone()
    }

    async fn fetch_policy(&self, domain: &str) -> Result<RobotsPolicy, RobotsCheckError> {
        let robots_url = format!("{}://{}/robots.txt", self.settings.scheme, domain);
        let client = reqwest::Client::builder()
            .user_agent(self.settings.user_agent.as_str())
            .timeout(self.settings.timeout)
            .build()
            .map_err(|err| RobotsCheckError::Client(err.to_string()))?;

        let response = client
            .get(&robots_url)
            .send()
            .await
            .map_err(|err| RobotsCheckError::Request(err.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Ok(RobotsPolicy::DisallowAll);
        }
        if !response.status().is_success() {
            return Ok(RobotsPolicy::AllowAll);
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| RobotsCheckError::Request(err.to_string()))?;
        let robot = Robot::new(agent_token(&self.settings.user_agent), &body)
            .map_err(|err| RobotsCheckError::Parse(err.to_string()))?;
        Ok(RobotsPolicy::Rules(robot))
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<String, Arc<RobotsPolicy>>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Host plus explicit port, matching how the locator names its authority.
fn domain_of(locator: &str) -> Option<String> {
    let url = Url::parse(locator).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// robots.txt groups match on the product token (`Mozilla` in `Mozilla/5.0 (...)`).
fn agent_token(user_agent: &str) -> &str {
    user_agent.split('/').next().unwrap_or(user_agent).trim()
}
