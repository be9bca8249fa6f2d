//! robots.txt rules
//!
//! Allow/Disallow matching is delegated to the robotstxt crate. Crawl-delay
//! is not part of that crate's API, so groups are read here once at parse
//! time and only their delays are kept.

use robotstxt::DefaultMatcher;

/// One `User-agent` group that declared a Crawl-delay
#[derive(Debug, Clone, PartialEq)]
struct DelayGroup {
    /// Lowercased agent names of the group (`*` included as-is)
    agents: Vec<String>,
    seconds: f64,
}

/// The rules of one site's robots.txt
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    /// Raw file body; empty means no restrictions
    body: String,
    delays: Vec<DelayGroup>,
}

impl RobotsRules {
    /// Parses a robots.txt body
    pub fn parse(body: &str) -> Self {
        Self {
            body: body.to_string(),
            delays: delay_groups(body),
        }
    }

    /// Rules that allow every URL and request no delay
    ///
    /// Used when the site has no robots.txt.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Returns true if the file places no restrictions at all
    pub fn is_unrestricted(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Checks whether `agent` may fetch `url`
    pub fn allows(&self, url: &str, agent: &str) -> bool {
        if self.is_unrestricted() {
            return true;
        }

        DefaultMatcher::default().one_agent_allowed_by_robots(&self.body, agent, url)
    }

    /// Crawl-delay in seconds that applies to `agent`
    ///
    /// A group naming the agent wins over the `*` group.
    pub fn crawl_delay(&self, agent: &str) -> Option<f64> {
        let agent = agent.to_lowercase();

        let named = self.delays.iter().find(|group| {
            group
                .agents
                .iter()
                .any(|name| name != "*" && agent.contains(name.as_str()))
        });

        named
            .or_else(|| self.delays.iter().find(|g| g.agents.iter().any(|name| name == "*")))
            .map(|group| group.seconds)
    }
}

/// Collects the groups that carry a Crawl-delay
///
/// Consecutive `User-agent` lines share a group; the first rule line closes
/// the agent list, so the next `User-agent` starts a new group.
fn delay_groups(body: &str) -> Vec<DelayGroup> {
    let mut groups = Vec::new();
    let mut agents: Vec<String> = Vec::new();
    let mut agents_closed = false;

    for line in body.lines() {
        // Comments may trail a directive
        let line = line.split('#').next().unwrap_or("").trim();
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match field.trim().to_ascii_lowercase().as_str() {
            "user-agent" => {
                if agents_closed {
                    agents.clear();
                    agents_closed = false;
                }
                agents.push(value.to_lowercase());
            }
            "crawl-delay" => {
                agents_closed = true;
                if let Ok(seconds) = value.parse::<f64>() {
                    if !agents.is_empty() {
                        groups.push(DelayGroup {
                            agents: agents.clone(),
                            seconds,
                        });
                    }
                }
            }
            _ => agents_closed = true,
        }
    }

    groups
}
