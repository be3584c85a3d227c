//! Minimal robots.txt parsing for the pre-navigation policy gate.
//!
//! Only `User-agent` and `Disallow` directives matter here. A rule blocks a
//! path on EXACT match only; prefix semantics are deliberately not applied,
//! so `Disallow: /maps/contrib` does not block `/maps`.

/// Parsed `User-agent` / `Disallow` groups from a robots.txt body.
#[derive(Debug, Default)]
pub(crate) struct RobotsPolicy {
    groups: Vec<RobotsGroup>,
}

#[derive(Debug)]
struct RobotsGroup {
    agents: Vec<String>,
    disallows: Vec<String>,
}

impl RobotsPolicy {
    /// Returns the disallowed path that blocks us, if any group applying to
    /// `user_agent` lists one of `paths` verbatim.
    pub(crate) fn blocks(&self, user_agent: &str, paths: &[&str]) -> Option<String> {
        let ua_lower = user_agent.to_lowercase();
        for group in &self.groups {
            let applies = group
                .agents
                .iter()
                .any(|agent| agent == "*" || ua_lower.contains(&agent.to_lowercase()));
            if !applies {
                continue;
            }
            for disallow in &group.disallows {
                if paths.contains(&disallow.as_str()) {
                    return Some(disallow.clone());
                }
            }
        }
        None
    }
}

/// Parses a robots.txt body into agent groups. Consecutive `User-agent`
/// lines share one group; any other directive line closes the agent run.
pub(crate) fn parse_robots(body: &str) -> RobotsPolicy {
    let mut groups: Vec<RobotsGroup> = Vec::new();
    let mut current: Option<RobotsGroup> = None;
    let mut in_agent_run = false;

    for raw_line in body.lines() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if in_agent_run {
                    if let Some(group) = current.as_mut() {
                        group.agents.push(value.to_string());
                    }
                } else {
                    if let Some(group) = current.take() {
                        groups.push(group);
                    }
                    current = Some(RobotsGroup {
                        agents: vec![value.to_string()],
                        disallows: Vec::new(),
                    });
                }
                in_agent_run = true;
            }
            "disallow" => {
                // An empty Disallow value allows everything.
                if !value.is_empty() {
                    if let Some(group) = current.as_mut() {
                        group.disallows.push(value.to_string());
                    }
                }
                in_agent_run = false;
            }
            _ => {
                in_agent_run = false;
            }
        }
    }
    if let Some(group) = current.take() {
        groups.push(group);
    }

    RobotsPolicy { groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UA: &str = "leadscout/0.1 (prospect-discovery)";

    #[test]
    fn wildcard_group_blocks_exact_path() {
        let policy = parse_robots("User-agent: *\nDisallow: /maps\n");
        assert_eq!(policy.blocks(UA, &["/maps", "/"]), Some("/maps".to_string()));
    }

    #[test]
    fn root_disallow_blocks() {
        let policy = parse_robots("User-agent: *\nDisallow: /\n");
        assert_eq!(policy.blocks(UA, &["/maps", "/"]), Some("/".to_string()));
    }

    #[test]
    fn prefix_rules_do_not_block() {
        let policy = parse_robots("User-agent: *\nDisallow: /maps/contrib\nDisallow: /m\n");
        assert_eq!(policy.blocks(UA, &["/maps", "/"]), None);
    }

    #[test]
    fn non_matching_agent_group_is_ignored() {
        let policy = parse_robots("User-agent: Googlebot\nDisallow: /maps\n");
        assert_eq!(policy.blocks(UA, &["/maps", "/"]), None);
    }

    #[test]
    fn agent_token_matches_case_insensitively() {
        let policy = parse_robots("User-agent: LeadScout\nDisallow: /maps\n");
        assert_eq!(policy.blocks(UA, &["/maps", "/"]), Some("/maps".to_string()));
    }

    #[test]
    fn consecutive_agent_lines_share_a_group() {
        let body = "User-agent: Googlebot\nUser-agent: *\nDisallow: /maps\n";
        let policy = parse_robots(body);
        assert_eq!(policy.blocks(UA, &["/maps", "/"]), Some("/maps".to_string()));
    }

    #[test]
    fn later_group_starts_fresh() {
        let body = concat!(
            "User-agent: *\n",
            "Disallow: /search\n",
            "\n",
            "User-agent: Googlebot\n",
            "Disallow: /maps\n",
        );
        let policy = parse_robots(body);
        assert_eq!(policy.blocks(UA, &["/maps", "/"]), None);
    }

    #[test]
    fn comments_and_empty_disallow_are_ignored() {
        let body = "# full access\nUser-agent: *\nDisallow:\nDisallow: /maps # but not this\n";
        let policy = parse_robots(body);
        assert_eq!(policy.blocks(UA, &["/maps", "/"]), Some("/maps".to_string()));
    }
}
