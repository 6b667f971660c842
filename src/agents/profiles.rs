//! Built-in agent definitions.
//!
//! Each profile owns exactly one [`StateField`] and lists the tools it may
//! call. The order of [`PROFILES`] is the report order.

use crate::workflows::StateField;

/// Static description of a recon agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentProfile {
    /// Unique agent (task) name, also the `[agents.<name>]` config key.
    pub name: &'static str,
    pub field: StateField,
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    /// Task instruction; `{target}` is replaced with the target.
    pub task_description: &'static str,
    pub expected_output: &'static str,
    /// Default tools, in the order they run without an LLM.
    pub tools: &'static [&'static str],
}

impl AgentProfile {
    /// System prompt built from role, goal and backstory.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are a {}.\nGoal: {}\nBackground: {}\n\nUse the available tools to investigate, \
             then answer with a concise plain-text summary of your findings.",
            self.role, self.goal, self.backstory
        )
    }

    /// The user instruction for one target.
    pub fn instruction(&self, target: &str) -> String {
        format!(
            "{}\n\nExpected output: {}",
            self.task_description.replace("{target}", target),
            self.expected_output
        )
    }
}

pub const WEB_RECON: AgentProfile = AgentProfile {
    name: "web_recon",
    field: StateField::WebRecon,
    role: "Web Reconnaissance Specialist",
    goal: "Gather comprehensive technical and architectural data from the target website.",
    backstory: "An expert in web technologies, you excel at identifying tech stacks, finding \
                hidden directories, and parsing web content for sensitive information.",
    task_description: "Perform comprehensive web reconnaissance on {target}. Use your tools to \
                       gather technologies, directories, headers, emails and SSL info.",
    expected_output: "A detailed summary of web-related findings.",
    tools: &[
        "web_scraper",
        "http_header_analyzer",
        "technology_detection",
        "directory_brute_force",
        "email_harvester",
        "ssl_certificate_info",
    ],
};

pub const OSINT: AgentProfile = AgentProfile {
    name: "osint",
    field: StateField::Osint,
    role: "OSINT Analyst",
    goal: "Collect public and infrastructure data about the target domain including domains, \
           DNS, and historical records.",
    backstory: "A seasoned intelligence operative who specializes in connecting the dots using \
                public records, DNS registries, and internet archives.",
    task_description: "Perform OSINT on {target}. Extract WHOIS, DNS records and historical data.",
    expected_output: "A detailed summary of infrastructure and OSINT findings.",
    tools: &["whois_lookup", "dns_lookup", "wayback_machine"],
};

pub const SUBDOMAIN_RECON: AgentProfile = AgentProfile {
    name: "subdomain_recon",
    field: StateField::SubdomainRecon,
    role: "Subdomain Analyst",
    goal: "Identify all active and historical subdomains for the target to expand the attack \
           surface area.",
    backstory: "An expert in attack surface management, relying on certificate transparency \
                and enumeration to find forgotten or hidden subdomains.",
    task_description: "Perform subdomain enumeration on {target} to uncover expanded attack surface.",
    expected_output: "A detailed list of subdomains and related context.",
    tools: &["subdomain_enumeration"],
};

pub const VULN_SCAN: AgentProfile = AgentProfile {
    name: "vuln_scan",
    field: StateField::VulnerabilityScan,
    role: "Vulnerability Analyst",
    goal: "Identify potential open ports, services, and known vulnerabilities associated with \
           the target infrastructure.",
    backstory: "A cybersecurity veteran focused on discovering network exposures, utilizing \
                port scanning and threat intelligence databases to evaluate risk.",
    task_description: "Perform vulnerability scanning on {target}. Check for open ports and \
                       known vulnerabilities via Shodan.",
    expected_output: "A summary of potential vulnerabilities and open ports.",
    tools: &["nmap_port_scanner", "shodan_lookup"],
};

/// Every built-in agent, in report order.
pub const PROFILES: &[AgentProfile] = &[WEB_RECON, OSINT, SUBDOMAIN_RECON, VULN_SCAN];

pub fn profile(name: &str) -> Option<&'static AgentProfile> {
    PROFILES.iter().find(|p| p.name == name)
}
