//! Recon Agents
//!
//! Each agent is a [`Task`](crate::workflows::Task) that owns one report
//! section. Agents are described by static [`AgentProfile`]s, tuned through
//! `[agents.<name>]` in `argus.toml`, and built by the [`AgentRegistry`].
//!
//! | Agent | Section | Tools |
//! |-------|---------|-------|
//! | `web_recon` | Web_Reconnaissance | scraper, headers, tech detection, paths, e-mails, TLS |
//! | `osint` | OSINT_Intelligence | WHOIS, DNS, Wayback Machine |
//! | `subdomain_recon` | Subdomain_Reconnaissance | crt.sh |
//! | `vuln_scan` | Vulnerability_Assessment | nmap, Shodan |

pub mod profiles;
pub mod recon;
pub mod registry;

pub use profiles::{AgentProfile, PROFILES};
pub use recon::ReconAgent;
pub use registry::AgentRegistry;
