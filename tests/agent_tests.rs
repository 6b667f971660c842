//! Built-in recon agents wired to real tools and mock models.

mod common;

use argus::agents::{AgentRegistry, ReconAgent, PROFILES};
use argus::llm::{LLMClient, LLMResponse, MessageRole};
use argus::tools::osint::DnsLookup;
use argus::tools::registry::ToolRegistry;
use argus::utils::toml_config::{AgentConfig, ArgusConfig, ToolConfig};
use argus::workflows::{build_recon_workflow, Target, Task, PLACEHOLDER};
use common::mocks::{tool_call, MockLLMClient};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn dns_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resolve"))
        .and(query_param("name", "example.com"))
        .and(query_param("type", "A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Status": 0,
            "Answer": [{"name": "example.com.", "type": 1, "TTL": 60, "data": "203.0.113.7"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/resolve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Status": 0})))
        .mount(&server)
        .await;
    server
}

fn dns_registry(server: &MockServer) -> Arc<ToolRegistry> {
    let mut config = ToolConfig::default();
    config.extra.insert(
        "base_url".to_string(),
        toml::Value::String(format!("{}/resolve", server.uri())),
    );
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(DnsLookup::new(&config).unwrap()));
    Arc::new(registry)
}

fn osint_agent(
    registry: Arc<ToolRegistry>,
    llm: Option<Arc<MockLLMClient>>,
    config: AgentConfig,
) -> ReconAgent {
    let osint = PROFILES.iter().find(|p| p.name == "osint").unwrap();
    ReconAgent::new(
        osint,
        &config,
        vec!["dns_lookup".to_string()],
        registry,
        llm.map(|l| l as Arc<dyn LLMClient>),
    )
}

#[tokio::test]
async fn test_llm_agent_calls_tool_and_answers() {
    let server = dns_server().await;
    let llm = Arc::new(MockLLMClient::new(vec![
        LLMResponse::tools(vec![tool_call(
            "call_1",
            "dns_lookup",
            json!({"domain": "example.com"}),
        )]),
        LLMResponse::text("example.com resolves to 203.0.113.7"),
    ]));
    let agent = osint_agent(
        dns_registry(&server),
        Some(Arc::clone(&llm)),
        AgentConfig::default(),
    );

    let target = Target::parse("example.com").unwrap();
    let answer = agent.run(&target).await.unwrap();
    assert_eq!(answer, "example.com resolves to 203.0.113.7");

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);

    let first = &requests[0];
    assert_eq!(first[0].role, MessageRole::System);
    assert!(first[0].content.contains("OSINT Analyst"));
    assert!(first[1]
        .content
        .starts_with("Perform OSINT on example.com."));

    let tool_message = requests[1].last().unwrap();
    assert_eq!(tool_message.role, MessageRole::Tool);
    assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
    assert!(tool_message
        .content
        .contains("DNS Records for example.com:\n- A: 203.0.113.7"));
}

#[tokio::test]
async fn test_llm_agent_cannot_call_foreign_tool() {
    let server = dns_server().await;
    let llm = Arc::new(MockLLMClient::new(vec![
        LLMResponse::tools(vec![tool_call(
            "call_1",
            "nmap_port_scanner",
            json!({"target": "example.com"}),
        )]),
        LLMResponse::text("nothing to report"),
    ]));
    let agent = osint_agent(
        dns_registry(&server),
        Some(Arc::clone(&llm)),
        AgentConfig::default(),
    );

    assert!(!agent.can_use_tool("nmap_port_scanner"));
    let target = Target::parse("example.com").unwrap();
    agent.run(&target).await.unwrap();

    let tool_message = llm.requests()[1].last().unwrap().clone();
    assert_eq!(
        tool_message.content,
        json!({"error": "Tool 'nmap_port_scanner' is not available to this agent"}).to_string()
    );
}

#[tokio::test]
async fn test_llm_agent_stops_after_max_iterations() {
    let server = dns_server().await;
    let call = || {
        LLMResponse::tools(vec![tool_call(
            "call",
            "dns_lookup",
            json!({"domain": "example.com"}),
        )])
    };
    let llm = Arc::new(MockLLMClient::new(vec![call(), call(), call()]));
    let config = AgentConfig {
        max_tool_iterations: 2,
        ..AgentConfig::default()
    };
    let agent = osint_agent(dns_registry(&server), Some(Arc::clone(&llm)), config);

    let target = Target::parse("example.com").unwrap();
    let err = agent.run(&target).await.unwrap_err();
    assert_eq!(err.to_string(), "no final answer after 2 tool iterations");
    assert_eq!(llm.requests().len(), 2);
}

#[tokio::test]
async fn test_direct_agent_runs_tools_without_llm() {
    let server = dns_server().await;
    let agent = osint_agent(dns_registry(&server), None, AgentConfig::default());
    assert!(!agent.uses_llm());

    let target = Target::parse("https://www.example.com/login").unwrap();
    // Direct DNS queries use the full host, which the mock knows no records for
    assert_eq!(
        agent.run(&target).await.unwrap(),
        "### dns_lookup\nNo common DNS records found for www.example.com."
    );
}

#[tokio::test]
async fn test_registry_builds_enabled_agents_in_report_order() {
    let config = ArgusConfig::from_toml_str(
        r#"
[agents.web_recon]
enabled = false

[agents.vuln_scan]
tools = ["shodan_lookup"]
"#,
    )
    .unwrap();
    let tools = Arc::new(ToolRegistry::with_config(&config).unwrap());
    let registry = AgentRegistry::from_config(&config, tools, None).unwrap();

    assert_eq!(
        registry.agent_names(),
        vec!["osint", "subdomain_recon", "vuln_scan"]
    );
    let vuln = registry.get("vuln_scan").unwrap();
    assert_eq!(vuln.allowed_tools(), &["shodan_lookup".to_string()]);
    assert!(registry.get("web_recon").is_none());
    assert_eq!(registry.tasks().len(), 3);
}

#[tokio::test]
async fn test_full_workflow_with_shared_mock_llm() {
    let config = ArgusConfig::default();
    let llm: Arc<dyn LLMClient> = Arc::new(MockLLMClient::new(vec![
        LLMResponse::text("summary"),
        LLMResponse::text("summary"),
        LLMResponse::text("summary"),
        LLMResponse::text("summary"),
    ]));

    let workflow = build_recon_workflow(&config, Some(llm), None).unwrap();
    let output = workflow.run("example.com").await.unwrap();

    assert!(output.errors.is_empty());
    assert_eq!(output.report.target, "example.com");
    let titles: Vec<&str> = output
        .report
        .sections
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Web_Reconnaissance",
            "OSINT_Intelligence",
            "Subdomain_Reconnaissance",
            "Vulnerability_Assessment"
        ]
    );
    assert!(output.report.sections.iter().all(|s| s.content == "summary"));
}

#[tokio::test]
async fn test_model_failure_isolated_to_one_section() {
    let config = ArgusConfig::from_toml_str(
        r#"
[agents.web_recon]
enabled = false

[agents.subdomain_recon]
enabled = false

[agents.vuln_scan]
enabled = false
"#,
    )
    .unwrap();
    let llm: Arc<dyn LLMClient> = Arc::new(MockLLMClient::failing());

    let workflow = build_recon_workflow(&config, Some(llm), None).unwrap();
    let output = workflow.run("example.com").await.unwrap();

    assert_eq!(output.report.section("OSINT_Intelligence"), Some(PLACEHOLDER));
    assert_eq!(
        output.errors,
        vec!["OSINT Error: mock-model request failed: LLM error: Mock LLM failure".to_string()]
    );
}

#[tokio::test]
async fn test_direct_workflow_against_mock_services() {
    let dns = dns_server().await;
    let wayback = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wayback/available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"archived_snapshots": {}})))
        .mount(&wayback)
        .await;

    let config = ArgusConfig::from_toml_str(&format!(
        r#"
[llm]
enabled = false

[agents.web_recon]
enabled = false

[agents.subdomain_recon]
enabled = false

[agents.vuln_scan]
enabled = false

[agents.osint]
tools = ["dns_lookup", "wayback_machine"]

[tools.dns_lookup]
base_url = "{}/resolve"

[tools.wayback_machine]
base_url = "{}/wayback/available"
"#,
        dns.uri(),
        wayback.uri()
    ))
    .unwrap();

    let workflow = build_recon_workflow(&config, None, None).unwrap();
    let output = workflow.run("example.com").await.unwrap();

    assert!(output.errors.is_empty());
    assert_eq!(
        output.report.section("OSINT_Intelligence"),
        Some(
            "### dns_lookup\nDNS Records for example.com:\n- A: 203.0.113.7\n\n\
             ### wayback_machine\nNo archived snapshots found for https://example.com/ in the Wayback Machine."
        )
    );
}
