pub mod upstream {
    pub const DEFAULT_SITES_BASE_URL: &str = "https://api.example.com/sites-mgmt";
    pub const DEFAULT_DOMAINS_BASE_URL: &str = "https://api.example.com/site-domain-manager";
    pub const DEFAULT_POLICIES_BASE_URL: &str = "https://api.example.com/policies";
    pub const DEFAULT_RULES_BASE_URL: &str = "https://api.example.com/api/prov";

    pub const SITES_PATH: &str = "/v3/sites/extended";
    pub const DOMAINS_PATH: &str = "/v3/domains";
    pub const POLICIES_PATH: &str = "/v3/policies";
    pub const RULES_PATH: &str = "/v3/rules";
}

pub mod headers {
    pub const DEFAULT_MCP_HEADER_NAME: &str = "x-mcp-cwaf";
    pub const DEFAULT_MCP_HEADER_VALUE: &str = "cwaf-mcp";
    pub const API_ID_HEADER: &str = "x-api-id";
    pub const API_KEY_HEADER: &str = "x-api-key";
}

pub mod network {
    pub const READ_TIMEOUT_MS: u64 = 30_000;
    pub const CONNECT_TIMEOUT_MS: u64 = 15_000;
    pub const POOL_MAX_IDLE_PER_HOST: u64 = 20;
    pub const POOL_IDLE_TIMEOUT_MS: u64 = 30_000;
}
