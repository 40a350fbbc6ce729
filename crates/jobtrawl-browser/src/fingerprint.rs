use jobtrawl_core::BrowserConfig;
use rand::Rng;

/// Launch fingerprint: user agent and window size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    pub user_agent: Option<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

// Common desktop user agents
const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

// Common viewport sizes
const VIEWPORTS: [(u32, u32); 4] = [(1920, 1080), (1366, 768), (1536, 864), (1440, 900)];

impl FingerprintConfig {
    /// Generate a randomized fingerprint configuration
    pub fn randomized() -> Self {
        let mut rng = rand::thread_rng();

        let ua_idx = rng.gen_range(0..USER_AGENTS.len());
        let vp_idx = rng.gen_range(0..VIEWPORTS.len());
        let (width, height) = VIEWPORTS[vp_idx];

        Self {
            user_agent: Some(USER_AGENTS[ua_idx].to_string()),
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Fingerprint for the given launch settings: randomized, or the
    /// configured window with the browser's own user agent.
    pub fn from_config(config: &BrowserConfig) -> Self {
        if config.randomize_fingerprint {
            Self::randomized()
        } else {
            Self {
                user_agent: None,
                viewport_width: config.window_width,
                viewport_height: config.window_height,
            }
        }
    }
}
