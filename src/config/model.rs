//! Configuration data model.
//!
//! Every field has a default so the client starts without a config file.

use serde::{Deserialize, Serialize};

use super::nickname::generate_nickname;

const DEFAULT_COLUMN_WIDTH: usize = 16;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server address as `host:port`.
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_true")]
    pub tls: bool,
    #[serde(default = "default_nickname")]
    pub nick: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub real: Option<String>,
    /// Server password, sent before registration.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    /// Shell command run on highlights. See `app::notify` for placeholders.
    #[serde(default)]
    pub on_highlight: Option<String>,
    #[serde(default)]
    pub nick_column_width: i64,
    #[serde(default)]
    pub chan_column_width: i64,
    #[serde(default)]
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            tls: true,
            nick: default_nickname(),
            user: None,
            real: None,
            password: None,
            highlights: Vec::new(),
            on_highlight: None,
            nick_column_width: 0,
            chan_column_width: 0,
            debug: false,
        }
    }
}

impl AppConfig {
    pub fn username(&self) -> &str {
        self.user.as_deref().unwrap_or(&self.nick)
    }

    pub fn realname(&self) -> &str {
        self.real.as_deref().unwrap_or(&self.nick)
    }

    pub fn nick_column_width(&self) -> usize {
        column_width(self.nick_column_width)
    }

    pub fn chan_column_width(&self) -> usize {
        column_width(self.chan_column_width)
    }

    /// Split `addr` into host and port. A missing port means 6697 with TLS
    /// and 6667 without.
    pub fn host_port(&self) -> Result<(String, u16), String> {
        let default_port = if self.tls { 6697 } else { 6667 };
        parse_host_port(&self.addr, default_port)
    }
}

fn column_width(configured: i64) -> usize {
    if configured <= 0 {
        DEFAULT_COLUMN_WIDTH
    } else {
        configured as usize
    }
}

/// Parse `host`, `host:port`, `[v6]` or `[v6]:port`.
pub fn parse_host_port(addr: &str, default_port: u16) -> Result<(String, u16), String> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Err("empty server address".to_string());
    }

    let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| format!("unterminated IPv6 address: {}", addr))?;
        let port = rest[end + 1..].strip_prefix(':');
        (&rest[..end], port)
    } else {
        match addr.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => (host, Some(port)),
            Some(_) => (addr, None),
            None => (addr, None),
        }
    };

    let port = match port {
        Some(p) => p
            .parse::<u16>()
            .map_err(|_| format!("invalid port in {}", addr))?,
        None => default_port,
    };
    Ok((host.to_string(), port))
}

fn default_addr() -> String {
    "irc.libera.chat:6697".to_string()
}
fn default_true() -> bool {
    true
}
fn default_nickname() -> String {
    generate_nickname()
}
