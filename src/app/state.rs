use crate::config::AppConfig;

/// Mutable client state owned by the control loop.
#[derive(Debug, Default)]
pub struct AppState {
    /// Nickname asked for at registration.
    pub requested_nick: String,
    /// Lowercased highlight keywords.
    pub highlights: Vec<String>,
    /// Last user who sent us a private message.
    pub last_query: Option<String>,
    /// Set between the two halves of a bracketed paste.
    pub pasting: bool,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            requested_nick: config.nick.clone(),
            highlights: config
                .highlights
                .iter()
                .map(|h| h.to_lowercase())
                .collect(),
            last_query: None,
            pasting: false,
        }
    }
}
