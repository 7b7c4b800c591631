//! Channel identities.

use std::fmt;

/// The four always-open controller channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Config,
    Status,
    Control,
    Storage,
}

impl ChannelKind {
    /// Path segment of the channel endpoint.
    pub fn name(self) -> &'static str {
        match self {
            ChannelKind::Config => "config",
            ChannelKind::Status => "status",
            ChannelKind::Control => "control",
            ChannelKind::Storage => "storage",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Endpoint URL for a channel, e.g. `ws://kiln:8081/status`.
pub fn endpoint_url(base: &str, kind: ChannelKind) -> String {
    format!("{}/{}", base.trim_end_matches('/'), kind.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls() {
        assert_eq!(
            endpoint_url("ws://kiln:8081", ChannelKind::Config),
            "ws://kiln:8081/config"
        );
        assert_eq!(
            endpoint_url("wss://kiln:443/", ChannelKind::Storage),
            "wss://kiln:443/storage"
        );
    }
}
