use std::{net::SocketAddr, num::NonZeroUsize, time::Duration};

use clap::Parser;

/// Room server configuration, read from the command line or the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "room-server")]
#[command(about = "Shared music rooms with a synchronized queue and playback state")]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5500", env = "ROOM_SERVER_BIND")]
    pub bind: SocketAddr,

    /// Events buffered per connection before a lagging client is dropped
    #[arg(long, default_value = "100", env = "ROOM_SERVER_OUTBOUND_CAPACITY")]
    pub outbound_capacity: NonZeroUsize,

    /// Seconds an unjoined room is kept before it is removed, 0 keeps it forever
    #[arg(long, default_value_t = 300, env = "ROOM_SERVER_EMPTY_ROOM_TTL_SECS")]
    pub empty_room_ttl_secs: u64,
}

impl Config {
    pub fn empty_room_ttl(&self) -> Option<Duration> {
        (self.empty_room_ttl_secs > 0).then(|| Duration::from_secs(self.empty_room_ttl_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["room-server"]).unwrap();

        assert_eq!(config.bind, "0.0.0.0:5500".parse().unwrap());
        assert_eq!(config.outbound_capacity.get(), 100);
        assert_eq!(config.empty_room_ttl(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_zero_ttl_disables_reaping() {
        let config = Config::try_parse_from(["room-server", "--empty-room-ttl-secs", "0"]).unwrap();

        assert_eq!(config.empty_room_ttl(), None);
    }

    #[test]
    fn test_zero_outbound_capacity_is_rejected() {
        assert!(Config::try_parse_from(["room-server", "--outbound-capacity", "0"]).is_err());
    }
}
