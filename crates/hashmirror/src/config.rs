/// Configuration for a [`Mirror`](crate::Mirror).
#[derive(Clone, Debug)]
pub struct MirrorConfig {
    /// Suffix appended to the hash name to derive the replication channel
    /// name. All mirrors built with the same hash name and suffix share one
    /// channel.
    pub channel_suffix: String,
    /// Capacity of per-observer broadcast channels.
    pub observer_capacity: usize,
}

impl MirrorConfig {
    /// Replication channel name for the given hash name.
    pub fn channel_for(&self, hash_name: &str) -> String {
        format!("{hash_name}{}", self.channel_suffix)
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            channel_suffix: "-hash".to_string(),
            observer_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_channel_name_derivation() {
        let config = MirrorConfig::default();
        assert_eq!(config.channel_for("sessions"), "sessions-hash");
    }

    #[test]
    fn custom_suffix() {
        let config = MirrorConfig {
            channel_suffix: ".repl".to_string(),
            ..Default::default()
        };
        assert_eq!(config.channel_for("sessions"), "sessions.repl");
    }
}
