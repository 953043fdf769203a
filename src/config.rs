use std::time::Duration;

/// Key the player record is saved under in local storage.
pub const STORAGE_KEY: &str = "injective-ninja-quest";

/// Public Injective LCD endpoint queried for live chain data.
pub const DEFAULT_LCD_ENDPOINT: &str = "https://sentry.lcd.injective.network:443";

/// Origin linked from share texts when the page origin is unknown.
pub const DEFAULT_SITE_ORIGIN: &str = "https://injective-ninja-quest.pages.dev";

/// Build-time settings. `NINJA_QUEST_LCD` and `NINJA_QUEST_ORIGIN` override
/// the endpoint and origin when set while compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestConfig {
    pub storage_key: &'static str,
    pub lcd_endpoint: &'static str,
    pub site_origin: &'static str,
    /// How often the HUD re-reads saved progress.
    pub progress_refresh: Duration,
    /// How often live chain data is fetched again.
    pub metrics_refresh: Duration,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY,
            lcd_endpoint: option_env!("NINJA_QUEST_LCD").unwrap_or(DEFAULT_LCD_ENDPOINT),
            site_origin: option_env!("NINJA_QUEST_ORIGIN").unwrap_or(DEFAULT_SITE_ORIGIN),
            progress_refresh: Duration::from_millis(500),
            metrics_refresh: Duration::from_secs(10),
        }
    }
}

impl QuestConfig {
    pub fn latest_block_url(&self) -> String {
        format!(
            "{}/cosmos/base/tendermint/v1beta1/blocks/latest",
            self.lcd_endpoint.trim_end_matches('/')
        )
    }

    pub fn node_info_url(&self) -> String {
        format!(
            "{}/cosmos/base/tendermint/v1beta1/node_info",
            self.lcd_endpoint.trim_end_matches('/')
        )
    }

    pub fn validators_url(&self) -> String {
        format!(
            "{}/cosmos/staking/v1beta1/validators?status=BOND_STATUS_BONDED&pagination.limit=1",
            self.lcd_endpoint.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_endpoint_urls() {
        let config = QuestConfig {
            lcd_endpoint: "https://lcd.example/",
            ..QuestConfig::default()
        };

        assert_eq!(
            config.latest_block_url(),
            "https://lcd.example/cosmos/base/tendermint/v1beta1/blocks/latest"
        );
        assert_eq!(
            config.node_info_url(),
            "https://lcd.example/cosmos/base/tendermint/v1beta1/node_info"
        );
        assert!(
            config
                .validators_url()
                .ends_with("validators?status=BOND_STATUS_BONDED&pagination.limit=1")
        );
    }

    #[test]
    fn default_refresh_intervals() {
        let config = QuestConfig::default();

        assert_eq!(config.storage_key, "injective-ninja-quest");
        assert_eq!(config.progress_refresh, Duration::from_millis(500));
        assert_eq!(config.metrics_refresh, Duration::from_secs(10));
    }
}
