use crate::cli::Command;
use crate::config::Config;
use anyhow::{anyhow, Result};
use blacksheep_discord::DiscordClient;
use blacksheep_scrape::{
    ChannelOutcome, HttpFetcher, ScrapeError, ScrapeMode, ScrapeOptions, ScrapeReport, Scraper,
};
use blacksheep_types::{ApiError, Channel, Guild, HistorySource, ScrapeTarget, Snowflake};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Wires configuration, the platform client and the scrape engine together
pub struct ScrapeService {
    config: Config,
}

impl ScrapeService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run one CLI command to completion
    pub async fn run(self, command: Command) -> Result<()> {
        blacksheep_logging::init_logging(&self.config.logging.level, self.config.logging.json)?;

        let client = DiscordClient::new(
            &self.config.discord.token,
            &self.config.discord.api_base,
            Duration::from_secs(self.config.scrape.request_timeout_secs),
        )?;

        // Validate the token before doing anything else
        match client.validate_token().await {
            Ok(me) => info!("Connected as {}", me),
            Err(ApiError::Unauthorized(_)) => {
                error!("HTTP 401 Unauthorized");
                return Err(anyhow!("HTTP 401 Unauthorized. Your token is probably invalid."));
            }
            Err(e) => return Err(e.into()),
        }

        let result = match command {
            Command::Scrape {
                server,
                channel,
                media,
                logs,
            } => {
                self.scrape(client, server, channel, ScrapeMode::from_flags(media, logs))
                    .await
            }
            Command::Channels { server } => Self::print_channels(&client, server).await,
            Command::Guild { server } => Self::print_guild(&client, server).await,
        };

        if let Err(e) = &result {
            error!("{:#}", e);
        }
        result
    }

    async fn scrape(
        &self,
        client: DiscordClient,
        server: Snowflake,
        channel: Option<Snowflake>,
        mode: ScrapeMode,
    ) -> Result<()> {
        let target = ScrapeTarget {
            server_id: server,
            channel_id: channel,
            output_dir: self.config.scrape.save_root().join(server.to_string()),
        };
        let options = ScrapeOptions::default()
            .with_mode(mode)
            .with_max_concurrent_channels(self.config.scrape.max_concurrent_channels);
        let fetcher = HttpFetcher::new(Duration::from_secs(
            self.config.scrape.download_timeout_secs,
        ))?;

        info!(
            "Scraping server {} into {} ({:?})",
            server,
            target.output_dir.display(),
            mode
        );

        let scraper = Scraper::new(Arc::new(client), fetcher, options);
        match scraper.run(&target).await {
            Ok(report) => {
                log_summary(&report);
                Ok(())
            }
            Err(ScrapeError::Resolve {
                server,
                source: ApiError::NotFound(_),
            }) => Err(anyhow!(
                "Server {server} was not found or is not accessible with this token"
            )),
            Err(ScrapeError::Resolve {
                server,
                source: ApiError::Forbidden(_),
            }) => Err(anyhow!("No permission to list the channels of server {server}")),
            Err(ScrapeError::Channel {
                channel,
                source: ApiError::NotFound(_),
            }) => Err(anyhow!(
                "Channel {channel} was not found or is not accessible with this token"
            )),
            Err(ScrapeError::Channel {
                channel,
                source: ApiError::Forbidden(_),
            }) => Err(anyhow!("No permission to read the history of channel {channel}")),
            Err(e) => Err(e.into()),
        }
    }

    async fn print_channels(client: &DiscordClient, server: Snowflake) -> Result<()> {
        let guild = client
            .get_guild(server)
            .await
            .map_err(|e| server_error(server, e))?;
        let channels = client
            .list_channels(server)
            .await
            .map_err(|e| server_error(server, e))?;
        print!("{}", format_channel_table(&guild, &channels));
        Ok(())
    }

    async fn print_guild(client: &DiscordClient, server: Snowflake) -> Result<()> {
        let guild = client
            .get_guild(server)
            .await
            .map_err(|e| server_error(server, e))?;
        print!("{}", format_guild_details(&guild));
        Ok(())
    }
}

fn server_error(server: Snowflake, e: ApiError) -> anyhow::Error {
    match e {
        ApiError::NotFound(_) => anyhow!("Server {server} was not found"),
        ApiError::Forbidden(_) => anyhow!("No permission to view server {server}"),
        other => other.into(),
    }
}

fn log_summary(report: &ScrapeReport) {
    for channel in &report.channels {
        if let ChannelOutcome::Aborted { reason } = &channel.outcome {
            warn!(
                "Channel {} stopped early after {} messages: {}",
                channel.channel_id, channel.messages, reason
            );
        }
    }
    info!(
        "Scrape finished: {} channel(s) completed, {} empty, {} stopped early; {} messages, {} media files",
        report.completed(),
        report.empty(),
        report.aborted(),
        report.messages(),
        report.media_saved()
    );
}

fn format_channel_table(guild: &Guild, channels: &[Channel]) -> String {
    let name_width = channels
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut table = format!("Channel list for {} ({})\n", guild.name, guild.id);
    table.push_str(&format!(
        "{:<20} | {:<name_width$} | {:<14} | NSFW\n",
        "ID", "NAME", "TYPE"
    ));
    for channel in channels {
        table.push_str(&format!(
            "{:<20} | {:<name_width$} | {:<14} | {}\n",
            channel.id,
            channel.name,
            channel.kind.to_string(),
            channel.nsfw
        ));
    }
    table
}

fn format_guild_details(guild: &Guild) -> String {
    let mut details = format!(
        "ID | {}\nName | {}\nOwner ID | {}\n",
        guild.id, guild.name, guild.owner_id
    );
    details.push_str(&format!(
        "AFK Timeout | {}\nVerification Level | {}\nWidget | {}\nContent Filter Level | {}\n",
        guild.afk_timeout, guild.verification_level, guild.widget_enabled, guild.explicit_content_filter
    ));

    let name_width = guild
        .roles
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("ROLE".len());
    details.push_str(&format!(
        "{:<name_width$} | {:<7} | {:<7} | {:<8} | POSITION\n",
        "ROLE", "MANAGED", "HOISTED", "COLOR"
    ));
    for role in &guild.roles {
        details.push_str(&format!(
            "{:<name_width$} | {:<7} | {:<7} | {:<8} | {}\n",
            role.name, role.managed, role.hoist, role.color, role.position
        ));
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use blacksheep_types::{ChannelKind, Role};

    fn guild(roles: Vec<Role>) -> Guild {
        Guild {
            id: Snowflake::new(1),
            name: "Flock".into(),
            owner_id: Snowflake::new(80),
            afk_timeout: 300,
            verification_level: 2,
            explicit_content_filter: 1,
            widget_enabled: false,
            roles,
        }
    }

    #[test]
    fn test_channel_table_aligns_names() {
        let channels = vec![
            Channel {
                id: Snowflake::new(10),
                name: "general".into(),
                kind: ChannelKind::GuildText,
                nsfw: false,
            },
            Channel {
                id: Snowflake::new(11),
                name: "vc".into(),
                kind: ChannelKind::GuildVoice,
                nsfw: true,
            },
        ];

        let table = format_channel_table(&guild(Vec::new()), &channels);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Channel list for Flock (1)");
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("general | Guild Text"));
        assert!(lines[3].contains("vc      | Guild Voice"));
        assert!(lines[3].ends_with("true"));
    }

    #[test]
    fn test_guild_details_list_roles() {
        let roles = vec![
            Role {
                id: Snowflake::new(1),
                name: "@everyone".into(),
                managed: false,
                hoist: false,
                color: 0,
                position: 0,
            },
            Role {
                id: Snowflake::new(2),
                name: "Shepherds".into(),
                managed: true,
                hoist: true,
                color: 3447003,
                position: 2,
            },
        ];

        let details = format_guild_details(&guild(roles));
        let lines: Vec<&str> = details.lines().collect();

        assert_eq!(lines[0], "ID | 1");
        assert_eq!(lines[1], "Name | Flock");
        assert_eq!(lines[2], "Owner ID | 80");
        assert!(lines.contains(&"Verification Level | 2"));
        assert!(lines.contains(&"Content Filter Level | 1"));
        assert_eq!(lines.len(), 10);
        assert!(lines[7].starts_with("ROLE      | MANAGED"));
        assert_eq!(lines[8], "@everyone | false   | false   | 0        | 0");
        assert_eq!(lines[9], "Shepherds | true    | true    | 3447003  | 2");
    }
}
