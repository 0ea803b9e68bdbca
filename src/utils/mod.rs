pub mod discord_timestamp;
