use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Deserialize)]
pub struct Config {
	#[serde(default = "default_address")]
	pub address: SocketAddr,
	#[serde(default = "default_log_level")]
	pub log_level: LogLevel,
	#[serde(default = "default_database_url")]
	pub database_url: String,
	#[serde(default = "default_max_connections")]
	pub max_connections: u32,
	/// Directory that uploaded media files are stored in.
	#[serde(default = "default_file_storage")]
	pub file_storage: PathBuf,
	/// Prefix of the URL under which stored files are published, used to build `fileUrl`.
	#[serde(default = "default_file_url_prefix")]
	pub file_url_prefix: String,
}

impl Config {
	pub fn file_url(&self, file_name: &str) -> String {
		format!("{}/{file_name}", self.file_url_prefix.trim_end_matches('/'))
	}
}

fn default_address() -> SocketAddr {
	SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_database_url() -> String {
	"sqlite://media-tags.db".to_owned()
}

const fn default_max_connections() -> u32 {
	5
}

fn default_file_storage() -> PathBuf {
	PathBuf::from("static")
}

fn default_file_url_prefix() -> String {
	"/files".to_owned()
}

fn deserialize_level_filter<'de, D: serde::de::Deserializer<'de>>(
	d: D,
) -> Result<LevelFilter, D::Error>
where
	D::Error: serde::de::Error,
{
	String::deserialize(d)?
		.parse()
		.map_err(serde::de::Error::custom)
}

/// Levels for events from this crate (`internal`) and from dependencies (`external`).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(from = "LogLevelSerdeHelper")]
pub struct LogLevel {
	pub internal: LevelFilter,
	pub external: LevelFilter,
}

const fn default_log_level_internal() -> LevelFilter {
	LevelFilter::INFO
}

const fn default_log_level_external() -> LevelFilter {
	LevelFilter::WARN
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LogLevelSerdeHelper {
	#[serde(deserialize_with = "deserialize_level_filter")]
	Together(LevelFilter),
	Separate {
		#[serde(
			deserialize_with = "deserialize_level_filter",
			default = "default_log_level_internal"
		)]
		internal: LevelFilter,
		#[serde(
			deserialize_with = "deserialize_level_filter",
			default = "default_log_level_external"
		)]
		external: LevelFilter,
	},
}

impl From<LogLevelSerdeHelper> for LogLevel {
	fn from(helper: LogLevelSerdeHelper) -> Self {
		match helper {
			LogLevelSerdeHelper::Together(level) => Self {
				internal: level,
				external: level,
			},
			LogLevelSerdeHelper::Separate { internal, external } => Self { internal, external },
		}
	}
}

const fn default_log_level() -> LogLevel {
	LogLevel {
		internal: default_log_level_internal(),
		external: default_log_level_external(),
	}
}

pub fn config() -> Result<Config, figment::Error> {
	use figment::providers::Format as _;

	figment::Figment::new()
		.merge(figment::providers::Toml::file("media-tags.toml"))
		.merge(figment::providers::Env::prefixed("MEDIA_TAGS_"))
		.extract()
}
