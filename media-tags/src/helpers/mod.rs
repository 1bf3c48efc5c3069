use uuid::Uuid;

use crate::error;

pub mod upload;

pub fn parse_id(raw: &str) -> Result<Uuid, error::InvalidUuid> {
	Uuid::parse_str(raw.trim()).map_err(|_| error::InvalidUuid(raw.to_owned()))
}
