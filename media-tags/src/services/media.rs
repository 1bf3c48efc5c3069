use crate::database::models::Media;
use crate::database::query::{Filter, Select};

/// Restricts media to those tagged with a tag of exactly this name.
#[derive(Debug, Clone)]
pub struct ByTagName(pub String);

impl ByTagName {
	pub fn new(name: impl Into<String>) -> Self {
		Self(name.into())
	}
}

impl Filter<Media> for ByTagName {
	fn apply(&self, select: &mut Select) {
		let table = select.table();
		let link = select.alias("media_tags");
		let tag = select.alias("tags");
		select
			.join(format!(
				"INNER JOIN media_tags AS {link} ON {link}.media_id = {table}.id"
			))
			.join(format!("INNER JOIN tags AS {tag} ON {tag}.id = {link}.tag_id"))
			.filter(format!("{tag}.name"), self.0.as_str())
			.group_by_id();
	}
}
