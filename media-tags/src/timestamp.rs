use time::OffsetDateTime;

pub type Timestamp = OffsetDateTime;

pub fn now() -> Timestamp {
	OffsetDateTime::now_utc()
}
