//! Generic CRUD over any [`Entity`], backed by the pooled database.

use std::collections::HashSet;
use std::marker::PhantomData;

use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::database::models::Entity;
use crate::database::query::{Filter, Select, ID_CHUNK};
use crate::database::Database;
use crate::error;
use crate::timestamp;

pub mod media;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error(transparent)]
	NotFound(#[from] error::RecordNotFound),
	#[error(transparent)]
	MissingIds(#[from] error::RecordsNotFound),
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		match self {
			Self::Sqlx(error) => error::Sqlx(error).into_response(),
			Self::NotFound(error) => error.into_response(),
			Self::MissingIds(error) => error.into_response(),
		}
	}
}

pub struct Service<T> {
	database: Database,
	_entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Service<T> {
	fn clone(&self) -> Self {
		Self {
			database: self.database.clone(),
			_entity: PhantomData,
		}
	}
}

impl<T: Entity> Service<T> {
	pub fn new(database: Database) -> Self {
		Self {
			database,
			_entity: PhantomData,
		}
	}

	fn log_failure(action: &'static str) -> impl FnOnce(sqlx::Error) -> sqlx::Error {
		move |error| {
			tracing::error!(model = std::any::type_name::<T>(), %error, "failed to {action}");
			error
		}
	}

	/// All entities matching every filter. An empty result is not an error.
	pub async fn get(&self, filters: &[&dyn Filter<T>]) -> Result<Vec<T>, Error> {
		let mut select = Select::new(T::TABLE);
		for filter in filters {
			filter.apply(&mut select);
		}

		let mut items = select
			.fetch_all::<T>(&self.database)
			.await
			.map_err(Self::log_failure("get"))?;
		T::load_relations(&self.database, &mut items)
			.await
			.map_err(Self::log_failure("load relations"))?;
		Ok(items)
	}

	pub async fn get_with_id(&self, id: Uuid) -> Result<T, Error> {
		let mut select = Select::new(T::TABLE);
		select.filter(format!("{}.id", T::TABLE), id);

		let item = select
			.fetch_optional::<T>(&self.database)
			.await
			.map_err(Self::log_failure("get with ID"))?;
		let mut item = match item {
			Some(item) => item,
			None => {
				tracing::debug!(model = std::any::type_name::<T>(), %id, "record not found");
				return Err(error::RecordNotFound(id).into());
			}
		};

		T::load_relations(&self.database, std::slice::from_mut(&mut item))
			.await
			.map_err(Self::log_failure("load relations"))?;
		Ok(item)
	}

	/// Either every requested entity, in no particular order, or an error naming exactly the IDs that are missing.
	///
	/// A store failure is returned as such and never reported as missing records.
	pub async fn get_with_ids(&self, ids: &[Uuid]) -> Result<Vec<T>, Error> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let mut seen = HashSet::new();
		let unique: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

		let mut items = Vec::with_capacity(unique.len());
		for chunk in unique.chunks(ID_CHUNK) {
			let mut select = Select::new(T::TABLE);
			select.filter_ids(chunk);
			let found = select
				.fetch_all::<T>(&self.database)
				.await
				.map_err(Self::log_failure("get with IDs"))?;
			items.extend(found);
		}

		let found: HashSet<Uuid> = items.iter().map(|item| item.id()).collect();
		let missing: Vec<Uuid> = unique
			.into_iter()
			.filter(|id| !found.contains(id))
			.collect();
		if !missing.is_empty() {
			tracing::debug!(model = std::any::type_name::<T>(), ?missing, "records not found");
			return Err(error::RecordsNotFound(missing).into());
		}

		T::load_relations(&self.database, &mut items)
			.await
			.map_err(Self::log_failure("load relations"))?;
		Ok(items)
	}

	/// Persists all items in one transaction, assigning IDs to those without one.
	pub async fn create(&self, items: &mut [T]) -> Result<(), Error> {
		let now = timestamp::now();
		let mut transaction = self
			.database
			.begin()
			.await
			.map_err(Self::log_failure("begin creating"))?;

		for item in items.iter_mut() {
			item.base_mut().prepare(now);
			item
				.insert(&mut *transaction)
				.await
				.map_err(Self::log_failure("create"))?;
		}

		transaction
			.commit()
			.await
			.map_err(Self::log_failure("commit creating"))?;
		Ok(())
	}

	/// Deleting an ID that is not stored is not an error.
	pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
		sqlx::query(&format!("DELETE FROM {} WHERE id = ?", T::TABLE))
			.bind(id)
			.execute(&self.database)
			.await
			.map_err(Self::log_failure("delete"))?;
		Ok(())
	}
}
