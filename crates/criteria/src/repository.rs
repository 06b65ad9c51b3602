//! Repository contracts and an in-memory implementation.
//!
//! Repositories are where specifications meet storage: reads route a
//! specification through a [`SpecificationEvaluator`], writes mutate the
//! store. The traits are synchronous; an implementation backed by a real
//! data source materializes the composed query however it needs to.

use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::debug;

use crate::error::SpecificationError;
use crate::evaluator::SpecificationEvaluator;
use crate::memory::MemoryQueryable;
use crate::specification::{SelectSpecification, SingleResultSpecification, Specification};

/// A persisted object with a stable identity.
pub trait Entity {
    type Id: Clone + PartialEq + Display;

    fn id(&self) -> &Self::Id;
}

/// Tag for entities that may be written through a [`Repository`].
///
/// Child entities reachable only through their aggregate are read-only at
/// the repository level.
pub trait AggregateRoot: Entity {}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("no entity with id '{id}'")]
    NotFound { id: String },

    #[error("an entity with id '{id}' already exists")]
    AlreadyExists { id: String },

    #[error("expected at most one result, found {count}")]
    MultipleResults { count: usize },

    #[error("repository lock was poisoned by a panicking writer")]
    LockPoisoned,

    #[error(transparent)]
    Specification(#[from] SpecificationError),
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Read access driven by specifications.
pub trait ReadRepository<T: Entity> {
    fn get_by_id(&self, id: &T::Id) -> RepositoryResult<Option<T>>;

    /// Items matching the specification, post-processing applied.
    fn list(&self, specification: &Specification<T>) -> RepositoryResult<Vec<T>>;

    fn list_projected<R>(
        &self,
        specification: &SelectSpecification<T, R>,
    ) -> RepositoryResult<Vec<R>>;

    /// Number of matching items, ignoring ordering and paging.
    fn count(&self, specification: &Specification<T>) -> RepositoryResult<usize>;

    fn any(&self, specification: &Specification<T>) -> RepositoryResult<bool>;

    /// The head of [`list`](ReadRepository::list), post-processing applied.
    fn first(&self, specification: &Specification<T>) -> RepositoryResult<Option<T>>;

    /// The only item [`list`](ReadRepository::list) returns, `None` if it is
    /// empty, or [`RepositoryError::MultipleResults`].
    fn single(&self, specification: &SingleResultSpecification<T>)
        -> RepositoryResult<Option<T>>;
}

/// Write access for aggregate roots.
pub trait Repository<T: AggregateRoot>: ReadRepository<T> {
    fn add(&self, entity: T) -> RepositoryResult<()>;

    fn add_range(&self, entities: Vec<T>) -> RepositoryResult<()>;

    /// Replaces the stored entity with the same id.
    fn update(&self, entity: T) -> RepositoryResult<()>;

    /// Removes and returns the entity with `id`.
    fn delete(&self, id: &T::Id) -> RepositoryResult<T>;

    /// Removes every item the specification's criteria match.
    fn delete_matching(&self, specification: &Specification<T>) -> RepositoryResult<usize>;

    /// Number of writes since the previous call.
    fn save_changes(&self) -> RepositoryResult<usize>;
}

/// A repository over a locked `Vec<T>`.
///
/// Insertion order is the natural order of unordered reads.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    items: RwLock<Vec<T>>,
    pending: AtomicUsize,
    evaluator: SpecificationEvaluator,
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<T>) -> Self {
        InMemoryRepository {
            items: RwLock::new(items),
            pending: AtomicUsize::new(0),
            evaluator: SpecificationEvaluator::default(),
        }
    }

    /// Uses `evaluator` for every read.
    pub fn with_evaluator(mut self, evaluator: SpecificationEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Vec<T>>> {
        self.items.read().map_err(|_| RepositoryError::LockPoisoned)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Vec<T>>> {
        self.items.write().map_err(|_| RepositoryError::LockPoisoned)
    }

    fn changed(&self, count: usize) {
        self.pending.fetch_add(count, Ordering::SeqCst);
    }
}

impl<T: Entity + Clone> InMemoryRepository<T> {
    fn snapshot(&self) -> RepositoryResult<MemoryQueryable<T>> {
        Ok(MemoryQueryable::new(self.read()?.clone()))
    }

    fn query(
        &self,
        specification: &Specification<T>,
        criteria_only: bool,
    ) -> RepositoryResult<MemoryQueryable<T>> {
        Ok(self
            .evaluator
            .get_query(self.snapshot()?, specification, criteria_only)?)
    }
}

impl<T: Entity + Clone> ReadRepository<T> for InMemoryRepository<T> {
    fn get_by_id(&self, id: &T::Id) -> RepositoryResult<Option<T>> {
        Ok(self.read()?.iter().find(|item| item.id() == id).cloned())
    }

    fn list(&self, specification: &Specification<T>) -> RepositoryResult<Vec<T>> {
        let items = self.query(specification, false)?.to_list();
        Ok(match specification.post_processing_action() {
            Some(action) => action(items),
            None => items,
        })
    }

    fn list_projected<R>(
        &self,
        specification: &SelectSpecification<T, R>,
    ) -> RepositoryResult<Vec<R>> {
        let items = self
            .evaluator
            .get_projected_query(self.snapshot()?, specification)?
            .to_list();
        Ok(match specification.post_processing_action() {
            Some(action) => action(items),
            None => items,
        })
    }

    fn count(&self, specification: &Specification<T>) -> RepositoryResult<usize> {
        Ok(self.query(specification, true)?.count())
    }

    fn any(&self, specification: &Specification<T>) -> RepositoryResult<bool> {
        Ok(self.query(specification, true)?.any())
    }

    fn first(&self, specification: &Specification<T>) -> RepositoryResult<Option<T>> {
        Ok(self.list(specification)?.into_iter().next())
    }

    fn single(
        &self,
        specification: &SingleResultSpecification<T>,
    ) -> RepositoryResult<Option<T>> {
        let mut items = self.list(specification.criteria())?;
        match items.len() {
            0 | 1 => Ok(items.pop()),
            count => Err(RepositoryError::MultipleResults { count }),
        }
    }
}

impl<T: AggregateRoot + Clone> Repository<T> for InMemoryRepository<T> {
    fn add(&self, entity: T) -> RepositoryResult<()> {
        let mut items = self.write()?;
        if items.iter().any(|item| item.id() == entity.id()) {
            return Err(RepositoryError::AlreadyExists {
                id: entity.id().to_string(),
            });
        }
        debug!(id = %entity.id(), "adding entity");
        items.push(entity);
        self.changed(1);
        Ok(())
    }

    /// Adds all entities or none of them.
    fn add_range(&self, entities: Vec<T>) -> RepositoryResult<()> {
        let mut items = self.write()?;
        for (index, entity) in entities.iter().enumerate() {
            let clash = items.iter().any(|item| item.id() == entity.id())
                || entities[..index].iter().any(|e| e.id() == entity.id());
            if clash {
                return Err(RepositoryError::AlreadyExists {
                    id: entity.id().to_string(),
                });
            }
        }
        debug!(count = entities.len(), "adding entities");
        self.changed(entities.len());
        items.extend(entities);
        Ok(())
    }

    fn update(&self, entity: T) -> RepositoryResult<()> {
        let mut items = self.write()?;
        let slot = items
            .iter_mut()
            .find(|item| item.id() == entity.id())
            .ok_or_else(|| RepositoryError::NotFound {
                id: entity.id().to_string(),
            })?;
        debug!(id = %entity.id(), "updating entity");
        *slot = entity;
        self.changed(1);
        Ok(())
    }

    fn delete(&self, id: &T::Id) -> RepositoryResult<T> {
        let mut items = self.write()?;
        let index = items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })?;
        debug!(id = %id, "deleting entity");
        self.changed(1);
        Ok(items.remove(index))
    }

    fn delete_matching(&self, specification: &Specification<T>) -> RepositoryResult<usize> {
        let mut items = self.write()?;
        let matched: Vec<T::Id> = self
            .evaluator
            .get_query(MemoryQueryable::new(items.clone()), specification, true)?
            .to_list()
            .iter()
            .map(|item| item.id().clone())
            .collect();
        items.retain(|item| !matched.contains(item.id()));
        debug!(count = matched.len(), "deleted matching entities");
        self.changed(matched.len());
        Ok(matched.len())
    }

    fn save_changes(&self) -> RepositoryResult<usize> {
        let saved = self.pending.swap(0, Ordering::SeqCst);
        debug!(saved, "saving changes");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[derive(Debug, Clone, PartialEq)]
    struct Customer {
        id: u32,
        name: String,
        vip: bool,
    }

    impl Entity for Customer {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    impl AggregateRoot for Customer {}

    fn customer(id: u32, name: &str, vip: bool) -> Customer {
        Customer {
            id,
            name: name.to_string(),
            vip,
        }
    }

    fn repository() -> InMemoryRepository<Customer> {
        InMemoryRepository::with_items(vec![
            customer(1, "Noor", true),
            customer(2, "Ines", false),
            customer(3, "Arlo", true),
            customer(4, "Bea", false),
        ])
    }

    fn vips() -> Specification<Customer> {
        Specification::builder()
            .filter(|c: &Customer| c.vip)
            .build()
            .unwrap()
    }

    #[test]
    fn get_by_id() {
        let repo = repository();
        assert_eq!(repo.get_by_id(&3).unwrap().map(|c| c.name), Some("Arlo".into()));
        assert!(repo.get_by_id(&9).unwrap().is_none());
    }

    #[test]
    fn list_orders_and_pages() {
        let spec = Specification::<Customer>::builder()
            .order_by(|c| Value::from(c.name.as_str()))
            .and()
            .paginate(1, 2)
            .build()
            .unwrap();
        let names: Vec<_> = repository()
            .list(&spec)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Bea", "Ines"]);
    }

    #[test]
    fn count_ignores_paging() {
        let spec = Specification::<Customer>::builder()
            .filter(|c| c.vip)
            .take(1)
            .build()
            .unwrap();
        let repo = repository();
        assert_eq!(repo.count(&spec).unwrap(), 2);
        assert_eq!(repo.list(&spec).unwrap().len(), 1);
        assert!(repo.any(&spec).unwrap());
    }

    #[test]
    fn single_reports_ambiguity() {
        let repo = repository();
        let err = repo.single(&SingleResultSpecification::new(vips())).unwrap_err();
        assert!(matches!(err, RepositoryError::MultipleResults { count: 2 }));

        let spec = Specification::<Customer>::builder()
            .filter(|c| c.name == "Bea")
            .build_single()
            .unwrap();
        assert_eq!(repo.single(&spec).unwrap().map(|c| c.id), Some(4));
    }

    #[test]
    fn first_and_single_see_post_processing() {
        let repo = repository();
        let newest_first = Specification::<Customer>::builder()
            .filter(|c: &Customer| c.vip)
            .post_processing(|mut items| {
                items.reverse();
                items
            })
            .build()
            .unwrap();
        let head = repo.list(&newest_first).unwrap().into_iter().next();
        assert_eq!(repo.first(&newest_first).unwrap(), head);
        assert_eq!(repo.first(&newest_first).unwrap().map(|c| c.id), Some(3));

        let only_one = Specification::<Customer>::builder()
            .post_processing(|items| items.into_iter().take(1).collect())
            .build_single()
            .unwrap();
        assert_eq!(repo.single(&only_one).unwrap().map(|c| c.id), Some(1));
    }

    #[test]
    fn projected_list() {
        let spec = Specification::<Customer>::builder()
            .filter(|c| !c.vip)
            .select(|c: &Customer| c.id)
            .build()
            .unwrap();
        assert_eq!(repository().list_projected(&spec).unwrap(), vec![2, 4]);
    }

    #[test]
    fn writes_are_counted_until_saved() {
        let repo = repository();
        repo.add(customer(5, "Lux", false)).unwrap();
        repo.update(customer(2, "Ines", true)).unwrap();
        assert_eq!(repo.delete(&1).unwrap().name, "Noor");
        assert_eq!(repo.save_changes().unwrap(), 3);
        assert_eq!(repo.save_changes().unwrap(), 0);
        assert_eq!(repo.count(&vips()).unwrap(), 2);
    }

    #[test]
    fn add_rejects_duplicate_ids() {
        let repo = repository();
        assert!(matches!(
            repo.add(customer(1, "Again", false)),
            Err(RepositoryError::AlreadyExists { .. })
        ));
        assert!(matches!(
            repo.add_range(vec![customer(7, "A", false), customer(7, "B", false)]),
            Err(RepositoryError::AlreadyExists { .. })
        ));
        assert!(repo.get_by_id(&7).unwrap().is_none());
    }

    #[test]
    fn missing_entities() {
        let repo = repository();
        assert!(matches!(
            repo.update(customer(42, "Nobody", false)),
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(repo.delete(&42), Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn delete_matching_removes_criteria_matches() {
        let repo = repository();
        assert_eq!(repo.delete_matching(&vips()).unwrap(), 2);
        assert_eq!(repo.count(&Specification::new()).unwrap(), 2);
        assert_eq!(repo.save_changes().unwrap(), 2);
    }

    #[test]
    fn specification_errors_propagate() {
        let spec = Specification::<Customer>::builder()
            .order_by(|c| Value::from(c.id))
            .and()
            .order_by(|c| Value::from(c.name.as_str()))
            .build()
            .unwrap();
        assert!(matches!(
            repository().list(&spec),
            Err(RepositoryError::Specification(
                SpecificationError::DuplicateOrderChain
            ))
        ));
    }
}
