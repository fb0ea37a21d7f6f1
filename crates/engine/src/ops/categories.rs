use std::collections::HashMap;

use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, Subcategory, TransactionKind, categories, profiles,
    subcategories, transactions,
};

use super::{Engine, name_taken, normalize_required_name, with_tx};

/// System category holding both legs of profile transfers.
pub(super) const PROFILE_TRANSFER_CATEGORY: &str = "Profile transfer";

impl Engine {
    /// Create a category in one of the caller's profiles.
    ///
    /// `(name, kind)` is unique per profile, ignoring case.
    pub async fn create_category(
        &self,
        profile_id: Uuid,
        name: &str,
        kind: TransactionKind,
        user_id: Uuid,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, profile_id, user_id).await?;
            self.ensure_category_name_free(&db_tx, profile_id, &name, kind, None)
                .await?;

            let category = Category::new(profile_id, name, kind, false);
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            Ok(category)
        })
    }

    /// Return a category with its subcategories.
    pub async fn category(&self, category_id: Uuid, user_id: Uuid) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id, user_id).await?;
            let subcategories = subcategories::Entity::find()
                .filter(subcategories::Column::CategoryId.eq(model.id))
                .order_by_asc(subcategories::Column::Name)
                .all(&db_tx)
                .await?;

            let mut category = Category::try_from(model)?;
            category.subcategories = subcategories.into_iter().map(Subcategory::from).collect();
            Ok(category)
        })
    }

    /// List the caller's categories with their subcategories, ordered by name.
    pub async fn list_categories(
        &self,
        profile_id: Option<Uuid>,
        kind: Option<TransactionKind>,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let mut query = categories::Entity::find()
                .inner_join(profiles::Entity)
                .filter(profiles::Column::UserId.eq(user_id));
            if let Some(profile_id) = profile_id {
                query = query.filter(categories::Column::ProfileId.eq(profile_id));
            }
            if let Some(kind) = kind {
                query = query.filter(categories::Column::Kind.eq(kind.as_str()));
            }
            let models = query
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;

            let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
            let mut by_category: HashMap<Uuid, Vec<Subcategory>> = HashMap::new();
            for sub in subcategories::Entity::find()
                .filter(subcategories::Column::CategoryId.is_in(ids))
                .order_by_asc(subcategories::Column::Name)
                .all(&db_tx)
                .await?
            {
                by_category
                    .entry(sub.category_id)
                    .or_default()
                    .push(Subcategory::from(sub));
            }

            models
                .into_iter()
                .map(|model| {
                    let mut category = Category::try_from(model)?;
                    category.subcategories = by_category.remove(&category.id).unwrap_or_default();
                    Ok(category)
                })
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Rename a category or change its kind. System categories are read-only.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        name: &str,
        kind: TransactionKind,
        user_id: Uuid,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id, user_id).await?;
            if model.is_system {
                return Err(EngineError::Forbidden(
                    "system categories cannot be modified".to_string(),
                ));
            }
            if kind.as_str() != model.kind {
                let used = transactions::Entity::find()
                    .filter(transactions::Column::CategoryId.eq(category_id))
                    .count(&db_tx)
                    .await?;
                if used > 0 {
                    return Err(EngineError::InUse(format!(
                        "category kind ({used} transactions)"
                    )));
                }
            }
            self.ensure_category_name_free(&db_tx, model.profile_id, &name, kind, Some(model.id))
                .await?;

            let active = categories::ActiveModel {
                id: ActiveValue::Set(category_id),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                ..Default::default()
            };
            Category::try_from(active.update(&db_tx).await?)
        })
    }

    /// Delete a category and its subcategories.
    ///
    /// System categories cannot be deleted; categories still used by
    /// transactions fail with `InUse`.
    pub async fn delete_category(&self, category_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id, user_id).await?;
            if model.is_system {
                return Err(EngineError::Forbidden(
                    "system categories cannot be deleted".to_string(),
                ));
            }
            let used = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if used > 0 {
                return Err(EngineError::InUse(format!("category ({used} transactions)")));
            }
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Find or create the system transfer category of `kind` in a profile.
    pub(super) async fn profile_transfer_category(
        &self,
        db: &DatabaseTransaction,
        profile_id: Uuid,
        kind: TransactionKind,
    ) -> ResultEngine<categories::Model> {
        if let Some(model) = categories::Entity::find()
            .filter(categories::Column::ProfileId.eq(profile_id))
            .filter(categories::Column::IsSystem.eq(true))
            .filter(categories::Column::Name.eq(PROFILE_TRANSFER_CATEGORY))
            .filter(categories::Column::Kind.eq(kind.as_str()))
            .one(db)
            .await?
        {
            return Ok(model);
        }

        let category = Category::new(profile_id, PROFILE_TRANSFER_CATEGORY.to_string(), kind, true);
        Ok(categories::ActiveModel::from(&category).insert(db).await?)
    }

    async fn ensure_category_name_free(
        &self,
        db: &DatabaseTransaction,
        profile_id: Uuid,
        name: &str,
        kind: TransactionKind,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        if name_taken(&[PROFILE_TRANSFER_CATEGORY.to_string()], name) {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        let mut query = categories::Entity::find()
            .filter(categories::Column::ProfileId.eq(profile_id))
            .filter(categories::Column::Kind.eq(kind.as_str()))
            .select_only()
            .column(categories::Column::Name);
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        let existing: Vec<String> = query.into_tuple().all(db).await?;
        if name_taken(&existing, name) {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(())
    }
}
