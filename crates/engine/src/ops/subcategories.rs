use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Subcategory, categories, profiles, subcategories, transactions,
};

use super::{Engine, name_taken, normalize_required_name, with_tx};

impl Engine {
    /// Add a subcategory to one of the caller's categories. Names are unique
    /// per category, ignoring case.
    pub async fn create_subcategory(
        &self,
        category_id: Uuid,
        name: &str,
        user_id: Uuid,
    ) -> ResultEngine<Subcategory> {
        let name = normalize_required_name(name, "subcategory")?;
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, category_id, user_id).await?;
            self.ensure_subcategory_name_free(&db_tx, category_id, &name, None)
                .await?;

            let subcategory = Subcategory {
                id: Uuid::new_v4(),
                category_id,
                name,
                created_at: Utc::now(),
            };
            subcategories::ActiveModel::from(&subcategory)
                .insert(&db_tx)
                .await?;
            Ok(subcategory)
        })
    }

    pub async fn subcategory(
        &self,
        subcategory_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Subcategory> {
        with_tx!(self, |db_tx| {
            let (model, _) = self
                .require_subcategory(&db_tx, subcategory_id, user_id)
                .await?;
            Ok(Subcategory::from(model))
        })
    }

    /// List subcategories of one category, or of every category the caller
    /// owns.
    pub async fn list_subcategories(
        &self,
        category_id: Option<Uuid>,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Subcategory>> {
        with_tx!(self, |db_tx| {
            let category_ids: Vec<Uuid> = match category_id {
                Some(id) => vec![self.require_category(&db_tx, id, user_id).await?.id],
                None => categories::Entity::find()
                    .inner_join(profiles::Entity)
                    .filter(profiles::Column::UserId.eq(user_id))
                    .select_only()
                    .column(categories::Column::Id)
                    .into_tuple()
                    .all(&db_tx)
                    .await?,
            };
            let models = subcategories::Entity::find()
                .filter(subcategories::Column::CategoryId.is_in(category_ids))
                .order_by_asc(subcategories::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Subcategory::from).collect())
        })
    }

    /// Rename a subcategory and optionally move it under another category
    /// owned by the caller.
    pub async fn update_subcategory(
        &self,
        subcategory_id: Uuid,
        name: &str,
        category_id: Option<Uuid>,
        user_id: Uuid,
    ) -> ResultEngine<Subcategory> {
        let name = normalize_required_name(name, "subcategory")?;
        with_tx!(self, |db_tx| {
            let (model, _) = self
                .require_subcategory(&db_tx, subcategory_id, user_id)
                .await?;
            let target = match category_id {
                Some(id) if id != model.category_id => {
                    self.require_category(&db_tx, id, user_id).await?.id
                }
                _ => model.category_id,
            };
            self.ensure_subcategory_name_free(&db_tx, target, &name, Some(model.id))
                .await?;
            if target != model.category_id {
                // Rows keep the old category, so they cannot keep the moved subcategory.
                self.detach_subcategory(&db_tx, model.id).await?;
            }

            let active = subcategories::ActiveModel {
                id: ActiveValue::Set(model.id),
                category_id: ActiveValue::Set(target),
                name: ActiveValue::Set(name),
                ..Default::default()
            };
            Ok(Subcategory::from(active.update(&db_tx).await?))
        })
    }

    /// Delete a subcategory. Transactions keep their category and lose the
    /// subcategory reference.
    pub async fn delete_subcategory(&self, subcategory_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_subcategory(&db_tx, subcategory_id, user_id)
                .await?;
            self.detach_subcategory(&db_tx, subcategory_id).await?;
            subcategories::Entity::delete_by_id(subcategory_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn detach_subcategory(
        &self,
        db: &DatabaseTransaction,
        subcategory_id: Uuid,
    ) -> ResultEngine<()> {
        transactions::Entity::update_many()
            .col_expr(
                transactions::Column::SubcategoryId,
                Expr::value(None::<Uuid>),
            )
            .filter(transactions::Column::SubcategoryId.eq(subcategory_id))
            .exec(db)
            .await?;
        Ok(())
    }

    async fn ensure_subcategory_name_free(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = subcategories::Entity::find()
            .filter(subcategories::Column::CategoryId.eq(category_id))
            .select_only()
            .column(subcategories::Column::Name);
        if let Some(id) = except {
            query = query.filter(subcategories::Column::Id.ne(id));
        }
        let existing: Vec<String> = query.into_tuple().all(db).await?;
        if name_taken(&existing, name) {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(())
    }
}
