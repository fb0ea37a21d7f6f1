use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Profile, ProfileKind, ResultEngine, categories, institutions, profiles,
    transactions,
};

use super::{Engine, name_taken, normalize_required_name, with_tx};

impl Engine {
    /// Create a new profile for the caller. Names are unique per user,
    /// ignoring case.
    pub async fn create_profile(
        &self,
        name: &str,
        kind: ProfileKind,
        user_id: Uuid,
    ) -> ResultEngine<Profile> {
        let name = normalize_required_name(name, "profile")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.ensure_profile_name_free(&db_tx, &name, user_id, None)
                .await?;

            let profile = Profile::new(user_id, name, kind);
            profiles::ActiveModel::from(&profile).insert(&db_tx).await?;
            Ok(profile)
        })
    }

    /// Return a profile with the ids of its institutions and categories.
    pub async fn profile(&self, profile_id: Uuid, user_id: Uuid) -> ResultEngine<Profile> {
        with_tx!(self, |db_tx| {
            let model = self.require_profile(&db_tx, profile_id, user_id).await?;
            self.profile_view(&db_tx, model).await
        })
    }

    /// List the caller's profiles, oldest first.
    pub async fn list_profiles(&self, user_id: Uuid) -> ResultEngine<Vec<Profile>> {
        with_tx!(self, |db_tx| {
            let models = profiles::Entity::find()
                .filter(profiles::Column::UserId.eq(user_id))
                .order_by_asc(profiles::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(self.profile_view(&db_tx, model).await?);
            }
            Ok(out)
        })
    }

    pub async fn update_profile(
        &self,
        profile_id: Uuid,
        name: &str,
        kind: ProfileKind,
        user_id: Uuid,
    ) -> ResultEngine<Profile> {
        let name = normalize_required_name(name, "profile")?;
        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, profile_id, user_id).await?;
            self.ensure_profile_name_free(&db_tx, &name, user_id, Some(profile_id))
                .await?;

            let active = profiles::ActiveModel {
                id: ActiveValue::Set(profile_id),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            self.profile_view(&db_tx, model).await
        })
    }

    /// Delete a profile with its institutions, categories and transactions.
    ///
    /// Transfers touching the profile are removed on both sides, so the
    /// counterpart institution balance in the other profile is reverted too.
    /// The caller's last profile cannot be deleted.
    pub async fn delete_profile(&self, profile_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, profile_id, user_id).await?;

            let count = profiles::Entity::find()
                .filter(profiles::Column::UserId.eq(user_id))
                .count(&db_tx)
                .await?;
            if count <= 1 {
                return Err(EngineError::Forbidden(
                    "cannot delete the last profile".to_string(),
                ));
            }

            let institution_ids: Vec<Uuid> = institutions::Entity::find()
                .filter(institutions::Column::ProfileId.eq(profile_id))
                .select_only()
                .column(institutions::Column::Id)
                .into_tuple()
                .all(&db_tx)
                .await?;

            let transfers = transactions::Entity::find()
                .filter(transactions::Column::IsProfileTransfer.eq(true))
                .filter(
                    Condition::any()
                        .add(transactions::Column::ProfileId.eq(profile_id))
                        .add(transactions::Column::InstitutionId.is_in(institution_ids)),
                )
                .all(&db_tx)
                .await?;
            for leg in transfers {
                self.remove_transaction(&db_tx, leg.id).await?;
            }

            profiles::Entity::delete_by_id(profile_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn ensure_profile_name_free(
        &self,
        db: &DatabaseTransaction,
        name: &str,
        user_id: Uuid,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = profiles::Entity::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .select_only()
            .column(profiles::Column::Name);
        if let Some(id) = except {
            query = query.filter(profiles::Column::Id.ne(id));
        }
        let existing: Vec<String> = query.into_tuple().all(db).await?;
        if name_taken(&existing, name) {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(())
    }

    async fn profile_view(
        &self,
        db: &DatabaseTransaction,
        model: profiles::Model,
    ) -> ResultEngine<Profile> {
        let institution_ids: Vec<Uuid> = institutions::Entity::find()
            .filter(institutions::Column::ProfileId.eq(model.id))
            .order_by_asc(institutions::Column::CreatedAt)
            .select_only()
            .column(institutions::Column::Id)
            .into_tuple()
            .all(db)
            .await?;
        let category_ids: Vec<Uuid> = categories::Entity::find()
            .filter(categories::Column::ProfileId.eq(model.id))
            .order_by_asc(categories::Column::CreatedAt)
            .select_only()
            .column(categories::Column::Id)
            .into_tuple()
            .all(db)
            .await?;

        let mut profile = Profile::try_from(model)?;
        profile.institution_ids = institution_ids;
        profile.category_ids = category_ids;
        Ok(profile)
    }
}
