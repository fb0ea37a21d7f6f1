use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Institution, InstitutionCmd, MoneyCents, ResultEngine, institutions, profiles,
    transactions,
};

use super::{Engine, name_taken, normalize_required_name, with_tx};

/// Filters for listing institutions. Unset fields do not filter.
#[derive(Clone, Debug, Default)]
pub struct InstitutionListFilter {
    pub profile_id: Option<Uuid>,
    pub kind: Option<String>,
}

impl Engine {
    /// Add an institution to a profile. The current balance starts at the
    /// opening balance.
    pub async fn create_institution(
        &self,
        profile_id: Uuid,
        cmd: InstitutionCmd,
        user_id: Uuid,
    ) -> ResultEngine<Institution> {
        let name = normalize_required_name(&cmd.name, "institution")?;
        let kind = normalize_kind(&cmd.kind)?;
        MoneyCents::bounded(cmd.opening_balance_minor, "opening_balance_minor")?;
        with_tx!(self, |db_tx| {
            self.require_profile(&db_tx, profile_id, user_id).await?;
            self.ensure_institution_name_free(&db_tx, profile_id, &name, None)
                .await?;

            let institution = Institution::new(profile_id, name, kind, cmd.opening_balance_minor);
            institutions::ActiveModel::from(&institution)
                .insert(&db_tx)
                .await?;
            Ok(institution)
        })
    }

    pub async fn institution(
        &self,
        institution_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Institution> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_institution(&db_tx, institution_id, user_id)
                .await?;
            Ok(Institution::from(model))
        })
    }

    /// List the caller's institutions, ordered by name.
    pub async fn list_institutions(
        &self,
        filter: &InstitutionListFilter,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Institution>> {
        with_tx!(self, |db_tx| {
            let mut query = institutions::Entity::find()
                .inner_join(profiles::Entity)
                .filter(profiles::Column::UserId.eq(user_id));
            if let Some(profile_id) = filter.profile_id {
                query = query.filter(institutions::Column::ProfileId.eq(profile_id));
            }
            if let Some(kind) = filter.kind.as_deref() {
                query = query.filter(institutions::Column::Kind.eq(kind.trim().to_lowercase()));
            }
            let models = query
                .order_by_asc(institutions::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Institution::from).collect())
        })
    }

    /// Rename/retype an institution or change its opening balance.
    ///
    /// A new opening balance shifts the current balance by the same delta, so
    /// the transactions already booked keep their effect.
    pub async fn update_institution(
        &self,
        institution_id: Uuid,
        cmd: InstitutionCmd,
        user_id: Uuid,
    ) -> ResultEngine<Institution> {
        let name = normalize_required_name(&cmd.name, "institution")?;
        let kind = normalize_kind(&cmd.kind)?;
        let opening = MoneyCents::bounded(cmd.opening_balance_minor, "opening_balance_minor")?;
        with_tx!(self, |db_tx| {
            let model = self
                .require_institution(&db_tx, institution_id, user_id)
                .await?;
            self.ensure_institution_name_free(&db_tx, model.profile_id, &name, Some(model.id))
                .await?;

            let opening_delta = opening
                .checked_sub(MoneyCents::new(model.opening_balance_minor))?
                .cents();
            let active = institutions::ActiveModel {
                id: ActiveValue::Set(model.id),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(kind),
                opening_balance_minor: ActiveValue::Set(cmd.opening_balance_minor),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            self.apply_balance_delta(&db_tx, model.id, opening_delta)
                .await?;

            let model = self
                .require_institution(&db_tx, institution_id, user_id)
                .await?;
            Ok(Institution::from(model))
        })
    }

    /// Delete an institution. Fails with `InUse` while transactions
    /// reference it.
    pub async fn delete_institution(&self, institution_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_institution(&db_tx, institution_id, user_id)
                .await?;
            let used = transactions::Entity::find()
                .filter(transactions::Column::InstitutionId.eq(institution_id))
                .count(&db_tx)
                .await?;
            if used > 0 {
                return Err(EngineError::InUse(format!(
                    "institution ({used} transactions)"
                )));
            }
            institutions::Entity::delete_by_id(institution_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn ensure_institution_name_free(
        &self,
        db: &DatabaseTransaction,
        profile_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = institutions::Entity::find()
            .filter(institutions::Column::ProfileId.eq(profile_id))
            .select_only()
            .column(institutions::Column::Name);
        if let Some(id) = except {
            query = query.filter(institutions::Column::Id.ne(id));
        }
        let existing: Vec<String> = query.into_tuple().all(db).await?;
        if name_taken(&existing, name) {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(())
    }
}

fn normalize_kind(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "institution kind must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_lowercase())
}
