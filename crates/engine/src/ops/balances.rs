use std::collections::HashMap;

use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QuerySelect, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    EngineError, Institution, MoneyCents, ResultEngine, institutions, profiles, transactions,
};

use super::{Engine, with_tx};

impl Engine {
    /// Atomically shift an institution balance by `delta` (signed cents).
    ///
    /// The row only matches while the shifted balance still fits in an i64.
    pub(super) async fn apply_balance_delta(
        &self,
        db: &DatabaseTransaction,
        institution_id: Uuid,
        delta: i64,
    ) -> ResultEngine<()> {
        if delta == 0 {
            return Ok(());
        }
        let in_range = if delta > 0 {
            institutions::Column::BalanceMinor.lte(i64::MAX - delta)
        } else {
            institutions::Column::BalanceMinor.gte(i64::MIN - delta)
        };
        let result = institutions::Entity::update_many()
            .col_expr(
                institutions::Column::BalanceMinor,
                Expr::col(institutions::Column::BalanceMinor).add(delta),
            )
            .filter(institutions::Column::Id.eq(institution_id))
            .filter(in_range)
            .exec(db)
            .await?;
        if result.rows_affected > 0 {
            return Ok(());
        }
        if institutions::Entity::find_by_id(institution_id)
            .one(db)
            .await?
            .is_some()
        {
            return Err(EngineError::InvalidAmount(
                "institution balance is out of range".to_string(),
            ));
        }
        Err(EngineError::KeyNotFound(
            "institution not exists".to_string(),
        ))
    }

    /// Undo the balance effect of a stored row.
    pub(super) async fn revert_balance(
        &self,
        db: &DatabaseTransaction,
        model: &transactions::Model,
    ) -> ResultEngine<()> {
        self.apply_balance_delta(db, model.institution_id, -model.balance_delta()?)
            .await
    }

    /// Recomputes institution balances from their opening balance and the
    /// transactions booked against them.
    ///
    /// Scoped to one profile when `profile_id` is set, otherwise to every
    /// profile of the caller. Returns the refreshed institutions.
    pub async fn recompute_balances(
        &self,
        profile_id: Option<Uuid>,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Institution>> {
        with_tx!(self, |db_tx| {
            let mut query = institutions::Entity::find()
                .inner_join(profiles::Entity)
                .filter(profiles::Column::UserId.eq(user_id));
            if let Some(profile_id) = profile_id {
                self.require_profile(&db_tx, profile_id, user_id).await?;
                query = query.filter(institutions::Column::ProfileId.eq(profile_id));
            }
            let institution_models = query.all(&db_tx).await?;
            let ids: Vec<Uuid> = institution_models.iter().map(|m| m.id).collect();

            let mut deltas: HashMap<Uuid, MoneyCents> = HashMap::new();
            let rows = transactions::Entity::find()
                .filter(transactions::Column::InstitutionId.is_in(ids))
                .all(&db_tx)
                .await?;
            for row in &rows {
                let delta = deltas.entry(row.institution_id).or_default();
                *delta = delta.checked_add(MoneyCents::new(row.balance_delta()?))?;
            }

            let mut refreshed = Vec::with_capacity(institution_models.len());
            for model in institution_models {
                let balance = MoneyCents::new(model.opening_balance_minor)
                    .checked_add(deltas.get(&model.id).copied().unwrap_or_default())?
                    .cents();
                if balance != model.balance_minor {
                    tracing::info!(
                        "institution {} balance drifted: stored {}, computed {}",
                        model.id,
                        model.balance_minor,
                        balance
                    );
                }
                let active = institutions::ActiveModel {
                    id: ActiveValue::Set(model.id),
                    balance_minor: ActiveValue::Set(balance),
                    ..Default::default()
                };
                refreshed.push(Institution::from(active.update(&db_tx).await?));
            }

            Ok(refreshed)
        })
    }
}
