use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use uuid::Uuid;

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, MoneyCents, ResultEngine, Transaction, TransactionCmd, TransactionKind,
    categories, institutions, transactions,
    util::{ensure_date_range, ensure_not_future},
};

use super::{Engine, with_tx};

mod installments;
mod transfer;

/// Filters for listing transactions. Unset fields do not filter.
///
/// `from` and `to` are both inclusive.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub profile_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<Uuid>,
    pub institution_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Where a plain transaction is booked, after ownership checks.
struct Booking {
    profile_id: Uuid,
    institution: institutions::Model,
    category: categories::Model,
    subcategory_id: Option<Uuid>,
}

/// Shape checks shared by every write: amount, description and date.
fn validate_cmd(cmd: &TransactionCmd) -> ResultEngine<String> {
    if cmd.amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount_minor must be > 0".to_string(),
        ));
    }
    MoneyCents::bounded(cmd.amount_minor, "amount_minor")?;
    ensure_not_future(cmd.occurred_on, "transaction date")?;
    let description = cmd.description.trim();
    if description.is_empty() {
        return Err(EngineError::InvalidInput(
            "description must not be empty".to_string(),
        ));
    }
    Ok(description.to_string())
}

impl Engine {
    /// Book an income or an expense and update the institution balance.
    ///
    /// When `destination_profile_id` is set the command is a profile
    /// transfer: see [`Engine::create_profile_transfer`]. The returned row is
    /// then the outgoing leg.
    pub async fn create_transaction(
        &self,
        cmd: TransactionCmd,
        user_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let description = validate_cmd(&cmd)?;
        with_tx!(self, |db_tx| {
            if cmd.is_transfer() {
                self.create_profile_transfer(&db_tx, &cmd, &description, user_id)
                    .await
            } else {
                let booking = self.resolve_booking(&db_tx, &cmd, user_id).await?;
                let tx = Transaction::new(
                    user_id,
                    booking.profile_id,
                    booking.institution.id,
                    (booking.category.id, booking.category.name.as_str()),
                    booking.subcategory_id,
                    cmd.occurred_on,
                    description,
                    cmd.amount_minor,
                    cmd.kind,
                )?;
                self.insert_transaction(&db_tx, &tx).await?;
                Ok(tx)
            }
        })
    }

    pub async fn transaction(&self, transaction_id: Uuid, user_id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, transaction_id, user_id)
                .await?;
            let mut views = self.transaction_views(&db_tx, vec![model]).await?;
            views
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
        })
    }

    /// List the caller's transactions, newest first.
    pub async fn list_transactions(
        &self,
        filter: &TransactionListFilter,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        ensure_date_range(filter.from, filter.to)?;
        with_tx!(self, |db_tx| {
            let mut query =
                transactions::Entity::find().filter(transactions::Column::UserId.eq(user_id));
            if let Some(profile_id) = filter.profile_id {
                query = query.filter(transactions::Column::ProfileId.eq(profile_id));
            }
            if let Some(kind) = filter.kind {
                query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
            }
            if let Some(category_id) = filter.category_id {
                query = query.filter(transactions::Column::CategoryId.eq(category_id));
            }
            if let Some(institution_id) = filter.institution_id {
                query = query.filter(transactions::Column::InstitutionId.eq(institution_id));
            }
            if let Some(from) = filter.from {
                query = query.filter(transactions::Column::OccurredOn.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(transactions::Column::OccurredOn.lte(to));
            }

            let models = query
                .order_by_desc(transactions::Column::OccurredOn)
                .order_by_desc(transactions::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.transaction_views(&db_tx, models).await
        })
    }

    /// Replace a transaction, moving its balance effect.
    ///
    /// The old effect is reverted on the old institution and the new one is
    /// applied on the (possibly different) new institution. Transfer legs
    /// cannot be edited: delete the transfer and create it again.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        cmd: TransactionCmd,
        user_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let description = validate_cmd(&cmd)?;
        if cmd.is_transfer() {
            return Err(EngineError::InvalidInput(
                "a transaction cannot be turned into a profile transfer".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let existing = self
                .require_transaction(&db_tx, transaction_id, user_id)
                .await?;
            if existing.is_profile_transfer {
                return Err(EngineError::InvalidInput(
                    "profile transfer legs cannot be edited".to_string(),
                ));
            }
            let booking = self.resolve_booking(&db_tx, &cmd, user_id).await?;
            self.revert_balance(&db_tx, &existing).await?;

            let mut tx = Transaction::try_from((existing, booking.category.name.clone()))?;
            tx.profile_id = booking.profile_id;
            tx.institution_id = booking.institution.id;
            tx.category_id = booking.category.id;
            tx.category_name = booking.category.name;
            tx.subcategory_id = booking.subcategory_id;
            tx.occurred_on = cmd.occurred_on;
            tx.description = description;
            tx.amount_minor = cmd.amount_minor;
            tx.kind = cmd.kind;
            tx.refresh_classification();

            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            self.apply_balance_delta(&db_tx, tx.institution_id, tx.balance_delta())
                .await?;
            Ok(tx)
        })
    }

    /// Delete a transaction and revert its balance effect. Deleting either
    /// leg of a profile transfer deletes both.
    pub async fn delete_transaction(&self, transaction_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_transaction(&db_tx, transaction_id, user_id)
                .await?;
            self.remove_transaction(&db_tx, transaction_id).await
        })
    }

    /// Delete a row and its transfer counterpart, reverting both balances.
    /// Rows already gone are skipped.
    pub(super) async fn remove_transaction(
        &self,
        db: &DatabaseTransaction,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        let Some(model) = transactions::Entity::find_by_id(transaction_id)
            .one(db)
            .await?
        else {
            return Ok(());
        };
        self.revert_balance(db, &model).await?;
        transactions::Entity::delete_by_id(model.id).exec(db).await?;

        if let Some(related_id) = model.related_transaction_id
            && let Some(related) = transactions::Entity::find_by_id(related_id).one(db).await?
        {
            self.revert_balance(db, &related).await?;
            transactions::Entity::delete_by_id(related.id)
                .exec(db)
                .await?;
        }
        Ok(())
    }

    async fn insert_transaction(&self, db: &DatabaseTransaction, tx: &Transaction) -> ResultEngine<()> {
        transactions::ActiveModel::from(tx).insert(db).await?;
        self.apply_balance_delta(db, tx.institution_id, tx.balance_delta())
            .await
    }

    /// Check that the institution, category and subcategory of `cmd` belong
    /// to the caller and fit together.
    ///
    /// Without an explicit profile the institution's profile is used.
    async fn resolve_booking(
        &self,
        db: &DatabaseTransaction,
        cmd: &TransactionCmd,
        user_id: Uuid,
    ) -> ResultEngine<Booking> {
        let institution = self
            .require_institution(db, cmd.institution_id, user_id)
            .await?;
        let profile_id = match cmd.profile_id {
            Some(id) => self.require_profile(db, id, user_id).await?.id,
            None => institution.profile_id,
        };
        if institution.profile_id != profile_id {
            return Err(EngineError::InvalidInput(
                "institution does not belong to the profile".to_string(),
            ));
        }

        let category_id = cmd
            .category_id
            .ok_or_else(|| EngineError::InvalidInput("category_id is required".to_string()))?;
        let category = self.require_category(db, category_id, user_id).await?;
        if category.profile_id != profile_id {
            return Err(EngineError::InvalidInput(
                "category does not belong to the profile".to_string(),
            ));
        }
        if category.is_system {
            return Err(EngineError::InvalidInput(format!(
                "category '{}' is reserved",
                category.name
            )));
        }
        if category.kind != cmd.kind.as_str() {
            return Err(EngineError::InvalidInput(format!(
                "category '{}' is not an {} category",
                category.name,
                cmd.kind.as_str()
            )));
        }

        let subcategory_id = match cmd.subcategory_id {
            Some(id) => {
                let (subcategory, _) = self.require_subcategory(db, id, user_id).await?;
                if subcategory.category_id != category.id {
                    return Err(EngineError::InvalidInput(
                        "subcategory does not belong to the category".to_string(),
                    ));
                }
                Some(subcategory.id)
            }
            None => None,
        };

        Ok(Booking {
            profile_id,
            institution,
            category,
            subcategory_id,
        })
    }

    /// Attach category names to stored rows.
    async fn transaction_views(
        &self,
        db: &DatabaseTransaction,
        models: Vec<transactions::Model>,
    ) -> ResultEngine<Vec<Transaction>> {
        let category_ids: HashSet<Uuid> = models.iter().map(|m| m.category_id).collect();
        let names: HashMap<Uuid, String> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        models
            .into_iter()
            .map(|model| {
                let name = names.get(&model.category_id).cloned().unwrap_or_default();
                Transaction::try_from((model, name))
            })
            .collect()
    }
}
